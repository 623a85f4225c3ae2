use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EmotionSet;

/// One past emotion selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub emotions: EmotionSet,
    pub recorded_at: DateTime<Utc>,
}

/// Per-session browsing state: last selection, rolling history, watchlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub last_selected: EmotionSet,
    /// Most recent first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub watchlist: Vec<u64>,
}

impl SessionState {
    /// Records a selection as the latest one and pushes it onto the history.
    ///
    /// Selecting the same set twice in a row keeps a single history entry with
    /// the newer timestamp.
    pub fn record_selection(&mut self, emotions: &EmotionSet, at: DateTime<Utc>, limit: usize) {
        if emotions.is_empty() {
            return;
        }

        self.last_selected = emotions.clone();

        if self
            .history
            .first()
            .is_some_and(|latest| latest.emotions == *emotions)
        {
            self.history.remove(0);
        }

        self.history.insert(
            0,
            HistoryEntry {
                emotions: emotions.clone(),
                recorded_at: at,
            },
        );
        self.history.truncate(limit);
    }

    /// Adds the movie if absent, removes it if present. Returns whether the
    /// movie is on the watchlist afterwards.
    pub fn toggle_watchlist(&mut self, movie_id: u64) -> bool {
        if let Some(pos) = self.watchlist.iter().position(|id| *id == movie_id) {
            self.watchlist.remove(pos);
            false
        } else {
            self.watchlist.push(movie_id);
            true
        }
    }

    pub fn in_watchlist(&self, movie_id: u64) -> bool {
        self.watchlist.contains(&movie_id)
    }
}
