use std::sync::Arc;

use uuid::Uuid;

use crate::{
    data,
    error::AppResult,
    models::{CatalogItem, EmotionSet, MoodVocabulary, TraitMap},
    services::{
        events::{AppEvent, EventBus},
        providers::MovieProvider,
        session::{self, SessionStore},
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Vec<CatalogItem>>,
    pub vocabulary: Arc<MoodVocabulary>,
    pub traits: Arc<TraitMap>,
    pub provider: Arc<dyn MovieProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub events: EventBus,
    pub history_limit: usize,
}

impl AppState {
    /// State over the bundled catalog, mood vocabulary and trait map
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        sessions: Arc<dyn SessionStore>,
        events: EventBus,
        history_limit: usize,
    ) -> AppResult<Self> {
        let catalog = data::bundled_catalog()?;
        tracing::info!(items = catalog.len(), "Bundled catalog loaded");

        Ok(Self {
            catalog: Arc::new(catalog),
            vocabulary: Arc::new(data::mood_vocabulary()),
            traits: Arc::new(data::emotion_traits()),
            provider,
            sessions,
            events,
            history_limit,
        })
    }

    pub fn bundled_item(&self, movie_id: u64) -> Option<&CatalogItem> {
        self.catalog.iter().find(|item| item.id == movie_id)
    }

    /// Saves a non-empty selection into the session and announces it
    pub async fn remember_selection(
        &self,
        session_id: Uuid,
        emotions: &EmotionSet,
    ) -> AppResult<()> {
        if emotions.is_empty() {
            return Ok(());
        }

        session::record_selection(
            self.sessions.as_ref(),
            session_id,
            emotions,
            self.history_limit,
        )
        .await?;

        self.events.publish(AppEvent::EmotionsSelected {
            session_id: Some(session_id),
            emotions: emotions.clone(),
        });
        Ok(())
    }
}
