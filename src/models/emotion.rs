use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Pacing, Weight};

/// Ordered, de-duplicated set of lowercase emotion labels
///
/// Order is first-occurrence order. It matters to the matcher, which picks
/// representative traits by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionSet(Vec<String>);

impl EmotionSet {
    /// Builds a set from raw user input: trims, lower-cases, drops empty
    /// strings and repeated labels.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::collect(raw.into_iter().map(|s| s.as_ref().trim().to_lowercase()))
    }

    /// Builds a set from already-normalized labels, only removing duplicates
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::collect(labels.into_iter().map(|s| s.as_ref().to_string()))
    }

    fn collect(labels: impl Iterator<Item = String>) -> Self {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            if !label.is_empty() && !out.contains(&label) {
                out.push(label);
            }
        }
        Self(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Labels joined by single spaces, as typed into a search box
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// Ordered list of known moods; the order defines feature-vector axes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MoodVocabulary(Vec<String>);

impl MoodVocabulary {
    pub fn new<I, S>(moods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(moods.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Pacing and weight a viewer in a given mood is expected to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitProfile {
    pub pacing: Pacing,
    pub weight: Weight,
}

/// Lookup from an emotion label to its trait profile
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TraitMap(HashMap<String, TraitProfile>);

impl TraitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, emotion: impl Into<String>, profile: TraitProfile) {
        self.0.insert(emotion.into(), profile);
    }

    pub fn get(&self, emotion: &str) -> Option<&TraitProfile> {
        self.0.get(emotion)
    }
}

impl<S: Into<String>> FromIterator<(S, TraitProfile)> for TraitMap {
    fn from_iter<T: IntoIterator<Item = (S, TraitProfile)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_normalizes_input() {
        let set = EmotionSet::from_raw(["  Hopeful ", "", "CALM", "hopeful", "   "]);
        assert_eq!(set.as_slice(), &["hopeful".to_string(), "calm".to_string()]);
    }

    #[test]
    fn test_from_labels_keeps_first_occurrence_order() {
        let set = EmotionSet::from_labels(["tired", "anxious", "tired", "calm"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["tired", "anxious", "calm"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_joined() {
        let set = EmotionSet::from_raw(["lost in space", "Sad"]);
        assert_eq!(set.joined(), "lost in space sad");
    }

    #[test]
    fn test_emotion_set_serializes_as_array() {
        let set = EmotionSet::from_raw(["numb"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["numb"]"#);
    }
}
