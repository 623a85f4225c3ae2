//! Static mood data and the bundled catalog shipped with the service.

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, MoodVocabulary, Pacing, TraitMap, TraitProfile, Weight},
};

const BUNDLED_CATALOG: &str = include_str!("catalog.json");

/// Moods offered as presets, in feature-vector axis order
pub const MOODS: [&str; 9] = [
    "restless", "heavy", "empty", "hopeful", "numb", "anxious", "calm", "curious", "tired",
];

const EMOTION_TRAITS: [(&str, Pacing, Weight); 9] = [
    ("restless", Pacing::Fast, Weight::Light),
    ("heavy", Pacing::Slow, Weight::Heavy),
    ("empty", Pacing::Slow, Weight::Medium),
    ("hopeful", Pacing::Medium, Weight::Light),
    ("numb", Pacing::Slow, Weight::Medium),
    ("anxious", Pacing::Fast, Weight::Medium),
    ("calm", Pacing::Slow, Weight::Light),
    ("curious", Pacing::Medium, Weight::Light),
    ("tired", Pacing::Slow, Weight::Medium),
];

pub fn mood_vocabulary() -> MoodVocabulary {
    MoodVocabulary::new(MOODS)
}

pub fn emotion_traits() -> TraitMap {
    EMOTION_TRAITS
        .iter()
        .map(|&(emotion, pacing, weight)| (emotion, TraitProfile { pacing, weight }))
        .collect()
}

/// Parses the catalog compiled into the binary
pub fn bundled_catalog() -> AppResult<Vec<CatalogItem>> {
    serde_json::from_str(BUNDLED_CATALOG)
        .map_err(|e| AppError::Internal(format!("Bundled catalog is malformed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = bundled_catalog().unwrap();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog[0].title, "The Shawshank Redemption");
    }

    #[test]
    fn test_bundled_catalog_ids_are_unique() {
        let catalog = bundled_catalog().unwrap();
        let ids: HashSet<u64> = catalog.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_mood_has_traits() {
        let traits = emotion_traits();
        for mood in MOODS {
            assert!(traits.get(mood).is_some(), "missing traits for {}", mood);
        }
        assert_eq!(
            traits.get("anxious"),
            Some(&TraitProfile {
                pacing: Pacing::Fast,
                weight: Weight::Medium
            })
        );
    }
}
