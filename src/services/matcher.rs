use std::collections::HashSet;

use crate::models::{
    CatalogItem, EmotionSet, MoodVocabulary, Pacing, Provenance, ScoredItem, TraitMap, Weight,
};

/// Result count when no emotions are selected and the caller gives no limit
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 5;

const AFFINITY_SCALE: f64 = 10.0;
const PACING_BONUS: f64 = 2.0;
const WEIGHT_BONUS: f64 = 1.0;
const LONG_RUNTIME_MINUTES: u32 = 150;
const LONG_RUNTIME_PENALTY: f64 = 1.0;

/// Ranks catalog items against a set of emotions
///
/// Pure and stateless: every call is a function of its arguments, so a single
/// matcher can be shared freely between requests.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    vocabulary: &'a MoodVocabulary,
    traits: &'a TraitMap,
}

/// Pacing and weight that stand for the whole selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepresentativeTraits {
    pub pacing: Pacing,
    pub weight: Weight,
}

impl<'a> Matcher<'a> {
    pub fn new(vocabulary: &'a MoodVocabulary, traits: &'a TraitMap) -> Self {
        Self { vocabulary, traits }
    }

    /// Orders the catalog by descending relevance to `selected`
    ///
    /// With no emotions selected, the catalog is returned in input order with
    /// zero scores, truncated to `limit` or [`DEFAULT_RECOMMENDATION_COUNT`].
    pub fn rank_scored(
        &self,
        selected: &[String],
        catalog: &[CatalogItem],
        limit: Option<usize>,
    ) -> Vec<ScoredItem> {
        let selected = EmotionSet::from_labels(selected);

        if selected.is_empty() {
            return catalog
                .iter()
                .take(limit.unwrap_or(DEFAULT_RECOMMENDATION_COUNT))
                .map(|item| ScoredItem {
                    item: item.clone(),
                    score: 0.0,
                })
                .collect();
        }

        let emotion_vectors: Vec<Vec<f64>> = selected
            .iter()
            .map(|emotion| self.mood_vector([emotion]))
            .collect();
        let representative = self.representative_traits(&selected);

        let mut scored: Vec<ScoredItem> = catalog
            .iter()
            .map(|item| ScoredItem {
                item: item.clone(),
                score: self.score_item(item, &emotion_vectors, representative),
            })
            .collect();

        // Stable: equal scores with equal provenance keep input order
        scored.sort_by(|a, b| {
            b.score.total_cmp(&a.score).then_with(|| {
                Provenance::tie_rank(a.item.provenance)
                    .cmp(&Provenance::tie_rank(b.item.provenance))
            })
        });

        if let Some(limit) = limit {
            scored.truncate(limit);
        }

        scored
    }

    /// Multi-hot encoding of `moods` over the vocabulary axis
    pub fn mood_vector<I, S>(&self, moods: I) -> Vec<f64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let present: HashSet<String> = moods.into_iter().map(|m| m.as_ref().to_string()).collect();
        self.vocabulary
            .iter()
            .map(|mood| if present.contains(mood) { 1.0 } else { 0.0 })
            .collect()
    }

    /// Median-by-position pacing and weight of the selection
    ///
    /// Emotions without a trait profile are skipped; an empty list falls back
    /// to `Medium`.
    pub fn representative_traits(&self, selected: &EmotionSet) -> RepresentativeTraits {
        let profiles: Vec<_> = selected.iter().filter_map(|e| self.traits.get(e)).collect();

        // pacing and weight lists are the same length here, so one index serves both
        match profiles.get(profiles.len() / 2) {
            Some(profile) => RepresentativeTraits {
                pacing: profile.pacing,
                weight: profile.weight,
            },
            None => RepresentativeTraits {
                pacing: Pacing::Medium,
                weight: Weight::Medium,
            },
        }
    }

    fn score_item(
        &self,
        item: &CatalogItem,
        emotion_vectors: &[Vec<f64>],
        representative: RepresentativeTraits,
    ) -> f64 {
        let item_vector = self.mood_vector(&item.moods);
        let affinity = emotion_vectors
            .iter()
            .map(|v| cosine_similarity(v, &item_vector))
            .sum::<f64>()
            / emotion_vectors.len() as f64;

        let mut score = affinity * AFFINITY_SCALE;

        if item.pacing == Some(representative.pacing) {
            score += PACING_BONUS;
        }
        if item.weight == Some(representative.weight) {
            score += WEIGHT_BONUS;
        }
        if item.runtime > LONG_RUNTIME_MINUTES {
            score -= LONG_RUNTIME_PENALTY;
        }

        score
    }
}

/// Ranks `catalog` for `selected` and returns the reordered items
pub fn rank(
    selected: &[String],
    catalog: &[CatalogItem],
    vocabulary: &MoodVocabulary,
    traits: &TraitMap,
    limit: Option<usize>,
) -> Vec<CatalogItem> {
    Matcher::new(vocabulary, traits)
        .rank_scored(selected, catalog, limit)
        .into_iter()
        .map(|scored| scored.item)
        .collect()
}

/// Cosine similarity; 0 when either vector has zero magnitude
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{bundled_catalog, emotion_traits, mood_vocabulary};

    fn item(id: u64, moods: &[&str], pacing: Option<Pacing>, weight: Option<Weight>, runtime: u32) -> CatalogItem {
        CatalogItem {
            id,
            title: format!("Movie {}", id),
            poster: String::new(),
            youtube_id: None,
            moods: moods.iter().map(|m| m.to_string()).collect(),
            pacing,
            weight,
            year: Some(2000),
            runtime,
            origin: None,
            provenance: None,
        }
    }

    fn labels(emotions: &[&str]) -> Vec<String> {
        emotions.iter().map(|e| e.to_string()).collect()
    }

    fn score_of(scored: &[ScoredItem], id: u64) -> f64 {
        scored.iter().find(|s| s.item.id == id).unwrap().score
    }

    #[test]
    fn test_cosine_similarity_identical_is_one() {
        let v = vec![0.0, 1.0, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_mood_vector_ignores_unknown_moods() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        let v = matcher.mood_vector(["hopeful", "reflective"]);
        assert_eq!(v.len(), 9);
        assert_eq!(v.iter().sum::<f64>(), 1.0);
        assert_eq!(v[3], 1.0);
    }

    #[test]
    fn test_exact_mood_match_gives_full_affinity() {
        let vocabulary = mood_vocabulary();
        let traits = TraitMap::new();
        let matcher = Matcher::new(&vocabulary, &traits);

        let catalog = vec![item(1, &["hopeful"], None, None, 100)];
        let scored = matcher.rank_scored(&labels(&["hopeful"]), &catalog, None);

        // affinity 1.0 scaled by 10, no trait or runtime adjustments
        assert!((scored[0].score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_overlap_contributes_zero() {
        let vocabulary = mood_vocabulary();
        let traits = TraitMap::new();
        let matcher = Matcher::new(&vocabulary, &traits);

        let catalog = vec![
            item(1, &["anxious", "restless"], None, None, 100),
            item(2, &[], None, None, 100),
        ];
        let scored = matcher.rank_scored(&labels(&["hopeful", "calm"]), &catalog, None);

        for s in &scored {
            assert_eq!(s.score, 0.0);
            assert!(!s.score.is_nan());
        }
    }

    #[test]
    fn test_pacing_match_adds_two_points() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        let catalog = vec![
            item(1, &["anxious"], Some(Pacing::Slow), Some(Weight::Light), 120),
            item(2, &["anxious"], Some(Pacing::Fast), Some(Weight::Light), 120),
        ];
        let scored = matcher.rank_scored(&labels(&["anxious"]), &catalog, None);

        assert_eq!(scored[0].item.id, 2);
        assert!((score_of(&scored, 2) - score_of(&scored, 1) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_match_adds_one_point() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        let catalog = vec![
            item(1, &["anxious"], Some(Pacing::Slow), Some(Weight::Medium), 120),
            item(2, &["anxious"], Some(Pacing::Slow), Some(Weight::Heavy), 120),
        ];
        let scored = matcher.rank_scored(&labels(&["anxious"]), &catalog, None);

        assert!((score_of(&scored, 1) - score_of(&scored, 2) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_runtime_costs_one_point() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        let catalog = vec![
            item(1, &["calm"], Some(Pacing::Slow), Some(Weight::Light), 151),
            item(2, &["calm"], Some(Pacing::Slow), Some(Weight::Light), 150),
        ];
        let scored = matcher.rank_scored(&labels(&["calm"]), &catalog, None);

        assert_eq!(scored[0].item.id, 2);
        assert!((score_of(&scored, 2) - score_of(&scored, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_traits_never_match() {
        let vocabulary = mood_vocabulary();
        let traits = TraitMap::new();
        let matcher = Matcher::new(&vocabulary, &traits);

        // no trait profiles known, so the representative traits are Medium/Medium
        let catalog = vec![
            item(1, &["curious"], None, None, 100),
            item(2, &["curious"], Some(Pacing::Medium), Some(Weight::Medium), 100),
        ];
        let scored = matcher.rank_scored(&labels(&["curious"]), &catalog, None);

        assert!((score_of(&scored, 1) - 10.0).abs() < 1e-9);
        assert!((score_of(&scored, 2) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_representative_traits_use_middle_position() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        // index 1 of [restless, calm, anxious] is calm -> slow/light
        let selected = EmotionSet::from_labels(["restless", "calm", "anxious"]);
        assert_eq!(
            matcher.representative_traits(&selected),
            RepresentativeTraits {
                pacing: Pacing::Slow,
                weight: Weight::Light
            }
        );

        // index 1 of [anxious, heavy] is heavy -> slow/heavy
        let selected = EmotionSet::from_labels(["anxious", "heavy"]);
        assert_eq!(
            matcher.representative_traits(&selected),
            RepresentativeTraits {
                pacing: Pacing::Slow,
                weight: Weight::Heavy
            }
        );
    }

    #[test]
    fn test_representative_traits_skip_unmapped_emotions() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        // "melancholy" has no profile; collected list is [restless, hopeful]
        let selected = EmotionSet::from_labels(["melancholy", "restless", "hopeful"]);
        assert_eq!(
            matcher.representative_traits(&selected),
            RepresentativeTraits {
                pacing: Pacing::Medium,
                weight: Weight::Light
            }
        );

        let selected = EmotionSet::from_labels(["melancholy"]);
        assert_eq!(
            matcher.representative_traits(&selected),
            RepresentativeTraits {
                pacing: Pacing::Medium,
                weight: Weight::Medium
            }
        );
    }

    #[test]
    fn test_duplicate_emotions_are_collapsed() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);
        let catalog = bundled_catalog().unwrap();

        let once = matcher.rank_scored(&labels(&["heavy", "calm"]), &catalog, None);
        let twice = matcher.rank_scored(&labels(&["heavy", "heavy", "calm"]), &catalog, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_selection_keeps_catalog_order() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let catalog = bundled_catalog().unwrap();

        let ranked = rank(&[], &catalog, &vocabulary, &traits, None);
        assert_eq!(ranked.len(), DEFAULT_RECOMMENDATION_COUNT);
        assert_eq!(ranked[..], catalog[..DEFAULT_RECOMMENDATION_COUNT]);

        let ranked = rank(&[], &catalog, &vocabulary, &traits, Some(2));
        assert_eq!(ranked[..], catalog[..2]);
    }

    #[test]
    fn test_rank_is_a_permutation() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let catalog = bundled_catalog().unwrap();

        let ranked = rank(&labels(&["tired", "curious"]), &catalog, &vocabulary, &traits, None);
        assert_eq!(ranked.len(), catalog.len());

        let mut expected: Vec<u64> = catalog.iter().map(|m| m.id).collect();
        let mut actual: Vec<u64> = ranked.iter().map(|m| m.id).collect();
        expected.sort();
        actual.sort();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_limit_truncates() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let catalog = bundled_catalog().unwrap();

        let ranked = rank(&labels(&["numb"]), &catalog, &vocabulary, &traits, Some(3));
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);
        let catalog = bundled_catalog().unwrap();
        let selected = labels(&["anxious", "empty", "curious"]);

        let first = matcher.rank_scored(&selected, &catalog, None);
        let second = matcher.rank_scored(&selected, &catalog, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let catalog = vec![
            item(10, &["calm"], None, None, 90),
            item(11, &["calm"], None, None, 90),
            item(12, &["calm"], None, None, 90),
        ];

        let ranked = rank(&labels(&["calm"]), &catalog, &vocabulary, &traits, None);
        let ids: Vec<u64> = ranked.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_ties_prefer_primary_provenance() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let mut searched = item(20, &["calm"], None, None, 90);
        searched.provenance = Some(Provenance::Search);
        let mut discovered = item(21, &["calm"], None, None, 90);
        discovered.provenance = Some(Provenance::Discover);

        let ranked = rank(&labels(&["calm"]), &[searched, discovered], &vocabulary, &traits, None);
        assert_eq!(ranked[0].id, 21);
        assert_eq!(ranked[1].id, 20);
    }

    #[test]
    fn test_hopeful_scenario() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let matcher = Matcher::new(&vocabulary, &traits);

        let a = item(372058, &["hopeful", "calm"], Some(Pacing::Medium), Some(Weight::Light), 106);
        let b = item(155, &["anxious", "restless"], Some(Pacing::Fast), Some(Weight::Medium), 152);
        let scored = matcher.rank_scored(&labels(&["hopeful"]), &[b, a], None);

        assert_eq!(scored[0].item.id, 372058);
        assert_eq!(scored[1].item.id, 155);
        // 10 / sqrt(2) + 2 + 1
        assert!((scored[0].score - (10.0 / 2f64.sqrt() + 3.0)).abs() < 1e-9);
        assert!((scored[1].score + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bundled_catalog_anxious_favours_fast_anxious_titles() {
        let vocabulary = mood_vocabulary();
        let traits = emotion_traits();
        let catalog = bundled_catalog().unwrap();

        let ranked = rank(&labels(&["anxious"]), &catalog, &vocabulary, &traits, Some(3));
        // Fight Club and The Matrix: anxious mood, fast pacing, medium weight, under 150 minutes
        let ids: Vec<u64> = ranked.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![550, 603, 155]);
    }
}
