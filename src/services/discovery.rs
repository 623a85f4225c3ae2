//! Remote movie discovery from free-text emotions.
//!
//! The lookup is an ordered list of strategies. Each one decides from the
//! plan and the number of results gathered so far whether it runs, so a
//! stage can be tested or reordered without touching the others.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::{
    error::AppResult,
    models::{DiscoveredMovie, EmotionSet, PacingLabel, Provenance, TmdbMovie, WeightLabel},
    services::{
        genres,
        providers::{DiscoverParams, MovieProvider},
    },
};

/// Below this many results the genre-only fallback query runs
pub const MIN_RESULTS_BEFORE_FALLBACK: usize = 5;

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const PLACEHOLDER_POSTER: &str = "https://placehold.co/500x750/000000/FFFFFF/png?text=NO+IMAGE";
const MIN_WORD_LEN: usize = 3;

const BASE_SCORE: f64 = 50.0;
const MAX_POPULARITY_BONUS: f64 = 20.0;
const GENRE_MATCH_BONUS: f64 = 15.0;
const KEYWORD_MATCH_BONUS: f64 = 12.0;
const TEXT_MATCH_BONUS: f64 = 6.0;
const MAX_TEXT_MATCH_BONUS: f64 = 12.0;

/// Everything derived from the user's emotions before any query runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryPlan {
    pub emotions: EmotionSet,
    /// Emotions joined for the free-text search
    pub query: String,
    pub words: Vec<String>,
    pub genre_ids: Vec<u32>,
    pub keyword_ids: Vec<u64>,
}

/// Ranked discovery results and the stages that produced them
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    pub movies: Vec<DiscoveredMovie>,
    pub stages: Vec<&'static str>,
}

/// One stage of the lookup
#[async_trait::async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tag attached to results first seen in this stage
    fn provenance(&self) -> Provenance;

    /// Whether the stage runs, given how many results are already collected
    fn should_run(&self, plan: &DiscoveryPlan, collected: usize) -> bool;

    /// Optional stages log failures and contribute nothing instead of
    /// failing the lookup
    fn is_optional(&self) -> bool {
        false
    }

    async fn fetch(
        &self,
        provider: &dyn MovieProvider,
        plan: &DiscoveryPlan,
    ) -> AppResult<Vec<TmdbMovie>>;
}

/// Keyword and genre filters in one discover query
pub struct CombinedDiscover;

/// Free-text search over titles with the raw emotion text
pub struct TextSearch;

/// Any-of-genres discover query when results are thin
pub struct GenreFallback;

/// Weekly trending list when nothing else matched
pub struct Trending;

#[async_trait::async_trait]
impl DiscoveryStrategy for CombinedDiscover {
    fn name(&self) -> &'static str {
        "discover"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Discover
    }

    fn should_run(&self, _plan: &DiscoveryPlan, _collected: usize) -> bool {
        true
    }

    async fn fetch(
        &self,
        provider: &dyn MovieProvider,
        plan: &DiscoveryPlan,
    ) -> AppResult<Vec<TmdbMovie>> {
        let params = DiscoverParams::combined(plan.keyword_ids.clone(), plan.genre_ids.clone());
        provider.discover(&params).await
    }
}

#[async_trait::async_trait]
impl DiscoveryStrategy for TextSearch {
    fn name(&self) -> &'static str {
        "search"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Search
    }

    fn should_run(&self, plan: &DiscoveryPlan, _collected: usize) -> bool {
        !plan.query.is_empty()
    }

    fn is_optional(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        provider: &dyn MovieProvider,
        plan: &DiscoveryPlan,
    ) -> AppResult<Vec<TmdbMovie>> {
        provider.search_movies(&plan.query).await
    }
}

#[async_trait::async_trait]
impl DiscoveryStrategy for GenreFallback {
    fn name(&self) -> &'static str {
        "genre_fallback"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Fallback
    }

    fn should_run(&self, plan: &DiscoveryPlan, collected: usize) -> bool {
        collected < MIN_RESULTS_BEFORE_FALLBACK && !plan.genre_ids.is_empty()
    }

    async fn fetch(
        &self,
        provider: &dyn MovieProvider,
        plan: &DiscoveryPlan,
    ) -> AppResult<Vec<TmdbMovie>> {
        let params = DiscoverParams::genres_only(plan.genre_ids.clone());
        provider.discover(&params).await
    }
}

#[async_trait::async_trait]
impl DiscoveryStrategy for Trending {
    fn name(&self) -> &'static str {
        "trending"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Trending
    }

    fn should_run(&self, _plan: &DiscoveryPlan, collected: usize) -> bool {
        collected == 0
    }

    async fn fetch(
        &self,
        provider: &dyn MovieProvider,
        _plan: &DiscoveryPlan,
    ) -> AppResult<Vec<TmdbMovie>> {
        provider.trending().await
    }
}

/// Results gathered across stages, de-duplicated by id. The first stage to
/// return a movie keeps it.
#[derive(Default)]
struct Collected {
    entries: Vec<(TmdbMovie, Provenance)>,
    seen: HashSet<u64>,
}

impl Collected {
    fn absorb(&mut self, movies: Vec<TmdbMovie>, provenance: Provenance) -> usize {
        let before = self.entries.len();
        for movie in movies {
            if self.seen.insert(movie.id) {
                self.entries.push((movie, provenance));
            }
        }
        self.entries.len() - before
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct DiscoveryPipeline {
    provider: Arc<dyn MovieProvider>,
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl DiscoveryPipeline {
    /// Pipeline with the standard stages: discover, search, genre fallback,
    /// trending
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self::with_strategies(
            provider,
            vec![
                Box::new(CombinedDiscover),
                Box::new(TextSearch),
                Box::new(GenreFallback),
                Box::new(Trending),
            ],
        )
    }

    pub fn with_strategies(
        provider: Arc<dyn MovieProvider>,
        strategies: Vec<Box<dyn DiscoveryStrategy>>,
    ) -> Self {
        Self {
            provider,
            strategies,
        }
    }

    /// Resolves words to genres and keywords
    ///
    /// A word that is itself a genre word skips the keyword lookup. Other
    /// words may still pick up a genre by substring and are always looked up
    /// as keywords, concurrently. Failed lookups are ignored.
    pub async fn plan(&self, emotions: &EmotionSet) -> DiscoveryPlan {
        let words = query_words(emotions);
        let mut genre_ids = Vec::new();
        let mut lookup_words = Vec::new();

        for word in &words {
            if let Some(genre) = genres::exact(word) {
                push_unique(&mut genre_ids, genre);
                continue;
            }

            if let Some(genre) = genres::fuzzy(word) {
                push_unique(&mut genre_ids, genre);
            }

            lookup_words.push(word.as_str());
        }

        // polled in place so the lookups are dropped with the request
        let provider = self.provider.as_ref();
        let lookups = join_all(lookup_words.into_iter().map(|word| async move {
            (word, provider.search_keyword(word).await)
        }))
        .await;

        let mut keyword_ids = Vec::new();
        for (word, result) in lookups {
            match result {
                Ok(Some(id)) => push_unique(&mut keyword_ids, id),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(word = %word, error = %e, "Keyword lookup failed");
                }
            }
        }

        DiscoveryPlan {
            query: emotions.joined().trim().to_string(),
            emotions: emotions.clone(),
            words,
            genre_ids,
            keyword_ids,
        }
    }

    /// Runs every applicable stage and returns the merged, ranked results
    pub async fn discover(&self, emotions: &EmotionSet) -> AppResult<DiscoveryOutcome> {
        let plan = self.plan(emotions).await;

        tracing::info!(
            words = plan.words.len(),
            genres = plan.genre_ids.len(),
            keywords = plan.keyword_ids.len(),
            "Discovery plan resolved"
        );

        let mut collected = Collected::default();
        let mut stages = Vec::new();

        for strategy in &self.strategies {
            if !strategy.should_run(&plan, collected.len()) {
                continue;
            }

            match strategy.fetch(self.provider.as_ref(), &plan).await {
                Ok(movies) => {
                    let added = collected.absorb(movies, strategy.provenance());
                    stages.push(strategy.name());
                    tracing::info!(
                        stage = strategy.name(),
                        added,
                        total = collected.len(),
                        "Discovery stage completed"
                    );
                }
                Err(e) if strategy.is_optional() => {
                    tracing::warn!(stage = strategy.name(), error = %e, "Discovery stage failed, continuing");
                }
                Err(e) => return Err(e),
            }
        }

        let mut scored: Vec<(u32, TmdbMovie, Provenance)> = collected
            .entries
            .into_iter()
            .map(|(movie, provenance)| (relevance_score(&movie, &plan), movie, provenance))
            .collect();

        scored.sort_by(|a, b| {
            b.0.cmp(&a.0).then_with(|| {
                Provenance::tie_rank(Some(a.2)).cmp(&Provenance::tie_rank(Some(b.2)))
            })
        });

        let movies = scored
            .into_iter()
            .map(|(score, movie, provenance)| format_movie(movie, &plan.emotions, score, provenance))
            .collect();

        Ok(DiscoveryOutcome { movies, stages })
    }
}

/// Lower-cased search words: punctuation stripped, words of fewer than three
/// characters dropped, duplicates removed
pub fn query_words(emotions: &EmotionSet) -> Vec<String> {
    let cleaned: String = emotions
        .joined()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let mut words = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() >= MIN_WORD_LEN {
            push_unique(&mut words, word.to_string());
        }
    }
    words
}

/// Heuristic relevance of a remote result to the plan, in [1, 99]
pub fn relevance_score(movie: &TmdbMovie, plan: &DiscoveryPlan) -> u32 {
    let mut score = BASE_SCORE;

    if let Some(popularity) = movie.popularity.filter(|p| *p != 0.0 && !p.is_nan()) {
        score += (popularity.max(1.0).log10() * 5.0)
            .round()
            .min(MAX_POPULARITY_BONUS);
    }

    if let Some(vote) = movie.vote_average.filter(|v| *v != 0.0 && !v.is_nan()) {
        score += (vote * 2.0).round();
    }

    if movie.genre_ids.iter().any(|g| plan.genre_ids.contains(g)) {
        score += GENRE_MATCH_BONUS;
    }

    if movie.keyword_ids.iter().any(|k| plan.keyword_ids.contains(k)) {
        score += KEYWORD_MATCH_BONUS;
    }

    let title = movie.title.as_deref().unwrap_or_default().to_lowercase();
    let overview = movie.overview.as_deref().unwrap_or_default().to_lowercase();
    let text_matches = plan
        .words
        .iter()
        .filter(|w| title.contains(w.as_str()) || overview.contains(w.as_str()))
        .count();
    score += (text_matches as f64 * TEXT_MATCH_BONUS).min(MAX_TEXT_MATCH_BONUS);

    score.round().clamp(1.0, 99.0) as u32
}

/// Shapes a remote result for display
pub fn format_movie(
    movie: TmdbMovie,
    emotions: &EmotionSet,
    score: u32,
    provenance: Provenance,
) -> DiscoveredMovie {
    let genre_names = genres::genre_names(&movie.genre_ids);

    let emotion_tags = emotions.iter().take(2).map(str::to_string);
    let genre_tags = genre_names.iter().take(2).map(|name| name.to_string());

    let mut tags: Vec<String> = Vec::new();
    for tag in emotion_tags.chain(genre_tags) {
        push_unique(&mut tags, tag);
    }

    let poster = movie
        .poster_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", POSTER_BASE_URL, p))
        .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string());

    let year = movie
        .release_date
        .as_deref()
        .and_then(|d| d.split('-').next())
        .filter(|y| !y.is_empty())
        .unwrap_or("UNKNOWN")
        .to_string();

    let pacing = if movie
        .genre_ids
        .iter()
        .any(|g| *g == genres::ACTION || *g == genres::THRILLER)
    {
        PacingLabel::Fast
    } else {
        PacingLabel::Steady
    };

    let weight = if movie
        .genre_ids
        .iter()
        .any(|g| *g == genres::DRAMA || *g == genres::HISTORY)
    {
        WeightLabel::Heavy
    } else {
        WeightLabel::Light
    };

    DiscoveredMovie {
        id: movie.id,
        title: movie.title.unwrap_or_default(),
        poster,
        year,
        match_score: score.min(99),
        tags,
        overview: movie.overview,
        rating: movie.vote_average,
        pacing,
        weight,
        provenance,
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
