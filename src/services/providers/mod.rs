/// Movie metadata provider abstraction
///
/// The discovery pipeline and detail lookup only talk to this trait, so the
/// remote catalog (TMDB today) can be swapped or mocked without touching the
/// ranking code.
use crate::{
    error::AppResult,
    models::{TmdbMovie, TmdbMovieDetails, TmdbVideo},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// How multiple genre ids are combined in a discover query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreMatch {
    /// Every genre must be present (`,`-joined)
    All,
    /// Any genre may be present (`|`-joined)
    #[default]
    Any,
}

/// Filters for a discover query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoverParams {
    pub keyword_ids: Vec<u64>,
    pub genre_ids: Vec<u32>,
    pub genre_match: GenreMatch,
}

impl DiscoverParams {
    /// Keywords OR-ed together; genres AND-ed when keywords narrow the
    /// query already, OR-ed otherwise
    pub fn combined(keyword_ids: Vec<u64>, genre_ids: Vec<u32>) -> Self {
        let genre_match = if keyword_ids.is_empty() {
            GenreMatch::Any
        } else {
            GenreMatch::All
        };

        Self {
            keyword_ids,
            genre_ids,
            genre_match,
        }
    }

    /// Any of the genres, no keyword filter
    pub fn genres_only(genre_ids: Vec<u32>) -> Self {
        Self {
            keyword_ids: Vec::new(),
            genre_ids,
            genre_match: GenreMatch::Any,
        }
    }

    /// Query string pairs for `/discover/movie`, excluding credentials
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("language", "en-US".to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "false".to_string()),
            ("page", "1".to_string()),
            ("vote_count.gte", "10".to_string()),
        ];

        if !self.keyword_ids.is_empty() {
            pairs.push(("with_keywords", join_ids(&self.keyword_ids, "|")));
        }

        if !self.genre_ids.is_empty() {
            let joiner = match self.genre_match {
                GenreMatch::All => ",",
                GenreMatch::Any => "|",
            };
            pairs.push(("with_genres", join_ids(&self.genre_ids, joiner)));
        }

        pairs
    }

    /// Stable textual form, used as a cache key
    pub fn fingerprint(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn join_ids<T: ToString>(ids: &[T], joiner: &str) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(joiner)
}

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Id of the best keyword match for `word`, if any
    async fn search_keyword(&self, word: &str) -> AppResult<Option<u64>>;

    /// Popular movies matching the keyword/genre filters
    async fn discover(&self, params: &DiscoverParams) -> AppResult<Vec<TmdbMovie>>;

    /// Free-text title search
    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbMovie>>;

    /// This week's trending movies
    async fn trending(&self) -> AppResult<Vec<TmdbMovie>>;

    async fn movie_details(&self, movie_id: u64) -> AppResult<TmdbMovieDetails>;

    async fn movie_videos(&self, movie_id: u64) -> AppResult<Vec<TmdbVideo>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
