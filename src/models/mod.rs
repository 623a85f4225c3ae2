use serde::{Deserialize, Deserializer, Serialize};

pub mod catalog;
pub mod emotion;
pub mod movie;
pub mod session;

pub use catalog::{CatalogItem, Pacing, Provenance, ScoredItem, Weight};
pub use emotion::{EmotionSet, MoodVocabulary, TraitMap, TraitProfile};
pub use movie::{DiscoveredMovie, MovieDetail, PacingLabel, WeightLabel};
pub use session::{HistoryEntry, SessionState};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Reads an explicit `null` as the field's default, like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Paged list envelope used by the TMDB list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Movie summary as returned by discover, search and trending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keyword_ids: Vec<u64>,
}

/// Keyword search result
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbKeyword {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbCountry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub iso_3166_1: String,
}

/// API response from GET /movie/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<TmdbGenre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_countries: Vec<TmdbCountry>,
}

/// Entry of GET /movie/{id}/videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbVideo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub site: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub video_type: String,
}
