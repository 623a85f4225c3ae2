use serde::{Deserialize, Serialize};

/// Pacing classification of a work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    Slow,
    Medium,
    Fast,
}

impl Pacing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pacing::Slow => "slow",
            Pacing::Medium => "medium",
            Pacing::Fast => "fast",
        }
    }
}

/// Emotional weight classification of a work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    Light,
    Medium,
    Heavy,
}

impl Weight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weight::Light => "light",
            Weight::Medium => "medium",
            Weight::Heavy => "heavy",
        }
    }
}

/// Which retrieval stage produced a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Shipped with the service
    Bundled,
    /// Combined keyword/genre discovery query
    Discover,
    /// Free-text title search
    Search,
    /// Genre-only discovery retry
    Fallback,
    /// Weekly trending list
    Trending,
}

impl Provenance {
    /// Primary sources win exact score ties against secondary ones
    pub fn is_primary(&self) -> bool {
        matches!(self, Provenance::Bundled | Provenance::Discover)
    }

    /// Sort key for tie-breaking. Untagged entries rank with primary sources.
    pub fn tie_rank(provenance: Option<Provenance>) -> u8 {
        match provenance {
            Some(p) if !p.is_primary() => 1,
            _ => 0,
        }
    }
}

/// A candidate work the matcher can rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster: String,
    /// YouTube video key of the trailer
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub pacing: Option<Pacing>,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Runtime in minutes
    #[serde(default)]
    pub runtime: u32,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

/// A catalog item together with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub score: f64,
}
