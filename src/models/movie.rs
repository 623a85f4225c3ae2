use serde::Serialize;

use super::{CatalogItem, Provenance};

/// Coarse pacing label shown on discovery cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PacingLabel {
    Fast,
    Steady,
}

/// Coarse weight label shown on discovery cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeightLabel {
    Heavy,
    Light,
}

/// A remote discovery result, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredMovie {
    pub id: u64,
    pub title: String,
    pub poster: String,
    /// Release year, or "UNKNOWN"
    pub year: String,
    /// Relevance score in [1, 99]
    #[serde(rename = "match")]
    pub match_score: u32,
    pub tags: Vec<String>,
    pub overview: Option<String>,
    pub rating: Option<f64>,
    pub pacing: PacingLabel,
    pub weight: WeightLabel,
    pub provenance: Provenance,
}

/// Full detail record for one movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub rating: Option<f64>,
    pub overview: Option<String>,
}
