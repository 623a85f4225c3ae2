use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EmotionSet, ScoredItem},
    services::{events::AppEvent, matcher::Matcher},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub emotions: Vec<String>,
    pub limit: Option<usize>,
    pub session_id: Option<Uuid>,
}

/// `default` when no emotions were given and the catalog order was kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    Ranked,
    Default,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub emotions: EmotionSet,
    pub mode: RankingMode,
    pub results: Vec<ScoredItem>,
}

/// Ranks the bundled catalog against the given emotions
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let emotions = EmotionSet::from_raw(&request.emotions);

    let matcher = Matcher::new(&state.vocabulary, &state.traits);
    let results = matcher.rank_scored(emotions.as_slice(), &state.catalog, request.limit);

    let mode = if emotions.is_empty() {
        RankingMode::Default
    } else {
        RankingMode::Ranked
    };

    if let Some(session_id) = request.session_id {
        if let Err(e) = state.remember_selection(session_id, &emotions).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to record selection");
        }
    }

    tracing::info!(
        emotions = emotions.len(),
        results = results.len(),
        mode = ?mode,
        "Recommendations ranked"
    );

    state.events.publish(AppEvent::RecommendationsServed {
        emotions: emotions.clone(),
        count: results.len(),
    });

    Ok(Json(RecommendationResponse {
        emotions,
        mode,
        results,
    }))
}
