use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{DiscoveredMovie, EmotionSet},
    services::{discovery::DiscoveryPipeline, events::AppEvent},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    #[serde(default)]
    pub emotions: Vec<String>,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub emotions: EmotionSet,
    pub results: Vec<DiscoveredMovie>,
}

/// Finds remote movies for free-text emotions
pub async fn discover(
    State(state): State<AppState>,
    Json(request): Json<DiscoverRequest>,
) -> AppResult<Json<DiscoverResponse>> {
    let emotions = EmotionSet::from_raw(&request.emotions);
    if emotions.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one emotion is required".to_string(),
        ));
    }

    if let Some(session_id) = request.session_id {
        if let Err(e) = state.remember_selection(session_id, &emotions).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to record selection");
        }
    }

    let pipeline = DiscoveryPipeline::new(Arc::clone(&state.provider));
    let outcome = match pipeline.discover(&emotions).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Discovery failed");
            state.events.publish(AppEvent::LookupFailed {
                operation: "discover",
                message: e.to_string(),
            });
            return Err(e);
        }
    };

    state.events.publish(AppEvent::DiscoveryCompleted {
        emotions: emotions.clone(),
        count: outcome.movies.len(),
        stages: outcome.stages,
    });

    Ok(Json(DiscoverResponse {
        emotions,
        results: outcome.movies,
    }))
}
