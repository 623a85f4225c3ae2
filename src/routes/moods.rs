use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;

/// Mood vocabulary and the pacing/weight each mood implies
pub async fn list_moods(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "moods": state.vocabulary.as_ref(),
        "traits": state.traits.as_ref(),
    }))
}
