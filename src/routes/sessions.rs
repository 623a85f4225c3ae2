use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EmotionSet, SessionState},
    services::{events::AppEvent, session},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub emotions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub session_id: Uuid,
    pub watchlist: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistToggle {
    pub movie_id: u64,
    pub in_watchlist: bool,
}

pub async fn create_session(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<SessionCreated>)> {
    let session_id = Uuid::new_v4();
    state
        .sessions
        .save(session_id, &SessionState::default())
        .await?;

    tracing::info!(session_id = %session_id, backend = state.sessions.name(), "Session created");
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionState>> {
    let session = state.sessions.load(session_id).await?;
    Ok(Json(session))
}

pub async fn record_selection(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> AppResult<Json<SessionState>> {
    let emotions = EmotionSet::from_raw(&request.emotions);
    state.remember_selection(session_id, &emotions).await?;

    let session = state.sessions.load(session_id).await?;
    Ok(Json(session))
}

pub async fn get_watchlist(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<WatchlistResponse>> {
    let session = state.sessions.load(session_id).await?;
    Ok(Json(WatchlistResponse {
        session_id,
        watchlist: session.watchlist,
    }))
}

pub async fn toggle_watchlist(
    State(state): State<AppState>,
    Path((session_id, movie_id)): Path<(Uuid, u64)>,
) -> AppResult<Json<WatchlistToggle>> {
    let in_watchlist =
        session::toggle_watchlist(state.sessions.as_ref(), session_id, movie_id).await?;

    state.events.publish(AppEvent::WatchlistToggled {
        session_id,
        movie_id,
        in_watchlist,
    });

    Ok(Json(WatchlistToggle {
        movie_id,
        in_watchlist,
    }))
}
