use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod discover;
pub mod moods;
pub mod movies;
pub mod recommendations;
pub mod sessions;
mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/moods", get(moods::list_moods))
        .route("/recommendations", post(recommendations::recommend))
        .route("/discover", post(discover::discover))
        // Movies
        .route("/movies/:movie_id", get(movies::get_movie))
        .route("/movies/:movie_id/report", get(movies::get_report))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/:session_id", get(sessions::get_session))
        .route("/sessions/:session_id/selection", put(sessions::record_selection))
        .route("/sessions/:session_id/watchlist", get(sessions::get_watchlist))
        .route(
            "/sessions/:session_id/watchlist/:movie_id",
            post(sessions::toggle_watchlist),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
