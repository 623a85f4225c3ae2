use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetail, Provenance},
    services::{
        details::fetch_movie_detail,
        events::AppEvent,
        report::{render_report, report_filename},
    },
};

use super::AppState;

/// Full detail for one movie
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<MovieDetail>> {
    let detail = lookup_detail(&state, movie_id).await?;
    Ok(Json(detail))
}

/// Markdown intelligence report, served as a download
pub async fn get_report(
    State(state): State<AppState>,
    Path(movie_id): Path<u64>,
) -> AppResult<impl IntoResponse> {
    let detail = lookup_detail(&state, movie_id).await?;
    let report = render_report(&detail, Utc::now());

    state
        .events
        .publish(AppEvent::ReportGenerated { movie_id });

    let headers = [
        (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report_filename(movie_id)),
        ),
    ];

    Ok((headers, report))
}

/// Remote detail, or the bundled entry when no TMDB key is configured
async fn lookup_detail(state: &AppState, movie_id: u64) -> AppResult<MovieDetail> {
    match fetch_movie_detail(state.provider.as_ref(), movie_id).await {
        Ok(detail) => Ok(detail),
        Err(AppError::Configuration(msg)) => match state.bundled_item(movie_id) {
            Some(item) => {
                tracing::debug!(movie_id, "Serving bundled entry without remote details");
                let mut item = item.clone();
                item.provenance = Some(Provenance::Bundled);
                Ok(MovieDetail {
                    item,
                    rating: None,
                    overview: None,
                })
            }
            None => Err(AppError::Configuration(msg)),
        },
        Err(e) => {
            state.events.publish(AppEvent::LookupFailed {
                operation: "movie_details",
                message: e.to_string(),
            });
            Err(e)
        }
    }
}
