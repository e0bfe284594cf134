use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::models::Seat;
use crate::services::render_matrix;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(get_seats))
        .route("/reserve", post(reserve_seats))
        .route("/reset", post(reset_seats))
}

/* ---------- SEATS ---------- */

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SeatsView {
    #[default]
    Matrix,
    List,
}

#[derive(Debug, Deserialize)]
struct SeatsQuery {
    #[serde(default)]
    view: SeatsView,
}

// GET /seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let seats = state.allocator.cached_seats().await?;

    let body = match params.view {
        SeatsView::Matrix => {
            let matrix = render_matrix(&seats, state.allocator.layout());
            json!({ "seatMatrix": matrix })
        }
        SeatsView::List => json!({ "seats": seats }),
    };

    Ok((StatusCode::OK, Json(body)))
}

/* ---------- RESERVE ---------- */

// POST /reserve
#[derive(Debug, Deserialize, Validate)]
pub struct ReserveRequest {
    #[serde(rename = "numSeatsToReserve")]
    #[validate(range(min = 1, message = "numSeatsToReserve must be at least 1"))]
    pub num_seats_to_reserve: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReserveResponse {
    message: &'static str,
    reserved_seats: Vec<Seat>,
    seats: Vec<Seat>,
}

async fn reserve_seats(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReserveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("reserve: rejected body: {}", e.body_text());
        ApiError::bad_request("Body must be {\"numSeatsToReserve\": <positive integer>}")
    })?;
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let reserved_seats = match state.allocator.reserve(req.num_seats_to_reserve).await {
        Ok(seats) => seats,
        Err(e) => {
            tracing::info!("reserve {} seats failed: {}", req.num_seats_to_reserve, e);
            return Err(e.into());
        }
    };

    let seats = state.allocator.seats().await?;

    Ok((
        StatusCode::OK,
        Json(ReserveResponse {
            message: "Seats reserved successfully",
            reserved_seats,
            seats,
        }),
    ))
}

/* ---------- RESET ---------- */

// POST /reset
async fn reset_seats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    tracing::warn!("RESET: clearing all seats");

    let updated = state.allocator.reset_all().await?;
    let seats = state.allocator.seats().await?;

    tracing::info!("RESET: {} seats set to empty", updated);

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Seats reset successfully",
            "seats": seats,
        })),
    ))
}
