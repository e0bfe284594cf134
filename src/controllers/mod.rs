pub mod seats;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().merge(seats::routes())
}

/// Полный роутер приложения со state и трассировкой.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Coach Reservation API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .merge(routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
