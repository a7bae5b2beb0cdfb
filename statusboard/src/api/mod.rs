//! HTTP/WebSocket surface
//!
//! Router construction for the dashboard page, the query API and the live
//! update socket.

pub mod error;
pub mod live_ws;
pub mod status;

use axum::{response::Html, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Build the application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(status::liveness))
        .route("/api/status", get(status::get_status))
        .route("/api/services/{name}", get(status::get_service))
        .route("/ws", get(live_ws::live_ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /
async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
