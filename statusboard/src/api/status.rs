//! ステータス照会API

use axum::{
    extract::{Path, State},
    Json,
};
use statusboard_common::protocol::{LivenessResponse, StatusSummary};
use statusboard_common::types::ServiceStatus;

use crate::api::error::AppError;
use crate::error::MonitorError;
use crate::AppState;

/// GET /health
///
/// プロセス自体の生存確認。監視対象の状態には依存しない。
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        services: state.registry.len(),
    })
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusSummary> {
    Json(state.store.summary().await)
}

/// GET /api/services/{name}
///
/// まだ一度もチェックされていないサービスも404を返す。
pub async fn get_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceStatus>, AppError> {
    state
        .store
        .get(&name)
        .await
        .map(Json)
        .ok_or_else(|| MonitorError::ServiceNotFound(name).into())
}
