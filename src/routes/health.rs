use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::health::HealthResponse, services::health_service, state::SharedState};

/// Liveness plus storage reachability.
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses((status = 200, description = "Current health, `degraded` while storage is down", body = HealthResponse))
)]
pub async fn healthcheck(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(health_service::health_status(&state).await)
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/healthcheck", get(healthcheck))
}
