use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::teams::{MovePlayerRequest, TeamSplitRequest, TeamSplitResponse},
    error::AppError,
    services::team_service,
    state::SharedState,
};

/// Team proposal endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/teams", post(split_teams))
        .route("/games/{id}/teams/move", post(move_player))
}

/// Propose balanced teams. Calling again reshuffles.
#[utoipa::path(
    post,
    path = "/games/{id}/teams",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = TeamSplitRequest,
    responses(
        (status = 200, description = "Proposed teams", body = TeamSplitResponse),
        (status = 400, description = "Team count outside 2..=64"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn split_teams(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeamSplitRequest>,
) -> Result<Json<TeamSplitResponse>, AppError> {
    Ok(Json(team_service::split_teams(&state, id, payload).await?))
}

/// Move one player of a proposed split to another team.
#[utoipa::path(
    post,
    path = "/games/{id}/teams/move",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = MovePlayerRequest,
    responses(
        (status = 200, description = "Adjusted teams", body = TeamSplitResponse),
        (status = 400, description = "Teams do not match the roster"),
        (status = 404, description = "Game or player not found")
    )
)]
pub async fn move_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovePlayerRequest>,
) -> Result<Json<TeamSplitResponse>, AppError> {
    Ok(Json(team_service::move_player(&state, id, payload).await?))
}
