use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::roster::{
        JoinRequest, JoinResponse, RosterChangeResponse, RosterEntryView, SkillUpdateRequest,
    },
    error::AppError,
    services::roster_service,
    state::SharedState,
};

/// Roster endpoints reached through a game's share link.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/players", get(list_roster).post(join_game))
        .route("/games/{id}/players/{player_id}", delete(remove_player))
        .route("/games/{id}/players/{player_id}/skill", put(update_skill))
}

/// Roster of a game in join order.
#[utoipa::path(
    get,
    path = "/games/{id}/players",
    tag = "roster",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Joined players", body = [RosterEntryView]),
        (status = 404, description = "Game not found")
    )
)]
pub async fn list_roster(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RosterEntryView>>, AppError> {
    Ok(Json(roster_service::list_roster(&state, id).await?))
}

/// Join a game.
#[utoipa::path(
    post,
    path = "/games/{id}/players",
    tag = "roster",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = JoinRequest,
    responses(
        (status = 201, description = "Player joined", body = JoinResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Duplicate contact, or game full, locked or cancelled")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<JoinRequest>>,
) -> Result<(StatusCode, Json<JoinResponse>), AppError> {
    let joined = roster_service::join_game(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(joined)))
}

/// Set or clear a player's skill level.
#[utoipa::path(
    put,
    path = "/games/{id}/players/{player_id}/skill",
    tag = "roster",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("player_id" = Uuid, Path, description = "Player identifier")
    ),
    request_body = SkillUpdateRequest,
    responses(
        (status = 200, description = "Skill updated", body = RosterEntryView),
        (status = 400, description = "Skill level outside 1..=5"),
        (status = 404, description = "Game or player not found")
    )
)]
pub async fn update_skill(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SkillUpdateRequest>,
) -> Result<Json<RosterEntryView>, AppError> {
    Ok(Json(
        roster_service::update_skill(&state, id, player_id, payload).await?,
    ))
}

/// Remove a player from a game.
#[utoipa::path(
    delete,
    path = "/games/{id}/players/{player_id}",
    tag = "roster",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("player_id" = Uuid, Path, description = "Player identifier")
    ),
    responses(
        (status = 200, description = "Player removed", body = RosterChangeResponse),
        (status = 404, description = "Game or player not found")
    )
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RosterChangeResponse>, AppError> {
    Ok(Json(
        roster_service::remove_player(&state, id, player_id).await?,
    ))
}
