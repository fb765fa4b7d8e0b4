use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{
        CreateGameRequest, GameDetail, GameSummary, ListGamesQuery, StatusChangeRequest,
        UpdateGameRequest, VisibilityRequest,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Game management endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/games/{id}/status", put(change_status))
        .route("/games/{id}/visibility", put(set_visibility))
}

/// List public games, or every game of one organizer.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    params(ListGamesQuery),
    responses(
        (status = 200, description = "Games ordered by kick-off time", body = [GameSummary]),
        (status = 400, description = "Invalid phone filter")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(game_service::list_games(&state, query).await?))
}

/// Organize a new game.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameSummary),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameSummary>), AppError> {
    let game = game_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Open a game from its share link.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game with its roster", body = GameDetail),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDetail>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Edit the details of a game. Capacity cannot change.
#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameSummary),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateGameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::update_game(&state, id, payload).await?))
}

/// Delete a game and its roster.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lock, unlock or cancel a game.
#[utoipa::path(
    put,
    path = "/games/{id}/status",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = GameSummary),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game is cancelled")
    )
)]
pub async fn change_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::change_status(&state, id, payload).await?))
}

/// Show or hide a game from the public listing.
#[utoipa::path(
    put,
    path = "/games/{id}/visibility",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = GameSummary),
        (status = 404, description = "Game not found")
    )
)]
pub async fn set_visibility(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VisibilityRequest>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::set_visibility(&state, id, payload).await?))
}
