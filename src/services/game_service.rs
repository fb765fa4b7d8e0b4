//! Game lifecycle: creation, listing, detail edits, visibility, organizer
//! status actions and deletion.

use std::{sync::Arc, time::SystemTime};

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{models::GameEntity, roster_store::RosterStore},
    dto::{
        game::{
            CreateGameRequest, GameDetail, GameSummary, ListGamesQuery, StatusChangeRequest,
            UpdateGameRequest, VisibilityRequest,
        },
        parse_timestamp,
        roster::RosterEntryView,
        validation::normalize_phone,
    },
    error::ServiceError,
    services::balancer::infer_team_count,
    state::{
        SharedState,
        status::{GameStatus, apply_status_action},
    },
};

/// Fetch a game or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_game(
    store: &Arc<dyn RosterStore>,
    id: Uuid,
) -> Result<GameEntity, ServiceError> {
    store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
}

/// Normalize an optional phone, rejecting values that cannot identify a contact.
pub(crate) fn sanitize_phone(raw: Option<&str>) -> Result<Option<String>, ServiceError> {
    match raw {
        Some(value) => normalize_phone(value)
            .map(Some)
            .ok_or_else(|| ServiceError::InvalidInput(format!("invalid phone `{value}`"))),
        None => Ok(None),
    }
}

/// Cancellation is terminal: a cancelled game only accepts reads and deletion.
fn ensure_not_cancelled(game: &GameEntity) -> Result<(), ServiceError> {
    if game.status == GameStatus::Cancelled {
        debug!(game_id = %game.id, "edit rejected on cancelled game");
        return Err(ServiceError::InvalidState(format!(
            "game `{}` is cancelled",
            game.id
        )));
    }
    Ok(())
}

fn require_timestamp(value: &str) -> Result<SystemTime, ServiceError> {
    parse_timestamp(value)
        .ok_or_else(|| ServiceError::InvalidInput(format!("invalid timestamp `{value}`")))
}

async fn summarize(
    store: &Arc<dyn RosterStore>,
    game: &GameEntity,
) -> Result<GameSummary, ServiceError> {
    let player_count = store.count_joins(game.id).await?;
    Ok(GameSummary::from_entity(game, player_count))
}

/// Organize a new game. It starts `open` with an empty roster.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    request.validate()?;
    let store = state.require_roster_store().await?;

    let capacity = u32::try_from(request.capacity)
        .ok()
        .filter(|capacity| *capacity >= 1)
        .ok_or_else(|| ServiceError::InvalidInput("capacity must be positive".into()))?;
    let now = SystemTime::now();

    let game = GameEntity {
        id: Uuid::new_v4(),
        sport: request.sport.trim().to_owned(),
        scheduled_at: require_timestamp(&request.scheduled_at)?,
        location: request.location.trim().to_owned(),
        skill_label: request.skill_label.trim().to_owned(),
        capacity,
        is_public: request.is_public,
        creator_phone: sanitize_phone(request.creator_phone.as_deref())?,
        status: GameStatus::Open,
        created_at: now,
        updated_at: now,
    };

    store.save_game(game.clone()).await?;
    info!(game_id = %game.id, sport = %game.sport, capacity, "game created");

    Ok(GameSummary::from_entity(&game, 0))
}

/// Public games, or every game of one organizer when `creator_phone` is given.
pub async fn list_games(
    state: &SharedState,
    query: ListGamesQuery,
) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_roster_store().await?;
    let creator_phone = sanitize_phone(query.creator_phone.as_deref())?;

    let games = store.list_games().await?;
    let mut summaries = Vec::new();
    for game in games.iter().filter(|game| match &creator_phone {
        Some(phone) => game.creator_phone.as_ref() == Some(phone),
        None => game.is_public,
    }) {
        summaries.push(summarize(&store, game).await?);
    }

    Ok(summaries)
}

/// Detail of a game with its roster and suggested team count.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameDetail, ServiceError> {
    let store = state.require_roster_store().await?;
    let game = load_game(&store, id).await?;
    let joins = store.list_joins(id).await?;

    Ok(GameDetail {
        game: GameSummary::from_entity(&game, joins.len()),
        players: joins.iter().map(RosterEntryView::from).collect(),
        suggested_team_count: infer_team_count(
            &game.sport,
            game.capacity,
            state.config().team_sizes(),
        ),
    })
}

/// Edit the details of a game. Capacity and status are left untouched.
pub async fn update_game(
    state: &SharedState,
    id: Uuid,
    request: UpdateGameRequest,
) -> Result<GameSummary, ServiceError> {
    request.validate()?;
    let store = state.require_roster_store().await?;
    let _gate = state.lock_game(id).await;

    let mut game = load_game(&store, id).await?;
    ensure_not_cancelled(&game)?;

    if let Some(sport) = request.sport {
        game.sport = sport.trim().to_owned();
    }
    if let Some(scheduled_at) = request.scheduled_at {
        game.scheduled_at = require_timestamp(&scheduled_at)?;
    }
    if let Some(location) = request.location {
        game.location = location.trim().to_owned();
    }
    if let Some(skill_label) = request.skill_label {
        game.skill_label = skill_label.trim().to_owned();
    }
    if let Some(is_public) = request.is_public {
        game.is_public = is_public;
    }
    if let Some(creator_phone) = request.creator_phone {
        game.creator_phone = sanitize_phone(creator_phone.as_deref())?;
    }
    game.updated_at = SystemTime::now();

    store.save_game(game.clone()).await?;
    debug!(game_id = %id, "game details updated");

    summarize(&store, &game).await
}

/// Show or hide a game from the public listing.
pub async fn set_visibility(
    state: &SharedState,
    id: Uuid,
    request: VisibilityRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.require_roster_store().await?;
    let _gate = state.lock_game(id).await;

    let mut game = load_game(&store, id).await?;
    ensure_not_cancelled(&game)?;
    game.is_public = request.is_public;
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;
    debug!(game_id = %id, is_public = game.is_public, "game visibility changed");

    summarize(&store, &game).await
}

/// Apply an organizer status action (lock, unlock, cancel).
pub async fn change_status(
    state: &SharedState,
    id: Uuid,
    request: StatusChangeRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.require_roster_store().await?;
    let _gate = state.lock_game(id).await;

    let mut game = load_game(&store, id).await?;
    let player_count = store.count_joins(id).await?;
    let previous = game.status;

    game.status = apply_status_action(previous, request.action, player_count, game.capacity)
        .inspect_err(|err| debug!(game_id = %id, error = %err, "status change rejected"))?;
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;

    info!(
        game_id = %id,
        from = previous.as_str(),
        to = game.status.as_str(),
        "game status changed"
    );

    Ok(GameSummary::from_entity(&game, player_count))
}

/// Delete a game together with its roster.
pub async fn delete_game(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_roster_store().await?;

    let _gate = state.lock_game(id).await;
    if !store.delete_game(id).await? {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    }
    info!(game_id = %id, "game deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        services::test_support::memory_state,
        state::{AppState, status::StatusAction},
    };

    fn request(
        sport: &str,
        capacity: i64,
        is_public: bool,
        phone: Option<&str>,
    ) -> CreateGameRequest {
        CreateGameRequest {
            sport: sport.into(),
            scheduled_at: "2026-05-02T18:30:00Z".into(),
            location: "Riverside pitch".into(),
            skill_label: "casual".into(),
            capacity,
            is_public,
            creator_phone: phone.map(Into::into),
        }
    }

    #[tokio::test]
    async fn created_game_starts_open_and_empty() {
        let state = memory_state().await;
        let game = create_game(&state, request("Soccer 5v5", 10, true, None))
            .await
            .unwrap();
        assert_eq!(game.status, GameStatus::Open);
        assert_eq!(game.player_count, 0);

        let detail = get_game(&state, game.id).await.unwrap();
        assert!(detail.players.is_empty());
        assert_eq!(detail.suggested_team_count, 2);
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected() {
        let state = memory_state().await;
        let err = create_game(&state, request("Soccer", 0, true, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn listing_filters_by_visibility_or_creator() {
        let state = memory_state().await;
        let public = create_game(&state, request("Soccer", 10, true, Some("+1 555 010 2030")))
            .await
            .unwrap();
        let private = create_game(&state, request("Padel", 4, false, Some("+15550102030")))
            .await
            .unwrap();
        create_game(&state, request("Hockey", 12, false, None))
            .await
            .unwrap();

        let listed = list_games(&state, ListGamesQuery::default()).await.unwrap();
        assert_eq!(
            listed.iter().map(|game| game.id).collect::<Vec<_>>(),
            vec![public.id]
        );

        let mine = list_games(
            &state,
            ListGamesQuery {
                creator_phone: Some("+1 (555) 010-2030".into()),
            },
        )
        .await
        .unwrap();
        let mut ids = mine.iter().map(|game| game.id).collect::<Vec<_>>();
        ids.sort();
        let mut expected = vec![public.id, private.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn update_keeps_capacity_and_clears_phone() {
        let state = memory_state().await;
        let game = create_game(&state, request("Soccer", 10, true, Some("+15550102030")))
            .await
            .unwrap();

        let updated = update_game(
            &state,
            game.id,
            UpdateGameRequest {
                location: Some("Harbor courts".into()),
                creator_phone: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.location, "Harbor courts");
        assert_eq!(updated.capacity, 10);

        let mine = list_games(
            &state,
            ListGamesQuery {
                creator_phone: Some("+15550102030".into()),
            },
        )
        .await
        .unwrap();
        assert!(mine.is_empty());
    }

    #[tokio::test]
    async fn cancelled_game_rejects_further_changes() {
        let state = memory_state().await;
        let game = create_game(&state, request("Soccer", 10, true, None))
            .await
            .unwrap();

        let cancelled = change_status(
            &state,
            game.id,
            StatusChangeRequest {
                action: StatusAction::Cancel,
            },
        )
        .await
        .unwrap();
        assert_eq!(cancelled.status, GameStatus::Cancelled);

        let err = change_status(
            &state,
            game.id,
            StatusChangeRequest {
                action: StatusAction::Unlock,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let err = update_game(
            &state,
            game.id,
            UpdateGameRequest {
                location: Some("Harbor courts".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let err = set_visibility(&state, game.id, VisibilityRequest { is_public: false })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let detail = get_game(&state, game.id).await.unwrap();
        assert_eq!(detail.game.location, "Riverside pitch");
        assert!(detail.game.is_public);
    }

    #[tokio::test]
    async fn delete_removes_game_and_reports_unknown_ids() {
        let state = memory_state().await;
        let game = create_game(&state, request("Soccer", 10, true, None))
            .await
            .unwrap();

        delete_game(&state, game.id).await.unwrap();
        assert!(matches!(
            get_game(&state, game.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            delete_game(&state, game.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_ids_leave_no_gate_behind() {
        let state = memory_state().await;

        for _ in 0..50 {
            let id = Uuid::new_v4();
            assert!(matches!(
                set_visibility(&state, id, VisibilityRequest { is_public: true }).await,
                Err(ServiceError::NotFound(_))
            ));
            assert!(matches!(
                delete_game(&state, id).await,
                Err(ServiceError::NotFound(_))
            ));
        }

        assert_eq!(state.active_gates(), 0);
    }

    #[tokio::test]
    async fn degraded_state_short_circuits() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            list_games(&state, ListGamesQuery::default()).await,
            Err(ServiceError::Degraded)
        ));
    }
}
