//! Join, skill and remove handlers.
//!
//! Every mutation runs under the game's gate: load the game, check, write the
//! join, recount, re-derive the status and persist the game record. When the
//! game record cannot be persisted the join write is undone before the error
//! is returned.

use std::{sync::Arc, time::SystemTime};

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        models::{GameEntity, JoinEntity, PlayerEntity},
        roster_store::RosterStore,
    },
    dto::roster::{
        JoinRequest, JoinResponse, RosterChangeResponse, RosterEntryView, SkillUpdateRequest,
    },
    error::{ConflictReason, ServiceError},
    services::game_service::{load_game, sanitize_phone},
    state::{
        SharedState,
        status::{GameStatus, derive_status},
    },
};

fn player_not_found(game_id: Uuid, player_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("player `{player_id}` has not joined game `{game_id}`"))
}

/// Recount the roster, re-derive the status and persist the game.
async fn refresh_status(
    store: &Arc<dyn RosterStore>,
    mut game: GameEntity,
) -> Result<RosterChangeResponse, ServiceError> {
    let player_count = store.count_joins(game.id).await?;
    let status = derive_status(game.status, player_count, game.capacity);
    if status != game.status {
        info!(
            game_id = %game.id,
            from = game.status.as_str(),
            to = status.as_str(),
            player_count,
            "game status derived"
        );
    }
    game.status = status;
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;

    Ok(RosterChangeResponse {
        game_id: game.id,
        status,
        player_count,
    })
}

/// Why `game` cannot take one more player, if anything.
fn join_rejection(game: &GameEntity, player_count: usize) -> Option<ConflictReason> {
    if player_count >= game.capacity as usize {
        return Some(ConflictReason::Full);
    }
    match game.status {
        GameStatus::Locked => Some(ConflictReason::Locked),
        GameStatus::Cancelled => Some(ConflictReason::Cancelled),
        GameStatus::Open | GameStatus::Full => None,
    }
}

/// Add a new player to a game.
pub async fn join_game(
    state: &SharedState,
    game_id: Uuid,
    request: JoinRequest,
) -> Result<JoinResponse, ServiceError> {
    request.validate()?;
    let phone = sanitize_phone(request.phone.as_deref())?;
    let store = state.require_roster_store().await?;
    let _gate = state.lock_game(game_id).await;

    let game = load_game(&store, game_id).await?;

    if let Some(ref phone) = phone {
        if store
            .find_join_by_contact(game_id, phone.clone())
            .await?
            .is_some()
        {
            debug!(%game_id, "join rejected: contact already on the roster");
            return Err(ConflictReason::DuplicateContact.into());
        }
    }

    let player_count = store.count_joins(game_id).await?;
    if let Some(reason) = join_rejection(&game, player_count) {
        debug!(%game_id, player_count, reason = %reason, "join rejected");
        return Err(reason.into());
    }

    let join = JoinEntity {
        game_id,
        player: PlayerEntity {
            id: Uuid::new_v4(),
            name: request.name.trim().to_owned(),
            phone,
        },
        skill_level: None,
        joined_at: SystemTime::now(),
    };
    store.insert_join(join.clone()).await?;

    let game = match refresh_status(&store, game).await {
        Ok(game) => game,
        Err(err) => {
            if let Err(undo) = store.delete_join(game_id, join.player.id).await {
                warn!(%game_id, player_id = %join.player.id, error = %undo, "failed to undo join");
            }
            return Err(err);
        }
    };
    info!(%game_id, player_id = %join.player.id, "player joined");

    Ok(JoinResponse {
        player: RosterEntryView::from(&join),
        game,
    })
}

/// Set or clear the skill level of a joined player.
pub async fn update_skill(
    state: &SharedState,
    game_id: Uuid,
    player_id: Uuid,
    request: SkillUpdateRequest,
) -> Result<RosterEntryView, ServiceError> {
    request.validate()?;
    let skill_level = request
        .skill_level
        .map(u8::try_from)
        .transpose()
        .map_err(|_| ServiceError::InvalidInput("skill level must be between 1 and 5".into()))?;
    let store = state.require_roster_store().await?;
    let _gate = state.lock_game(game_id).await;

    load_game(&store, game_id).await?;
    if !store
        .update_join_skill(game_id, player_id, skill_level)
        .await?
    {
        return Err(player_not_found(game_id, player_id));
    }
    debug!(%game_id, %player_id, ?skill_level, "skill level updated");

    store
        .list_joins(game_id)
        .await?
        .iter()
        .find(|join| join.player.id == player_id)
        .map(RosterEntryView::from)
        .ok_or_else(|| player_not_found(game_id, player_id))
}

/// Remove a player from a game, reopening it when it was full.
pub async fn remove_player(
    state: &SharedState,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<RosterChangeResponse, ServiceError> {
    let store = state.require_roster_store().await?;
    let _gate = state.lock_game(game_id).await;

    let game = load_game(&store, game_id).await?;
    let removed = store
        .list_joins(game_id)
        .await?
        .into_iter()
        .find(|join| join.player.id == player_id)
        .ok_or_else(|| player_not_found(game_id, player_id))?;
    if !store.delete_join(game_id, player_id).await? {
        return Err(player_not_found(game_id, player_id));
    }

    match refresh_status(&store, game).await {
        Ok(change) => {
            info!(%game_id, %player_id, "player removed");
            Ok(change)
        }
        Err(err) => {
            // Restoring with the original timestamp keeps the roster order.
            if let Err(undo) = store.insert_join(removed).await {
                warn!(%game_id, %player_id, error = %undo, "failed to restore removed join");
            }
            Err(err)
        }
    }
}

/// Roster of a game in join order.
pub async fn list_roster(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<RosterEntryView>, ServiceError> {
    let store = state.require_roster_store().await?;
    load_game(&store, game_id).await?;

    Ok(store
        .list_joins(game_id)
        .await?
        .iter()
        .map(RosterEntryView::from)
        .collect())
}
