//! Game status derivation.
//!
//! `open` and `full` are recomputed from the headcount after every roster
//! change. `locked` and `cancelled` are sticky: only an explicit organizer
//! action moves a game out of `locked`, and nothing leaves `cancelled`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Spots are still available.
    Open,
    /// Headcount reached capacity.
    Full,
    /// Organizer closed the roster; joins are rejected.
    Locked,
    /// Game will not take place. Permanent.
    Cancelled,
}

impl GameStatus {
    /// Whether automatic recomputation must leave this status untouched.
    pub fn is_sticky(self) -> bool {
        matches!(self, GameStatus::Locked | GameStatus::Cancelled)
    }

    /// Lowercase label used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Open => "open",
            GameStatus::Full => "full",
            GameStatus::Locked => "locked",
            GameStatus::Cancelled => "cancelled",
        }
    }
}

/// Explicit status change requested by an organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    /// Freeze the roster.
    Lock,
    /// Release a lock and fall back to the headcount-derived status.
    Unlock,
    /// Call the game off for good.
    Cancel,
}

/// Rejected organizer status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action:?} a game that is {}", from.as_str())]
pub struct InvalidStatusChange {
    pub from: GameStatus,
    pub action: StatusAction,
}

/// Recompute the status of a game after its headcount changed.
pub fn derive_status(current: GameStatus, joined_count: usize, capacity: u32) -> GameStatus {
    if current.is_sticky() {
        return current;
    }

    if joined_count >= capacity as usize {
        GameStatus::Full
    } else {
        GameStatus::Open
    }
}

/// Resolve the status produced by an organizer action.
pub fn apply_status_action(
    current: GameStatus,
    action: StatusAction,
    joined_count: usize,
    capacity: u32,
) -> Result<GameStatus, InvalidStatusChange> {
    if current == GameStatus::Cancelled {
        return Err(InvalidStatusChange {
            from: current,
            action,
        });
    }

    let next = match action {
        StatusAction::Lock => GameStatus::Locked,
        // Drop the lock first so the deriver is allowed to recompute.
        StatusAction::Unlock => derive_status(GameStatus::Open, joined_count, capacity),
        StatusAction::Cancel => GameStatus::Cancelled,
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_game_reaching_capacity_becomes_full() {
        assert_eq!(derive_status(GameStatus::Open, 10, 10), GameStatus::Full);
    }

    #[test]
    fn full_game_losing_a_player_reopens() {
        assert_eq!(derive_status(GameStatus::Full, 9, 10), GameStatus::Open);
    }

    #[test]
    fn locked_is_sticky_even_when_empty() {
        assert_eq!(derive_status(GameStatus::Locked, 0, 10), GameStatus::Locked);
    }

    #[test]
    fn cancelled_is_sticky_even_when_full() {
        assert_eq!(
            derive_status(GameStatus::Cancelled, 10, 10),
            GameStatus::Cancelled
        );
    }

    #[test]
    fn overfilled_counts_as_full() {
        assert_eq!(derive_status(GameStatus::Open, 12, 10), GameStatus::Full);
    }

    #[test]
    fn lock_then_unlock_restores_derived_status() {
        let locked = apply_status_action(GameStatus::Open, StatusAction::Lock, 4, 4).unwrap();
        assert_eq!(locked, GameStatus::Locked);

        let unlocked = apply_status_action(locked, StatusAction::Unlock, 4, 4).unwrap();
        assert_eq!(unlocked, GameStatus::Full);

        let unlocked = apply_status_action(locked, StatusAction::Unlock, 3, 4).unwrap();
        assert_eq!(unlocked, GameStatus::Open);
    }

    #[test]
    fn unlock_on_unlocked_game_is_idempotent() {
        assert_eq!(
            apply_status_action(GameStatus::Open, StatusAction::Unlock, 1, 4).unwrap(),
            GameStatus::Open
        );
    }

    #[test]
    fn cancelled_game_rejects_every_action() {
        for action in [StatusAction::Lock, StatusAction::Unlock, StatusAction::Cancel] {
            let err = apply_status_action(GameStatus::Cancelled, action, 0, 4).unwrap_err();
            assert_eq!(err.from, GameStatus::Cancelled);
            assert_eq!(err.action, action);
        }
    }

    #[test]
    fn locked_game_can_be_cancelled() {
        assert_eq!(
            apply_status_action(GameStatus::Locked, StatusAction::Cancel, 2, 4).unwrap(),
            GameStatus::Cancelled
        );
    }
}
