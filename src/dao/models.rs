use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::status::GameStatus;

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game, also used as the share-link token.
    pub id: Uuid,
    /// Free-text sport label (e.g. "Soccer 5v5").
    pub sport: String,
    /// Kick-off time.
    pub scheduled_at: SystemTime,
    /// Free-text venue description.
    pub location: String,
    /// Expected level of play shown to players ("casual", "competitive", ...).
    pub skill_label: String,
    /// Maximum number of joined players, fixed at creation.
    pub capacity: u32,
    /// Whether the game shows up in the public listing.
    pub is_public: bool,
    /// Organizer phone, only used to filter "my games".
    pub creator_phone: Option<String>,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last time the game record was written.
    pub updated_at: SystemTime,
}

/// Player created when someone joins a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable identifier for the player.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Normalized contact phone, if provided.
    pub phone: Option<String>,
}

/// Association between a game and one of its players.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinEntity {
    /// Game the player joined.
    pub game_id: Uuid,
    /// Joined player.
    pub player: PlayerEntity,
    /// Self-reported or organizer-assigned level in `1..=5`.
    pub skill_level: Option<u8>,
    /// When the player joined; defines roster order.
    pub joined_at: SystemTime,
}
