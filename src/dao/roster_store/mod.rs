#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameEntity, JoinEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::MemoryRosterStore;

/// Abstraction over the persistence layer for games and their rosters.
///
/// Implementations only provide single-record atomicity; the service layer
/// serializes mutations per game.
pub trait RosterStore: Send + Sync {
    /// Insert or replace a game record.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a game up by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Every game, ordered by kick-off time.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Delete a game and every join attached to it. Returns `false` when the game was unknown.
    ///
    /// Removing the game record commits the deletion; joins that outlive it are unreachable.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Joins of a game ordered by join timestamp.
    fn list_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<JoinEntity>>>;
    /// Current headcount of a game.
    fn count_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<usize>>;
    /// Persist a new join.
    fn insert_join(&self, join: JoinEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Set or clear a skill level. Returns `false` when the join does not exist.
    fn update_join_skill(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        skill_level: Option<u8>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Returns `false` when the join does not exist.
    fn delete_join(&self, game_id: Uuid, player_id: Uuid)
    -> BoxFuture<'static, StorageResult<bool>>;
    /// Join of `phone` (already normalized) in the given game, if any.
    fn find_join_by_contact(
        &self,
        game_id: Uuid,
        phone: String,
    ) -> BoxFuture<'static, StorageResult<Option<JoinEntity>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
