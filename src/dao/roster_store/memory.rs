//! Process-local roster store. Used by default and by the test suites.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::{
    models::{GameEntity, JoinEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

/// In-memory [`RosterStore`] keeping games and rosters in concurrent maps.
#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: DashMap<Uuid, GameEntity>,
    /// Rosters keyed by game, then by player in insertion order.
    joins: DashMap<Uuid, IndexMap<Uuid, JoinEntity>>,
}

impl MemoryRosterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryRosterStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.games.get(&id).map(|game| game.clone())) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut games = store
                .inner
                .games
                .iter()
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>();
            games.sort_by_key(|game| game.scheduled_at);
            Ok(games)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let removed = store.inner.games.remove(&id).is_some();
            store.inner.joins.remove(&id);
            Ok(removed)
        })
    }

    fn list_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<JoinEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut joins = store
                .inner
                .joins
                .get(&game_id)
                .map(|roster| roster.values().cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            joins.sort_by_key(|join| join.joined_at);
            Ok(joins)
        })
    }

    fn count_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .joins
                .get(&game_id)
                .map(|roster| roster.len())
                .unwrap_or(0))
        })
    }

    fn insert_join(&self, join: JoinEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .joins
                .entry(join.game_id)
                .or_default()
                .insert(join.player.id, join);
            Ok(())
        })
    }

    fn update_join_skill(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        skill_level: Option<u8>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let Some(mut roster) = store.inner.joins.get_mut(&game_id) else {
                return Ok(false);
            };
            let Some(join) = roster.get_mut(&player_id) else {
                return Ok(false);
            };
            join.skill_level = skill_level;
            Ok(true)
        })
    }

    fn delete_join(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let Some(mut roster) = store.inner.joins.get_mut(&game_id) else {
                return Ok(false);
            };
            Ok(roster.shift_remove(&player_id).is_some())
        })
    }

    fn find_join_by_contact(
        &self,
        game_id: Uuid,
        phone: String,
    ) -> BoxFuture<'static, StorageResult<Option<JoinEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store.inner.joins.get(&game_id).and_then(|roster| {
                roster
                    .values()
                    .find(|join| join.player.phone.as_deref() == Some(phone.as_str()))
                    .cloned()
            }))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
