/// Skill-balancing team splitter.
pub mod balancer;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle and organizer controls.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Join, skill and remove handlers.
pub mod roster_service;
/// Storage connection supervisor with degraded mode.
pub mod storage_supervisor;
/// Team proposals over a game's roster.
pub mod team_service;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use futures::future::BoxFuture;
    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dao::{
            models::{GameEntity, JoinEntity},
            roster_store::{MemoryRosterStore, RosterStore},
            storage::{StorageError, StorageResult},
        },
        dto::game::CreateGameRequest,
        services::game_service,
        state::{AppState, SharedState},
    };

    /// Shared state backed by a fresh in-memory store.
    pub async fn memory_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        state
    }

    /// Create a public soccer game with the given capacity.
    pub async fn create_game(state: &SharedState, capacity: u32) -> Uuid {
        game_service::create_game(
            state,
            CreateGameRequest {
                sport: "Soccer".into(),
                scheduled_at: "2026-05-02T18:30:00Z".into(),
                location: "Riverside pitch".into(),
                skill_label: "casual".into(),
                capacity: i64::from(capacity),
                is_public: true,
                creator_phone: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    /// Memory store whose game saves can be switched to fail.
    #[derive(Default)]
    pub struct FailingSaves {
        inner: MemoryRosterStore,
        failing: AtomicBool,
    }

    impl FailingSaves {
        /// Shared state backed by a new switchable store.
        pub async fn state() -> (SharedState, Arc<Self>) {
            let store = Arc::new(Self::default());
            let state = AppState::new(AppConfig::default());
            state.set_roster_store(store.clone()).await;
            (state, store)
        }

        pub fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl RosterStore for FailingSaves {
        fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
            if self.failing.load(Ordering::SeqCst) {
                return Box::pin(async {
                    Err(StorageError::unavailable(
                        "memory: save game".into(),
                        std::io::Error::other("write refused"),
                    ))
                });
            }
            self.inner.save_game(game)
        }

        fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
            self.inner.find_game(id)
        }

        fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
            self.inner.list_games()
        }

        fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.delete_game(id)
        }

        fn list_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<JoinEntity>>> {
            self.inner.list_joins(game_id)
        }

        fn count_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<usize>> {
            self.inner.count_joins(game_id)
        }

        fn insert_join(&self, join: JoinEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.insert_join(join)
        }

        fn update_join_skill(
            &self,
            game_id: Uuid,
            player_id: Uuid,
            skill_level: Option<u8>,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.update_join_skill(game_id, player_id, skill_level)
        }

        fn delete_join(
            &self,
            game_id: Uuid,
            player_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.delete_join(game_id, player_id)
        }

        fn find_join_by_contact(
            &self,
            game_id: Uuid,
            phone: String,
        ) -> BoxFuture<'static, StorageResult<Option<JoinEntity>>> {
            self.inner.find_join_by_contact(game_id, phone)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }
}
