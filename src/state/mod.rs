pub mod status;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::roster_store::RosterStore, error::ServiceError};

pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and per-game gates.
pub struct AppState {
    roster_store: RwLock<Option<Arc<dyn RosterStore>>>,
    degraded: watch::Sender<bool>,
    /// One gate per game: every mutating request holds it for its whole
    /// read-compute-write sequence.
    game_gates: DashMap<Uuid, Arc<Mutex<()>>>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            roster_store: RwLock::new(None),
            degraded: degraded_tx,
            game_gates: DashMap::new(),
            config,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current roster store, if one is installed.
    pub async fn roster_store(&self) -> Option<Arc<dyn RosterStore>> {
        let guard = self.roster_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the roster store or fail with [`ServiceError::Degraded`].
    pub async fn require_roster_store(&self) -> Result<Arc<dyn RosterStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.roster_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new roster store implementation and leave degraded mode.
    pub async fn set_roster_store(&self, store: Arc<dyn RosterStore>) {
        {
            let mut guard = self.roster_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current roster store and enter degraded mode.
    pub async fn clear_roster_store(&self) {
        {
            let mut guard = self.roster_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Acquire the unit-of-work gate of a game.
    ///
    /// The gate entry is pruned once its last holder or waiter lets go, so ids
    /// that never existed (or no longer do) do not accumulate.
    pub async fn lock_game(&self, game_id: Uuid) -> GameGate<'_> {
        // Built before awaiting so a cancelled waiter still prunes on drop.
        let mut held = GameGate {
            gates: &self.game_gates,
            game_id,
            guard: None,
        };
        let gate = self.game_gates.entry(game_id).or_default().clone();
        held.guard = Some(gate.lock_owned().await);
        held
    }

    /// Number of gates currently tracked.
    pub fn active_gates(&self) -> usize {
        self.game_gates.len()
    }
}

/// Held gate of one game. Releases the lock on drop.
pub struct GameGate<'a> {
    gates: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    game_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GameGate<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters hold their own clone of the mutex, so a count of one means
        // only the map still references it.
        self.gates
            .remove_if(&self.game_id, |_, gate| Arc::strong_count(gate) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::roster_store::MemoryRosterStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_roster_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        assert!(!state.is_degraded().await);
        assert!(state.require_roster_store().await.is_ok());

        state.clear_roster_store().await;
        assert!(state.is_degraded().await);
    }

    #[tokio::test]
    async fn game_gate_serializes_holders() {
        let state = AppState::new(AppConfig::default());
        let game_id = Uuid::new_v4();

        let guard = state.lock_game(game_id).await;
        let contender = {
            let state = state.clone();
            tokio::spawn(async move {
                let _guard = state.lock_game(game_id).await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert_eq!(state.active_gates(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_does_not_leak_its_gate() {
        let state = AppState::new(AppConfig::default());
        let game_id = Uuid::new_v4();

        let guard = state.lock_game(game_id).await;
        let waiter = {
            let state = state.clone();
            tokio::spawn(async move {
                let _guard = state.lock_game(game_id).await;
            })
        };
        tokio::task::yield_now().await;
        waiter.abort();
        let _ = waiter.await;

        drop(guard);
        assert_eq!(state.active_gates(), 0);
    }

    #[tokio::test]
    async fn released_gates_are_pruned() {
        let state = AppState::new(AppConfig::default());

        for _ in 0..100 {
            let _gate = state.lock_game(Uuid::new_v4()).await;
        }

        assert_eq!(state.active_gates(), 0);
    }
}
