use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    config::StorageBackend,
    dao::{
        roster_store::{MemoryRosterStore, RosterStore},
        storage::StorageError,
    },
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Open the configured backend. Connection parameters come from the environment.
pub async fn connect_backend(
    backend: StorageBackend,
) -> Result<Arc<dyn RosterStore>, StorageError> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryRosterStore::new())),
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use crate::dao::roster_store::mongodb::{MongoConfig, MongoRosterStore};

            let config = MongoConfig::from_env().await?;
            let store = MongoRosterStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            use crate::dao::roster_store::couchdb::{CouchConfig, CouchRosterStore};

            let config = CouchConfig::from_env()?;
            let store = CouchRosterStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => Err(StorageError::BackendDisabled {
            backend: other.as_str(),
        }),
    }
}

/// Reconnect to the storage backend and keep the shared state in degraded mode when it is unavailable.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RosterStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_roster_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => {
                            if state.is_degraded().await {
                                info!("storage healthy again; leaving degraded mode");
                                state.update_degraded(false).await;
                            }
                            sleep(HEALTH_POLL_INTERVAL).await;
                        }
                        Err(err) => {
                            warn!(error = %err, "storage health check failed");
                            if reconnect(&state, store.as_ref()).await {
                                state.update_degraded(false).await;
                                sleep(HEALTH_POLL_INTERVAL).await;
                                continue;
                            }
                            warn!("exhausted storage reconnect attempts; reconnecting from scratch");
                            state.clear_roster_store().await;
                            break;
                        }
                    }
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(StorageError::BackendDisabled { backend }) => {
                warn!(backend, "storage backend not compiled in; staying in degraded mode");
                return;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Retry the existing connection a few times, entering degraded mode on the first failure.
async fn reconnect(state: &SharedState, store: &dyn RosterStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn memory_backend_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let supervisor = tokio::spawn(run(state.clone(), || {
            connect_backend(StorageBackend::Memory)
        }));

        for _ in 0..50 {
            if !state.is_degraded().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!state.is_degraded().await);
        assert!(state.require_roster_store().await.is_ok());

        supervisor.abort();
    }

    #[tokio::test]
    async fn disabled_backend_stops_the_supervisor() {
        let state = AppState::new(AppConfig::default());
        run(state.clone(), || async {
            Err(StorageError::BackendDisabled { backend: "couch" })
        })
        .await;
        assert!(state.is_degraded().await);
    }
}
