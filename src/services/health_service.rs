use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Ping the roster store and report whether requests can be served.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage = state.config().storage().as_str();

    let status = match state.require_roster_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => HealthStatus::Ok,
            Err(err) => {
                warn!(storage, error = %err, "storage health check failed");
                HealthStatus::Degraded
            }
        },
        Err(_) => {
            warn!(storage, "storage unavailable (degraded mode)");
            HealthStatus::Degraded
        }
    };

    HealthResponse {
        status,
        storage: storage.to_owned(),
    }
}
