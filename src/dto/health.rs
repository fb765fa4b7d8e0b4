use serde::Serialize;
use utoipa::ToSchema;

/// Whether the roster store is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Payload of `/healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Configured storage backend (`memory`, `mongo` or `couch`).
    pub storage: String,
}
