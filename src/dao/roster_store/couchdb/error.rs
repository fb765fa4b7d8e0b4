//! Error types of the CouchDB roster store.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB roster operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures talking to CouchDB. `path` is the database or document the
/// request targeted.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to build CouchDB HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer (connection refused, timeout, ...).
    #[error("CouchDB request to `{path}` failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} for `{path}`")]
    UnexpectedStatus { path: String, status: StatusCode },
    #[error("CouchDB response for `{path}` is not valid JSON")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The JSON was fine but does not describe a game or join.
    #[error("CouchDB document under `{path}` does not match the roster schema")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// Updates and deletes need the current `_rev`.
    #[error("CouchDB document `{doc_id}` has no revision")]
    MissingRevision { doc_id: String },
    #[error("invalid document ID `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}
