//! Backend-agnostic storage failures.

use std::error::Error;
use thiserror::Error;

/// Result alias for roster store operations.
pub type StorageResult<T> = Result<T, StorageError>;

type BoxedCause = Box<dyn Error + Send + Sync>;

/// Failure reported by a roster store, whatever database sits behind it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request; `message` names the backend and operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: BoxedCause,
    },
    /// Selected backend was not compiled into this binary.
    #[error("storage backend `{backend}` is not enabled in this build")]
    BackendDisabled { backend: &'static str },
}

impl StorageError {
    /// Wrap a backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_keeps_its_cause() {
        let err = StorageError::unavailable(
            "memory: save game".into(),
            std::io::Error::other("disk full"),
        );
        assert_eq!(err.to_string(), "storage unavailable: memory: save game");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk full"));
    }
}
