//! CouchDB roster store: games and joins share one database, told apart by
//! document id prefix.

mod config;
mod error;
mod models;
mod store;

pub use config::{CouchConfig, CouchCredentials};
pub use error::CouchDaoError;
pub use store::CouchRosterStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        StorageError::unavailable(format!("couchdb: {err}"), err)
    }
}
