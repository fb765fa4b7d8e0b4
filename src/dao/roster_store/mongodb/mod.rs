//! MongoDB roster store: one `games` collection and one `joins` collection.

mod config;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoRosterStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable(format!("mongodb: {err}"), err)
    }
}
