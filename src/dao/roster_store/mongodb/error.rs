use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to load roster of game `{game_id}`")]
    LoadRoster {
        game_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to write join of player `{player_id}` to game `{game_id}`")]
    SaveJoin {
        game_id: Uuid,
        player_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete join of player `{player_id}` from game `{game_id}`")]
    DeleteJoin {
        game_id: Uuid,
        player_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("stored document `{id}` has an invalid identifier")]
    InvalidId { id: String },
    #[error("stored join `{id}` has skill level {value} outside 1..=5")]
    InvalidSkillLevel { id: String, value: i32 },
}
