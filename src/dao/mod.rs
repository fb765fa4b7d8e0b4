/// Database model definitions.
pub mod models;
/// Roster persistence behind a backend-agnostic trait.
pub mod roster_store;
/// Storage abstraction layer for database operations.
pub mod storage;
