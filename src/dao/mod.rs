/// Database model definitions.
pub mod models;
/// Room persistence trait and its storage engines.
pub mod room_store;
/// Storage abstraction layer for database operations.
pub mod storage;
