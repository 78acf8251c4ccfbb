//! SQLite-backed persistence.

pub mod message;
pub mod pool;

pub use message::SqliteMessageRepository;
pub use pool::DatabasePool;
