//! Store implementations.
//!
//! - [`memory`] - In-memory stores for tests and short-lived runs
//! - [`fs`] - Filesystem content store
//! - [`sqlite`] - SQLite record store (behind the `sqlite` feature)

pub mod fs;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use fs::FsContentStore;
pub use memory::{MemoryContentStore, MemoryStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
