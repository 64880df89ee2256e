//! # storage-adapters
//!
//! Implementations of the `ComplaintStore` port. The in-memory store is always
//! available; the SQLite store sits behind the `db-sqlite` feature.

pub mod memory;
pub mod select;
#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use memory::InMemoryComplaintStore;
pub use select::open_store;
#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteComplaintStore;
