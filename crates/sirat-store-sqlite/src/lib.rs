//! SQLite backend for the Sirat procedure store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod seed;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use seed::reference_procedures;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
