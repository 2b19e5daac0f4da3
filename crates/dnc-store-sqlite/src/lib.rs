//! SQLite backend for the DNC plan store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Queries are plain synchronous functions
//! over a `rusqlite::Connection`, grouped by concern, which the store runs
//! inside `Connection::call`.

mod encode;
mod intake;
mod lookup;
mod plan;
mod report;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
