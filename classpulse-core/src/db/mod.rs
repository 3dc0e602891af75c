//! Database layer for classpulse
//!
//! SQLite storage for the activity log with:
//! - Schema migrations
//! - Filtered record queries implementing [`crate::store::RecordStore`]

pub mod repo;
pub mod schema;

pub use repo::Database;
