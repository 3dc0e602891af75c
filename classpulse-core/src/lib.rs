//! # classpulse-core
//!
//! Core library for classpulse - teaching activity analytics for a school
//! dashboard.
//!
//! This library provides:
//! - Domain types for activity records and periods
//! - Time-bucketed aggregations (chart buckets, insights, pulse, teacher summaries)
//! - Database storage layer with SQLite behind the [`RecordStore`] trait
//! - JSON seed import
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::{Local, Utc};
//! use classpulse_core::analytics::{dashboard, DashboardQuery};
//! use classpulse_core::{Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let buckets = dashboard::daily_activity(&db, &DashboardQuery::default(), &Local, Utc::now())
//!     .expect("query failed");
//! println!("{}", serde_json::to_string(&buckets).unwrap());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use store::{ActivityFilter, GradeMatch, RecordStore};
pub use types::*;

// Public modules
pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod logging;
pub mod store;
pub mod types;
