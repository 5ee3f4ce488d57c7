//! # Habitforge Store
//!
//! Persistence layer for Habitforge: users and their credentials, habits,
//! dailies and tasks, stored in PostgreSQL.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool, schema bootstrap, transactions
//! - `models`: Entity types and their repository operations
//! - `constraint`: Translation of unique-constraint violations into domain errors
//! - `error`: The `StoreError` taxonomy

pub mod constraint;
pub mod db;
pub mod error;
pub mod models;

pub use error::{StoreError, StoreResult};

/// Current version of the Habitforge store library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
