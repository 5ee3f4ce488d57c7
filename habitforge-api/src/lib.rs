//! # Habitforge API Server Library
//!
//! Process glue around `habitforge-store`: configuration, the HTTP error
//! mapping for store failures, and the health probe.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
