//! # Sparkify Common Library
//!
//! Shared code for the Sparkify warehouse tools:
//! - Error types
//! - Configuration loading (TOML bootstrap, environment, compiled defaults)
//! - Database initialization and star-schema table definitions
//! - Timestamp utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
