//! sparkify-etl library interface
//!
//! Normalizes the Sparkify song-metadata and event-log corpora into a star
//! schema (songs, artists, time, users, songplays) and loads it into the
//! SQLite warehouse with idempotent upserts.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod loader;
pub mod pipeline;
pub mod records;
pub mod resolver;

pub use crate::error::{EtlError, EtlResult, LoadError, ParseError};
pub use crate::pipeline::{run, run_from_paths, PipelineReport, TableReport};
