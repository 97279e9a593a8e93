//! Database initialization and warehouse schema

pub mod init;

pub use init::*;
