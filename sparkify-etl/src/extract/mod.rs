//! Projection of validated records into warehouse rows

pub mod dimensions;
pub mod facts;

pub use dimensions::{extract_artists, extract_songs, extract_time, extract_users};
pub use facts::extract_songplays;
