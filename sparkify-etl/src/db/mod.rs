//! Warehouse rows and their upsert statements
//!
//! One module per destination table. Each row type implements
//! [`crate::loader::Upsert`] with the table's conflict policy.

pub mod artists;
pub mod songplays;
pub mod songs;
pub mod time;
pub mod users;

pub use artists::ArtistRow;
pub use songplays::SongplayRow;
pub use songs::SongRow;
pub use time::TimeRow;
pub use users::UserRow;
