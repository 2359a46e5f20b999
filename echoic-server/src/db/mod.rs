//! Database access for echoic-server
//!
//! Schema and row models live in `echoic_common::db`; this module holds the
//! queries the HTTP handlers run.

pub mod attempts;
pub mod sessions;
pub mod songs;
pub mod users;

pub use echoic_common::db::{init_database, Attempt, Song, User};
