//! HTTP API handlers

pub mod attempts;
pub mod auth;
pub mod evaluate;
pub mod form;
pub mod health;
pub mod songs;

pub use attempts::list_attempts;
pub use auth::{auth_middleware, login, logout, register, CurrentUser};
pub use evaluate::evaluate;
pub use health::health_routes;
pub use songs::{create_song, delete_song, get_song, list_songs};
