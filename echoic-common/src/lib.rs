//! # Echoic Common Library
//!
//! Shared code for the Echoic pronunciation practice service:
//! - Configuration loading and root folder resolution
//! - Database initialization and row models
//! - Password hashing and session tokens
//! - Timestamp formatting

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
