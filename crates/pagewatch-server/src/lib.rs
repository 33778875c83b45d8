//! Pagewatch Server - attachment downloads for page monitoring
//!
//! This crate provides the REST API that lists files captured by page
//! monitors and serves them to holders of short-lived download tokens.

pub mod catalog;
pub mod config;
pub mod db;
pub mod encoding;
pub mod error;
pub mod history;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
