//! Farmstead - farm management record server
//!
//! Layers, leaf to root:
//! - [`models`]: plain records (one per table) and their create/update inputs
//! - [`db`]: repository traits with PostgreSQL and in-memory implementations
//! - [`services`]: per-entity business rules, soft delete/restore and the
//!   referential guard
//! - [`api`]: axum handlers, routes and middleware
//! - [`state`]: wiring of the above into a shared [`state::AppState`]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
