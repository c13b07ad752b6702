//! OG Newsletter - Subscriber gate for a newsletter-backed article site
//!
//! Serves cached articles from the newsletter platform and unlocks full
//! content for verified subscribers through a signed cookie.

pub mod api;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod platform;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use tasks::spawn_refresh_task;
