//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Article refresh: keeps the article cache warm ahead of its TTL

mod refresh;

pub use refresh::spawn_refresh_task;
