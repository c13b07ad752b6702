//! API Module
//!
//! HTTP handlers and routing for the newsletter REST API.
//!
//! # Endpoints
//! - `GET /articles` - Gated articles, all or by `?id=`
//! - `POST /subscribe` - Create a free subscription
//! - `POST /verify-subscriber` - Verify an email, issue the subscriber cookie
//! - `GET /check-subscription` - Subscription status from the cookie
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
