//! Auth Module
//!
//! Stateless subscriber authentication: signed tokens carried in a cookie.

pub mod cookie;
pub mod token;


pub use cookie::{SessionCookieManager, SubscriberSession, SUBSCRIBER_COOKIE};
pub use token::{SignedToken, TokenCodec, TokenVerification, TOKEN_MAX_AGE_MS};
