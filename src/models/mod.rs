//! Request and Response models for the newsletter API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{is_valid_email, ArticlesQuery, EmailRequest, INVALID_EMAIL_MESSAGE};
pub use responses::{
    CheckSubscriptionResponse, ErrorResponse, HealthResponse, SubscribeResponse, VerifyResponse,
};
