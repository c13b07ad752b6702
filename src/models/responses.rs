//! Response DTOs for the newsletter API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for POST /subscribe
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    /// Success message
    pub message: String,
    /// Subscription record returned by the platform
    pub data: Value,
}

impl SubscribeResponse {
    /// Creates a new SubscribeResponse
    pub fn new(data: Value) -> Self {
        Self {
            message: "Successfully subscribed!".to_string(),
            data,
        }
    }
}

/// Response body for POST /verify-subscriber
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub message: String,
}

impl VerifyResponse {
    /// The email belongs to an active subscriber.
    pub fn verified(email: impl Into<String>) -> Self {
        Self {
            is_subscribed: true,
            email: Some(email.into()),
            message: "Subscription verified! Full content unlocked.".to_string(),
        }
    }

    /// Verification did not succeed.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_subscribed: false,
            email: None,
            message: message.into(),
        }
    }
}

/// Response body for GET /check-subscription
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSubscriptionResponse {
    pub is_subscribed: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Article cache counters, absent when the platform is not configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cache: Option<CacheStats>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
