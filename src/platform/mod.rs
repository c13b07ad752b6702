//! Platform Module
//!
//! Seams to the external newsletter platform: an article source for the
//! content cache and a subscription oracle for the verification endpoint.
//! [`BeehiivClient`] implements both against the Beehiiv v2 API.

pub mod client;
pub mod models;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use client::BeehiivClient;
pub use models::RawPost;

// == Subscription Check ==
/// Answer of the subscription oracle for one email.
///
/// `error` is set when the platform could not give an authoritative answer;
/// `exists` is then `false` but must not be read as a true negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionCheck {
    pub exists: bool,
    pub is_active: Option<bool>,
    pub error: Option<String>,
}

impl SubscriptionCheck {
    /// No subscription record for the email.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// A subscription record exists.
    pub fn found(is_active: bool) -> Self {
        Self {
            exists: true,
            is_active: Some(is_active),
            error: None,
        }
    }

    /// The platform failed to answer.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            exists: false,
            is_active: None,
            error: Some(error.into()),
        }
    }

    /// Whether the email belongs to an active subscriber.
    pub fn is_subscribed(&self) -> bool {
        self.exists && self.is_active == Some(true)
    }
}

// == Post Source ==
/// Lists raw posts for the content cache.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetches every post of the publication, whatever its status.
    async fn fetch_posts(&self) -> Result<Vec<RawPost>>;
}

// == Subscription Oracle ==
/// Authoritative answer to "is this email subscribed".
#[async_trait]
pub trait SubscriptionOracle: Send + Sync {
    /// Looks the email up live. Never fails; failures are reported in the result.
    async fn check_subscription(&self, email: &str) -> SubscriptionCheck;

    /// Creates a free subscription for `email`, returning the platform's record.
    async fn subscribe(&self, email: &str) -> Result<Value>;
}

/// Lower-cases and trims an email before it is sent upstream or signed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
