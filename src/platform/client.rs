//! Reqwest-based client for the Beehiiv v2 API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::PlatformCredentials;
use crate::error::{AppError, Result};
use crate::platform::models::{
    CreateSubscription, ListEnvelope, PlatformErrorBody, RawPost, RawSubscription,
};
use crate::platform::{normalize_email, PostSource, SubscriptionCheck, SubscriptionOracle};

/// Per-request timeout for platform calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Beehiiv HTTP client.
#[derive(Debug, Clone)]
pub struct BeehiivClient {
    client: Client,
    base_url: String,
    credentials: PlatformCredentials,
}

impl BeehiivClient {
    /// Creates a client for `base_url` (e.g. `https://api.beehiiv.com`).
    pub fn new(base_url: impl Into<String>, credentials: PlatformCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn publication_url(&self, resource: &str) -> String {
        format!(
            "{}/v2/publications/{}/{}",
            self.base_url, self.credentials.publication_id, resource
        )
    }

    async fn lookup(&self, email: &str) -> std::result::Result<Option<RawSubscription>, String> {
        let response = self
            .client
            .get(self.publication_url("subscriptions"))
            .bearer_auth(&self.credentials.api_key)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("API error: {}", status.as_u16()));
        }

        let envelope: ListEnvelope<RawSubscription> = response
            .json()
            .await
            .map_err(|e| format!("Invalid response: {}", e))?;

        Ok(envelope.data.into_iter().next())
    }
}

#[async_trait]
impl SubscriptionOracle for BeehiivClient {
    async fn check_subscription(&self, email: &str) -> SubscriptionCheck {
        let email = normalize_email(email);

        match self.lookup(&email).await {
            Ok(Some(subscription)) => {
                let active = subscription.is_active();
                debug!(active, status = ?subscription.status, "subscription record found");
                SubscriptionCheck::found(active)
            }
            Ok(None) => SubscriptionCheck::not_found(),
            Err(error) => {
                warn!(%error, "subscription lookup failed");
                SubscriptionCheck::failed(error)
            }
        }
    }

    async fn subscribe(&self, email: &str) -> Result<Value> {
        let email = normalize_email(email);
        info!("creating subscription");

        let response = self
            .client
            .post(self.publication_url("subscriptions"))
            .bearer_auth(&self.credentials.api_key)
            .json(&CreateSubscription::website_signup(&email))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Subscribe request failed: {}", e)))?;

        let status = response.status();
        let body = read_body(response).await;

        if status.is_success() {
            info!("subscription created");
            Ok(body)
        } else {
            let detail = serde_json::from_value::<PlatformErrorBody>(body.clone())
                .ok()
                .and_then(|b| b.first_message().map(str::to_string))
                .unwrap_or_else(|| body.to_string());
            Err(AppError::Upstream(format!(
                "Beehiiv rejected subscription ({}): {}",
                status.as_u16(),
                detail
            )))
        }
    }
}

#[async_trait]
impl PostSource for BeehiivClient {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>> {
        let response = self
            .client
            .get(self.publication_url("posts"))
            .bearer_auth(&self.credentials.api_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Posts request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Beehiiv API error: {} - {}",
                status.as_u16(),
                text
            )));
        }

        let envelope: ListEnvelope<RawPost> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid posts response: {}", e)))?;

        debug!(count = envelope.data.len(), "fetched posts");
        Ok(envelope.data)
    }
}

/// Reads a body as JSON, wrapping non-JSON text as `{ "message": text }`.
async fn read_body(response: Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| {
        let message = if text.is_empty() {
            "No response body".to_string()
        } else {
            text
        };
        json!({ "message": message })
    })
}

/// `User-Agent` sent to the platform.
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
