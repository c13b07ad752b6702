//! Request DTOs for the newsletter API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::platform::normalize_email;

/// Message shown for a malformed email.
pub const INVALID_EMAIL_MESSAGE: &str = "Please provide a valid email address.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Whether `email` looks like an address: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Request body for POST /subscribe and POST /verify-subscriber
///
/// # Fields
/// - `email`: The reader's email address
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    /// Email address as typed by the reader
    #[serde(default)]
    pub email: String,
}

impl EmailRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if is_valid_email(&self.normalized_email()) {
            None
        } else {
            Some(INVALID_EMAIL_MESSAGE.to_string())
        }
    }

    /// Trimmed, lower-cased email.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Query string for GET /articles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlesQuery {
    /// Return only the article with this id
    #[serde(default)]
    pub id: Option<String>,
}

impl ArticlesQuery {
    /// The requested id, ignoring an empty `?id=`.
    pub fn article_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
