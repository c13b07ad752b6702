//! Newsletter platform wire types
//!
//! Deserialization targets for Beehiiv responses. Every field is optional or
//! defaulted; the platform omits fields freely and a missing field must never
//! fail a whole page of posts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope around every list response.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// == Subscriptions ==
/// One subscription record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubscription {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cancelled_at: Option<Value>,
}

impl RawSubscription {
    /// Active iff there is no cancellation timestamp and the status is not `cancelled`.
    pub fn is_active(&self) -> bool {
        let cancelled_at_set = self.cancelled_at.as_ref().is_some_and(is_set);
        let status_cancelled = self.status.as_deref() == Some("cancelled");
        !cancelled_at_set && !status_cancelled
    }
}

/// Whether a loosely typed timestamp field carries a value (`0`, `""`, `false` and `null` do not).
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Body of a create-subscription request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscription<'a> {
    pub email: &'a str,
    pub reactivate_existing: bool,
    pub send_welcome_email: bool,
    pub utm_source: &'a str,
    pub utm_medium: &'a str,
    pub tier: &'a str,
}

impl<'a> CreateSubscription<'a> {
    /// Signup from the website form.
    pub fn website_signup(email: &'a str) -> Self {
        Self {
            email,
            reactivate_existing: false,
            send_welcome_email: true,
            utm_source: "website",
            utm_medium: "signup_form",
            tier: "free",
        }
    }
}

/// Error body returned by the platform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformErrorBody {
    #[serde(default)]
    pub errors: Vec<PlatformErrorItem>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformErrorItem {
    #[serde(default)]
    pub message: Option<String>,
}

impl PlatformErrorBody {
    /// First human-readable message in the body.
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .iter()
            .find_map(|e| e.message.as_deref())
            .or(self.message.as_deref())
    }
}

// == Posts ==
/// One post as listed by the platform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub preview_text: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Author names; entries may be strings or objects
    #[serde(default)]
    pub authors: Option<Vec<Value>>,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    /// Unix seconds
    #[serde(default)]
    pub publish_date: Option<i64>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub slug_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub content: Option<RawContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

/// Structured post body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContent {
    #[serde(default)]
    pub blocks: Option<Vec<RawBlock>>,
}

/// One content block. `content` is either a plain string or `{ "text": ... }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBlock {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

impl RawBlock {
    /// Paragraph text, if this block is a paragraph or text block.
    pub fn paragraph_text(&self) -> Option<&str> {
        match self.kind.as_deref() {
            Some("paragraph") | Some("text") => {}
            _ => return None,
        }
        match self.content.as_ref()? {
            Value::String(text) => Some(text.as_str()),
            Value::Object(map) => map.get("text").and_then(Value::as_str),
            _ => None,
        }
    }
}
