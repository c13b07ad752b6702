//! Session Cookie Manager
//!
//! Issues and clears the `og_subscriber` cookie and derives the subscriber
//! session from an incoming request. Reading a session never touches the
//! network; only the verification endpoint talks to the oracle.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use serde::Serialize;
use tracing::debug;

use crate::auth::token::{TokenCodec, TOKEN_MAX_AGE_MS};
use crate::error::{AppError, Result};

/// Name of the subscriber cookie.
pub const SUBSCRIBER_COOKIE: &str = "og_subscriber";

/// Cookie lifetime in seconds (30 days).
pub const COOKIE_MAX_AGE_SECS: i64 = TOKEN_MAX_AGE_MS / 1000;

const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=Lax";

// == Subscriber Session ==
/// Per-request view of the reader's subscription status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberSession {
    pub is_subscribed: bool,
    pub email: Option<String>,
}

impl SubscriberSession {
    /// Session for a reader without a valid cookie.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a verified subscriber.
    pub fn subscribed(email: impl Into<String>) -> Self {
        Self {
            is_subscribed: true,
            email: Some(email.into()),
        }
    }
}

// == Session Cookie Manager ==
/// Issues, clears and reads the subscriber cookie.
#[derive(Clone)]
pub struct SessionCookieManager {
    codec: TokenCodec,
}

impl SessionCookieManager {
    /// Creates a manager signing with `codec`.
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Builds the `Set-Cookie` value granting a subscriber session to `email`.
    pub fn issue(&self, email: &str) -> Result<HeaderValue> {
        let token = self.codec.issue(email);
        let cookie = format!(
            "{}={}; {}; Max-Age={}; Path=/",
            SUBSCRIBER_COOKIE, token, COOKIE_ATTRIBUTES, COOKIE_MAX_AGE_SECS
        );
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))
    }

    /// Builds the `Set-Cookie` value that makes the browser drop the cookie.
    pub fn clear(&self) -> HeaderValue {
        HeaderValue::from_static("og_subscriber=; HttpOnly; Secure; SameSite=Lax; Max-Age=0; Path=/")
    }

    /// Appends the issuing `Set-Cookie` header to `headers`.
    pub fn issue_into(&self, headers: &mut HeaderMap, email: &str) -> Result<()> {
        headers.append(SET_COOKIE, self.issue(email)?);
        Ok(())
    }

    /// Appends the clearing `Set-Cookie` header to `headers`.
    pub fn clear_into(&self, headers: &mut HeaderMap) {
        headers.append(SET_COOKIE, self.clear());
    }

    /// Derives the session from the request's `Cookie` headers.
    pub fn read_session(&self, headers: &HeaderMap) -> SubscriberSession {
        let token = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|raw| find_cookie(raw, SUBSCRIBER_COOKIE));

        match token {
            Some(token) => self.session_from_token(token),
            None => SubscriberSession::anonymous(),
        }
    }

    fn session_from_token(&self, token: &str) -> SubscriberSession {
        let verification = self.codec.verify(token);
        match verification.email {
            Some(email) if verification.valid => SubscriberSession::subscribed(email),
            _ => {
                debug!("subscriber cookie present but invalid or expired");
                SubscriberSession::anonymous()
            }
        }
    }
}

// == Cookie Parsing ==
/// Splits a `Cookie` header into `(name, value)` pairs.
///
/// Pairs are separated by `;`; each pair is split on its first `=` so padded
/// base64 values survive intact. Pairs without `=` are skipped.
pub fn parse_cookies(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split(';').filter_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        Some((name.trim(), value.trim()))
    })
}

/// Returns the value of the first cookie called `name`.
pub fn find_cookie<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    parse_cookies(raw).find_map(|(n, v)| (n == name).then_some(v))
}
