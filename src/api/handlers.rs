//! API Handlers
//!
//! HTTP request handlers for each newsletter endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::auth::{SessionCookieManager, TokenCodec};
use crate::cache::{ArticleCache, DEFAULT_TTL};
use crate::clock::Clock;
use crate::config::Config;
use crate::content::{gate, gate_all};
use crate::error::{AppError, Result};
use crate::models::{
    ArticlesQuery, CheckSubscriptionResponse, EmailRequest, HealthResponse, SubscribeResponse,
    VerifyResponse, INVALID_EMAIL_MESSAGE,
};
use crate::platform::{BeehiivClient, PostSource, SubscriptionOracle};

const NOT_SUBSCRIBED_MESSAGE: &str = "We couldn't find that email in our subscriber list. \
     Please subscribe first to unlock full content.";
const VERIFY_UNAVAILABLE_MESSAGE: &str = "Unable to verify subscription. Please try again later.";
const MISSING_CREDENTIALS: &str = "Missing Beehiiv credentials";

/// Application state shared across all handlers.
///
/// The article cache and the oracle are absent when platform credentials are
/// not configured; every endpoint depending on them then answers 500.
#[derive(Clone)]
pub struct AppState {
    /// Cookie issuance and session derivation
    pub sessions: SessionCookieManager,
    /// Process-wide article cache
    pub articles: Option<ArticleCache>,
    /// Live subscription lookups
    pub oracle: Option<Arc<dyn SubscriptionOracle>>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        sessions: SessionCookieManager,
        articles: Option<ArticleCache>,
        oracle: Option<Arc<dyn SubscriptionOracle>>,
    ) -> Self {
        Self {
            sessions,
            articles,
            oracle,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds one Beehiiv client shared by the article cache and the oracle.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let sessions =
            SessionCookieManager::new(TokenCodec::new(&config.cookie_secret, clock.clone()));

        let Some(credentials) = config.platform.clone() else {
            warn!("Beehiiv credentials missing; article and subscription endpoints will fail");
            return Ok(Self::new(sessions, None, None));
        };

        let client = Arc::new(BeehiivClient::new(&config.api_base, credentials)?);
        let ttl = if config.cache_ttl == 0 {
            DEFAULT_TTL
        } else {
            std::time::Duration::from_secs(config.cache_ttl)
        };
        let source: Arc<dyn PostSource> = client.clone();
        let oracle: Arc<dyn SubscriptionOracle> = client;
        let articles = ArticleCache::new(source, clock, ttl);

        Ok(Self::new(sessions, Some(articles), Some(oracle)))
    }

    fn articles(&self) -> Result<&ArticleCache> {
        self.articles
            .as_ref()
            .ok_or_else(|| AppError::Config(MISSING_CREDENTIALS.to_string()))
    }

    fn oracle(&self) -> Result<&Arc<dyn SubscriptionOracle>> {
        self.oracle
            .as_ref()
            .ok_or_else(|| AppError::Config(MISSING_CREDENTIALS.to_string()))
    }
}

/// Handler for GET /articles and GET /articles?id=X
///
/// Returns gated articles: readers without a valid subscriber cookie get the
/// excerpt and first paragraph only.
pub async fn articles_handler(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let cache = state.articles()?;
    let session = state.sessions.read_session(&headers);
    let vary = [(header::VARY, "Cookie")];

    match query.article_id() {
        Some(id) => {
            let article = cache.get_article_by_id(id).await?;
            Ok((vary, Json(gate(&article, &session))).into_response())
        }
        None => {
            let articles = cache.get_articles().await?;
            Ok((vary, Json(gate_all(&articles, &session))).into_response())
        }
    }
}

/// Handler for POST /subscribe
///
/// Creates a free subscription on the platform.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<SubscribeResponse>> {
    let req = parse_email_request(payload)?;
    if let Some(error_msg) = req.validate() {
        warn!("invalid email submitted to subscribe");
        return Err(AppError::Validation(error_msg));
    }

    let oracle = state.oracle()?;
    let data = oracle.subscribe(&req.normalized_email()).await?;

    Ok(Json(SubscribeResponse::new(data)))
}

/// Handler for POST /verify-subscriber
///
/// Checks the email with the live oracle. Sets the subscriber cookie on
/// success; clears it when the oracle gives a definite negative.
pub async fn verify_subscriber_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmailRequest>, JsonRejection>,
) -> Response {
    let req = match parse_email_request(payload) {
        Ok(req) => req,
        Err(_) => return rejected(StatusCode::BAD_REQUEST, INVALID_EMAIL_MESSAGE),
    };
    if let Some(error_msg) = req.validate() {
        return rejected(StatusCode::BAD_REQUEST, &error_msg);
    }

    let oracle = match state.oracle() {
        Ok(oracle) => oracle,
        Err(err) => {
            return rejected(StatusCode::INTERNAL_SERVER_ERROR, &err.public_message());
        }
    };

    let email = req.normalized_email();
    let check = oracle.check_subscription(&email).await;

    if check.is_subscribed() {
        let mut headers = HeaderMap::new();
        if let Err(err) = state.sessions.issue_into(&mut headers, &email) {
            return err.into_response();
        }
        info!("subscriber verified, cookie issued");
        return (StatusCode::OK, headers, Json(VerifyResponse::verified(email))).into_response();
    }

    if let Some(error) = check.error {
        // Not authoritative, so the existing cookie stays. This fails open for a
        // reader who already holds a valid cookie and was cancelled since; the
        // cookie still expires after 30 days. No new cookie is ever issued here.
        warn!(%error, "subscription oracle unavailable, treating reader as not subscribed");
        return rejected(StatusCode::NOT_FOUND, VERIFY_UNAVAILABLE_MESSAGE);
    }

    info!(exists = check.exists, "email is not an active subscriber");
    let mut headers = HeaderMap::new();
    state.sessions.clear_into(&mut headers);
    (
        StatusCode::NOT_FOUND,
        headers,
        Json(VerifyResponse::rejected(NOT_SUBSCRIBED_MESSAGE)),
    )
        .into_response()
}

/// Handler for GET /check-subscription
///
/// Reads the cookie only; never calls the oracle and never fails.
pub async fn check_subscription_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<CheckSubscriptionResponse> {
    let session = state.sessions.read_session(&headers);
    Json(CheckSubscriptionResponse {
        is_subscribed: session.is_subscribed,
    })
}

/// Handler for GET /health
///
/// Returns health status and article cache counters.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = match &state.articles {
        Some(cache) => Some(cache.stats().await),
        None => None,
    };
    Json(HealthResponse::healthy(cache))
}

/// Handler for OPTIONS on every route
pub async fn options_handler() -> StatusCode {
    StatusCode::OK
}

fn parse_email_request(
    payload: std::result::Result<Json<EmailRequest>, JsonRejection>,
) -> Result<EmailRequest> {
    payload
        .map(|Json(req)| req)
        .map_err(|_| AppError::Validation(INVALID_EMAIL_MESSAGE.to_string()))
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(VerifyResponse::rejected(message))).into_response()
}
