//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against in-process
//! fakes of the newsletter platform.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use og_newsletter::{
    api::create_router,
    auth::{SessionCookieManager, TokenCodec},
    cache::ArticleCache,
    clock::Clock,
    platform::{PostSource, RawPost, SubscriptionCheck, SubscriptionOracle},
    AppError, AppState, Result,
};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";
const ACTIVE: &str = "active@example.com";
const CANCELLED: &str = "cancelled@example.com";
const FLAKY: &str = "flaky@example.com";

// == Fakes ==

struct TestClock {
    millis: AtomicI64,
}

impl TestClock {
    fn new() -> Self {
        Self {
            millis: AtomicI64::new(1_760_000_000_000),
        }
    }

    fn advance_secs(&self, secs: i64) {
        self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap_or_else(Utc::now)
    }
}

#[derive(Default)]
struct FakePlatform {
    post_fetches: AtomicUsize,
    posts_down: AtomicBool,
}

#[async_trait]
impl PostSource for FakePlatform {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>> {
        self.post_fetches.fetch_add(1, Ordering::SeqCst);
        if self.posts_down.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("Beehiiv API error: 503 - down".to_string()));
        }

        let posts = json!([
            {
                "id": "post_1",
                "title": "Block Party Recap",
                "subtitle": "The summer's best night",
                "status": "confirmed",
                "tag": "Events",
                "publish_date": 1_767_225_600,
                "content": {"blocks": [
                    {"type": "paragraph", "content": "First paragraph."},
                    {"type": "paragraph", "content": "Second paragraph."},
                    {"type": "paragraph", "content": "Third paragraph."}
                ]}
            },
            {
                "id": "post_2",
                "title": "Draft",
                "status": "draft"
            }
        ]);
        Ok(serde_json::from_value(posts).unwrap())
    }
}

#[async_trait]
impl SubscriptionOracle for FakePlatform {
    async fn check_subscription(&self, email: &str) -> SubscriptionCheck {
        match email {
            ACTIVE => SubscriptionCheck::found(true),
            CANCELLED => SubscriptionCheck::found(false),
            FLAKY => SubscriptionCheck::failed("API error: 429 Too Many Requests"),
            _ => SubscriptionCheck::not_found(),
        }
    }

    async fn subscribe(&self, email: &str) -> Result<Value> {
        Ok(json!({"data": {"email": email, "status": "active"}}))
    }
}

// == Helper Functions ==

struct Harness {
    app: Router,
    platform: Arc<FakePlatform>,
    clock: Arc<TestClock>,
}

fn harness() -> Harness {
    let platform = Arc::new(FakePlatform::default());
    let clock = Arc::new(TestClock::new());
    let cache = ArticleCache::new(platform.clone(), clock.clone(), Duration::from_secs(300));
    let sessions = SessionCookieManager::new(TokenCodec::new(SECRET, clock.clone()));
    let oracle: Arc<dyn SubscriptionOracle> = platform.clone();
    let state = AppState::new(sessions, Some(cache), Some(oracle));

    Harness {
        app: create_router(state),
        platform,
        clock,
    }
}

fn unconfigured_app() -> Router {
    let sessions = SessionCookieManager::new(TokenCodec::new(SECRET, Arc::new(TestClock::new())));
    create_router(AppState::new(sessions, None, None))
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|value| value.to_str().unwrap().to_string())
}

/// `name=value` part of a Set-Cookie header, ready for a Cookie header.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

async fn subscriber_cookie(app: &Router) -> String {
    let response = send(app, post_json("/verify-subscriber", json!({"email": ACTIVE}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    cookie_pair(&set_cookie(&response).unwrap())
}

// == Verify Subscriber Tests ==

#[tokio::test]
async fn test_verify_active_subscriber_unlocks_session() {
    let h = harness();

    let response = send(
        &h.app,
        post_json("/verify-subscriber", json!({"email": "  Active@Example.com "})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=2592000"));

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["isSubscribed"], true);
    assert_eq!(json["email"], ACTIVE);

    let response = send(&h.app, get("/check-subscription", Some(&cookie_pair(&cookie)))).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"isSubscribed": true}));
}

#[tokio::test]
async fn test_verify_cancelled_subscriber_clears_cookie() {
    let h = harness();

    let response = send(&h.app, post_json("/verify-subscriber", json!({"email": CANCELLED}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("og_subscriber=;"));
    assert!(cookie.contains("Max-Age=0"));

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["isSubscribed"], false);
}

#[tokio::test]
async fn test_verify_unknown_email() {
    let h = harness();
    let response = send(
        &h.app,
        post_json("/verify-subscriber", json!({"email": "stranger@example.com"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie(&response).is_some());
}

#[tokio::test]
async fn test_verify_oracle_failure_is_not_a_negative() {
    let h = harness();
    let response = send(&h.app, post_json("/verify-subscriber", json!({"email": FLAKY}))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie(&response).is_none());
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("try again"));
}

#[tokio::test]
async fn test_verify_invalid_email() {
    let h = harness();
    for body in [json!({"email": "not-an-email"}), json!({}), json!({"email": ""})] {
        let response = send(&h.app, post_json("/verify-subscriber", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_subscriber_cookie_expires_after_thirty_days() {
    let h = harness();
    let cookie = subscriber_cookie(&h.app).await;

    h.clock.advance_secs(30 * 24 * 60 * 60 + 1);

    let response = send(&h.app, get("/check-subscription", Some(&cookie))).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["isSubscribed"], false);
}

// == Check Subscription Tests ==

#[tokio::test]
async fn test_check_subscription_anonymous() {
    let h = harness();
    let response = send(&h.app, get("/check-subscription", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["isSubscribed"], false);
}

#[tokio::test]
async fn test_check_subscription_forged_cookie() {
    let h = harness();
    let response = send(
        &h.app,
        get("/check-subscription", Some("og_subscriber=YWJjOjE=.deadbeef")),
    )
    .await;
    assert_eq!(body_to_json(response.into_body()).await["isSubscribed"], false);
}

// == Articles Tests ==

#[tokio::test]
async fn test_articles_gated_for_anonymous_reader() {
    let h = harness();
    let response = send(&h.app, get("/articles", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::VARY).unwrap(), "Cookie");

    let json = body_to_json(response.into_body()).await;
    let articles = json.as_array().unwrap();
    assert_eq!(articles.len(), 1, "drafts are filtered out");

    let article = &articles[0];
    assert_eq!(article["id"], "post_1");
    assert_eq!(article["category"], "Events");
    assert_eq!(article["date"], "Jan 1, 2026");
    assert_eq!(article["content"], json!(["First paragraph."]));
    assert_eq!(article["isLocked"], true);
    assert_eq!(article["lockedParagraphs"], 2);
}

#[tokio::test]
async fn test_articles_full_for_subscriber() {
    let h = harness();
    let cookie = subscriber_cookie(&h.app).await;

    let response = send(&h.app, get("/articles?id=post_1", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["content"].as_array().unwrap().len(), 3);
    assert_eq!(json["isLocked"], false);
}

#[tokio::test]
async fn test_article_not_found() {
    let h = harness();
    let response = send(&h.app, get("/articles?id=999", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_to_json(response.into_body()).await["message"],
        "Article not found"
    );
}

#[tokio::test]
async fn test_articles_served_from_cache() {
    let h = harness();
    for _ in 0..3 {
        let response = send(&h.app, get("/api/articles", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(h.platform.post_fetches.load(Ordering::SeqCst), 1);

    h.clock.advance_secs(301);
    send(&h.app, get("/articles", None)).await;
    assert_eq!(h.platform.post_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_articles_stale_fallback_when_platform_down() {
    let h = harness();
    send(&h.app, get("/articles", None)).await;

    h.platform.posts_down.store(true, Ordering::SeqCst);
    h.clock.advance_secs(600);

    let response = send(&h.app, get("/articles", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await.as_array().unwrap().len(), 1);

    let response = send(&h.app, get("/health", None)).await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cache"]["staleServes"], 1);
    assert_eq!(json["cache"]["upstreamFailures"], 1);
}

#[tokio::test]
async fn test_articles_platform_down_without_cache() {
    let h = harness();
    h.platform.posts_down.store(true, Ordering::SeqCst);

    let response = send(&h.app, get("/articles", None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert!(!json["message"].as_str().unwrap().contains("503"));
}

// == Subscribe Tests ==

#[tokio::test]
async fn test_subscribe_success() {
    let h = harness();
    let response = send(&h.app, post_json("/subscribe", json!({"email": "New@Example.com"}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Successfully subscribed!");
    assert_eq!(json["data"]["data"]["email"], "new@example.com");
}

#[tokio::test]
async fn test_subscribe_invalid_email() {
    let h = harness();
    let response = send(&h.app, post_json("/subscribe", json!({"email": "bad@"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(response.into_body()).await["message"],
        "Please provide a valid email address."
    );
}

// == Configuration Tests ==

#[tokio::test]
async fn test_missing_credentials_answer_500() {
    let app = unconfigured_app();

    let response = send(&app, get("/articles", None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(&app, post_json("/subscribe", json!({"email": ACTIVE}))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(&app, post_json("/verify-subscriber", json!({"email": ACTIVE}))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Cookie-only endpoints keep working.
    let response = send(&app, get("/check-subscription", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// == Health and CORS Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let h = harness();
    let response = send(&h.app, get("/api/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
    assert!(json["cache"]["hitRate"].is_number());
}

#[tokio::test]
async fn test_cors_preflight() {
    let h = harness();
    let response = send(
        &h.app,
        Request::builder()
            .method("OPTIONS")
            .uri("/verify-subscriber")
            .header(header::ORIGIN, "https://reader.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://reader.example"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cache_shared_across_clones() {
    let h = harness();
    let platform: Arc<dyn PostSource> = h.platform.clone();
    let cache = ArticleCache::new(platform, h.clock.clone(), Duration::from_secs(300));
    let clone = cache.clone();

    assert_ok!(cache.get_articles().await);
    assert_ok!(clone.get_article_by_id("post_1").await);
    assert_eq!(h.platform.post_fetches.load(Ordering::SeqCst), 1);
}
