//! API Routes
//!
//! Configures the Axum router with all newsletter endpoints.

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    articles_handler, check_subscription_handler, health_handler, options_handler,
    subscribe_handler, verify_subscriber_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /articles` - Gated article list, or one article with `?id=`
/// - `POST /subscribe` - Create a free subscription
/// - `POST /verify-subscriber` - Verify an email and issue the subscriber cookie
/// - `GET /check-subscription` - Subscription status from the cookie
/// - `GET /health` - Health check endpoint
///
/// Every endpoint is also served under `/api` and answers `OPTIONS` with 200.
/// Other methods get 405.
///
/// # Middleware
/// - CORS: mirrors the request origin and allows credentials so the cookie
///   travels on cross-origin calls
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let endpoints = endpoints();

    Router::new()
        .merge(endpoints.clone())
        .nest("/api", endpoints)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn endpoints() -> Router<AppState> {
    Router::new()
        .route("/articles", get(articles_handler).options(options_handler))
        .route("/subscribe", post(subscribe_handler).options(options_handler))
        .route(
            "/verify-subscriber",
            post(verify_subscriber_handler).options(options_handler),
        )
        .route(
            "/check-subscription",
            get(check_subscription_handler).options(options_handler),
        )
        .route("/health", get(health_handler).options(options_handler))
}
