//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{account, database, health, password, profile};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Commands (bearer token auth, body `{target?, args?}`)
/// - `POST /v1/account/create` - Provision an account, returns its credential
/// - `POST /v1/account/delete` - Delete an account
/// - `POST /v1/account/whoami` - Describe the caller
/// - `POST /v1/account/is-auth` - Check the authorization gate
/// - `POST /v1/password/set` - Set a credential
/// - `POST /v1/password/generate` - Generate and set a credential
/// - `POST /v1/database/create` - Create a database
/// - `POST /v1/database/drop` - Drop a database
/// - `POST /v1/database/list` - List databases and the byte quota
/// - `POST /v1/profile/get` - Read the profile
/// - `POST /v1/profile/set` - Update the profile
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Account
        .route("/v1/account/create", post(account::create))
        .route("/v1/account/delete", post(account::delete))
        .route("/v1/account/whoami", post(account::whoami))
        .route("/v1/account/is-auth", post(account::is_auth))
        // Password
        .route("/v1/password/set", post(password::set))
        .route("/v1/password/generate", post(password::generate))
        // Database
        .route("/v1/database/create", post(database::create))
        .route("/v1/database/drop", post(database::drop))
        .route("/v1/database/list", post(database::list))
        // Profile
        .route("/v1/profile/get", post(profile::get))
        .route("/v1/profile/set", post(profile::set))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(MapResponseBodyLayer::new(Body::new))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    request_timeout_seconds,
                ))),
        )
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
