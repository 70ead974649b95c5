//! Bloom Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`cart`] - Session-backed cart store, mutation API and `cart-updated` events
//! - [`checkout`] - Order submission over the cart and the commerce backend
//! - [`catalog`] - WPGraphQL product catalog with caching and filtering
//! - [`commerce`] - WooCommerce REST client for orders
//! - [`google`] - Google sign-in

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod commerce;
pub mod config;
pub mod db;
pub mod error;
pub mod google;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::state::AppState;

/// Build the storefront router over a session store.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(store, state.config());

    routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        #[allow(clippy::cast_possible_truncation)]
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
