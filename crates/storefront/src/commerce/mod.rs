//! Commerce REST API client (orders).
//!
//! # Architecture
//!
//! - The commerce backend is the source of truth for orders; nothing is
//!   synced locally
//! - Requests authenticate with the store's consumer key and secret
//! - [`OrderApi`] is the seam the checkout and account pages depend on, so
//!   tests can stand in a fake backend

mod types;

pub use types::{
    Address, ApiErrorBody, NewOrder, OrderImage, OrderLine, OrderReceipt, OrderSummary,
    PAYMENT_METHOD, PAYMENT_METHOD_TITLE, ShippingLine,
};

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use bloom_core::Email;

use crate::config::CommerceConfig;

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("commerce API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot be extended into an endpoint.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Order operations against the commerce backend.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Create an order. One call creates exactly one order.
    async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, CommerceError>;

    /// Orders placed with a billing email, newest first.
    async fn list_orders(&self, email: &Email) -> Result<Vec<OrderSummary>, CommerceError>;
}

/// Client for the commerce REST API.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    orders_endpoint: String,
    consumer_key: String,
    consumer_secret: String,
}

impl std::fmt::Debug for CommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceClient")
            .field("orders_endpoint", &self.inner.orders_endpoint)
            .finish_non_exhaustive()
    }
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        Self {
            inner: Arc::new(CommerceClientInner {
                client: reqwest::Client::new(),
                orders_endpoint: format!("{}/wp-json/wc/v3/orders", config.base_url),
                consumer_key: config.consumer_key.clone(),
                consumer_secret: config.consumer_secret.expose_secret().to_string(),
            }),
        }
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CommerceError> {
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "commerce API returned non-success status"
            );
            let message = serde_json::from_str::<ApiErrorBody>(&response_text)
                .map(|body| body.message)
                .unwrap_or_else(|_| response_text.chars().take(200).collect());
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "failed to parse commerce API response"
            );
            CommerceError::Parse(e)
        })
    }
}

#[async_trait]
impl OrderApi for CommerceClient {
    #[instrument(skip(self, order), fields(lines = order.line_items.len()))]
    async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, CommerceError> {
        let response = self
            .inner
            .client
            .post(&self.inner.orders_endpoint)
            .basic_auth(&self.inner.consumer_key, Some(&self.inner.consumer_secret))
            .json(order)
            .send()
            .await?;

        let receipt: OrderReceipt = Self::read(response).await?;
        tracing::info!(order_id = %receipt.id, status = %receipt.status, "order created");
        Ok(receipt)
    }

    #[instrument(skip(self, email), fields(email_domain = %email.domain()))]
    async fn list_orders(&self, email: &Email) -> Result<Vec<OrderSummary>, CommerceError> {
        let mut url = Url::parse(&self.inner.orders_endpoint)?;
        url.query_pairs_mut()
            .append_pair("search", email.as_str())
            .append_pair("per_page", "50");

        let response = self
            .inner
            .client
            .get(url)
            .basic_auth(&self.inner.consumer_key, Some(&self.inner.consumer_secret))
            .send()
            .await?;

        // `search` also matches names and notes, so keep only exact billing matches.
        let orders: Vec<OrderSummary> = Self::read(response).await?;
        Ok(orders
            .into_iter()
            .filter(|order| order.placed_by(email.as_str()))
            .collect())
    }
}
