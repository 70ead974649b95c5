//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cart::CartEvents;
use crate::catalog::{CatalogApi, CatalogClient};
use crate::checkout::InFlightSubmissions;
use crate::commerce::{CommerceClient, OrderApi};
use crate::config::StorefrontConfig;
use crate::google::GoogleClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the connection pool, API clients, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: Arc<dyn CatalogApi>,
    orders: Arc<dyn OrderApi>,
    google: GoogleClient,
    events: CartEvents,
    submissions: InFlightSubmissions,
}

impl AppState {
    /// Create application state with the real API clients.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = Arc::new(CatalogClient::new(&config.content));
        let orders = Arc::new(CommerceClient::new(&config.commerce));
        Self::from_parts(config, pool, catalog, orders)
    }

    /// Create application state with caller-supplied catalog and order
    /// backends.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        pool: PgPool,
        catalog: Arc<dyn CatalogApi>,
        orders: Arc<dyn OrderApi>,
    ) -> Self {
        let google = GoogleClient::new(&config.google);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                orders,
                google,
                events: CartEvents::new(),
                submissions: InFlightSubmissions::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogApi {
        self.inner.catalog.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderApi {
        self.inner.orders.as_ref()
    }

    #[must_use]
    pub fn google(&self) -> &GoogleClient {
        &self.inner.google
    }

    /// The process-wide `cart-updated` subject.
    #[must_use]
    pub fn events(&self) -> &CartEvents {
        &self.inner.events
    }

    /// Sessions with an order submission in progress.
    #[must_use]
    pub fn submissions(&self) -> &InFlightSubmissions {
        &self.inner.submissions
    }
}
