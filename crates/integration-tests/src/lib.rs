//! Integration tests for the Bloom storefront.
//!
//! Tests drive the full axum router with `tower::ServiceExt::oneshot`. Sessions
//! live in an in-memory store, the catalog and order backends are fakes, and
//! the database pool connects lazily so no server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bloom-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart` - Cart mutations, totals and the `cart-updated` trigger
//! - `checkout` - Order submission, validation and sign-in gating
//! - `catalog` - Product listing, filters and order history

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore};

use bloom_core::{Email, Money, OrderId, OrderStatus, ProductId};
use bloom_storefront::catalog::{CatalogApi, CatalogError, Category, Product, Term};
use bloom_storefront::commerce::{
    CommerceError, NewOrder, OrderApi, OrderReceipt, OrderSummary,
};
use bloom_storefront::config::{CommerceConfig, ContentApiConfig, GoogleConfig, StorefrontConfig};
use bloom_storefront::middleware::SESSION_COOKIE_NAME;
use bloom_storefront::models::{CurrentUser, session_keys};
use bloom_storefront::state::AppState;

/// Product id of the trending shirt in the fake catalog.
pub const SHIRT: i64 = 12;
/// Product id of the tote bag in the fake catalog.
pub const TOTE: i64 = 7;
/// Order id the fake order API hands out.
pub const ORDER_ID: i64 = 1001;

fn term(name: &str) -> Term {
    Term {
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
    }
}

fn product(id: i64, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        global_id: format!("cHJvZHVjdDo{id}"),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: String::new(),
        price: Money::parse(price).unwrap(),
        image_url: format!("https://cdn.example.com/{id}.jpg"),
        tags: Vec::new(),
        categories: Vec::new(),
        colors: Vec::new(),
        sizes: Vec::new(),
    }
}

/// Catalog backed by a fixed product list.
pub struct FakeCatalog {
    products: Vec<Product>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        let mut shirt = product(SHIRT, "Linen Shirt", "19.99");
        shirt.tags = vec![term("trending-cart")];
        shirt.categories = vec![term("Shirts")];
        shirt.colors = vec![term("Blue"), term("White")];
        shirt.sizes = vec![term("M"), term("L")];

        let mut tote = product(TOTE, "Canvas Tote", "35.00");
        tote.categories = vec![term("Bags")];
        tote.colors = vec![term("Natural")];

        let mut tee = product(3, "Cotton Tee", "12.50");
        tee.categories = vec![term("Shirts")];
        tee.colors = vec![term("White")];
        tee.sizes = vec![term("S"), term("M")];

        Self {
            products: vec![shirt, tote, tee],
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        self.products
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {slug}")))
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(vec![Category {
            id: "dGVybTox".to_string(),
            name: "Shirts".to_string(),
            slug: "shirts".to_string(),
            description: String::new(),
            image_url: None,
            children: vec![term("Linen")],
        }])
    }
}

/// Order API that records what it was sent.
#[derive(Default)]
pub struct FakeOrders {
    calls: AtomicUsize,
    fail: AtomicBool,
    delay_ms: AtomicU64,
    placed: Mutex<Vec<NewOrder>>,
    history: Mutex<Vec<OrderSummary>>,
}

impl FakeOrders {
    /// Number of `create_order` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `create_order` calls fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `create_order` calls take this long to answer.
    pub fn set_delay_ms(&self, millis: u64) {
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    /// The last order request received.
    pub fn last_order(&self) -> Option<NewOrder> {
        self.placed.lock().last().cloned()
    }

    /// Seed the order history.
    pub fn set_history(&self, orders: Vec<OrderSummary>) {
        *self.history.lock() = orders;
    }
}

#[async_trait]
impl OrderApi for FakeOrders {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, CommerceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(CommerceError::Api {
                status: 500,
                message: "woocommerce_rest_cannot_create".to_string(),
            });
        }
        self.placed.lock().push(order.clone());
        Ok(OrderReceipt {
            id: OrderId::new(ORDER_ID),
            number: ORDER_ID.to_string(),
            status: OrderStatus::Processing,
            total: Money::ZERO,
        })
    }

    async fn list_orders(&self, email: &Email) -> Result<Vec<OrderSummary>, CommerceError> {
        Ok(self
            .history
            .lock()
            .iter()
            .filter(|o| o.placed_by(email.as_str()))
            .cloned()
            .collect())
    }
}

/// Configuration for tests; nothing here is contacted.
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/bloom_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("k9Xq2vLm8RtY4wZp7NbC3jHf6GdS1aEu"),
        content: ContentApiConfig {
            endpoint: "http://localhost:9/graphql".to_string(),
        },
        commerce: CommerceConfig {
            base_url: "http://localhost:9".to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: SecretString::from("cs_test"),
        },
        google: GoogleConfig {
            client_id: "client-id.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("google-test"),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The customer used by signed-in tests.
pub fn test_user() -> CurrentUser {
    CurrentUser {
        id: "108234567890".to_string(),
        name: Some("Ada Lovelace".to_string()),
        email: Email::parse("ada@example.com").unwrap(),
        picture: None,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// A response header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A router plus one browser's cookie jar.
pub struct TestContext {
    pub app: Router,
    pub store: MemoryStore,
    pub orders: Arc<FakeOrders>,
    cookie: Mutex<Option<String>>,
}

impl TestContext {
    /// Build the storefront over fakes.
    pub fn new() -> Self {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bloom_test")
            .unwrap();
        let orders = Arc::new(FakeOrders::default());
        let state = AppState::from_parts(
            test_config(),
            pool,
            Arc::new(FakeCatalog::default()),
            orders.clone(),
        );
        let store = MemoryStore::default();

        Self {
            app: bloom_storefront::app(state, store.clone()),
            store,
            orders,
            cookie: Mutex::new(None),
        }
    }

    /// Start a session that is already signed in as `user`.
    pub async fn sign_in(&self, user: &CurrentUser) {
        let mut record = Record {
            id: Id::default(),
            data: HashMap::from([(
                session_keys::CURRENT_USER.to_string(),
                serde_json::to_value(user).unwrap(),
            )]),
            expiry_date: OffsetDateTime::now_utc() + Duration::days(1),
        };
        self.store.create(&mut record).await.unwrap();
        *self.cookie.lock() = Some(format!("{SESSION_COOKIE_NAME}={}", record.id));
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Send a request with the current cookie and keep any new one.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie.lock().clone() {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            *self.cookie.lock() = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete checkout form for the signed-in customer.
pub fn checkout_form() -> Value {
    serde_json::json!({
        "customer": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "address1": "12 St James's Square",
            "address2": "",
            "city": "London",
            "region": "",
            "postcode": "SW1Y 4JH",
            "country": "GB",
            "email": "ada@example.com",
            "phone": "+44 20 7946 0958"
        },
        "delivery": "standard",
        "payment_method": "credit-card",
        "payment": {
            "card_number": "1234 5678 9012 3456",
            "name_on_card": "Ada Lovelace",
            "expiration_date": "09/29",
            "cvc": "123"
        }
    })
}
