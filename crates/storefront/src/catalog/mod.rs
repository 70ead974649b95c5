//! Catalog client for the GraphQL content API.
//!
//! Uses `graphql_client` envelopes with `reqwest` 0.13 for HTTP.
//! Caches product listings, single products and categories using `moka`
//! (5-minute TTL).

pub mod filter;
mod queries;
mod types;

pub use filter::{FilterQuery, Facets, ProductFilter, TRENDING_TAG, facets, tagged};
pub use types::{Category, Product, Term};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphql_client::{QueryBody, Response};
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use bloom_core::ProductId;

use crate::config::ContentApiConfig;
use types::{CategoriesData, ProductData, ProductsData};

/// Errors that can occur when talking to the content API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("content API returned {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Read access to products and categories.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// The product listing (simple products only).
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;

    /// A single product.
    async fn product_by_slug(&self, slug: &str) -> Result<Product, CatalogError>;

    /// Top-level categories with their children.
    async fn categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// A product from the listing, by database id.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {id}")))
    }
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<Category>>),
}

#[derive(Serialize)]
struct NoVariables {}

#[derive(Serialize)]
struct SlugVariables<'a> {
    slug: &'a str,
}

/// Client for the content API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new content API client.
    #[must_use]
    pub fn new(config: &ContentApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL query.
    async fn execute<V, T>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<T, CatalogError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let request_body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "content API returned non-success status"
            );
            return Err(CatalogError::Status(status.as_u16()));
        }

        let response: Response<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse content API response"
                );
                return Err(CatalogError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
            return Err(CatalogError::GraphQL(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "GraphQL response has no data and no errors"
            );
            CatalogError::GraphQL(vec!["No data in response".to_string()])
        })
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        let cache_key = "products".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products.as_ref().clone());
        }

        let data: ProductsData = self
            .execute("GetProductsWithCategoryAndTags", queries::PRODUCTS, NoVariables {})
            .await?;

        let products: Vec<Product> = data
            .products
            .unwrap_or_default()
            .nodes
            .into_iter()
            .filter_map(types::RawProduct::into_product)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::new(products.clone())))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(slug = %slug))]
    async fn product_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let data: ProductData = self
            .execute("GetProductBySlug", queries::PRODUCT_BY_SLUG, SlugVariables { slug })
            .await?;

        let product = data
            .product
            .and_then(types::RawProduct::into_product)
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories.as_ref().clone());
        }

        let data: CategoriesData = self
            .execute("Categories", queries::CATEGORIES, NoVariables {})
            .await?;

        let categories: Vec<Category> = data
            .product_categories
            .unwrap_or_default()
            .nodes
            .into_iter()
            .map(Category::from)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(Arc::new(categories.clone())))
            .await;

        Ok(categories)
    }
}
