//! Product and category route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{Category, Facets, FilterQuery, Product, ProductFilter, facets};
use crate::error::Result;
use crate::state::AppState;

/// A filtered product listing with the filter values on offer.
#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub products: Vec<Product>,
    /// Computed from the unfiltered listing so every option stays visible.
    pub facets: Facets,
    pub filter: ProductFilter,
}

/// Product listing.
///
/// # Route
///
/// `GET /api/products[?category=&color=&size=]`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<ProductListing>> {
    let products = state.catalog().products().await?;
    let filter = ProductFilter::from(&query);
    let facets = facets(&products);

    Ok(Json(ProductListing {
        products: filter.apply(products),
        facets,
        filter,
    }))
}

/// Product detail.
///
/// # Route
///
/// `GET /api/products/{slug}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Product>> {
    Ok(Json(state.catalog().product_by_slug(&slug).await?))
}

/// Top-level categories.
///
/// # Route
///
/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}
