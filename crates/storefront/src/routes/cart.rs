//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every successful mutation
//! responds with the recomputed cart and an `HX-Trigger: cart-updated`
//! header so other views on the page refresh.

use axum::{
    Json,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use bloom_core::{DeliveryMethod, LineItemId, ProductId, Quantity};

use crate::cart::{CART_UPDATED, CartService, CartSnapshot};
use crate::catalog::{Product, TRENDING_TAG, tagged};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Response header that tells the page the cart changed.
pub const HX_TRIGGER: &str = "HX-Trigger";

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: LineItemId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: LineItemId,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeliveryQuery {
    pub delivery: Option<DeliveryMethod>,
}

/// The cart page: contents, totals and suggested products.
#[derive(Debug, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: CartSnapshot,
    pub recommendations: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct AddedView {
    pub line_id: LineItemId,
    #[serde(flatten)]
    pub cart: CartSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u32,
}

/// Parse a quantity from the picker, which offers 1 through 10.
fn picked_quantity(value: u32) -> Result<Quantity> {
    let quantity = Quantity::new(value)?;
    if !quantity.is_selectable() {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {}",
            Quantity::MAX_SELECTABLE
        )));
    }
    Ok(quantity)
}

/// Suggested products for the cart page. A catalog outage leaves the list
/// empty rather than failing the page.
async fn recommendations(state: &AppState) -> Vec<Product> {
    match state.catalog().products().await {
        Ok(products) => tagged(&products, TRENDING_TAG).into_iter().cloned().collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load cart recommendations");
            Vec::new()
        }
    }
}

/// Display the cart.
///
/// # Route
///
/// `GET /api/cart[?delivery=express]`
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DeliveryQuery>,
) -> Json<CartView> {
    let service = CartService::new(&session, state.events());
    let cart = service.snapshot(query.delivery.unwrap_or_default()).await;

    Json(CartView {
        cart,
        recommendations: recommendations(&state).await,
    })
}

/// Add a product to the cart.
///
/// The price, name and image come from the catalog, never from the request.
///
/// # Route
///
/// `POST /api/cart/add`
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let quantity = picked_quantity(request.quantity.unwrap_or(1))?;
    let product = state.catalog().product(request.product_id).await?;

    let service = CartService::new(&session, state.events());
    let (line_id, cart) = service
        .add_item(product.line_item(request.color, request.size), quantity)
        .await?;

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        Json(AddedView { line_id, cart }),
    ))
}

/// Change the quantity of a cart line.
///
/// # Route
///
/// `POST /api/cart/update`
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<impl IntoResponse> {
    let quantity = picked_quantity(request.quantity)?;

    let service = CartService::new(&session, state.events());
    let cart = service.set_quantity(request.line_id, quantity).await?;

    Ok((AppendHeaders([(HX_TRIGGER, CART_UPDATED)]), Json(cart)))
}

/// Remove a cart line.
///
/// # Route
///
/// `POST /api/cart/remove`
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<impl IntoResponse> {
    let service = CartService::new(&session, state.events());
    let cart = service.remove_item(request.line_id).await?;

    Ok((AppendHeaders([(HX_TRIGGER, CART_UPDATED)]), Json(cart)))
}

/// Number of units in the cart, for the header badge.
///
/// # Route
///
/// `GET /api/cart/count`
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CountView> {
    let service = CartService::new(&session, state.events());
    Json(CountView {
        count: service.item_count().await,
    })
}
