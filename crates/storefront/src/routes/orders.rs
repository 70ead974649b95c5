//! Order history.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::commerce::OrderSummary;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Orders placed with the signed-in customer's email.
///
/// # Route
///
/// `GET /api/orders`
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = state.orders().list_orders(&user.email).await?;
    Ok(Json(orders))
}
