//! Checkout route handlers.

use axum::{
    Json,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use bloom_core::{CheckoutForm, DeliveryMethod, Money, SubmissionState};

use crate::cart::{CART_UPDATED, CartService, CartSnapshot, CheckoutStore};
use crate::checkout::{OrderConfirmation, OrderSubmitter};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::routes::cart::{DeliveryQuery, HX_TRIGGER};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeliveryOption {
    pub id: DeliveryMethod,
    pub title: &'static str,
    pub turnaround: &'static str,
    pub shipping: Money,
}

impl From<DeliveryMethod> for DeliveryOption {
    fn from(method: DeliveryMethod) -> Self {
        Self {
            id: method,
            title: method.title(),
            turnaround: method.turnaround(),
            shipping: method.shipping(),
        }
    }
}

/// Everything the checkout page needs to render.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    #[serde(flatten)]
    pub cart: CartSnapshot,
    /// Prefill for the contact email field.
    pub email: String,
    pub delivery_methods: Vec<DeliveryOption>,
    pub submission: SubmissionState,
}

/// Display the checkout summary.
///
/// # Route
///
/// `GET /api/checkout[?delivery=express]`
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<DeliveryQuery>,
) -> Json<CheckoutView> {
    let service = CartService::new(&session, state.events());
    let cart = service.snapshot(query.delivery.unwrap_or_default()).await;

    Json(CheckoutView {
        cart,
        email: user.email.to_string(),
        delivery_methods: DeliveryMethod::ALL.into_iter().map(DeliveryOption::from).collect(),
        submission: session.submission_state().await,
    })
}

/// Place the order.
///
/// A blank contact email falls back to the signed-in account's email. A
/// second submission from the same session while one is in progress gets
/// 409 Conflict.
///
/// # Route
///
/// `POST /api/checkout`
#[instrument(skip(state, session, user, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(mut form): Json<CheckoutForm>,
) -> Result<impl IntoResponse> {
    if form.customer.email.trim().is_empty() {
        form.customer.email = user.email.to_string();
    }

    // Signed-in sessions always have a stored id.
    let _in_flight = session
        .id()
        .map(|id| {
            state
                .submissions()
                .try_begin(id.to_string())
                .ok_or_else(|| AppError::Conflict("an order is already being placed".to_string()))
        })
        .transpose()?;

    add_breadcrumb("checkout", "Order submitted", None);

    let submitter = OrderSubmitter::new(&session, state.orders(), state.events());
    let confirmation = submitter.submit(&form).await?;

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED)]),
        Json(confirmation),
    ))
}

/// The last placed order, for the thank-you page.
///
/// # Route
///
/// `GET /api/checkout/confirmation`
#[instrument(skip(session))]
pub async fn confirmation(session: Session) -> Result<Json<OrderConfirmation>> {
    session
        .confirmation()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no recent order".to_string()))
}
