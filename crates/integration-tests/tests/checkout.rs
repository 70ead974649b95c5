//! Integration tests for checkout and order submission.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use bloom_integration_tests::{ORDER_ID, SHIRT, TOTE, TestContext, checkout_form, test_user};
use serde_json::json;

async fn signed_in_with_cart() -> TestContext {
    let ctx = TestContext::new();
    ctx.sign_in(&test_user()).await;
    ctx.post("/api/cart/add", json!({"product_id": SHIRT, "quantity": 3}))
        .await;
    ctx.post("/api/cart/add", json!({"product_id": TOTE})).await;
    ctx
}

// ============================================================================
// Sign-in gating
// ============================================================================

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let ctx = TestContext::new();

    let resp = ctx.get("/api/checkout").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = ctx.post("/api/checkout", checkout_form()).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.orders.calls(), 0);
}

#[tokio::test]
async fn test_checkout_summary_prefills_email() {
    let ctx = signed_in_with_cart().await;
    let resp = ctx.get("/api/checkout").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["email"], "ada@example.com");
    assert_eq!(resp.body["totals"]["subtotal"], "94.97");
    assert_eq!(resp.body["delivery_methods"].as_array().unwrap().len(), 2);
    assert_eq!(resp.body["submission"]["state"], "idle");
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_empty_form_lists_every_required_field() {
    let ctx = signed_in_with_cart().await;
    // Blank email is filled from the account, so it is not reported
    let resp = ctx.post("/api/checkout", json!({})).await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = resp.body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    for field in [
        "first_name",
        "last_name",
        "address1",
        "city",
        "postcode",
        "country",
        "phone",
        "payment.card_number",
        "payment.cvc",
    ] {
        assert!(fields.contains(&field), "missing error for {field}");
    }
    assert!(!fields.contains(&"email"));
    assert_eq!(ctx.orders.calls(), 0);

    // Cart untouched
    let count = ctx.get("/api/cart/count").await;
    assert_eq!(count.body["count"], 4);
}

#[tokio::test]
async fn test_short_card_number_is_rejected() {
    let ctx = signed_in_with_cart().await;
    let mut form = checkout_form();
    form["payment"]["card_number"] = json!("123456789012345");

    let resp = ctx.post("/api/checkout", form).await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["fields"][0]["field"], "payment.card_number");
    assert_eq!(ctx.orders.calls(), 0);
}

#[tokio::test]
async fn test_paypal_skips_card_fields() {
    let ctx = signed_in_with_cart().await;
    let mut form = checkout_form();
    form["payment_method"] = json!("paypal");
    form["payment"] = json!({});

    let resp = ctx.post("/api/checkout", form).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let ctx = TestContext::new();
    ctx.sign_in(&test_user()).await;

    let resp = ctx.post("/api/checkout", checkout_form()).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.orders.calls(), 0);
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_successful_order_clears_cart() {
    let ctx = signed_in_with_cart().await;
    let resp = ctx.post("/api/checkout", checkout_form()).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert_eq!(resp.body["order_id"], ORDER_ID);
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(resp.body["totals"]["subtotal"], "94.97");
    assert_eq!(ctx.orders.calls(), 1);

    let order = ctx.orders.last_order().unwrap();
    assert_eq!(order.payment_method, "cod");
    assert!(order.set_paid);
    assert_eq!(order.line_items.len(), 2);
    assert_eq!(order.line_items[0].quantity, 3);
    assert_eq!(order.billing.email.as_deref(), Some("ada@example.com"));
    assert_eq!(order.shipping.email, None);
    assert_eq!(order.shipping_lines[0].method_id, "free_shipping");

    let count = ctx.get("/api/cart/count").await;
    assert_eq!(count.body["count"], 0);

    let confirmation = ctx.get("/api/checkout/confirmation").await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert_eq!(confirmation.body["order_id"], ORDER_ID);
    assert_eq!(confirmation.body["customer"]["first_name"], "Ada");
}

#[tokio::test]
async fn test_blank_email_uses_account_email() {
    let ctx = signed_in_with_cart().await;
    let mut form = checkout_form();
    form["customer"]["email"] = json!("");

    let resp = ctx.post("/api/checkout", form).await;

    assert_eq!(resp.status, StatusCode::OK);
    let order = ctx.orders.last_order().unwrap();
    assert_eq!(order.billing.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_failed_order_keeps_cart() {
    let ctx = signed_in_with_cart().await;
    ctx.orders.set_failing(true);

    let resp = ctx.post("/api/checkout", checkout_form()).await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        resp.body["error"],
        "Order service unavailable, please try again"
    );
    assert_eq!(ctx.orders.calls(), 1);

    let summary = ctx.get("/api/checkout").await;
    assert_eq!(summary.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(summary.body["submission"]["state"], "failed");

    // A retry after a failure goes through
    ctx.orders.set_failing(false);
    let retry = ctx.post("/api/checkout", checkout_form()).await;
    assert_eq!(retry.status, StatusCode::OK);
    assert_eq!(ctx.orders.calls(), 2);
}

#[tokio::test]
async fn test_overlapping_submissions_place_one_order() {
    let ctx = signed_in_with_cart().await;
    ctx.orders.set_delay_ms(300);

    let (first, second) = tokio::join!(ctx.post("/api/checkout", checkout_form()), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        ctx.post("/api/checkout", checkout_form()).await
    });

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(ctx.orders.calls(), 1);

    // The slot is released once the first submission finishes
    let summary = ctx.get("/api/checkout").await;
    assert_eq!(summary.body["submission"]["state"], "succeeded");
    let again = ctx.post("/api/checkout", checkout_form()).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_state_survives_the_error_response() {
    let ctx = signed_in_with_cart().await;
    ctx.orders.set_failing(true);

    let resp = ctx.post("/api/checkout", checkout_form()).await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);

    let summary = ctx.get("/api/checkout").await;
    assert_eq!(summary.body["submission"]["state"], "failed");
    assert!(summary.body["submission"]["reason"].is_string());
}

#[tokio::test]
async fn test_confirmation_without_order() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/checkout/confirmation").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_logout_clears_identity_and_cart() {
    let ctx = signed_in_with_cart().await;

    let resp = ctx.post("/auth/logout", json!({})).await;
    assert!(resp.status.is_redirection());
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));

    let count = ctx.get("/api/cart/count").await;
    assert_eq!(count.body["count"], 0);

    let checkout = ctx.get("/api/checkout").await;
    assert_eq!(checkout.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_redirects_to_google() {
    let ctx = TestContext::new();
    let resp = ctx.get("/auth/login").await;

    assert!(resp.status.is_redirection());
    let location = resp.header("location").unwrap();
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_callback_with_wrong_state_is_refused() {
    let ctx = TestContext::new();
    ctx.get("/auth/login").await;

    let resp = ctx.get("/auth/callback?code=abc&state=forged").await;

    assert_eq!(resp.header("location"), Some("/?error=invalid_state"));
    let checkout = ctx.get("/api/checkout").await;
    assert_eq!(checkout.status, StatusCode::UNAUTHORIZED);
}
