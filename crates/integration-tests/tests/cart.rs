//! Integration tests for the session cart.
//!
//! Every mutation goes through the router, so these cover the session
//! round-trip as well as the totals the pages show.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use bloom_integration_tests::{SHIRT, TOTE, TestContext};
use serde_json::{Value, json};

fn line_id(body: &Value, index: usize) -> String {
    body["items"][index]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let resp = ctx.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, Value::String("ok".to_string()));
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_empty_cart_totals() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/cart").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["items"], json!([]));
    assert_eq!(resp.body["totals"]["subtotal"], "0.00");
    assert_eq!(resp.body["totals"]["tax_amount"], "0.00");
    assert_eq!(resp.body["totals"]["grand_total"], "0.00");
}

#[tokio::test]
async fn test_empty_cart_has_no_express_charge() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/cart?delivery=express").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["totals"]["shipping"], "0.00");
    assert_eq!(resp.body["totals"]["grand_total"], "0.00");
}

#[tokio::test]
async fn test_add_uses_catalog_price_and_triggers_update() {
    let ctx = TestContext::new();
    let resp = ctx
        .post(
            "/api/cart/add",
            json!({"product_id": SHIRT, "quantity": 3, "color": "White"}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert!(resp.body["line_id"].is_string());

    let item = &resp.body["items"][0];
    assert_eq!(item["name"], "Linen Shirt");
    assert_eq!(item["unitPrice"], "19.99");
    assert_eq!(item["selectedAttributes"]["color"], "White");
    // Size defaults to the first option
    assert_eq!(item["selectedAttributes"]["size"], "M");

    assert_eq!(resp.body["totals"]["subtotal"], "59.97");
    assert_eq!(resp.body["totals"]["tax_amount"], "5.52");
    assert_eq!(resp.body["totals"]["grand_total"], "65.49");
}

#[tokio::test]
async fn test_cart_persists_across_requests() {
    let ctx = TestContext::new();
    ctx.post("/api/cart/add", json!({"product_id": SHIRT})).await;
    ctx.post("/api/cart/add", json!({"product_id": TOTE, "quantity": 2}))
        .await;

    let count = ctx.get("/api/cart/count").await;
    assert_eq!(count.body["count"], 3);

    let cart = ctx.get("/api/cart").await;
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart.body["items"][0]["name"], "Linen Shirt");
    assert_eq!(cart.body["items"][1]["name"], "Canvas Tote");
    assert_eq!(cart.body["totals"]["subtotal"], "89.99");
}

#[tokio::test]
async fn test_add_rejects_quantity_outside_picker() {
    let ctx = TestContext::new();

    let resp = ctx
        .post("/api/cart/add", json!({"product_id": SHIRT, "quantity": 11}))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = ctx
        .post("/api/cart/add", json!({"product_id": SHIRT, "quantity": 0}))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_unknown_product() {
    let ctx = TestContext::new();
    let resp = ctx.post("/api/cart/add", json!({"product_id": 999})).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_quantity_recomputes_totals() {
    let ctx = TestContext::new();
    let added = ctx.post("/api/cart/add", json!({"product_id": SHIRT})).await;
    let line = line_id(&added.body, 0);

    let resp = ctx
        .post("/api/cart/update", json!({"line_id": line, "quantity": 3}))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert_eq!(resp.body["items"][0]["quantity"], 3);
    assert_eq!(resp.body["totals"]["subtotal"], "59.97");
}

#[tokio::test]
async fn test_remove_shifts_later_items() {
    let ctx = TestContext::new();
    ctx.post("/api/cart/add", json!({"product_id": SHIRT})).await;
    let added = ctx.post("/api/cart/add", json!({"product_id": TOTE})).await;
    let first = line_id(&added.body, 0);

    let resp = ctx.post("/api/cart/remove", json!({"line_id": first})).await;

    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Canvas Tote");
    assert_eq!(resp.body["totals"]["subtotal"], "35.00");
}

#[tokio::test]
async fn test_stale_line_is_not_found() {
    let ctx = TestContext::new();
    let added = ctx.post("/api/cart/add", json!({"product_id": SHIRT})).await;
    let line = line_id(&added.body, 0);
    ctx.post("/api/cart/remove", json!({"line_id": line})).await;

    let resp = ctx.post("/api/cart/remove", json!({"line_id": line})).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "line item not found");
    assert!(resp.header("hx-trigger").is_none());
}

// ============================================================================
// Cart page
// ============================================================================

#[tokio::test]
async fn test_cart_page_recommends_trending_products() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/cart").await;

    let names: Vec<&str> = resp.body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Linen Shirt"]);
}

#[tokio::test]
async fn test_express_delivery_adds_shipping() {
    let ctx = TestContext::new();
    ctx.post("/api/cart/add", json!({"product_id": SHIRT, "quantity": 3}))
        .await;

    let resp = ctx.get("/api/cart?delivery=express").await;
    assert_eq!(resp.body["totals"]["shipping"], "15.00");
    assert_eq!(resp.body["totals"]["grand_total"], "80.49");
}
