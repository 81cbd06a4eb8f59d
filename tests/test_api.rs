//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cardfolio::server::{router, AppState};
use cardfolio::{Cardfolio, LookupStrategy, PriceSource, RefreshConfig};
use common::{MockPriceSource, Outcome};

fn test_app(source: Arc<MockPriceSource>) -> Router {
    let folio = Cardfolio::builder()
        .in_memory()
        .api_key("test-key")
        .refresh_config(RefreshConfig {
            batch_size: 20,
            max_concurrent: 5,
            stagger: Duration::ZERO,
            inter_batch_delay: Duration::ZERO,
            lookup_timeout: Duration::from_secs(5),
            strategy: LookupStrategy::ById,
        })
        .price_source(source as Arc<dyn PriceSource>)
        .build()
        .unwrap();
    router(Arc::new(AppState { folio }))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rayquaza() -> Value {
    json!({
        "card_id": "xy7-54",
        "name": "Rayquaza",
        "image_url": "https://img/xy7-54.png",
        "set_name": "Ancient Origins",
        "rarity": "Rare Holo",
        "price": 12.50,
        "quantity": 2
    })
}

// ---------------------------------------------------------------------------
// Portfolio CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_list_portfolio() {
    let app = test_app(Arc::new(MockPriceSource::new()));

    let (status, body) = send(&app, "POST", "/api/portfolio", Some(rayquaza())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "GET", "/api/portfolio", None).await;
    assert_eq!(status, StatusCode::OK);
    let cards = body.as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["card_id"], "xy7-54");
    assert_eq!(cards[0]["quantity"], 2);
}

#[tokio::test]
async fn add_rejects_blank_id_and_name() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    let (status, body) = send(
        &app,
        "POST",
        "/api/portfolio",
        Some(json!({ "card_id": "", "name": " " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_unknown_card_returns_not_found() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    let (status, body) = send(
        &app,
        "PUT",
        "/api/portfolio",
        Some(json!({ "card_id": "missing", "quantity": 1, "price": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_card_changes_quantity_and_price() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    send(&app, "POST", "/api/portfolio", Some(rayquaza())).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/portfolio",
        Some(json!({ "card_id": "xy7-54", "quantity": 5, "price": 13.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/portfolio", None).await;
    assert_eq!(body[0]["quantity"], 5);
    assert_eq!(body[0]["price"], 13.00);
}

#[tokio::test]
async fn remove_requires_card_id() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    let (status, _) = send(&app, "DELETE", "/api/portfolio", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn remove_card_via_query_param() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    send(&app, "POST", "/api/portfolio", Some(rayquaza())).await;

    let (status, body) = send(&app, "DELETE", "/api/portfolio?card_id=xy7-54", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, "GET", "/api/portfolio", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn summary_endpoint_reports_totals() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    send(&app, "POST", "/api/portfolio", Some(rayquaza())).await;

    let (status, body) = send(&app, "GET", "/api/portfolio/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCards"], 1);
    assert_eq!(body["totalCopies"], 2);
    assert_eq!(body["totalValue"], 25.00);
}

// ---------------------------------------------------------------------------
// Price refresh trigger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_prices_returns_refresh_summary() {
    let source = Arc::new(MockPriceSource::new());
    source.set("xy7-54", Outcome::Price(14.00));
    let app = test_app(Arc::clone(&source));
    send(&app, "POST", "/api/portfolio", Some(rayquaza())).await;

    let (status, body) = send(&app, "POST", "/api/portfolio/update-prices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["updatedCount"], 1);
    assert_eq!(body["errorCount"], 0);
    assert_eq!(body["totalCards"], 1);

    let (_, body) = send(&app, "GET", "/api/portfolio", None).await;
    assert_eq!(body[0]["price"], 14.00);
}

#[tokio::test]
async fn update_prices_on_empty_portfolio_is_success() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    let (status, body) = send(&app, "POST", "/api/portfolio/update-prices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCards"], 0);
    assert_eq!(body["message"], "No cards in portfolio to update");
}

// ---------------------------------------------------------------------------
// Search validation and history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_requires_query_param() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    let (status, body) = send(&app, "GET", "/api/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn history_starts_empty() {
    let app = test_app(Arc::new(MockPriceSource::new()));
    let (status, body) = send(&app, "GET", "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
