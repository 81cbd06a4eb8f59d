//! HTTP API exposing the tracker to the web UI.
//!
//! Routes mirror the JSON contract the presentation layer consumes: catalog
//! search, search history, portfolio CRUD, and the price-refresh trigger.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::Cardfolio;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    pub folio: Cardfolio,
}

/// Build the API router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/search", get(routes::search::search_cards))
        .route("/api/history", get(routes::search::search_history))
        .route(
            "/api/portfolio",
            get(routes::portfolio::list_cards)
                .post(routes::portfolio::add_card)
                .put(routes::portfolio::update_card)
                .delete(routes::portfolio::remove_card),
        )
        .route("/api/portfolio/summary", get(routes::portfolio::summary))
        .route(
            "/api/portfolio/update-prices",
            post(routes::portfolio::update_prices),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
