use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{NewCard, OwnedCard, PortfolioSummary, RefreshSummary};
use crate::server::error::AppError;
use crate::server::AppState;

/// GET /api/portfolio
///
/// All owned cards, newest first.
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OwnedCard>>, AppError> {
    let cards = state.folio.portfolio().await?;
    Ok(Json(cards))
}

/// POST /api/portfolio
///
/// Add a card to the portfolio, or bump the quantity of an already-held one.
pub async fn add_card(
    State(state): State<Arc<AppState>>,
    Json(card): Json<NewCard>,
) -> Result<Json<Value>, AppError> {
    if card.card_id.trim().is_empty() || card.name.trim().is_empty() {
        return Err(AppError::bad_request("Card ID and name are required"));
    }
    state.folio.add_card(card).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct UpdateCardBody {
    pub card_id: String,
    pub quantity: i64,
    pub price: f64,
}

/// PUT /api/portfolio
///
/// Update quantity and unit price of an owned card.
pub async fn update_card(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateCardBody>,
) -> Result<Json<Value>, AppError> {
    state
        .folio
        .update_card(body.card_id, body.quantity, body.price)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct RemoveParams {
    pub card_id: Option<String>,
}

/// DELETE /api/portfolio?card_id=xy7-54
pub async fn remove_card(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RemoveParams>,
) -> Result<Json<Value>, AppError> {
    let card_id = params
        .card_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Card ID is required"))?;
    state.folio.remove_card(card_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/portfolio/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioSummary>, AppError> {
    let summary = state.folio.summary().await?;
    Ok(Json(summary))
}

/// POST /api/portfolio/update-prices
///
/// Run a full price refresh over the portfolio. Per-card failures are
/// absorbed into the summary's error count; only a failure to read the
/// record set at all surfaces as an error response.
pub async fn update_prices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshSummary>, AppError> {
    let summary = state
        .folio
        .refresh_prices()
        .await
        .map_err(|e| AppError::internal(format!("Failed to update portfolio prices: {e}")))?;
    Ok(Json(summary))
}
