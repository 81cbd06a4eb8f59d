use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::models::{SearchPage, SearchRecord};
use crate::server::error::AppError;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

/// GET /api/search?q=charizard&page=1&pageSize=20
///
/// Proxy a catalog search and record it in the search history.
pub async fn search_cards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, AppError> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing required query parameter: q"))?;

    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(20);
    let results = state.folio.search(&query, page, page_size).await?;
    Ok(Json(results))
}

/// GET /api/history
///
/// The most recent catalog searches, newest first.
pub async fn search_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SearchRecord>>, AppError> {
    let history = state.folio.search_history().await?;
    Ok(Json(history))
}
