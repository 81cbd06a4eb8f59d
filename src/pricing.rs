//! Catalog search and price lookups against the Pokémon TCG API.
//!
//! Two lookup strategies are exposed through [`PriceSource`]:
//! by-identifier (precise, one call per owned card) and by-name batching
//! (fewer calls, but every copy sharing a display name gets the same price
//! regardless of print or variant).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::config;
use crate::error::{CardfolioError, Result};
use crate::models::{CatalogCard, SearchPage};

// ---------------------------------------------------------------------------
// PriceSource
// ---------------------------------------------------------------------------

/// Source of latest observed card prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest price for the exact catalog entry.
    ///
    /// `Ok(None)` means the source responded but had no usable price this
    /// round -- a soft outcome, distinct from a hard failure.
    async fn price_by_id(&self, card_id: &str) -> Result<Option<f64>>;

    /// Batched lookup keyed by display name. Approximate: prefer
    /// [`price_by_id`](Self::price_by_id) when precision matters.
    async fn prices_by_names(&self, names: &[String]) -> Result<HashMap<String, f64>>;
}

// ---------------------------------------------------------------------------
// PricingClient
// ---------------------------------------------------------------------------

/// Pokémon TCG API client.
///
/// Authenticates with an `X-Api-Key` header when a key is configured. A
/// missing key is not fatal, but the upstream applies stricter rate limits,
/// which surface as [`CardfolioError::RateLimited`].
#[derive(Clone)]
pub struct PricingClient {
    client: Client,
    base: String,
    api_key: Option<String>,
}

impl PricingClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: config::API_BASE.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Build a client taking the API key from the environment.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        Self::new(std::env::var(config::API_KEY_ENV).ok(), timeout)
    }

    /// Override the API base URL (primarily for pointing at a stub server).
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("X-Api-Key", key);
        }
        req
    }

    /// Search the catalog by card name.
    ///
    /// Returns the upstream page envelope unchanged so the UI can paginate.
    pub async fn search_cards(&self, query: &str, page: u32, page_size: u32) -> Result<SearchPage> {
        let url = format!("{}/cards", self.base);
        let q = format!("name:\"{query}\"");
        let resp = self
            .get(&url)
            .query(&[
                ("q", q.as_str()),
                ("page", &page.to_string()),
                ("pageSize", &page_size.to_string()),
            ])
            .send()
            .await
            .map_err(upstream)?;
        let resp = check_status(resp)?;
        Ok(resp.json().await.map_err(upstream)?)
    }

    /// Fetch a single catalog entry by id. `Ok(None)` when the id no longer
    /// exists upstream.
    pub async fn get_card(&self, card_id: &str) -> Result<Option<CatalogCard>> {
        #[derive(Deserialize)]
        struct Envelope {
            data: CatalogCard,
        }

        let url = format!("{}/cards/{card_id}", self.base);
        let resp = self.get(&url).send().await.map_err(upstream)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp)?;
        let envelope: Envelope = resp.json().await.map_err(upstream)?;
        Ok(Some(envelope.data))
    }
}

#[async_trait]
impl PriceSource for PricingClient {
    async fn price_by_id(&self, card_id: &str) -> Result<Option<f64>> {
        Ok(self
            .get_card(card_id)
            .await?
            .and_then(|card| card.market_price()))
    }

    async fn prices_by_names(&self, names: &[String]) -> Result<HashMap<String, f64>> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!("{}/cards", self.base);
        let q = name_batch_query(names);
        let resp = self
            .get(&url)
            .query(&[
                ("q", q.as_str()),
                ("pageSize", &config::BATCH_LOOKUP_PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(upstream)?;
        let resp = check_status(resp)?;
        let page: SearchPage = resp.json().await.map_err(upstream)?;

        let mut prices = HashMap::new();
        for card in page.data {
            if let Some(price) = card.market_price() {
                prices.insert(card.name, price);
            }
        }
        Ok(prices)
    }
}

/// Build the upstream query for a batch of exact card names, e.g.
/// `name:"Pikachu" OR name:"Charizard"`.
pub fn name_batch_query(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("name:\"{name}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Map HTTP status codes onto the error taxonomy. 429 is an explicit throttle
/// signal; any other non-success status counts as the upstream being
/// unavailable.
fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CardfolioError::RateLimited);
    }
    if !status.is_success() {
        return Err(CardfolioError::UpstreamUnavailable(format!(
            "pricing API returned status {status}"
        )));
    }
    Ok(resp)
}

fn upstream(e: reqwest::Error) -> CardfolioError {
    CardfolioError::UpstreamUnavailable(e.to_string())
}
