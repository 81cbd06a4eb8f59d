//! Personal trading-card collection tracker.
//!
//! Provides a searchable view of the Pokémon TCG catalog and a persisted
//! portfolio of owned cards with quantity and price tracking. Owned records
//! live in an embedded DuckDB store; prices come from the public catalog API
//! and are refreshed in bounded-concurrency batches.
//!
//! # Quick start
//!
//! ```no_run
//! use cardfolio::Cardfolio;
//!
//! # async fn demo() -> cardfolio::Result<()> {
//! let folio = Cardfolio::builder().build()?;
//!
//! // Search the catalog
//! let page = folio.search("Charizard", 1, 20).await?;
//!
//! // Refresh stored prices
//! let summary = folio.refresh_prices().await?;
//! println!("{}", summary.message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod refresh;
pub mod server;
pub mod store;

pub use error::{CardfolioError, Result};
pub use pricing::{PriceSource, PricingClient};
pub use refresh::{LookupStrategy, PriceRefresher, RefreshConfig, RefreshHandle};
pub use store::PortfolioStore;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::warn;

use crate::models::{NewCard, OwnedCard, PortfolioSummary, RefreshSummary, SearchPage, SearchRecord};
use crate::store::{run_store, SharedStore};

// ---------------------------------------------------------------------------
// CardfolioBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Cardfolio`] instance.
///
/// Use [`Cardfolio::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CardfolioBuilder::build).
pub struct CardfolioBuilder {
    db_path: Option<PathBuf>,
    in_memory: bool,
    api_key: Option<String>,
    timeout: Duration,
    refresh: RefreshConfig,
    price_source: Option<Arc<dyn PriceSource>>,
}

impl Default for CardfolioBuilder {
    fn default() -> Self {
        Self {
            db_path: None,
            in_memory: false,
            api_key: None,
            timeout: Duration::from_secs(30),
            refresh: RefreshConfig::default(),
            price_source: None,
        }
    }
}

impl CardfolioBuilder {
    /// Set a custom portfolio database path.
    ///
    /// If not set, the platform-appropriate data directory is used
    /// (e.g. `~/.local/share/cardfolio/portfolio.duckdb` on Linux).
    pub fn db_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.db_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an in-memory store instead of a database file. Nothing is
    /// persisted across restarts; intended for tests.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Set the catalog API key explicitly, overriding the
    /// `POKEMON_TCG_API_KEY` environment variable.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the HTTP request timeout for catalog calls. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tune the price-refresh policy (batch size, concurrency ceiling,
    /// delays, lookup strategy).
    pub fn refresh_config(mut self, config: RefreshConfig) -> Self {
        self.refresh = config;
        self
    }

    /// Replace the price source used by the refresh routine. The catalog
    /// search interface keeps using the regular API client.
    pub fn price_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.price_source = Some(source);
        self
    }

    /// Build the tracker, opening the store and constructing the API client.
    pub fn build(self) -> Result<Cardfolio> {
        let store = if self.in_memory {
            PortfolioStore::open_in_memory()?
        } else {
            let path = self.db_path.unwrap_or_else(config::default_db_path);
            PortfolioStore::open(path)?
        };

        let api_key = self
            .api_key
            .or_else(|| std::env::var(config::API_KEY_ENV).ok());
        let catalog = PricingClient::new(api_key, self.timeout)?;
        let source: Arc<dyn PriceSource> = match self.price_source {
            Some(source) => source,
            None => Arc::new(catalog.clone()),
        };

        Ok(Cardfolio {
            store: Arc::new(Mutex::new(store)),
            catalog,
            source,
            refresh: self.refresh,
        })
    }
}

// ---------------------------------------------------------------------------
// Cardfolio
// ---------------------------------------------------------------------------

/// The main entry point for the collection tracker.
///
/// Owns the portfolio store (opened on construction, closed on drop) and the
/// catalog API client, and hands out [`PriceRefresher`]s for price sweeps.
pub struct Cardfolio {
    store: SharedStore,
    catalog: PricingClient,
    source: Arc<dyn PriceSource>,
    refresh: RefreshConfig,
}

impl Cardfolio {
    /// Create a new builder for configuring the tracker.
    pub fn builder() -> CardfolioBuilder {
        CardfolioBuilder::default()
    }

    // -- Portfolio -----------------------------------------------------------

    /// All owned cards, newest first.
    pub async fn portfolio(&self) -> Result<Vec<OwnedCard>> {
        run_store(Arc::clone(&self.store), |s| s.fetch_all_owned()).await
    }

    /// Add a card, or bump its quantity if the catalog id is already held.
    pub async fn add_card(&self, card: NewCard) -> Result<()> {
        run_store(Arc::clone(&self.store), move |s| s.add_card(&card)).await
    }

    /// Update quantity and unit price of an owned card.
    pub async fn update_card(&self, card_id: String, quantity: i64, price: f64) -> Result<()> {
        run_store(Arc::clone(&self.store), move |s| {
            s.update_card(&card_id, quantity, price)
        })
        .await
    }

    /// Remove a card from the portfolio.
    pub async fn remove_card(&self, card_id: String) -> Result<()> {
        run_store(Arc::clone(&self.store), move |s| s.remove_card(&card_id)).await
    }

    /// Aggregated holdings (distinct cards, total copies, total value).
    pub async fn summary(&self) -> Result<PortfolioSummary> {
        run_store(Arc::clone(&self.store), |s| s.summary()).await
    }

    // -- Catalog search --------------------------------------------------------

    /// Search the catalog by name and record the query in the search history.
    ///
    /// A history write failure is logged but never fails the search itself.
    pub async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<SearchPage> {
        let results = self.catalog.search_cards(query, page, page_size).await?;

        let recorded_query = query.to_string();
        let count = results.data.len() as i64;
        if let Err(e) = run_store(Arc::clone(&self.store), move |s| {
            s.record_search(&recorded_query, count)
        })
        .await
        {
            warn!(error = %e, "failed to record search history");
        }

        Ok(results)
    }

    /// Most recent searches, newest first.
    pub async fn search_history(&self) -> Result<Vec<SearchRecord>> {
        run_store(Arc::clone(&self.store), |s| {
            s.recent_searches(config::SEARCH_HISTORY_LIMIT)
        })
        .await
    }

    // -- Price refresh ----------------------------------------------------------

    /// Build a refresher bound to this tracker's store, price source, and
    /// refresh policy. Use this directly when cancellation is needed.
    pub fn refresher(&self) -> PriceRefresher {
        PriceRefresher::new(
            Arc::clone(&self.store),
            Arc::clone(&self.source),
            self.refresh.clone(),
        )
    }

    /// Refresh every owned card's price and return the summary.
    pub async fn refresh_prices(&self) -> Result<RefreshSummary> {
        self.refresher().refresh_all().await
    }

    /// Access the catalog API client for advanced usage.
    pub fn catalog(&self) -> &PricingClient {
        &self.catalog
    }
}
