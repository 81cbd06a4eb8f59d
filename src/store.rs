//! DuckDB-backed portfolio record store.
//!
//! Holds the owned-card records and the search history. The store is
//! constructed explicitly (file-backed or in-memory) and injected into
//! whatever needs it; there is no process-wide handle. The schema is created
//! idempotently on open.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use duckdb::{params, Connection as DuckDbConnection};

use crate::error::{CardfolioError, Result};
use crate::models::{NewCard, OwnedCard, PortfolioSummary, SearchRecord};

const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS portfolio_cards_id_seq;
CREATE TABLE IF NOT EXISTS portfolio_cards (
    id BIGINT PRIMARY KEY DEFAULT nextval('portfolio_cards_id_seq'),
    card_id TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    image_url TEXT,
    set_name TEXT,
    rarity TEXT,
    price DOUBLE,
    quantity BIGINT NOT NULL DEFAULT 1,
    added_at TIMESTAMP DEFAULT current_timestamp
);
CREATE SEQUENCE IF NOT EXISTS search_history_id_seq;
CREATE TABLE IF NOT EXISTS search_history (
    id BIGINT PRIMARY KEY DEFAULT nextval('search_history_id_seq'),
    "query" TEXT NOT NULL,
    results_count BIGINT,
    searched_at TIMESTAMP DEFAULT current_timestamp
);
"#;

const OWNED_CARD_COLUMNS: &str = "id, card_id, name, image_url, set_name, rarity, price, \
     quantity, CAST(added_at AS VARCHAR) AS added_at";

// ---------------------------------------------------------------------------
// PortfolioStore
// ---------------------------------------------------------------------------

/// Wraps a DuckDB connection holding the portfolio tables.
///
/// The store accepts concurrent `update_price` calls for distinct card ids
/// from the refresh routine; callers serialize access through a
/// [`SharedStore`] handle.
pub struct PortfolioStore {
    conn: DuckDbConnection,
}

/// Store handle shared between async callers. Blocking store operations run
/// on the Tokio blocking pool via [`run_store`].
pub type SharedStore = Arc<Mutex<PortfolioStore>>;

impl PortfolioStore {
    /// Open (or create) a file-backed store at the given path.
    ///
    /// Parent directories are created as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(path.as_ref())?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store. Used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // -- Owned-card records --------------------------------------------------

    /// Fetch every owned card, newest first.
    ///
    /// An empty portfolio returns an empty vector, not an error.
    pub fn fetch_all_owned(&self) -> Result<Vec<OwnedCard>> {
        let sql = format!(
            "SELECT {OWNED_CARD_COLUMNS} FROM portfolio_cards ORDER BY added_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(owned_card_from_row(row)?);
        }
        Ok(out)
    }

    /// Look up a single owned card by catalog id.
    pub fn get_card(&self, card_id: &str) -> Result<Option<OwnedCard>> {
        let sql = format!("SELECT {OWNED_CARD_COLUMNS} FROM portfolio_cards WHERE card_id = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![card_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(owned_card_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Add a card to the portfolio.
    ///
    /// If the catalog id is already held, the existing row's quantity is
    /// bumped instead of inserting a duplicate record.
    pub fn add_card(&self, card: &NewCard) -> Result<()> {
        if card.card_id.trim().is_empty() || card.name.trim().is_empty() {
            return Err(CardfolioError::InvalidArgument(
                "card_id and name are required".to_string(),
            ));
        }
        let quantity = card.quantity.max(1);

        if self.get_card(&card.card_id)?.is_some() {
            self.conn.execute(
                "UPDATE portfolio_cards SET quantity = quantity + ? WHERE card_id = ?",
                params![quantity, card.card_id],
            )?;
        } else {
            self.conn.execute(
                "INSERT INTO portfolio_cards \
                 (card_id, name, image_url, set_name, rarity, price, quantity) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    card.card_id,
                    card.name,
                    card.image_url,
                    card.set_name,
                    card.rarity,
                    card.price,
                    quantity
                ],
            )?;
        }
        Ok(())
    }

    /// Update quantity and unit price of an owned card.
    pub fn update_card(&self, card_id: &str, quantity: i64, price: f64) -> Result<()> {
        if quantity < 1 {
            return Err(CardfolioError::InvalidArgument(
                "quantity must be a positive integer".to_string(),
            ));
        }
        if price < 0.0 {
            return Err(CardfolioError::InvalidArgument(
                "price must be non-negative".to_string(),
            ));
        }
        let changed = self.conn.execute(
            "UPDATE portfolio_cards SET quantity = ?, price = ? WHERE card_id = ?",
            params![quantity, price, card_id],
        )?;
        if changed == 0 {
            return Err(CardfolioError::NotFound(format!(
                "no portfolio card with card_id '{card_id}'"
            )));
        }
        Ok(())
    }

    /// Persist a newly observed unit price for one card. Quantity and other
    /// fields are untouched.
    pub fn update_price(&self, card_id: &str, price: f64) -> Result<()> {
        if price < 0.0 {
            return Err(CardfolioError::InvalidArgument(
                "price must be non-negative".to_string(),
            ));
        }
        let changed = self.conn.execute(
            "UPDATE portfolio_cards SET price = ? WHERE card_id = ?",
            params![price, card_id],
        )?;
        if changed == 0 {
            return Err(CardfolioError::NotFound(format!(
                "no portfolio card with card_id '{card_id}'"
            )));
        }
        Ok(())
    }

    /// Remove a card from the portfolio. Removing an id that is not held is
    /// not an error.
    pub fn remove_card(&self, card_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM portfolio_cards WHERE card_id = ?",
            params![card_id],
        )?;
        Ok(())
    }

    /// Aggregate holdings for the portfolio summary panel.
    pub fn summary(&self) -> Result<PortfolioSummary> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(COUNT(*) AS BIGINT), \
                    CAST(COALESCE(SUM(quantity), 0) AS BIGINT), \
                    CAST(COALESCE(SUM(quantity * COALESCE(price, 0)), 0) AS DOUBLE) \
             FROM portfolio_cards",
        )?;
        let mut rows = stmt.query([])?;
        let row = rows.next()?.ok_or_else(|| {
            CardfolioError::NotFound("portfolio summary query returned no rows".to_string())
        })?;
        Ok(PortfolioSummary {
            total_cards: row.get(0)?,
            total_copies: row.get(1)?,
            total_value: row.get(2)?,
        })
    }

    // -- Search history -------------------------------------------------------

    pub fn record_search(&self, query: &str, results_count: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO search_history (\"query\", results_count) VALUES (?, ?)",
            params![query, results_count],
        )?;
        Ok(())
    }

    /// Most recent searches, newest first.
    pub fn recent_searches(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let sql = format!(
            "SELECT id, \"query\", results_count, CAST(searched_at AS VARCHAR) AS searched_at \
             FROM search_history ORDER BY searched_at DESC, id DESC LIMIT {limit}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(SearchRecord {
                id: row.get(0)?,
                query: row.get(1)?,
                results_count: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                searched_at: row.get(3)?,
            });
        }
        Ok(out)
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

fn owned_card_from_row(row: &duckdb::Row<'_>) -> Result<OwnedCard> {
    Ok(OwnedCard {
        id: row.get(0)?,
        card_id: row.get(1)?,
        name: row.get(2)?,
        image_url: row.get(3)?,
        set_name: row.get(4)?,
        rarity: row.get(5)?,
        price: row.get(6)?,
        quantity: row.get(7)?,
        added_at: row.get(8)?,
    })
}

// ---------------------------------------------------------------------------
// Async access
// ---------------------------------------------------------------------------

/// Run a blocking store operation on the Tokio blocking pool.
///
/// The store is `Send` but not `Sync`, so async callers share it behind a
/// `Mutex` and dispatch each operation to a blocking thread.
pub async fn run_store<F, T>(store: SharedStore, f: F) -> Result<T>
where
    F: FnOnce(&PortfolioStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let guard = store
            .lock()
            .map_err(|_| CardfolioError::InvalidArgument("store lock poisoned".to_string()))?;
        f(&guard)
    })
    .await
    .map_err(|e| CardfolioError::InvalidArgument(format!("task join error: {e}")))?
}
