use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OwnedCard — A card held in the portfolio (one row per catalog id)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedCard {
    pub id: i64,
    /// Stable catalog key, unique across the portfolio.
    pub card_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub set_name: Option<String>,
    pub rarity: Option<String>,
    /// Last known unit price; mutated only by the refresh routine or an
    /// explicit edit.
    pub price: Option<f64>,
    pub quantity: i64,
    pub added_at: Option<String>,
}

// ---------------------------------------------------------------------------
// NewCard — Payload for adding a card to the portfolio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub card_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub set_name: Option<String>,
    pub rarity: Option<String>,
    pub price: Option<f64>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

// ---------------------------------------------------------------------------
// SearchRecord — One saved catalog search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    pub query: String,
    pub results_count: i64,
    pub searched_at: Option<String>,
}

// ---------------------------------------------------------------------------
// PortfolioSummary — Aggregated holdings for the summary panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Number of distinct catalog entries held.
    pub total_cards: i64,
    /// Total copies across all entries.
    pub total_copies: i64,
    /// Sum of quantity × unit price over entries with a known price.
    pub total_value: f64,
}
