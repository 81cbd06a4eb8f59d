use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CatalogCard — Card as returned by the Pokémon TCG catalog API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCard {
    pub id: String,
    pub name: String,
    pub images: Option<CardImages>,
    pub set: Option<CardSetInfo>,
    pub rarity: Option<String>,
    pub cardmarket: Option<Cardmarket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardImages {
    pub small: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSetInfo {
    pub name: Option<String>,
    pub series: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cardmarket {
    pub prices: Option<MarketPrices>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrices {
    pub average_sell_price: Option<f64>,
    pub low_price: Option<f64>,
    pub high_price: Option<f64>,
}

impl CatalogCard {
    /// Latest observed market price for this printing, if any.
    ///
    /// Uses Cardmarket's average sell price. Zero and negative values are
    /// treated as "no price available", the same as a missing field.
    pub fn market_price(&self) -> Option<f64> {
        self.cardmarket
            .as_ref()?
            .prices
            .as_ref()?
            .average_sell_price
            .filter(|p| *p > 0.0)
    }
}

// ---------------------------------------------------------------------------
// SearchPage — The upstream search envelope, passed through to the UI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub data: Vec<CatalogCard>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
}
