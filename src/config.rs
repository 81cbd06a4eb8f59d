use std::path::PathBuf;
use std::time::Duration;

pub const API_BASE: &str = "https://api.pokemontcg.io/v2";

/// Environment variable holding the Pokémon TCG API key. The key is optional;
/// without it the upstream applies much stricter rate limits.
pub const API_KEY_ENV: &str = "POKEMON_TCG_API_KEY";

/// Page size used for name-grouped batch lookups (the upstream maximum).
pub const BATCH_LOOKUP_PAGE_SIZE: u32 = 250;

/// How many search-history rows the history endpoint returns.
pub const SEARCH_HISTORY_LIMIT: usize = 50;

// Refresh policy defaults. Together these keep the sustained outbound request
// rate under ~10 per second, within the upstream's published limits.
pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_MAX_CONCURRENT: usize = 5;
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(50);
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

pub fn default_db_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("cardfolio").join("portfolio.duckdb")
    } else {
        PathBuf::from("portfolio.duckdb")
    }
}
