use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RefreshSummary — Outcome report for one price-refresh run
// ---------------------------------------------------------------------------

/// Summary of a single `refresh_all` invocation. Ephemeral; constructed fresh
/// per run and never persisted.
///
/// When every record in the snapshot is attempted exactly once,
/// `updated_count + error_count == total_cards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub success: bool,
    pub updated_count: usize,
    pub error_count: usize,
    pub total_cards: usize,
    pub message: String,
}

impl RefreshSummary {
    /// Summary for an empty portfolio. This is success, not an error.
    pub fn empty() -> Self {
        Self {
            success: true,
            updated_count: 0,
            error_count: 0,
            total_cards: 0,
            message: "No cards in portfolio to update".to_string(),
        }
    }

    pub fn from_counts(updated_count: usize, error_count: usize, total_cards: usize) -> Self {
        let message = if error_count > 0 {
            format!("Updated {updated_count} cards successfully, {error_count} failed")
        } else {
            format!("Updated {updated_count} cards successfully")
        };
        Self {
            success: true,
            updated_count,
            error_count,
            total_cards,
            message,
        }
    }
}
