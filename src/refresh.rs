//! Portfolio price-refresh batch updater.
//!
//! Sweeps every owned card in fixed-size batches, looks up the latest
//! observed price with bounded concurrency, writes successful results back to
//! the store, and reports a [`RefreshSummary`]. A single record's failure
//! never aborts the run; only an inability to read the initial record set is
//! fatal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{CardfolioError, Result};
use crate::models::{OwnedCard, RefreshSummary};
use crate::pricing::PriceSource;
use crate::store::{run_store, SharedStore};

// ---------------------------------------------------------------------------
// RefreshConfig
// ---------------------------------------------------------------------------

/// Lookup strategy for a refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupStrategy {
    /// One lookup per owned card, keyed by catalog id. Precise: the observed
    /// price always corresponds to the exact printing owned.
    #[default]
    ById,
    /// One batched lookup per group of display names. Cheaper in call count
    /// when many copies share a name, but assigns the same price to every
    /// copy regardless of print or variant. Kept as a fallback for older
    /// data flows; prefer [`LookupStrategy::ById`].
    ByNameGroup,
}

/// Tuning knobs for the refresh sweep.
///
/// The defaults keep sustained outbound traffic under ~10 requests per
/// second; adjust them to the upstream's published rate limits.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Records per batch. Batches run strictly in sequence.
    pub batch_size: usize,
    /// Ceiling on simultaneous outbound lookups within a batch.
    pub max_concurrent: usize,
    /// Per-item start delay within a batch (multiplied by the item's index)
    /// so a batch does not open with a thundering-herd burst.
    pub stagger: Duration,
    /// Pause between batches, a secondary rate-limit safeguard.
    pub inter_batch_delay: Duration,
    /// Per-lookup deadline; expiry counts as the upstream being unavailable.
    pub lookup_timeout: Duration,
    pub strategy: LookupStrategy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            batch_size: config::DEFAULT_BATCH_SIZE,
            max_concurrent: config::DEFAULT_MAX_CONCURRENT,
            stagger: config::DEFAULT_STAGGER,
            inter_batch_delay: config::DEFAULT_INTER_BATCH_DELAY,
            lookup_timeout: config::DEFAULT_LOOKUP_TIMEOUT,
            strategy: LookupStrategy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RefreshHandle
// ---------------------------------------------------------------------------

/// Cancels an in-progress refresh at the next batch boundary.
///
/// Cancellation is cooperative: in-flight lookups in the current batch still
/// settle, and the run returns a partial summary covering the batches
/// attempted so far.
#[derive(Clone, Debug, Default)]
pub struct RefreshHandle {
    cancelled: Arc<AtomicBool>,
}

impl RefreshHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// PriceRefresher
// ---------------------------------------------------------------------------

/// Orchestrates one bounded-concurrency sweep over the stored portfolio.
pub struct PriceRefresher {
    store: SharedStore,
    source: Arc<dyn PriceSource>,
    config: RefreshConfig,
}

impl PriceRefresher {
    pub fn new(store: SharedStore, source: Arc<dyn PriceSource>, config: RefreshConfig) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    /// Refresh every owned card's price and report the outcome.
    ///
    /// Operates on a snapshot of the record set taken at call time; cards
    /// added after the snapshot are not part of this run. The only fatal
    /// error is a failure to read that initial snapshot.
    pub async fn refresh_all(&self) -> Result<RefreshSummary> {
        self.refresh_all_with_handle(&RefreshHandle::new()).await
    }

    /// Like [`refresh_all`](Self::refresh_all), but observing a cancellation
    /// handle between batches.
    pub async fn refresh_all_with_handle(&self, handle: &RefreshHandle) -> Result<RefreshSummary> {
        let cards = run_store(Arc::clone(&self.store), |s| s.fetch_all_owned()).await?;
        if cards.is_empty() {
            return Ok(RefreshSummary::empty());
        }

        info!(total = cards.len(), strategy = ?self.config.strategy, "starting price refresh");
        let summary = match self.config.strategy {
            LookupStrategy::ById => self.refresh_by_id(cards, handle).await,
            LookupStrategy::ByNameGroup => self.refresh_by_name_group(cards, handle).await,
        };
        info!(
            updated = summary.updated_count,
            errors = summary.error_count,
            total = summary.total_cards,
            "price refresh finished"
        );
        Ok(summary)
    }

    /// Default strategy: one lookup per owned card, keyed by catalog id.
    async fn refresh_by_id(&self, cards: Vec<OwnedCard>, handle: &RefreshHandle) -> RefreshSummary {
        let batch_size = self.config.batch_size.max(1);
        let batches: Vec<&[OwnedCard]> = cards.chunks(batch_size).collect();
        let batch_count = batches.len();

        let mut updated = 0usize;
        let mut errors = 0usize;
        let mut attempted = 0usize;

        for (batch_idx, batch) in batches.into_iter().enumerate() {
            if handle.is_cancelled() {
                info!(batches_done = batch_idx, "refresh cancelled at batch boundary");
                break;
            }
            attempted += batch.len();

            let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
            let mut tasks: JoinSet<bool> = JoinSet::new();

            for (i, card) in batch.iter().cloned().enumerate() {
                let semaphore = Arc::clone(&semaphore);
                let source = Arc::clone(&self.source);
                let store = Arc::clone(&self.store);
                let stagger = self.config.stagger * i as u32;
                let lookup_timeout = self.config.lookup_timeout;

                tasks.spawn(async move {
                    sleep(stagger).await;
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return false,
                    };

                    let looked_up = match timeout(lookup_timeout, source.price_by_id(&card.card_id))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(CardfolioError::UpstreamUnavailable(format!(
                            "price lookup for '{}' timed out",
                            card.card_id
                        ))),
                    };

                    match looked_up {
                        Ok(Some(price)) => apply_price(store, &card.card_id, price).await,
                        Ok(None) => {
                            // Soft outcome: the upstream answered, it just has
                            // no price for this card right now.
                            debug!(card_id = %card.card_id, "no price available this round");
                            false
                        }
                        Err(e) => {
                            warn!(card_id = %card.card_id, error = %e, "price lookup failed");
                            false
                        }
                    }
                });
            }

            // The whole batch settles before the next one starts.
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(true) => updated += 1,
                    Ok(false) => errors += 1,
                    Err(e) => {
                        warn!(error = %e, "lookup task failed to join");
                        errors += 1;
                    }
                }
            }

            if batch_idx + 1 < batch_count {
                sleep(self.config.inter_batch_delay).await;
            }
        }

        RefreshSummary::from_counts(updated, errors, attempted)
    }

    /// Deprecated fallback: group owned cards by display name and issue one
    /// batched lookup per group of names. Every copy sharing a name receives
    /// the same observed price.
    async fn refresh_by_name_group(
        &self,
        cards: Vec<OwnedCard>,
        handle: &RefreshHandle,
    ) -> RefreshSummary {
        // Group copies by display name, preserving first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<OwnedCard>> = HashMap::new();
        for card in cards {
            if !groups.contains_key(&card.name) {
                order.push(card.name.clone());
            }
            groups.entry(card.name.clone()).or_default().push(card);
        }

        let batch_size = self.config.batch_size.max(1);
        let name_batches: Vec<&[String]> = order.chunks(batch_size).collect();
        let batch_count = name_batches.len();

        let mut updated = 0usize;
        let mut errors = 0usize;
        let mut attempted = 0usize;

        for (batch_idx, names) in name_batches.into_iter().enumerate() {
            if handle.is_cancelled() {
                info!(batches_done = batch_idx, "refresh cancelled at batch boundary");
                break;
            }
            let batch_cards: usize = names.iter().map(|n| groups[n].len()).sum();
            attempted += batch_cards;

            let looked_up = match timeout(
                self.config.lookup_timeout,
                self.source.prices_by_names(names),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(CardfolioError::UpstreamUnavailable(
                    "batched price lookup timed out".to_string(),
                )),
            };

            match looked_up {
                Ok(prices) => {
                    for name in names {
                        for card in &groups[name] {
                            match prices.get(name) {
                                Some(price) => {
                                    if apply_price(Arc::clone(&self.store), &card.card_id, *price)
                                        .await
                                    {
                                        updated += 1;
                                    } else {
                                        errors += 1;
                                    }
                                }
                                None => {
                                    debug!(card_id = %card.card_id, name = %name,
                                        "no price available this round");
                                    errors += 1;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    // The whole batch of names failed; every copy counts.
                    warn!(error = %e, "batched price lookup failed");
                    errors += batch_cards;
                }
            }

            if batch_idx + 1 < batch_count {
                sleep(self.config.inter_batch_delay).await;
            }
        }

        RefreshSummary::from_counts(updated, errors, attempted)
    }
}

/// Write one observed price back to the store. Returns whether the write
/// succeeded; failures (including the record vanishing between read and
/// write) are logged and absorbed into the error tally.
async fn apply_price(store: SharedStore, card_id: &str, price: f64) -> bool {
    let id = card_id.to_string();
    match run_store(store, move |s| s.update_price(&id, price)).await {
        Ok(()) => {
            debug!(card_id = %card_id, price, "price updated");
            true
        }
        Err(e) => {
            warn!(card_id = %card_id, error = %e, "price write failed");
            false
        }
    }
}
