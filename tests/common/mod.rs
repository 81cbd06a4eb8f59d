//! Shared fixtures for the integration tests.
//!
//! Provides an in-memory portfolio store plus a scripted [`PriceSource`]
//! mock that records call counts, the peak number of simultaneous lookups,
//! and the resolution progress visible when each lookup started.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cardfolio::models::NewCard;
use cardfolio::store::SharedStore;
use cardfolio::{CardfolioError, PortfolioStore, PriceSource, Result};

/// Fresh in-memory store wrapped in the shared handle the refresher expects.
pub fn setup_store() -> SharedStore {
    let store = PortfolioStore::open_in_memory().unwrap();
    Arc::new(Mutex::new(store))
}

pub fn new_card(card_id: &str, name: &str, price: Option<f64>, quantity: i64) -> NewCard {
    NewCard {
        card_id: card_id.to_string(),
        name: name.to_string(),
        image_url: None,
        set_name: None,
        rarity: None,
        price,
        quantity,
    }
}

pub fn seed_card(store: &SharedStore, card_id: &str, name: &str, price: Option<f64>, quantity: i64) {
    store
        .lock()
        .unwrap()
        .add_card(&new_card(card_id, name, price, quantity))
        .unwrap();
}

pub fn stored_price(store: &SharedStore, card_id: &str) -> Option<f64> {
    store
        .lock()
        .unwrap()
        .get_card(card_id)
        .unwrap()
        .expect("card should exist")
        .price
}

// ---------------------------------------------------------------------------
// MockPriceSource
// ---------------------------------------------------------------------------

/// Scripted outcome for one lookup key (card id or display name).
#[derive(Clone, Debug)]
pub enum Outcome {
    Price(f64),
    Unknown,
    Unavailable,
    RateLimited,
}

/// Scripted price source. Keys without a scripted outcome resolve as
/// `Unknown` (no price this round).
#[derive(Default)]
pub struct MockPriceSource {
    outcomes: Mutex<HashMap<String, Outcome>>,
    /// Artificial latency per lookup, to exercise concurrency behavior.
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    resolved: AtomicUsize,
    start_snapshots: Mutex<Vec<(String, usize)>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn set(&self, key: &str, outcome: Outcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(key.to_string(), outcome);
    }

    /// Total lookup calls issued (by id or by name batch).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Peak number of simultaneously unresolved by-id lookups.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// For each by-id lookup, in call order: the key looked up and how many
    /// lookups had fully resolved when it started.
    pub fn start_snapshots(&self) -> Vec<(String, usize)> {
        self.start_snapshots.lock().unwrap().clone()
    }

    fn outcome_for(&self, key: &str) -> Outcome {
        self.outcomes
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or(Outcome::Unknown)
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn price_by_id(&self, card_id: &str) -> Result<Option<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let resolved_at_start = self.resolved.load(Ordering::SeqCst);
        self.start_snapshots
            .lock()
            .unwrap()
            .push((card_id.to_string(), resolved_at_start));

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.resolved.fetch_add(1, Ordering::SeqCst);

        match self.outcome_for(card_id) {
            Outcome::Price(price) => Ok(Some(price)),
            Outcome::Unknown => Ok(None),
            Outcome::Unavailable => Err(CardfolioError::UpstreamUnavailable(
                "mock upstream unreachable".to_string(),
            )),
            Outcome::RateLimited => Err(CardfolioError::RateLimited),
        }
    }

    async fn prices_by_names(&self, names: &[String]) -> Result<HashMap<String, f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut prices = HashMap::new();
        for name in names {
            match self.outcome_for(name) {
                Outcome::Price(price) => {
                    prices.insert(name.clone(), price);
                }
                Outcome::Unavailable => {
                    return Err(CardfolioError::UpstreamUnavailable(
                        "mock upstream unreachable".to_string(),
                    ))
                }
                Outcome::RateLimited => return Err(CardfolioError::RateLimited),
                Outcome::Unknown => {}
            }
        }
        Ok(prices)
    }
}
