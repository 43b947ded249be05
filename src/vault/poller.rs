use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy_primitives::{B256, U256};
use serde::Deserialize;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::api::health::HealthState;
use crate::config::YIELD_FETCH_TIMEOUT_SECS;
use crate::error::Result;
use crate::types::YieldSnapshot;
use crate::vault::YieldBook;

/// One element of the yield feed's JSON array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YieldFeedEntry {
    market_id: B256,
    accumulated_yield: U256,
    #[serde(default)]
    apy_bps: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub received: usize,
    pub applied: usize,
    pub rejected: usize,
}

/// Background task: polls the vault's yield feed and refreshes the `YieldBook`.
pub struct YieldFeedPoller {
    url: String,
    interval_secs: u64,
    book: Arc<YieldBook>,
    health: Arc<HealthState>,
}

impl YieldFeedPoller {
    pub fn new(url: String, interval_secs: u64, book: Arc<YieldBook>, health: Arc<HealthState>) -> Self {
        Self { url, interval_secs, book, health }
    }

    pub async fn run(self) {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(YIELD_FETCH_TIMEOUT_SECS))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                error!("Yield feed client build failed: {e}");
                return;
            }
        };

        info!(url = %self.url, interval_secs = self.interval_secs, "[YIELD] poller started");
        let mut ticker = interval(Duration::from_secs(self.interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
            match self.poll_once(&client).await {
                Ok(stats) => {
                    debug!(
                        received = stats.received,
                        applied = stats.applied,
                        rejected = stats.rejected,
                        "[YIELD] feed refreshed"
                    );
                    self.health.set_yield_feed(true, now);
                }
                Err(e) => {
                    warn!(url = %self.url, "[YIELD] feed poll failed: {e}");
                    self.health.set_yield_feed(false, now);
                }
            }
        }
    }

    async fn poll_once(&self, client: &reqwest::Client) -> Result<FeedStats> {
        let resp: serde_json::Value = client.get(&self.url).send().await?.json().await?;
        let stats = apply_feed(&self.book, &resp);
        if stats.rejected > 0 {
            info!(rejected = stats.rejected, "[YIELD] skipped malformed feed entries");
        }
        Ok(stats)
    }
}

/// Apply every well-formed entry of a feed response; malformed entries are counted
/// and skipped so one bad row never blocks the rest.
pub fn apply_feed(book: &YieldBook, resp: &serde_json::Value) -> FeedStats {
    let mut stats = FeedStats::default();
    let Some(items) = resp.as_array() else {
        warn!("[YIELD] feed response was not an array");
        return stats;
    };

    stats.received = items.len();
    for item in items {
        match serde_json::from_value::<YieldFeedEntry>(item.clone()) {
            Ok(entry) => {
                book.update(
                    entry.market_id,
                    YieldSnapshot {
                        accumulated_yield: entry.accumulated_yield,
                        current_apy_bps: entry.apy_bps,
                    },
                );
                stats.applied += 1;
            }
            Err(e) => {
                debug!("[YIELD] rejected entry {item}: {e}");
                stats.rejected += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::YieldOracle;

    #[test]
    fn applies_valid_entries_and_skips_bad_ones() {
        let book = YieldBook::new();
        let id = B256::repeat_byte(0x11);
        let resp = serde_json::json!([
            { "marketId": id, "accumulatedYield": "0x3e8", "apyBps": 1250 },
            { "marketId": "not-a-hash", "accumulatedYield": "0x1" },
            { "accumulatedYield": "0x1" }
        ]);

        let stats = apply_feed(&book, &resp);
        assert_eq!(stats, FeedStats { received: 3, applied: 1, rejected: 2 });

        let reading = book.yield_for(&id);
        assert_eq!(reading.accumulated_yield, U256::from(1000u64));
        assert_eq!(reading.current_apy_bps, 1250);
    }

    #[test]
    fn missing_apy_defaults_to_zero() {
        let book = YieldBook::new();
        let id = B256::repeat_byte(0x22);
        let resp = serde_json::json!([{ "marketId": id, "accumulatedYield": "0x10" }]);
        apply_feed(&book, &resp);
        assert_eq!(book.yield_for(&id).current_apy_bps, 0);
    }

    #[test]
    fn non_array_response_applies_nothing() {
        let book = YieldBook::new();
        let stats = apply_feed(&book, &serde_json::json!({ "error": "down" }));
        assert_eq!(stats, FeedStats::default());
        assert_eq!(book.len(), 0);
    }

    #[test]
    fn repeated_polls_journal_only_changes() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let book = YieldBook::with_journal(tx);
        let id = B256::repeat_byte(0x33);
        let first = serde_json::json!([{ "marketId": id, "accumulatedYield": "0x10", "apyBps": 700 }]);
        let second = serde_json::json!([{ "marketId": id, "accumulatedYield": "0x20", "apyBps": 700 }]);

        apply_feed(&book, &first);
        apply_feed(&book, &first);
        apply_feed(&book, &second);

        let kinds: Vec<&str> = std::iter::from_fn(|| rx.try_recv().ok()).map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["yield_updated", "yield_updated"]);
    }
}
