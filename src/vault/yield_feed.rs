use std::sync::Arc;

use alloy_primitives::B256;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;

use crate::types::{LedgerEvent, YieldSnapshot};

/// Read port onto the vault's yield accrual. Generation of yield happens
/// elsewhere; the engine only ever asks for the latest figure.
pub trait YieldOracle: Send + Sync {
    /// Markets with no reading report zero yield.
    fn yield_for(&self, market_id: &B256) -> YieldSnapshot;
}

/// Latest yield reading per market, fed by the oracle poller or the API.
/// Every changed reading is journaled so payouts quote the same after a restart.
#[derive(Debug, Default)]
pub struct YieldBook {
    readings: DashMap<B256, YieldSnapshot>,
    journal_tx: Option<mpsc::UnboundedSender<LedgerEvent>>,
}

impl YieldBook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_journal(journal_tx: mpsc::UnboundedSender<LedgerEvent>) -> Arc<Self> {
        Arc::new(Self { readings: DashMap::new(), journal_tx: Some(journal_tx) })
    }

    /// Store a new reading. Unchanged readings are not re-journaled.
    ///
    /// The entry stays locked until the event is queued, so journal order per
    /// market matches update order. A missing reading already reads as zero.
    pub fn update(&self, market_id: B256, snapshot: YieldSnapshot) {
        let mut slot = self.readings.entry(market_id).or_default();
        if *slot == snapshot {
            return;
        }
        *slot = snapshot;
        if let Some(tx) = &self.journal_tx {
            let event = LedgerEvent::YieldUpdated {
                market_id,
                accumulated_yield: snapshot.accumulated_yield,
                apy_bps: snapshot.current_apy_bps,
            };
            if let Err(e) = tx.send(event) {
                warn!("journal channel closed, dropping {} event", e.0.kind());
            }
        }
    }

    /// Reinstate a journaled reading without journaling it again.
    pub fn restore(&self, market_id: B256, snapshot: YieldSnapshot) {
        self.readings.insert(market_id, snapshot);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }
}

impl YieldOracle for YieldBook {
    fn yield_for(&self, market_id: &B256) -> YieldSnapshot {
        self.readings.get(market_id).map(|r| *r).unwrap_or_default()
    }
}
