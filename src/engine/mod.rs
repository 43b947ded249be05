//! Market lifecycle and payout settlement.
//!
//! Every mutating call takes the target market's write guard, checks all of its
//! preconditions, and only then touches funds and records. A call that returns
//! an error has changed nothing.

pub mod clock;
pub mod lifecycle;
pub mod payout;
pub mod policy;
pub mod seed;

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::{Config, DeadlinePolicy, PausedResolution};
use crate::state::LedgerStore;
use crate::types::LedgerEvent;
use crate::vault::{FundsLedger, YieldOracle};

pub use clock::{Clock, SystemClock};
pub use policy::ResolutionPolicy;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// May pause and unpause markets. `None` leaves pausing disabled.
    pub admin: Option<Address>,
    pub deadline_policy: DeadlinePolicy,
    pub paused_resolution: PausedResolution,
}

impl EngineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            admin: cfg.admin,
            deadline_policy: cfg.deadline_policy,
            paused_resolution: cfg.paused_resolution,
        }
    }
}

pub struct MarketEngine {
    store: Arc<LedgerStore>,
    funds: Arc<dyn FundsLedger>,
    yields: Arc<dyn YieldOracle>,
    clock: Arc<dyn Clock>,
    resolvers: Arc<dyn ResolutionPolicy>,
    settings: EngineSettings,
    journal_tx: Option<mpsc::UnboundedSender<LedgerEvent>>,
}

impl MarketEngine {
    pub fn new(
        store: Arc<LedgerStore>,
        funds: Arc<dyn FundsLedger>,
        yields: Arc<dyn YieldOracle>,
        clock: Arc<dyn Clock>,
        resolvers: Arc<dyn ResolutionPolicy>,
        settings: EngineSettings,
    ) -> Self {
        Self { store, funds, yields, clock, resolvers, settings, journal_tx: None }
    }

    /// Route every successful mutation to the journal writer.
    pub fn with_journal(mut self, journal_tx: mpsc::UnboundedSender<LedgerEvent>) -> Self {
        self.journal_tx = Some(journal_tx);
        self
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    pub fn funds(&self) -> &Arc<dyn FundsLedger> {
        &self.funds
    }

    /// Whether `caller` holds the owner capability. The zero address never does.
    pub fn is_admin(&self, caller: &Address) -> bool {
        policy::holds(caller, self.settings.admin)
    }

    /// Called with the market's write guard held so per-market journal order
    /// matches execution order.
    fn emit(&self, event: LedgerEvent) {
        if let Some(tx) = &self.journal_tx {
            if let Err(e) = tx.send(event) {
                warn!("journal channel closed, dropping {} event", e.0.kind());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use std::sync::Arc;

    use alloy_primitives::{keccak256, Address, B256, U256};
    use tokio::sync::mpsc;

    use super::clock::ManualClock;
    use super::policy::AdminOrOracle;
    use super::{EngineSettings, MarketEngine};
    use crate::config::{DeadlinePolicy, PausedResolution};
    use crate::state::LedgerStore;
    use crate::types::{LedgerEvent, NewMarket, SettlementType};
    use crate::vault::{InMemoryFunds, YieldBook};

    pub const OWNER: Address = Address::repeat_byte(0x01);
    pub const USER1: Address = Address::repeat_byte(0x02);
    pub const USER2: Address = Address::repeat_byte(0x03);
    pub const USER3: Address = Address::repeat_byte(0x04);
    pub const START: u64 = 1_700_000_000;
    pub const DAY: u64 = 86_400;

    /// `n` thousandths of one native unit (18 decimals).
    pub fn milli(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000_000_000_000u64)
    }

    pub fn market_id() -> B256 {
        keccak256("test-market-1")
    }

    pub struct Harness {
        pub engine: MarketEngine,
        pub store: Arc<LedgerStore>,
        pub funds: Arc<InMemoryFunds>,
        pub yields: Arc<YieldBook>,
        pub clock: Arc<ManualClock>,
    }

    fn build(
        admin: Option<Address>,
        deadline_policy: DeadlinePolicy,
        paused_resolution: PausedResolution,
        journal_tx: Option<mpsc::UnboundedSender<LedgerEvent>>,
    ) -> Harness {
        let store = LedgerStore::new();
        let funds = InMemoryFunds::new();
        let yields = match &journal_tx {
            Some(tx) => YieldBook::with_journal(tx.clone()),
            None => YieldBook::new(),
        };
        let clock = Arc::new(ManualClock::new(START));
        let mut engine = MarketEngine::new(
            Arc::clone(&store),
            funds.clone(),
            yields.clone(),
            clock.clone(),
            Arc::new(AdminOrOracle { admin }),
            EngineSettings { admin, deadline_policy, paused_resolution },
        );
        if let Some(tx) = journal_tx {
            engine = engine.with_journal(tx);
        }
        Harness { engine, store, funds, yields, clock }
    }

    pub fn harness_with(deadline_policy: DeadlinePolicy, paused_resolution: PausedResolution) -> Harness {
        build(Some(OWNER), deadline_policy, paused_resolution, None)
    }

    /// Harness whose engine and yield book both feed the returned journal.
    pub fn journaled_harness() -> (Harness, mpsc::UnboundedReceiver<LedgerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let h = build(Some(OWNER), DeadlinePolicy::Advisory, PausedResolution::Allow, Some(tx));
        (h, rx)
    }

    /// Harness with no owner configured.
    pub fn ownerless_harness() -> Harness {
        build(None, DeadlinePolicy::Advisory, PausedResolution::Allow, None)
    }

    pub fn harness() -> Harness {
        harness_with(DeadlinePolicy::Advisory, PausedResolution::Allow)
    }

    pub fn new_market(id: B256) -> NewMarket {
        NewMarket {
            id,
            question: "Will ETH reach $5000?".to_string(),
            description: "Test market description".to_string(),
            end_time: START + DAY,
            oracle: OWNER,
            settlement_type: SettlementType::Manual,
            price_feed_id: B256::ZERO,
            target_price: U256::ZERO,
        }
    }

    /// Harness with the default test market already created.
    pub fn harness_with_market() -> Harness {
        let h = harness();
        h.engine.create_market(new_market(market_id())).unwrap();
        h
    }
}
