use alloy_primitives::{b256, keccak256, Address, B256, U256};
use tracing::{info, warn};

use super::MarketEngine;
use crate::types::{NewMarket, SettlementType};

const DAY_SECS: u64 = 24 * 60 * 60;

/// Pyth BTC/USD price feed.
const BTC_USD_FEED: B256 = b256!("e62df6c8b4a27ef18332912472d96a1f39c4a0a45f9a20c7e3da06d396cc14d2");

/// Pyth prices carry 8 decimals.
const PYTH_DECIMALS: u64 = 100_000_000;

struct DemoMarket {
    label: &'static str,
    question: &'static str,
    description: &'static str,
    days: u64,
    settlement_type: SettlementType,
}

const DEMO_MARKETS: [DemoMarket; 3] = [
    DemoMarket {
        label: "m1",
        question: "Will Bitcoin break $100k by Q4 2025?",
        description: "Prediction market based on the price of BTC/USD on major exchanges.",
        days: 365,
        settlement_type: SettlementType::Pyth,
    },
    DemoMarket {
        label: "m2",
        question: "Will Mantle Mainnet reach $5B TVL before June 2025?",
        description: "Based on official data from DefiLlama and Mantle documentation.",
        days: 180,
        settlement_type: SettlementType::Manual,
    },
    DemoMarket {
        label: "m3",
        question: "Will the Fed cut interest rates in the next FOMC meeting?",
        description: "Binary outcome based on the official Federal Reserve statement.",
        days: 30,
        settlement_type: SettlementType::Ai,
    },
];

/// Create the three launch markets, skipping any that already exist (e.g. after
/// a journal replay). Returns how many were created.
pub fn seed_demo_markets(engine: &MarketEngine, oracle: Address) -> usize {
    let now = engine.clock.now();
    let mut created = 0;

    for demo in &DEMO_MARKETS {
        let id = keccak256(demo.label);
        if engine.store.contains_market(&id) {
            continue;
        }

        let (price_feed_id, target_price) = match demo.settlement_type {
            SettlementType::Pyth => (BTC_USD_FEED, U256::from(100_000u64 * PYTH_DECIMALS)),
            _ => (B256::ZERO, U256::ZERO),
        };
        let params = NewMarket {
            id,
            question: demo.question.to_string(),
            description: demo.description.to_string(),
            end_time: now + demo.days * DAY_SECS,
            oracle,
            settlement_type: demo.settlement_type,
            price_feed_id,
            target_price,
        };
        match engine.create_market(params) {
            Ok(_) => created += 1,
            Err(e) => warn!(label = demo.label, "[SEED] skipped: {e}"),
        }
    }

    if created > 0 {
        info!(created, "[SEED] demo markets ready");
    }
    created
}
