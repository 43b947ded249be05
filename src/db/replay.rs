//! Startup rebuild of in-memory ledger state from the event journal.
//!
//! Events are applied through the store primitives directly: they already
//! passed validation when first executed, so nothing is re-checked and nothing
//! is re-emitted.
//!
//! Fund movements are always replayed. A record update whose target is missing
//! from the journal (a market or position whose own append was lost) is skipped
//! and counted instead of failing startup.

use alloy_primitives::{Address, B256, U256};
use tracing::{info, warn};

use super::models::EventRow;
use crate::error::{AppError, LedgerError, Result};
use crate::state::{LedgerStore, MarketBook};
use crate::types::{LedgerEvent, MarketStatus, Outcome, Position, YieldSnapshot};
use crate::vault::{Account, FundsLedger, YieldBook};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: usize,
    pub markets: usize,
    pub positions: usize,
    /// Events whose record update no longer applied.
    pub skipped: usize,
    pub vault_balance: U256,
}

#[derive(Default)]
struct VaultTally {
    funded: U256,
    staked: U256,
    paid_out: U256,
}

pub async fn replay(
    pool: &sqlx::SqlitePool,
    store: &LedgerStore,
    funds: &dyn FundsLedger,
    yields: &YieldBook,
) -> Result<ReplayStats> {
    let rows: Vec<EventRow> = sqlx::query_as(
        "SELECT seq, kind, market_id, payload, recorded_at FROM ledger_events ORDER BY seq",
    )
    .fetch_all(pool)
    .await?;

    let mut stats = ReplayStats::default();
    let mut tally = VaultTally::default();

    for row in &rows {
        let event: LedgerEvent = serde_json::from_str(&row.payload)
            .map_err(|e| AppError::Journal(format!("seq {} ({}): {e}", row.seq, row.kind)))?;
        match apply(store, funds, yields, &event, &mut tally, &mut stats) {
            Ok(()) => {}
            Err(e @ (LedgerError::MarketNotFound | LedgerError::NoPosition | LedgerError::DuplicatePosition)) => {
                warn!(seq = row.seq, kind = %row.kind, "[REPLAY] {e}, skipping record update");
                stats.skipped += 1;
            }
            Err(e) => return Err(AppError::Journal(format!("seq {} ({}): {e}", row.seq, row.kind))),
        }
        stats.events += 1;
    }

    // Aggregated rather than per event: a claim may be journaled before a
    // funding on another market that it actually depended on.
    let inflow = tally
        .funded
        .checked_add(tally.staked)
        .ok_or_else(|| AppError::Journal("vault inflow overflow".to_string()))?;
    // Payouts exceed inflow only when funding or stake events were lost.
    let vault = inflow.checked_sub(tally.paid_out).unwrap_or_else(|| {
        warn!(inflow = %inflow, paid_out = %tally.paid_out, "[REPLAY] journaled payouts exceed inflow, vault starts empty");
        U256::ZERO
    });
    funds.credit(Account::Vault, vault)?;
    stats.vault_balance = vault;

    info!(
        events = stats.events,
        markets = stats.markets,
        positions = stats.positions,
        skipped = stats.skipped,
        yield_readings = yields.len(),
        vault = %stats.vault_balance,
        "[REPLAY] ledger restored"
    );
    Ok(stats)
}

fn apply(
    store: &LedgerStore,
    funds: &dyn FundsLedger,
    yields: &YieldBook,
    event: &LedgerEvent,
    tally: &mut VaultTally,
    stats: &mut ReplayStats,
) -> std::result::Result<(), LedgerError> {
    match event {
        LedgerEvent::MarketCreated { market } => match store.insert_market(market.clone(), |_| {}) {
            Ok(()) => stats.markets += 1,
            Err(LedgerError::DuplicateMarket) => {
                warn!(market_id = %market.id, "[REPLAY] market already present, skipping");
            }
            Err(e) => return Err(e),
        },
        LedgerEvent::BetPlaced { market_id, user, outcome, amount, timestamp } => {
            tally.staked = tally.staked.checked_add(*amount).ok_or(LedgerError::Overflow)?;
            with_book(store, market_id, |book| {
                let position = Position { amount: *amount, outcome: *outcome, timestamp: *timestamp, claimed: false };
                store.insert_position(book, *user, position)?;
                let pool = match outcome {
                    Outcome::Yes => &mut book.market.pool_yes,
                    Outcome::No => &mut book.market.pool_no,
                };
                *pool = pool.checked_add(*amount).ok_or(LedgerError::Overflow)?;
                Ok(())
            })?;
            stats.positions += 1;
        }
        LedgerEvent::MarketPaused { market_id } => {
            with_book(store, market_id, |book| {
                book.market.status = MarketStatus::Paused;
                Ok(())
            })?;
        }
        LedgerEvent::MarketUnpaused { market_id } => {
            with_book(store, market_id, |book| {
                book.market.status = MarketStatus::Active;
                Ok(())
            })?;
        }
        LedgerEvent::MarketResolved { market_id, outcome, .. } => {
            with_book(store, market_id, |book| {
                book.market.status = MarketStatus::Resolved;
                book.market.outcome = Some(*outcome);
                Ok(())
            })?;
        }
        LedgerEvent::WinningsClaimed { market_id, user, payout } => {
            funds.credit(Account::User(*user), *payout)?;
            tally.paid_out = tally.paid_out.checked_add(*payout).ok_or(LedgerError::Overflow)?;
            with_book(store, market_id, |book| mark_claimed(book, user))?;
        }
        LedgerEvent::VaultFunded { amount, .. } => {
            tally.funded = tally.funded.checked_add(*amount).ok_or(LedgerError::Overflow)?;
        }
        LedgerEvent::YieldUpdated { market_id, accumulated_yield, apy_bps } => {
            yields.restore(
                *market_id,
                YieldSnapshot { accumulated_yield: *accumulated_yield, current_apy_bps: *apy_bps },
            );
        }
    }
    Ok(())
}

fn with_book<F>(store: &LedgerStore, market_id: &B256, f: F) -> std::result::Result<(), LedgerError>
where
    F: FnOnce(&mut MarketBook) -> std::result::Result<(), LedgerError>,
{
    let book = store.book(market_id).ok_or(LedgerError::MarketNotFound)?;
    let mut guard = book.write();
    f(&mut guard)
}

fn mark_claimed(book: &mut MarketBook, user: &Address) -> std::result::Result<(), LedgerError> {
    let position = book.position_mut(user).ok_or(LedgerError::NoPosition)?;
    position.claimed = true;
    Ok(())
}
