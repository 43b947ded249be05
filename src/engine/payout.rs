//! Parimutuel settlement math.
//!
//! All division truncates toward zero, so the vault can only ever be left with
//! dust, never owe more than it took in. Results must match the deployed
//! contract bit-for-bit; do not reorder the multiplications.

use alloy_primitives::{Address, B256, U256};
use tracing::{info, warn};

use super::MarketEngine;
use crate::config::ODDS_SCALE;
use crate::error::LedgerError;
use crate::types::{LedgerEvent, Market, MarketStatus, Odds, Payout, Position, YieldSnapshot};
use crate::vault::Account;

/// Implied probabilities as integer percentages. YES is floored and NO takes the
/// remainder so the pair always sums to exactly 100. Empty pools read 50/50.
pub fn market_odds(pool_yes: U256, pool_no: U256) -> Odds {
    let half = (ODDS_SCALE / 2) as u8;
    let Some(total) = pool_yes.checked_add(pool_no) else {
        return Odds { yes_odds: half, no_odds: half };
    };
    if total.is_zero() {
        return Odds { yes_odds: half, no_odds: half };
    }

    let scale = U256::from(ODDS_SCALE);
    let yes = match pool_yes.checked_mul(scale) {
        Some(scaled) => scaled / total,
        // Pools this large lose nothing meaningful by dropping the low bits first.
        None => (pool_yes >> 8usize) * scale / (total >> 8usize),
    };
    let yes_odds = u8::try_from(yes).unwrap_or(ODDS_SCALE as u8).min(ODDS_SCALE as u8);
    Odds { yes_odds, no_odds: ODDS_SCALE as u8 - yes_odds }
}

/// stake + stake·losing/winning + stake·yield/(winning+losing), each term floored.
pub fn calculate_payout(
    stake: U256,
    winning_pool: U256,
    losing_pool: U256,
    accumulated_yield: U256,
) -> Result<Payout, LedgerError> {
    let total_pool = winning_pool.checked_add(losing_pool).ok_or(LedgerError::Overflow)?;

    let winnings = if winning_pool.is_zero() {
        U256::ZERO
    } else {
        stake.checked_mul(losing_pool).ok_or(LedgerError::Overflow)? / winning_pool
    };
    let yield_share = share_of_yield(stake, total_pool, accumulated_yield)?;

    let total = stake
        .checked_add(winnings)
        .and_then(|t| t.checked_add(yield_share))
        .ok_or(LedgerError::Overflow)?;

    Ok(Payout { stake, winnings, yield_share, total })
}

fn share_of_yield(stake: U256, total_pool: U256, accumulated_yield: U256) -> Result<U256, LedgerError> {
    if total_pool.is_zero() {
        return Ok(U256::ZERO);
    }
    Ok(stake.checked_mul(accumulated_yield).ok_or(LedgerError::Overflow)? / total_pool)
}

/// Precondition chain shared by the claimable quote and the claim itself.
fn quote(market: &Market, position: Option<&Position>, yields: YieldSnapshot) -> Result<Payout, LedgerError> {
    if market.status != MarketStatus::Resolved {
        return Err(LedgerError::MarketNotResolved);
    }
    let position = position.ok_or(LedgerError::NoPosition)?;
    let (winning_pool, losing_pool) = market.settlement_pools().ok_or(LedgerError::MarketNotResolved)?;
    if Some(position.outcome) != market.outcome {
        return Err(LedgerError::NotAWinner);
    }
    if position.claimed {
        return Err(LedgerError::AlreadyClaimed);
    }
    calculate_payout(position.amount, winning_pool, losing_pool, yields.accumulated_yield)
}

impl MarketEngine {
    /// Unknown markets read as empty pools (50/50), like an unset contract slot.
    pub fn market_odds(&self, market_id: &B256) -> Odds {
        match self.store.get_market(market_id) {
            Some(m) => market_odds(m.pool_yes, m.pool_no),
            None => market_odds(U256::ZERO, U256::ZERO),
        }
    }

    pub fn claimable_amount(&self, market_id: &B256, user: &Address) -> Result<Payout, LedgerError> {
        let book = self.store.book(market_id).ok_or(LedgerError::MarketNotFound)?;
        let guard = book.read();
        quote(&guard.market, guard.position(user), self.yields.yield_for(market_id))
    }

    /// Pay out a winning position exactly once.
    pub fn claim_winnings(&self, caller: Address, market_id: B256) -> Result<Payout, LedgerError> {
        let book = self.store.book(&market_id).ok_or(LedgerError::MarketNotFound)?;
        let mut guard = book.write();

        let payout = quote(&guard.market, guard.position(&caller), self.yields.yield_for(&market_id))?;

        self.funds
            .transfer(Account::Vault, Account::User(caller), payout.total)
            .map_err(|e| match e {
                LedgerError::InsufficientFunds => {
                    warn!(
                        market_id = %market_id,
                        user = %caller,
                        owed = %payout.total,
                        vault = %self.funds.balance(&Account::Vault),
                        "[CLAIM] vault cannot cover payout"
                    );
                    LedgerError::InsufficientVaultFunds
                }
                other => other,
            })?;

        if let Some(position) = guard.position_mut(&caller) {
            position.claimed = true;
        }

        info!(
            market_id = %market_id,
            user = %caller,
            stake = %payout.stake,
            winnings = %payout.winnings,
            yield_share = %payout.yield_share,
            total = %payout.total,
            "[CLAIM] winnings paid"
        );
        self.emit(LedgerEvent::WinningsClaimed { market_id, user: caller, payout: payout.total });
        Ok(payout)
    }

    /// The user's share of the market's accrued yield, win or lose.
    pub fn user_yield(&self, market_id: &B256, user: &Address) -> Result<U256, LedgerError> {
        let book = self.store.book(market_id).ok_or(LedgerError::MarketNotFound)?;
        let guard = book.read();
        let Some(position) = guard.position(user) else {
            return Ok(U256::ZERO);
        };
        let total_pool = guard.market.total_pool().ok_or(LedgerError::Overflow)?;
        share_of_yield(position.amount, total_pool, self.yields.yield_for(market_id).accumulated_yield)
    }

    pub fn total_liquidity(&self, market_id: &B256) -> Result<U256, LedgerError> {
        self.get_market(market_id)?.total_pool().ok_or(LedgerError::Overflow)
    }

    pub fn yield_snapshot(&self, market_id: &B256) -> YieldSnapshot {
        self.yields.yield_for(market_id)
    }
}
