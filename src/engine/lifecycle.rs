use alloy_primitives::{Address, B256, U256};
use tracing::{debug, info};

use super::MarketEngine;
use crate::config::{DeadlinePolicy, PausedResolution};
use crate::error::LedgerError;
use crate::types::{LedgerEvent, Market, MarketStatus, NewMarket, Outcome, Position, SettlementType};
use crate::vault::Account;

impl MarketEngine {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn create_market(&self, params: NewMarket) -> Result<Market, LedgerError> {
        let market = Market::from_new(params, self.clock.now());
        self.store.insert_market(market.clone(), |m| {
            self.emit(LedgerEvent::MarketCreated { market: m.clone() });
        })?;

        info!(
            market_id = %market.id,
            settlement = %market.settlement_type,
            end_time = market.end_time,
            "[MARKET] created: {}",
            market.question,
        );
        Ok(market)
    }

    /// Open a position. `stake` is value attached to the call from outside the
    /// ledger, so it is credited straight to the vault and no user account is
    /// debited.
    pub fn place_bet(
        &self,
        caller: Address,
        market_id: B256,
        outcome: Outcome,
        stake: U256,
    ) -> Result<Position, LedgerError> {
        if stake.is_zero() {
            return Err(LedgerError::InvalidStake);
        }

        let book = self.store.book(&market_id).ok_or(LedgerError::MarketNotFound)?;
        let mut guard = book.write();

        if guard.market.status != MarketStatus::Active {
            return Err(LedgerError::MarketNotActive);
        }
        let now = self.clock.now();
        if self.settings.deadline_policy == DeadlinePolicy::Enforced && now >= guard.market.end_time {
            return Err(LedgerError::BettingClosed);
        }
        if guard.has_position(&caller) {
            return Err(LedgerError::DuplicatePosition);
        }

        let (pool_yes, pool_no) = match outcome {
            Outcome::Yes => (
                guard.market.pool_yes.checked_add(stake).ok_or(LedgerError::Overflow)?,
                guard.market.pool_no,
            ),
            Outcome::No => (
                guard.market.pool_yes,
                guard.market.pool_no.checked_add(stake).ok_or(LedgerError::Overflow)?,
            ),
        };
        pool_yes.checked_add(pool_no).ok_or(LedgerError::Overflow)?;

        // Attached value, not a balance transfer.
        self.funds.credit(Account::Vault, stake)?;

        let position = Position { amount: stake, outcome, timestamp: now, claimed: false };
        self.store.insert_position(&mut guard, caller, position)?;
        guard.market.pool_yes = pool_yes;
        guard.market.pool_no = pool_no;

        info!(
            market_id = %market_id,
            user = %caller,
            outcome = %outcome,
            amount = %stake,
            "[BET] placed"
        );
        self.emit(LedgerEvent::BetPlaced { market_id, user: caller, outcome, amount: stake, timestamp: now });
        Ok(position)
    }

    /// Manual / AI resolution: the outcome arrives already decided.
    pub fn resolve_market(
        &self,
        caller: Address,
        market_id: B256,
        outcome: Outcome,
    ) -> Result<Market, LedgerError> {
        self.resolve_with(caller, market_id, |market| {
            let resolved_by = match market.settlement_type {
                SettlementType::Ai => SettlementType::Ai,
                _ => SettlementType::Manual,
            };
            Ok((outcome, resolved_by.to_string()))
        })
    }

    /// Price-feed resolution: YES wins when the observed price reaches the target.
    pub fn resolve_with_price(
        &self,
        caller: Address,
        market_id: B256,
        observed_price: U256,
    ) -> Result<Market, LedgerError> {
        self.resolve_with(caller, market_id, |market| {
            if market.settlement_type != SettlementType::Pyth {
                return Err(LedgerError::SettlementMismatch);
            }
            let outcome = Outcome::from_bool(observed_price >= market.target_price);
            debug!(
                market_id = %market.id,
                observed = %observed_price,
                target = %market.target_price,
                "[RESOLVE] price check -> {outcome}"
            );
            Ok((outcome, SettlementType::Pyth.to_string()))
        })
    }

    fn resolve_with<F>(&self, caller: Address, market_id: B256, decide: F) -> Result<Market, LedgerError>
    where
        F: FnOnce(&Market) -> Result<(Outcome, String), LedgerError>,
    {
        let book = self.store.book(&market_id).ok_or(LedgerError::MarketNotFound)?;
        let mut guard = book.write();

        self.resolvers.authorize(&caller, &guard.market)?;
        match guard.market.status {
            MarketStatus::Resolved => return Err(LedgerError::AlreadyResolved),
            MarketStatus::Paused if self.settings.paused_resolution == PausedResolution::Deny => {
                return Err(LedgerError::MarketNotActive)
            }
            _ => {}
        }
        let (outcome, resolved_by) = decide(&guard.market)?;

        guard.market.status = MarketStatus::Resolved;
        guard.market.outcome = Some(outcome);

        info!(
            market_id = %market_id,
            outcome = %outcome,
            resolved_by = %resolved_by,
            pool_yes = %guard.market.pool_yes,
            pool_no = %guard.market.pool_no,
            positions = guard.position_count(),
            "[RESOLVE] market resolved"
        );
        self.emit(LedgerEvent::MarketResolved { market_id, outcome, resolved_by });
        Ok(guard.market.clone())
    }

    pub fn pause_market(&self, caller: Address, market_id: B256) -> Result<(), LedgerError> {
        self.set_paused(caller, market_id, true)
    }

    pub fn unpause_market(&self, caller: Address, market_id: B256) -> Result<(), LedgerError> {
        self.set_paused(caller, market_id, false)
    }

    fn set_paused(&self, caller: Address, market_id: B256, paused: bool) -> Result<(), LedgerError> {
        let book = self.store.book(&market_id).ok_or(LedgerError::MarketNotFound)?;
        let mut guard = book.write();

        if !self.is_admin(&caller) {
            return Err(LedgerError::Unauthorized);
        }
        let (from, to) = if paused {
            (MarketStatus::Active, MarketStatus::Paused)
        } else {
            (MarketStatus::Paused, MarketStatus::Active)
        };
        if guard.market.status != from {
            return Err(LedgerError::InvalidStatusTransition);
        }
        guard.market.status = to;

        info!(market_id = %market_id, status = %to, code = to.code(), "[MARKET] status changed");
        self.emit(if paused {
            LedgerEvent::MarketPaused { market_id }
        } else {
            LedgerEvent::MarketUnpaused { market_id }
        });
        Ok(())
    }

    /// Top up the vault from outside the betting flow.
    pub fn fund_vault(&self, from: Address, amount: U256) -> Result<U256, LedgerError> {
        self.funds.credit(Account::Vault, amount)?;
        info!(from = %from, amount = %amount, "[VAULT] funded");
        self.emit(LedgerEvent::VaultFunded { from, amount });
        Ok(self.funds.balance(&Account::Vault))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_market(&self, market_id: &B256) -> Result<Market, LedgerError> {
        self.store.get_market(market_id).ok_or(LedgerError::MarketNotFound)
    }

    /// Empty (zero) position when the user never bet or the market is unknown.
    pub fn get_user_position(&self, market_id: &B256, user: &Address) -> Position {
        self.store.get_position(market_id, user).unwrap_or_default()
    }

    pub fn all_markets(&self) -> Vec<B256> {
        self.store.all_market_ids()
    }

    pub fn user_positions(&self, user: &Address) -> Vec<B256> {
        self.store.user_market_ids(user)
    }
}
