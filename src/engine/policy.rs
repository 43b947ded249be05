use std::sync::Arc;

use alloy_primitives::Address;

use crate::config::ResolverMode;
use crate::error::LedgerError;
use crate::types::{Market, SettlementType};

/// Capability check run before a market is resolved.
///
/// The zero address never holds a capability, whatever the configuration or
/// the market's recorded oracle says.
pub trait ResolutionPolicy: Send + Sync {
    fn authorize(&self, caller: &Address, market: &Market) -> Result<(), LedgerError>;
}

/// True when `caller` is a real identity equal to `holder`.
pub fn holds(caller: &Address, holder: Option<Address>) -> bool {
    !caller.is_zero() && holder == Some(*caller)
}

fn grant(ok: bool) -> Result<(), LedgerError> {
    if ok {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized)
    }
}

/// Only the oracle named at creation may resolve.
#[derive(Debug, Clone, Copy)]
pub struct OracleOnly;

impl ResolutionPolicy for OracleOnly {
    fn authorize(&self, caller: &Address, market: &Market) -> Result<(), LedgerError> {
        grant(holds(caller, Some(market.oracle)))
    }
}

/// The contract owner, or the market's own oracle.
#[derive(Debug, Clone, Copy)]
pub struct AdminOrOracle {
    pub admin: Option<Address>,
}

impl ResolutionPolicy for AdminOrOracle {
    fn authorize(&self, caller: &Address, market: &Market) -> Result<(), LedgerError> {
        grant(holds(caller, self.admin) || holds(caller, Some(market.oracle)))
    }
}

/// A dedicated resolver per settlement type (manual desk, price keeper, AI agent).
#[derive(Debug, Clone, Copy)]
pub struct PerSettlementType {
    pub manual: Option<Address>,
    pub pyth: Option<Address>,
    pub ai: Option<Address>,
}

impl ResolutionPolicy for PerSettlementType {
    fn authorize(&self, caller: &Address, market: &Market) -> Result<(), LedgerError> {
        let resolver = match market.settlement_type {
            SettlementType::Manual => self.manual,
            SettlementType::Pyth => self.pyth,
            SettlementType::Ai => self.ai,
        };
        grant(holds(caller, resolver))
    }
}

pub fn from_mode(mode: &ResolverMode, admin: Option<Address>) -> Arc<dyn ResolutionPolicy> {
    match mode {
        ResolverMode::Oracle => Arc::new(OracleOnly),
        ResolverMode::Admin => Arc::new(AdminOrOracle { admin }),
        ResolverMode::PerSettlement { manual, pyth, ai } => Arc::new(PerSettlementType {
            manual: *manual,
            pyth: *pyth,
            ai: *ai,
        }),
    }
}
