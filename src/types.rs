use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations mirrored from the market contract ABI
// ---------------------------------------------------------------------------

/// Binary outcome of a market. Encoded as `bool` on-chain (true = YES).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    #[default]
    No,
}

impl Outcome {
    pub fn from_bool(yes: bool) -> Self {
        if yes {
            Outcome::Yes
        } else {
            Outcome::No
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Yes => write!(f, "YES"),
            Outcome::No => write!(f, "NO"),
        }
    }
}

/// ACTIVE → RESOLVED (terminal), ACTIVE ↔ PAUSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Active,
    Resolved,
    Paused,
}

impl MarketStatus {
    /// ABI `uint8` code: 0 = Active, 1 = Resolved, 2 = Paused.
    pub fn code(self) -> u8 {
        match self {
            MarketStatus::Active => 0,
            MarketStatus::Resolved => 1,
            MarketStatus::Paused => 2,
        }
    }
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarketStatus::Active => "active",
            MarketStatus::Resolved => "resolved",
            MarketStatus::Paused => "paused",
        };
        write!(f, "{s}")
    }
}

/// Who (or what) triggers resolution for a market. Deserializes from either the
/// lowercase name or the ABI `uint8` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementType {
    Manual,
    Pyth,
    Ai,
}

impl SettlementType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SettlementType::Manual),
            1 => Some(SettlementType::Pyth),
            2 => Some(SettlementType::Ai),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for SettlementType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Self::from_code(code)
                .ok_or_else(|| D::Error::custom(format!("unknown settlement type code {code}"))),
            Repr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "manual" => Ok(SettlementType::Manual),
                "pyth" => Ok(SettlementType::Pyth),
                "ai" => Ok(SettlementType::Ai),
                other => Err(D::Error::custom(format!("unknown settlement type '{other}'"))),
            },
        }
    }
}

impl std::fmt::Display for SettlementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SettlementType::Manual => "manual",
            SettlementType::Pyth => "pyth",
            SettlementType::Ai => "ai",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Market / Position records
// ---------------------------------------------------------------------------

/// Arguments of `createMarket`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarket {
    pub id: B256,
    pub question: String,
    pub description: String,
    pub end_time: u64,
    pub oracle: Address,
    pub settlement_type: SettlementType,
    #[serde(default)]
    pub price_feed_id: B256,
    #[serde(default)]
    pub target_price: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: B256,
    pub question: String,
    pub description: String,
    /// Historical stake totals. Payouts draw from the vault, never from these.
    pub pool_yes: U256,
    pub pool_no: U256,
    pub end_time: u64,
    pub status: MarketStatus,
    /// Winning side; `Some` only once resolved.
    pub outcome: Option<Outcome>,
    pub oracle: Address,
    pub settlement_type: SettlementType,
    pub price_feed_id: B256,
    pub target_price: U256,
    pub created_at: u64,
}

impl Market {
    pub fn from_new(params: NewMarket, created_at: u64) -> Self {
        Self {
            id: params.id,
            question: params.question,
            description: params.description,
            pool_yes: U256::ZERO,
            pool_no: U256::ZERO,
            end_time: params.end_time,
            status: MarketStatus::Active,
            outcome: None,
            oracle: params.oracle,
            settlement_type: params.settlement_type,
            price_feed_id: params.price_feed_id,
            target_price: params.target_price,
            created_at,
        }
    }

    pub fn total_pool(&self) -> Option<U256> {
        self.pool_yes.checked_add(self.pool_no)
    }

    /// `(winning_pool, losing_pool)` for a resolved market.
    pub fn settlement_pools(&self) -> Option<(U256, U256)> {
        match self.outcome? {
            Outcome::Yes => Some((self.pool_yes, self.pool_no)),
            Outcome::No => Some((self.pool_no, self.pool_yes)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub amount: U256,
    pub outcome: Outcome,
    /// Unix seconds at which the bet was accepted.
    pub timestamp: u64,
    pub claimed: bool,
}

// ---------------------------------------------------------------------------
// Derived quotes
// ---------------------------------------------------------------------------

/// Integer percentages; `yes + no == 100` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    pub yes_odds: u8,
    pub no_odds: u8,
}

/// Breakdown returned by `getClaimableAmount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub stake: U256,
    pub winnings: U256,
    pub yield_share: U256,
    pub total: U256,
}

/// Per-market reading from the vault's yield accrual feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldSnapshot {
    pub accumulated_yield: U256,
    /// Basis points, 1250 = 12.50%.
    pub current_apy_bps: u64,
}

// ---------------------------------------------------------------------------
// Ledger events — sent over the journal channel, persisted to SQLite
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    MarketCreated {
        market: Market,
    },
    BetPlaced {
        market_id: B256,
        user: Address,
        outcome: Outcome,
        amount: U256,
        timestamp: u64,
    },
    MarketPaused {
        market_id: B256,
    },
    MarketUnpaused {
        market_id: B256,
    },
    MarketResolved {
        market_id: B256,
        outcome: Outcome,
        resolved_by: String,
    },
    WinningsClaimed {
        market_id: B256,
        user: Address,
        payout: U256,
    },
    VaultFunded {
        from: Address,
        amount: U256,
    },
    YieldUpdated {
        market_id: B256,
        accumulated_yield: U256,
        apy_bps: u64,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::MarketCreated { .. } => "market_created",
            LedgerEvent::BetPlaced { .. } => "bet_placed",
            LedgerEvent::MarketPaused { .. } => "market_paused",
            LedgerEvent::MarketUnpaused { .. } => "market_unpaused",
            LedgerEvent::MarketResolved { .. } => "market_resolved",
            LedgerEvent::WinningsClaimed { .. } => "winnings_claimed",
            LedgerEvent::VaultFunded { .. } => "vault_funded",
            LedgerEvent::YieldUpdated { .. } => "yield_updated",
        }
    }

    pub fn market_id(&self) -> Option<B256> {
        match self {
            LedgerEvent::MarketCreated { market } => Some(market.id),
            LedgerEvent::BetPlaced { market_id, .. }
            | LedgerEvent::MarketPaused { market_id }
            | LedgerEvent::MarketUnpaused { market_id }
            | LedgerEvent::MarketResolved { market_id, .. }
            | LedgerEvent::WinningsClaimed { market_id, .. }
            | LedgerEvent::YieldUpdated { market_id, .. } => Some(*market_id),
            LedgerEvent::VaultFunded { .. } => None,
        }
    }
}
