use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::{AppError, Result};

/// Odds are reported as integer percentages out of this scale.
pub const ODDS_SCALE: u64 = 100;

/// Default yield feed poll interval (seconds).
pub const YIELD_POLL_INTERVAL_SECS: u64 = 30;

/// Timeout for a single yield feed request (seconds).
pub const YIELD_FETCH_TIMEOUT_SECS: u64 = 10;

/// Whether bets at or after a market's `end_time` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlinePolicy {
    Enforced,
    Advisory,
}

/// Whether a PAUSED market may still be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PausedResolution {
    Allow,
    Deny,
}

/// Which identities may resolve a market (RESOLVER_MODE).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverMode {
    /// Only the market's own `oracle` address.
    Oracle,
    /// The admin or the market's `oracle`.
    Admin,
    /// One resolver address per settlement type. `None` leaves that type unresolvable.
    PerSettlement {
        manual: Option<Address>,
        pyth: Option<Address>,
        ai: Option<Address>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Owner identity: may pause/unpause, push yield and, in `admin` mode, resolve
    /// (ADMIN_ADDRESS). `None` means nobody holds those capabilities.
    pub admin: Option<Address>,
    pub resolver_mode: ResolverMode,
    pub deadline_policy: DeadlinePolicy,
    pub paused_resolution: PausedResolution,
    /// JSON endpoint polled for per-market yield (YIELD_FEED_URL). Disabled when unset.
    pub yield_feed_url: Option<String>,
    pub yield_poll_interval_secs: u64,
    /// Create the three bootstrap markets on startup (SEED_DEMO_MARKETS).
    pub seed_demo_markets: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let admin = parse_address("ADMIN_ADDRESS", &env_or("ADMIN_ADDRESS", ""))?;

        let resolver_mode = match env_or("RESOLVER_MODE", "admin").as_str() {
            "oracle" => ResolverMode::Oracle,
            "admin" => ResolverMode::Admin,
            "per-settlement" => ResolverMode::PerSettlement {
                manual: parse_address("MANUAL_RESOLVER", &env_or("MANUAL_RESOLVER", ""))?,
                pyth: parse_address("PYTH_RESOLVER", &env_or("PYTH_RESOLVER", ""))?,
                ai: parse_address("AI_RESOLVER", &env_or("AI_RESOLVER", ""))?,
            },
            other => {
                return Err(AppError::Config(format!(
                    "RESOLVER_MODE must be oracle, admin or per-settlement (got {other})"
                )))
            }
        };

        Ok(Self {
            log_level: env_or("LOG_LEVEL", "info"),
            db_path: env_or("DB_PATH", "ledger.db"),
            api_port: env_or("API_PORT", "3000")
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            admin,
            resolver_mode,
            deadline_policy: if parse_flag(&env_or("ENFORCE_END_TIME", "false")) {
                DeadlinePolicy::Enforced
            } else {
                DeadlinePolicy::Advisory
            },
            paused_resolution: if parse_flag(&env_or("ALLOW_RESOLVE_WHEN_PAUSED", "true")) {
                PausedResolution::Allow
            } else {
                PausedResolution::Deny
            },
            yield_feed_url: std::env::var("YIELD_FEED_URL").ok().filter(|s| !s.trim().is_empty()),
            yield_poll_interval_secs: env_or("YIELD_POLL_INTERVAL_SECS", "")
                .parse::<u64>()
                .unwrap_or(YIELD_POLL_INTERVAL_SECS),
            seed_demo_markets: parse_flag(&env_or("SEED_DEMO_MARKETS", "false")),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Empty values and the zero address both mean "unset".
fn parse_address(key: &str, raw: &str) -> Result<Option<Address>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let addr = Address::from_str(raw)
        .map_err(|e| AppError::Config(format!("{key} is not a valid address: {e}")))?;
    Ok((!addr.is_zero()).then_some(addr))
}
