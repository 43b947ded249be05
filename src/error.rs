use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

/// Failure kinds of the settlement core. Every check runs before any mutation,
/// so returning one of these means the call had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Market already exists")]
    DuplicateMarket,

    #[error("Market not found")]
    MarketNotFound,

    #[error("Market is not active")]
    MarketNotActive,

    #[error("Already has position")]
    DuplicatePosition,

    #[error("Stake must be greater than zero")]
    InvalidStake,

    #[error("Betting closed at market end time")]
    BettingClosed,

    #[error("Market already resolved")]
    AlreadyResolved,

    #[error("Caller is not authorized for this market")]
    Unauthorized,

    #[error("Market not resolved")]
    MarketNotResolved,

    #[error("No position")]
    NoPosition,

    #[error("Not a winner")]
    NotAWinner,

    #[error("Already claimed")]
    AlreadyClaimed,

    #[error("Vault cannot cover payout")]
    InsufficientVaultFunds,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Invalid status transition")]
    InvalidStatusTransition,

    #[error("Settlement type does not support this resolution")]
    SettlementMismatch,

    #[error("Arithmetic overflow")]
    Overflow,
}

impl LedgerError {
    /// Stable snake_case name clients branch on.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::DuplicateMarket => "duplicate_market",
            LedgerError::MarketNotFound => "market_not_found",
            LedgerError::MarketNotActive => "market_not_active",
            LedgerError::DuplicatePosition => "duplicate_position",
            LedgerError::InvalidStake => "invalid_stake",
            LedgerError::BettingClosed => "betting_closed",
            LedgerError::AlreadyResolved => "already_resolved",
            LedgerError::Unauthorized => "unauthorized",
            LedgerError::MarketNotResolved => "market_not_resolved",
            LedgerError::NoPosition => "no_position",
            LedgerError::NotAWinner => "not_a_winner",
            LedgerError::AlreadyClaimed => "already_claimed",
            LedgerError::InsufficientVaultFunds => "insufficient_vault_funds",
            LedgerError::InsufficientFunds => "insufficient_funds",
            LedgerError::InvalidStatusTransition => "invalid_status_transition",
            LedgerError::SettlementMismatch => "settlement_mismatch",
            LedgerError::Overflow => "overflow",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::MarketNotFound | LedgerError::NoPosition => StatusCode::NOT_FOUND,
            LedgerError::Unauthorized => StatusCode::FORBIDDEN,
            LedgerError::InvalidStake | LedgerError::SettlementMismatch => StatusCode::BAD_REQUEST,
            LedgerError::InsufficientVaultFunds | LedgerError::InsufficientFunds => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            LedgerError::Overflow => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Journal error: {0}")]
    Journal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Ledger(e) => e.into_response(),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "bad_request", "message": msg })),
            )
                .into_response(),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}
