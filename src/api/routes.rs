use std::sync::Arc;
use std::time::Instant;

use alloy_primitives::{keccak256, Address, B256, U256};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::engine::MarketEngine;
use crate::error::{AppError, LedgerError};
use crate::types::{Market, NewMarket, Odds, Outcome, Payout, Position};
use crate::vault::poller::apply_feed;
use crate::vault::{Account, YieldBook};

/// Identity of whoever is making a call, as a contract would see `msg.sender`.
pub const CALLER_HEADER: &str = "x-caller";

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<MarketEngine>,
    pub yields: Arc<YieldBook>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/markets", get(get_markets).post(create_market))
        .route("/markets/:id", get(get_market))
        .route("/markets/:id/odds", get(get_odds))
        .route("/markets/:id/bets", post(place_bet))
        .route("/markets/:id/resolve", post(resolve_market))
        .route("/markets/:id/pause", post(pause_market))
        .route("/markets/:id/unpause", post(unpause_market))
        .route("/markets/:id/positions/:user", get(get_position))
        .route("/markets/:id/claimable/:user", get(get_claimable))
        .route("/markets/:id/claim", post(claim_winnings))
        .route("/users/:user/positions", get(get_user_positions))
        .route("/vault/markets/:id", get(get_vault_market))
        .route("/vault/markets/:id/yield/:user", get(get_user_yield))
        .route("/vault/fund", post(fund_vault))
        .route("/vault/yield", post(push_yield))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Extractors and path parsing
// ---------------------------------------------------------------------------

pub struct Caller(pub Address);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("missing {CALLER_HEADER} header")))?;
        let raw = raw
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("{CALLER_HEADER} is not valid ASCII")))?;
        let addr = raw
            .trim()
            .parse::<Address>()
            .map_err(|e| AppError::BadRequest(format!("invalid {CALLER_HEADER} '{raw}': {e}")))?;
        if addr.is_zero() {
            return Err(AppError::BadRequest(format!("{CALLER_HEADER} must not be the zero address")));
        }
        Ok(Caller(addr))
    }
}

/// A 0x-prefixed 32-byte hash, or a plain label hashed the way ids are minted
/// (`m1` -> keccak256("m1")).
fn parse_market_id(raw: &str) -> Result<B256, AppError> {
    if raw.starts_with("0x") {
        raw.parse::<B256>()
            .map_err(|e| AppError::BadRequest(format!("invalid market id '{raw}': {e}")))
    } else {
        Ok(keccak256(raw))
    }
}

fn parse_user(raw: &str) -> Result<Address, AppError> {
    raw.parse::<Address>()
        .map_err(|e| AppError::BadRequest(format!("invalid address '{raw}': {e}")))
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub outcome: Outcome,
    pub amount: U256,
}

/// Exactly one of `outcome` (manual / AI) or `observedPrice` (price feed).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub outcome: Option<Outcome>,
    pub observed_price: Option<U256>,
}

#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub amount: U256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMarketResponse {
    pub market_id: B256,
    pub total_liquidity: U256,
    pub yield_generated: U256,
    pub current_apy_bps: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserYieldResponse {
    pub market_id: B256,
    pub user: Address,
    pub yield_share: U256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundResponse {
    pub vault_balance: U256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldPushResponse {
    pub received: usize,
    pub applied: usize,
    pub rejected: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub markets: usize,
    pub vault_balance: U256,
    pub journal_written: u64,
    pub journal_errors: u64,
    pub last_journal_at: u64,
    pub yield_feed_ok: bool,
    pub last_yield_at: u64,
    pub yield_markets: usize,
}

#[derive(Debug, Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers: markets
// ---------------------------------------------------------------------------

/// Run a mutating engine call and record how long it took.
fn timed<T>(state: &ApiState, f: impl FnOnce(&MarketEngine) -> Result<T, LedgerError>) -> Result<T, AppError> {
    let started = Instant::now();
    let result = f(&state.engine);
    state.latency.record(started.elapsed());
    Ok(result?)
}

async fn get_markets(State(state): State<ApiState>) -> Json<Vec<B256>> {
    Json(state.engine.all_markets())
}

async fn create_market(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(params): Json<NewMarket>,
) -> Result<(StatusCode, Json<Market>), AppError> {
    debug!(caller = %caller, market_id = %params.id, "[API] create market");
    let market = timed(&state, |engine| engine.create_market(params))?;
    Ok((StatusCode::CREATED, Json(market)))
}

async fn get_market(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Market>, AppError> {
    let market_id = parse_market_id(&id)?;
    Ok(Json(state.engine.get_market(&market_id)?))
}

async fn get_odds(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Odds>, AppError> {
    let market_id = parse_market_id(&id)?;
    Ok(Json(state.engine.market_odds(&market_id)))
}

async fn place_bet(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(req): Json<PlaceBetRequest>,
) -> Result<(StatusCode, Json<Position>), AppError> {
    let market_id = parse_market_id(&id)?;
    let position = timed(&state, |engine| engine.place_bet(caller, market_id, req.outcome, req.amount))?;
    Ok((StatusCode::CREATED, Json(position)))
}

async fn resolve_market(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<Market>, AppError> {
    let market_id = parse_market_id(&id)?;
    let market = match (req.outcome, req.observed_price) {
        (Some(outcome), None) => timed(&state, |engine| engine.resolve_market(caller, market_id, outcome))?,
        (None, Some(price)) => timed(&state, |engine| engine.resolve_with_price(caller, market_id, price))?,
        _ => {
            return Err(AppError::BadRequest(
                "provide exactly one of outcome or observedPrice".to_string(),
            ))
        }
    };
    Ok(Json(market))
}

async fn pause_market(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<Market>, AppError> {
    let market_id = parse_market_id(&id)?;
    timed(&state, |engine| engine.pause_market(caller, market_id))?;
    Ok(Json(state.engine.get_market(&market_id)?))
}

async fn unpause_market(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<Market>, AppError> {
    let market_id = parse_market_id(&id)?;
    timed(&state, |engine| engine.unpause_market(caller, market_id))?;
    Ok(Json(state.engine.get_market(&market_id)?))
}

async fn get_position(
    State(state): State<ApiState>,
    Path((id, user)): Path<(String, String)>,
) -> Result<Json<Position>, AppError> {
    let market_id = parse_market_id(&id)?;
    let user = parse_user(&user)?;
    Ok(Json(state.engine.get_user_position(&market_id, &user)))
}

async fn get_claimable(
    State(state): State<ApiState>,
    Path((id, user)): Path<(String, String)>,
) -> Result<Json<Payout>, AppError> {
    let market_id = parse_market_id(&id)?;
    let user = parse_user(&user)?;
    Ok(Json(state.engine.claimable_amount(&market_id, &user)?))
}

async fn claim_winnings(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<Payout>, AppError> {
    let market_id = parse_market_id(&id)?;
    let payout = timed(&state, |engine| engine.claim_winnings(caller, market_id))?;
    Ok(Json(payout))
}

async fn get_user_positions(
    State(state): State<ApiState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<B256>>, AppError> {
    let user = parse_user(&user)?;
    Ok(Json(state.engine.user_positions(&user)))
}

// ---------------------------------------------------------------------------
// Handlers: vault
// ---------------------------------------------------------------------------

async fn get_vault_market(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<VaultMarketResponse>, AppError> {
    let market_id = parse_market_id(&id)?;
    let total_liquidity = state.engine.total_liquidity(&market_id)?;
    let snapshot = state.engine.yield_snapshot(&market_id);
    Ok(Json(VaultMarketResponse {
        market_id,
        total_liquidity,
        yield_generated: snapshot.accumulated_yield,
        current_apy_bps: snapshot.current_apy_bps,
    }))
}

async fn get_user_yield(
    State(state): State<ApiState>,
    Path((id, user)): Path<(String, String)>,
) -> Result<Json<UserYieldResponse>, AppError> {
    let market_id = parse_market_id(&id)?;
    let user = parse_user(&user)?;
    let yield_share = state.engine.user_yield(&market_id, &user)?;
    Ok(Json(UserYieldResponse { market_id, user, yield_share }))
}

async fn fund_vault(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(req): Json<FundRequest>,
) -> Result<Json<FundResponse>, AppError> {
    let vault_balance = timed(&state, |engine| engine.fund_vault(caller, req.amount))?;
    Ok(Json(FundResponse { vault_balance }))
}

/// Admin-only manual yield update. Accepts one feed entry or an array of them.
async fn push_yield(
    State(state): State<ApiState>,
    Caller(caller): Caller,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<YieldPushResponse>, AppError> {
    if !state.engine.is_admin(&caller) {
        return Err(LedgerError::Unauthorized.into());
    }
    let entries = match body {
        serde_json::Value::Array(_) => body,
        single => serde_json::Value::Array(vec![single]),
    };
    let stats = apply_feed(&state.yields, &entries);
    Ok(Json(YieldPushResponse {
        received: stats.received,
        applied: stats.applied,
        rejected: stats.rejected,
    }))
}

// ---------------------------------------------------------------------------
// Handlers: ops
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let health = &state.health;
    let status = if health.journal_errors() > 0 { "degraded" } else { "ok" };
    Json(HealthResponse {
        status,
        markets: state.engine.store().market_count(),
        vault_balance: state.engine.funds().balance(&Account::Vault),
        journal_written: health.journal_written(),
        journal_errors: health.journal_errors(),
        last_journal_at: health.last_journal_at(),
        yield_feed_ok: health.yield_feed_ok(),
        last_yield_at: health.last_yield_at(),
        yield_markets: state.yields.len(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let (p50_us, p95_us, p99_us) = state.latency.percentiles();
    Json(LatencyResponse {
        samples: state.latency.len(),
        p50_us,
        p95_us,
        p99_us,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testkit::*;
    use crate::vault::{FundsLedger, InMemoryFunds};
    use axum::response::IntoResponse;

    fn api_state() -> (ApiState, Arc<InMemoryFunds>) {
        let Harness { engine, funds, yields, .. } = harness_with_market();
        let state = ApiState {
            engine: Arc::new(engine),
            yields,
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
        };
        (state, funds)
    }

    fn id_path() -> Path<String> {
        Path(market_id().to_string())
    }

    async fn bet(state: &ApiState, user: Address, outcome: Outcome, amount: U256) -> Result<Position, AppError> {
        place_bet(
            State(state.clone()),
            Caller(user),
            id_path(),
            Json(PlaceBetRequest { outcome, amount }),
        )
        .await
        .map(|(_, Json(p))| p)
    }

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn caller_header_is_parsed() {
        let (mut parts, _) = axum::http::Request::builder()
            .header(CALLER_HEADER, USER1.to_string())
            .body(())
            .unwrap()
            .into_parts();
        let Caller(addr) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(addr, USER1);
    }

    #[tokio::test]
    async fn missing_or_bad_caller_is_rejected() {
        let (mut parts, _) = axum::http::Request::builder().body(()).unwrap().into_parts();
        let err = Caller::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let (mut parts, _) = axum::http::Request::builder()
            .header(CALLER_HEADER, "0xnothex")
            .body(())
            .unwrap()
            .into_parts();
        let err = Caller::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_caller_is_rejected() {
        let (mut parts, _) = axum::http::Request::builder()
            .header(CALLER_HEADER, Address::ZERO.to_string())
            .body(())
            .unwrap()
            .into_parts();
        let err = Caller::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ownerless_service_denies_admin_routes() {
        let Harness { engine, yields, .. } = ownerless_harness();
        engine.create_market(new_market(market_id())).unwrap();
        let state = ApiState {
            engine: Arc::new(engine),
            yields,
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
        };

        for caller in [Address::ZERO, OWNER] {
            let err = pause_market(State(state.clone()), Caller(caller), id_path()).await.unwrap_err();
            assert_eq!(status_of(err), StatusCode::FORBIDDEN);
            let body = serde_json::json!({
                "marketId": market_id(),
                "accumulatedYield": milli(40),
                "apyBps": 800
            });
            let err = push_yield(State(state.clone()), Caller(caller), Json(body)).await.unwrap_err();
            assert_eq!(status_of(err), StatusCode::FORBIDDEN);
        }
        assert_eq!(state.yields.len(), 0);
    }

    #[tokio::test]
    async fn bets_move_odds_and_record_latency() {
        let (state, _funds) = api_state();
        bet(&state, USER1, Outcome::Yes, milli(300)).await.unwrap();
        bet(&state, USER2, Outcome::No, milli(100)).await.unwrap();

        let Json(odds) = get_odds(State(state.clone()), id_path()).await.unwrap();
        assert_eq!(odds, Odds { yes_odds: 75, no_odds: 25 });

        let Json(latency) = get_stats_latency(State(state.clone())).await;
        assert_eq!(latency.samples, 2);
        assert!(latency.p50_us.is_some());
    }

    #[tokio::test]
    async fn ledger_errors_map_to_http_status() {
        let (state, _funds) = api_state();
        bet(&state, USER1, Outcome::Yes, milli(1)).await.unwrap();

        let dup = bet(&state, USER1, Outcome::No, milli(1)).await.unwrap_err();
        assert_eq!(status_of(dup), StatusCode::CONFLICT);

        let zero = bet(&state, USER2, Outcome::No, U256::ZERO).await.unwrap_err();
        assert_eq!(status_of(zero), StatusCode::BAD_REQUEST);

        let missing = get_market(State(state.clone()), Path(B256::ZERO.to_string())).await.unwrap_err();
        assert_eq!(status_of(missing), StatusCode::NOT_FOUND);

        let stranger = resolve_market(
            State(state.clone()),
            Caller(USER3),
            id_path(),
            Json(ResolveRequest { outcome: Some(Outcome::Yes), observed_price: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(status_of(stranger), StatusCode::FORBIDDEN);

        let bad_id = get_market(State(state.clone()), Path("0x1234".to_string())).await.unwrap_err();
        assert_eq!(status_of(bad_id), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_market_accepts_abi_style_body() {
        let (state, _funds) = api_state();
        let body = serde_json::json!({
            "id": keccak256("m9"),
            "question": "Will BTC close above $100k?",
            "description": "Pyth BTC/USD",
            "endTime": START + DAY,
            "oracle": OWNER,
            "settlementType": 1,
            "priceFeedId": B256::repeat_byte(7),
            "targetPrice": "0x2540be400"
        });
        let params: NewMarket = serde_json::from_value(body).unwrap();

        let (status, Json(m)) = create_market(State(state.clone()), Caller(USER1), Json(params.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(m.settlement_type, crate::types::SettlementType::Pyth);
        assert_eq!(m.target_price, U256::from(10_000_000_000u64));

        let dup = create_market(State(state.clone()), Caller(USER1), Json(params)).await.unwrap_err();
        assert_eq!(status_of(dup), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn market_ids_accept_labels() {
        let (state, _funds) = api_state();
        crate::engine::seed::seed_demo_markets(&state.engine, OWNER);
        let Json(m) = get_market(State(state.clone()), Path("m2".to_string())).await.unwrap();
        assert_eq!(m.id, keccak256("m2"));
        let Json(ids) = get_markets(State(state.clone())).await;
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn resolve_requires_exactly_one_input() {
        let (state, _funds) = api_state();
        let err = resolve_market(State(state.clone()), Caller(OWNER), id_path(), Json(ResolveRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let err = resolve_market(
            State(state.clone()),
            Caller(OWNER),
            id_path(),
            Json(ResolveRequest { outcome: Some(Outcome::Yes), observed_price: Some(U256::from(1u64)) }),
        )
        .await
        .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_market_through_handlers() {
        let (state, _funds) = api_state();
        bet(&state, USER1, Outcome::Yes, milli(100)).await.unwrap();
        bet(&state, USER2, Outcome::No, milli(100)).await.unwrap();

        let Json(market) = resolve_market(
            State(state.clone()),
            Caller(OWNER),
            id_path(),
            Json(ResolveRequest { outcome: Some(Outcome::Yes), observed_price: None }),
        )
        .await
        .unwrap();
        assert_eq!(market.outcome, Some(Outcome::Yes));

        let Json(quote) = get_claimable(
            State(state.clone()),
            Path((market_id().to_string(), USER1.to_string())),
        )
        .await
        .unwrap();
        assert_eq!(quote.total, milli(200));

        let Json(paid) = claim_winnings(State(state.clone()), Caller(USER1), id_path()).await.unwrap();
        assert_eq!(paid, quote);

        let again = claim_winnings(State(state.clone()), Caller(USER1), id_path()).await.unwrap_err();
        assert_eq!(status_of(again), StatusCode::CONFLICT);

        let Json(ids) = get_user_positions(State(state.clone()), Path(USER1.to_string())).await.unwrap();
        assert_eq!(ids, vec![market_id()]);

        let Json(health) = get_health(State(state.clone())).await;
        assert_eq!(health.markets, 1);
        assert_eq!(health.vault_balance, U256::ZERO);
    }

    #[tokio::test]
    async fn pause_is_admin_only() {
        let (state, _funds) = api_state();
        let err = pause_market(State(state.clone()), Caller(USER1), id_path()).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::FORBIDDEN);

        let Json(m) = pause_market(State(state.clone()), Caller(OWNER), id_path()).await.unwrap();
        assert_eq!(m.status, crate::types::MarketStatus::Paused);

        let again = pause_market(State(state.clone()), Caller(OWNER), id_path()).await.unwrap_err();
        assert_eq!(status_of(again), StatusCode::CONFLICT);

        let Json(m) = unpause_market(State(state.clone()), Caller(OWNER), id_path()).await.unwrap();
        assert_eq!(m.status, crate::types::MarketStatus::Active);
    }

    #[tokio::test]
    async fn yield_push_feeds_vault_views() {
        let (state, _funds) = api_state();
        bet(&state, USER1, Outcome::Yes, milli(300)).await.unwrap();
        bet(&state, USER2, Outcome::No, milli(100)).await.unwrap();

        let body = serde_json::json!({
            "marketId": market_id(),
            "accumulatedYield": milli(40),
            "apyBps": 800
        });
        let denied = push_yield(State(state.clone()), Caller(USER1), Json(body.clone())).await.unwrap_err();
        assert_eq!(status_of(denied), StatusCode::FORBIDDEN);

        let Json(pushed) = push_yield(State(state.clone()), Caller(OWNER), Json(body)).await.unwrap();
        assert_eq!(pushed.applied, 1);

        let Json(vault) = get_vault_market(State(state.clone()), id_path()).await.unwrap();
        assert_eq!(vault.total_liquidity, milli(400));
        assert_eq!(vault.yield_generated, milli(40));
        assert_eq!(vault.current_apy_bps, 800);

        let Json(y) = get_user_yield(
            State(state.clone()),
            Path((market_id().to_string(), USER1.to_string())),
        )
        .await
        .unwrap();
        assert_eq!(y.yield_share, milli(30));
    }

    #[tokio::test]
    async fn underfunded_claim_is_service_unavailable() {
        let (state, funds) = api_state();
        bet(&state, USER1, Outcome::Yes, milli(100)).await.unwrap();
        bet(&state, USER2, Outcome::No, milli(100)).await.unwrap();
        resolve_market(
            State(state.clone()),
            Caller(OWNER),
            id_path(),
            Json(ResolveRequest { outcome: Some(Outcome::Yes), observed_price: None }),
        )
        .await
        .unwrap();
        funds.debit(Account::Vault, milli(150)).unwrap();

        let err = claim_winnings(State(state.clone()), Caller(USER1), id_path()).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);

        let Json(FundResponse { vault_balance }) =
            fund_vault(State(state.clone()), Caller(OWNER), Json(FundRequest { amount: milli(150) }))
                .await
                .unwrap();
        assert_eq!(vault_balance, milli(200));
        claim_winnings(State(state.clone()), Caller(USER1), id_path()).await.unwrap();
    }
}
