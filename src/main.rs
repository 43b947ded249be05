mod api;
mod config;
mod db;
mod engine;
mod error;
mod state;
mod types;
mod vault;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::{router, ApiState, HealthState, LatencyStats};
use crate::config::{Config, ResolverMode};
use crate::db::{replay, JournalWriter};
use crate::engine::seed::seed_demo_markets;
use crate::engine::{policy, EngineSettings, MarketEngine, SystemClock};
use crate::error::Result;
use crate::state::LedgerStore;
use crate::vault::{InMemoryFunds, YieldBook, YieldFeedPoller};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", cfg.db_path))?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(opts).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Channels ---
    let (journal_tx, journal_rx) = mpsc::unbounded_channel();
    let health = Arc::new(HealthState::new());

    // --- Ledger state, rebuilt from the journal ---
    let store = LedgerStore::new();
    let funds = InMemoryFunds::new();
    let yields = YieldBook::with_journal(journal_tx.clone());
    let stats = replay(&pool, &store, funds.as_ref(), &yields).await?;
    if stats.events == 0 {
        info!("Journal empty, starting with a fresh ledger");
    }
    if stats.skipped > 0 {
        warn!(skipped = stats.skipped, "Journal had events whose target record was never written");
    }

    if cfg.admin.is_none() {
        warn!("ADMIN_ADDRESS not set: pause/unpause, yield pushes and admin resolution are disabled");
    }
    match &cfg.resolver_mode {
        ResolverMode::PerSettlement { manual, pyth, ai } => info!(
            manual = ?manual,
            pyth = ?pyth,
            ai = ?ai,
            "Resolution: dedicated resolver per settlement type"
        ),
        mode => info!("Resolution mode: {mode:?}"),
    }

    let engine = Arc::new(
        MarketEngine::new(
            Arc::clone(&store),
            funds.clone(),
            yields.clone(),
            Arc::new(SystemClock),
            policy::from_mode(&cfg.resolver_mode, cfg.admin),
            EngineSettings::from_config(&cfg),
        )
        .with_journal(journal_tx),
    );

    // --- Spawn tasks ---

    // Journal writer
    let writer = JournalWriter::new(pool.clone(), journal_rx, Arc::clone(&health));
    tokio::spawn(async move { writer.run().await });

    // Bootstrap markets (after the writer so they are journaled)
    match (cfg.seed_demo_markets, cfg.admin) {
        (true, Some(oracle)) => {
            seed_demo_markets(&engine, oracle);
        }
        (true, None) => warn!("SEED_DEMO_MARKETS needs ADMIN_ADDRESS as the markets' oracle, skipping"),
        (false, _) => {}
    }

    // Yield feed poller (background, every YIELD_POLL_INTERVAL_SECS)
    match &cfg.yield_feed_url {
        Some(url) => {
            let poller = YieldFeedPoller::new(
                url.clone(),
                cfg.yield_poll_interval_secs,
                Arc::clone(&yields),
                Arc::clone(&health),
            );
            tokio::spawn(async move { poller.run().await });
        }
        None => info!("YIELD_FEED_URL not set: yield only changes via POST /vault/yield"),
    }

    // HTTP API server
    let api_state = ApiState {
        engine,
        yields,
        health,
        latency: Arc::new(LatencyStats::new()),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        markets = store.market_count(),
        "HTTP API listening on {bind_addr}"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
