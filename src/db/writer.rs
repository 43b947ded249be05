use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::api::health::HealthState;
use crate::error::Result;
use crate::types::LedgerEvent;

/// Attempts per event before it is counted as a journal error.
const APPEND_ATTEMPTS: u32 = 3;
const APPEND_BACKOFF_MS: u64 = 50;

/// Receives LedgerEvents from the engine and appends them to SQLite.
/// Runs as a dedicated background task so mutations never wait on disk.
pub struct JournalWriter {
    pool: sqlx::SqlitePool,
    event_rx: mpsc::UnboundedReceiver<LedgerEvent>,
    health: Arc<HealthState>,
}

impl JournalWriter {
    pub fn new(
        pool: sqlx::SqlitePool,
        event_rx: mpsc::UnboundedReceiver<LedgerEvent>,
        health: Arc<HealthState>,
    ) -> Self {
        Self { pool, event_rx, health }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.event_rx.recv().await {
            match append_with_retry(&self.pool, &event).await {
                Ok(seq) => {
                    debug!(seq, kind = event.kind(), "[JOURNAL] appended");
                    self.health.record_journal_write(now_secs());
                }
                Err(e) => {
                    error!(kind = event.kind(), attempts = APPEND_ATTEMPTS, "[JOURNAL] write failed: {e}");
                    self.health.inc_journal_errors();
                }
            }
        }
        debug!("[JOURNAL] event channel closed, writer exiting");
    }
}

/// Retries transient SQLite failures with a linear backoff.
async fn append_with_retry(pool: &sqlx::SqlitePool, event: &LedgerEvent) -> Result<i64> {
    let mut attempt = 1;
    loop {
        match append(pool, event).await {
            Ok(seq) => return Ok(seq),
            Err(e) if attempt < APPEND_ATTEMPTS => {
                warn!(kind = event.kind(), attempt, "[JOURNAL] append failed, retrying: {e}");
                tokio::time::sleep(Duration::from_millis(APPEND_BACKOFF_MS * u64::from(attempt))).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Append one event and return its sequence number.
pub async fn append(pool: &sqlx::SqlitePool, event: &LedgerEvent) -> Result<i64> {
    let payload = serde_json::to_string(event)?;
    let market_id = event.market_id().map(|id| id.to_string());
    let recorded_at = now_secs() as i64;

    let result = sqlx::query(
        r#"
        INSERT INTO ledger_events (kind, market_id, payload, recorded_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(event.kind())
    .bind(market_id)
    .bind(payload)
    .bind(recorded_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}
