/// One row of the `ledger_events` journal. `payload` holds the serde_json form
/// of a `LedgerEvent`; `kind` and `market_id` are copied out for ad-hoc queries.
#[derive(Debug, sqlx::FromRow)]
pub struct EventRow {
    pub seq: i64,
    pub kind: String,
    pub market_id: Option<String>,
    pub payload: String,
    pub recorded_at: i64,
}
