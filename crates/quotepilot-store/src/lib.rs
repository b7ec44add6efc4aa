//! QuotePilot SQLite store.
//!
//! Holds the estimate follow-up columns, the append-only SMS credit
//! ledger, dispatched-message records, user profiles (plan tier,
//! business name) and API tokens. The claim on an estimate is a single
//! conditional UPDATE — the only cross-run serialization point in the
//! whole subsystem — so it must never be replaced with a read-then-write.

use quotepilot_core::error::{QuotePilotError, Result};
use quotepilot_core::types::CandidateEstimate;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

/// Persistent store shared by the gateway and the orchestrator.
pub struct Store {
    conn: Mutex<Connection>,
}

/// Estimate snapshot written by the upstream sync. The follow-up
/// columns are never touched by sync — only by claim/ack/release.
#[derive(Debug, Clone)]
pub struct SyncedEstimate {
    pub id: String,
    pub user_id: String,
    pub estimate_number: Option<String>,
    /// Kept dynamic: the upstream feed sends numbers or numeric strings.
    pub total_amount: Value,
    pub status: String,
    pub sent_at: Option<String>,
    pub created_at: Option<String>,
    /// Client relation as received: object or one-element array.
    pub client: Value,
    /// Business-profile relation as received: object or one-element array.
    pub profile: Value,
}

/// One row of the SMS credit ledger, delta already coerced.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: String,
    pub delta_credits: f64,
    pub reason: String,
    pub ref_id: String,
    pub created_at: String,
}

/// Shared SELECT column list for estimate reads — single source of truth.
const ESTIMATE_SELECT: &str = "SELECT id, user_id, estimate_number, total_amount, sent_at, created_at, first_followup_queued_at, first_followed_up_at, last_followed_up_at, client_json, profile_json FROM estimates";

fn row_to_candidate(row: &rusqlite::Row) -> rusqlite::Result<CandidateEstimate> {
    Ok(CandidateEstimate {
        id: row.get(0)?,
        user_id: row.get(1)?,
        estimate_number: row.get(2)?,
        total_amount: coerce_numeric(row.get_ref(3)?),
        sent_at: row.get(4)?,
        created_at: row.get(5)?,
        first_followup_queued_at: row.get(6)?,
        first_followed_up_at: row.get(7)?,
        last_followed_up_at: row.get(8)?,
        client: parse_json_column(row.get_ref(9)?),
        profile: parse_json_column(row.get_ref(10)?),
    })
}

/// Dynamic numeric column → f64, or None. Text is parsed; anything
/// else is treated as absent rather than an error.
fn coerce_numeric(value: ValueRef) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) if f.is_finite() => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite()),
        _ => None,
    }
}

fn parse_json_column(value: ValueRef) -> Value {
    match value {
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

impl Store {
    /// Open or create the database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| QuotePilotError::Store(format!("DB open error: {e}")))?;

        // WAL allows concurrent readers while a claim UPDATE is running
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| QuotePilotError::Store(format!("DB pragma error: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS estimates (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                estimate_number TEXT,
                total_amount,
                status TEXT DEFAULT 'draft',
                sent_at TEXT,
                created_at TEXT,
                first_followup_queued_at TEXT,
                first_followed_up_at TEXT,
                last_followed_up_at TEXT,
                client_json TEXT DEFAULT 'null',
                profile_json TEXT DEFAULT 'null'
            );
            CREATE INDEX IF NOT EXISTS idx_estimates_recovery
                ON estimates (status, first_followup_queued_at, created_at);

            CREATE TABLE IF NOT EXISTS sms_credit_ledger (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                delta_credits,
                reason TEXT DEFAULT '',
                ref_id TEXT DEFAULT '',
                created_at TEXT DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_ledger_user ON sms_credit_ledger (user_id);

            CREATE TABLE IF NOT EXISTS sms_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                estimate_id TEXT NOT NULL,
                to_phone_e164 TEXT NOT NULL,
                provider_id TEXT NOT NULL,
                status TEXT DEFAULT 'queued',
                created_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                plan_tier TEXT DEFAULT 'free',
                business_name TEXT DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS api_tokens (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT DEFAULT (datetime('now'))
            );
        ",
        )
        .map_err(|e| QuotePilotError::Store(format!("Migration error: {e}")))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| QuotePilotError::Store(format!("Lock: {e}")))
    }

    // ── Estimate sync ──────────────────────────────

    /// Write or refresh an estimate snapshot. Follow-up columns are
    /// preserved on conflict — sync must not reopen a claimed estimate.
    pub fn record_synced_estimate(&self, est: &SyncedEstimate) -> Result<()> {
        let conn = self.lock()?;
        let total = match &est.total_amount {
            Value::Number(n) => rusqlite::types::Value::from(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => rusqlite::types::Value::from(s.clone()),
            _ => rusqlite::types::Value::Null,
        };
        conn.execute(
            "INSERT INTO estimates (id, user_id, estimate_number, total_amount, status, sent_at, created_at, client_json, profile_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
               user_id=?2, estimate_number=?3, total_amount=?4, status=?5,
               sent_at=?6, created_at=?7, client_json=?8, profile_json=?9",
            params![
                est.id,
                est.user_id,
                est.estimate_number,
                total,
                est.status,
                est.sent_at,
                est.created_at,
                est.client.to_string(),
                est.profile.to_string(),
            ],
        )
        .map_err(|e| QuotePilotError::Store(format!("Upsert estimate: {e}")))?;
        Ok(())
    }

    /// Get a single estimate.
    pub fn get_estimate(&self, id: &str) -> Result<Option<CandidateEstimate>> {
        let conn = self.lock()?;
        match conn.query_row(
            &format!("{ESTIMATE_SELECT} WHERE id=?1"),
            params![id],
            row_to_candidate,
        ) {
            Ok(est) => Ok(Some(est)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(QuotePilotError::Store(format!("Get estimate: {e}"))),
        }
    }

    /// Unclaimed sent estimates, oldest first, capped at `limit`.
    /// Read-only: the in-memory eligibility filter runs on top of this.
    pub fn unclaimed_sent_estimates(
        &self,
        estimate_id: Option<&str>,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CandidateEstimate>> {
        let conn = self.lock()?;
        let mut sql = format!(
            "{ESTIMATE_SELECT} WHERE status='sent' AND first_followup_queued_at IS NULL"
        );
        let mut binds: Vec<&dyn rusqlite::ToSql> = Vec::new();
        if let Some(id) = &estimate_id {
            sql.push_str(" AND id=?");
            binds.push(id);
        }
        if let Some(uid) = &user_id {
            sql.push_str(" AND user_id=?");
            binds.push(uid);
        }
        sql.push_str(" ORDER BY created_at ASC LIMIT ?");
        let limit = limit as i64;
        binds.push(&limit);

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| QuotePilotError::Store(format!("Prepare: {e}")))?;
        let rows = stmt
            .query_map(binds.as_slice(), row_to_candidate)
            .map_err(|e| QuotePilotError::Store(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    // ── Claim / acknowledge / release ──────────────────────────────

    /// Conditionally claim an estimate for follow-up. Returns false if
    /// another run won the race (zero rows affected) — not an error.
    pub fn claim_estimate(&self, id: &str, queued_at: &str) -> Result<bool> {
        let conn = self.lock()?;
        let affected = conn
            .execute(
                "UPDATE estimates SET first_followup_queued_at=?1
                 WHERE id=?2 AND first_followup_queued_at IS NULL",
                params![queued_at, id],
            )
            .map_err(|e| QuotePilotError::Store(format!("Claim estimate: {e}")))?;
        Ok(affected == 1)
    }

    /// Mark a follow-up as dispatched.
    pub fn acknowledge_followup(&self, id: &str, sent_at: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE estimates SET first_followed_up_at=?1, last_followed_up_at=?1 WHERE id=?2",
            params![sent_at, id],
        )
        .map_err(|e| QuotePilotError::Store(format!("Acknowledge follow-up: {e}")))?;
        Ok(())
    }

    /// Re-open an estimate after a failed dispatch. Guarded so a
    /// completed follow-up is never un-done.
    pub fn release_claim(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE estimates SET first_followup_queued_at=NULL
             WHERE id=?1 AND first_followed_up_at IS NULL",
            params![id],
        )
        .map_err(|e| QuotePilotError::Store(format!("Release claim: {e}")))?;
        Ok(())
    }

    // ── SMS credit ledger ──────────────────────────────

    /// Append one ledger row. The ledger is append-only: balances are
    /// derived, never stored.
    pub fn append_ledger_entry(
        &self,
        user_id: &str,
        delta_credits: i64,
        reason: &str,
        ref_id: &str,
    ) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sms_credit_ledger (user_id, delta_credits, reason, ref_id) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, delta_credits, reason, ref_id],
        )
        .map_err(|e| QuotePilotError::Store(format!("Ledger append: {e}")))?;
        Ok(())
    }

    /// Sum of all ledger deltas for a user. Non-numeric deltas count
    /// as 0 — junk rows must never poison the balance.
    pub fn sms_balance(&self, user_id: &str) -> Result<f64> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT delta_credits FROM sms_credit_ledger WHERE user_id=?1")
            .map_err(|e| QuotePilotError::Store(format!("Prepare: {e}")))?;
        let mut rows = stmt
            .query(params![user_id])
            .map_err(|e| QuotePilotError::Store(format!("Query: {e}")))?;

        let mut balance = 0.0;
        while let Some(row) = rows
            .next()
            .map_err(|e| QuotePilotError::Store(format!("Ledger read: {e}")))?
        {
            let delta = row
                .get_ref(0)
                .map_err(|e| QuotePilotError::Store(format!("Ledger read: {e}")))?;
            balance += coerce_numeric(delta).unwrap_or(0.0);
        }
        Ok(balance)
    }

    /// All ledger rows for a user, oldest first (reconciliation view).
    pub fn ledger_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, user_id, delta_credits, reason, ref_id, created_at FROM sms_credit_ledger WHERE user_id=?1 ORDER BY id ASC")
            .map_err(|e| QuotePilotError::Store(format!("Prepare: {e}")))?;
        let entries = stmt
            .query_map(params![user_id], |row| {
                Ok(LedgerEntry {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    delta_credits: coerce_numeric(row.get_ref(2)?).unwrap_or(0.0),
                    reason: row.get(3)?,
                    ref_id: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|e| QuotePilotError::Store(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }

    // ── Message records ──────────────────────────────

    /// Persist a successfully dispatched SMS.
    pub fn record_sms_message(
        &self,
        user_id: &str,
        estimate_id: &str,
        to_phone_e164: &str,
        provider_id: &str,
        status: &str,
    ) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sms_messages (user_id, estimate_id, to_phone_e164, provider_id, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, estimate_id, to_phone_e164, provider_id, status],
        )
        .map_err(|e| QuotePilotError::Store(format!("Record SMS message: {e}")))?;
        Ok(())
    }

    /// Count of recorded SMS dispatches for an estimate.
    pub fn sms_message_count(&self, estimate_id: &str) -> Result<i64> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COUNT(*) FROM sms_messages WHERE estimate_id=?1",
            params![estimate_id],
            |r| r.get(0),
        )
        .map_err(|e| QuotePilotError::Store(format!("Count SMS messages: {e}")))
    }

    // ── Profiles / auth ──────────────────────────────

    /// Create or update a user profile.
    pub fn upsert_profile(&self, id: &str, plan_tier: &str, business_name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO profiles (id, plan_tier, business_name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET plan_tier=?2, business_name=?3",
            params![id, plan_tier, business_name],
        )
        .map_err(|e| QuotePilotError::Store(format!("Upsert profile: {e}")))?;
        Ok(())
    }

    /// Plan tier for a user, lowercased, defaulting to "free" for
    /// unknown users.
    pub fn plan_tier(&self, user_id: &str) -> Result<String> {
        let conn = self.lock()?;
        match conn.query_row(
            "SELECT plan_tier FROM profiles WHERE id=?1",
            params![user_id],
            |row| row.get::<_, String>(0),
        ) {
            Ok(tier) => {
                let tier: String = tier.trim().chars().take(24).collect();
                let tier = tier.to_lowercase();
                Ok(if tier.is_empty() { "free".into() } else { tier })
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok("free".into()),
            Err(e) => Err(QuotePilotError::Store(format!("Plan tier: {e}"))),
        }
    }

    /// Register an API token for a user.
    pub fn insert_api_token(&self, token: &str, user_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO api_tokens (token, user_id) VALUES (?1, ?2)",
            params![token, user_id],
        )
        .map_err(|e| QuotePilotError::Store(format!("Insert token: {e}")))?;
        Ok(())
    }

    /// Resolve a bearer token to a user id.
    pub fn resolve_token(&self, token: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        match conn.query_row(
            "SELECT user_id FROM api_tokens WHERE token=?1",
            params![token],
            |row| row.get::<_, String>(0),
        ) {
            Ok(uid) => Ok(Some(uid)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(QuotePilotError::Store(format!("Resolve token: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn seed(store: &Store, id: &str, status: &str, created_at: &str) {
        store
            .record_synced_estimate(&SyncedEstimate {
                id: id.into(),
                user_id: "user-1".into(),
                estimate_number: Some(format!("SQ-{id}")),
                total_amount: json!(1200),
                status: status.into(),
                sent_at: Some(created_at.into()),
                created_at: Some(created_at.into()),
                client: json!({"name": "Alex", "email": "alex@example.com"}),
                profile: json!({"business_name": "Acme Plumbing"}),
            })
            .unwrap();
    }

    #[test]
    fn test_claim_wins_once() {
        let store = temp_store();
        seed(&store, "e1", "sent", "2026-08-20T10:00:00Z");

        assert!(store.claim_estimate("e1", "2026-08-25T00:00:00Z").unwrap());
        // Second attempt loses the race: zero rows affected.
        assert!(!store.claim_estimate("e1", "2026-08-25T00:00:01Z").unwrap());

        let est = store.get_estimate("e1").unwrap().unwrap();
        assert_eq!(
            est.first_followup_queued_at.as_deref(),
            Some("2026-08-25T00:00:00Z")
        );
    }

    #[test]
    fn test_release_reopens_unless_completed() {
        let store = temp_store();
        seed(&store, "e1", "sent", "2026-08-20T10:00:00Z");
        assert!(store.claim_estimate("e1", "2026-08-25T00:00:00Z").unwrap());

        store.release_claim("e1").unwrap();
        let est = store.get_estimate("e1").unwrap().unwrap();
        assert!(est.first_followup_queued_at.is_none());

        // Claim again, acknowledge, then release must be a no-op.
        assert!(store.claim_estimate("e1", "2026-08-25T00:01:00Z").unwrap());
        store
            .acknowledge_followup("e1", "2026-08-25T00:02:00Z")
            .unwrap();
        store.release_claim("e1").unwrap();
        let est = store.get_estimate("e1").unwrap().unwrap();
        assert!(est.first_followup_queued_at.is_some());
        assert_eq!(
            est.first_followed_up_at.as_deref(),
            Some("2026-08-25T00:02:00Z")
        );
        assert_eq!(est.first_followed_up_at, est.last_followed_up_at);
    }

    #[test]
    fn test_unclaimed_query_excludes_claimed_and_non_sent() {
        let store = temp_store();
        seed(&store, "a", "sent", "2026-08-18T10:00:00Z");
        seed(&store, "b", "sent", "2026-08-19T10:00:00Z");
        seed(&store, "c", "draft", "2026-08-17T10:00:00Z");
        assert!(store.claim_estimate("b", "2026-08-25T00:00:00Z").unwrap());

        let rows = store.unclaimed_sent_estimates(None, None, 250).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "a");
    }

    #[test]
    fn test_unclaimed_query_orders_oldest_first() {
        let store = temp_store();
        seed(&store, "new", "sent", "2026-08-22T10:00:00Z");
        seed(&store, "old", "sent", "2026-08-10T10:00:00Z");
        seed(&store, "mid", "sent", "2026-08-15T10:00:00Z");

        let rows = store.unclaimed_sent_estimates(None, None, 250).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_unclaimed_query_scoping_filters() {
        let store = temp_store();
        seed(&store, "a", "sent", "2026-08-18T10:00:00Z");
        store
            .record_synced_estimate(&SyncedEstimate {
                id: "other".into(),
                user_id: "user-2".into(),
                estimate_number: None,
                total_amount: Value::Null,
                status: "sent".into(),
                sent_at: None,
                created_at: Some("2026-08-18T10:00:00Z".into()),
                client: Value::Null,
                profile: Value::Null,
            })
            .unwrap();

        let rows = store
            .unclaimed_sent_estimates(None, Some("user-2"), 250)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "other");

        let rows = store
            .unclaimed_sent_estimates(Some("a"), None, 250)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "a");
    }

    #[test]
    fn test_sync_preserves_followup_columns() {
        let store = temp_store();
        seed(&store, "e1", "sent", "2026-08-20T10:00:00Z");
        assert!(store.claim_estimate("e1", "2026-08-25T00:00:00Z").unwrap());

        seed(&store, "e1", "sent", "2026-08-20T10:00:00Z");
        let est = store.get_estimate("e1").unwrap().unwrap();
        assert!(est.first_followup_queued_at.is_some());
    }

    #[test]
    fn test_balance_sums_and_coerces() {
        let store = temp_store();
        store
            .append_ledger_entry("user-1", 5, "purchase", "order-1")
            .unwrap();
        store
            .append_ledger_entry("user-1", -1, "quote_recovery_sms", "SM1")
            .unwrap();

        // Junk rows synced from elsewhere: string delta and garbage.
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO sms_credit_ledger (user_id, delta_credits) VALUES ('user-1', '2')",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO sms_credit_ledger (user_id, delta_credits) VALUES ('user-1', 'oops')",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO sms_credit_ledger (user_id, delta_credits) VALUES ('user-1', NULL)",
                [],
            )
            .unwrap();
        }

        assert_eq!(store.sms_balance("user-1").unwrap(), 6.0);
        assert_eq!(store.sms_balance("user-2").unwrap(), 0.0);

        let entries = store.ledger_entries("user-1").unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[1].reason, "quote_recovery_sms");
        assert_eq!(entries[1].ref_id, "SM1");
    }

    #[test]
    fn test_total_amount_text_coercion() {
        let store = temp_store();
        store
            .record_synced_estimate(&SyncedEstimate {
                id: "t".into(),
                user_id: "user-1".into(),
                estimate_number: None,
                total_amount: json!("250.50"),
                status: "sent".into(),
                sent_at: None,
                created_at: Some("2026-08-18T10:00:00Z".into()),
                client: Value::Null,
                profile: Value::Null,
            })
            .unwrap();
        let est = store.get_estimate("t").unwrap().unwrap();
        assert_eq!(est.total_amount, Some(250.5));
    }

    #[test]
    fn test_plan_tier_defaults_and_normalizes() {
        let store = temp_store();
        assert_eq!(store.plan_tier("ghost").unwrap(), "free");

        store.upsert_profile("u1", "Pro", "Acme").unwrap();
        assert_eq!(store.plan_tier("u1").unwrap(), "pro");

        store.upsert_profile("u2", "", "Acme").unwrap();
        assert_eq!(store.plan_tier("u2").unwrap(), "free");
    }

    #[test]
    fn test_token_resolution() {
        let store = temp_store();
        store.insert_api_token("tok-1", "user-9").unwrap();
        assert_eq!(
            store.resolve_token("tok-1").unwrap().as_deref(),
            Some("user-9")
        );
        assert!(store.resolve_token("nope").unwrap().is_none());
    }

    #[test]
    fn test_sms_message_record() {
        let store = temp_store();
        store
            .record_sms_message("user-1", "e1", "+14165550123", "SM_1", "queued")
            .unwrap();
        assert_eq!(store.sms_message_count("e1").unwrap(), 1);
        assert_eq!(store.sms_message_count("other").unwrap(), 0);
    }
}
