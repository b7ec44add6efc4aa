//! Per-run SMS credit cache.
//!
//! A run may process many estimates for the same user; the ledger sum
//! is computed once per user and decremented in memory as sends are
//! recorded, so channel decisions stay consistent within the run.

use quotepilot_core::error::Result;
use quotepilot_store::Store;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CreditCache {
    balances: HashMap<String, f64>,
}

impl CreditCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance for a user, fetched from the ledger on first use.
    pub fn balance(&mut self, store: &Store, user_id: &str) -> Result<f64> {
        if let Some(balance) = self.balances.get(user_id) {
            return Ok(*balance);
        }
        let balance = store.sms_balance(user_id)?;
        self.balances.insert(user_id.to_string(), balance);
        Ok(balance)
    }

    /// Record one spent credit, floored at zero.
    pub fn debit(&mut self, user_id: &str) {
        let entry = self.balances.entry(user_id.to_string()).or_insert(0.0);
        *entry = (*entry - 1.0).max(0.0);
    }
}
