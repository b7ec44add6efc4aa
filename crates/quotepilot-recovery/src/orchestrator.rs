//! The recovery run.
//!
//! For every eligible candidate: resolve contact, compose a message,
//! pick exactly one channel, claim, dispatch, acknowledge. A dispatch
//! failure releases the claim (when the provider send never happened)
//! and aborts the whole run so the caller sees the failure instead of
//! a partial success.

use std::sync::Arc;

use chrono::{Duration, SecondsFormat, Utc};
use quotepilot_channels::{EmailGateway, EmailInput, SmsGateway};
use quotepilot_core::error::Result;
use quotepilot_core::types::{CandidateEstimate, RecoveryAction, RecoveryPayload, RecoveryResult};
use quotepilot_providers::{ComposeInput, Composer};
use quotepilot_store::Store;

use crate::contact::resolve_contact;
use crate::credits::CreditCache;
use crate::selector::select_candidates;

/// Ledger reason written for every recovery SMS spend.
pub const SMS_SPEND_REASON: &str = "quote_recovery_sms";
/// Cap on the preview echoed back to the caller.
pub const PREVIEW_MAX_LEN: usize = 220;

const ESTIMATE_NUMBER_MAX_LEN: usize = 80;

/// Outcome of one run.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub processed_count: usize,
    pub results: Vec<RecoveryResult>,
}

pub struct RecoveryRunner {
    store: Arc<Store>,
    composer: Arc<dyn Composer>,
    sms: Arc<dyn SmsGateway>,
    email: Arc<dyn EmailGateway>,
    lookback: Duration,
}

/// Whitespace-collapsed, capped copy of the outbound message.
pub fn message_preview(message: &str) -> String {
    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(PREVIEW_MAX_LEN).collect()
}

fn display_number(estimate: &CandidateEstimate) -> String {
    let number: String = estimate
        .estimate_number
        .as_deref()
        .unwrap_or("")
        .trim()
        .chars()
        .take(ESTIMATE_NUMBER_MAX_LEN)
        .collect();
    if number.is_empty() {
        estimate.id.clone()
    } else {
        number
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl RecoveryRunner {
    pub fn new(
        store: Arc<Store>,
        composer: Arc<dyn Composer>,
        sms: Arc<dyn SmsGateway>,
        email: Arc<dyn EmailGateway>,
        lookback_hours: i64,
    ) -> Self {
        Self {
            store,
            composer,
            sms,
            email,
            lookback: Duration::hours(lookback_hours),
        }
    }

    /// Process one run. `scope_user_id` restricts candidates to a
    /// single user (token-authenticated callers); cron callers pass
    /// `None` and sweep every user.
    pub async fn run(
        &self,
        payload: &RecoveryPayload,
        scope_user_id: Option<&str>,
    ) -> Result<RunReport> {
        let candidates = select_candidates(
            &self.store,
            payload.estimate_id.as_deref(),
            scope_user_id,
            Utc::now(),
            self.lookback,
        )?;
        tracing::info!(
            candidates = candidates.len(),
            dry_run = payload.dry_run,
            "Starting recovery run"
        );

        let mut credits = CreditCache::new();
        let mut results = Vec::new();

        for estimate in &candidates {
            let contact = resolve_contact(estimate);
            let estimate_number = display_number(estimate);

            let message = self
                .composer
                .compose(&ComposeInput {
                    client_name: contact.client_name.clone(),
                    estimate_number: estimate_number.clone(),
                    total_amount: estimate.total_amount,
                    business_name: contact.business_name.clone(),
                })
                .await;
            let preview = message_preview(&message);

            let action = if !contact.client_phone.is_empty()
                && credits.balance(&self.store, &estimate.user_id)? > 0.0
            {
                RecoveryAction::SentSms
            } else if !contact.client_email.is_empty() {
                RecoveryAction::SentEmail
            } else {
                RecoveryAction::SkippedNoContact
            };

            // Dry runs and contactless candidates never touch the
            // claim columns, the ledger or the providers.
            if payload.dry_run || action == RecoveryAction::SkippedNoContact {
                results.push(RecoveryResult {
                    estimate_id: estimate.id.clone(),
                    estimate_number,
                    action,
                    message_preview: preview,
                });
                continue;
            }

            if !self.store.claim_estimate(&estimate.id, &now_rfc3339())? {
                tracing::debug!("Estimate {} already claimed by another run", estimate.id);
                continue;
            }

            let mut dispatched = false;
            if let Err(err) = self
                .dispatch(estimate, &contact, &estimate_number, &message, action, &mut credits, &mut dispatched)
                .await
            {
                // Only re-open the estimate when the provider send
                // itself never happened; a post-send bookkeeping error
                // must not cause a duplicate message later.
                if !dispatched {
                    if let Err(release_err) = self.store.release_claim(&estimate.id) {
                        tracing::error!(
                            "Failed to release claim on estimate {}: {release_err}",
                            estimate.id
                        );
                    }
                }
                tracing::error!("Dispatch failed for estimate {}: {err}", estimate.id);
                return Err(err);
            }

            self.store.acknowledge_followup(&estimate.id, &now_rfc3339())?;
            results.push(RecoveryResult {
                estimate_id: estimate.id.clone(),
                estimate_number,
                action,
                message_preview: preview,
            });
        }

        tracing::info!(processed = results.len(), "Recovery run complete");
        Ok(RunReport {
            processed_count: results.len(),
            results,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch(
        &self,
        estimate: &CandidateEstimate,
        contact: &quotepilot_core::types::CandidateContact,
        estimate_number: &str,
        message: &str,
        action: RecoveryAction,
        credits: &mut CreditCache,
        dispatched: &mut bool,
    ) -> Result<()> {
        match action {
            RecoveryAction::SentSms => {
                let sent = self.sms.send_sms(&contact.client_phone, message).await?;
                *dispatched = true;
                self.store.record_sms_message(
                    &estimate.user_id,
                    &estimate.id,
                    &contact.client_phone,
                    &sent.message_id,
                    &sent.status,
                )?;
                self.store.append_ledger_entry(
                    &estimate.user_id,
                    -1,
                    SMS_SPEND_REASON,
                    &sent.message_id,
                )?;
                credits.debit(&estimate.user_id);
            }
            RecoveryAction::SentEmail => {
                self.email
                    .send_followup_email(&EmailInput {
                        to_email: contact.client_email.clone(),
                        client_name: contact.client_name.clone(),
                        business_name: contact.business_name.clone(),
                        message: message.to_string(),
                        estimate_number: estimate_number.to_string(),
                    })
                    .await?;
                *dispatched = true;
            }
            RecoveryAction::SkippedNoContact => {}
        }
        Ok(())
    }
}
