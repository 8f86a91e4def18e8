//! Two-phase reminder confirmation
//!
//! `/addreminder` stages a draft under a random token and shows Confirm and
//! Cancel buttons carrying it. Pressing either consumes the token exactly
//! once; Confirm then commits the draft to the reminder ledger.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::database::{NewReminder, ReminderStore, TargetType};

pub const CONFIRM_PREFIX: &str = "rem:confirm:";
pub const CANCEL_PREFIX: &str = "rem:cancel:";

/// The staged payload: everything needed to commit, plus the raw input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub created_by: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    pub target_type: TargetType,
    pub target_id: String,
    pub message: String,
    pub remind_at: DateTime<Utc>,
    #[serde(default)]
    pub date_str: Option<String>,
    #[serde(default)]
    pub time_str: Option<String>,
}

impl ReminderDraft {
    pub fn to_new_reminder(&self) -> NewReminder {
        NewReminder {
            created_by: self.created_by.clone(),
            guild_id: self.guild_id.clone(),
            target_type: self.target_type,
            target_id: self.target_id.clone(),
            message: self.message.clone(),
            remind_at: self.remind_at,
        }
    }
}

/// A confirm/cancel input raised by a button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationEvent {
    Confirm(String),
    Cancel(String),
}

impl ConfirmationEvent {
    /// Recognise `rem:confirm:<token>` / `rem:cancel:<token>` custom ids
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        if let Some(token) = custom_id.strip_prefix(CONFIRM_PREFIX) {
            return Some(ConfirmationEvent::Confirm(token.to_string()));
        }
        custom_id
            .strip_prefix(CANCEL_PREFIX)
            .map(|token| ConfirmationEvent::Cancel(token.to_string()))
    }

    pub fn token(&self) -> &str {
        match self {
            ConfirmationEvent::Confirm(token) | ConfirmationEvent::Cancel(token) => token,
        }
    }
}

pub fn confirm_custom_id(token: &str) -> String {
    format!("{CONFIRM_PREFIX}{token}")
}

pub fn cancel_custom_id(token: &str) -> String {
    format!("{CANCEL_PREFIX}{token}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    Committed { id: u64, draft: ReminderDraft },
    Cancelled,
    /// Unknown, already used, or expired token
    InvalidOrExpired,
}

/// Stages drafts and resolves confirm/cancel events against the reminder store
#[derive(Clone)]
pub struct ReminderConfirmations {
    store: ReminderStore,
}

impl ReminderConfirmations {
    pub fn new(store: ReminderStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    /// Stage a draft and return the token for its buttons
    pub async fn stage(&self, draft: &ReminderDraft) -> Result<String> {
        let token = self.store.stage(draft).await?;
        info!(
            "Staged reminder for {} {} by {} (token {})",
            draft.target_type, draft.target_id, draft.created_by, token
        );
        Ok(token)
    }

    pub async fn handle(&self, event: &ConfirmationEvent) -> Result<ConfirmationOutcome> {
        self.handle_at(event, Utc::now()).await
    }

    pub async fn handle_at(
        &self,
        event: &ConfirmationEvent,
        now: DateTime<Utc>,
    ) -> Result<ConfirmationOutcome> {
        match event {
            ConfirmationEvent::Confirm(token) => {
                let Some(draft) = self.store.consume_at::<ReminderDraft>(token, now).await? else {
                    debug!("Confirm with invalid or expired token {token}");
                    return Ok(ConfirmationOutcome::InvalidOrExpired);
                };
                let id = self.store.commit_at(draft.to_new_reminder(), now).await?;
                info!("Reminder #{id} confirmed by {}", draft.created_by);
                Ok(ConfirmationOutcome::Committed { id, draft })
            }
            ConfirmationEvent::Cancel(token) => {
                // Consume so the token can't be confirmed later
                let draft = self.store.consume_at::<ReminderDraft>(token, now).await?;
                if draft.is_none() {
                    debug!("Cancel with invalid or expired token {token}");
                    return Ok(ConfirmationOutcome::InvalidOrExpired);
                }
                info!("Staged reminder {token} cancelled");
                Ok(ConfirmationOutcome::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::scratch_dir;
    use crate::database::ReminderStatus;
    use chrono::{Duration, TimeZone};

    fn confirmations() -> ReminderConfirmations {
        ReminderConfirmations::new(ReminderStore::new(scratch_dir().join("reminders.json")))
    }

    fn draft() -> ReminderDraft {
        ReminderDraft {
            created_by: "111111111111111111".to_string(),
            guild_id: Some("222222222222222222".to_string()),
            target_type: TargetType::User,
            target_id: "333333333333333333".to_string(),
            message: "stand-up in 5".to_string(),
            remind_at: Utc.with_ymd_and_hms(2026, 10, 19, 2, 0, 0).unwrap(),
            date_str: Some("2026-10-19".to_string()),
            time_str: Some("09:00".to_string()),
        }
    }

    #[test]
    fn test_custom_id_round_trip() {
        assert_eq!(
            ConfirmationEvent::from_custom_id(&confirm_custom_id("abc123")),
            Some(ConfirmationEvent::Confirm("abc123".to_string()))
        );
        assert_eq!(
            ConfirmationEvent::from_custom_id(&cancel_custom_id("abc123")),
            Some(ConfirmationEvent::Cancel("abc123".to_string()))
        );
        assert_eq!(ConfirmationEvent::from_custom_id("persona_obi"), None);
        assert_eq!(ConfirmationEvent::Cancel("t".into()).token(), "t");
    }

    #[test]
    fn test_draft_uses_reference_field_names() {
        let value = serde_json::to_value(draft()).unwrap();
        for key in [
            "createdBy",
            "guildId",
            "targetType",
            "targetId",
            "message",
            "remindAt",
            "dateStr",
            "timeStr",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["targetType"], "user");
    }

    #[tokio::test]
    async fn test_confirm_commits_pending_reminder() {
        let confirmations = confirmations();
        let token = confirmations.stage(&draft()).await.unwrap();

        let outcome = confirmations
            .handle(&ConfirmationEvent::Confirm(token))
            .await
            .unwrap();
        let ConfirmationOutcome::Committed { id, draft: committed } = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(id, 1);
        assert_eq!(committed, draft());

        let reminder = confirmations.store().get(1).await.unwrap().unwrap();
        assert_eq!(reminder.status, ReminderStatus::Pending);
        assert_eq!(reminder.message, "stand-up in 5");
        assert_eq!(reminder.target_type, TargetType::User);
    }

    #[tokio::test]
    async fn test_double_confirm_commits_once() {
        let confirmations = confirmations();
        let token = confirmations.stage(&draft()).await.unwrap();
        let event = ConfirmationEvent::Confirm(token);

        let (a, b) = tokio::join!(confirmations.handle(&event), confirmations.handle(&event));
        let outcomes = [a.unwrap(), b.unwrap()];
        let committed = outcomes
            .iter()
            .filter(|o| matches!(o, ConfirmationOutcome::Committed { .. }))
            .count();
        assert_eq!(committed, 1);
        assert!(outcomes.contains(&ConfirmationOutcome::InvalidOrExpired));

        let doc = confirmations.store().load().await.unwrap();
        assert_eq!(doc.items.len(), 1);
        assert!(doc.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_discards_and_blocks_confirm() {
        let confirmations = confirmations();
        let token = confirmations.stage(&draft()).await.unwrap();

        let outcome = confirmations
            .handle(&ConfirmationEvent::Cancel(token.clone()))
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmationOutcome::Cancelled);

        let outcome = confirmations
            .handle(&ConfirmationEvent::Confirm(token))
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmationOutcome::InvalidOrExpired);
        assert!(confirmations.store().load().await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_after_ttl_is_invalid() {
        let confirmations = confirmations();
        let token = confirmations.stage(&draft()).await.unwrap();

        let late = Utc::now() + Duration::minutes(11);
        let outcome = confirmations
            .handle_at(&ConfirmationEvent::Confirm(token), late)
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmationOutcome::InvalidOrExpired);

        let doc = confirmations.store().load().await.unwrap();
        assert!(doc.items.is_empty());
        assert!(doc.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let confirmations = confirmations();
        let outcome = confirmations
            .handle(&ConfirmationEvent::Confirm("000000000000".into()))
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmationOutcome::InvalidOrExpired);
    }
}
