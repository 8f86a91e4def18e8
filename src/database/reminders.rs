//! # Reminder Store
//!
//! Token staging ledger and reminder ledger sharing one JSON document:
//! `{ seq, items: [...], tokens: { [token]: StagingRecord } }`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::document_store::JsonStore;

/// Default lifetime of a staged token
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10;

/// Random bytes per token (rendered as twice as many hex chars)
const TOKEN_BYTES: usize = 6;

/// Where a reminder is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Channel,
    User,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetType::Channel => write!(f, "channel"),
            TargetType::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for TargetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "channel" => Ok(TargetType::Channel),
            "user" => Ok(TargetType::User),
            _ => Err(anyhow!("Invalid target type: {}", s)),
        }
    }
}

/// Lifecycle of a committed reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    /// Committed and waiting for its due time
    Pending,
    /// Delivered
    Sent,
    /// The single delivery attempt failed
    Failed,
    Cancelled,
}

impl ReminderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReminderStatus::Pending)
    }
}

impl std::fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderStatus::Pending => write!(f, "pending"),
            ReminderStatus::Sent => write!(f, "sent"),
            ReminderStatus::Failed => write!(f, "failed"),
            ReminderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ReminderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReminderStatus::Pending),
            "sent" => Ok(ReminderStatus::Sent),
            "failed" => Ok(ReminderStatus::Failed),
            "cancelled" => Ok(ReminderStatus::Cancelled),
            _ => Err(anyhow!("Invalid reminder status: {}", s)),
        }
    }
}

/// A committed reminder record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,

    #[serde(rename = "createdBy")]
    pub created_by: String,

    /// Guild the reminder was created in (None for DMs)
    #[serde(rename = "guildId", default)]
    pub guild_id: Option<String>,

    #[serde(rename = "targetType")]
    pub target_type: TargetType,

    #[serde(rename = "targetId")]
    pub target_id: String,

    pub message: String,

    #[serde(rename = "remindAt")]
    pub remind_at: DateTime<Utc>,

    pub status: ReminderStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,

    /// Delivery error text for failed reminders
    #[serde(default)]
    pub error: Option<String>,
}

/// Fields supplied by the caller when committing a reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub created_by: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    pub target_type: TargetType,
    pub target_id: String,
    pub message: String,
    pub remind_at: DateTime<Utc>,
}

/// A short-lived, single-use staged payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingRecord {
    #[serde(default)]
    pub token: String,

    pub payload: serde_json::Value,

    #[serde(rename = "expiresAt", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl StagingRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Persisted shape of `reminders.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderDocument {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub items: Vec<Reminder>,
    #[serde(default)]
    pub tokens: BTreeMap<String, StagingRecord>,
}

/// Result of a status transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    NotFound,
    /// The reminder already reached a terminal status; nothing changed
    AlreadyTerminal(ReminderStatus),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Shared handle to the reminder document
///
/// Cloning is cheap; all clones share one cache and one write queue.
#[derive(Clone)]
pub struct ReminderStore {
    inner: Arc<JsonStore<ReminderDocument>>,
    token_ttl: Duration,
}

impl ReminderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(JsonStore::new(path)),
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Override the default staging TTL
    pub fn with_token_ttl(mut self, ttl: std::time::Duration) -> Result<Self> {
        self.token_ttl =
            Duration::from_std(ttl).context("Token TTL is too large to represent")?;
        Ok(self)
    }

    /// Read the whole document (loads it on first use)
    pub async fn load(&self) -> Result<ReminderDocument> {
        self.inner.load().await
    }

    // ========================================================================
    // Token staging ledger
    // ========================================================================

    /// Stage a payload with the default TTL and return its token
    pub async fn stage<P: Serialize>(&self, payload: &P) -> Result<String> {
        self.stage_at(payload, self.token_ttl, Utc::now()).await
    }

    pub async fn stage_at<P: Serialize>(
        &self,
        payload: &P,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let payload = serde_json::to_value(payload).context("Failed to encode staged payload")?;
        let expires_at = now + ttl;

        let token = self
            .inner
            .mutate(move |doc| {
                let mut token = generate_token();
                while doc.tokens.contains_key(&token) {
                    token = generate_token();
                }
                doc.tokens.insert(
                    token.clone(),
                    StagingRecord {
                        token: token.clone(),
                        payload,
                        expires_at,
                        created_at: now,
                    },
                );
                token
            })
            .await?;

        debug!("Staged token {token} (expires {expires_at})");
        Ok(token)
    }

    /// Consume a token exactly once
    ///
    /// The record is removed whether or not it is still valid. Returns the
    /// payload only when the token existed and had not expired.
    pub async fn consume<P: DeserializeOwned>(&self, token: &str) -> Result<Option<P>> {
        self.consume_at(token, Utc::now()).await
    }

    pub async fn consume_at<P: DeserializeOwned>(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<P>> {
        let removed = self
            .inner
            .update(|doc| {
                let removed = doc.tokens.remove(token);
                let changed = removed.is_some();
                (removed, changed)
            })
            .await?;

        let Some(record) = removed else {
            debug!("Token {token} not found");
            return Ok(None);
        };
        if record.is_expired_at(now) {
            debug!("Token {token} expired at {}", record.expires_at);
            return Ok(None);
        }

        let payload = serde_json::from_value(record.payload)
            .with_context(|| format!("Staged payload for token {token} has an unexpected shape"))?;
        Ok(Some(payload))
    }

    /// Remove every expired staging record, returning how many were dropped
    pub async fn sweep_expired(&self) -> Result<usize> {
        self.sweep_expired_at(Utc::now()).await
    }

    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self
            .inner
            .update(|doc| {
                let before = doc.tokens.len();
                doc.tokens.retain(|_, record| !record.is_expired_at(now));
                let removed = before - doc.tokens.len();
                (removed, removed > 0)
            })
            .await?;

        if removed > 0 {
            info!("Swept {removed} expired reminder token(s)");
        }
        Ok(removed)
    }

    pub async fn token_count(&self) -> Result<usize> {
        self.inner.read(|doc| doc.tokens.len()).await
    }

    // ========================================================================
    // Reminder ledger
    // ========================================================================

    /// Commit a reminder as `pending` and return its id
    pub async fn commit(&self, new: NewReminder) -> Result<u64> {
        self.commit_at(new, Utc::now()).await
    }

    pub async fn commit_at(&self, new: NewReminder, now: DateTime<Utc>) -> Result<u64> {
        let id = self
            .inner
            .mutate(move |doc| {
                doc.seq += 1;
                let id = doc.seq;
                doc.items.push(Reminder {
                    id,
                    created_by: new.created_by,
                    guild_id: new.guild_id,
                    target_type: new.target_type,
                    target_id: new.target_id,
                    message: new.message,
                    remind_at: new.remind_at,
                    status: ReminderStatus::Pending,
                    created_at: now,
                    updated_at: now,
                    sent_at: None,
                    error: None,
                });
                id
            })
            .await?;

        info!("Committed reminder #{id}");
        Ok(id)
    }

    /// Pending reminders due at or before `as_of`, earliest first
    pub async fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Reminder>> {
        self.inner
            .read(|doc| {
                let mut due: Vec<Reminder> = doc
                    .items
                    .iter()
                    .filter(|r| r.status == ReminderStatus::Pending && r.remind_at <= as_of)
                    .cloned()
                    .collect();
                due.sort_by_key(|r| r.remind_at);
                due
            })
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Option<Reminder>> {
        self.inner
            .read(|doc| doc.items.iter().find(|r| r.id == id).cloned())
            .await
    }

    /// Reminders created by `owner`, optionally filtered by status, in id order
    pub async fn list_for_owner(
        &self,
        owner: &str,
        status: Option<ReminderStatus>,
    ) -> Result<Vec<Reminder>> {
        self.inner
            .read(|doc| {
                doc.items
                    .iter()
                    .filter(|r| r.created_by == owner)
                    .filter(|r| status.map_or(true, |s| r.status == s))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn mark_sent(&self, id: u64) -> Result<Transition> {
        self.mark_sent_at(id, Utc::now()).await
    }

    pub async fn mark_sent_at(&self, id: u64, now: DateTime<Utc>) -> Result<Transition> {
        let transition = self
            .transition(id, |reminder| {
                reminder.status = ReminderStatus::Sent;
                reminder.sent_at = Some(now);
                reminder.updated_at = now;
            })
            .await?;
        debug!("mark_sent #{id}: {transition:?}");
        Ok(transition)
    }

    pub async fn mark_failed(&self, id: u64, error: &str) -> Result<Transition> {
        self.mark_failed_at(id, error, Utc::now()).await
    }

    pub async fn mark_failed_at(
        &self,
        id: u64,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        let error = if error.trim().is_empty() {
            "unknown".to_string()
        } else {
            error.to_string()
        };
        let transition = self
            .transition(id, move |reminder| {
                reminder.status = ReminderStatus::Failed;
                reminder.error = Some(error);
                reminder.updated_at = now;
            })
            .await?;
        if transition.is_applied() {
            warn!("Reminder #{id} marked as failed");
        }
        Ok(transition)
    }

    /// Apply `change` to a pending reminder; terminal or missing ids are no-ops
    async fn transition<F>(&self, id: u64, change: F) -> Result<Transition>
    where
        F: FnOnce(&mut Reminder) + Send,
    {
        self.inner
            .update(|doc| match doc.items.iter_mut().find(|r| r.id == id) {
                None => (Transition::NotFound, false),
                Some(reminder) if reminder.status.is_terminal() => {
                    (Transition::AlreadyTerminal(reminder.status), false)
                }
                Some(reminder) => {
                    change(reminder);
                    (Transition::Applied, true)
                }
            })
            .await
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
