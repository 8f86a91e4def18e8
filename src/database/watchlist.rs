//! # Watchlist Store
//!
//! Per-user movie/series watchlists in `watchlist_movies.json`:
//! `{ [userId]: { seq, items: [...] } }`.
//!
//! Ids double as display ordinals. Completing an item removes it and
//! renumbers what is left to `1..n`, resetting the user's `seq` to `n`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::document_store::JsonStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistStatus {
    Open,
    Done,
}

impl std::fmt::Display for WatchlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchlistStatus::Open => write!(f, "open"),
            WatchlistStatus::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for WatchlistStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "open" => Ok(WatchlistStatus::Open),
            "done" => Ok(WatchlistStatus::Done),
            _ => Err(anyhow!("Invalid watchlist status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    /// Netflix, Prime, cinema, movie/series...
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub note: String,
    pub status: WatchlistStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserWatchlist {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub items: Vec<WatchlistItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchlistDocument {
    pub users: BTreeMap<String, UserWatchlist>,
}

/// Fields supplied when adding an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewWatchlistItem {
    pub title: String,
    pub year: Option<String>,
    pub platform: Option<String>,
    pub link: Option<String>,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct WatchlistStore {
    inner: Arc<JsonStore<WatchlistDocument>>,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(JsonStore::new(path)),
        }
    }

    pub async fn load(&self) -> Result<WatchlistDocument> {
        self.inner.load().await
    }

    /// Add an open item for `user_id` and return its id
    pub async fn add_item(&self, user_id: &str, new: NewWatchlistItem) -> Result<u64> {
        self.add_item_at(user_id, new, Utc::now()).await
    }

    pub async fn add_item_at(
        &self,
        user_id: &str,
        new: NewWatchlistItem,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(anyhow!("Watchlist title must not be empty"));
        }

        let id = self
            .inner
            .mutate(move |doc| {
                let list = doc.users.entry(user_id.to_string()).or_default();
                list.seq += 1;
                let id = list.seq;
                list.items.push(WatchlistItem {
                    id,
                    title,
                    year: non_blank(new.year),
                    platform: non_blank(new.platform),
                    link: non_blank(new.link),
                    note: new.note.unwrap_or_default(),
                    status: WatchlistStatus::Open,
                    created_at: now,
                    updated_at: now,
                    completed_at: None,
                });
                id
            })
            .await?;

        info!("Added watchlist item {id} for user {user_id}");
        Ok(id)
    }

    /// Items for a user in ascending id order, optionally filtered by status
    pub async fn list_items(
        &self,
        user_id: &str,
        status: Option<WatchlistStatus>,
    ) -> Result<Vec<WatchlistItem>> {
        self.inner
            .read(|doc| {
                let Some(list) = doc.users.get(user_id) else {
                    return Vec::new();
                };
                let mut items: Vec<WatchlistItem> = list
                    .items
                    .iter()
                    .filter(|item| status.map_or(true, |s| item.status == s))
                    .cloned()
                    .collect();
                items.sort_by_key(|item| item.id);
                items
            })
            .await
    }

    /// Complete an item: remove it and renumber the rest densely
    ///
    /// Returns false when the user or id is unknown.
    pub async fn complete_item(&self, user_id: &str, id: u64) -> Result<bool> {
        self.complete_item_at(user_id, id, Utc::now()).await
    }

    pub async fn complete_item_at(
        &self,
        user_id: &str,
        id: u64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let completed = self
            .inner
            .update(|doc| {
                let Some(list) = doc.users.get_mut(user_id) else {
                    return (None, false);
                };
                let Some(index) = list.items.iter().position(|item| item.id == id) else {
                    return (None, false);
                };

                let mut item = list.items.remove(index);
                item.status = WatchlistStatus::Done;
                item.updated_at = now;
                item.completed_at = Some(now);

                list.items.sort_by_key(|item| item.id);
                for (position, remaining) in list.items.iter_mut().enumerate() {
                    remaining.id = position as u64 + 1;
                    remaining.updated_at = now;
                }
                list.seq = list.items.len() as u64;

                (Some(item), true)
            })
            .await?;

        match completed {
            Some(item) => {
                info!(
                    "Completed watchlist item {} ({}) for user {}",
                    id, item.title, user_id
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
