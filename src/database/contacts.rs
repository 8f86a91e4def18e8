//! # Contact Store
//!
//! Upsert-by-user map in `contacts.json`: `{ [userId]: Contact }`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::document_store::JsonStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub global_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub updated_at: DateTime<Utc>,
}

/// Fields to change; `None` keeps the stored value (empty for new contacts)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactUpdate {
    pub username: Option<String>,
    pub global_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactDocument {
    pub contacts: BTreeMap<String, Contact>,
}

#[derive(Clone)]
pub struct ContactStore {
    inner: Arc<JsonStore<ContactDocument>>,
}

impl ContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(JsonStore::new(path)),
        }
    }

    pub async fn load(&self) -> Result<ContactDocument> {
        self.inner.load().await
    }

    pub async fn get_contact(&self, user_id: &str) -> Result<Option<Contact>> {
        self.inner
            .read(|doc| doc.contacts.get(user_id).cloned())
            .await
    }

    pub async fn upsert_contact(&self, user_id: &str, update: ContactUpdate) -> Result<Contact> {
        self.upsert_contact_at(user_id, update, Utc::now()).await
    }

    pub async fn upsert_contact_at(
        &self,
        user_id: &str,
        update: ContactUpdate,
        now: DateTime<Utc>,
    ) -> Result<Contact> {
        let contact = self
            .inner
            .mutate(move |doc| {
                let existing = doc.contacts.get(user_id);
                let pick = |new: Option<String>, old: Option<&String>| {
                    new.or_else(|| old.cloned()).unwrap_or_default()
                };
                let contact = Contact {
                    username: pick(update.username, existing.map(|c| &c.username)),
                    global_name: pick(update.global_name, existing.map(|c| &c.global_name)),
                    phone: pick(update.phone, existing.map(|c| &c.phone)),
                    address: pick(update.address, existing.map(|c| &c.address)),
                    updated_at: now,
                };
                doc.contacts.insert(user_id.to_string(), contact.clone());
                contact
            })
            .await?;

        info!("Upserted contact for user {user_id}");
        Ok(contact)
    }

    /// Returns false when there was nothing to delete
    pub async fn delete_contact(&self, user_id: &str) -> Result<bool> {
        let deleted = self
            .inner
            .update(|doc| {
                let removed = doc.contacts.remove(user_id).is_some();
                (removed, removed)
            })
            .await?;
        if deleted {
            info!("Deleted contact for user {user_id}");
        }
        Ok(deleted)
    }

    pub async fn list_contacts(&self) -> Result<Vec<(String, Contact)>> {
        self.inner
            .read(|doc| {
                doc.contacts
                    .iter()
                    .map(|(id, contact)| (id.clone(), contact.clone()))
                    .collect()
            })
            .await
    }
}
