//! # Atomic JSON Document Store
//!
//! One JSON document per file, loaded lazily into memory and written back with
//! a temp-file-then-rename swap. Every mutation holds the store's async mutex
//! from apply through rename, so writers are applied and flushed one at a time
//! in submission order (tokio's `Mutex` is FIFO-fair).
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// A JSON document mirrored to disk
///
/// The cached copy is only replaced after the new version has been renamed
/// over the primary file, so a failed write never leaves memory ahead of disk.
pub struct JsonStore<T> {
    path: PathBuf,
    tmp_path: PathBuf,
    cache: Mutex<Option<T>>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tmp_path = tmp_path_for(&path);
        Self {
            path,
            tmp_path,
            cache: Mutex::new(None),
        }
    }

    /// Load the document, reading from disk only on first use
    pub async fn load(&self) -> Result<T> {
        let mut slot = self.cache.lock().await;
        let doc = self.loaded(&mut slot).await?;
        Ok(doc.clone())
    }

    /// Run a read-only view against the cached document
    pub async fn read<R, F>(&self, view: F) -> Result<R>
    where
        F: FnOnce(&T) -> R + Send,
    {
        let mut slot = self.cache.lock().await;
        let doc = self.loaded(&mut slot).await?;
        Ok(view(doc))
    }

    /// Apply a change and persist it before returning
    pub async fn mutate<R, F>(&self, apply: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R + Send,
        R: Send,
    {
        self.update(|doc| (apply(doc), true)).await
    }

    /// Apply a change that reports whether it touched the document
    ///
    /// Unchanged documents are not rewritten.
    pub async fn update<R, F>(&self, apply: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> (R, bool) + Send,
        R: Send,
    {
        let mut slot = self.cache.lock().await;
        let current = self.loaded(&mut slot).await?;

        let mut working = current.clone();
        let (result, changed) = apply(&mut working);
        if changed {
            self.write_atomically(&working).await?;
            *current = working;
        }
        Ok(result)
    }

    async fn loaded<'a>(&self, slot: &'a mut Option<T>) -> Result<&'a mut T> {
        let doc = match slot.take() {
            Some(doc) => doc,
            None => self.read_from_disk().await?,
        };
        Ok(slot.insert(doc))
    }

    async fn read_from_disk(&self) -> Result<T> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => {
                debug!("Document {} is empty, using defaults", self.path.display());
                Ok(T::default())
            }
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Malformed JSON document at {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let doc = T::default();
                self.write_atomically(&doc).await?;
                info!("Created new document at {}", self.path.display());
                Ok(doc)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    async fn write_atomically(&self, doc: &T) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let payload = serde_json::to_string_pretty(doc)
            .with_context(|| format!("Failed to encode document for {}", self.path.display()))?;

        let mut file = tokio::fs::File::create(&self.tmp_path)
            .await
            .with_context(|| format!("Failed to create {}", self.tmp_path.display()))?;
        file.write_all(payload.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", self.tmp_path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", self.tmp_path.display()))?;
        drop(file);

        tokio::fs::rename(&self.tmp_path, &self.path)
            .await
            .with_context(|| {
                format!(
                    "Failed to replace {} with {}",
                    self.path.display(),
                    self.tmp_path.display()
                )
            })?;

        debug!("Persisted {} ({} bytes)", self.path.display(), payload.len());
        Ok(())
    }
}

/// `data/reminders.json` -> `data/reminders.tmp.json`
fn tmp_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!("{stem}.tmp.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::scratch_dir;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u64,
        #[serde(default)]
        labels: Vec<String>,
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        assert_eq!(
            tmp_path_for(Path::new("data/reminders.json")),
            PathBuf::from("data/reminders.tmp.json")
        );
        assert_eq!(
            tmp_path_for(Path::new("contacts.json")),
            PathBuf::from("contacts.tmp.json")
        );
    }

    #[tokio::test]
    async fn test_first_load_creates_default_file() {
        let dir = scratch_dir();
        let path = dir.join("nested").join("counter.json");
        let store: JsonStore<Counter> = JsonStore::new(&path);

        let doc = store.load().await.unwrap();
        assert_eq!(doc, Counter::default());
        assert!(path.exists());

        let on_disk: Counter =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, Counter::default());
    }

    #[tokio::test]
    async fn test_empty_file_loads_default() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("counter.json");
        std::fs::write(&path, "  \n").unwrap();

        let store: JsonStore<Counter> = JsonStore::new(&path);
        assert_eq!(store.load().await.unwrap(), Counter::default());
    }

    #[tokio::test]
    async fn test_malformed_document_is_fatal() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("counter.json");
        std::fs::write(&path, "{\"value\": 3,").unwrap();

        let store: JsonStore<Counter> = JsonStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("Malformed JSON document"));

        // The broken file is left untouched for the operator
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"value\": 3,");
        assert!(store.mutate(|doc| doc.value += 1).await.is_err());
    }

    #[tokio::test]
    async fn test_mutate_persists_and_updates_cache() {
        let dir = scratch_dir();
        let path = dir.join("counter.json");
        let store: JsonStore<Counter> = JsonStore::new(&path);

        let value = store
            .mutate(|doc| {
                doc.value = 7;
                doc.labels.push("seven".to_string());
                doc.value
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(store.read(|doc| doc.value).await.unwrap(), 7);

        let reopened: JsonStore<Counter> = JsonStore::new(&path);
        let doc = reopened.load().await.unwrap();
        assert_eq!(doc.value, 7);
        assert_eq!(doc.labels, vec!["seven".to_string()]);
        assert!(!dir.join("counter.tmp.json").exists());
    }

    #[tokio::test]
    async fn test_crash_before_rename_keeps_previous_version() {
        let dir = scratch_dir();
        let path = dir.join("counter.json");
        let store: JsonStore<Counter> = JsonStore::new(&path);
        store.mutate(|doc| doc.value = 1).await.unwrap();

        // A process dying mid-write leaves a truncated temp file behind
        std::fs::write(dir.join("counter.tmp.json"), "{\"value\": 99, \"lab").unwrap();

        let reopened: JsonStore<Counter> = JsonStore::new(&path);
        assert_eq!(reopened.load().await.unwrap().value, 1);

        // The next successful write replaces the stale temp file
        reopened.mutate(|doc| doc.value = 2).await.unwrap();
        let again: JsonStore<Counter> = JsonStore::new(&path);
        assert_eq!(again.load().await.unwrap().value, 2);
    }

    #[tokio::test]
    async fn test_rename_failure_does_not_advance_cache() {
        let dir = scratch_dir();
        let path = dir.join("counter.json");
        let store: JsonStore<Counter> = JsonStore::new(&path);
        store.mutate(|doc| doc.value = 5).await.unwrap();

        // Replace the primary file with a non-empty directory so rename fails
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let result = store.mutate(|doc| doc.value = 6).await;
        assert!(result.is_err());
        assert_eq!(store.read(|doc| doc.value).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_unchanged_update_skips_write() {
        let dir = scratch_dir();
        let path = dir.join("counter.json");
        let store: JsonStore<Counter> = JsonStore::new(&path);
        store.load().await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let seen = store.update(|doc| (doc.value, false)).await.unwrap();
        assert_eq!(seen, 0);
        assert!(!path.exists());

        store
            .update(|doc| {
                doc.value = 3;
                ((), true)
            })
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_serialized() {
        let dir = scratch_dir();
        let path = dir.join("counter.json");
        let store: Arc<JsonStore<Counter>> = Arc::new(JsonStore::new(&path));

        let mut tasks = Vec::new();
        for i in 0..40 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .mutate(|doc| {
                        doc.value += 1;
                        doc.labels.push(format!("task-{i}"));
                    })
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.read(|doc| doc.value).await.unwrap(), 40);
        let reopened: JsonStore<Counter> = JsonStore::new(&path);
        let doc = reopened.load().await.unwrap();
        assert_eq!(doc.value, 40);
        assert_eq!(doc.labels.len(), 40);
    }
}
