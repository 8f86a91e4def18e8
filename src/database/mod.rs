//! # Database
//!
//! JSON document stores for reminders, watchlists and contacts. Each store is
//! a cheap `Clone` handle built once in `main` and shared with every consumer.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod contacts;
pub mod document_store;
pub mod reminders;
pub mod watchlist;

pub use contacts::{Contact, ContactStore, ContactUpdate};
pub use document_store::JsonStore;
pub use reminders::{
    NewReminder, Reminder, ReminderDocument, ReminderStatus, ReminderStore, StagingRecord,
    TargetType, Transition,
};
pub use watchlist::{NewWatchlistItem, WatchlistItem, WatchlistStatus, WatchlistStore};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    /// Fresh directory path under the system temp dir (not created)
    pub fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pengingat-test-{}", uuid::Uuid::new_v4()))
    }
}
