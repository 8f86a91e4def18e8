//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::database::{ContactStore, ReminderStore, WatchlistStore};
use crate::features::reminders::{ReminderConfirmations, TimeConvention};

/// Shared state handed to every command handler
///
/// Store handles are cheap clones of the instances built in `main`.
#[derive(Clone)]
pub struct CommandContext {
    pub reminders: ReminderStore,
    pub confirmations: ReminderConfirmations,
    pub watchlist: WatchlistStore,
    pub contacts: ContactStore,
    pub time: TimeConvention,
    /// Base URL for the `[Watch]` search link on watchlist items
    pub watch_search: Option<String>,
}

impl CommandContext {
    pub fn new(
        reminders: ReminderStore,
        watchlist: WatchlistStore,
        contacts: ContactStore,
        time: TimeConvention,
    ) -> Self {
        Self {
            confirmations: ReminderConfirmations::new(reminders.clone()),
            reminders,
            watchlist,
            contacts,
            time,
            watch_search: None,
        }
    }

    pub fn with_watch_search(mut self, url: Option<String>) -> Self {
        self.watch_search = url;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::database::test_support::scratch_dir;

    /// Context over fresh stores in a scratch directory, UTC+7 convention
    pub fn test_context() -> CommandContext {
        let dir = scratch_dir();
        CommandContext::new(
            ReminderStore::new(dir.join("reminders.json")),
            WatchlistStore::new(dir.join("watchlist_movies.json")),
            ContactStore::new(dir.join("contacts.json")),
            TimeConvention::new(420, "WIB").expect("valid offset"),
        )
    }
}
