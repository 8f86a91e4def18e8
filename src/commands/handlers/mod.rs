//! Per-command handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod contact;
pub mod remind;
pub mod utility;
pub mod watchlist;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// One handler per command group, in registration order
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(utility::UtilityHandler),
        Arc::new(remind::RemindHandler),
        Arc::new(watchlist::WatchlistHandler),
        Arc::new(contact::ContactHandler),
    ]
}
