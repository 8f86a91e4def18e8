// Core layer - configuration and shared text/embed helpers
pub mod core;

// Persistence - JSON document stores
pub mod database;

// Features layer - reminder confirmation, time convention and scheduler
pub mod features;

// UI components
pub mod message_components;

// Application layer
pub mod command_handler;
pub mod commands;

pub use core::Config;

pub use database::{ContactStore, JsonStore, ReminderStore, WatchlistStore};

pub use features::{
    ConfirmationEvent, ConfirmationOutcome, DeliveryChannel, DiscordDelivery,
    ReminderConfirmations, ReminderDraft, ReminderScheduler, SchedulerHandle, TimeConvention,
};
