//! # Features
//!
//! Domain features layered on top of the document stores.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod reminders;

pub use reminders::{
    ConfirmationEvent, ConfirmationOutcome, DeliveryChannel, DiscordDelivery, ReminderConfirmations,
    ReminderDraft, ReminderScheduler, SchedulerHandle, TimeConvention,
};
