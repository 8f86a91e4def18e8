//! # Reminders Feature
//!
//! Staged reminder creation with button confirmation, a fixed-offset time
//! convention for input and display, and the background delivery loop.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod confirmation;
pub mod delivery;
pub mod schedule_time;
pub mod scheduler;

pub use confirmation::{
    cancel_custom_id, confirm_custom_id, ConfirmationEvent, ConfirmationOutcome,
    ReminderConfirmations, ReminderDraft,
};
pub use delivery::{DeliveryChannel, DiscordDelivery};
pub use schedule_time::{mention, RelativeDay, ReminderInputError, ReminderTarget, TimeConvention};
pub use scheduler::{CycleReport, ReminderScheduler, SchedulerHandle};
