//! # Reminder Scheduler
//!
//! Background task that delivers due reminders. Each cycle sweeps expired
//! confirmation tokens, selects pending reminders whose time has come, and
//! makes exactly one delivery attempt per reminder. The next cycle is armed
//! only after the previous one finishes.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::delivery::DeliveryChannel;
use crate::database::ReminderStore;

/// Counts from one scheduler cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub swept: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct ReminderScheduler {
    store: ReminderStore,
    delivery: Arc<dyn DeliveryChannel>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(
        store: ReminderStore,
        delivery: Arc<dyn DeliveryChannel>,
        interval: Duration,
    ) -> Self {
        ReminderScheduler {
            store,
            delivery,
            interval,
        }
    }

    /// Run one sweep/select/deliver pass as of `now`
    ///
    /// Store errors are logged and end the pass early; they never panic.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        match self.store.sweep_expired_at(now).await {
            Ok(swept) => report.swept = swept,
            Err(e) => warn!("Failed to sweep expired reminder tokens: {e:#}"),
        }

        let due = match self.store.list_due(now).await {
            Ok(due) => due,
            Err(e) => {
                error!("Failed to load due reminders: {e:#}");
                return report;
            }
        };

        if due.is_empty() {
            return report;
        }
        debug!("Found {} due reminder(s)", due.len());

        for reminder in due {
            let result = self
                .delivery
                .send(reminder.target_type, &reminder.target_id, &reminder.message)
                .await;

            match result {
                Ok(()) => {
                    info!(
                        "Delivered reminder #{} to {} {}",
                        reminder.id, reminder.target_type, reminder.target_id
                    );
                    match self.store.mark_sent(reminder.id).await {
                        Ok(_) => report.delivered += 1,
                        Err(e) => error!("Failed to mark reminder #{} as sent: {e:#}", reminder.id),
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!("Reminder #{} delivery failed: {reason}", reminder.id);
                    match self.store.mark_failed(reminder.id, &reason).await {
                        Ok(_) => report.failed += 1,
                        Err(e) => {
                            error!("Failed to mark reminder #{} as failed: {e:#}", reminder.id)
                        }
                    }
                }
            }
        }

        report
    }

    /// Loop until `shutdown` flips to true or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Reminder scheduler started (interval: {}s)",
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let report = self.run_cycle(Utc::now()).await;
            if report != CycleReport::default() {
                debug!("Scheduler cycle: {report:?}");
            }
        }

        info!("Reminder scheduler stopped");
    }

    /// Start the loop on the runtime and return a handle that stops it
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle { shutdown_tx, task }
    }
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop and wait for the current cycle to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Reminder scheduler task ended abnormally: {e}");
        }
    }
}
