//! Periodic due-task sweep with a permission state machine.
//!
//! # Responsibility
//! - Track whether reminders may be shown (`Armed`) or not (`Unarmed`).
//! - Every sweep, emit a reminder for each open task falling due within the
//!   lead window `(now, now + lead_window]`.
//!
//! # Invariants
//! - Sweeps never write to the store.
//! - An `Unarmed` scheduler emits nothing and raises no error.
//! - Tasks whose window passed between two sweeps are not reminded later.

use crate::model::task::Task;
use crate::notify::host::{NotificationHost, Permission, Reminder};
use crate::repo::task_store::TaskStore;
use chrono::{Local, NaiveDateTime, TimeDelta};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_LEAD_WINDOW: Duration = Duration::from_secs(60);

/// Source of "now" for sweeps, in local wall-clock time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Reminder permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    Unarmed,
    Armed,
}

/// Timing knobs for the sweep loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub sweep_interval: Duration,
    /// How far ahead of a due instant a reminder fires.
    pub lead_window: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            lead_window: DEFAULT_LEAD_WINDOW,
        }
    }
}

/// Due-task reminder scheduler.
///
/// Cheap to clone; clones share the armed state.
#[derive(Clone)]
pub struct ReminderScheduler {
    store: Arc<dyn TaskStore>,
    host: Option<Arc<dyn NotificationHost>>,
    armed: Arc<AtomicBool>,
    settings: ReminderSettings,
    clock: Clock,
}

impl ReminderScheduler {
    /// Creates an `Unarmed` scheduler.
    ///
    /// `host = None` means the platform has no notification support.
    pub fn new(store: Arc<dyn TaskStore>, host: Option<Arc<dyn NotificationHost>>) -> Self {
        Self {
            store,
            host,
            armed: Arc::new(AtomicBool::new(false)),
            settings: ReminderSettings::default(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_settings(mut self, settings: ReminderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Overrides the wall clock used by [`sweep`](Self::sweep).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> ReminderSettings {
        self.settings
    }

    pub fn state(&self) -> ArmState {
        if self.armed.load(Ordering::SeqCst) {
            ArmState::Armed
        } else {
            ArmState::Unarmed
        }
    }

    /// Asks the host for permission and arms on grant.
    ///
    /// Idempotent: an armed scheduler returns `Granted` without asking again.
    pub async fn request_permission(&self) -> Permission {
        if self.state() == ArmState::Armed {
            return Permission::Granted;
        }
        let Some(host) = self.host.as_ref() else {
            info!("event=notify_permission module=notify status=skipped permission=unsupported");
            return Permission::Unsupported;
        };

        let permission = host.request_permission().await;
        self.set_armed(permission.is_granted());
        info!(
            "event=notify_permission module=notify status=ok permission={}",
            permission.as_str()
        );
        permission
    }

    /// Re-reads the host permission so external grants or revocations apply.
    pub fn refresh_permission(&self) -> ArmState {
        let permission = self
            .host
            .as_ref()
            .map_or(Permission::Unsupported, |host| host.permission());
        self.set_armed(permission.is_granted());
        self.state()
    }

    /// Emits reminders for open tasks due within `(now, now + lead_window]`.
    ///
    /// Returns the reminders handed to the host.
    pub fn check_due_tasks(&self, now: NaiveDateTime) -> Vec<Reminder> {
        if self.state() == ArmState::Unarmed {
            return Vec::new();
        }

        let window = TimeDelta::from_std(self.settings.lead_window).unwrap_or(TimeDelta::MAX);
        let reminders: Vec<Reminder> = self
            .store
            .load_all()
            .iter()
            .filter(|task| is_due_soon(task, now, window))
            .filter_map(|task| self.send_task_notification(task))
            .collect();

        debug!(
            "event=notify_sweep module=notify status=ok reminders={}",
            reminders.len()
        );
        reminders
    }

    /// Shows one reminder for `task` if the scheduler is armed.
    pub fn send_task_notification(&self, task: &Task) -> Option<Reminder> {
        if self.state() == ArmState::Unarmed {
            return None;
        }
        let host = self.host.as_ref()?;
        let reminder = Reminder::for_task(task);
        host.show(&reminder);
        info!(
            "event=reminder_show module=notify status=ok task_id={} tag={}",
            task.id, reminder.tag
        );
        Some(reminder)
    }

    /// One sweep at the scheduler clock's current time.
    pub fn sweep(&self) -> Vec<Reminder> {
        self.refresh_permission();
        self.check_due_tasks((self.clock)())
    }

    /// Spawns the periodic sweep on the current tokio runtime.
    ///
    /// The first sweep runs one interval after start.
    pub fn start(&self) -> SweepHandle {
        let cancel = CancellationToken::new();
        let scheduler = self.clone();
        let token = cancel.clone();
        let join = tokio::spawn(async move { scheduler.run(token).await });
        info!(
            "event=sweep_start module=notify status=ok interval_ms={}",
            self.settings.sweep_interval.as_millis()
        );
        SweepHandle {
            cancel,
            join: Some(join),
        }
    }

    async fn run(self, cancel: CancellationToken) {
        let period = self.settings.sweep_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep();
                }
            }
        }
        info!("event=sweep_stop module=notify status=ok");
    }

    fn set_armed(&self, armed: bool) {
        let previous = self.armed.swap(armed, Ordering::SeqCst);
        if previous != armed {
            info!("event=notify_state module=notify status=ok armed={armed}");
        }
    }
}

fn is_due_soon(task: &Task, now: NaiveDateTime, window: TimeDelta) -> bool {
    if task.completed {
        return false;
    }
    match task.reminder_instant() {
        Some(due) => {
            let until_due = due - now;
            until_due > TimeDelta::zero() && until_due <= window
        }
        None => false,
    }
}

/// Handle to a running sweep loop.
///
/// Dropping the handle cancels the loop; [`shutdown`](Self::shutdown) also
/// waits for it to exit.
pub struct SweepHandle {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Requests cancellation without waiting.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancels the loop and waits until it has stopped.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            if let Err(err) = join.await {
                warn!("event=sweep_stop module=notify status=error error={err}");
            }
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
