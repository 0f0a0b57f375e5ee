#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::domain::{Outcome, ProcessInfo, ScheduleMode, ScheduledTask, TaskId};
use crate::error::Error;
use crate::host::ProcessHost;
use crate::log::{EventLog, LogEntry, LogLevel};
use crate::registry::TaskRegistry;
use crate::terminator::Terminator;
use crate::whitelist::{AddOutcome, RemoveOutcome, Whitelist};
use config::Config;
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// OS-facing services the engine runs against. Production wires in
/// [`crate::host::ProcfsHost`] and [`crate::clock::SystemClock`]; tests
/// substitute the fakes from [`crate::testing`].
pub struct Services {
    pub host: Box<dyn ProcessHost>,
    pub clock: Box<dyn Clock>,
}

/// Out-of-band requests routed into the daemon loop, mirroring the signal
/// and tray controls of the interactive frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    SetEnabled(bool),
    ToggleScheduler,
    DumpStatus,
}

#[derive(Debug, Clone)]
pub struct FiredTask {
    pub task: ScheduledTask,
    pub outcome: Outcome,
}

/// What one tick did: every due task that was resolved, in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub fired: Vec<FiredTask>,
}

/// Facade over the whole scheduled-termination core: process snapshots,
/// whitelist, task registry, terminator, and event log, driven by a single
/// logical timeline. User-facing operations and the periodic tick all go
/// through `&mut self`, so they can never interleave.
pub struct KillEngine {
    config: Config,
    services: Services,
    whitelist: Whitelist,
    registry: TaskRegistry,
    terminator: Terminator,
    log: EventLog,
    scheduler_enabled: bool,
}

impl KillEngine {
    pub fn new(config: Config, services: Services) -> Self {
        let whitelist = Whitelist::new(&config.protection.system, &config.protection.user);
        let terminator = Terminator::new(&config.termination);
        let scheduler_enabled = config.scheduler.start_enabled;
        Self {
            config,
            services,
            whitelist,
            registry: TaskRegistry::default(),
            terminator,
            log: EventLog::default(),
            scheduler_enabled,
        }
    }

    /// Snapshot the current process table. A failed enumeration is recovered
    /// locally: it is logged and an empty snapshot is returned.
    pub fn list_processes(&mut self) -> Vec<ProcessInfo> {
        match self.services.host.enumerate() {
            Ok(processes) => processes,
            Err(err) => {
                self.record(
                    LogLevel::Warning,
                    format!("Error listing processes: {err}"),
                );
                Vec::new()
            }
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.whitelist.is_protected(name)
    }

    pub fn add_user_whitelist(&mut self, name: &str) -> AddOutcome {
        let outcome = self.whitelist.add_user(name);
        let message = match outcome {
            AddOutcome::Added => format!("Added '{}' to user whitelist.", name.to_lowercase()),
            AddOutcome::AlreadyUser => format!("'{}' is already whitelisted.", name.to_lowercase()),
            AddOutcome::AlreadySystem => {
                format!("'{}' is in the system whitelist.", name.to_lowercase())
            }
        };
        self.record(LogLevel::Info, message);
        outcome
    }

    pub fn remove_user_whitelist(&mut self, name: &str) -> RemoveOutcome {
        let outcome = self.whitelist.remove_user(name);
        match outcome {
            RemoveOutcome::Removed => self.record(
                LogLevel::Info,
                format!("Removed '{}' from user whitelist.", name.to_lowercase()),
            ),
            RemoveOutcome::Rejected => self.record(
                LogLevel::Warning,
                format!(
                    "Cannot remove system whitelist entry '{}'.",
                    name.to_lowercase()
                ),
            ),
            RemoveOutcome::NotFound => {}
        }
        outcome
    }

    /// Register a future kill. Timer deadlines must lie strictly in the
    /// future and Clock deadlines must not have passed; both are checked
    /// here, before any task exists. Scheduling a protected name is allowed
    /// (protection is enforced again at execution time), but noted.
    pub fn schedule(
        &mut self,
        pid: i32,
        name: &str,
        deadline: SystemTime,
        mode: ScheduleMode,
    ) -> Result<TaskId, Error> {
        let now = self.services.clock.now();
        match mode {
            ScheduleMode::Timer if deadline <= now => return Err(Error::ZeroDuration),
            ScheduleMode::Clock if deadline < now => return Err(Error::DeadlinePassed),
            _ => {}
        }

        let id = self.registry.schedule(pid, name, deadline, mode);
        let task = self
            .registry
            .get(id)
            .expect("freshly scheduled task is present")
            .clone();
        let mut message = format!("Scheduled {task}");
        if self.whitelist.is_protected(name) {
            message.push_str(" (currently whitelisted)");
        }
        self.record(LogLevel::Info, message);
        Ok(id)
    }

    /// Cancel a pending task. Idempotent: unknown ids return `false` and
    /// leave no trace in the log.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let Some(task) = self.registry.get(id).cloned() else {
            return false;
        };
        self.registry.cancel(id);
        self.record(
            LogLevel::Info,
            format!("Cancelled task {id} for '{}'.", task.name),
        );
        true
    }

    pub fn tasks(&self) -> &[ScheduledTask] {
        self.registry.tasks()
    }

    /// Immediate, user-initiated termination. Shares the protected execution
    /// path with scheduled tasks.
    pub async fn kill_now(&mut self, pid: i32, name: &str) -> Outcome {
        let outcome = self
            .terminator
            .execute(
                &self.whitelist,
                self.services.host.as_ref(),
                self.services.clock.as_ref(),
                pid,
                name,
            )
            .await;
        self.log_outcome(pid, name, &outcome);
        outcome
    }

    pub fn set_scheduler_enabled(&mut self, enabled: bool) {
        self.scheduler_enabled = enabled;
        let status = if enabled { "enabled" } else { "disabled" };
        self.record(LogLevel::Info, format!("Scheduler {status}."));
    }

    pub fn scheduler_enabled(&self) -> bool {
        self.scheduler_enabled
    }

    /// Evaluate the task queue once. Disabled schedulers make this a no-op
    /// with every task left pending. Due tasks are executed strictly
    /// sequentially in insertion order and removed whatever their outcome;
    /// no outcome, including `Failed`, can abort the remainder of the tick.
    pub async fn tick(&mut self) -> TickReport {
        if !self.scheduler_enabled {
            return TickReport::default();
        }

        let now = self.services.clock.now();
        let due = self.registry.due_tasks(now);
        let mut fired = Vec::with_capacity(due.len());
        for task in due {
            let outcome = self
                .terminator
                .execute(
                    &self.whitelist,
                    self.services.host.as_ref(),
                    self.services.clock.as_ref(),
                    task.pid,
                    &task.name,
                )
                .await;
            self.registry.cancel(task.id);
            self.log_outcome(task.pid, &task.name, &outcome);
            fired.push(FiredTask { task, outcome });
        }
        TickReport { fired }
    }

    /// The session event log, oldest first.
    pub fn log(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Drive ticks at the configured interval until cancellation. A tick
    /// that overruns the interval delays the next one; ticks are never
    /// skipped ahead of or stacked behind it.
    pub async fn run_until(
        &mut self,
        cancel: CancellationToken,
        mut control_rx: mpsc::UnboundedReceiver<ControlEvent>,
    ) -> Result<(), Error> {
        let interval = self.config.scheduler.tick_interval;
        let mut next_tick = Instant::now() + interval;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                event = control_rx.recv() => {
                    match event {
                        Some(event) => self.handle_control(event),
                        None => {
                            info!("control channel closed");
                            break;
                        }
                    }
                }
                _ = time::sleep_until(next_tick) => {
                    let report = self.tick().await;
                    if !report.fired.is_empty() {
                        info!(fired = report.fired.len(), "tick resolved due tasks");
                    }
                    next_tick = Instant::now() + interval;
                }
            }
        }
        Ok(())
    }

    fn handle_control(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::SetEnabled(enabled) => self.set_scheduler_enabled(enabled),
            ControlEvent::ToggleScheduler => {
                let enabled = !self.scheduler_enabled;
                self.set_scheduler_enabled(enabled);
            }
            ControlEvent::DumpStatus => self.dump_status(),
        }
    }

    fn dump_status(&self) {
        info!(
            scheduler_enabled = self.scheduler_enabled,
            pending_tasks = self.registry.len(),
            system_whitelist = self.whitelist.system_len(),
            user_whitelist = self.whitelist.user_len(),
            log_entries = self.log.len(),
            "status"
        );
        for task in self.registry.tasks() {
            info!(%task, "pending task");
        }
    }

    fn record(&mut self, level: LogLevel, message: String) {
        let now = self.services.clock.now();
        self.log.append(now, level, message);
    }

    fn log_outcome(&mut self, pid: i32, name: &str, outcome: &Outcome) {
        let (level, message) = match outcome {
            Outcome::Blocked => (
                LogLevel::Warning,
                format!("Prevented kill of whitelisted process: {name} ({pid})"),
            ),
            Outcome::AlreadyGone => (
                LogLevel::Info,
                format!("Process {name} ({pid}) not found or already dead."),
            ),
            Outcome::Killed => (
                LogLevel::Critical,
                format!("Process {name} ({pid}) was killed."),
            ),
            Outcome::Failed(reason) => (
                LogLevel::Warning,
                format!("Failed to kill {name} ({pid}): {reason}"),
            ),
        };
        self.record(level, message);
    }
}
