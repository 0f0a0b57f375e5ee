#![forbid(unsafe_code)]

use chrono::{DateTime, Local};
use std::fmt;
use std::time::SystemTime;

/// Opaque handle for a scheduled task, assigned by the registry. Ids are
/// never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the deadline of a task was specified by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Countdown relative to the moment of scheduling.
    Timer,
    /// Absolute wall-clock time.
    Clock,
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleMode::Timer => write!(f, "Timer"),
            ScheduleMode::Clock => write!(f, "Clock"),
        }
    }
}

/// A pending kill, owned exclusively by the registry from creation until
/// cancellation or execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub pid: i32,
    pub name: String,
    pub deadline: SystemTime,
    pub mode: ScheduleMode,
}

impl fmt::Display for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = DateTime::<Local>::from(self.deadline).format("%H:%M:%S");
        write!(
            f,
            "[{}] kill '{}' ({}) at {at}",
            self.mode, self.name, self.pid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn display_names_mode_and_target() {
        let task = ScheduledTask {
            id: TaskId::new(7),
            pid: 4242,
            name: "notepad.exe".into(),
            deadline: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            mode: ScheduleMode::Timer,
        };
        let rendered = task.to_string();
        assert!(rendered.starts_with("[Timer] kill 'notepad.exe' (4242) at "));
    }
}
