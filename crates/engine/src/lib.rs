#![forbid(unsafe_code)]

pub mod clock;
pub mod domain;
pub mod engine;
pub mod error;
pub mod host;
pub mod log;
pub mod registry;
pub mod terminator;
pub mod testing;
pub mod whitelist;

pub use clock::{Clock, SystemClock};
pub use domain::{Outcome, ProcessInfo, ScheduleMode, ScheduledTask, TaskId};
pub use engine::{ControlEvent, FiredTask, KillEngine, Services, TickReport};
pub use error::Error;
pub use host::{ProcessHost, ProcfsHost, StopError};
pub use log::{EventLog, LogEntry, LogLevel};
pub use registry::TaskRegistry;
pub use terminator::Terminator;
pub use whitelist::{AddOutcome, RemoveOutcome, Whitelist};
