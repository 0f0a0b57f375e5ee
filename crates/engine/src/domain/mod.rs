#![forbid(unsafe_code)]

mod outcome;
mod process;
mod task;

pub use outcome::Outcome;
pub use process::ProcessInfo;
pub use task::{ScheduleMode, ScheduledTask, TaskId};
