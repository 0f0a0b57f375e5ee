#![forbid(unsafe_code)]

mod procfs_host;

pub use procfs_host::ProcfsHost;

use crate::domain::ProcessInfo;
use crate::error::Error;

/// Why a stop request could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StopError {
    #[error("process vanished")]
    Vanished,
    #[error("permission denied")]
    PermissionDenied,
    #[error("signal failed: {0}")]
    Signal(String),
}

/// Capability seam over the host OS process table. The engine only ever
/// touches processes through this trait, so all scheduling and protection
/// logic is testable against a fake.
pub trait ProcessHost: Send + Sync {
    /// Enumerate all visible processes. Individual processes that exit or
    /// deny access mid-scan are omitted; only a failure of the enumeration
    /// itself is an error.
    fn enumerate(&self) -> Result<Vec<ProcessInfo>, Error>;

    /// Whether a process with this pid currently exists.
    fn exists(&self, pid: i32) -> bool;

    /// Ask the process to exit (SIGTERM).
    fn request_stop(&self, pid: i32) -> Result<(), StopError>;

    /// Stop the process immediately (SIGKILL). Not cancellable.
    fn force_stop(&self, pid: i32) -> Result<(), StopError>;
}
