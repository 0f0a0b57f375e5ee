#![forbid(unsafe_code)]

use crate::domain::ProcessInfo;
use crate::error::Error;
use crate::host::{ProcessHost, StopError};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::trace;

/// Real host backed by `/proc` for enumeration and POSIX signals for
/// termination.
#[derive(Debug, Default)]
pub struct ProcfsHost;

impl ProcfsHost {
    fn send(pid: i32, signal: Signal) -> Result<(), StopError> {
        signal::kill(Pid::from_raw(pid), signal).map_err(|errno| match errno {
            Errno::ESRCH => StopError::Vanished,
            Errno::EPERM => StopError::PermissionDenied,
            other => StopError::Signal(other.to_string()),
        })
    }
}

impl ProcessHost for ProcfsHost {
    fn enumerate(&self) -> Result<Vec<ProcessInfo>, Error> {
        let page_size = procfs::page_size();
        let mut processes = Vec::new();

        for process in procfs::process::all_processes()? {
            // Processes exiting mid-scan are expected churn, not an error.
            let Ok(process) = process else {
                continue;
            };
            let Ok(stat) = process.stat() else {
                continue;
            };
            let memory_bytes = process
                .statm()
                .map(|statm| statm.resident * page_size)
                .unwrap_or(0);

            processes.push(ProcessInfo {
                pid: stat.pid,
                name: stat.comm,
                status: stat.state.to_string(),
                memory_bytes,
            });
        }

        trace!(count = processes.len(), "process snapshot collected");
        Ok(processes)
    }

    fn exists(&self, pid: i32) -> bool {
        // Signal 0 probes for existence. EPERM still means the pid is live,
        // just owned by someone else.
        match signal::kill(Pid::from_raw(pid), None) {
            Ok(()) => true,
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    fn request_stop(&self, pid: i32) -> Result<(), StopError> {
        Self::send(pid, Signal::SIGTERM)
    }

    fn force_stop(&self, pid: i32) -> Result<(), StopError> {
        Self::send(pid, Signal::SIGKILL)
    }
}
