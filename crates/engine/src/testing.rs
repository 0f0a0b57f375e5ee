#![forbid(unsafe_code)]

//! Fake host and clock for exercising the engine without touching the OS.
//! Used by this crate's own tests and by downstream integration tests.

use crate::clock::Clock;
use crate::domain::ProcessInfo;
use crate::error::Error;
use crate::host::{ProcessHost, StopError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How a fake process reacts to a graceful stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBehavior {
    /// Exits promptly on SIGTERM.
    DiesOnRequest,
    /// Survives SIGTERM; only the forceful stop removes it.
    IgnoresRequest,
    /// Stop requests fail with a permission error.
    Denied,
    /// Disappears the moment the graceful request is delivered, as if it
    /// exited on its own in the same instant.
    VanishesOnRequest,
}

#[derive(Debug, Clone)]
struct FakeProcess {
    name: String,
    behavior: StopBehavior,
}

#[derive(Debug, Default)]
struct HostState {
    processes: BTreeMap<i32, FakeProcess>,
    signals: Vec<(i32, &'static str)>,
    fail_enumeration: bool,
}

/// In-memory process table implementing [`ProcessHost`]. Clones share state,
/// so a test can keep a handle while the engine owns the boxed one.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn spawn(&self, pid: i32, behavior: StopBehavior) {
        self.spawn_named(pid, format!("proc-{pid}"), behavior);
    }

    pub fn spawn_named(&self, pid: i32, name: impl Into<String>, behavior: StopBehavior) {
        let mut state = self.state.lock().unwrap();
        state.processes.insert(
            pid,
            FakeProcess {
                name: name.into(),
                behavior,
            },
        );
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.state.lock().unwrap().fail_enumeration = fail;
    }

    /// Signals delivered so far, as `(pid, "term" | "kill")` pairs.
    pub fn signals_sent(&self) -> Vec<(i32, &'static str)> {
        self.state.lock().unwrap().signals.clone()
    }
}

impl ProcessHost for FakeHost {
    fn enumerate(&self) -> Result<Vec<ProcessInfo>, Error> {
        let state = self.state.lock().unwrap();
        if state.fail_enumeration {
            return Err(Error::ProcfsReadFailed(procfs::ProcError::Other(
                "simulated enumeration failure".into(),
            )));
        }
        Ok(state
            .processes
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: *pid,
                name: process.name.clone(),
                status: "S".into(),
                memory_bytes: 4096,
            })
            .collect())
    }

    fn exists(&self, pid: i32) -> bool {
        self.state.lock().unwrap().processes.contains_key(&pid)
    }

    fn request_stop(&self, pid: i32) -> Result<(), StopError> {
        let mut state = self.state.lock().unwrap();
        let Some(process) = state.processes.get(&pid) else {
            return Err(StopError::Vanished);
        };
        match process.behavior {
            StopBehavior::DiesOnRequest => {
                state.processes.remove(&pid);
                state.signals.push((pid, "term"));
                Ok(())
            }
            StopBehavior::IgnoresRequest => {
                state.signals.push((pid, "term"));
                Ok(())
            }
            StopBehavior::Denied => Err(StopError::PermissionDenied),
            StopBehavior::VanishesOnRequest => {
                state.processes.remove(&pid);
                Err(StopError::Vanished)
            }
        }
    }

    fn force_stop(&self, pid: i32) -> Result<(), StopError> {
        let mut state = self.state.lock().unwrap();
        if state.processes.remove(&pid).is_none() {
            return Err(StopError::Vanished);
        }
        state.signals.push((pid, "kill"));
        Ok(())
    }
}

/// Manually driven clock: `sleep` advances time instead of waiting, so
/// bounded waits complete instantly in tests.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: Arc<Mutex<SystemTime>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(UNIX_EPOCH + Duration::from_secs(1_000_000))),
        }
    }
}

impl FakeClock {
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
