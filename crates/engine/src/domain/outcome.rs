#![forbid(unsafe_code)]

use std::fmt;

/// Terminal result of a termination attempt. Expected conditions (protected
/// target, vanished process, privilege denial) are values here, not errors;
/// this is the only channel through which callers learn what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The target name is whitelisted; no stop request was made.
    Blocked,
    /// The pid was gone before any stop request was made.
    AlreadyGone,
    /// The process exited, gracefully or after the forceful stop.
    Killed,
    /// The stop requests could not be delivered or took no effect.
    Failed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Blocked => write!(f, "blocked"),
            Outcome::AlreadyGone => write!(f, "already gone"),
            Outcome::Killed => write!(f, "killed"),
            Outcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
