#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::domain::Outcome;
use crate::host::{ProcessHost, StopError};
use crate::whitelist::Whitelist;
use config::Termination;
use std::time::Duration;
use tracing::debug;

/// Executes the protected termination path: whitelist check, graceful stop,
/// bounded wait for exit, unconditional forceful stop. Every kill, immediate
/// or scheduled, funnels through [`Terminator::execute`].
#[derive(Debug, Clone)]
pub struct Terminator {
    grace_timeout: Duration,
    poll_interval: Duration,
}

impl Terminator {
    pub fn new(config: &Termination) -> Self {
        Self {
            grace_timeout: config.grace_timeout,
            poll_interval: config.poll_interval,
        }
    }

    /// Run the full protocol against one pid. Never returns an error:
    /// everything a caller can meaningfully react to is an [`Outcome`].
    pub async fn execute(
        &self,
        whitelist: &Whitelist,
        host: &dyn ProcessHost,
        clock: &dyn Clock,
        pid: i32,
        name: &str,
    ) -> Outcome {
        if whitelist.is_protected(name) {
            return Outcome::Blocked;
        }
        if !host.exists(pid) {
            return Outcome::AlreadyGone;
        }

        if let Err(err) = host.request_stop(pid) {
            return Outcome::Failed(err.to_string());
        }

        let deadline = clock.now() + self.grace_timeout;
        while clock.now() < deadline {
            if !host.exists(pid) {
                return Outcome::Killed;
            }
            clock.sleep(self.poll_interval).await;
        }

        if !host.exists(pid) {
            return Outcome::Killed;
        }

        debug!(pid, name, "grace timeout expired, escalating");
        match host.force_stop(pid) {
            // Exiting between the last poll and the forceful stop still
            // counts as a kill; the graceful request landed.
            Ok(()) | Err(StopError::Vanished) => Outcome::Killed,
            Err(err) => Outcome::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClock, FakeHost, StopBehavior};
    use std::time::Duration;

    fn terminator() -> Terminator {
        Terminator::new(&Termination::default())
    }

    #[tokio::test]
    async fn protected_name_is_blocked_without_any_signal() {
        let host = FakeHost::default();
        host.spawn(10, StopBehavior::DiesOnRequest);
        let mut whitelist = Whitelist::default();
        whitelist.add_user("guarded");
        let clock = FakeClock::default();

        let outcome = terminator()
            .execute(&whitelist, &host, &clock, 10, "guarded")
            .await;

        assert_eq!(outcome, Outcome::Blocked);
        assert!(host.signals_sent().is_empty());
        assert!(host.exists(10));
    }

    #[tokio::test]
    async fn missing_pid_is_already_gone_not_failed() {
        let host = FakeHost::default();
        let clock = FakeClock::default();

        let outcome = terminator()
            .execute(&Whitelist::default(), &host, &clock, 404, "ghost")
            .await;

        assert_eq!(outcome, Outcome::AlreadyGone);
        assert!(host.signals_sent().is_empty());
    }

    #[tokio::test]
    async fn graceful_exit_within_grace_window_is_killed() {
        let host = FakeHost::default();
        host.spawn(10, StopBehavior::DiesOnRequest);
        let clock = FakeClock::default();

        let outcome = terminator()
            .execute(&Whitelist::default(), &host, &clock, 10, "meek")
            .await;

        assert_eq!(outcome, Outcome::Killed);
        assert_eq!(host.signals_sent(), vec![(10, "term")]);
    }

    #[tokio::test]
    async fn stubborn_process_is_escalated_after_timeout() {
        let host = FakeHost::default();
        host.spawn(10, StopBehavior::IgnoresRequest);
        let clock = FakeClock::default();
        let start = clock.now();

        let outcome = terminator()
            .execute(&Whitelist::default(), &host, &clock, 10, "stubborn")
            .await;

        assert_eq!(outcome, Outcome::Killed);
        assert_eq!(host.signals_sent(), vec![(10, "term"), (10, "kill")]);
        assert!(!host.exists(10));
        // The fake clock only advances through the poll sleeps, so the
        // elapsed time reflects the full grace window.
        let elapsed = clock.now().duration_since(start).unwrap();
        assert!(elapsed >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn privilege_denial_is_failed() {
        let host = FakeHost::default();
        host.spawn(1, StopBehavior::Denied);
        let clock = FakeClock::default();

        let outcome = terminator()
            .execute(&Whitelist::default(), &host, &clock, 1, "root-owned")
            .await;

        assert_eq!(outcome, Outcome::Failed("permission denied".into()));
    }

    #[tokio::test]
    async fn vanish_between_check_and_request_is_failed() {
        let host = FakeHost::default();
        host.spawn(10, StopBehavior::VanishesOnRequest);
        let clock = FakeClock::default();

        let outcome = terminator()
            .execute(&Whitelist::default(), &host, &clock, 10, "flaky")
            .await;

        assert_eq!(outcome, Outcome::Failed("process vanished".into()));
    }
}
