#![forbid(unsafe_code)]

use flume::Sender;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGHUP: flip the scheduler between enabled and paused.
    ToggleScheduler,
    /// SIGUSR1: log the current queue, whitelist, and scheduler state.
    DumpStatus,
}

/// Install the daemon's unix signal handlers and translate signals into
/// [`SignalEvent`]s. SIGINT and SIGTERM trigger the cancellation token and
/// keep listening; the engine loop owns the actual shutdown.
pub async fn wait_for_signal(
    tx: Sender<SignalEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                debug!("received SIGINT");
                cancel.cancel();
            }
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
                cancel.cancel();
            }
            _ = sighup.recv() => {
                debug!("received SIGHUP");
                tx.send_async(SignalEvent::ToggleScheduler).await?;
            }
            _ = sigusr1.recv() => {
                debug!("received SIGUSR1");
                tx.send_async(SignalEvent::DumpStatus).await?;
            }
        }
    }
}
