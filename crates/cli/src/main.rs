use clap::Parser;
use config::Config;
use engine::{ControlEvent, KillEngine, Outcome, ProcfsHost, Services, SystemClock};
use flume::bounded;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use xkiller_rs::cli::{Cli, Command};
use xkiller_rs::signals::{SignalEvent, wait_for_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment variable
    // for log control. For example, `XKILLER_LOG=warn xkiller-rs -vvv` will
    // still log at the trace level. The environment variable (`XKILLER_LOG`)
    // can only set the log level per crate, not override the verbosity flag.
    let env_filter = EnvFilter::builder()
        .with_env_var("XKILLER_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let layer = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    // load config
    let config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => {
            let mut candidates = glob::glob("/etc/xkiller-rs/config.d/*.toml")?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            candidates.insert(0, "/etc/xkiller-rs/config.toml".into());
            trace!(?candidates, "config file candidates");
            Config::load_multiple(candidates)?
        }
    };
    debug!(?config, ?cli);

    let services = Services {
        host: Box::new(ProcfsHost),
        clock: Box::new(SystemClock),
    };
    let mut engine = KillEngine::new(config, services);

    match cli.command {
        Some(Command::List { filter }) => {
            print_processes(&mut engine, filter.as_deref());
            return Ok(());
        }
        Some(Command::Kill { pid }) => return kill_once(&mut engine, pid).await,
        None => {}
    }

    // install signal handlers
    let cancel = CancellationToken::new();
    let (signals_tx, signals_rx) = bounded(8);
    let signal_cancel = cancel.clone();
    let mut signal_handle = tokio::spawn(async move { wait_for_signal(signals_tx, signal_cancel).await });

    // route signal events into the engine's control channel
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let forward_handle = tokio::spawn(async move {
        while let Ok(event) = signals_rx.recv_async().await {
            let control = match event {
                SignalEvent::ToggleScheduler => ControlEvent::ToggleScheduler,
                SignalEvent::DumpStatus => ControlEvent::DumpStatus,
            };
            if control_tx.send(control).is_err() {
                break;
            }
        }
    });

    tokio::select! {
        // run the scheduler loop until a shutdown signal arrives
        res = engine.run_until(cancel.clone(), control_rx) => res?,

        // the signal task only finishes on error; bubble it up
        res = &mut signal_handle => {
            let res = res?;
            if let Err(err) = &res {
                error!("error happened during handling signals: {}", err);
            }
            res?
        }
    }

    signal_handle.abort();
    forward_handle.abort();
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_processes(engine: &mut KillEngine, filter: Option<&str>) {
    let query = filter.unwrap_or("").to_lowercase();
    for process in engine.list_processes() {
        if !query.is_empty()
            && !process.name.to_lowercase().contains(&query)
            && !process.pid.to_string().contains(&query)
        {
            continue;
        }
        let mem_mb = process.memory_bytes as f64 / (1024.0 * 1024.0);
        println!(
            "{:>8}  {:<32}  {:<4}  {:>10.2} MB",
            process.pid, process.name, process.status, mem_mb
        );
    }
}

#[allow(clippy::print_stdout)]
async fn kill_once(engine: &mut KillEngine, pid: i32) -> anyhow::Result<()> {
    let name = engine
        .list_processes()
        .into_iter()
        .find(|process| process.pid == pid)
        .map(|process| process.name)
        .unwrap_or_default();

    let outcome = engine.kill_now(pid, &name).await;
    println!("{pid} ({name}): {outcome}");
    match outcome {
        Outcome::Failed(reason) => anyhow::bail!("kill failed: {reason}"),
        _ => Ok(()),
    }
}
