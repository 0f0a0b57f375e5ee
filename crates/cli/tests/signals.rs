#![forbid(unsafe_code)]

#[cfg(unix)]
mod unix {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::process::{Child, Command, Output, Stdio};
    use std::thread::sleep;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    #[test]
    fn signals_toggle_dump_and_shut_down() -> io::Result<()> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.toml");
        write_config(&config_path)?;

        let child = Command::new(env!("CARGO_BIN_EXE_xkiller-rs"))
            .arg("--conffile")
            .arg(&config_path)
            .arg("-v")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let pid = Pid::from_raw(child.id() as i32);
        sleep(Duration::from_millis(400));

        kill(pid, Signal::SIGUSR1).ok();
        sleep(Duration::from_millis(400));

        kill(pid, Signal::SIGHUP).ok();
        sleep(Duration::from_millis(400));

        kill(pid, Signal::SIGUSR1).ok();
        sleep(Duration::from_millis(400));

        kill(pid, Signal::SIGINT).ok();
        let output = wait_for_output(child)?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        assert!(combined.contains("status"));
        assert!(combined.matches("status").count() >= 2);
        assert!(combined.contains("Scheduler disabled."));
        assert!(combined.contains("shutdown requested"));

        Ok(())
    }

    fn write_config(path: &Path) -> io::Result<()> {
        let contents = "[scheduler]\n\
tick_interval = 1\n\
start_enabled = true\n\n\
[termination]\n\
grace_timeout = 1\n";
        fs::write(path, contents)
    }

    fn wait_for_output(mut child: Child) -> io::Result<Output> {
        let start = Instant::now();
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if start.elapsed() > Duration::from_secs(10) {
                let _ = child.kill();
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "xkiller process did not exit",
                ));
            }
            sleep(Duration::from_millis(50));
        }
        child.wait_with_output()
    }
}

#[cfg(not(unix))]
#[test]
fn signals_toggle_dump_and_shut_down() {
    // Signals are only supported in the Unix build.
}
