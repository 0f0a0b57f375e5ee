use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// xkiller-rs: the scheduled process terminator
///
/// Lists running processes and terminates them, either immediately or at a
/// scheduled time, guarded by a whitelist of critical process names. Without
/// a subcommand the scheduler daemon is started in the foreground.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// If not provided, the default locations are checked. They are
    /// `/etc/xkiller-rs/config.toml` and `/etc/xkiller-rs/config.d/*.toml`,
    /// where the latter being a glob pattern. If they don't exist, the
    /// default configuration is used.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print a snapshot of the current process table.
    List {
        /// Only show processes whose name or pid contains this string.
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Terminate one process immediately, honoring the whitelist.
    Kill {
        #[arg(value_parser = validate_pid)]
        pid: i32,
    },
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Validate a pid argument.
#[inline(always)]
fn validate_pid(pid: &str) -> Result<i32, String> {
    let pid: i32 = pid
        .parse()
        .map_err(|_| format!("`{pid}` is not a valid pid"))?;
    if pid >= 1 {
        Ok(pid)
    } else {
        Err("Pid must be positive".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pid_candidates() -> impl Strategy<Value = String> {
        prop_oneof![
            2 => (-100i64..100_000).prop_map(|i| format!("{}", i)),
            1 => (i64::MIN..=i64::MAX).prop_map(|i| format!("{}", i)),
            1 => ".*",
        ]
    }

    proptest! {
        #[test]
        fn test_validate_pid(pid in pid_candidates()) {
            let result = validate_pid(&pid);
            match result {
                Ok(p) => prop_assert!(p >= 1),
                Err(err) => {
                    let error_msg = format!("`{}` is not a valid pid", pid);
                    prop_assert!(err == error_msg || err == "Pid must be positive");
                },
            }
        }
    }
}
