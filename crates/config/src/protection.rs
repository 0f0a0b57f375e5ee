#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Protection {
    /// Additional process names sealed into the system whitelist at startup.
    /// These join the built-in seeds and cannot be removed at runtime.
    pub system: Vec<String>,

    /// Process names pre-loaded into the user whitelist. Unlike `system`
    /// entries these can be removed again while the application runs.
    pub user: Vec<String>,
}

impl Protection {
    /// Lower-case and sort both lists so membership semantics do not depend
    /// on how the config file was written.
    pub fn normalize(&mut self) {
        for list in [&mut self.system, &mut self.user] {
            for name in list.iter_mut() {
                *name = name.to_lowercase();
            }
            list.sort();
            list.dedup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_dedups() {
        let mut protection = Protection {
            system: vec!["Systemd".into(), "systemd".into(), "INIT".into()],
            user: vec!["Firefox".into()],
        };
        protection.normalize();
        assert_eq!(protection.system, vec!["init", "systemd"]);
        assert_eq!(protection.user, vec!["firefox"]);
    }
}
