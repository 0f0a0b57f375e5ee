#![forbid(unsafe_code)]

use std::collections::HashSet;

/// Critical process names no build of the tool may ever kill. The running
/// executable's own name is added on top at construction time.
const SYSTEM_SEEDS: &[&str] = &["systemd", "init", "kthreadd"];

/// Result of adding a name to the user whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadySystem,
    AlreadyUser,
}

/// Result of removing a name from the user whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// System entries are immutable and cannot be removed.
    Rejected,
    NotFound,
}

/// Two-tier protection set: an immutable system set sealed at construction
/// and a mutable user set. A name is protected iff it appears in either,
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct Whitelist {
    system: HashSet<String>,
    user: HashSet<String>,
}

impl Whitelist {
    /// Build the whitelist from the built-in seeds, the running executable's
    /// own name, and the configured extras. `extra_system` entries become
    /// part of the immutable tier.
    pub fn new<S: AsRef<str>>(
        extra_system: impl IntoIterator<Item = S>,
        user: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut system: HashSet<String> =
            SYSTEM_SEEDS.iter().map(|name| name.to_string()).collect();
        if let Some(own) = own_process_name() {
            system.insert(own);
        }
        system.extend(
            extra_system
                .into_iter()
                .map(|name| name.as_ref().to_lowercase()),
        );

        let user = user
            .into_iter()
            .map(|name| name.as_ref().to_lowercase())
            .filter(|name| !system.contains(name))
            .collect();

        Self { system, user }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.system.contains(&name) || self.user.contains(&name)
    }

    pub fn add_user(&mut self, name: &str) -> AddOutcome {
        let name = name.to_lowercase();
        if self.system.contains(&name) {
            AddOutcome::AlreadySystem
        } else if !self.user.insert(name) {
            AddOutcome::AlreadyUser
        } else {
            AddOutcome::Added
        }
    }

    pub fn remove_user(&mut self, name: &str) -> RemoveOutcome {
        let name = name.to_lowercase();
        if self.system.contains(&name) {
            RemoveOutcome::Rejected
        } else if self.user.remove(&name) {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        }
    }

    /// System entries, sorted, for display.
    pub fn system_entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.system.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }

    /// User entries, sorted, for display.
    pub fn user_entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.user.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }

    pub fn user_len(&self) -> usize {
        self.user.len()
    }

    pub fn system_len(&self) -> usize {
        self.system.len()
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::new::<&str>([], [])
    }
}

fn own_process_name() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let name = exe.file_name()?.to_str()?;
    Some(name.to_lowercase())
}
