#![forbid(unsafe_code)]

mod error;
mod protection;
mod scheduler;
mod termination;

pub use error::Error;
pub use protection::Protection;
pub use scheduler::Scheduler;
pub use termination::Termination;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub scheduler: Scheduler,
    pub termination: Termination,
    pub protection: Protection,
}

impl Config {
    /// Load configuration from a TOML file. Missing fields are filled with defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = toml_edit::de::from_str(&text)?;
        config.apply_defaults();
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let toml = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from multiple TOML files. Later files override earlier ones.
    pub fn load_multiple<T, U>(paths: U) -> Result<Self, Error>
    where
        T: AsRef<Path>,
        U: IntoIterator<Item = T>,
    {
        let mut merged = toml_edit::DocumentMut::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(path)?;
            let doc: toml_edit::DocumentMut = text.parse()?;
            merge_document(&mut merged, doc);
        }
        let mut config: Config = toml_edit::de::from_str(&merged.to_string())?;
        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        self.protection.normalize();
    }
}

fn merge_document(target: &mut toml_edit::DocumentMut, source: toml_edit::DocumentMut) {
    for (key, item) in source.iter() {
        merge_item(
            target.entry(key).or_insert(toml_edit::Item::None),
            item.clone(),
        );
    }
}

fn merge_item(target: &mut toml_edit::Item, source: toml_edit::Item) {
    use toml_edit::Item;
    match (target, source) {
        (Item::Table(target_table), Item::Table(source_table)) => {
            for (key, item) in source_table.iter() {
                merge_item(target_table.entry(key).or_insert(Item::None), item.clone());
            }
        }
        (Item::ArrayOfTables(target_array), Item::ArrayOfTables(source_array)) => {
            for table in source_array.iter() {
                target_array.push(table.clone());
            }
        }
        (target_item, source_item) => {
            *target_item = source_item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.protection.user = vec!["firefox".into()];
        config.apply_defaults();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn load_fills_missing_sections_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[scheduler]\ntick_interval = 5\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.scheduler.tick_interval, Duration::from_secs(5));
        assert!(cfg.scheduler.start_enabled);
        assert_eq!(cfg.termination, Termination::default());
    }

    #[test]
    fn load_multiple_merges() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("a.toml");
        let path2 = dir.path().join("b.toml");

        std::fs::write(
            &path1,
            "[scheduler]\ntick_interval = 2\nstart_enabled = false\n",
        )
        .unwrap();
        std::fs::write(
            &path2,
            "[termination]\ngrace_timeout = 10\n[protection]\nuser = [\"Firefox\"]\n",
        )
        .unwrap();

        let cfg = Config::load_multiple([path1, path2]).unwrap();
        assert_eq!(cfg.scheduler.tick_interval, Duration::from_secs(2));
        assert!(!cfg.scheduler.start_enabled);
        assert_eq!(cfg.termination.grace_timeout, Duration::from_secs(10));
        assert_eq!(cfg.protection.user, vec!["firefox"]);
    }
}
