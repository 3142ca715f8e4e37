use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::*;
use serde::{Deserialize, Serialize};

use infra::persistence::{FileStore, KeyValueStore, MemoryStore};

use crate::menu::{MenuStore, DEFAULT_KEY};

const ENV_PREFIX: &str = "BISTRO_";

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct StorageConfig {
    /// Directory for the saved menu; without one the menu lives in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

#[derive(Deserialize, Debug, Default)]
struct StorageOverrides {
    path: Option<PathBuf>,
    key: Option<String>,
    persist: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
pub struct EnvLogger {
    #[serde(default)]
    level: Option<LogLevel>,
    #[serde(default)]
    modules: HashMap<String, LogLevel>,
    #[serde(default)]
    timestamp_nanos: bool,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

fn default_persist() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: None,
            key: default_key(),
            persist: default_persist(),
        }
    }
}

impl Config {
    /// Applies `BISTRO_PATH`, `BISTRO_KEY` and `BISTRO_PERSIST` from the
    /// process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(std::env::vars())
    }

    pub fn apply_vars<I: IntoIterator<Item = (String, String)>>(&mut self, vars: I) -> Result<()> {
        let overrides: StorageOverrides = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("read environment overrides")?;
        debug!("Environment overrides: {:?}", overrides);
        if let Some(path) = overrides.path {
            self.storage.path = Some(path);
        }
        if let Some(key) = overrides.key {
            self.storage.key = key;
        }
        if let Some(persist) = overrides.persist {
            self.storage.persist = persist;
        }
        Ok(())
    }
}

impl StorageConfig {
    pub(crate) fn build(&self) -> Result<MenuStore<Box<dyn KeyValueStore>>> {
        debug!("Build menu store from {:?}", self);
        if !self.persist {
            info!("Persistence disabled; menu lives in memory only");
            return Ok(MenuStore::unpersisted());
        }

        let store: Box<dyn KeyValueStore> = match self.path.as_ref() {
            Some(path) => Box::new(FileStore::open(path).context("open menu storage")?),
            None => {
                warn!("No storage path configured; saving to memory only");
                Box::new(MemoryStore::new())
            }
        };
        Ok(MenuStore::persistent(store, &self.key))
    }
}

impl LogLevel {
    fn to_filter(&self) -> log::LevelFilter {
        match self {
            &LogLevel::Off => log::LevelFilter::Off,
            &LogLevel::Error => log::LevelFilter::Error,
            &LogLevel::Warn => log::LevelFilter::Warn,
            &LogLevel::Info => log::LevelFilter::Info,
            &LogLevel::Debug => log::LevelFilter::Debug,
            &LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level.as_ref() {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(&module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        return b;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_to_the_menu_items_key() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config.storage.key, "menuItems");
        assert!(config.storage.persist);
        assert_eq!(config.storage.path, None);
    }

    #[test]
    fn reads_storage_table() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            path = "/var/lib/bistro"
            key = "carte"
            persist = false
            "#,
        )
        .expect("parse");
        assert_eq!(config.storage.path, Some(PathBuf::from("/var/lib/bistro")));
        assert_eq!(config.storage.key, "carte");
        assert!(!config.storage.persist);
    }

    #[test]
    fn reads_logger_table() {
        let logger: EnvLogger = toml::from_str(
            r#"
            level = "info"
            timestamp_nanos = true
            [modules]
            bistro = "debug"
            "#,
        )
        .expect("parse");
        assert!(logger.timestamp_nanos);
        assert_eq!(logger.modules.len(), 1);
        let _ = logger.builder();
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::default();
        config
            .apply_vars(vars(&[
                ("BISTRO_PATH", "/tmp/menu"),
                ("BISTRO_PERSIST", "false"),
                ("UNRELATED", "x"),
            ]))
            .expect("apply");
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/menu")));
        assert_eq!(config.storage.key, "menuItems");
        assert!(!config.storage.persist);
    }

    #[test]
    fn builds_file_backed_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StorageConfig {
            path: Some(dir.path().to_path_buf()),
            ..StorageConfig::default()
        };
        let mut menu = config.build().expect("build");
        menu.add(crate::menu::MenuDraft {
            dish_name: "Soup".into(),
            description: "Hot soup".into(),
            course: crate::menu::Course::Soup,
            price: "5".parse().expect("price"),
        })
        .expect("add");

        let mut reopened = config.build().expect("build");
        assert_eq!(reopened.hydrate(), crate::menu::Hydration::Loaded(1));
    }
}
