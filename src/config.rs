use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::countdown::MAX_BAR_WIDTH;

pub const DEFAULT_PREFIX: &str = "☕ ";

/// Optional defaults read from the config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub prefix: Option<String>,
    pub max_width: Option<u16>,
}

/// What the countdown is built with, after merging flags, file and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub prefix: String,
    pub max_width: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            max_width: MAX_BAR_WIDTH,
        }
    }
}

impl Settings {
    /// Flags win over the file, the file wins over built-in defaults.
    pub fn resolve(prefix: Option<String>, max_width: Option<u16>, file: &Config) -> Self {
        let defaults = Settings::default();
        Self {
            prefix: prefix
                .or_else(|| file.prefix.clone())
                .unwrap_or(defaults.prefix),
            max_width: max_width.or(file.max_width).unwrap_or(defaults.max_width),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: Option<PathBuf>,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: Some(p.as_ref().to_path_buf()),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Some(path) = &self.path else {
            return Config::default();
        };
        if let Ok(bytes) = fs::read(path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => warn!("ignoring {}: {}", path.display(), err),
            }
        }
        Config::default()
    }
}
