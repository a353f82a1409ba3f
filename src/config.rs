use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::engine::{Timing, DEFAULT_RESTART_DELAY, DEFAULT_TICK_PERIOD};
use crate::feedback::FeedbackMode;
use crate::phrases::BuiltinPool;

pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pool: BuiltinPool,
    pub phrases_file: Option<PathBuf>,
    pub feedback: FeedbackMode,
    pub restart_delay_secs: u64,
    pub message_timeout_secs: u64,
    pub history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool: BuiltinPool::default(),
            phrases_file: None,
            feedback: FeedbackMode::default(),
            restart_delay_secs: DEFAULT_RESTART_DELAY.as_secs(),
            message_timeout_secs: DEFAULT_MESSAGE_TIMEOUT.as_secs(),
            history: true,
        }
    }
}

impl Config {
    pub fn timing(&self) -> Timing {
        Timing {
            tick_period: DEFAULT_TICK_PERIOD,
            restart_delay: Duration::from_secs(self.restart_delay_secs),
        }
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring malformed config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
