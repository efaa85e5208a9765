use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::validation::ValidationMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_translation_url")]
    pub translation_url: String,
    #[serde(default)]
    pub validation_mode: ValidationMode,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_mouse")]
    pub mouse: bool,
    #[serde(default = "default_record_history")]
    pub record_history: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_translation_url() -> String {
    "http://localhost:3000/api/getEnglishTranslation".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_mouse() -> bool {
    true
}
fn default_record_history() -> bool {
    true
}
fn default_log_file() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("brick")
        .join("brick.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            translation_url: default_translation_url(),
            validation_mode: ValidationMode::default(),
            theme: default_theme(),
            request_timeout_secs: default_request_timeout_secs(),
            mouse: default_mouse(),
            record_history: default_record_history(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Persist a theme choice without touching the rest of the file, so
    /// command-line overrides held in memory never reach disk.
    pub fn save_theme(path: &Path, theme: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.theme = theme.to_string();
        on_disk.save_to(path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("brick")
            .join("config.toml")
    }

    /// Repair values a hand-edited file may get wrong.
    pub fn validate(&mut self) {
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
        if self.server_url.trim().is_empty() {
            self.server_url = default_server_url();
        }
        if self.translation_url.trim().is_empty() {
            self.translation_url = default_translation_url();
        }
    }
}
