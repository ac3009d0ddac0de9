/// Editor configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Upper bound for the history coalescing delay.
const MAX_HISTORY_DELAY_MS: u64 = 10_000;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period in milliseconds before a burst of edits becomes one
    /// undo step.
    pub history_stack_delay_ms: u64,
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Editable regions created for a new session, in display order.
    pub root_keys: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_stack_delay_ms: 400,
            log_filter: "info".to_string(),
            root_keys: vec!["main".to_string()],
        }
    }
}

impl EditorConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `RETRACE_CONFIG` environment variable
    /// 2. `retrace/retrace.json` under the user's config directory
    /// 3. `retrace.json` in the working directory
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("RETRACE_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join("retrace").join("retrace.json"))
            .unwrap_or_else(|| PathBuf::from("retrace.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EditorConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.history_stack_delay_ms = self.history_stack_delay_ms.min(MAX_HISTORY_DELAY_MS);

        if self.log_filter.trim().is_empty() {
            self.log_filter = "info".to_string();
        }

        let mut keys: Vec<String> = Vec::with_capacity(self.root_keys.len());
        for key in self.root_keys.drain(..) {
            let key = key.trim().to_string();
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        if keys.is_empty() {
            keys.push("main".to_string());
        }
        self.root_keys = keys;
    }
}
