/// Configuration for the history engine.
use std::time::Duration;

use retrace_config::EditorConfig;

/// Quiet period in milliseconds before a delayed push is committed.
const DEFAULT_DELAY_MS: u64 = 400;

/// Configuration for the history engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Delay used by `Delay::Default` pushes.
    pub default_delay_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl HistoryConfig {
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }
}

impl From<&EditorConfig> for HistoryConfig {
    fn from(config: &EditorConfig) -> Self {
        Self {
            default_delay_ms: config.history_stack_delay_ms,
        }
    }
}
