//! Editor configuration supplied by the owning article form.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Rewrap text blocks to their `maxCharsPerLine` after typing pauses.
    pub auto_line_break: bool,
    /// Idle time before a pending rewrap is applied.
    pub line_break_delay_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { auto_line_break: false, line_break_delay_ms: 1000 }
    }
}

impl EditorConfig {
    pub fn with_auto_line_break(mut self, enabled: bool) -> Self {
        self.auto_line_break = enabled;
        self
    }

    pub fn line_break_delay(&self) -> Duration {
        Duration::from_millis(self.line_break_delay_ms)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
