//! Tunables for the interactive protection loops.
use serde::{Deserialize, Serialize};

/// Interval between two polling ticks. The repeat thresholds are expressed in ticks.
pub const DEFAULT_TICK_MS: u32 = 5;
/// Full blink period of the entry caret, in ticks. The caret shows for the first half.
pub const DEFAULT_CARET_PERIOD: u16 = 160;
/// Number of alphabet entries visible in the scrolling picker.
pub const DEFAULT_PICKER_WINDOW: usize = 9;

/// Runtime configuration for the protection flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectConfig {
    pub tick_ms: u32,
    pub caret_period: u16,
    pub picker_window: usize,
}

impl Default for ProtectConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            caret_period: DEFAULT_CARET_PERIOD,
            picker_window: DEFAULT_PICKER_WINDOW,
        }
    }
}

impl ProtectConfig {
    pub fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    pub fn with_caret_period(mut self, period: u16) -> Self {
        self.caret_period = period.max(2);
        self
    }

    pub fn with_picker_window(mut self, window: usize) -> Self {
        self.picker_window = window.max(1);
        self
    }
}
