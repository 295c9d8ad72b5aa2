//! Two-button input: per-tick state tracking and intent detection.
//!
//! [`ButtonState`] turns raw pressed levels into hold counters and release edges, and
//! [`RepeatDetector`] turns those samples into `{yes, no, confirm}` events with an
//! accelerating auto-repeat.

mod repeat;

pub use repeat::{REPEAT_THRESHOLDS, RepeatDetector};

/// Pressed level of each physical button during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawButtons {
    pub yes: bool,
    pub no: bool,
}

impl RawButtons {
    pub const RELEASED: Self = Self {
        yes: false,
        no: false,
    };
    pub const YES: Self = Self {
        yes: true,
        no: false,
    };
    pub const NO: Self = Self {
        yes: false,
        no: true,
    };
    pub const BOTH: Self = Self { yes: true, no: true };
}

/// Source of raw button levels, usually the GPIO sampler.
pub trait ButtonPins {
    fn read(&mut self) -> RawButtons;
}

/// Button state observed on one tick.
///
/// `*_down` counts the consecutive ticks a button has been held and is zero when it is
/// released. `*_up` is set only on the tick a held button is let go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonSample {
    pub yes_down: u32,
    pub yes_up: bool,
    pub no_down: u32,
    pub no_up: bool,
}

impl ButtonSample {
    /// No button is held and none was released on this tick.
    pub fn is_idle(&self) -> bool {
        self.yes_down == 0 && !self.yes_up && self.no_down == 0 && !self.no_up
    }
}

/// Hold counters carried from one tick to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    yes_down: u32,
    no_down: u32,
}

impl ButtonState {
    pub const fn new() -> Self {
        Self {
            yes_down: 0,
            no_down: 0,
        }
    }

    /// Fold the levels read on this tick into a new sample.
    pub fn update(&mut self, raw: RawButtons) -> ButtonSample {
        let (yes_down, yes_up) = Self::advance(&mut self.yes_down, raw.yes);
        let (no_down, no_up) = Self::advance(&mut self.no_down, raw.no);
        ButtonSample {
            yes_down,
            yes_up,
            no_down,
            no_up,
        }
    }

    fn advance(counter: &mut u32, pressed: bool) -> (u32, bool) {
        if pressed {
            *counter = counter.saturating_add(1);
            (*counter, false)
        } else {
            let released = *counter > 0;
            *counter = 0;
            (0, released)
        }
    }
}

/// Intent extracted from one tick of button input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonEvent {
    pub yes: bool,
    pub no: bool,
    /// Both buttons were pressed together.
    pub confirm: bool,
}

impl ButtonEvent {
    pub const NONE: Self = Self {
        yes: false,
        no: false,
        confirm: false,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_counts_ticks_and_release_reports_edge() {
        let mut state = ButtonState::new();
        assert_eq!(state.update(RawButtons::YES).yes_down, 1);
        assert_eq!(state.update(RawButtons::YES).yes_down, 2);

        let released = state.update(RawButtons::RELEASED);
        assert_eq!(released.yes_down, 0);
        assert!(released.yes_up);

        let idle = state.update(RawButtons::RELEASED);
        assert!(idle.is_idle());
    }

    #[test]
    fn buttons_are_tracked_independently() {
        let mut state = ButtonState::new();
        state.update(RawButtons::BOTH);
        let sample = state.update(RawButtons::NO);
        assert!(sample.yes_up);
        assert_eq!(sample.no_down, 2);
        assert!(!sample.no_up);
    }
}
