use super::{ButtonEvent, ButtonSample};

/// Ticks added to a button's threshold at each repeat level.
///
/// The first entry is the initial hold before auto-repeat starts; the remaining entries
/// shorten the interval between repeats until the final value, which then repeats forever.
pub const REPEAT_THRESHOLDS: [u32; 11] = [20, 80, 20, 18, 16, 14, 12, 10, 8, 6, 4];

const MAX_LEVEL: usize = REPEAT_THRESHOLDS.len() - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RepeatState {
    level: usize,
    threshold: u32,
}

impl RepeatState {
    const fn new() -> Self {
        Self {
            level: 0,
            threshold: REPEAT_THRESHOLDS[0],
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn is_initial(&self) -> bool {
        self.level == 0
    }

    fn advance(&mut self, down: u32, up: bool) -> bool {
        if up {
            let fire = self.is_initial();
            self.reset();
            return fire;
        }

        if down >= self.threshold {
            if self.level < MAX_LEVEL {
                self.level += 1;
            }
            self.threshold = self.threshold.saturating_add(REPEAT_THRESHOLDS[self.level]);
            return true;
        }

        false
    }
}

/// Debounced intent detector for the two-button interface.
///
/// Feed one [`ButtonSample`] per tick. A short press fires on release, a long press fires
/// after the initial hold and then repeats faster and faster. Pressing both buttons while
/// neither has started repeating fires a single `confirm` and mutes all output until both
/// buttons are released again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatDetector {
    yes: RepeatState,
    no: RepeatState,
    both: bool,
}

impl Default for RepeatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RepeatDetector {
    pub const fn new() -> Self {
        Self {
            yes: RepeatState::new(),
            no: RepeatState::new(),
            both: false,
        }
    }

    /// Whether a simultaneous press is still waiting for both buttons to be released.
    pub fn both_active(&self) -> bool {
        self.both
    }

    pub fn step(&mut self, sample: &ButtonSample) -> ButtonEvent {
        let mut event = ButtonEvent::NONE;

        let yes_involved = sample.yes_down > 0 || sample.yes_up;
        let no_involved = sample.no_down > 0 || sample.no_up;

        if self.both {
            if sample.yes_down == 0 && sample.no_down == 0 {
                self.both = false;
                self.yes.reset();
                self.no.reset();
            }
        } else if yes_involved && no_involved {
            if self.yes.is_initial() && self.no.is_initial() {
                self.both = true;
                event.confirm = true;
            }
        } else {
            event.yes = self.yes.advance(sample.yes_down, sample.yes_up);
            event.no = self.no.advance(sample.no_down, sample.no_up);
        }

        event
    }
}
