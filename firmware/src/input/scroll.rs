use rand_core::RngCore;

use super::alphabet::{EntryAlphabet, Symbol};
use crate::buttons::ButtonEvent;
use crate::config::ProtectConfig;
use crate::secret::SecretBuffer;
use crate::ui::ScrollView;

/// Blink counter for the text caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaretPhase {
    tick: u16,
    period: u16,
}

impl CaretPhase {
    pub fn new(period: u16) -> Self {
        Self {
            tick: 0,
            period: period.max(2),
        }
    }

    pub fn advance(&mut self) {
        self.tick = (self.tick + 1) % self.period;
    }

    pub fn is_visible(&self) -> bool {
        self.tick < self.period / 2
    }
}

/// Outcome of feeding one tick of button intent to the scroller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollStep {
    Idle,
    Moved,
    /// Backspace was accepted; the caller reseeds the cursor.
    Erased,
    /// Done was refused on an empty buffer; the caller reseeds the cursor.
    Rejected,
    /// A character entry was accepted at the given alphabet index.
    Committed(usize),
    Done,
}

impl ScrollStep {
    pub fn needs_reseed(self) -> bool {
        matches!(self, ScrollStep::Erased | ScrollStep::Rejected)
    }
}

/// Cursor over an [`EntryAlphabet`] driven by the two buttons.
///
/// The scroller owns no secret; it edits the buffer handed to [`TextScroller::step`].
#[derive(Clone, Debug)]
pub struct TextScroller {
    alphabet: &'static EntryAlphabet,
    cursor: usize,
    caret: CaretPhase,
    window: usize,
}

impl TextScroller {
    pub fn new(alphabet: &'static EntryAlphabet, config: &ProtectConfig) -> Self {
        Self {
            alphabet,
            cursor: 0,
            caret: CaretPhase::new(config.caret_period),
            window: config.picker_window,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn caret(&self) -> CaretPhase {
        self.caret
    }

    /// Jump to a random entry, or to a `Done` entry once `buffer` is full.
    pub fn reseed<const N: usize>(&mut self, rng: &mut dyn RngCore, buffer: &SecretBuffer<N>) {
        let len = self.alphabet.len();
        if len == 0 {
            return;
        }

        let seed = rng.next_u32() as usize % len;
        self.cursor = if buffer.is_full() {
            self.alphabet.find_done(seed).unwrap_or(seed)
        } else {
            seed
        };
    }

    pub fn step<const N: usize>(
        &mut self,
        event: ButtonEvent,
        buffer: &mut SecretBuffer<N>,
    ) -> ScrollStep {
        self.caret.advance();

        let len = self.alphabet.len();
        if len == 0 {
            return ScrollStep::Idle;
        }

        if event.confirm {
            return match self.alphabet.get(self.cursor) {
                Some(Symbol::Backspace) => {
                    buffer.pop();
                    ScrollStep::Erased
                }
                Some(Symbol::Done) if buffer.is_empty() && !self.alphabet.allows_empty() => {
                    ScrollStep::Rejected
                }
                Some(Symbol::Done) => ScrollStep::Done,
                Some(symbol) => {
                    if let Some(byte) = symbol.byte() {
                        buffer.push(byte);
                    }
                    ScrollStep::Committed(self.cursor)
                }
                None => ScrollStep::Idle,
            };
        }

        if event.yes {
            self.cursor = (self.cursor + 1) % len;
            ScrollStep::Moved
        } else if event.no {
            self.cursor = (self.cursor + len - 1) % len;
            ScrollStep::Moved
        } else {
            ScrollStep::Idle
        }
    }

    pub fn view<'a, const N: usize>(&'a self, buffer: &'a SecretBuffer<N>) -> ScrollView<'a> {
        ScrollView {
            text: buffer.as_bytes(),
            capacity: buffer.capacity(),
            symbols: self.alphabet.symbols(),
            groups: self.alphabet.groups(),
            cursor: self.cursor,
            window: self.window,
            caret_visible: self.caret.is_visible(),
        }
    }
}
