use alloc::{format, string::String};

use crate::input::{SPACE_PLACEHOLDER, Symbol};

/// Second line of the backoff screen.
pub const PROGRESS_HEADING: &str = "Please wait";
/// Last line of the backoff screen.
pub const PROGRESS_FOOTER: &str = "to continue ...";
/// Upper bound of the progress bar, in thousandths.
pub const PROGRESS_FULL: u32 = 1000;

/// Icon drawn next to a dialog's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogIcon {
    Question,
    Info,
}

/// Text dialog with optional button labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogView<'a> {
    pub icon: Option<DialogIcon>,
    /// Label above the "no" button.
    pub left: Option<&'a str>,
    /// Label above the "yes" button.
    pub right: Option<&'a str>,
    pub lines: &'a [&'a str],
}

impl<'a> DialogView<'a> {
    /// Informational screen dismissed with the "yes" button.
    pub const fn next(lines: &'a [&'a str]) -> Self {
        Self {
            icon: None,
            left: None,
            right: Some("Next"),
            lines,
        }
    }
}

/// Scrolling picker shown while text is entered on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollView<'a> {
    /// Text entered so far. Spaces are still stored as the placeholder byte.
    pub text: &'a [u8],
    pub capacity: usize,
    pub symbols: &'a [Symbol],
    pub groups: &'a [usize],
    pub cursor: usize,
    pub window: usize,
    pub caret_visible: bool,
}

impl ScrollView<'_> {
    /// Entries to draw, left to right, with the cursor in the middle slot.
    pub fn window(&self) -> impl Iterator<Item = (usize, Symbol)> + '_ {
        let len = self.symbols.len();
        let count = self.window.min(len);
        let start = if len == 0 {
            0
        } else {
            (self.cursor + len - count / 2) % len
        };

        (0..count).map(move |offset| {
            let index = (start + offset) % len;
            (index, self.symbols[index])
        })
    }

    /// Group holding the highlighted entry.
    pub fn active_group(&self) -> Option<usize> {
        self.groups
            .windows(2)
            .position(|bounds| self.cursor >= bounds[0] && self.cursor < bounds[1])
    }
}

/// Review screen for entered text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckInputView<'a> {
    pub heading: &'a str,
    pub text: &'a [u8],
    /// "no" returns to editing.
    pub allow_edit: bool,
    /// "yes" accepts the text.
    pub allow_done: bool,
}

impl CheckInputView<'_> {
    /// Character to draw for the byte at `index`, with the space placeholder made visible.
    pub fn glyph(&self, index: usize) -> Option<char> {
        self.text.get(index).map(|byte| {
            if *byte == SPACE_PLACEHOLDER {
                Symbol::Space.glyph()
            } else {
                char::from(*byte)
            }
        })
    }
}

/// Scrambled digit grid shown while the host relays matrix positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMatrixView<'a> {
    pub prompt: &'a str,
    /// Digits in keypad order, top-left to bottom-right.
    pub digits: &'a [u8; 9],
}

/// Backoff countdown reported while the vault delays an unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressView<'a> {
    pub message: &'a str,
    pub wait_secs: u32,
    pub permille: u32,
}

impl ProgressView<'_> {
    pub fn countdown_label(&self) -> String {
        if self.wait_secs == 1 {
            String::from("1 second")
        } else {
            format!("{} seconds", self.wait_secs)
        }
    }

    pub fn bar_permille(&self) -> u32 {
        self.permille.min(PROGRESS_FULL)
    }
}

/// Content rendered for each screen variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewContent<'a> {
    Dialog(DialogView<'a>),
    Scroll(ScrollView<'a>),
    CheckInput(CheckInputView<'a>),
    PinMatrix(PinMatrixView<'a>),
    Progress(ProgressView<'a>),
    Home,
}

/// Sink for rendered screens. Implementations must not retain borrowed text.
pub trait Display {
    fn render(&mut self, content: ViewContent<'_>);
}
