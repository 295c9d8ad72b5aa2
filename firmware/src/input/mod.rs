//! On-device text entry: the picker alphabets and the scrolling cursor that edits a
//! [`SecretBuffer`](crate::secret::SecretBuffer) one accepted entry at a time.

mod alphabet;
mod scroll;

pub use alphabet::{
    DoneSeek, EntryAlphabet, PASSPHRASE_ALPHABET, PIN_ALPHABET, SPACE_PLACEHOLDER, Symbol,
};
pub use scroll::{CaretPhase, ScrollStep, TextScroller};
