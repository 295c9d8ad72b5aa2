//! Screens shown by the protection flows.
//!
//! Views borrow whatever they display, so secrets under review are drawn straight from their
//! wiping buffers and never copied into owned view state.

mod render;

pub use render::{
    CheckInputView, DialogIcon, DialogView, Display, PROGRESS_FOOTER, PROGRESS_FULL,
    PROGRESS_HEADING, PinMatrixView, ProgressView, ScrollView, ViewContent,
};
