//! PIN and passphrase protection core for a two-button signing device.
//!
//! The crate gates sensitive operations behind user confirmation: host-requested button
//! confirmations, PIN unlock and change through either a scrambled matrix relayed by the host
//! or an on-device picker, and passphrase entry. Hardware and host I/O stay behind the traits in
//! [`protect`], so the same flows run on the device and under test.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod buttons;
pub mod config;
pub mod input;
pub mod protect;
pub mod secret;
pub mod ui;
