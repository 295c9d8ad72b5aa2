//! PIN and passphrase protection for operations that touch key material.
//!
//! A [`Protector`] borrows every collaborator it needs for one operation: the vault
//! configuration, the session cache, the host link, the button pins, the display and a
//! random source. Each public operation runs to completion on the calling thread, polling the
//! host link at every wait so an unsolicited `Cancel` or `Initialize` ends it early.

mod entry;
mod error;
mod matrix;
mod passphrase;
mod pin;
mod wait;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use error::{AbortReason, ProtectError};
pub use matrix::{INVALID_POSITION, PinMatrix};
pub use wait::ProgressWait;

use rand_core::RngCore;
use shared::schema::{DeviceMessage, Failure, FailureType, HostMessage, message_type_for_host};

use crate::buttons::{ButtonPins, ButtonState, RepeatDetector};
use crate::config::ProtectConfig;
use crate::ui::Display;

/// Persistent device configuration guarding the PIN.
pub trait ConfigStore {
    fn has_pin(&self) -> bool;

    /// Check `pin` and unlock the session on success. An empty `pin` means no PIN is set.
    ///
    /// The store may delay the answer after earlier failures, reporting the countdown through
    /// `progress`; a `true` return from [`UnlockProgress::report`] asks it to give up.
    fn unlock(&mut self, pin: &[u8], progress: &mut dyn UnlockProgress) -> bool;

    /// Replace `old` with `new`. An empty `new` removes the PIN.
    fn change_pin(&mut self, old: &[u8], new: &[u8], progress: &mut dyn UnlockProgress) -> bool;

    fn passphrase_protection(&self) -> bool;
}

/// Feedback channel for a delayed unlock.
pub trait UnlockProgress {
    /// Show the remaining delay. Returns `true` once the operation should be abandoned.
    fn report(&mut self, wait_secs: u32, permille: u32, message: &str) -> bool;
}

/// Volatile per-session state.
pub trait SessionCache {
    fn is_unlocked(&self) -> bool;
    fn text_input_preference(&self) -> Option<bool>;
    fn set_text_input_preference(&mut self, on_device: bool);
    fn cache_passphrase(&mut self, passphrase: &[u8]);
    fn is_passphrase_cached(&self) -> bool;
}

/// Message channel to the host computer.
pub trait HostLink {
    fn send(&mut self, message: DeviceMessage);
    fn poll(&mut self) -> Option<HostMessage>;
    /// Idle for `ms` milliseconds while keeping the link serviced.
    fn sleep_ms(&mut self, ms: u32);
    /// Restrict the link to the small set of messages accepted during a wait.
    fn set_tiny(&mut self, enabled: bool);
    /// Answer a debug-link state query without leaving the current wait.
    fn serve_debug_state(&mut self) {}
}

/// Collaborators lent to a [`Protector`].
pub struct Services<'a> {
    pub config: &'a mut dyn ConfigStore,
    pub session: &'a mut dyn SessionCache,
    pub link: &'a mut dyn HostLink,
    pub buttons: &'a mut dyn ButtonPins,
    pub display: &'a mut dyn Display,
    pub rng: &'a mut dyn RngCore,
}

/// Runs the interactive protection flows.
pub struct Protector<'a> {
    config: &'a mut dyn ConfigStore,
    session: &'a mut dyn SessionCache,
    link: &'a mut dyn HostLink,
    pins: &'a mut dyn ButtonPins,
    display: &'a mut dyn Display,
    rng: &'a mut dyn RngCore,
    settings: ProtectConfig,
    buttons: ButtonState,
    repeat: RepeatDetector,
    aborted: Option<AbortReason>,
}

impl<'a> Protector<'a> {
    pub fn new(services: Services<'a>) -> Self {
        Self {
            config: services.config,
            session: services.session,
            link: services.link,
            pins: services.buttons,
            display: services.display,
            rng: services.rng,
            settings: ProtectConfig::default(),
            buttons: ButtonState::new(),
            repeat: RepeatDetector::new(),
            aborted: None,
        }
    }

    pub fn with_config(mut self, settings: ProtectConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Host message that aborted the most recent operation, if any.
    pub fn aborted_by(&self) -> Option<AbortReason> {
        self.aborted
    }

    fn begin(&mut self) {
        self.aborted = None;
    }

    /// Record the outcome of an operation without reporting it to the host.
    fn settle<T>(&mut self, result: Result<T, ProtectError>) -> Result<T, ProtectError> {
        if let Err(error) = &result {
            self.aborted = error.abort_reason();
            log::warn!("protected operation did not complete: {error}");
        }
        result
    }

    /// Record the outcome and send the matching `Failure`, exactly once.
    fn conclude<T>(&mut self, result: Result<T, ProtectError>) -> Result<T, ProtectError> {
        self.conclude_with(result, ProtectError::failure_type)
    }

    /// Like [`Protector::conclude`], with the failure code chosen by `code`.
    fn conclude_with<T>(
        &mut self,
        result: Result<T, ProtectError>,
        code: impl FnOnce(&ProtectError) -> FailureType,
    ) -> Result<T, ProtectError> {
        let result = self.settle(result);
        if let Err(error) = &result {
            let code = code(error);
            log::debug!("reporting failure to host: {code:?}");
            self.link.send(DeviceMessage::Failure(Failure::new(code)));
        }
        result
    }

    /// Run `body` with the link in tiny mode, leaving it off on every exit.
    fn with_tiny<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, ProtectError>,
    ) -> Result<T, ProtectError> {
        self.link.set_tiny(true);
        let result = body(self);
        self.link.set_tiny(false);
        result
    }
}

/// Pull one message from `link`, answering debug state queries in place.
///
/// `Cancel` and `Initialize` surface as the abort reason; anything else is handed back.
fn screen_message(link: &mut dyn HostLink) -> Result<Option<HostMessage>, AbortReason> {
    match link.poll() {
        Some(message) => {
            if let Some(reason) = AbortReason::from_message(&message) {
                log::debug!("host aborted the wait with {reason}");
                return Err(reason);
            }
            if matches!(message, HostMessage::DebugLinkGetState) {
                link.serve_debug_state();
                return Ok(None);
            }
            Ok(Some(message))
        }
        None => Ok(None),
    }
}

/// Log a host message that the current wait has no use for. Only its id is logged.
fn ignore_message(message: &HostMessage, during: &str) {
    log::debug!("ignoring {:?} during {during}", message_type_for_host(message));
}
