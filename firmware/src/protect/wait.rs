//! Waits that depend on the host: button requests, matrix PIN entry, passphrase relay and
//! the unlock backoff countdown.

use shared::schema::{
    ButtonRequest, ButtonRequestType, DeviceMessage, HostMessage, PinMatrixRequest,
    PinMatrixRequestType,
};
use shared::secret::SecretString;

use super::{
    AbortReason, HostLink, PinMatrix, ProtectError, Protector, UnlockProgress, ignore_message,
    screen_message,
};
use crate::secret::PinBuffer;
use crate::ui::{DialogIcon, DialogView, Display, ProgressView, ViewContent};

const PASSPHRASE_HOST_PROMPT: [&str; 4] = [
    "Please enter your",
    "passphrase using",
    "the computer's",
    "keyboard.",
];

impl Protector<'_> {
    /// Ask the user to confirm an action on the device.
    ///
    /// Returns `Ok(true)` on "yes" and `Ok(false)` on "no"; with `confirm_only` the "no" button is
    /// ignored. No `Failure` is sent on any path; the caller decides how to report a refusal.
    pub fn protect_button(
        &mut self,
        kind: ButtonRequestType,
        confirm_only: bool,
    ) -> Result<bool, ProtectError> {
        self.begin();
        let result = self.with_tiny(|this| this.await_button(kind, confirm_only));
        if let Ok(confirmed) = &result {
            log::info!("button request {kind:?} answered (confirmed: {confirmed})");
        }
        self.settle(result)
    }

    fn await_button(
        &mut self,
        kind: ButtonRequestType,
        confirm_only: bool,
    ) -> Result<bool, ProtectError> {
        self.reset_buttons();
        self.link
            .send(DeviceMessage::ButtonRequest(ButtonRequest { code: kind }));

        let mut acked = false;
        let mut decision = None;
        loop {
            match screen_message(&mut *self.link)? {
                Some(HostMessage::ButtonAck) => acked = true,
                Some(HostMessage::DebugLinkDecision(decided)) => decision = Some(decided.yes_no),
                Some(message) => ignore_message(&message, "button request"),
                None => {}
            }

            if !acked {
                self.link.sleep_ms(self.settings.tick_ms);
                continue;
            }

            if let Some(yes) = decision {
                return Ok(yes);
            }

            self.link.sleep_ms(self.settings.tick_ms);
            let sample = self.buttons.update(self.pins.read());
            if sample.yes_up {
                return Ok(true);
            }
            if !confirm_only && sample.no_up {
                return Ok(false);
            }
        }
    }

    /// Collect a PIN relayed by the host through a freshly scrambled matrix.
    ///
    /// `pin` is left empty on every error path.
    pub(super) fn request_pin_host(
        &mut self,
        kind: PinMatrixRequestType,
        prompt: &str,
        pin: &mut PinBuffer,
    ) -> Result<(), ProtectError> {
        pin.clear();
        let matrix = PinMatrix::shuffled(&mut *self.rng);

        let result = self.with_tiny(|this| {
            this.link
                .send(DeviceMessage::PinMatrixRequest(PinMatrixRequest { kind }));
            this.display
                .render(ViewContent::PinMatrix(matrix.view(prompt)));

            loop {
                match screen_message(&mut *this.link)? {
                    Some(HostMessage::PinMatrixAck(ack)) => {
                        if matrix.decode(ack.pin.as_bytes(), pin) {
                            return Ok(());
                        }
                        log::warn!("relayed PIN exceeds buffer capacity");
                        return Err(ProtectError::CredentialInvalid);
                    }
                    Some(message) => ignore_message(&message, "PIN request"),
                    None => this.link.sleep_ms(this.settings.tick_ms),
                }
            }
        });

        if result.is_err() {
            pin.clear();
        }
        result
    }

    /// Ask the host for the passphrase typed on the computer.
    ///
    /// An acknowledgement without a passphrase yields an empty one.
    pub(super) fn request_passphrase_host(&mut self) -> Result<SecretString, ProtectError> {
        self.with_tiny(|this| {
            this.link.send(DeviceMessage::PassphraseRequest);
            this.display.render(ViewContent::Dialog(DialogView {
                icon: Some(DialogIcon::Info),
                left: None,
                right: None,
                lines: &PASSPHRASE_HOST_PROMPT,
            }));

            loop {
                match screen_message(&mut *this.link)? {
                    Some(HostMessage::PassphraseAck(ack)) => {
                        return Ok(ack.passphrase.unwrap_or_default());
                    }
                    Some(message) => ignore_message(&message, "passphrase request"),
                    None => this.link.sleep_ms(this.settings.tick_ms),
                }
            }
        })
    }
}

/// [`UnlockProgress`] that draws the backoff countdown and watches the host for an abort.
pub struct ProgressWait<'a> {
    link: &'a mut dyn HostLink,
    display: &'a mut dyn Display,
    aborted: Option<AbortReason>,
}

impl<'a> ProgressWait<'a> {
    pub fn new(link: &'a mut dyn HostLink, display: &'a mut dyn Display) -> Self {
        Self {
            link,
            display,
            aborted: None,
        }
    }

    /// Turn a recorded abort into an error, regardless of what the vault answered.
    pub fn finish(self) -> Result<(), ProtectError> {
        match self.aborted {
            Some(reason) => Err(ProtectError::ProtocolAborted(reason)),
            None => Ok(()),
        }
    }
}

impl UnlockProgress for ProgressWait<'_> {
    fn report(&mut self, wait_secs: u32, permille: u32, message: &str) -> bool {
        if self.aborted.is_some() {
            return true;
        }

        self.display.render(ViewContent::Progress(ProgressView {
            message,
            wait_secs,
            permille,
        }));

        match screen_message(&mut *self.link) {
            Err(reason) => {
                self.aborted = Some(reason);
                true
            }
            Ok(Some(message)) => {
                ignore_message(&message, "backoff");
                false
            }
            Ok(None) => false,
        }
    }
}
