use shared::schema::PinMatrixRequestType;

use super::{ProgressWait, ProtectError, Protector};
use crate::input::PIN_ALPHABET;
use crate::secret::PinBuffer;

/// Wording for one of the three PINs a flow can ask for.
struct PinPrompt {
    kind: PinMatrixRequestType,
    host: &'static str,
    device: &'static str,
}

const CURRENT_PIN: PinPrompt = PinPrompt {
    kind: PinMatrixRequestType::Current,
    host: "Please enter current PIN:",
    device: "Please enter current PIN",
};

const NEW_PIN: PinPrompt = PinPrompt {
    kind: PinMatrixRequestType::NewFirst,
    host: "Please enter new PIN:",
    device: "Please enter new PIN",
};

const REPEAT_PIN: PinPrompt = PinPrompt {
    kind: PinMatrixRequestType::NewSecond,
    host: "Please re-enter new PIN:",
    device: "Please re-enter new PIN",
};

const CHECK_PIN_HEADING: &str = "Confirm PIN:";

impl Protector<'_> {
    /// Unlock the session with the configured PIN.
    ///
    /// With `use_cached`, an already unlocked session passes without prompting. A device without
    /// a PIN is unlocked with the empty PIN.
    pub fn protect_pin(&mut self, use_cached: bool) -> Result<(), ProtectError> {
        self.begin();
        let result = self.unlock_with_pin(use_cached);
        self.conclude(result)
    }

    /// Set, replace or remove the PIN.
    ///
    /// When a PIN is configured the current one is collected first. It is verified up front
    /// unless `removal` is set, in which case the vault checks it while removing.
    pub fn protect_change_pin(&mut self, removal: bool) -> Result<(), ProtectError> {
        self.begin();
        let result = self.replace_pin(removal);
        self.conclude(result)
    }

    fn unlock_with_pin(&mut self, use_cached: bool) -> Result<(), ProtectError> {
        if use_cached && self.session.is_unlocked() {
            log::debug!("session already unlocked");
            return Ok(());
        }

        let mut pin = PinBuffer::new();
        if self.config.has_pin() {
            let on_device = self.text_input_on_device()?;
            self.collect_pin(on_device, &CURRENT_PIN, &mut pin)?;
        }

        let unlocked = self.unlock_vault(&pin);
        drop(pin);

        if !unlocked? {
            log::warn!("PIN rejected");
            return Err(ProtectError::CredentialInvalid);
        }
        log::info!("session unlocked");
        Ok(())
    }

    fn replace_pin(&mut self, removal: bool) -> Result<(), ProtectError> {
        let on_device = self.text_input_on_device()?;

        let mut old = PinBuffer::new();
        if self.config.has_pin() {
            self.collect_pin(on_device, &CURRENT_PIN, &mut old)?;

            if !removal && !self.with_tiny(|this| this.unlock_vault(&old))? {
                log::warn!("current PIN rejected");
                return Err(ProtectError::CredentialInvalid);
            }
        }

        let mut new = PinBuffer::new();
        if !removal {
            self.collect_pin(on_device, &NEW_PIN, &mut new)?;

            let mut repeat = PinBuffer::new();
            self.collect_pin(on_device, &REPEAT_PIN, &mut repeat)?;
            if !new.matches(&repeat) {
                log::warn!("new PIN entries differ");
                return Err(ProtectError::CredentialMismatch);
            }
        }

        let mut progress = ProgressWait::new(&mut *self.link, &mut *self.display);
        let changed = self
            .config
            .change_pin(old.as_bytes(), new.as_bytes(), &mut progress);
        progress.finish()?;

        if !changed {
            log::warn!("PIN change refused");
            return Err(ProtectError::CredentialInvalid);
        }
        log::info!("PIN updated (removal: {removal})");
        Ok(())
    }

    /// Ask the vault to unlock with `pin`, showing any backoff it imposes.
    fn unlock_vault(&mut self, pin: &PinBuffer) -> Result<bool, ProtectError> {
        let mut progress = ProgressWait::new(&mut *self.link, &mut *self.display);
        let unlocked = self.config.unlock(pin.as_bytes(), &mut progress);
        progress.finish()?;
        Ok(unlocked)
    }

    fn collect_pin(
        &mut self,
        on_device: bool,
        prompt: &PinPrompt,
        pin: &mut PinBuffer,
    ) -> Result<(), ProtectError> {
        if on_device {
            return self.request_pin_device(prompt.device, pin);
        }

        self.request_pin_host(prompt.kind, prompt.host, pin)?;
        if pin.is_empty() {
            log::debug!("host relayed an empty PIN for {:?}", prompt.kind);
            return Err(ProtectError::UserCancelled);
        }
        Ok(())
    }

    /// Collect a PIN with the picker, looping until the review screen accepts it.
    fn request_pin_device(&mut self, intro: &str, pin: &mut PinBuffer) -> Result<(), ProtectError> {
        pin.clear();
        self.show_next(&[intro, "on the next screen."])?;

        loop {
            self.enter_text(&PIN_ALPHABET, pin)?;
            if self.check_input(CHECK_PIN_HEADING, pin, true, true)? {
                return Ok(());
            }
        }
    }
}
