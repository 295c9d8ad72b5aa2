use shared::schema::FailureType;

use super::{ProtectError, Protector};
use crate::input::{PASSPHRASE_ALPHABET, SPACE_PLACEHOLDER};
use crate::secret::PassphraseBuffer;
use crate::ui::{DialogView, ViewContent};

const INTRO: [&str; 4] = [
    "You are about to enter",
    "the passphrase.",
    "Select how many times",
    "you'd like to do it.",
];

const REPEAT_ADVICE: [&str; 3] = [
    "If you are creating a new",
    "wallet, it is advised",
    "that you select Twice.",
];

const INSTRUCTIONS: [&str; 5] = [
    "Enter the passphrase",
    "on the next screen.",
    "- Single button: scroll.",
    "- Hold: auto-scroll.",
    "- Both buttons: confirm.",
];

const REENTER: [&str; 1] = ["Re-enter the passphrase."];

const CONFIRM_HEADING: &str = "Confirm passphrase:";
const MISMATCH_HEADING: &str = "Passphrases mismatched:";
const CONFIRMED_HEADING: &str = "Passphrase confirmed:";

impl Protector<'_> {
    /// Make sure the session holds a passphrase when the device is configured to use one.
    ///
    /// A passphrase typed on the host is cached as received. One entered on the device can be
    /// entered twice for confirmation, and is only cached after a final review.
    ///
    /// Any abort is reported to the host as `ActionCancelled`.
    pub fn protect_passphrase(&mut self) -> Result<(), ProtectError> {
        self.begin();
        let result = self.obtain_passphrase();
        self.conclude_with(result, |_| FailureType::ActionCancelled)
    }

    fn obtain_passphrase(&mut self) -> Result<(), ProtectError> {
        if !self.config.passphrase_protection() || self.session.is_passphrase_cached() {
            log::debug!("no passphrase prompt needed");
            return Ok(());
        }

        if self.text_input_on_device()? {
            self.passphrase_on_device()
        } else {
            self.passphrase_from_host()
        }
    }

    fn passphrase_from_host(&mut self) -> Result<(), ProtectError> {
        let passphrase = self.request_passphrase_host()?;
        self.session.cache_passphrase(passphrase.as_bytes());
        drop(passphrase);

        log::info!("passphrase received from host");
        self.display.render(ViewContent::Home);
        Ok(())
    }

    fn passphrase_on_device(&mut self) -> Result<(), ProtectError> {
        self.show_next(&INTRO)?;

        self.display.render(ViewContent::Dialog(DialogView {
            icon: None,
            left: Some("Twice"),
            right: Some("Once"),
            lines: &REPEAT_ADVICE,
        }));
        let twice = !self.wait_for_choice()?;

        self.show_next(&INSTRUCTIONS)?;

        let mut passphrase = PassphraseBuffer::new();
        loop {
            self.enter_text(&PASSPHRASE_ALPHABET, &mut passphrase)?;
            if self.check_input(CONFIRM_HEADING, &passphrase, true, true)? {
                break;
            }
        }

        if twice {
            let mut repeat = PassphraseBuffer::new();
            self.show_next(&REENTER)?;

            loop {
                self.enter_text(&PASSPHRASE_ALPHABET, &mut repeat)?;
                if passphrase.matches(&repeat) {
                    break;
                }
                log::warn!("passphrase entries differ");
                self.check_input(MISMATCH_HEADING, &repeat, true, false)?;
            }
        }

        self.check_input(CONFIRMED_HEADING, &passphrase, false, true)?;

        passphrase.replace_byte(SPACE_PLACEHOLDER, b' ');
        self.session.cache_passphrase(passphrase.as_bytes());
        drop(passphrase);

        log::info!("passphrase entered on device (twice: {twice})");
        self.display.render(ViewContent::Home);
        Ok(())
    }
}
