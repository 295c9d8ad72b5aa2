//! Device-side waits and on-device text entry.

use super::{ProtectError, Protector, ignore_message, screen_message};
use crate::buttons::{ButtonSample, RepeatDetector};
use crate::input::{EntryAlphabet, ScrollStep, TextScroller};
use crate::secret::SecretBuffer;
use crate::ui::{CheckInputView, DialogIcon, DialogView, ViewContent};

const TEXT_INPUT_PROMPT: [&str; 2] = ["Do you like to use", "on-device text input?"];

impl Protector<'_> {
    /// Sleep one tick, sample the buttons and screen the host link.
    pub(super) fn tick(&mut self) -> Result<ButtonSample, ProtectError> {
        self.link.sleep_ms(self.settings.tick_ms);
        let sample = self.buttons.update(self.pins.read());
        if let Some(message) = screen_message(&mut *self.link)? {
            ignore_message(&message, "device wait");
        }
        Ok(sample)
    }

    /// Fold the current pin levels in so stale edges are not reported by the next wait.
    pub(super) fn reset_buttons(&mut self) {
        self.buttons.update(self.pins.read());
        self.repeat = RepeatDetector::new();
    }

    pub(super) fn wait_for_idle(&mut self) -> Result<(), ProtectError> {
        loop {
            if self.tick()?.is_idle() {
                return Ok(());
            }
        }
    }

    pub(super) fn wait_for_yes_up(&mut self) -> Result<(), ProtectError> {
        self.reset_buttons();
        loop {
            if self.tick()?.yes_up {
                return Ok(());
            }
        }
    }

    /// `true` on a "yes" release, `false` on a "no" release.
    pub(super) fn wait_for_choice(&mut self) -> Result<bool, ProtectError> {
        self.reset_buttons();
        loop {
            let sample = self.tick()?;
            if sample.yes_up {
                return Ok(true);
            }
            if sample.no_up {
                return Ok(false);
            }
        }
    }

    /// Show an informational dialog and wait for "yes".
    pub(super) fn show_next(&mut self, lines: &[&str]) -> Result<(), ProtectError> {
        self.display
            .render(ViewContent::Dialog(DialogView::next(lines)));
        self.wait_for_yes_up()
    }

    /// Resolve whether text is entered on the device, prompting when not cached yet.
    pub(super) fn text_input_on_device(&mut self) -> Result<bool, ProtectError> {
        if let Some(on_device) = self.session.text_input_preference() {
            return Ok(on_device);
        }

        self.display.render(ViewContent::Dialog(DialogView {
            icon: Some(DialogIcon::Question),
            left: Some("Cancel"),
            right: Some("Confirm"),
            lines: &TEXT_INPUT_PROMPT,
        }));
        let on_device = self.wait_for_choice()?;
        self.session.set_text_input_preference(on_device);
        log::debug!("text input preference stored (on device: {on_device})");
        Ok(on_device)
    }

    /// Drive the picker until an entry is committed or the text is finished.
    fn scroll<const N: usize>(
        &mut self,
        scroller: &mut TextScroller,
        buffer: &mut SecretBuffer<N>,
    ) -> Result<ScrollStep, ProtectError> {
        loop {
            self.display
                .render(ViewContent::Scroll(scroller.view(buffer)));

            let sample = self.tick()?;
            let event = self.repeat.step(&sample);
            let step = scroller.step(event, buffer);
            if event.confirm {
                self.wait_for_idle()?;
            }

            match step {
                ScrollStep::Committed(_) | ScrollStep::Done => return Ok(step),
                step if step.needs_reseed() => scroller.reseed(&mut *self.rng, buffer),
                _ => {}
            }
        }
    }

    /// Append picker entries to `buffer` until `Done` is accepted.
    pub(super) fn enter_text<const N: usize>(
        &mut self,
        alphabet: &'static EntryAlphabet,
        buffer: &mut SecretBuffer<N>,
    ) -> Result<(), ProtectError> {
        let mut scroller = TextScroller::new(alphabet, &self.settings);
        self.reset_buttons();

        loop {
            scroller.reseed(&mut *self.rng, buffer);
            if self.scroll(&mut scroller, buffer)? == ScrollStep::Done {
                return Ok(());
            }
        }
    }

    /// Review screen. `true` when accepted with "yes", `false` when sent back with "no".
    pub(super) fn check_input<const N: usize>(
        &mut self,
        heading: &str,
        buffer: &SecretBuffer<N>,
        allow_edit: bool,
        allow_done: bool,
    ) -> Result<bool, ProtectError> {
        self.display.render(ViewContent::CheckInput(CheckInputView {
            heading,
            text: buffer.as_bytes(),
            allow_edit,
            allow_done,
        }));

        self.reset_buttons();
        loop {
            let sample = self.tick()?;
            if allow_done && sample.yes_up {
                return Ok(true);
            }
            if allow_edit && sample.no_up {
                return Ok(false);
            }
        }
    }
}
