//! Scripted collaborators for driving the protection flows without hardware.
//!
//! Button presses are scripted as frames of raw levels, host replies are queued per request,
//! and every screen is recorded as a summary that never contains entered secrets.

use alloc::{
    collections::VecDeque,
    string::{String, ToString},
    vec::Vec,
};

use rand_core::RngCore;
use shared::schema::{DeviceMessage, FailureType, HostMessage};

use super::{ConfigStore, HostLink, PinMatrix, Protector, Services, SessionCache, UnlockProgress};
use crate::buttons::{ButtonPins, RawButtons};
use crate::input::{EntryAlphabet, SPACE_PLACEHOLDER, Symbol};
use crate::ui::{Display, ViewContent};

/// Polls answered before a scripted link gives up and cancels the running flow.
pub const DEFAULT_POLL_LIMIT: usize = 200_000;

/// Message shown by [`MemoryConfig`] while it delays an unlock.
pub const BACKOFF_MESSAGE: &str = "Verifying PIN";

/// Random source that always yields the same value.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedRng {
    value: u32,
}

impl FixedRng {
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    /// Picker index every reseed lands on for `alphabet`.
    pub fn seed_for(&self, alphabet: &EntryAlphabet) -> usize {
        self.value as usize % alphabet.len()
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.value
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.value)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Matrix positions a host would relay for `pin` when the device uses `rng`.
///
/// Digits missing from the matrix (`0`) are relayed as an out-of-range position.
pub fn matrix_positions(rng: FixedRng, pin: &str) -> String {
    let mut rng = rng;
    let matrix = PinMatrix::shuffled(&mut rng);
    pin.bytes()
        .map(|digit| {
            (b'1'..=b'9')
                .find(|position| matrix.digit_at(*position) == digit)
                .map(char::from)
                .unwrap_or('0')
        })
        .collect()
}

/// Vault configuration kept in memory.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    pin: Vec<u8>,
    passphrase_protection: bool,
    backoff_secs: u32,
    unlock_attempts: Vec<Vec<u8>>,
    changes: Vec<(Vec<u8>, Vec<u8>)>,
    progress_reports: usize,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pin(mut self, pin: &str) -> Self {
        self.pin = pin.as_bytes().to_vec();
        self
    }

    pub fn with_passphrase_protection(mut self) -> Self {
        self.passphrase_protection = true;
        self
    }

    /// Delay every unlock and PIN change by `secs`, reporting once per second.
    pub fn with_backoff(mut self, secs: u32) -> Self {
        self.backoff_secs = secs;
        self
    }

    pub fn pin(&self) -> &[u8] {
        &self.pin
    }

    /// PINs passed to [`ConfigStore::unlock`], in call order.
    pub fn unlock_attempts(&self) -> &[Vec<u8>] {
        &self.unlock_attempts
    }

    /// Successful `(old, new)` PIN changes, in call order.
    pub fn changes(&self) -> &[(Vec<u8>, Vec<u8>)] {
        &self.changes
    }

    pub fn progress_reports(&self) -> usize {
        self.progress_reports
    }

    /// Run the configured delay. Returns `true` when the caller asked to stop.
    fn back_off(&mut self, progress: &mut dyn UnlockProgress) -> bool {
        let total = self.backoff_secs;
        for elapsed in 0..total {
            self.progress_reports += 1;
            let permille = elapsed * 1000 / total;
            if progress.report(total - elapsed, permille, BACKOFF_MESSAGE) {
                return true;
            }
        }
        false
    }
}

impl ConfigStore for MemoryConfig {
    fn has_pin(&self) -> bool {
        !self.pin.is_empty()
    }

    fn unlock(&mut self, pin: &[u8], progress: &mut dyn UnlockProgress) -> bool {
        self.unlock_attempts.push(pin.to_vec());
        if self.back_off(progress) {
            return false;
        }
        pin == self.pin.as_slice()
    }

    fn change_pin(&mut self, old: &[u8], new: &[u8], progress: &mut dyn UnlockProgress) -> bool {
        if self.back_off(progress) || old != self.pin.as_slice() {
            return false;
        }
        self.changes.push((old.to_vec(), new.to_vec()));
        self.pin = new.to_vec();
        true
    }

    fn passphrase_protection(&self) -> bool {
        self.passphrase_protection
    }
}

/// Session state kept in memory.
#[derive(Debug, Default)]
pub struct MemorySession {
    unlocked: bool,
    preference: Option<bool>,
    passphrase: Option<Vec<u8>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlocked(mut self) -> Self {
        self.unlocked = true;
        self
    }

    pub fn with_text_input(mut self, on_device: bool) -> Self {
        self.preference = Some(on_device);
        self
    }

    pub fn with_cached_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = Some(passphrase.as_bytes().to_vec());
        self
    }

    pub fn passphrase(&self) -> Option<&[u8]> {
        self.passphrase.as_deref()
    }
}

impl SessionCache for MemorySession {
    fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    fn text_input_preference(&self) -> Option<bool> {
        self.preference
    }

    fn set_text_input_preference(&mut self, on_device: bool) {
        self.preference = Some(on_device);
    }

    fn cache_passphrase(&mut self, passphrase: &[u8]) {
        self.passphrase = Some(passphrase.to_vec());
    }

    fn is_passphrase_cached(&self) -> bool {
        self.passphrase.is_some()
    }
}

/// Host link that answers each request with a queued batch of messages.
#[derive(Debug)]
pub struct ScriptedLink {
    replies: VecDeque<Vec<HostMessage>>,
    inbox: VecDeque<HostMessage>,
    interrupt: Option<(usize, HostMessage)>,
    polls: usize,
    poll_limit: usize,
    exhausted: bool,
    sent: Vec<DeviceMessage>,
    tiny: Vec<bool>,
    tiny_enabled: bool,
    debug_states: usize,
    slept_ms: u64,
}

impl Default for ScriptedLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            inbox: VecDeque::new(),
            interrupt: None,
            polls: 0,
            poll_limit: DEFAULT_POLL_LIMIT,
            exhausted: false,
            sent: Vec::new(),
            tiny: Vec::new(),
            tiny_enabled: false,
            debug_states: 0,
            slept_ms: 0,
        }
    }

    /// Queue the messages delivered after the next request the device sends.
    pub fn reply(mut self, messages: Vec<HostMessage>) -> Self {
        self.replies.push_back(messages);
        self
    }

    /// Queue messages available before any request is sent.
    pub fn with_inbox(mut self, message: HostMessage) -> Self {
        self.inbox.push_back(message);
        self
    }

    /// Deliver `message` on the first poll after `polls` polls, ahead of anything queued.
    pub fn interrupt_after(mut self, polls: usize, message: HostMessage) -> Self {
        self.interrupt = Some((polls, message));
        self
    }

    pub fn with_poll_limit(mut self, limit: usize) -> Self {
        self.poll_limit = limit;
        self
    }

    pub fn sent(&self) -> &[DeviceMessage] {
        &self.sent
    }

    pub fn failures(&self) -> Vec<FailureType> {
        self.sent
            .iter()
            .filter_map(|message| match message {
                DeviceMessage::Failure(failure) => Some(failure.code),
                _ => None,
            })
            .collect()
    }

    /// Every tiny-mode switch, in order.
    pub fn tiny_history(&self) -> &[bool] {
        &self.tiny
    }

    pub fn tiny_enabled(&self) -> bool {
        self.tiny_enabled
    }

    pub fn debug_states_served(&self) -> usize {
        self.debug_states
    }

    /// Whether the poll limit was reached and a `Cancel` was forced.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn slept_ms(&self) -> u64 {
        self.slept_ms
    }
}

impl HostLink for ScriptedLink {
    fn send(&mut self, message: DeviceMessage) {
        if !matches!(message, DeviceMessage::Failure(_))
            && let Some(batch) = self.replies.pop_front()
        {
            self.inbox.extend(batch);
        }
        self.sent.push(message);
    }

    fn poll(&mut self) -> Option<HostMessage> {
        self.polls += 1;

        let due = matches!(&self.interrupt, Some((after, _)) if self.polls > *after);
        if due && let Some((_, message)) = self.interrupt.take() {
            return Some(message);
        }

        if self.polls > self.poll_limit {
            self.exhausted = true;
            return Some(HostMessage::Cancel);
        }

        self.inbox.pop_front()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.slept_ms += u64::from(ms);
    }

    fn set_tiny(&mut self, enabled: bool) {
        self.tiny_enabled = enabled;
        self.tiny.push(enabled);
    }

    fn serve_debug_state(&mut self) {
        self.debug_states += 1;
    }
}

/// Button pins replaying scripted frames, then reporting both buttons released.
#[derive(Debug, Default)]
pub struct ScriptedPins {
    frames: VecDeque<RawButtons>,
    reads: usize,
}

impl ScriptedPins {
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ButtonPins for ScriptedPins {
    fn read(&mut self) -> RawButtons {
        self.reads += 1;
        self.frames.pop_front().unwrap_or(RawButtons::RELEASED)
    }
}

/// Builder for scripted button gestures.
///
/// Every gesture ends with the buttons released, so gestures can be chained freely.
#[derive(Clone, Debug, Default)]
pub struct ButtonScript {
    frames: Vec<RawButtons>,
}

impl ButtonScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short press and release of "yes".
    pub fn yes(mut self) -> Self {
        self.frames.extend([RawButtons::YES, RawButtons::RELEASED]);
        self
    }

    /// Short press and release of "no".
    pub fn no(mut self) -> Self {
        self.frames.extend([RawButtons::NO, RawButtons::RELEASED]);
        self
    }

    /// Both buttons pressed together, then released long enough to settle.
    pub fn both(mut self) -> Self {
        self.frames.extend([
            RawButtons::BOTH,
            RawButtons::RELEASED,
            RawButtons::RELEASED,
            RawButtons::RELEASED,
        ]);
        self
    }

    pub fn idle(mut self, ticks: usize) -> Self {
        self.frames
            .extend(core::iter::repeat_n(RawButtons::RELEASED, ticks));
        self
    }

    /// Scroll from `from` to `to` the short way round, then confirm.
    pub fn pick(mut self, alphabet: &EntryAlphabet, from: usize, to: usize) -> Self {
        let len = alphabet.len();
        let forward = (to + len - from) % len;
        let backward = (len - forward) % len;
        if forward <= backward {
            for _ in 0..forward {
                self = self.yes();
            }
        } else {
            for _ in 0..backward {
                self = self.no();
            }
        }
        self.both()
    }

    /// Type `text` with the cursor reseeded to `seed` after every entry.
    pub fn type_text(mut self, alphabet: &EntryAlphabet, seed: usize, text: &str) -> Self {
        for byte in text.bytes() {
            let wanted = if byte == b' ' { SPACE_PLACEHOLDER } else { byte };
            let index = alphabet
                .symbols()
                .iter()
                .position(|symbol| symbol.byte() == Some(wanted))
                .expect("character missing from alphabet");
            self = self.pick(alphabet, seed, index);
        }
        self
    }

    /// Erase the last character.
    pub fn backspace(self, alphabet: &EntryAlphabet, seed: usize) -> Self {
        let index = alphabet
            .symbols()
            .iter()
            .position(|symbol| *symbol == Symbol::Backspace)
            .expect("alphabet has no backspace");
        self.pick(alphabet, seed, index)
    }

    /// Accept the entered text with the `Done` entry nearest to `seed`.
    pub fn finish(self, alphabet: &EntryAlphabet, seed: usize) -> Self {
        let index = alphabet.find_done(seed).expect("alphabet has no done entry");
        self.pick(alphabet, seed, index)
    }

    /// Type `text`, finish it and accept the review screen.
    pub fn enter(self, alphabet: &EntryAlphabet, seed: usize, text: &str) -> Self {
        self.type_text(alphabet, seed, text)
            .finish(alphabet, seed)
            .yes()
    }

    pub fn build(self) -> ScriptedPins {
        ScriptedPins {
            frames: self.frames.into(),
            reads: 0,
        }
    }
}

/// Non-secret summary of a rendered screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Dialog {
        lines: Vec<String>,
        left: Option<String>,
        right: Option<String>,
    },
    Picker {
        cursor: usize,
        group: Option<usize>,
        entered: usize,
    },
    CheckInput {
        heading: String,
        entered: usize,
        allow_edit: bool,
        allow_done: bool,
    },
    PinMatrix {
        prompt: String,
    },
    Progress {
        message: String,
        countdown: String,
        permille: u32,
    },
    Home,
}

/// Display that keeps a summary of each distinct consecutive screen.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    screens: Vec<Screen>,
}

impl RecordingDisplay {
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Headings of the review screens shown, in order.
    pub fn check_headings(&self) -> Vec<&str> {
        self.screens
            .iter()
            .filter_map(|screen| match screen {
                Screen::CheckInput { heading, .. } => Some(heading.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether any dialog contained `line`.
    pub fn showed_line(&self, line: &str) -> bool {
        self.screens.iter().any(|screen| match screen {
            Screen::Dialog { lines, .. } => lines.iter().any(|shown| shown == line),
            _ => false,
        })
    }

    /// Highlighted picker groups, in the order the cursor entered them.
    pub fn picker_groups(&self) -> Vec<usize> {
        let mut groups: Vec<usize> = Vec::new();
        for screen in &self.screens {
            if let Screen::Picker {
                group: Some(group), ..
            } = screen
                && groups.last() != Some(group)
            {
                groups.push(*group);
            }
        }
        groups
    }

    pub fn last(&self) -> Option<&Screen> {
        self.screens.last()
    }
}

impl Display for RecordingDisplay {
    fn render(&mut self, content: ViewContent<'_>) {
        let screen = match content {
            ViewContent::Dialog(dialog) => Screen::Dialog {
                lines: dialog.lines.iter().map(|line| line.to_string()).collect(),
                left: dialog.left.map(String::from),
                right: dialog.right.map(String::from),
            },
            ViewContent::Scroll(picker) => Screen::Picker {
                cursor: picker.cursor,
                group: picker.active_group(),
                entered: picker.text.len(),
            },
            ViewContent::CheckInput(check) => Screen::CheckInput {
                heading: String::from(check.heading),
                entered: check.text.len(),
                allow_edit: check.allow_edit,
                allow_done: check.allow_done,
            },
            ViewContent::PinMatrix(matrix) => Screen::PinMatrix {
                prompt: String::from(matrix.prompt),
            },
            ViewContent::Progress(progress) => Screen::Progress {
                message: String::from(progress.message),
                countdown: progress.countdown_label(),
                permille: progress.bar_permille(),
            },
            ViewContent::Home => Screen::Home,
        };

        if self.screens.last() != Some(&screen) {
            self.screens.push(screen);
        }
    }
}

/// Owns one of each scripted collaborator and lends them to a [`Protector`].
#[derive(Debug, Default)]
pub struct Harness {
    pub config: MemoryConfig,
    pub session: MemorySession,
    pub link: ScriptedLink,
    pub pins: ScriptedPins,
    pub display: RecordingDisplay,
    pub rng: FixedRng,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: MemoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_session(mut self, session: MemorySession) -> Self {
        self.session = session;
        self
    }

    pub fn with_link(mut self, link: ScriptedLink) -> Self {
        self.link = link;
        self
    }

    pub fn with_buttons(mut self, script: ButtonScript) -> Self {
        self.pins = script.build();
        self
    }

    pub fn with_rng(mut self, rng: FixedRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn protector(&mut self) -> Protector<'_> {
        Protector::new(Services {
            config: &mut self.config,
            session: &mut self.session,
            link: &mut self.link,
            buttons: &mut self.pins,
            display: &mut self.display,
            rng: &mut self.rng,
        })
    }
}
