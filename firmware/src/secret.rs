//! Fixed-capacity buffers for PINs and passphrases that wipe themselves.
use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Longest PIN accepted from either entry path.
pub const MAX_PIN_LEN: usize = 50;
/// Longest passphrase accepted from either entry path.
pub const MAX_PASSPHRASE_LEN: usize = 50;

pub type PinBuffer = SecretBuffer<MAX_PIN_LEN>;
pub type PassphraseBuffer = SecretBuffer<MAX_PASSPHRASE_LEN>;

/// In-progress secret of at most `N` bytes.
///
/// The backing array is zero beyond `len` at all times, and the whole buffer is wiped on
/// `clear` and on drop. The type is not `Clone`.
pub struct SecretBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> SecretBuffer<N> {
    pub fn new() -> Self {
        #[cfg(test)]
        tracking::created();

        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Build a buffer from existing bytes, or `None` if they do not fit.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let mut buffer = Self::new();
        if buffer.extend_from_slice(data) {
            Some(buffer)
        } else {
            None
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Append one byte. Returns `false` and leaves the buffer untouched when full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.bytes[self.len] = byte;
        self.len += 1;
        true
    }

    /// Append all of `data`, or nothing at all when it would overflow.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> bool {
        if data.len() > N - self.len {
            return false;
        }
        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        true
    }

    /// Remove the last byte, zeroing its slot.
    pub fn pop(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.len -= 1;
        self.bytes[self.len] = 0;
        true
    }

    pub fn clear(&mut self) {
        self.zeroize();
    }

    /// Replace every occurrence of `from` with `to`.
    pub fn replace_byte(&mut self, from: u8, to: u8) {
        for byte in &mut self.bytes[..self.len] {
            if *byte == from {
                *byte = to;
            }
        }
    }

    /// Compare the complete contents of two buffers, including their lengths.
    ///
    /// Every byte of both arrays is visited so the comparison neither stops at the shorter
    /// secret nor leaks the position of the first difference.
    pub fn matches(&self, other: &Self) -> bool {
        let diff = self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .fold(0u8, |acc, (left, right)| acc | (left ^ right));
        diff == 0 && self.len == other.len
    }
}

impl<const N: usize> Default for SecretBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Zeroize for SecretBuffer<N> {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
        self.len.zeroize();
    }
}

impl<const N: usize> Drop for SecretBuffer<N> {
    fn drop(&mut self) {
        self.zeroize();

        #[cfg(test)]
        tracking::dropped(self.len == 0 && self.bytes.iter().all(|byte| *byte == 0));
    }
}

impl<const N: usize> ZeroizeOnDrop for SecretBuffer<N> {}

impl<const N: usize> fmt::Debug for SecretBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("len", &self.len)
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}
