//! Credential text carried inside host messages.

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Relayed PIN positions or a passphrase typed on the host.
///
/// The text is wiped when dropped and never shown by `Debug`. It serializes as a plain string.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString {
    text: Zeroizing<String>,
}

impl SecretString {
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(text: String) -> Self {
        Self {
            text: Zeroizing::new(text),
        }
    }
}

impl From<&str> for SecretString {
    fn from(text: &str) -> Self {
        Self::from(String::from(text))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(<{} bytes redacted>)", self.len())
    }
}
