use core::fmt;

use shared::schema::{FailureType, HostMessage};
use thiserror::Error;

/// Unsolicited host message that interrupted a protected operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    Cancel,
    Initialize,
}

impl AbortReason {
    /// Abort carried by `message`, if it is one.
    pub fn from_message(message: &HostMessage) -> Option<Self> {
        match message {
            HostMessage::Cancel => Some(AbortReason::Cancel),
            HostMessage::Initialize => Some(AbortReason::Initialize),
            _ => None,
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Cancel => f.write_str("cancel"),
            AbortReason::Initialize => f.write_str("initialize"),
        }
    }
}

/// Terminal outcome of a protected operation that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtectError {
    #[error("entry cancelled by the user")]
    UserCancelled,
    #[error("aborted by host {0} message")]
    ProtocolAborted(AbortReason),
    #[error("credential rejected")]
    CredentialInvalid,
    #[error("entered credentials do not match")]
    CredentialMismatch,
}

impl ProtectError {
    /// Failure code reported to the host when a PIN operation ends with this error.
    pub fn failure_type(&self) -> FailureType {
        match self {
            ProtectError::UserCancelled | ProtectError::ProtocolAborted(_) => {
                FailureType::PinCancelled
            }
            ProtectError::CredentialInvalid => FailureType::PinInvalid,
            ProtectError::CredentialMismatch => FailureType::PinMismatch,
        }
    }

    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            ProtectError::ProtocolAborted(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<AbortReason> for ProtectError {
    fn from(reason: AbortReason) -> Self {
        ProtectError::ProtocolAborted(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_codes_follow_error_kind() {
        assert_eq!(
            ProtectError::UserCancelled.failure_type(),
            FailureType::PinCancelled
        );
        assert_eq!(
            ProtectError::CredentialInvalid.failure_type(),
            FailureType::PinInvalid
        );
        assert_eq!(
            ProtectError::CredentialMismatch.failure_type(),
            FailureType::PinMismatch
        );
    }

    #[test]
    fn both_abort_reasons_report_pin_cancelled() {
        for reason in [AbortReason::Cancel, AbortReason::Initialize] {
            assert_eq!(
                ProtectError::ProtocolAborted(reason).failure_type(),
                FailureType::PinCancelled
            );
        }
    }

    #[test]
    fn abort_reasons_come_from_cancel_and_initialize_only() {
        assert_eq!(
            AbortReason::from_message(&HostMessage::Cancel),
            Some(AbortReason::Cancel)
        );
        assert_eq!(
            AbortReason::from_message(&HostMessage::Initialize),
            Some(AbortReason::Initialize)
        );
        assert_eq!(AbortReason::from_message(&HostMessage::ButtonAck), None);
    }

    #[test]
    fn display_names_the_abort() {
        let error = ProtectError::from(AbortReason::Initialize);
        assert_eq!(error.to_string(), "aborted by host initialize message");
    }
}
