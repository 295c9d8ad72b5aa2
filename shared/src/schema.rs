//! Messages exchanged with the host while a protected operation is in flight.
//!
//! Only the semantic payloads live here; framing and encoding belong to the transport. The
//! [`MessageType`] ids are the vocabulary a transport frames these payloads with. The firmware
//! only uses them to name messages in its logs.

use alloc::string::String;
use core::convert::TryFrom;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::secret::SecretString;

/// Numeric message identifiers used on the host link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum MessageType {
    Initialize = 0,
    Failure = 3,
    PinMatrixRequest = 18,
    PinMatrixAck = 19,
    Cancel = 20,
    ButtonRequest = 26,
    ButtonAck = 27,
    PassphraseRequest = 41,
    PassphraseAck = 42,
    DebugLinkDecision = 100,
    DebugLinkGetState = 101,
}

impl TryFrom<u16> for MessageType {
    type Error = SchemaError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::Initialize),
            3 => Ok(MessageType::Failure),
            18 => Ok(MessageType::PinMatrixRequest),
            19 => Ok(MessageType::PinMatrixAck),
            20 => Ok(MessageType::Cancel),
            26 => Ok(MessageType::ButtonRequest),
            27 => Ok(MessageType::ButtonAck),
            41 => Ok(MessageType::PassphraseRequest),
            42 => Ok(MessageType::PassphraseAck),
            100 => Ok(MessageType::DebugLinkDecision),
            101 => Ok(MessageType::DebugLinkGetState),
            other => Err(SchemaError::UnknownMessageType(other)),
        }
    }
}

impl From<MessageType> for u16 {
    fn from(value: MessageType) -> Self {
        value as u16
    }
}

/// Reason attached to a button confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum ButtonRequestType {
    Other = 1,
    ConfirmOutput = 3,
    ResetDevice = 4,
    WipeDevice = 6,
    ProtectCall = 7,
    SignTx = 8,
    Address = 10,
    PublicKey = 11,
}

/// Which PIN the host is being asked to relay through the scrambled matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum PinMatrixRequestType {
    Current = 1,
    NewFirst = 2,
    NewSecond = 3,
}

impl TryFrom<u16> for PinMatrixRequestType {
    type Error = SchemaError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PinMatrixRequestType::Current),
            2 => Ok(PinMatrixRequestType::NewFirst),
            3 => Ok(PinMatrixRequestType::NewSecond),
            other => Err(SchemaError::UnknownPinMatrixType(other)),
        }
    }
}

/// Failure codes reported to the host when a protected operation ends unsuccessfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum FailureType {
    ActionCancelled = 4,
    PinCancelled = 6,
    PinInvalid = 7,
    PinMismatch = 12,
}

impl TryFrom<u16> for FailureType {
    type Error = SchemaError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(FailureType::ActionCancelled),
            6 => Ok(FailureType::PinCancelled),
            7 => Ok(FailureType::PinInvalid),
            12 => Ok(FailureType::PinMismatch),
            other => Err(SchemaError::UnknownFailureType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRequest {
    pub code: ButtonRequestType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMatrixRequest {
    pub kind: PinMatrixRequestType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub code: FailureType,
    pub message: Option<String>,
}

impl Failure {
    pub fn new(code: FailureType) -> Self {
        Self {
            code,
            message: None,
        }
    }
}

/// Matrix positions typed by the user on the host keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMatrixAck {
    pub pin: SecretString,
}

/// Passphrase typed on the host; `None` when the host supplied nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassphraseAck {
    pub passphrase: Option<SecretString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLinkDecision {
    pub yes_no: bool,
}

/// Messages the device sends while protecting an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceMessage {
    ButtonRequest(ButtonRequest),
    PinMatrixRequest(PinMatrixRequest),
    PassphraseRequest,
    Failure(Failure),
}

/// Messages the host may deliver while the device waits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMessage {
    Initialize,
    Cancel,
    ButtonAck,
    PinMatrixAck(PinMatrixAck),
    PassphraseAck(PassphraseAck),
    DebugLinkDecision(DebugLinkDecision),
    DebugLinkGetState,
}

/// Resolve the message identifier of an outbound message.
pub fn message_type_for_device(message: &DeviceMessage) -> MessageType {
    match message {
        DeviceMessage::ButtonRequest(_) => MessageType::ButtonRequest,
        DeviceMessage::PinMatrixRequest(_) => MessageType::PinMatrixRequest,
        DeviceMessage::PassphraseRequest => MessageType::PassphraseRequest,
        DeviceMessage::Failure(_) => MessageType::Failure,
    }
}

/// Resolve the message identifier of an inbound message.
pub fn message_type_for_host(message: &HostMessage) -> MessageType {
    match message {
        HostMessage::Initialize => MessageType::Initialize,
        HostMessage::Cancel => MessageType::Cancel,
        HostMessage::ButtonAck => MessageType::ButtonAck,
        HostMessage::PinMatrixAck(_) => MessageType::PinMatrixAck,
        HostMessage::PassphraseAck(_) => MessageType::PassphraseAck,
        HostMessage::DebugLinkDecision(_) => MessageType::DebugLinkDecision,
        HostMessage::DebugLinkGetState => MessageType::DebugLinkGetState,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn message_ids_round_trip_through_u16() {
        for kind in [
            MessageType::Initialize,
            MessageType::Failure,
            MessageType::PinMatrixRequest,
            MessageType::PinMatrixAck,
            MessageType::Cancel,
            MessageType::ButtonRequest,
            MessageType::ButtonAck,
            MessageType::PassphraseRequest,
            MessageType::PassphraseAck,
            MessageType::DebugLinkDecision,
            MessageType::DebugLinkGetState,
        ] {
            assert_eq!(MessageType::try_from(u16::from(kind)), Ok(kind));
        }
    }

    #[test]
    fn unknown_ids_are_rejected() {
        assert_eq!(
            MessageType::try_from(55),
            Err(SchemaError::UnknownMessageType(55))
        );
        assert_eq!(
            FailureType::try_from(99),
            Err(SchemaError::UnknownFailureType(99))
        );
        assert_eq!(
            PinMatrixRequestType::try_from(0),
            Err(SchemaError::UnknownPinMatrixType(0))
        );
    }

    #[test]
    fn failure_codes_match_protocol_numbers() {
        assert_eq!(FailureType::PinCancelled as u16, 6);
        assert_eq!(FailureType::PinInvalid as u16, 7);
        assert_eq!(FailureType::PinMismatch as u16, 12);
        assert_eq!(FailureType::try_from(12), Ok(FailureType::PinMismatch));
    }

    #[test]
    fn message_tables_match_variants() {
        let request = DeviceMessage::PinMatrixRequest(PinMatrixRequest {
            kind: PinMatrixRequestType::NewFirst,
        });
        assert_eq!(message_type_for_device(&request), MessageType::PinMatrixRequest);

        let ack = HostMessage::PassphraseAck(PassphraseAck { passphrase: None });
        assert_eq!(message_type_for_host(&ack), MessageType::PassphraseAck);
        assert_eq!(message_type_for_host(&HostMessage::Cancel), MessageType::Cancel);
    }

    #[test]
    fn pin_ack_debug_is_redacted() {
        let ack = HostMessage::PinMatrixAck(PinMatrixAck {
            pin: SecretString::from("7391"),
        });
        assert!(!format!("{ack:?}").contains("7391"));
    }
}
