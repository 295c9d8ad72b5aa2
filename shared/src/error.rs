use thiserror::Error;

/// Errors raised while mapping raw protocol identifiers onto the message vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown message type {0}")]
    UnknownMessageType(u16),
    #[error("unknown failure code {0}")]
    UnknownFailureType(u16),
    #[error("unknown PIN matrix request type {0}")]
    UnknownPinMatrixType(u16),
}
