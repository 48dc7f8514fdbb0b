//! Error types for mf-core

extern crate alloc;

use alloc::string::String;
use core::fmt;

use crate::command::CommandCode;

/// Returned by [`Producer::push`](crate::Producer::push) when the ring buffer is full.
///
/// The rejected byte is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOverflow;

impl fmt::Display for BufferOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ring buffer full, byte dropped")
    }
}

/// Error raised by the underlying byte transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link is gone (port unplugged, pipe closed)
    ConnectionLost,
    /// A read failed
    ReadFailed(String),
    /// A write or flush failed
    WriteFailed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionLost => write!(f, "Connection lost"),
            TransportError::ReadFailed(msg) => write!(f, "Read failed: {msg}"),
            TransportError::WriteFailed(msg) => write!(f, "Write failed: {msg}"),
        }
    }
}

/// Error returned by a command handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// A required positional argument is absent
    MissingArgument { index: usize },
    /// An argument is present but could not be interpreted
    InvalidArgument { index: usize, value: String },
    /// Writing the handler's response failed
    Transport(TransportError),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::MissingArgument { index } => {
                write!(f, "Missing argument {index}")
            }
            HandlerError::InvalidArgument { index, value } => {
                write!(f, "Invalid argument {index}: {value:?}")
            }
            HandlerError::Transport(err) => write!(f, "Transport error: {err}"),
        }
    }
}

impl From<TransportError> for HandlerError {
    fn from(err: TransportError) -> Self {
        HandlerError::Transport(err)
    }
}

/// Protocol-level condition reported by the consumer loop.
///
/// Only [`ProtocolError::TransportFailure`] is fatal; the others drop the
/// offending byte or message and processing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A byte was rejected because the ring buffer was full
    BufferOverflow,
    /// The command code of a framed message is not an integer (or the
    /// message outgrew the pending buffer bound)
    MalformedMessage(String),
    /// No handler is registered for the code
    UnknownCommand(i32),
    /// A handler failed while processing a message
    HandlerFailure {
        code: CommandCode,
        reason: HandlerError,
    },
    /// The underlying read or write failed
    TransportFailure(TransportError),
}

impl ProtocolError {
    /// Whether this condition terminates both execution contexts
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProtocolError::TransportFailure(_))
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::BufferOverflow => write!(f, "Buffer overflow"),
            ProtocolError::MalformedMessage(msg) => write!(f, "Malformed message: {msg:?}"),
            ProtocolError::UnknownCommand(code) => write!(f, "Unknown command: {code}"),
            ProtocolError::HandlerFailure { code, reason } => {
                write!(f, "Handler for {code:?} failed: {reason}")
            }
            ProtocolError::TransportFailure(err) => write!(f, "Transport failure: {err}"),
        }
    }
}

impl From<BufferOverflow> for ProtocolError {
    fn from(_: BufferOverflow) -> Self {
        ProtocolError::BufferOverflow
    }
}

impl From<TransportError> for ProtocolError {
    fn from(err: TransportError) -> Self {
        ProtocolError::TransportFailure(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferOverflow {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for HandlerError {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_only_transport_failure_is_fatal() {
        assert!(ProtocolError::TransportFailure(TransportError::ConnectionLost).is_fatal());
        assert!(!ProtocolError::BufferOverflow.is_fatal());
        assert!(!ProtocolError::MalformedMessage("x".to_string()).is_fatal());
        assert!(!ProtocolError::UnknownCommand(9999).is_fatal());
        assert!(
            !ProtocolError::HandlerFailure {
                code: CommandCode::GetInfo,
                reason: HandlerError::MissingArgument { index: 0 },
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ProtocolError::UnknownCommand(42).to_string(),
            "Unknown command: 42"
        );
        assert_eq!(
            TransportError::ReadFailed("eof".to_string()).to_string(),
            "Read failed: eof"
        );
    }
}
