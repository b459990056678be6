//! # Error Types
//!
//! Error handling for the RCON console client.
//!
//! Every variant maps onto one [`ErrorKind`] through [`RconError::kind`], so callers
//! can branch on the category without matching every detailed variant.
//!
//! ## Error Categories
//! - **Connection**: TCP connect failed or timed out, or the handshake broke off
//! - **Auth**: The server rejected the password or does not speak RCON
//! - **Protocol**: Malformed frames or a desynchronized request/response stream
//! - **Io**: Read/write failures, timeouts, and premature peer close mid-exchange
//! - **InvalidInput**: The caller handed over a command that cannot be framed
//! - **Config**: Configuration could not be loaded or failed validation
//!
//! No message produced here ever contains the RCON password.
//!
//! ## Example Usage
//! ```rust
//! use rcon_session::error::{ErrorKind, RconError};
//!
//! let err = RconError::AuthRejected;
//! assert_eq!(err.kind(), ErrorKind::Auth);
//! assert!(!err.is_retryable());
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Codec errors
    pub const ERR_EMBEDDED_NUL: &str = "Command body contains an embedded NUL byte";
    pub const ERR_COMMAND_TOO_LONG: &str = "Command does not fit in one packet";
    pub const ERR_MISSING_TERMINATOR: &str = "Packet body is not NUL terminated";

    /// Connection errors
    pub const ERR_CONNECT_TIMEOUT: &str = "Connect timed out";

    /// Handshake errors
    pub const ERR_HANDSHAKE_CLOSED: &str = "Server closed the connection during login";
    pub const ERR_UNEXPECTED_AUTH_ID: &str = "Login reply carried an unexpected request id";
}

/// Broad error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Service unreachable: connect failed or timed out.
    Connection,
    /// Handshake rejected. Never retried with the same credentials.
    Auth,
    /// Malformed packet or desynchronized stream. Always invalidates the session.
    Protocol,
    /// Any other read/write failure, timeout, or peer close mid-operation.
    Io,
    /// The caller supplied a command that cannot be encoded.
    InvalidInput,
    /// Configuration loading or validation failed.
    Config,
}

// RconError is the primary error type for all client operations
#[derive(Error, Debug)]
pub enum RconError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication rejected by server")]
    AuthRejected,

    #[error("Handshake failed: {0}")]
    HandshakeError(String),

    #[error("Invalid packet length: {0}")]
    InvalidLength(i32),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Response id mismatch: expected {expected}, got {actual}")]
    RequestIdMismatch { expected: i32, actual: i32 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RconError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RconError::Io(_) | RconError::ConnectionClosed | RconError::Timeout => ErrorKind::Io,
            RconError::Connection(_) => ErrorKind::Connection,
            RconError::AuthRejected | RconError::HandshakeError(_) => ErrorKind::Auth,
            RconError::InvalidLength(_)
            | RconError::OversizedPacket(_)
            | RconError::RequestIdMismatch { .. }
            | RconError::Protocol(_) => ErrorKind::Protocol,
            RconError::InvalidCommand(_) => ErrorKind::InvalidInput,
            RconError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Whether a failed exchange may be repeated once on a brand-new session.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Io
    }

    /// Whether the session that produced this error must be discarded.
    pub fn invalidates_session(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io | ErrorKind::Protocol)
    }
}

/// Type alias for Results using RconError
pub type Result<T> = std::result::Result<T, RconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_family_is_retryable() {
        let io = RconError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        for err in [io, RconError::ConnectionClosed, RconError::Timeout] {
            assert_eq!(err.kind(), ErrorKind::Io);
            assert!(err.is_retryable());
            assert!(err.invalidates_session());
        }
    }

    #[test]
    fn test_protocol_errors_invalidate_without_retry() {
        let mismatch = RconError::RequestIdMismatch {
            expected: 4,
            actual: 9,
        };
        assert_eq!(mismatch.kind(), ErrorKind::Protocol);
        assert!(!mismatch.is_retryable());
        assert!(mismatch.invalidates_session());
        assert_eq!(
            mismatch.to_string(),
            "Response id mismatch: expected 4, got 9"
        );
    }

    #[test]
    fn test_auth_and_connection_are_distinct() {
        assert_eq!(RconError::AuthRejected.kind(), ErrorKind::Auth);
        assert_eq!(
            RconError::HandshakeError("garbage".into()).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            RconError::Connection("refused".into()).kind(),
            ErrorKind::Connection
        );
        assert!(!RconError::AuthRejected.is_retryable());
        assert!(!RconError::Connection("refused".into()).is_retryable());
    }

    #[test]
    fn test_invalid_command_keeps_session() {
        let err = RconError::InvalidCommand(constants::ERR_EMBEDDED_NUL.into());
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!err.invalidates_session());
    }
}
