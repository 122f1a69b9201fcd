//! Error types for the framing core.
//!
//! Errors fall into three kinds (see [`ErrorKind`]): protocol violations the
//! peer committed on the wire, payload errors where a structurally valid
//! frame carries malformed content, and transport failures. The kind decides
//! which close code a conforming caller should send back.

use thiserror::Error;

/// Result type alias for framing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while encoding, decoding, or reassembling frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// RFC 6455 framing rule violated by the peer.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Reserved bits set without a negotiated extension.
    #[error("rsv bits set without negotiated extension")]
    ReservedBitsSet,

    /// Opcode value outside the 4-bit wire range.
    #[error("invalid opcode: {0:#x}")]
    InvalidOpcode(u8),

    /// Opcode reserved for future use by RFC 6455.
    #[error("reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Control frame with the FIN bit clear.
    #[error("control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload over the 125-byte limit.
    #[error("control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(usize),

    /// Close frame status code outside the valid set.
    #[error("invalid close code: {0}")]
    InvalidCloseCode(u16),

    /// Malformed UTF-8 in a text message or close reason.
    #[error("invalid UTF-8 in text payload")]
    InvalidUtf8,

    /// Payload length over the wire-format or configured limit.
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge {
        /// Declared payload length.
        size: u64,
        /// Largest acceptable length.
        max: u64,
    },

    /// Byte source reached end-of-stream mid-frame.
    #[error("connection closed by remote")]
    ConnectionClosed,

    /// I/O error from the byte source or sink.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Coarse classification of an [`Error`], per the three failure classes a
/// WebSocket endpoint has to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The peer broke the framing rules; answer with close code 1002.
    Protocol,
    /// Frame content was semantically wrong; answer with close code 1007.
    Payload,
    /// The transport failed; there is nobody left to answer.
    Transport,
}

impl Error {
    /// Which of the three failure classes this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUtf8 => ErrorKind::Payload,
            Error::ConnectionClosed | Error::Io(_) => ErrorKind::Transport,
            _ => ErrorKind::Protocol,
        }
    }

    /// Close code the caller should send when initiating the close
    /// handshake over this error. `None` for transport errors, where the
    /// connection is already gone.
    #[must_use]
    pub fn close_code(&self) -> Option<u16> {
        match self {
            Error::PayloadTooLarge { .. } => Some(1009),
            Error::InvalidUtf8 => Some(1007),
            Error::ConnectionClosed | Error::Io(_) => None,
            _ => Some(1002),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
