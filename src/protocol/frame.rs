//! The frame record and its structural validation (RFC 6455 §5.2, §5.5).

use std::fmt;

use crate::error::{Error, Result};
use crate::message::CloseCode;
use crate::protocol::OpCode;
use crate::protocol::utf8::validate_utf8;

/// Largest payload a control frame may carry (RFC 6455 §5.5).
pub const MAX_CONTROL_PAYLOAD: usize = 125;

/// A single WebSocket frame with its payload already unmasked.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-------+-+-------------+-------------------------------+
/// |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
/// |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
/// |N|V|V|V|       |S|             |   (if payload len==126/127)   |
/// | |1|2|3|       |K|             |                               |
/// +-+-+-+-+-------+-+-------------+-------------------------------+
/// |                Masking key (if MASK)                          |
/// +---------------------------------------------------------------+
/// |                     Payload data                              |
/// +---------------------------------------------------------------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Whether this frame ends a logical message.
    pub fin: bool,
    /// Reserved bit 1; zero unless an extension was negotiated.
    pub rsv1: bool,
    /// Reserved bit 2.
    pub rsv2: bool,
    /// Reserved bit 3.
    pub rsv3: bool,
    /// Frame opcode.
    pub opcode: OpCode,
    payload: Vec<u8>,
}

impl Frame {
    /// Create a frame with all reserved bits clear.
    #[must_use]
    pub fn new(fin: bool, opcode: OpCode, payload: Vec<u8>) -> Self {
        Self {
            fin,
            rsv1: false,
            rsv2: false,
            rsv3: false,
            opcode,
            payload,
        }
    }

    /// Create a final text frame.
    #[must_use]
    pub fn text(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Text, data.into())
    }

    /// Create a final binary frame.
    #[must_use]
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Binary, data.into())
    }

    /// Create a close frame. With a code, the payload is the big-endian
    /// code followed by the reason; without one, the payload is empty.
    #[must_use]
    pub fn close(code: Option<CloseCode>, reason: &str) -> Self {
        let payload = match code {
            Some(code) => {
                let mut data = code.as_u16().to_be_bytes().to_vec();
                data.extend_from_slice(reason.as_bytes());
                data
            }
            None => Vec::new(),
        };
        Self::new(true, OpCode::Close, payload)
    }

    /// Create a ping frame.
    #[must_use]
    pub fn ping(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Ping, data.into())
    }

    /// Create a pong frame.
    #[must_use]
    pub fn pong(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Pong, data.into())
    }

    /// Borrow the payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the payload.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Status code of a close frame, when the payload carries one.
    #[must_use]
    pub fn close_code(&self) -> Option<u16> {
        if self.opcode == OpCode::Close && self.payload.len() >= 2 {
            Some(u16::from_be_bytes([self.payload[0], self.payload[1]]))
        } else {
            None
        }
    }

    /// Reason bytes of a close frame (everything after the status code).
    #[must_use]
    pub fn close_reason(&self) -> &[u8] {
        if self.opcode == OpCode::Close && self.payload.len() > 2 {
            &self.payload[2..]
        } else {
            &[]
        }
    }

    /// Check the structural rules a decoded frame must satisfy.
    ///
    /// `skip_utf8_validation` only suppresses the close-reason UTF-8
    /// check; everything else is unconditional.
    ///
    /// # Errors
    ///
    /// - `Error::ReservedBitsSet` when any RSV bit is set.
    /// - `Error::FragmentedControlFrame` for a control frame with FIN=0.
    /// - `Error::ControlFrameTooLarge` for a control payload over 125 bytes.
    /// - `Error::ProtocolViolation` for a 1-byte close payload.
    /// - `Error::InvalidCloseCode` for a close code outside the valid set.
    /// - `Error::InvalidUtf8` for a malformed close reason.
    pub fn validate(&self, skip_utf8_validation: bool) -> Result<()> {
        if self.rsv1 || self.rsv2 || self.rsv3 {
            return Err(Error::ReservedBitsSet);
        }

        if self.opcode.is_control() {
            if !self.fin {
                return Err(Error::FragmentedControlFrame);
            }
            if self.payload.len() > MAX_CONTROL_PAYLOAD {
                return Err(Error::ControlFrameTooLarge(self.payload.len()));
            }
        }

        if self.opcode == OpCode::Close {
            self.validate_close(skip_utf8_validation)?;
        }

        Ok(())
    }

    fn validate_close(&self, skip_utf8_validation: bool) -> Result<()> {
        match self.payload.len() {
            0 => Ok(()),
            1 => Err(Error::ProtocolViolation(
                "close frame with 1-byte payload".into(),
            )),
            _ => {
                let code = u16::from_be_bytes([self.payload[0], self.payload[1]]);
                if !CloseCode::from_u16(code).is_allowed_on_wire() {
                    return Err(Error::InvalidCloseCode(code));
                }
                if !skip_utf8_validation {
                    validate_utf8(&self.payload[2..])?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fin={} opcode={} len={}",
            u8::from(self.fin),
            self.opcode,
            self.payload.len()
        )
    }
}
