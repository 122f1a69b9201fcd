//! Reassembly of fragmented messages (RFC 6455 §5.4).
//!
//! Frames from the decoder are fed through [`MessageAssembler::process`].
//! Control frames pass straight through without touching the fragmentation
//! state; data frames either complete a message or accumulate. With
//! `fire_cont_frame` set, every data frame is surfaced as it arrives and
//! text validation is left to the caller.

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::{CloseFrame, Message};
use crate::protocol::utf8::Utf8Validator;
use crate::protocol::{Frame, OpCode};

/// A message as delivered by the assembler: the opcode of the frame (or
/// of the first fragment, once reassembled) and the full payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledMessage {
    /// Delivered opcode. `Continuation` only in fire-cont mode.
    pub opcode: OpCode,
    /// Complete payload, fragments concatenated in arrival order.
    pub payload: Vec<u8>,
}

impl AssembledMessage {
    /// Interpret the payload as a text message.
    ///
    /// # Errors
    ///
    /// `Error::InvalidUtf8` if the payload is not valid UTF-8.
    pub fn into_text(self) -> Result<String> {
        String::from_utf8(self.payload).map_err(|_| Error::InvalidUtf8)
    }

    /// Take the payload as binary data.
    #[must_use]
    pub fn into_binary(self) -> Vec<u8> {
        self.payload
    }

    /// Convert to the typed [`Message`] the application consumes.
    ///
    /// # Errors
    ///
    /// `Error::InvalidUtf8` for a text message whose payload is not
    /// valid UTF-8 (possible when validation was skipped or deferred).
    pub fn into_message(self) -> Result<Message> {
        match self.opcode {
            OpCode::Text => Ok(Message::Text(self.into_text()?)),
            OpCode::Binary | OpCode::Continuation => Ok(Message::Binary(self.payload)),
            OpCode::Ping => Ok(Message::Ping(self.payload)),
            OpCode::Pong => Ok(Message::Pong(self.payload)),
            OpCode::Close => Ok(Message::Close(CloseFrame::from_payload(&self.payload))),
        }
    }
}

/// Tracks fragmentation state and assembles logical messages.
pub struct MessageAssembler {
    buffer: BytesMut,
    building: Option<OpCode>,
    utf8: Option<Utf8Validator>,
    fire_cont_frame: bool,
    skip_utf8_validation: bool,
}

impl MessageAssembler {
    /// Create an assembler following the config's delivery and
    /// validation knobs.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            buffer: BytesMut::new(),
            building: None,
            utf8: None,
            fire_cont_frame: config.fire_cont_frame,
            skip_utf8_validation: config.skip_utf8_validation,
        }
    }

    /// Whether a fragmented message is in progress.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.building.is_some()
    }

    /// Drop any partially assembled message.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.building = None;
        self.utf8 = None;
    }

    /// Feed one decoded frame; returns a message when one is complete.
    ///
    /// Control frames are returned immediately and leave the
    /// fragmentation state untouched, so they may interleave between
    /// fragments.
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` for a continuation frame with no
    ///   message in progress, or a fresh text/binary frame while one is.
    /// - `Error::InvalidUtf8` when a text message fails validation.
    pub fn process(&mut self, frame: Frame) -> Result<Option<AssembledMessage>> {
        if frame.opcode.is_control() {
            return Ok(Some(AssembledMessage {
                opcode: frame.opcode,
                payload: frame.into_payload(),
            }));
        }

        match (self.building, frame.opcode) {
            (None, OpCode::Continuation) => {
                return Err(Error::ProtocolViolation(
                    "continuation frame with no message in progress".into(),
                ));
            }
            (Some(_), OpCode::Text | OpCode::Binary) => {
                return Err(Error::ProtocolViolation(
                    "new data frame while a fragmented message is in progress".into(),
                ));
            }
            _ => {}
        }

        let fin = frame.fin;
        let opcode = frame.opcode;

        if self.fire_cont_frame {
            // Streaming delivery: surface the frame as-is, keep only the
            // legality state. UTF-8 is the caller's problem here.
            if fin {
                self.building = None;
            } else if opcode != OpCode::Continuation {
                self.building = Some(opcode);
            }
            return Ok(Some(AssembledMessage {
                opcode,
                payload: frame.into_payload(),
            }));
        }

        if self.building.is_none() {
            self.building = Some(opcode);
            if opcode == OpCode::Text && !self.skip_utf8_validation {
                self.utf8 = Some(Utf8Validator::new());
            }
        }

        if let Some(validator) = &mut self.utf8 {
            validator.validate(frame.payload(), fin)?;
        }
        self.buffer.extend_from_slice(frame.payload());

        if fin {
            let payload = self.buffer.split().to_vec();
            let opcode = self.building.take().unwrap_or(opcode);
            self.utf8 = None;
            Ok(Some(AssembledMessage { opcode, payload }))
        } else {
            Ok(None)
        }
    }
}
