//! Incremental frame decoding from a byte source.
//!
//! Parsing proceeds in phases (header, extended length, mask key,
//! payload), each pulling exactly the bytes it needs. The phase fields
//! persist across calls, so a source that errors mid-frame leaves the
//! decoder where it stopped; after any error the connection is unusable
//! and the decoder must be discarded with it.

use std::sync::Mutex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::mask::apply_mask_fast;
use crate::protocol::{Frame, OpCode};
use crate::transport::ByteSource;

/// Per-call cap on how much is requested from the source at once.
/// Repeatedly passing huge buffers to a transport that sizes them down
/// fragments the heap; 131072 is the default TCP buffer size on Linux.
pub const READ_CHUNK_LIMIT: usize = 131_072;

#[derive(Debug, Clone, Copy)]
struct RawHeader {
    fin: bool,
    rsv1: bool,
    rsv2: bool,
    rsv3: bool,
    opcode: OpCode,
    masked: bool,
    length_bits: u8,
}

struct DecoderState<S> {
    source: S,
    header: Option<RawHeader>,
    payload_len: Option<u64>,
    mask_key: Option<Option<[u8; 4]>>,
}

/// Pulls one validated frame at a time from a [`ByteSource`].
///
/// `next_frame` takes `&self`: the whole parse runs under an internal
/// mutex, so concurrent callers are serialized and each receives a whole
/// frame.
pub struct FrameDecoder<S> {
    state: Mutex<DecoderState<S>>,
    config: Config,
}

impl<S: ByteSource> FrameDecoder<S> {
    /// Create a decoder reading from `source`.
    pub fn new(source: S, config: Config) -> Self {
        Self {
            state: Mutex::new(DecoderState {
                source,
                header: None,
                payload_len: None,
                mask_key: None,
            }),
            config,
        }
    }

    /// Read, parse, and validate the next frame.
    ///
    /// Blocks inside the source's `read_into` until a whole frame has
    /// arrived. The returned frame's payload is already unmasked.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed` when the stream ends mid-frame.
    /// - `Error::Io` when the source fails.
    /// - Protocol errors from structural validation (reserved bits,
    ///   reserved opcodes, malformed control and close frames).
    /// - `Error::InvalidUtf8` for a malformed close reason.
    /// - `Error::PayloadTooLarge` when the declared length exceeds the
    ///   configured cap or the platform address space.
    pub fn next_frame(&self) -> Result<Frame> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.recv_frame(&self.config)
    }

    /// Consume the decoder and recover the byte source.
    pub fn into_source(self) -> S {
        self.state
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .source
    }
}

impl<S: ByteSource> DecoderState<S> {
    fn recv_frame(&mut self, config: &Config) -> Result<Frame> {
        let header = match self.header {
            Some(header) => header,
            None => {
                let header = self.recv_header()?;
                self.header = Some(header);
                header
            }
        };

        let payload_len = match self.payload_len {
            Some(len) => len,
            None => {
                let len = self.recv_length(header.length_bits)?;
                self.payload_len = Some(len);
                len
            }
        };

        let mask_key = match self.mask_key {
            Some(key) => key,
            None => {
                let key = if header.masked {
                    Some(self.recv_mask_key()?)
                } else {
                    None
                };
                self.mask_key = Some(key);
                key
            }
        };

        if let Some(max) = config.max_payload_bytes {
            if payload_len > max as u64 {
                return Err(Error::PayloadTooLarge {
                    size: payload_len,
                    max: max as u64,
                });
            }
        }
        let len = usize::try_from(payload_len).map_err(|_| Error::PayloadTooLarge {
            size: payload_len,
            max: usize::MAX as u64,
        })?;

        let mut payload = self.recv_exact(len)?;
        if let Some(key) = mask_key {
            apply_mask_fast(&mut payload, key);
        }

        // Frame complete; reset the phase fields for the next one.
        self.header = None;
        self.payload_len = None;
        self.mask_key = None;

        let mut frame = Frame::new(header.fin, header.opcode, payload);
        frame.rsv1 = header.rsv1;
        frame.rsv2 = header.rsv2;
        frame.rsv3 = header.rsv3;
        frame.validate(config.skip_utf8_validation)?;
        Ok(frame)
    }

    fn recv_header(&mut self) -> Result<RawHeader> {
        let buf = self.recv_exact(2)?;
        let b0 = buf[0];
        let b1 = buf[1];
        Ok(RawHeader {
            fin: b0 & 0x80 != 0,
            rsv1: b0 & 0x40 != 0,
            rsv2: b0 & 0x20 != 0,
            rsv3: b0 & 0x10 != 0,
            opcode: OpCode::try_from(b0 & 0x0F)?,
            masked: b1 & 0x80 != 0,
            length_bits: b1 & 0x7F,
        })
    }

    fn recv_length(&mut self, length_bits: u8) -> Result<u64> {
        match length_bits {
            126 => {
                let buf = self.recv_exact(2)?;
                Ok(u64::from(u16::from_be_bytes([buf[0], buf[1]])))
            }
            127 => {
                let buf = self.recv_exact(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&buf);
                let len = u64::from_be_bytes(raw);
                // RFC 6455 §5.2: the most significant bit must be 0.
                if len >> 63 != 0 {
                    return Err(Error::ProtocolViolation(
                        "payload length high bit set".into(),
                    ));
                }
                Ok(len)
            }
            bits => Ok(u64::from(bits)),
        }
    }

    fn recv_mask_key(&mut self) -> Result<[u8; 4]> {
        let buf = self.recv_exact(4)?;
        Ok([buf[0], buf[1], buf[2], buf[3]])
    }

    /// Loop on the source until exactly `len` bytes have arrived.
    fn recv_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let want = (len - filled).min(READ_CHUNK_LIMIT);
            let n = self.source.read_into(&mut buf[filled..filled + want])?;
            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
            filled += n;
        }
        Ok(buf)
    }
}
