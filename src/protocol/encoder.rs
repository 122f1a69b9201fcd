//! Frame encoding (RFC 6455 §5.2): header layout, masking, and the
//! prepend-in-place buffer contract.
//!
//! The encoder writes the frame header into headroom reserved in front of
//! the payload whenever the caller provided enough of it, returning a view
//! over the finished frame without copying the payload. Without headroom it
//! falls back to a fresh `header ++ payload` allocation.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::message::Payload;
use crate::protocol::mask::apply_mask_fast;
use crate::protocol::{Frame, OpCode};
use crate::transport::ByteSink;

/// Largest possible frame header: 2 fixed bytes, 8 of extended length,
/// 4 of mask key. Reserve this much headroom for guaranteed zero-copy.
pub const MAX_HEADER_LEN: usize = 14;

/// Payload lengths must fit in 63 bits on the wire.
const MAX_PAYLOAD_LEN: u64 = 1 << 63;

/// Source of 4-byte mask keys.
///
/// The default binds to the platform CSPRNG; tests inject a fixed source
/// to make encoder output deterministic.
pub trait MaskKeySource {
    /// Produce the key for the next outgoing frame.
    ///
    /// # Errors
    ///
    /// Implementations backed by an OS entropy source may fail.
    fn next_key(&mut self) -> Result<[u8; 4]>;
}

/// Mask keys drawn from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemKeySource;

impl MaskKeySource for SystemKeySource {
    fn next_key(&mut self) -> Result<[u8; 4]> {
        let mut key = [0u8; 4];
        getrandom::getrandom(&mut key).map_err(|e| Error::Io(e.to_string()))?;
        Ok(key)
    }
}

/// A payload buffer with writable headroom in front of the data.
///
/// Before encoding, the region past the headroom holds the payload; after
/// encoding, [`FrameBuf::as_bytes`] is the complete wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuf {
    buf: Vec<u8>,
    start: usize,
}

impl FrameBuf {
    /// Copy `payload` into a buffer with `headroom` writable bytes in
    /// front of it.
    #[must_use]
    pub fn with_headroom(payload: &[u8], headroom: usize) -> Self {
        let mut buf = vec![0u8; headroom];
        buf.reserve(payload.len());
        buf.extend_from_slice(payload);
        Self {
            buf,
            start: headroom,
        }
    }

    /// Wrap an existing payload with no headroom. Encoding will take the
    /// fallback allocation path.
    #[must_use]
    pub fn from_payload(payload: Vec<u8>) -> Self {
        Self {
            buf: payload,
            start: 0,
        }
    }

    /// Append payload bytes.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Writable bytes remaining in front of the data.
    #[must_use]
    pub fn headroom(&self) -> usize {
        self.start
    }

    /// View of the data past the headroom: the payload before encoding,
    /// the whole frame after.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }
}

impl AsRef<[u8]> for FrameBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Builds wire frames, owning the masking policy and key source.
pub struct FrameEncoder {
    mask_frames: bool,
    key_source: Box<dyn MaskKeySource + Send>,
}

impl FrameEncoder {
    /// Create an encoder following `config.mask_frames`, keyed from the
    /// platform CSPRNG.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            mask_frames: config.mask_frames,
            key_source: Box::new(SystemKeySource),
        }
    }

    /// Replace the mask-key source.
    #[must_use]
    pub fn with_key_source(mut self, source: impl MaskKeySource + Send + 'static) -> Self {
        self.key_source = Box::new(source);
        self
    }

    /// Encode one frame from a payload, reserving headroom internally so
    /// the header prepends without a second copy.
    ///
    /// Text payloads are UTF-8 encoded; byte payloads pass through.
    ///
    /// # Errors
    ///
    /// `Error::PayloadTooLarge` for payloads of 2^63 bytes or more, or an
    /// I/O error from the key source.
    pub fn encode(
        &mut self,
        opcode: OpCode,
        fin: bool,
        payload: impl Into<Payload>,
    ) -> Result<FrameBuf> {
        let bytes = payload.into().into_bytes();
        let buf = FrameBuf::with_headroom(&bytes, MAX_HEADER_LEN);
        self.encode_buf(buf, opcode, fin)
    }

    /// Encode a [`Frame`] record (the fin/opcode pair it carries, reserved
    /// bits are never set by this encoder).
    ///
    /// # Errors
    ///
    /// Same conditions as [`FrameEncoder::encode`].
    pub fn encode_frame(&mut self, frame: &Frame) -> Result<FrameBuf> {
        let buf = FrameBuf::with_headroom(frame.payload(), MAX_HEADER_LEN);
        self.encode_buf(buf, frame.opcode, frame.fin)
    }

    /// Encode into a caller-supplied buffer. When the buffer's headroom
    /// fits the header, the header is written in place and the payload is
    /// never copied; otherwise a fresh buffer is allocated.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FrameEncoder::encode`].
    pub fn encode_buf(&mut self, mut frame: FrameBuf, opcode: OpCode, fin: bool) -> Result<FrameBuf> {
        let payload_len = (frame.buf.len() - frame.start) as u64;
        if payload_len >= MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_LEN - 1,
            });
        }

        let mask = if self.mask_frames {
            Some(self.key_source.next_key()?)
        } else {
            None
        };

        let mut header = [0u8; MAX_HEADER_LEN];
        let header_len = write_header(&mut header, opcode, fin, payload_len, mask);

        if let Some(key) = mask {
            apply_mask_fast(&mut frame.buf[frame.start..], key);
        }

        if header_len <= frame.start {
            let header_start = frame.start - header_len;
            frame.buf[header_start..frame.start].copy_from_slice(&header[..header_len]);
            frame.start = header_start;
            Ok(frame)
        } else {
            let mut out = Vec::with_capacity(header_len + payload_len as usize);
            out.extend_from_slice(&header[..header_len]);
            out.extend_from_slice(&frame.buf[frame.start..]);
            Ok(FrameBuf {
                buf: out,
                start: 0,
            })
        }
    }

    /// Encode a frame and hand its bytes straight to a sink.
    ///
    /// # Errors
    ///
    /// Encoding errors, or the sink's I/O error.
    pub fn encode_to(
        &mut self,
        sink: &mut impl ByteSink,
        opcode: OpCode,
        fin: bool,
        payload: impl Into<Payload>,
    ) -> Result<()> {
        let frame = self.encode(opcode, fin, payload)?;
        sink.write(frame.as_bytes())?;
        Ok(())
    }
}

/// Pack the frame header into `buf`, returning its length.
fn write_header(
    buf: &mut [u8; MAX_HEADER_LEN],
    opcode: OpCode,
    fin: bool,
    payload_len: u64,
    mask: Option<[u8; 4]>,
) -> usize {
    let mask_bit = if mask.is_some() { 0x80 } else { 0 };
    buf[0] = (u8::from(fin) << 7) | opcode.as_u8();

    let mut len = 2;
    if payload_len < 126 {
        buf[1] = mask_bit | payload_len as u8;
    } else if payload_len < (1 << 16) {
        buf[1] = mask_bit | 126;
        buf[2..4].copy_from_slice(&(payload_len as u16).to_be_bytes());
        len = 4;
    } else {
        buf[1] = mask_bit | 127;
        buf[2..10].copy_from_slice(&payload_len.to_be_bytes());
        len = 10;
    }

    if let Some(key) = mask {
        buf[len..len + 4].copy_from_slice(&key);
        len += 4;
    }
    len
}
