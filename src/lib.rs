//! # wsabnf - WebSocket framing core
//!
//! The framing layer of an RFC 6455 client library: everything between an
//! opaque byte transport and application messages.
//!
//! - **Frame encoding** with client-side masking (CSPRNG keys) and a
//!   zero-copy header-prepend contract for callers that reserve headroom.
//! - **Incremental decoding** from any [`ByteSource`], with strict
//!   structural validation: reserved bits, opcode legality, control-frame
//!   shape, close-frame status codes and reasons.
//! - **Message reassembly** across fragments, with interleaved control
//!   frames and streaming UTF-8 validation of text payloads.
//!
//! Transport, TLS, the upgrade handshake, and ping/pong scheduling are
//! out of scope; supply them around this crate.
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//! use wsabnf::{Config, FrameDecoder, FrameEncoder, MessageAssembler, OpCode};
//!
//! # fn main() -> wsabnf::Result<()> {
//! let config = Config::default();
//! let mut encoder = FrameEncoder::new(&config);
//! let wire = encoder.encode(OpCode::Text, true, "hello")?;
//!
//! let decoder = FrameDecoder::new(Cursor::new(wire.as_ref().to_vec()), config.clone());
//! let mut assembler = MessageAssembler::new(&config);
//! let message = assembler.process(decoder.next_frame()?)?.expect("final frame");
//! assert_eq!(message.into_text()?, "hello");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod protocol;
pub mod transport;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use message::{CloseCode, CloseFrame, Message, Payload};
pub use protocol::{
    AssembledMessage, Frame, FrameBuf, FrameDecoder, FrameEncoder, Fragmenter, MaskKeySource,
    MessageAssembler, OpCode, SystemKeySource, Utf8Validator,
};
pub use transport::{ByteSink, ByteSource};
