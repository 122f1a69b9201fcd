//! WebSocket framing core (RFC 6455 §5).

pub mod assembler;
pub mod decoder;
pub mod encoder;
pub mod fragmenter;
pub mod frame;
pub mod mask;
pub mod opcode;
pub mod utf8;

pub use assembler::{AssembledMessage, MessageAssembler};
pub use decoder::{FrameDecoder, READ_CHUNK_LIMIT};
pub use encoder::{FrameBuf, FrameEncoder, MAX_HEADER_LEN, MaskKeySource, SystemKeySource};
pub use fragmenter::Fragmenter;
pub use frame::{Frame, MAX_CONTROL_PAYLOAD};
pub use mask::{apply_mask, apply_mask_fast};
pub use opcode::OpCode;
pub use utf8::{Utf8Validator, validate_utf8};
