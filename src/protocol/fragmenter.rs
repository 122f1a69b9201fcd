//! Splitting outgoing messages into frames (RFC 6455 §5.4).

use crate::protocol::{Frame, OpCode};

/// Iterator producing the frames of one outgoing message.
///
/// The first frame carries the message opcode, later ones are
/// continuations; FIN is set only on the last. An empty payload still
/// yields a single empty frame.
pub struct Fragmenter<'a> {
    remaining: &'a [u8],
    opcode: OpCode,
    chunk_size: usize,
    done: bool,
}

impl<'a> Fragmenter<'a> {
    /// Fragment `payload` into chunks of at most `chunk_size` bytes.
    #[must_use]
    pub fn new(payload: &'a [u8], opcode: OpCode, chunk_size: usize) -> Self {
        Self {
            remaining: payload,
            opcode,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl Iterator for Fragmenter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }

        let take = self.remaining.len().min(self.chunk_size);
        let (chunk, rest) = self.remaining.split_at(take);
        self.remaining = rest;

        let fin = rest.is_empty();
        self.done = fin;

        let frame = Frame::new(fin, self.opcode, chunk.to_vec());
        self.opcode = OpCode::Continuation;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_payload_single_frame() {
        let frames: Vec<Frame> = Fragmenter::new(b"hello", OpCode::Text, 1024).collect();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].fin);
        assert_eq!(frames[0].opcode, OpCode::Text);
        assert_eq!(frames[0].payload(), b"hello");
    }

    #[test]
    fn test_empty_payload_single_empty_frame() {
        let frames: Vec<Frame> = Fragmenter::new(b"", OpCode::Binary, 16).collect();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].fin);
        assert!(frames[0].payload().is_empty());
    }

    #[test]
    fn test_split_into_continuations() {
        let frames: Vec<Frame> = Fragmenter::new(b"abcdefg", OpCode::Text, 3).collect();
        assert_eq!(frames.len(), 3);

        assert_eq!((frames[0].opcode, frames[0].fin), (OpCode::Text, false));
        assert_eq!(frames[0].payload(), b"abc");
        assert_eq!(
            (frames[1].opcode, frames[1].fin),
            (OpCode::Continuation, false)
        );
        assert_eq!(frames[1].payload(), b"def");
        assert_eq!(
            (frames[2].opcode, frames[2].fin),
            (OpCode::Continuation, true)
        );
        assert_eq!(frames[2].payload(), b"g");
    }

    #[test]
    fn test_exact_multiple_of_chunk_size() {
        let frames: Vec<Frame> = Fragmenter::new(b"abcdef", OpCode::Binary, 3).collect();
        assert_eq!(frames.len(), 2);
        assert!(!frames[0].fin);
        assert!(frames[1].fin);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        let frames: Vec<Frame> = Fragmenter::new(b"ab", OpCode::Text, 0).collect();
        assert_eq!(frames.len(), 2);
    }
}
