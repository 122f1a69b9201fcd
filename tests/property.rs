//! Property-based tests for the framing core.
//!
//! proptest fuzzes the encode/decode pair, the masking transform, and the
//! UTF-8 validator to pin down the invariants the unit tests only sample.

use std::io::Cursor;

use proptest::prelude::*;
use wsabnf::protocol::{apply_mask, apply_mask_fast, validate_utf8};
use wsabnf::{Config, Error, FrameDecoder, FrameEncoder, MaskKeySource, OpCode, Result};

/// Deterministic mask keys so masked output is reproducible per case.
struct FixedKeySource([u8; 4]);

impl MaskKeySource for FixedKeySource {
    fn next_key(&mut self) -> Result<[u8; 4]> {
        Ok(self.0)
    }
}

fn data_opcode_strategy() -> impl Strategy<Value = OpCode> {
    prop_oneof![Just(OpCode::Text), Just(OpCode::Binary)]
}

fn decode_one(bytes: &[u8], config: Config) -> Result<wsabnf::Frame> {
    FrameDecoder::new(Cursor::new(bytes.to_vec()), config).next_frame()
}

proptest! {
    // Masking twice with the same key is the identity.
    #[test]
    fn prop_mask_involution(
        data in prop::collection::vec(any::<u8>(), 0..2000),
        key in any::<[u8; 4]>()
    ) {
        let mut masked = data.clone();
        apply_mask(&mut masked, key);
        apply_mask(&mut masked, key);
        prop_assert_eq!(data, masked);
    }

    // The word-chunked fast path agrees with the byte-wise reference.
    #[test]
    fn prop_mask_fast_matches_reference(
        data in prop::collection::vec(any::<u8>(), 0..2000),
        key in any::<[u8; 4]>()
    ) {
        let mut reference = data.clone();
        let mut fast = data;
        apply_mask(&mut reference, key);
        apply_mask_fast(&mut fast, key);
        prop_assert_eq!(reference, fast);
    }

    // decode(encode(frame)) restores fin, opcode, and payload for
    // unmasked output.
    #[test]
    fn prop_roundtrip_unmasked(
        opcode in data_opcode_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..1000)
    ) {
        let mut encoder = FrameEncoder::new(&Config::new().with_mask_frames(false));
        let wire = encoder.encode(opcode, true, payload.clone()).unwrap();

        let frame = decode_one(wire.as_ref(), Config::new().with_skip_utf8_validation(true))
            .unwrap();
        prop_assert!(frame.fin);
        prop_assert_eq!(frame.opcode, opcode);
        prop_assert_eq!(frame.payload(), payload.as_slice());
    }

    // Masked encoding round-trips to the same plaintext payload.
    #[test]
    fn prop_roundtrip_masked(
        opcode in data_opcode_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..500),
        key in any::<[u8; 4]>()
    ) {
        let mut encoder = FrameEncoder::new(&Config::default())
            .with_key_source(FixedKeySource(key));
        let wire = encoder.encode(opcode, true, payload.clone()).unwrap();

        // Mask bit and key on the wire...
        prop_assert_eq!(wire.as_ref()[1] & 0x80, 0x80);
        // ...but the decoded payload is plaintext.
        let frame = decode_one(wire.as_ref(), Config::new().with_skip_utf8_validation(true))
            .unwrap();
        prop_assert_eq!(frame.payload(), payload.as_slice());
    }

    // The length field and extended length survive a round trip for any
    // size; headers grow exactly at 126 and 65536.
    #[test]
    fn prop_length_encoding(len in 0usize..70000) {
        let mut encoder = FrameEncoder::new(&Config::new().with_mask_frames(false));
        let wire = encoder.encode(OpCode::Binary, true, vec![0x5au8; len]).unwrap();

        let expected_header = if len < 126 { 2 } else if len < 65536 { 4 } else { 10 };
        prop_assert_eq!(wire.as_ref().len(), expected_header + len);

        let frame = decode_one(wire.as_ref(), Config::default()).unwrap();
        prop_assert_eq!(frame.payload().len(), len);
    }

    // The DFA validator and the standard library agree on arbitrary
    // bytes, including slices of valid UTF-8 with corruption mixed in.
    #[test]
    fn prop_utf8_validator_matches_std(data in prop::collection::vec(any::<u8>(), 0..500)) {
        prop_assert_eq!(
            validate_utf8(&data).is_ok(),
            std::str::from_utf8(&data).is_ok()
        );
    }

    #[test]
    fn prop_utf8_validator_accepts_all_strings(s in ".*") {
        prop_assert!(validate_utf8(s.as_bytes()).is_ok());
    }

    // A decoded text frame is accepted exactly when its payload is valid
    // UTF-8.
    #[test]
    fn prop_text_acceptance_is_utf8(payload in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut encoder = FrameEncoder::new(&Config::new().with_mask_frames(false));
        let wire = encoder.encode(OpCode::Text, true, payload.clone()).unwrap();

        let frame = decode_one(wire.as_ref(), Config::default()).unwrap();
        let mut assembler = wsabnf::MessageAssembler::new(&Config::default());
        let accepted = assembler.process(frame).is_ok();
        prop_assert_eq!(accepted, std::str::from_utf8(&payload).is_ok());
    }

    // Close codes: the registered set plus 3000..4999 pass, everything
    // else is a protocol error.
    #[test]
    fn prop_close_code_acceptance(code in 0u16..6000) {
        let valid = matches!(code, 1000..=1003 | 1007..=1014 | 3000..=4999);

        let mut payload = code.to_be_bytes().to_vec();
        payload.extend_from_slice(b"reason");
        let mut wire = vec![0x88, payload.len() as u8];
        wire.extend_from_slice(&payload);

        let result = decode_one(&wire, Config::default());
        if valid {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(Error::InvalidCloseCode(c)) if c == code));
        }
    }

    // Fragmenting a message and reassembling it is the identity, for any
    // chunk size.
    #[test]
    fn prop_fragment_reassemble_roundtrip(
        payload in prop::collection::vec(any::<u8>(), 0..1000),
        chunk_size in 1usize..257
    ) {
        let mut assembler = wsabnf::MessageAssembler::new(&Config::default());
        let mut result = None;
        for frame in wsabnf::Fragmenter::new(&payload, OpCode::Binary, chunk_size) {
            result = assembler.process(frame).unwrap();
        }
        let message = result.expect("last fragment completes the message");
        prop_assert_eq!(message.opcode, OpCode::Binary);
        prop_assert_eq!(message.payload, payload);
    }
}
