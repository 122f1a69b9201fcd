//! Streaming UTF-8 validation for text payloads and close reasons.
//!
//! A byte-driven DFA (Bjoern Hoehrmann's table layout) that carries its
//! state across calls, so a multi-byte codepoint split over a fragment
//! boundary validates without buffering. Overlong encodings, surrogates
//! (U+D800..U+DFFF), and codepoints above U+10FFFF are rejected, per
//! RFC 3629.

use crate::error::{Error, Result};

const UTF8_ACCEPT: u8 = 0;
const UTF8_REJECT: u8 = 12;

/// First 256 entries map bytes to character classes; the rest is the
/// transition table indexed by `state + class`, states premultiplied by 12.
#[rustfmt::skip]
static UTF8_TABLE: [u8; 364] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    8, 8, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    10, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 4, 3, 3,
    11, 6, 6, 6, 5, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,

    0, 12, 24, 36, 60, 96, 84, 12, 12, 12, 48, 72,
    12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12,
    12, 0, 12, 12, 12, 12, 12, 0, 12, 0, 12, 12,
    12, 24, 12, 12, 12, 12, 12, 24, 12, 24, 12, 12,
    12, 12, 12, 12, 12, 12, 12, 24, 12, 12, 12, 12,
    12, 24, 12, 12, 12, 12, 12, 12, 12, 24, 12, 12,
    12, 12, 12, 12, 12, 12, 12, 36, 12, 36, 12, 12,
    12, 36, 12, 12, 12, 12, 12, 36, 12, 36, 12, 12,
    12, 36, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12,
];

/// Incremental UTF-8 validator.
///
/// Feed each fragment with `is_final = false` and the last one with
/// `is_final = true`; an incomplete trailing codepoint is only an error
/// on the final fragment.
#[derive(Debug, Clone)]
pub struct Utf8Validator {
    state: u8,
}

impl Default for Utf8Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Validator {
    /// Create a validator in the accepting state.
    #[must_use]
    pub fn new() -> Self {
        Self { state: UTF8_ACCEPT }
    }

    /// Validate the next fragment of a text payload.
    ///
    /// # Errors
    ///
    /// `Error::InvalidUtf8` on the first byte that cannot extend a valid
    /// sequence, or when `is_final` and the payload ends mid-codepoint.
    pub fn validate(&mut self, data: &[u8], is_final: bool) -> Result<()> {
        for &byte in data {
            let class = UTF8_TABLE[byte as usize];
            self.state = UTF8_TABLE[256 + self.state as usize + class as usize];
            if self.state == UTF8_REJECT {
                return Err(Error::InvalidUtf8);
            }
        }
        if is_final && self.state != UTF8_ACCEPT {
            return Err(Error::InvalidUtf8);
        }
        Ok(())
    }

    /// Discard any partial codepoint and return to the accepting state.
    pub fn reset(&mut self) {
        self.state = UTF8_ACCEPT;
    }

    /// Whether the validator is mid-codepoint.
    #[must_use]
    pub fn has_incomplete(&self) -> bool {
        self.state != UTF8_ACCEPT
    }
}

/// Validate a complete byte slice as well-formed UTF-8.
///
/// # Errors
///
/// `Error::InvalidUtf8` if `data` is not valid UTF-8.
pub fn validate_utf8(data: &[u8]) -> Result<()> {
    Utf8Validator::new().validate(data, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_complete_payloads() {
        assert!(validate_utf8(b"").is_ok());
        assert!(validate_utf8(b"Hello, World!").is_ok());
        assert!(validate_utf8("こんにちは".as_bytes()).is_ok());
        assert!(validate_utf8("Hello 世界 🌍".as_bytes()).is_ok());
        // Highest codepoint.
        assert!(validate_utf8("\u{10ffff}".as_bytes()).is_ok());
    }

    #[test]
    fn test_invalid_complete_payloads() {
        // Bare continuation byte.
        assert!(validate_utf8(&[0x80]).is_err());
        // Overlong two-byte encoding of '/'.
        assert!(validate_utf8(&[0xc0, 0xaf]).is_err());
        // Overlong NUL.
        assert!(validate_utf8(&[0xc0, 0x80]).is_err());
        // 0xff never appears in UTF-8.
        assert!(validate_utf8(&[0xff]).is_err());
        // CESU-8 style surrogate D800.
        assert!(validate_utf8(&[0xed, 0xa0, 0x80]).is_err());
        // Codepoint above U+10FFFF.
        assert!(validate_utf8(&[0xf4, 0x90, 0x80, 0x80]).is_err());
        // Truncated three-byte sequence followed by ASCII.
        assert!(validate_utf8(&[0xe2, 0x82, 0x41]).is_err());
    }

    #[test]
    fn test_boundary_codepoints() {
        // U+D7FF and U+E000 straddle the surrogate gap and are both fine.
        assert!(validate_utf8(&[0xed, 0x9f, 0xbf]).is_ok());
        assert!(validate_utf8(&[0xee, 0x80, 0x80]).is_ok());
    }

    #[test]
    fn test_incomplete_non_final_fragment() {
        let mut validator = Utf8Validator::new();
        // First byte of the euro sign (E2 82 AC).
        assert!(validator.validate(&[0xe2], false).is_ok());
        assert!(validator.has_incomplete());
        assert!(validator.validate(&[0x82, 0xac], true).is_ok());
        assert!(!validator.has_incomplete());
    }

    #[test]
    fn test_incomplete_final_fragment_fails() {
        let mut validator = Utf8Validator::new();
        assert!(validator.validate(&[0xe2], true).is_err());
    }

    #[test]
    fn test_codepoint_split_every_way() {
        // 🎉 = F0 9F 8E 89, split at each boundary.
        for split in 1..4 {
            let bytes = [0xf0u8, 0x9f, 0x8e, 0x89];
            let mut validator = Utf8Validator::new();
            assert!(validator.validate(&bytes[..split], false).is_ok());
            assert!(validator.validate(&bytes[split..], true).is_ok());
        }
    }

    #[test]
    fn test_empty_fragment_preserves_state() {
        let mut validator = Utf8Validator::new();
        assert!(validator.validate(&[0xe4], false).is_ok());
        assert!(validator.validate(&[], false).is_ok());
        assert!(validator.has_incomplete());
        assert!(validator.validate(&[0xb8, 0x96], true).is_ok());
    }

    #[test]
    fn test_reset() {
        let mut validator = Utf8Validator::new();
        assert!(validator.validate(&[0xe2], false).is_ok());
        validator.reset();
        assert!(!validator.has_incomplete());
        assert!(validator.validate(b"fresh", true).is_ok());
    }

    #[test]
    fn test_invalid_in_middle_of_fragment() {
        let mut validator = Utf8Validator::new();
        let data = &[0x48, 0x65, 0x80, 0x6c, 0x6f];
        assert!(validator.validate(data, false).is_err());
    }

    #[test]
    fn test_agrees_with_std_on_fixtures() {
        let fixtures: &[&[u8]] = &[
            b"plain ascii",
            "mixé ✓".as_bytes(),
            &[0xc2, 0xa9],
            &[0xc2],
            &[0xe0, 0x80, 0x80],
            &[0xe0, 0xa0, 0x80],
            &[0xf0, 0x28, 0x8c, 0xbc],
            &[0xf1, 0x80, 0x80, 0x80],
        ];
        for &bytes in fixtures {
            assert_eq!(
                validate_utf8(bytes).is_ok(),
                std::str::from_utf8(bytes).is_ok(),
                "disagreement on {bytes:x?}"
            );
        }
    }
}
