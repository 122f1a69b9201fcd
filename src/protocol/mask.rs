//! Payload masking (RFC 6455 §5.3): XOR against a repeating 4-byte key.
//!
//! Masking is an involution, so the same routine serves both directions.

/// Byte-by-byte reference implementation.
#[inline]
pub fn apply_mask(data: &mut [u8], key: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= key[i % 4];
    }
}

/// Word-at-a-time masking: XOR 8-byte chunks against the key pattern
/// broadcast into a `u64`, then finish the tail byte-wise.
///
/// The key repeats every 4 bytes, so a u64 built from two copies of the
/// key lines up with any chunk starting at a multiple of 8.
#[inline]
pub fn apply_mask_fast(data: &mut [u8], key: [u8; 4]) {
    let pattern = u64::from_ne_bytes([
        key[0], key[1], key[2], key[3], key[0], key[1], key[2], key[3],
    ]);

    let mut chunks = data.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let masked = u64::from_ne_bytes(word) ^ pattern;
        chunk.copy_from_slice(&masked.to_ne_bytes());
    }

    // Tail starts at a multiple of 8, which is also a multiple of 4.
    for (i, byte) in chunks.into_remainder().iter_mut().enumerate() {
        *byte ^= key[i % 4];
    }
}
