//! Leading-zero-bit difficulty checks.
//!
//! Difficulty is the number of leading zero bits required of a hash, in
//! big-endian bit order over the raw bytes. The two functions here agree
//! on the defining equivalence: `meets_difficulty(h, k)` iff
//! `apparent_difficulty(h) >= k`.

use webcash_types::WebcashHash;

/// True iff the hash's leading `difficulty` bits are all zero.
///
/// Values above 256 are never satisfiable. The sub-byte remainder is
/// handled by a byte threshold: a partial group of `r` zero bits requires
/// the next byte to be at most `2^(8-r) - 1`.
pub fn meets_difficulty(hash: &WebcashHash, difficulty: u32) -> bool {
    if difficulty > 256 {
        return false;
    }
    let bytes = hash.as_bytes();
    let whole = (difficulty / 8) as usize;
    if bytes[..whole].iter().any(|&b| b != 0) {
        return false;
    }
    let remainder = difficulty % 8;
    if remainder == 0 {
        return true;
    }
    bytes[whole] <= (0xffu8 >> remainder)
}

/// The number of leading zero bits the hash actually exhibits, 0..=256.
pub fn apparent_difficulty(hash: &WebcashHash) -> u32 {
    let mut bits = 0;
    for &byte in hash.as_bytes() {
        if byte == 0 {
            bits += 8;
        } else {
            return bits + byte.leading_zeros();
        }
    }
    bits
}
