//! Chirality-repairing Reed-Solomon codec for short, human-transcribable
//! strings.
//!
//! Encoding turns a byte slice into a string built from two alphabets that
//! alternate by character position, plus Reed-Solomon check symbols.
//! Decoding runs three layers in sequence:
//!
//! 1. [`transcription::decode_display`] parses the string and repairs
//!    inserted, deleted, or adjacent-transposed characters by watching for
//!    breaks in the odd/even alphabet alternation.
//! 2. [`transcription::try_hard_decode`] runs the algebraic Reed-Solomon
//!    decoder over the repaired symbol stream, retrying with a rotated
//!    window if the first attempt fails.
//! 3. [`encode`]/[`decode`] are the only public entry points: both flatten
//!    every internal failure to an empty result rather than exposing a
//!    `Result`, since a failed decode of a human-mistyped code has no
//!    single "reason" worth reporting to a caller.

pub mod buffer;
pub mod error;
pub mod gf16;
pub mod rs;
pub mod transcription;

use buffer::NybbleBuffer;
pub use error::CodecError;

/// Number of nybbles a byte expands to.
const NYBBLES_PER_BYTE: usize = 2;

fn bytes_to_nybbles(bytes: &[u8]) -> NybbleBuffer {
    let mut buf = NybbleBuffer::zeroed(bytes.len() * NYBBLES_PER_BYTE);
    for (i, &b) in bytes.iter().enumerate() {
        buf.set(i * 2, b >> 4);
        buf.set(i * 2 + 1, b & 0x0F);
    }
    buf
}

fn nybbles_to_bytes(nybbles: &NybbleBuffer, byte_length: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(byte_length);
    for i in 0..byte_length {
        let hi = nybbles.get(i * 2);
        let lo = nybbles.get(i * 2 + 1);
        out.push((hi << 4) | lo);
    }
    out
}

/// Encode `bytes` into a multi-code string with `sym` Reed-Solomon check
/// symbols, displayed with `-`/` ` separators every 4th/2nd character.
pub fn encode(bytes: &[u8], sym: usize) -> String {
    let msg = bytes_to_nybbles(bytes);
    let code = rs::encode(&msg, sym);
    transcription::display(&code)
}

/// Decode a multi-code string back into `original_byte_length` bytes.
///
/// Any failure in parsing, chirality repair, or Reed-Solomon correction
/// produces an empty `Vec`, never a panic or a propagated error; internal
/// diagnostics are available via `tracing` for callers who enable it.
pub fn decode(code: &str, original_byte_length: usize, sym: usize) -> Vec<u8> {
    let expected_code_length = original_byte_length * NYBBLES_PER_BYTE + sym;

    let repaired = match transcription::decode_display(expected_code_length, code) {
        Ok(codes) => codes,
        Err(err) => {
            tracing::debug!(%err, "decode: chirality repair failed");
            return Vec::new();
        }
    };

    let corrected = match transcription::try_hard_decode(&repaired, sym, expected_code_length) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!(%err, "decode: reed-solomon correction failed");
            return Vec::new();
        }
    };

    nybbles_to_bytes(&corrected, original_byte_length)
}
