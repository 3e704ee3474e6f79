//! Alphabet tables, character normalization, and the chirality-aware
//! transcription repair layer that runs ahead of the algebraic decoder.
//!
//! "Chirality" here is just which of the two alternating alphabets a
//! character came from; since that alphabet should strictly alternate
//! with position, a mismatch pinpoints where a transcription mistake
//! happened before any Reed-Solomon machinery gets involved.

use crate::buffer::NybbleBuffer;
use crate::error::CodecError;
use crate::rs;

/// Characters at positions 0, 2, 4, ... decode through this alphabet.
pub const ODD_SET: &str = "01236789bGJNqXYZ~";
/// Characters at positions 1, 3, 5, ... decode through this alphabet.
pub const EVEN_SET: &str = "45ACDEFHKMPRsTVW~";
/// Characters ignored entirely on input.
pub const SPACES: &str = " -._+*#";

/// Only the first 16 characters of an alphabet are valid decoded
/// indices; the 17th (`~`) is the error sentinel, used on output only.
/// A `~` typed on input must not be treated as "found" here, or it
/// would short-circuit into the both-alphabets-matched abort path
/// instead of being treated as an ordinary unrecognized character
/// that RS correction can still fix.
fn index_of_decodable(set: &str, c: char) -> Option<usize> {
    set[..16].find(c)
}

fn is_space(c: char) -> bool {
    SPACES.contains(c)
}

/// Likely transcription mistakes, mapped to the character we guess was meant.
fn correction(c: char) -> char {
    match c {
        'O' => '0',
        'L' => '1',
        'I' => '1',
        'U' => 'V',
        other => other,
    }
}

/// Case changes that improve visual distinction from digits.
fn case_change(c: char) -> char {
    match c {
        'B' => 'b',
        'Q' => 'q',
        'S' => 's',
        other => other,
    }
}

/// Normalize one input character: uppercase, then the case/confusion fixups.
/// Idempotent: applying this twice is the same as applying it once, since
/// every fixed point of `correction` and `case_change` is itself unaffected
/// by a second pass, and uppercasing an already-uppercase ASCII char is a
/// no-op.
fn normalize(c: char) -> char {
    let c = c.to_ascii_uppercase();
    let c = case_change(c);
    correction(c)
}

/// Message value and output position to the encoded character.
fn encode_display(n: u8, position: usize) -> char {
    if n > 15 {
        return '~';
    }
    let set = if position % 2 == 0 { ODD_SET } else { EVEN_SET };
    set.as_bytes()[n as usize] as char
}

/// Render a coded nybble stream as a multi-code string, with separators
/// every 2nd character and every 4th.
pub fn display(codes: &NybbleBuffer) -> String {
    let mut out = String::with_capacity(codes.len() + codes.len() / 2);
    for i in 0..codes.len() {
        if i > 0 {
            if i % 4 == 0 {
                out.push('-');
            } else if i % 2 == 0 {
                out.push(' ');
            }
        }
        out.push(encode_display(codes.get(i), i));
    }
    out
}

/// Parse a raw string into (codes, chirality), applying normalization and
/// the character-deficit heuristic for unrecognized characters.
fn parse_display(
    expected_code_length: usize,
    input: &str,
) -> Result<(NybbleBuffer, NybbleBuffer), CodecError> {
    // A C-style embedded NUL marks end of the logical string.
    let input = match input.find('\0') {
        Some(idx) => &input[..idx],
        None => input,
    };

    let mut valid_char_count = 0usize;
    for c in input.chars() {
        if is_space(c) {
            continue;
        }
        let norm = normalize(c);
        if index_of_decodable(ODD_SET, norm).is_some()
            || index_of_decodable(EVEN_SET, norm).is_some()
        {
            valid_char_count += 1;
        } else {
            tracing::debug!(char = %norm, "unrecognized character during decode");
        }
    }

    let mut char_count_mismatch = expected_code_length as isize - valid_char_count as isize;

    let mut codes = NybbleBuffer::empty();
    let mut chirality = NybbleBuffer::empty();
    let mut next_chi: u8 = 0;

    for c in input.chars() {
        if is_space(c) {
            continue;
        }
        let norm = normalize(c);
        let odd_idx = index_of_decodable(ODD_SET, norm);
        let even_idx = index_of_decodable(EVEN_SET, norm);

        match (odd_idx, even_idx) {
            (None, None) => {
                if char_count_mismatch > 0 {
                    codes.push(0);
                    chirality.push(next_chi);
                    next_chi = 1 - next_chi;
                    char_count_mismatch -= 1;
                } else {
                    char_count_mismatch += 1;
                }
            }
            (Some(_), Some(_)) => return Err(CodecError::TableCorruption),
            (Some(idx), None) => {
                codes.push(idx as u8);
                chirality.push(0);
                next_chi = 1;
            }
            (None, Some(idx)) => {
                codes.push(idx as u8);
                chirality.push(1);
                next_chi = 0;
            }
        }
    }

    Ok((codes, chirality))
}

fn find_first_chirality_error(chirality: &NybbleBuffer) -> Option<usize> {
    (0..chirality.len()).find(|&p| chirality.get(p) != (p as u8 & 1))
}

enum RepairOutcome {
    /// Nothing more to do: either the stream already matches, or it's
    /// too degraded to keep repairing.
    Done,
    /// One repair action was applied; the caller should run again since
    /// earlier positions may now look different.
    RunAgain,
}

/// Apply a single repair action: insert, delete, or transpose one
/// position based on where the chirality parity first breaks.
fn repair_step(
    expected_code_length: usize,
    codes: &mut NybbleBuffer,
    chirality: &mut NybbleBuffer,
) -> RepairOutcome {
    if codes.len() != chirality.len() {
        return RepairOutcome::Done;
    }

    let current_length = codes.len();
    // Equivalent to `current_length < (2 * expected_code_length) / 3.0`
    // without floating point, so the boundary case matches exactly.
    if current_length * 3 < 2 * expected_code_length {
        return RepairOutcome::Done;
    }

    let first_err = find_first_chirality_error(chirality);
    if current_length == expected_code_length && first_err.is_none() {
        return RepairOutcome::Done;
    }

    if current_length < expected_code_length {
        return repair_too_short(expected_code_length, codes, chirality, first_err);
    }

    if current_length > expected_code_length {
        return repair_too_long(expected_code_length, codes, chirality, first_err);
    }

    repair_transposed(expected_code_length, codes, chirality, first_err.unwrap())
}

fn repair_too_short(
    expected_code_length: usize,
    codes: &mut NybbleBuffer,
    chirality: &mut NybbleBuffer,
    first_err: Option<usize>,
) -> RepairOutcome {
    let current_length = codes.len();

    let Some(first_err_pos) = first_err else {
        // Error at the tail: guess a trailing deletion.
        let chi = (current_length & 1) as u8;
        let end_chi = (expected_code_length & 1) as u8;
        let diff = expected_code_length - current_length;
        if diff == 1 && chi == end_chi {
            codes.push_front(0);
            codes.push_front(0);
        } else {
            codes.push(0);
            chirality.push(chi);
        }
        return RepairOutcome::RunAgain;
    };

    let chi = (first_err_pos & 1) as u8;
    let chi_next = ((first_err_pos + 1) & 1) as u8;
    // Deliberately `(first_err_pos + 1) & 1`, same as `chi_next`, not `+ 2`:
    // kept this way for wire-format compatibility with existing encoders.
    let chi_3rd = ((first_err_pos + 1) & 1) as u8;

    let not_at_end = first_err_pos < current_length.saturating_sub(3);
    let this_pos_wrong = chirality.get(first_err_pos) != chi;
    let is_adjacent_transpose = not_at_end
        && this_pos_wrong
        && chirality.get(first_err_pos + 1) != chi_next
        && chirality.get(first_err_pos + 2) == chi_3rd;

    if is_adjacent_transpose {
        codes.swap(first_err_pos, first_err_pos + 1);
        chirality.swap(first_err_pos, first_err_pos + 1);
        return RepairOutcome::RunAgain;
    }

    codes.insert_at(first_err_pos, 0);
    chirality.insert_at(first_err_pos, chi);
    RepairOutcome::RunAgain
}

fn repair_too_long(
    expected_code_length: usize,
    codes: &mut NybbleBuffer,
    chirality: &mut NybbleBuffer,
    first_err: Option<usize>,
) -> RepairOutcome {
    let current_length = codes.len();
    let expected_last_chi = ((1 + expected_code_length) & 1) as u8;
    if chirality.get(current_length - 1) != expected_last_chi {
        codes.pop();
        chirality.pop();
        return RepairOutcome::RunAgain;
    }

    let pos = first_err.unwrap_or(current_length - 1);
    codes.delete_at(pos);
    chirality.delete_at(pos);
    RepairOutcome::RunAgain
}

fn repair_transposed(
    expected_code_length: usize,
    codes: &mut NybbleBuffer,
    chirality: &mut NybbleBuffer,
    first_err_pos: usize,
) -> RepairOutcome {
    if first_err_pos >= expected_code_length - 1 {
        return RepairOutcome::Done;
    }

    if chirality.get(first_err_pos) == chirality.get(first_err_pos + 1) {
        let flipped = 1 - chirality.get(first_err_pos);
        chirality.set(first_err_pos, flipped);
        return RepairOutcome::RunAgain;
    }

    codes.swap(first_err_pos, first_err_pos + 1);
    chirality.swap(first_err_pos, first_err_pos + 1);
    RepairOutcome::RunAgain
}

/// Run the repair loop up to `expected_code_length` times.
fn repair(expected_code_length: usize, codes: &mut NybbleBuffer, chirality: &mut NybbleBuffer) {
    for _ in 0..expected_code_length {
        match repair_step(expected_code_length, codes, chirality) {
            RepairOutcome::Done => break,
            RepairOutcome::RunAgain => {}
        }
    }
}

/// Parse and repair a raw string into a nybble stream of (hopefully)
/// exactly `expected_code_length` symbols.
pub fn decode_display(
    expected_code_length: usize,
    input: &str,
) -> Result<NybbleBuffer, CodecError> {
    let (mut codes, mut chirality) = parse_display(expected_code_length, input)?;
    repair(expected_code_length, &mut codes, &mut chirality);

    if codes.len() * 3 < 2 * expected_code_length {
        return Err(CodecError::ChiralityUnrecoverable);
    }
    if codes.len() != expected_code_length {
        return Err(CodecError::LengthMismatch {
            expected: expected_code_length,
            got: codes.len(),
        });
    }
    Ok(codes)
}

/// Try RS decode, and if that fails, retry after rotating leading/trailing
/// zero symbols — the chirality repair can pick the wrong boundary when the
/// true deletion/insertion sat among all-zero padding.
pub fn try_hard_decode(
    msg: &NybbleBuffer,
    sym: usize,
    expected_length: usize,
) -> Result<NybbleBuffer, CodecError> {
    if let Ok(decoded) = rs::decode(msg, sym, expected_length) {
        return Ok(decoded);
    }

    let mut msg = msg.clone();
    let half = msg.len() / 2;
    let mut undo = 0usize;

    for _ in 0..half {
        let r = msg.pop_front();
        if r != 0 {
            msg.push_front(r);
            break;
        }
        undo += 1;
        msg.push(r);
        if let Ok(decoded) = rs::decode(&msg, sym, expected_length) {
            tracing::debug!(rotations = undo, "rotation fallback succeeded (left)");
            return Ok(decoded);
        }
    }

    while undo > 0 {
        undo -= 1;
        let r = msg.pop();
        msg.push_front(r);
    }

    for i in 0..half {
        let r = msg.pop();
        if r != 0 {
            msg.push(r);
            break;
        }
        msg.push_front(r);
        if let Ok(decoded) = rs::decode(&msg, sym, expected_length) {
            tracing::debug!(rotations = i + 1, "rotation fallback succeeded (right)");
            return Ok(decoded);
        }
    }

    Err(CodecError::UncorrectedResidual)
}
