//! Reed-Solomon encode/decode over GF(2^4): systematic polynomial-remainder
//! encoding, syndrome-based decoding with a Berlekamp-Massey-style error
//! locator, Chien search, and Forney correction.

use crate::buffer::NybbleBuffer;
use crate::error::CodecError;
use crate::gf16;

/// Systematically encode `msg` with `sym` check symbols appended.
pub fn encode(msg: &NybbleBuffer, sym: usize) -> NybbleBuffer {
    let gen = gf16::generator_poly(sym);
    let mut buf = NybbleBuffer::zeroed(msg.len() + gen.len() - 1);
    for i in 0..msg.len() {
        buf.set(i, msg.get(i));
    }
    for i in 0..msg.len() {
        let coeff = buf.get(i);
        if coeff == 0 {
            continue;
        }
        for j in 1..gen.len() {
            let v = buf.get(i + j) ^ gf16::mul(gen.get(j), coeff);
            buf.set(i + j, v);
        }
    }
    // Systematic: the data positions are never touched by the remainder,
    // but writing them back explicitly keeps this independent of the
    // in-place division detail above.
    for i in 0..msg.len() {
        buf.set(i, msg.get(i));
    }
    buf
}

/// Syndrome vector: `synd[0] = 0`, `synd[i+1] = msg(2^i)`.
fn calc_syndromes(msg: &NybbleBuffer, sym: usize) -> NybbleBuffer {
    let mut synd = NybbleBuffer::zeroed(sym + 1);
    for i in 0..sym {
        synd.set(i + 1, gf16::eval_poly(msg, gf16::pow(2, i as u32)));
    }
    synd
}

/// Berlekamp-Massey-style error-locator polynomial construction.
fn error_locator_poly(synd: &NybbleBuffer, sym: usize, erases: usize) -> NybbleBuffer {
    let mut err_loc = NybbleBuffer::one();
    let mut old_loc = NybbleBuffer::one();
    let synd_shift = synd.len().saturating_sub(sym);

    for i in 0..(sym - erases) {
        let kappa = i + synd_shift;
        let mut delta = synd.get(kappa);
        for j in 1..err_loc.len() {
            delta ^= gf16::mul(err_loc.get(err_loc.len() - (j + 1)), synd.get(kappa - j));
        }
        old_loc.push(0);

        if delta != 0 {
            if old_loc.len() > err_loc.len() {
                let new_loc = gf16::mul_poly_scalar(&old_loc, delta);
                old_loc = gf16::mul_poly_scalar(&err_loc, gf16::inverse(delta));
                err_loc = new_loc;
            }
            let scale = gf16::mul_poly_scalar(&old_loc, delta);
            err_loc = gf16::add_poly(&err_loc, &scale);
        }
    }

    err_loc.trim_leading_zero();
    err_loc
}

/// Chien search: evaluate the (already-reversed) locator at every field
/// power and record the positions where it vanishes.
fn find_errors(err_loc: &NybbleBuffer, length: usize) -> Vec<usize> {
    let mut pos = Vec::new();
    for i in 0..length {
        if gf16::eval_poly(err_loc, gf16::pow(2, i as u32)) == 0 {
            pos.push(length - 1 - i);
        }
    }
    pos
}

/// `Λ(x) = prod_k (1 + x * 2^{coeff_pos[k]})`, the data error locator.
fn data_error_locator_poly(coeff_pos: &[usize]) -> NybbleBuffer {
    let mut locator = NybbleBuffer::one();
    for &cp in coeff_pos {
        let factor = NybbleBuffer::from_iter_vals([gf16::pow(2, cp as u32), 0]);
        let term = gf16::add_poly(&NybbleBuffer::one(), &factor);
        locator = gf16::mul_poly(&locator, &term);
    }
    locator
}

/// Error evaluator `Omega(x)`: multiply syndromes by the locator, then
/// shift-and-trim down to the lowest `n+1` coefficients.
fn error_evaluator(synd: &NybbleBuffer, err_loc: &NybbleBuffer, n: usize) -> NybbleBuffer {
    let mut poly = gf16::mul_poly(synd, err_loc);
    let length = poly.len() - (n + 1);
    for i in 0..length {
        let v = poly.get(i + length);
        poly.set(i, v);
    }
    poly.trim_end(length);
    poly
}

/// Forney correction: given error positions, compute magnitudes and apply them.
fn correct_errors(msg: &NybbleBuffer, synd: &mut NybbleBuffer, pos: &[usize]) -> NybbleBuffer {
    let length = msg.len();
    let coeff_pos: Vec<usize> = pos.iter().map(|&p| length - 1 - p).collect();

    synd.reverse();
    let err_loc = data_error_locator_poly(&coeff_pos);
    let err_eval = error_evaluator(synd, &err_loc, err_loc.len() - 1);
    let chi: Vec<u8> = coeff_pos.iter().map(|&cp| gf16::pow(2, cp as u32)).collect();

    let mut e = NybbleBuffer::zeroed(length);
    for i in 0..chi.len() {
        let x_inv = gf16::inverse(chi[i]);
        let mut prime = 1u8;
        for (j, &xj) in chi.iter().enumerate() {
            if i == j {
                continue;
            }
            prime = gf16::mul(prime, gf16::add(1, gf16::mul(x_inv, xj)));
        }
        let y = gf16::mul(chi[i], gf16::eval_poly(&err_eval, x_inv));
        e.set(pos[i], gf16::div(y, prime));
    }

    gf16::add_poly(msg, &e)
}

/// Decode `msg` (`sym` check symbols present), correcting up to
/// `sym/2` errors. `expected_length` is the length `msg` should be;
/// on success the returned buffer is that same length, check symbols
/// included (callers strip them).
pub fn decode(
    msg: &NybbleBuffer,
    sym: usize,
    expected_length: usize,
) -> Result<NybbleBuffer, CodecError> {
    let erases = expected_length.saturating_sub(msg.len());
    let mut synd = calc_syndromes(msg, sym);

    if synd.all_zero() {
        tracing::debug!("rs decode: syndromes clean");
        return Ok(msg.clone());
    }

    let mut err_loc = error_locator_poly(&synd, sym, erases);
    let degree = err_loc.len() as isize - 1 - erases as isize;
    if degree > sym as isize {
        let degree = err_loc.len() - 1;
        tracing::debug!(degree, sym, "rs decode: too many errors");
        return Err(CodecError::TooManyErrors { degree, sym });
    }

    err_loc.reverse();
    let mut error_positions = find_errors(&err_loc, msg.len());
    let expected = err_loc.len() - 1;
    if error_positions.len() != expected {
        tracing::debug!(
            found = error_positions.len(),
            expected,
            "rs decode: Chien search count mismatch"
        );
        return Err(CodecError::ChienMismatch {
            found: error_positions.len(),
            expected,
        });
    }
    error_positions.reverse();

    let corrected = correct_errors(msg, &mut synd, &error_positions);

    let resid = calc_syndromes(&corrected, sym);
    if resid.all_zero() {
        tracing::debug!(errors = error_positions.len(), "rs decode: corrected");
        Ok(corrected)
    } else {
        tracing::debug!("rs decode: residual syndrome nonzero after correction");
        Err(CodecError::UncorrectedResidual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn msg_of(vals: &[u8]) -> NybbleBuffer {
        NybbleBuffer::from_iter_vals(vals.iter().copied())
    }

    #[test]
    fn encode_is_systematic() {
        let msg = msg_of(&[1, 2, 3, 4]);
        let code = encode(&msg, 4);
        assert_eq!(code.len(), 8);
        for i in 0..4 {
            assert_eq!(code.get(i), msg.get(i));
        }
    }

    #[test]
    fn decode_clean_codeword_is_noop() {
        let msg = msg_of(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let code = encode(&msg, 6);
        let decoded = decode(&code, 6, code.len()).unwrap();
        assert_eq!(decoded, code);
    }

    #[test]
    fn decode_corrects_single_error() {
        let msg = msg_of(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let mut code = encode(&msg, 6);
        code.set(3, code.get(3) ^ 0x0A);
        let decoded = decode(&code, 6, code.len()).unwrap();
        let expected = encode(&msg, 6);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn decode_fails_with_too_many_errors() {
        let msg = msg_of(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let mut code = encode(&msg, 6);
        // sym=6 corrects at most 3 symbols; corrupt 5.
        for i in 0..5 {
            code.set(i, code.get(i) ^ 0x0F);
        }
        assert!(decode(&code, 6, code.len()).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary_messages(
            vals in prop::collection::vec(0u8..16, 1..20),
            sym in 2usize..9,
        ) {
            let msg = NybbleBuffer::from_iter_vals(vals);
            let code = encode(&msg, sym);
            let decoded = decode(&code, sym, code.len()).unwrap();
            prop_assert_eq!(decoded, code);
        }

        #[test]
        fn corrects_up_to_capacity(
            vals in prop::collection::vec(0u8..16, 4..16),
            sym in 2usize..9,
            seed in any::<u64>(),
        ) {
            let msg = NybbleBuffer::from_iter_vals(vals);
            let clean = encode(&msg, sym);
            let capacity = sym / 2;
            if capacity == 0 {
                return Ok(());
            }
            let mut corrupted = clean.clone();
            let mut rng = seed;
            let mut used = std::collections::HashSet::new();
            let mut applied = 0;
            while applied < capacity {
                rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
                let idx = (rng >> 33) as usize % corrupted.len();
                if used.contains(&idx) {
                    continue;
                }
                used.insert(idx);
                rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
                let mut val = (rng >> 33) as u8 & 0x0F;
                if val == corrupted.get(idx) {
                    val ^= 1;
                }
                corrupted.set(idx, val);
                applied += 1;
            }
            let decoded = decode(&corrupted, sym, corrupted.len()).unwrap();
            prop_assert_eq!(decoded, clean);
        }
    }
}
