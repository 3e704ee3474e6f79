//! GF(2^4) arithmetic with primitive polynomial `0x13` (19).
//!
//! Tables are built once, lazily, behind a [`OnceLock`]: the field's
//! exp/log tables never change after first use, so a single shared
//! static is both correct and the simplest option (spec allows eager
//! static init or one-time-init; we pick the latter to avoid paying
//! table construction cost for programs that never touch the codec).

use std::sync::OnceLock;

use crate::buffer::NybbleBuffer;

const PRIMITIVE: u16 = 0x13;

struct Tables {
    exp: [u8; 32],
    log: [u8; 16],
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut exp = [0u8; 32];
        let mut log = [0u8; 16];
        let mut x: u16 = 1;
        for i in 0..16u16 {
            exp[i as usize] = (x & 0x0F) as u8;
            log[x as usize] = (i & 0x0F) as u8;
            x <<= 1;
            if x & 0x110 != 0 {
                x ^= PRIMITIVE;
            }
        }
        for i in 15..32usize {
            exp[i] = exp[i - 15];
        }
        Tables { exp, log }
    })
}

/// `a + b` (equivalently `a - b`) in GF(2^4).
pub fn add(a: u8, b: u8) -> u8 {
    (a ^ b) & 0x0F
}

/// `a * b` in GF(2^4).
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[(t.log[a as usize] as usize + t.log[b as usize] as usize) % 15]
}

/// `a / b` in GF(2^4); `0` if either operand is `0`.
pub fn div(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[(t.log[a as usize] as usize + 15 - t.log[b as usize] as usize) % 15]
}

/// `n ^ p` in GF(2^4).
pub fn pow(n: u8, p: u32) -> u8 {
    let t = tables();
    t.exp[(t.log[n as usize] as usize * p as usize) % 15]
}

/// Multiplicative inverse of `n` (`n` must be nonzero).
pub fn inverse(n: u8) -> u8 {
    let t = tables();
    t.exp[15 - t.log[n as usize] as usize]
}

/// Multiply every coefficient of `p` by the scalar `sc`.
pub fn mul_poly_scalar(p: &NybbleBuffer, sc: u8) -> NybbleBuffer {
    p.iter().map(|&c| mul(c, sc)).collect()
}

/// Add two polynomials, right-aligning the shorter one.
pub fn add_poly(p: &NybbleBuffer, q: &NybbleBuffer) -> NybbleBuffer {
    let len = p.len().max(q.len());
    let mut result = NybbleBuffer::zeroed(len);
    for i in 0..p.len() {
        let idx = i + len - p.len();
        result.set(idx, p.get(i));
    }
    for i in 0..q.len() {
        let idx = i + len - q.len();
        let v = result.get(idx);
        result.set(idx, add(v, q.get(i)));
    }
    result
}

/// Multiply two polynomials, producing one of length `|p|+|q|-1`.
pub fn mul_poly(p: &NybbleBuffer, q: &NybbleBuffer) -> NybbleBuffer {
    let mut result = NybbleBuffer::zeroed(p.len() + q.len() - 1);
    for j in 0..q.len() {
        for i in 0..p.len() {
            let v = add(result.get(i + j), mul(p.get(i), q.get(j)));
            result.set(i + j, v);
        }
    }
    result
}

/// Evaluate `p` at `x` via Horner's method.
pub fn eval_poly(p: &NybbleBuffer, x: u8) -> u8 {
    let mut y = p.get(0);
    for i in 1..p.len() {
        y = mul(y, x) ^ p.get(i);
    }
    y & 0x0F
}

/// Build the degree-`sym` generator polynomial `prod_{i=0..sym-1} (x + 2^i)`.
pub fn generator_poly(sym: usize) -> NybbleBuffer {
    let mut gen = NybbleBuffer::one();
    for i in 0..sym {
        let pair = NybbleBuffer::pair(1, pow(2, i as u32));
        gen = mul_poly(&gen, &pair);
    }
    gen
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn elem() -> impl Strategy<Value = u8> {
        0u8..16
    }

    proptest! {
        #[test]
        fn add_is_commutative(a in elem(), b in elem()) {
            prop_assert_eq!(add(a, b), add(b, a));
        }

        #[test]
        fn add_identity(a in elem()) {
            prop_assert_eq!(add(a, 0), a);
        }

        #[test]
        fn add_self_is_zero(a in elem()) {
            prop_assert_eq!(add(a, a), 0);
        }

        #[test]
        fn mul_by_zero_is_zero(a in elem()) {
            prop_assert_eq!(mul(a, 0), 0);
        }

        #[test]
        fn mul_identity(a in elem()) {
            prop_assert_eq!(mul(a, 1), a);
        }

        #[test]
        fn mul_is_commutative(a in elem(), b in elem()) {
            prop_assert_eq!(mul(a, b), mul(b, a));
        }

        #[test]
        fn mul_inverse_is_one(a in 1u8..16) {
            prop_assert_eq!(mul(a, inverse(a)), 1);
        }

        #[test]
        fn div_undoes_mul(a in elem(), b in 1u8..16) {
            prop_assert_eq!(div(mul(a, b), b), a);
        }

        #[test]
        fn pow_zero_is_one(n in 1u8..16) {
            prop_assert_eq!(pow(n, 0), 1);
        }

        #[test]
        fn pow_one_is_identity(n in 1u8..16) {
            prop_assert_eq!(pow(n, 1), n);
        }
    }

    #[test]
    fn eval_single_coefficient_poly_is_constant() {
        let p = NybbleBuffer::one();
        assert_eq!(eval_poly(&p, 7), 1);
    }

    #[test]
    fn eval_is_additive_over_poly_add() {
        let p = NybbleBuffer::from_iter_vals([3, 1, 4]);
        let q = NybbleBuffer::from_iter_vals([5, 9]);
        for x in 0u8..16 {
            let lhs = eval_poly(&add_poly(&p, &q), x);
            let rhs = add(eval_poly(&p, x), eval_poly(&q, x));
            assert_eq!(lhs, rhs, "x={x}");
        }
    }

    #[test]
    fn eval_is_multiplicative_over_poly_mul() {
        let p = NybbleBuffer::from_iter_vals([3, 1, 4]);
        let q = NybbleBuffer::from_iter_vals([5, 9]);
        for x in 0u8..16 {
            let lhs = eval_poly(&mul_poly(&p, &q), x);
            let rhs = mul(eval_poly(&p, x), eval_poly(&q, x));
            assert_eq!(lhs, rhs, "x={x}");
        }
    }

    #[test]
    fn generator_poly_has_expected_degree() {
        let g = generator_poly(8);
        assert_eq!(g.len(), 9);
    }
}
