//! Quadratic extensions GF(p²) = GF(p)[x]/(x² − C1·x − C0).
//!
//! The element `a0 + a1·x` is stored as the raw value `a0 + a1·p`, the same
//! base-p layout used for polynomial encodings elsewhere in the kernel.

use super::Field;

/// GF(P²) with the reduction rule x² = C0 + C1·x. The polynomial
/// x² − C1·x − C0 must be irreducible over GF(P).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quadratic<const P: u8, const C0: u8, const C1: u8>;

impl<const P: u8, const C0: u8, const C1: u8> Quadratic<P, C0, C1> {
    #[inline]
    fn split(a: u8) -> (u32, u32) {
        ((a % P) as u32, (a / P) as u32)
    }

    #[inline]
    fn join(a0: u32, a1: u32) -> u8 {
        let p = P as u32;
        ((a0 % p) + (a1 % p) * p) as u8
    }
}

impl<const P: u8, const C0: u8, const C1: u8> Field for Quadratic<P, C0, C1> {
    const ORDER: u32 = (P as u32) * (P as u32);
    const CHARACTERISTIC: u32 = P as u32;
    const DEGREE: u32 = 2;

    fn add_raw(a: u8, b: u8) -> u8 {
        let (a0, a1) = Self::split(a);
        let (b0, b1) = Self::split(b);
        Self::join(a0 + b0, a1 + b1)
    }

    fn neg_raw(a: u8) -> u8 {
        let p = P as u32;
        let (a0, a1) = Self::split(a);
        Self::join(p - a0, p - a1)
    }

    fn mul_raw(a: u8, b: u8) -> u8 {
        let (a0, a1) = Self::split(a);
        let (b0, b1) = Self::split(b);
        let top = a1 * b1;
        let c0 = a0 * b0 + top * C0 as u32;
        let c1 = a0 * b1 + a1 * b0 + top * C1 as u32;
        Self::join(c0, c1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Gf4, Gf9};

    fn has_zero_divisors<F: Field>() -> bool {
        (1..F::ORDER as u8).any(|a| (1..F::ORDER as u8).any(|b| F::mul_raw(a, b) == 0))
    }

    #[test]
    fn test_reduction_polynomials_are_irreducible() {
        assert!(!has_zero_divisors::<Gf4>());
        assert!(!has_zero_divisors::<Gf9>());
    }

    #[test]
    fn test_gf9_addition_is_digitwise() {
        // (2 + x) + (2 + 2x) = 1 + 0x
        assert_eq!(Gf9::add_raw(5, 8), 1);
        assert_eq!(Gf9::neg_raw(5), 7); // -(2 + x) = 1 + 2x
    }
}
