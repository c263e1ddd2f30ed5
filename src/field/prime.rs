//! Prime fields ℤ/p.

use super::Field;

/// The prime field GF(P). `P` must be prime; only the aliases in
/// [`crate::field`] are used by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Prime<const P: u8>;

impl<const P: u8> Field for Prime<P> {
    const ORDER: u32 = P as u32;
    const CHARACTERISTIC: u32 = P as u32;
    const DEGREE: u32 = 1;

    #[inline]
    fn add_raw(a: u8, b: u8) -> u8 {
        ((a as u16 + b as u16) % P as u16) as u8
    }

    #[inline]
    fn neg_raw(a: u8) -> u8 {
        (P - a) % P
    }

    #[inline]
    fn mul_raw(a: u8, b: u8) -> u8 {
        ((a as u16 * b as u16) % P as u16) as u8
    }

    /// Fermat inverse a^(p-2).
    fn inv_raw(a: u8) -> Option<u8> {
        if a % P == 0 {
            return None;
        }
        let mut acc = 1u8;
        for _ in 0..P - 2 {
            acc = Self::mul_raw(acc, a);
        }
        Some(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gf5_tables() {
        type F = Prime<5>;
        assert_eq!(F::add_raw(3, 4), 2);
        assert_eq!(F::neg_raw(0), 0);
        assert_eq!(F::neg_raw(2), 3);
        assert_eq!(F::mul_raw(4, 4), 1);
        assert_eq!(F::inv_raw(2), Some(3));
        assert_eq!(F::inv_raw(0), None);
    }

    #[test]
    fn test_gf2_inverse() {
        assert_eq!(Prime::<2>::inv_raw(1), Some(1));
    }
}
