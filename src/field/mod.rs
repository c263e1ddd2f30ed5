//! Exact arithmetic over small finite fields.
//!
//! A field is a zero-sized marker type implementing [`Field`]; elements are
//! [`Fq<F>`] values that carry the marker, so combining elements of two
//! different fields does not type-check. Raw values use a base-p encoding:
//! prime fields store `a` directly, quadratic extensions store `a0 + a1·p`
//! for the element `a0 + a1·x`.
//!
//! | Alias | Field | Construction |
//! |-------|-------|--------------|
//! | `Gf2` | GF(2) | ℤ/2 |
//! | `Gf3` | GF(3) | ℤ/3 |
//! | `Gf4` | GF(4) | GF(2)[x]/(x² + x + 1) |
//! | `Gf5` | GF(5) | ℤ/5 |
//! | `Gf7` | GF(7) | ℤ/7 |
//! | `Gf9` | GF(9) | GF(3)[x]/(x² + 1) |

mod prime;
mod quadratic;

pub use prime::Prime;
pub use quadratic::Quadratic;

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use thiserror::Error;

pub type Gf2 = Prime<2>;
pub type Gf3 = Prime<3>;
pub type Gf5 = Prime<5>;
pub type Gf7 = Prime<7>;
/// GF(4) = GF(2)[x]/(x² + x + 1).
pub type Gf4 = Quadratic<2, 1, 1>;
/// GF(9) = GF(3)[x]/(x² + 1).
pub type Gf9 = Quadratic<3, 2, 0>;

/// Field orders with a concrete marker type.
pub const SUPPORTED_ORDERS: [u32; 6] = [2, 3, 4, 5, 7, 9];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("division by zero in GF({order})")]
    DivisionByZero { order: u32 },
    #[error("field order mismatch: expected GF({expected}), found GF({found})")]
    OrderMismatch { expected: u32, found: u32 },
    #[error("value {value} is not an element of GF({order})")]
    OutOfRange { value: u32, order: u32 },
    #[error("unsupported field order {0} (supported: 2, 3, 4, 5, 7, 9)")]
    Unsupported(u32),
}

/// A finite field, described by raw arithmetic on its base-p encoding.
pub trait Field: Copy + Eq + Ord + Hash + Default + fmt::Debug + Send + Sync + 'static {
    /// Number of elements q.
    const ORDER: u32;
    /// The prime p with q = p^DEGREE.
    const CHARACTERISTIC: u32;
    const DEGREE: u32;

    fn add_raw(a: u8, b: u8) -> u8;
    fn neg_raw(a: u8) -> u8;
    fn mul_raw(a: u8, b: u8) -> u8;

    /// Multiplicative inverse, `None` for zero.
    fn inv_raw(a: u8) -> Option<u8> {
        if a == 0 {
            return None;
        }
        (1..Self::ORDER as u8).find(|&b| Self::mul_raw(a, b) == 1)
    }

    fn name() -> String {
        format!("GF({})", Self::ORDER)
    }
}

/// An element of the field `F`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fq<F: Field> {
    raw: u8,
    field: PhantomData<F>,
}

impl<F: Field> Fq<F> {
    pub const ZERO: Self = Self {
        raw: 0,
        field: PhantomData,
    };
    pub const ONE: Self = Self {
        raw: 1,
        field: PhantomData,
    };

    pub(crate) const fn from_raw(raw: u8) -> Self {
        Self {
            raw,
            field: PhantomData,
        }
    }

    /// Element with the given raw encoding, rejecting values outside the field.
    pub fn new(value: u32) -> Result<Self, FieldError> {
        if value >= F::ORDER {
            return Err(FieldError::OutOfRange {
                value,
                order: F::ORDER,
            });
        }
        Ok(Self::from_raw(value as u8))
    }

    /// Image of an integer in the prime subfield.
    pub fn from_int(value: i64) -> Self {
        let p = F::CHARACTERISTIC as i64;
        Self::from_raw(value.rem_euclid(p) as u8)
    }

    pub fn raw(self) -> u8 {
        self.raw
    }

    pub fn is_zero(self) -> bool {
        self.raw == 0
    }

    pub fn is_one(self) -> bool {
        self.raw == 1
    }

    /// Every element of the field, in raw order.
    pub fn elements() -> impl Iterator<Item = Self> {
        (0..F::ORDER).map(|v| Self::from_raw(v as u8))
    }

    pub fn inv(self) -> Result<Self, FieldError> {
        F::inv_raw(self.raw)
            .map(Self::from_raw)
            .ok_or(FieldError::DivisionByZero { order: F::ORDER })
    }

    pub fn div(self, rhs: Self) -> Result<Self, FieldError> {
        Ok(self * rhs.inv()?)
    }

    pub fn pow(self, mut exp: u64) -> Self {
        let mut base = self;
        let mut acc = Self::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                acc *= base;
            }
            base *= base;
            exp >>= 1;
        }
        acc
    }

    pub fn square(self) -> Self {
        self * self
    }

    /// The Frobenius map a ↦ a^p.
    pub fn frobenius(self) -> Self {
        self.pow(F::CHARACTERISTIC as u64)
    }

    /// Absolute trace to the prime subfield: a + a^p + … + a^(p^(d-1)).
    pub fn trace(self) -> Self {
        let mut acc = Self::ZERO;
        let mut conj = self;
        for _ in 0..F::DEGREE {
            acc += conj;
            conj = conj.frobenius();
        }
        acc
    }

    /// Absolute norm to the prime subfield: the product of all conjugates.
    pub fn norm(self) -> Self {
        let mut acc = Self::ONE;
        let mut conj = self;
        for _ in 0..F::DEGREE {
            acc *= conj;
            conj = conj.frobenius();
        }
        acc
    }

    /// Whether `self = b²` for some b in the field.
    pub fn is_square(self) -> bool {
        if self.is_zero() || F::CHARACTERISTIC == 2 {
            return true;
        }
        self.pow(((F::ORDER - 1) / 2) as u64).is_one()
    }

    /// Multiplicative order, `None` for zero.
    pub fn multiplicative_order(self) -> Option<u32> {
        if self.is_zero() {
            return None;
        }
        let mut x = self;
        let mut k = 1;
        while !x.is_one() {
            x *= self;
            k += 1;
        }
        Some(k)
    }

    /// The smallest raw value generating the multiplicative group.
    pub fn primitive_element() -> Self {
        Self::elements()
            .find(|e| e.multiplicative_order() == Some(F::ORDER - 1))
            .unwrap_or(Self::ONE)
    }
}

impl<F: Field> Add for Fq<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_raw(F::add_raw(self.raw, rhs.raw))
    }
}

impl<F: Field> Sub for Fq<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(F::add_raw(self.raw, F::neg_raw(rhs.raw)))
    }
}

impl<F: Field> Mul for Fq<F> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_raw(F::mul_raw(self.raw, rhs.raw))
    }
}

impl<F: Field> Neg for Fq<F> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_raw(F::neg_raw(self.raw))
    }
}

impl<F: Field> AddAssign for Fq<F> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<F: Field> SubAssign for Fq<F> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<F: Field> MulAssign for Fq<F> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<F: Field> fmt::Debug for Fq<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", F::name(), self.raw)
    }
}

impl<F: Field> fmt::Display for Fq<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if F::DEGREE == 1 {
            return write!(f, "{}", self.raw);
        }
        let p = F::CHARACTERISTIC as u8;
        let (a0, a1) = (self.raw % p, self.raw / p);
        match (a0, a1) {
            (_, 0) => write!(f, "{a0}"),
            (0, 1) => write!(f, "x"),
            (0, _) => write!(f, "{a1}x"),
            (_, 1) => write!(f, "{a0}+x"),
            _ => write!(f, "{a0}+{a1}x"),
        }
    }
}

/// Run `$body` with `$F` bound to the marker type for a runtime field order.
///
/// Unsupported orders evaluate to `Err(FieldError::Unsupported(order).into())`.
#[macro_export]
macro_rules! with_field {
    ($order:expr, $F:ident => $body:expr) => {
        match $order {
            2 => {
                type $F = $crate::field::Gf2;
                $body
            }
            3 => {
                type $F = $crate::field::Gf3;
                $body
            }
            4 => {
                type $F = $crate::field::Gf4;
                $body
            }
            5 => {
                type $F = $crate::field::Gf5;
                $body
            }
            7 => {
                type $F = $crate::field::Gf7;
                $body
            }
            9 => {
                type $F = $crate::field::Gf9;
                $body
            }
            other => Err($crate::field::FieldError::Unsupported(other).into()),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all<F: Field>() -> Vec<Fq<F>> {
        Fq::<F>::elements().collect()
    }

    fn check_inverses<F: Field>() {
        for a in all::<F>().into_iter().filter(|a| !a.is_zero()) {
            let inv = a.inv().unwrap();
            assert!((a * inv).is_one(), "{a:?} * {inv:?} != 1");
        }
    }

    #[test]
    fn test_inverses_exist_for_nonzero() {
        check_inverses::<Gf2>();
        check_inverses::<Gf3>();
        check_inverses::<Gf4>();
        check_inverses::<Gf5>();
        check_inverses::<Gf7>();
        check_inverses::<Gf9>();
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let a = Fq::<Gf9>::new(5).unwrap();
        assert_eq!(
            a.div(Fq::ZERO),
            Err(FieldError::DivisionByZero { order: 9 })
        );
        assert_eq!(
            Fq::<Gf2>::ZERO.inv(),
            Err(FieldError::DivisionByZero { order: 2 })
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            Fq::<Gf3>::new(3),
            Err(FieldError::OutOfRange { value: 3, order: 3 })
        );
        assert!(Fq::<Gf9>::new(8).is_ok());
    }

    #[test]
    fn test_gf9_generator_squares_to_minus_one() {
        // raw 3 encodes x
        let x = Fq::<Gf9>::new(3).unwrap();
        assert_eq!(x.square(), -Fq::ONE);
        assert_eq!(x.to_string(), "x");
    }

    #[test]
    fn test_gf4_generator_relation() {
        // x² = x + 1
        let x = Fq::<Gf4>::new(2).unwrap();
        assert_eq!(x.square(), x + Fq::ONE);
        assert_eq!(x.multiplicative_order(), Some(3));
    }

    #[test]
    fn test_trace_lands_in_prime_subfield() {
        for a in all::<Gf9>() {
            assert!(a.trace().raw() < 3);
            assert!(a.norm().raw() < 3);
        }
        // Tr(x) = x + x³ = x - x = 0 in GF(9)
        let x = Fq::<Gf9>::new(3).unwrap();
        assert!(x.trace().is_zero());
        // Tr on a prime field is the identity
        let two = Fq::<Gf5>::new(2).unwrap();
        assert_eq!(two.trace(), two);
    }

    #[test]
    fn test_trace_is_onto_prime_field() {
        let nonzero = all::<Gf4>().iter().filter(|a| !a.trace().is_zero()).count();
        assert_eq!(nonzero, 2);
    }

    #[test]
    fn test_square_counts() {
        let squares = all::<Gf3>().iter().filter(|a| a.is_square()).count();
        assert_eq!(squares, 2); // 0 and 1
        let squares = all::<Gf9>().iter().filter(|a| a.is_square()).count();
        assert_eq!(squares, 5);
        assert!(all::<Gf4>().iter().all(|a| a.is_square()));
    }

    #[test]
    fn test_primitive_elements() {
        assert_eq!(Fq::<Gf3>::primitive_element().raw(), 2);
        assert_eq!(Fq::<Gf7>::primitive_element().raw(), 3);
        assert_eq!(
            Fq::<Gf9>::primitive_element().multiplicative_order(),
            Some(8)
        );
    }

    #[test]
    fn test_from_int_reduces() {
        assert_eq!(Fq::<Gf3>::from_int(-1).raw(), 2);
        assert_eq!(Fq::<Gf9>::from_int(7).raw(), 1);
    }

    #[test]
    fn test_with_field_dispatch() {
        fn order_of(q: u32) -> Result<u32, FieldError> {
            with_field!(q, F => Ok(<F as Field>::ORDER))
        }
        assert_eq!(order_of(9), Ok(9));
        assert_eq!(order_of(6), Err(FieldError::Unsupported(6)));
    }
}
