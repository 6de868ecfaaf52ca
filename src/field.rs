//! Arithmetic over a prime field `F_p`.
//!
//! A [`PrimeField`] carries its modulus as immutable configuration and hands out
//! [`FieldElement`]s. Every element keeps a handle on the field it belongs to, so
//! arithmetic never needs the modulus passed in again and every result is re-reduced
//! into `[0, p)`.

use crate::error::ArithmeticError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

/// The field of integers modulo a prime `p`.
///
/// Cloning is cheap: the modulus is shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PrimeField {
    modulus: Arc<BigUint>,
}

impl PrimeField {
    /// Create the field `F_p`. `p` is assumed to be prime; inversion relies on it.
    pub fn new(modulus: BigUint) -> Self {
        assert!(modulus > BigUint::one(), "field modulus must be greater than 1");
        PrimeField {
            modulus: Arc::new(modulus),
        }
    }

    /// The modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Reduce `n` into the field.
    pub fn element(&self, n: impl Into<BigUint>) -> FieldElement {
        let value = n.into() % self.modulus.as_ref();
        FieldElement {
            value,
            field: self.clone(),
        }
    }

    /// Interpret big-endian bytes as an integer and reduce it into the field.
    pub fn from_bytes_be(&self, bytes: &[u8]) -> FieldElement {
        self.element(BigUint::from_bytes_be(bytes))
    }

    pub fn zero(&self) -> FieldElement {
        self.element(BigUint::zero())
    }

    pub fn one(&self) -> FieldElement {
        self.element(BigUint::one())
    }
}

impl fmt::Debug for PrimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimeField(0x{:x})", self.modulus.as_ref())
    }
}

/// An element `v` of a prime field, with `0 <= v < p`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement {
    value: BigUint,
    field: PrimeField,
}

impl FieldElement {
    /// The canonical integer representative in `[0, p)`.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    fn same_field(&self, rhs: &FieldElement) {
        assert!(
            self.field == rhs.field,
            "field elements belong to different fields"
        );
    }

    fn p(&self) -> &BigUint {
        self.field.modulus()
    }

    pub fn add(&self, rhs: &FieldElement) -> FieldElement {
        self.same_field(rhs);
        self.field.element(&self.value + &rhs.value)
    }

    pub fn sub(&self, rhs: &FieldElement) -> FieldElement {
        self.same_field(rhs);
        // both operands are already below p, so adding p keeps the difference non-negative
        self.field.element(&self.value + self.p() - &rhs.value)
    }

    pub fn mul(&self, rhs: &FieldElement) -> FieldElement {
        self.same_field(rhs);
        self.field.element(&self.value * &rhs.value)
    }

    /// `(p - v) mod p`, so that `-0 == 0`.
    pub fn neg(&self) -> FieldElement {
        self.field.element(self.p() - &self.value)
    }

    /// `v^exponent mod p`.
    pub fn pow(&self, exponent: &BigUint) -> FieldElement {
        self.field.element(self.value.modpow(exponent, self.p()))
    }

    /// Multiplicative inverse via the extended Euclidean algorithm.
    pub fn inverse(&self) -> Result<FieldElement, ArithmeticError> {
        if self.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        self.value
            .modinv(self.p())
            .map(|inv| self.field.element(inv))
            .ok_or(ArithmeticError::DivisionByZero)
    }

    /// Multiplicative inverse via Fermat's little theorem, `v^(p-2) mod p`.
    ///
    /// Agrees with [`FieldElement::inverse`] for every nonzero element of a prime field.
    pub fn inverse_fermat(&self) -> Result<FieldElement, ArithmeticError> {
        if self.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let exponent = self.p() - BigUint::from(2u8);
        Ok(self.pow(&exponent))
    }

    /// `self * rhs^-1`.
    pub fn div(&self, rhs: &FieldElement) -> Result<FieldElement, ArithmeticError> {
        self.same_field(rhs);
        Ok(self.mul(&rhs.inverse()?))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x{:x})", self.value)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Ord for FieldElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.p().cmp(other.p()))
    }
}

impl PartialOrd for FieldElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for &FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: &FieldElement) -> FieldElement {
        FieldElement::add(self, rhs)
    }
}

impl Sub for &FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: &FieldElement) -> FieldElement {
        FieldElement::sub(self, rhs)
    }
}

impl Mul for &FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: &FieldElement) -> FieldElement {
        FieldElement::mul(self, rhs)
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement {
        FieldElement::neg(self)
    }
}
