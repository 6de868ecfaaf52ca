//! The secp256k1 curve and key generation.
//!
//! <https://www.secg.org/sec2-v2.pdf>
//!
//! ```text
//! P = 2^256 - 2^32 - 977     field modulus
//! a = 0, b = 7               y^2 = x^3 + 7
//! G                          generator
//! N                          order of the group generated by G
//! ```

use crate::curve::{CurveParams, Point};
use crate::error::{ArithmeticError, MusigError};
use crate::field::{FieldElement, PrimeField};
use hex_literal::hex;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::{CryptoRng, TryRngCore};
use sha2::Sha256;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::LazyLock;

/// A scalar modulo the group order `N`: signatures, coefficients and offsets.
///
/// Only [`Secp256k1::scalar`] builds one, so a coordinate modulo `P` can never be
/// mixed into signature arithmetic.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Scalar(FieldElement);

impl Scalar {
    /// The canonical representative in `[0, N)`.
    pub fn value(&self) -> &BigUint {
        self.0.value()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_field_element(&self) -> &FieldElement {
        &self.0
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar(0x{:x})", self.0.value())
    }
}

impl Add for &Scalar {
    type Output = Scalar;

    fn add(self, rhs: &Scalar) -> Scalar {
        Scalar(&self.0 + &rhs.0)
    }
}

impl Sub for &Scalar {
    type Output = Scalar;

    fn sub(self, rhs: &Scalar) -> Scalar {
        Scalar(&self.0 - &rhs.0)
    }
}

impl Mul for &Scalar {
    type Output = Scalar;

    fn mul(self, rhs: &Scalar) -> Scalar {
        Scalar(&self.0 * &rhs.0)
    }
}

impl Neg for &Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        Scalar(-&self.0)
    }
}

const P: [u8; 32] = hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");
const N: [u8; 32] = hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
const GX: [u8; 32] = hex!("79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798");
const GY: [u8; 32] = hex!("483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8");

/// How many times key generation redraws before giving up on a zero scalar.
const MAX_DRAWS: usize = 5;

/// Process-wide secp256k1 parameters, built on first use and never mutated.
pub static SECP256K1: LazyLock<Secp256k1> = LazyLock::new(Secp256k1::new);

/// secp256k1 curve parameters together with its generator and group order.
#[derive(Clone, Debug)]
pub struct Secp256k1 {
    curve: CurveParams,
    generator: Point,
    order: BigUint,
    scalars: PrimeField,
}

impl Secp256k1 {
    fn new() -> Self {
        let curve = CurveParams::new(
            BigUint::from_bytes_be(&P),
            BigUint::zero(),
            BigUint::from(7u8),
        );
        let generator = Point::Affine {
            x: curve.field().from_bytes_be(&GX),
            y: curve.field().from_bytes_be(&GY),
        };
        let order = BigUint::from_bytes_be(&N);
        let scalars = PrimeField::new(order.clone());
        Secp256k1 {
            curve,
            generator,
            order,
            scalars,
        }
    }

    pub fn curve(&self) -> &CurveParams {
        &self.curve
    }

    /// The generator `G`.
    pub fn generator(&self) -> &Point {
        &self.generator
    }

    /// The group order `N`.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// The scalar field `Z/NZ`.
    pub fn scalar_field(&self) -> &PrimeField {
        &self.scalars
    }

    /// Reduce an integer modulo `N`.
    pub fn scalar(&self, n: impl Into<BigUint>) -> Scalar {
        Scalar(self.scalars.element(n))
    }

    /// Reject peer-supplied points that are not secp256k1 group elements, including
    /// points whose coordinates live in another field.
    pub fn validate(&self, p: &Point) -> Result<(), ArithmeticError> {
        if self.curve.contains(p) {
            Ok(())
        } else {
            Err(ArithmeticError::NotOnCurve)
        }
    }

    /// `n * G`.
    pub fn mul_generator(&self, n: &BigUint) -> Result<Point, ArithmeticError> {
        self.curve.mul(&self.generator, n)
    }
}

/// A private scalar together with its public point `X = x * G`.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: BigUint,
    public: Point,
}

impl KeyPair {
    /// Build a key pair from a known private scalar.
    pub fn from_secret(secret: BigUint) -> Result<Self, MusigError> {
        if secret.is_zero() {
            return Err(MusigError::ZeroScalar);
        }
        let public = get_public_key(&secret)?;
        Ok(KeyPair { secret, public })
    }

    /// Derive a key pair deterministically as `HMAC-SHA256(seed, label)`.
    ///
    /// Reproducible parties for tests and fixtures; interactive ceremonies should use
    /// [`generate_key_pair`].
    pub fn derive(seed: &[u8], label: &[u8]) -> Result<Self, MusigError> {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = <HmacSha256 as Mac>::new_from_slice(seed)
            .expect("HMAC can accept key of any length");
        mac.update(label);
        let out = mac.finalize().into_bytes();
        Self::from_secret(BigUint::from_bytes_be(&out))
    }

    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    pub fn public(&self) -> &Point {
        &self.public
    }

    /// Split into `(x, X)`.
    pub fn into_parts(self) -> (BigUint, Point) {
        (self.secret, self.public)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("secret", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

/// Draw a uniformly random 256-bit private scalar from the operating system.
pub fn generate_private_key() -> Result<BigUint, MusigError> {
    for _ in 0..MAX_DRAWS {
        let mut buf = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| MusigError::Entropy(e.to_string()))?;
        let x = BigUint::from_bytes_be(&buf);
        if !x.is_zero() {
            return Ok(x);
        }
    }
    Err(MusigError::ZeroScalar)
}

/// Draw a uniformly random 256-bit private scalar from `rng`.
pub fn generate_private_key_with<R: CryptoRng + ?Sized>(rng: &mut R) -> Result<BigUint, MusigError> {
    for _ in 0..MAX_DRAWS {
        let mut buf = [0u8; 32];
        rng.fill_bytes(&mut buf);
        let x = BigUint::from_bytes_be(&buf);
        if !x.is_zero() {
            return Ok(x);
        }
    }
    Err(MusigError::ZeroScalar)
}

/// `X = x * G`.
pub fn get_public_key(x: &BigUint) -> Result<Point, ArithmeticError> {
    SECP256K1.mul_generator(x)
}

/// Generate `(x, X)` from the operating system's random source.
pub fn generate_key_pair() -> Result<KeyPair, MusigError> {
    KeyPair::from_secret(generate_private_key()?)
}

/// Generate `(x, X)` from `rng`.
pub fn generate_key_pair_with<R: CryptoRng + ?Sized>(rng: &mut R) -> Result<KeyPair, MusigError> {
    KeyPair::from_secret(generate_private_key_with(rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generator_is_on_the_curve() {
        assert!(SECP256K1.curve().contains(SECP256K1.generator()));
    }

    #[test]
    fn order_times_generator_is_infinity() {
        let n = SECP256K1.order().clone();
        assert_eq!(SECP256K1.mul_generator(&n).unwrap(), Point::Infinity);
        // one less is -G
        let n_minus_one = n - 1u8;
        assert_eq!(
            SECP256K1.mul_generator(&n_minus_one).unwrap(),
            SECP256K1.generator().neg().unwrap()
        );
    }

    #[test]
    fn scalars_above_the_order_wrap() {
        let n = SECP256K1.order();
        let g = SECP256K1.generator();
        assert_eq!(&SECP256K1.mul_generator(&(n + 1u8)).unwrap(), g);
    }

    #[test]
    fn two_g_known_answer() {
        let two_g = SECP256K1.mul_generator(&BigUint::from(2u8)).unwrap();
        let (x, y) = two_g.coordinates().unwrap();
        assert_eq!(
            hex::encode(crate::encoding::i2b(x.value())),
            "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5"
        );
        assert_eq!(
            hex::encode(crate::encoding::i2b(y.value())),
            "1ae168fea63dc339a3c58419466ceaeef7f632653266d0e1236431a950cfe52a"
        );
    }

    #[test]
    fn key_pair_matches_public_key() {
        let kp = generate_key_pair().unwrap();
        assert_eq!(kp.public(), &get_public_key(kp.secret()).unwrap());
        assert!(SECP256K1.curve().contains(kp.public()));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_key_pair_with(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_key_pair_with(&mut StdRng::seed_from_u64(7)).unwrap();
        let c = generate_key_pair_with(&mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn derived_keys_depend_on_seed_and_label() {
        let a = KeyPair::derive(b"seed", b"alice").unwrap();
        let b = KeyPair::derive(b"seed", b"bob").unwrap();
        assert_eq!(a, KeyPair::derive(b"seed", b"alice").unwrap());
        assert_ne!(a, b);
        assert_ne!(a, KeyPair::derive(b"other seed", b"alice").unwrap());
    }

    #[test]
    fn zero_secret_is_rejected() {
        assert_eq!(
            KeyPair::from_secret(BigUint::zero()),
            Err(MusigError::ZeroScalar)
        );
    }

    #[test]
    fn scalars_live_in_the_scalar_field() {
        let s = SECP256K1.scalar(SECP256K1.order() + 5u8);
        assert_eq!(s.as_field_element().field(), SECP256K1.scalar_field());
        assert_ne!(SECP256K1.scalar_field(), SECP256K1.curve().field());
        assert_eq!(s.value(), &BigUint::from(5u8));
        assert_eq!(&s + &(-&s), SECP256K1.scalar(0u8));
        assert_eq!(format!("{s:?}"), "Scalar(0x5)");
    }

    #[test]
    fn validate_rejects_foreign_and_off_curve_points() {
        assert!(SECP256K1.validate(SECP256K1.generator()).is_ok());
        let off_curve = Point::Affine {
            x: SECP256K1.curve().field().element(1u8),
            y: SECP256K1.curve().field().element(1u8),
        };
        assert_eq!(
            SECP256K1.validate(&off_curve),
            Err(ArithmeticError::NotOnCurve)
        );
        let toy = CurveParams::new(BigUint::from(97u8), BigUint::from(2u8), BigUint::from(3u8));
        let foreign = toy.point(BigUint::from(3u8), BigUint::from(6u8)).unwrap();
        assert_eq!(
            SECP256K1.validate(&foreign),
            Err(ArithmeticError::NotOnCurve)
        );
    }

    #[test]
    fn debug_redacts_the_secret() {
        let kp = KeyPair::from_secret(BigUint::from(0x1234_5678u32)).unwrap();
        let shown = format!("{kp:?}");
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("12345678"));
    }
}
