//! MuSig permanent-key aggregation.
//!
//! 1. Sort the participants' public keys into the canonical point order
//!    (lexicographic on `(x, y)`), so every party hashes the same list.
//! 2. Compute the list hash `L = SHA256(p2b(X_1) || ... || p2b(X_n))` over the sorted keys.
//! 3. For each key derive `a_i = SHA256(L || p2b(X_i))`, read as a big-endian integer.
//! 4. Aggregate `X_agg = sum(a_i * X_i)`, seeded with Infinity.
//!
//! The coefficients bind every key to the whole key set, which defeats rogue-key attacks
//! where one party picks its key as a function of the others'.

use crate::curve::Point;
use crate::encoding::{b2i, p2b, sha256};
use crate::error::MusigError;
use crate::secp256k1::SECP256K1;
use num_bigint::BigUint;

/// Return a copy of `pubkeys` in the canonical order all participants agree on.
pub fn sort_public_keys(pubkeys: &[Point]) -> Vec<Point> {
    let mut sorted = pubkeys.to_vec();
    sorted.sort();
    sorted
}

/// The list hash `L` over keys already in canonical order.
pub fn aggregation_hash(sorted: &[Point]) -> Result<[u8; 32], MusigError> {
    if sorted.is_empty() {
        return Err(MusigError::NoParticipants);
    }
    let mut buf = Vec::with_capacity(sorted.len() * 64);
    for X in sorted {
        buf.extend_from_slice(&p2b(X)?);
    }
    Ok(sha256(&[buf.as_slice()]))
}

/// The aggregation coefficient `a_i = SHA256(L || p2b(X_i))` as an integer.
///
/// Not reduced modulo the group order; callers reduce when it enters a signature.
pub fn aggregation_coefficient(L: &[u8; 32], X: &Point) -> Result<BigUint, MusigError> {
    Ok(b2i(&sha256(&[L, &p2b(X)?])))
}

/// MuSig key aggregation.
///
/// # Parameters
/// - `pubkeys`: public keys of all participants, in any order.
///
/// # Returns
/// `(X_agg, coefs)` where `coefs[i]` is the coefficient of `pubkeys[i]`.
/// The result does not depend on the order of `pubkeys`.
/// Keys that are not secp256k1 points fail with `NotOnCurve`.
pub fn keyagg(pubkeys: &[Point]) -> Result<(Point, Vec<BigUint>), MusigError> {
    for X in pubkeys {
        SECP256K1.validate(X)?;
    }
    let sorted = sort_public_keys(pubkeys);
    let L = aggregation_hash(&sorted)?;

    let coefs = pubkeys
        .iter()
        .map(|X| aggregation_coefficient(&L, X))
        .collect::<Result<Vec<_>, _>>()?;

    let curve = SECP256K1.curve();
    let mut X_agg = Point::Infinity;
    for (X, a) in pubkeys.iter().zip(&coefs) {
        X_agg = curve.add(&X_agg, &curve.mul(X, a)?)?;
    }
    Ok((X_agg, coefs))
}

/// The aggregated public key `X_agg` alone.
pub fn aggregate_public_keys(pubkeys: &[Point]) -> Result<Point, MusigError> {
    keyagg(pubkeys).map(|(X_agg, _)| X_agg)
}
