//! MuSig signature verification.
//!
//! A combined signature `s` is valid for message `m` when
//!
//! ```text
//! s * G == offset + R_agg + c * X_agg,    c = SHA256(p2b(X_agg) || p2b(R_agg) || m)
//! ```
//!
//! with `offset = Infinity` for ordinary signatures and `offset = O` for signatures
//! tweaked by an adaptor offset. Verification failure is an ordinary `Ok(false)`;
//! errors are reserved for malformed inputs.

use crate::challenge::compute_challenge;
use crate::curve::Point;
use crate::error::MusigError;
use crate::keyagg::{aggregation_coefficient, aggregation_hash, keyagg, sort_public_keys};
use crate::nonce::aggregate_nonces;
use crate::secp256k1::{SECP256K1, Scalar};
use num_bigint::BigUint;

/// Check `s * G == offset + R_agg + c * X_agg` for an already computed challenge.
pub(crate) fn signature_holds(
    s: &Scalar,
    c: &BigUint,
    X_agg: &Point,
    R_agg: &Point,
    offset: &Point,
) -> Result<bool, MusigError> {
    let curve = SECP256K1.curve();
    let lhs = SECP256K1.mul_generator(s.value())?;
    let cX = curve.mul(X_agg, c)?;
    let rhs = curve.sum([offset, R_agg, &cX])?;
    Ok(lhs == rhs)
}

/// Check `s_j * G == R_j + (c * a_j) * X_j` for one participant's contribution.
pub(crate) fn partial_signature_holds(
    s_j: &Scalar,
    c: &BigUint,
    a_j: &BigUint,
    X_j: &Point,
    R_j: &Point,
) -> Result<bool, MusigError> {
    let ca = &SECP256K1.scalar(c.clone()) * &SECP256K1.scalar(a_j.clone());
    let caX = SECP256K1.curve().mul(X_j, ca.value())?;
    let rhs = SECP256K1.curve().add(R_j, &caX)?;
    Ok(SECP256K1.mul_generator(s_j.value())? == rhs)
}

/// Verify a MuSig signature from the participants' public keys and nonces.
///
/// # Arguments
/// - `msg`: The message that was signed.
/// - `signature`: The combined signature scalar.
/// - `Xs`: All participants' permanent public keys, in any order.
/// - `Rs`: All participants' public nonces.
/// - `offset`: Adaptor offset point, or `Point::Infinity` for an untweaked signature.
///
/// # Returns
/// `Ok(true)` if the signature is valid, `Ok(false)` otherwise.
pub fn verify_signature(
    msg: &[u8],
    signature: &Scalar,
    Xs: &[Point],
    Rs: &[Point],
    offset: &Point,
) -> Result<bool, MusigError> {
    SECP256K1.validate(offset)?;
    let X_agg = keyagg(Xs)?.0;
    let R_agg = aggregate_nonces(Rs)?;
    let c = compute_challenge(&X_agg, &R_agg, msg)?;
    signature_holds(signature, &c, &X_agg, &R_agg, offset)
}

/// Verify the partial signature `s_j` produced by the holder of `X_j` with nonce `R_j`.
///
/// Lets the aggregator pin a bad combined signature on the participant who caused it.
pub fn verify_partial_signature(
    msg: &[u8],
    partial: &Scalar,
    Xs: &[Point],
    Rs: &[Point],
    X_j: &Point,
    R_j: &Point,
) -> Result<bool, MusigError> {
    SECP256K1.validate(X_j)?;
    SECP256K1.validate(R_j)?;
    let L = aggregation_hash(&sort_public_keys(Xs))?;
    let X_agg = keyagg(Xs)?.0;
    let R_agg = aggregate_nonces(Rs)?;
    let c = compute_challenge(&X_agg, &R_agg, msg)?;
    let a_j = aggregation_coefficient(&L, X_j)?;
    partial_signature_holds(partial, &c, &a_j, X_j, R_j)
}
