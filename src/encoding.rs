//! Byte encodings shared by every party.
//!
//! These must be bit-exact across implementations: integers are 32-byte big-endian,
//! points are `i2b(x) || i2b(y)`, and hashes are SHA-256 over the concatenated chunks.

use crate::curve::{CurveParams, Point};
use crate::error::{ArithmeticError, MusigError};
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Length of an encoded integer.
pub const INT_LEN: usize = 32;
/// Length of an encoded affine point.
pub const POINT_LEN: usize = 2 * INT_LEN;

/// Encode an integer as 32 bytes, big-endian, zero-padded.
///
/// Panics if `i` does not fit in 256 bits; field elements and scalars always do.
pub fn i2b(i: &BigUint) -> [u8; INT_LEN] {
    let bytes = i.to_bytes_be();
    assert!(bytes.len() <= INT_LEN, "integer wider than 256 bits");
    let mut out = [0u8; INT_LEN];
    out[INT_LEN - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Interpret bytes as a big-endian unsigned integer.
pub fn b2i(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Encode an affine point as `i2b(x) || i2b(y)`.
///
/// The Point at Infinity has no encoding in this scheme.
pub fn p2b(point: &Point) -> Result<[u8; POINT_LEN], MusigError> {
    let (x, y) = point.coordinates().ok_or(MusigError::PointAtInfinity)?;
    let mut out = [0u8; POINT_LEN];
    out[..INT_LEN].copy_from_slice(&i2b(x.value()));
    out[INT_LEN..].copy_from_slice(&i2b(y.value()));
    Ok(out)
}

/// Decode the output of [`p2b`], validating that the point lies on `curve`.
pub fn b2p(curve: &CurveParams, bytes: &[u8]) -> Result<Point, MusigError> {
    if bytes.len() != POINT_LEN {
        return Err(MusigError::InvalidEncoding {
            expected: POINT_LEN,
            got: bytes.len(),
        });
    }
    let x = b2i(&bytes[..INT_LEN]);
    let y = b2i(&bytes[INT_LEN..]);
    // non-canonical coordinates would silently reduce, so reject them
    if &x >= curve.field().modulus() || &y >= curve.field().modulus() {
        return Err(ArithmeticError::NotOnCurve.into());
    }
    Ok(curve.point(x, y)?)
}

/// SHA-256 over the concatenation of `chunks`, in order.
pub fn sha256(chunks: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}
