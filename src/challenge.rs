//! Fiat-Shamir challenge for MuSig.
//!
//! ```text
//! c = SHA256(p2b(X_agg) || p2b(R_agg) || m)
//! ```
//!
//! read as a big-endian integer.

use crate::curve::Point;
use crate::encoding::{b2i, p2b, sha256};
use crate::error::MusigError;
use num_bigint::BigUint;

/// Compute the challenge `c` binding the aggregate key, aggregate nonce and message.
///
/// The digest is returned as an integer and is not reduced modulo the group order.
/// Fails if either point is Infinity, which has no encoding.
pub fn compute_challenge(X_agg: &Point, R_agg: &Point, msg: &[u8]) -> Result<BigUint, MusigError> {
    let digest = sha256(&[&p2b(X_agg)?, &p2b(R_agg)?, msg]);
    Ok(b2i(&digest))
}
