//! Nonce commitment and aggregation for MuSig.
//!
//! Round 1 broadcasts `t_i = SHA256(p2b(R_i))`; round 2 reveals `R_i = r_i * G` once
//! every commitment has been received. Each revealed nonce is checked against its
//! commitment before the aggregate `R_agg = sum(R_i)` is formed.

use crate::curve::Point;
use crate::encoding::{p2b, sha256};
use crate::error::MusigError;
use crate::secp256k1::SECP256K1;
use std::fmt;

/// Round-1 commitment to a public nonce: `t = SHA256(p2b(R))`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Commit to the public nonce `R`.
    pub fn to(R: &Point) -> Result<Self, MusigError> {
        Ok(Commitment(sha256(&[&p2b(R)?])))
    }

    /// Whether `R` opens this commitment.
    pub fn opens(&self, R: &Point) -> Result<bool, MusigError> {
        Ok(Commitment::to(R)? == *self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.0))
    }
}

/// Check that `Rs[i]` opens `ts[i]` for every participant.
///
/// Fails with [`MusigError::CommitmentMismatch`] on the first nonce that does not match;
/// the ceremony must then be abandoned.
pub fn verify_commitments(ts: &[Commitment], Rs: &[Point]) -> Result<(), MusigError> {
    if ts.len() != Rs.len() {
        return Err(MusigError::MissingNonces {
            expected: ts.len(),
            got: Rs.len(),
        });
    }
    for (index, (t, R)) in ts.iter().zip(Rs).enumerate() {
        if !t.opens(R)? {
            return Err(MusigError::CommitmentMismatch { index });
        }
    }
    Ok(())
}

/// Aggregate the public nonces: `R_agg = sum(R_i)`.
///
/// Nonces that are not secp256k1 points fail with `NotOnCurve`.
pub fn aggregate_nonces(Rs: &[Point]) -> Result<Point, MusigError> {
    if Rs.is_empty() {
        return Err(MusigError::NoNonces);
    }
    for R in Rs {
        SECP256K1.validate(R)?;
    }
    Ok(SECP256K1.curve().sum(Rs)?)
}
