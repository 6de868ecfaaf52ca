//! Adaptor signatures on top of MuSig partial signatures.
//!
//! A party picks a secret offset `o` with public point `O = o * G` and hands out
//! `S_i = s_i + o` instead of its real partial signature `s_i`. Peers can check `S_i`
//! against `O` (verification with `offset = O`) without learning `o`. As soon as the
//! real signature for one message is revealed, `o = S - s` falls out, and with it the
//! real counterpart `s_j = S_j - o` of every other adaptor signature built on `O`.
//!
//! | Function                   | Relation          |
//! |----------------------------|-------------------|
//! | [`AdaptorOffset::adapt`]   | `S = s + o`       |
//! | [`recover_offset`]         | `o = S - s`       |
//! | [`unlock`]                 | `s = S - o`       |

use crate::curve::Point;
use crate::error::MusigError;
use crate::secp256k1::{
    KeyPair, SECP256K1, Scalar, generate_key_pair, generate_key_pair_with,
};
use num_bigint::BigUint;
use rand::CryptoRng;
use std::fmt;

/// A secret offset scalar `o` and its public point `O = o * G`.
#[derive(Clone, PartialEq, Eq)]
pub struct AdaptorOffset {
    secret: Scalar,
    public: Point,
}

impl AdaptorOffset {
    /// Draw a fresh offset from the operating system's random source.
    pub fn generate() -> Result<Self, MusigError> {
        Ok(Self::from_key_pair(generate_key_pair()?))
    }

    /// Draw a fresh offset from `rng`.
    pub fn generate_with<R: CryptoRng + ?Sized>(rng: &mut R) -> Result<Self, MusigError> {
        Ok(Self::from_key_pair(generate_key_pair_with(rng)?))
    }

    /// Use a known offset scalar.
    pub fn from_secret(o: BigUint) -> Result<Self, MusigError> {
        let o = SECP256K1.scalar(o);
        if o.is_zero() {
            return Err(MusigError::ZeroScalar);
        }
        let public = SECP256K1.mul_generator(o.value())?;
        Ok(AdaptorOffset { secret: o, public })
    }

    fn from_key_pair(kp: KeyPair) -> Self {
        let (o, O) = kp.into_parts();
        // o * G == (o mod N) * G, so reducing keeps the public point valid
        AdaptorOffset {
            secret: SECP256K1.scalar(o),
            public: O,
        }
    }

    /// Rebuild the offset from an adaptor signature and its revealed real counterpart,
    /// checking the result against the published point `O`.
    pub fn recover(adaptor: &Scalar, genuine: &Scalar, O: &Point) -> Result<Self, MusigError> {
        let o = recover_offset(adaptor, genuine);
        if o.is_zero() || &SECP256K1.mul_generator(o.value())? != O {
            return Err(MusigError::OffsetMismatch);
        }
        Ok(AdaptorOffset {
            secret: o,
            public: O.clone(),
        })
    }

    /// The secret offset `o`.
    pub fn secret(&self) -> &Scalar {
        &self.secret
    }

    /// The public offset point `O`.
    pub fn public(&self) -> &Point {
        &self.public
    }

    /// Tweak a signature: `S = s + o`.
    pub fn adapt(&self, signature: &Scalar) -> Scalar {
        signature + &self.secret
    }

    /// Undo the tweak: `s = S - o`.
    pub fn unlock(&self, adaptor: &Scalar) -> Scalar {
        unlock(adaptor, &self.secret)
    }
}

impl fmt::Debug for AdaptorOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptorOffset")
            .field("secret", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

/// Recover the offset from an adaptor signature and the real signature it hides:
/// `o = S - s mod N`.
///
/// Works equally on single partials (`S_i`, `s_i`) and on sums that contain exactly one
/// adaptor term (`S_i + s_j`, `s_i + s_j`).
pub fn recover_offset(adaptor: &Scalar, genuine: &Scalar) -> Scalar {
    adaptor - genuine
}

/// Recover a real signature from its adaptor form: `s = S - o mod N`.
pub fn unlock(adaptor: &Scalar, offset: &Scalar) -> Scalar {
    adaptor - offset
}
