//! Elliptic-curve arithmetic over secp256k1 and n-of-n MuSig Schnorr signatures with
//! a commit-reveal nonce exchange and adaptor-signature support.
//!
//! Layers, leaves first: [`field`] (prime-field arithmetic), [`curve`] (Weierstrass
//! group), [`secp256k1`] (curve constants and key generation), then the MuSig protocol
//! (key aggregation, [`nonce`], the challenge, [`session`], [`sign`], [`verify`]) and
//! [`adaptor`].
//!
//! Arithmetic is written for clarity over arbitrary-precision integers and makes no
//! constant-time claims.
#![allow(non_snake_case)]
pub mod adaptor;
pub use adaptor::{AdaptorOffset, recover_offset, unlock};
mod challenge;
pub use challenge::compute_challenge;
pub mod curve;
pub use curve::{CurveParams, Point};
pub mod encoding;
pub use encoding::{b2i, b2p, i2b, p2b, sha256};
pub mod error;
pub use error::{ArithmeticError, MusigError};
pub mod field;
pub use field::{FieldElement, PrimeField};
mod keyagg;
pub use keyagg::{aggregate_public_keys, keyagg, sort_public_keys};
pub mod nonce;
pub use nonce::{Commitment, aggregate_nonces, verify_commitments};
pub mod secp256k1;
pub use secp256k1::{
    KeyPair, SECP256K1, Scalar, generate_key_pair, generate_private_key, get_public_key,
};
pub mod session;
pub use session::MuSigSession;
pub mod sign;
pub use sign::sum_signatures;
pub mod verify;
pub use verify::{verify_partial_signature, verify_signature};
