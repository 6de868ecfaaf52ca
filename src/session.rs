// This session based API holds one party's state for a single MuSig signing
// ceremony: the permanent key pair, a fresh nonce pair, the protocol inputs received
// from peers, and the values derived from them.
//
// Inputs are write-once. Derived values (L, a, X_agg, t, R_agg) are computed on first
// use and cached, so they can never go stale.
//
// Round order per party:
//   1. set_public_keys(Xs)
//   2. broadcast commitment(), then set_commitments(ts)
//   3. broadcast reveal_nonce() (refused until all commitments are in), then set_public_nonces(Rs)
//   4. sign(msg)
use crate::challenge::compute_challenge;
use crate::curve::Point;
use crate::error::MusigError;
use crate::keyagg::{aggregation_coefficient, aggregation_hash, keyagg, sort_public_keys};
use crate::nonce::{Commitment, aggregate_nonces, verify_commitments};
use crate::secp256k1::{KeyPair, SECP256K1, Scalar};
use crate::verify::{partial_signature_holds, signature_holds};
use num_bigint::BigUint;
use std::cell::OnceCell;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Per-party session state for a MuSig ceremony.
pub struct MuSigSession {
    /// Our permanent key pair `(x_i, X_i)`.
    key: KeyPair,
    /// Our nonce key pair `(r_i, R_i)`, used for exactly one signature.
    nonce: KeyPair,
    /// All participants' permanent public keys, in canonical order.
    Xs: Option<Vec<Point>>,
    /// All participants' nonce commitments; `ts[i]` commits to `Rs[i]`.
    ts: Option<Vec<Commitment>>,
    /// All participants' public nonces, checked against `ts`.
    Rs: Option<Vec<Point>>,
    /// List hash `L` over `Xs`.
    L: OnceCell<[u8; 32]>,
    /// Our aggregation coefficient `a_i`.
    a: OnceCell<BigUint>,
    /// Aggregated public key `X_agg = sum(a_i * X_i)`.
    X_agg: OnceCell<Point>,
    /// Our commitment `t_i = SHA256(p2b(R_i))`.
    t: OnceCell<Commitment>,
    /// Aggregated nonce `R_agg = sum(R_i)`.
    R_agg: OnceCell<Point>,
    nonce_used: bool,
    aborted: bool,
}

/// Return the cached value, computing and storing it on first access.
fn memo<T>(
    cell: &OnceCell<T>,
    init: impl FnOnce() -> Result<T, MusigError>,
) -> Result<&T, MusigError> {
    if let Some(v) = cell.get() {
        return Ok(v);
    }
    let v = init()?;
    Ok(cell.get_or_init(|| v))
}

impl MuSigSession {
    /// Start a session with our permanent key pair and a fresh nonce pair.
    pub fn new(key: KeyPair, nonce: KeyPair) -> Self {
        MuSigSession {
            key,
            nonce,
            Xs: None,
            ts: None,
            Rs: None,
            L: OnceCell::new(),
            a: OnceCell::new(),
            X_agg: OnceCell::new(),
            t: OnceCell::new(),
            R_agg: OnceCell::new(),
            nonce_used: false,
            aborted: false,
        }
    }

    fn ensure_live(&self) -> Result<(), MusigError> {
        if self.aborted {
            Err(MusigError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Our permanent public key `X_i`.
    pub fn public_key(&self) -> &Point {
        self.key.public()
    }

    /// Participants' public keys in canonical order, once set.
    pub fn public_keys(&self) -> Option<&[Point]> {
        self.Xs.as_deref()
    }

    pub fn commitments(&self) -> Option<&[Commitment]> {
        self.ts.as_deref()
    }

    pub fn public_nonces(&self) -> Option<&[Point]> {
        self.Rs.as_deref()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    fn participants(&self) -> Result<&[Point], MusigError> {
        self.Xs.as_deref().ok_or(MusigError::MissingPublicKeys)
    }

    /// Record every participant's permanent public key (ours included).
    ///
    /// The list is sorted into the canonical order, so peers may supply it in any order.
    pub fn set_public_keys(&mut self, Xs: Vec<Point>) -> Result<(), MusigError> {
        self.ensure_live()?;
        if self.Xs.is_some() {
            return Err(MusigError::InputsAlreadySet("public keys"));
        }
        if Xs.is_empty() {
            return Err(MusigError::NoParticipants);
        }
        if Xs.iter().any(Point::is_infinity) {
            return Err(MusigError::PointAtInfinity);
        }
        for X in &Xs {
            SECP256K1.validate(X)?;
        }
        let distinct: HashSet<&Point> = Xs.iter().collect();
        if distinct.len() != Xs.len() {
            return Err(MusigError::DuplicateParticipant);
        }
        if !Xs.contains(self.key.public()) {
            return Err(MusigError::UnknownSigner);
        }
        debug!(participants = Xs.len(), "recorded participant public keys");
        self.Xs = Some(sort_public_keys(&Xs));
        Ok(())
    }

    /// Our round-1 commitment `t_i`, safe to broadcast at any time.
    pub fn commitment(&self) -> Result<Commitment, MusigError> {
        memo(&self.t, || Commitment::to(self.nonce.public())).copied()
    }

    /// Record every participant's nonce commitment (ours included).
    pub fn set_commitments(&mut self, ts: Vec<Commitment>) -> Result<(), MusigError> {
        self.ensure_live()?;
        if self.ts.is_some() {
            return Err(MusigError::InputsAlreadySet("commitments"));
        }
        let expected = self.participants()?.len();
        if ts.len() != expected {
            return Err(MusigError::MissingCommits {
                expected,
                got: ts.len(),
            });
        }
        if !ts.contains(&self.commitment()?) {
            return Err(MusigError::MissingOwnNonce);
        }
        debug!(commitments = ts.len(), "recorded nonce commitments");
        self.ts = Some(ts);
        Ok(())
    }

    /// Our round-2 public nonce `R_i`.
    ///
    /// Refused until every participant's commitment has been recorded: revealing early
    /// lets a peer choose its nonce as a function of ours.
    pub fn reveal_nonce(&self) -> Result<&Point, MusigError> {
        self.ensure_live()?;
        let expected = self.participants()?.len();
        if self.ts.is_none() {
            return Err(MusigError::MissingCommits { expected, got: 0 });
        }
        debug!("revealing public nonce");
        Ok(self.nonce.public())
    }

    /// Record every participant's public nonce (ours included), in the same order as
    /// the commitments.
    ///
    /// A nonce that is not a secp256k1 point or does not open its commitment aborts
    /// the session.
    pub fn set_public_nonces(&mut self, Rs: Vec<Point>) -> Result<(), MusigError> {
        self.ensure_live()?;
        if self.Rs.is_some() {
            return Err(MusigError::InputsAlreadySet("public nonces"));
        }
        let expected = self.participants()?.len();
        if self.ts.is_none() {
            return Err(MusigError::MissingCommits { expected, got: 0 });
        }
        if Rs.len() != expected {
            return Err(MusigError::MissingNonces {
                expected,
                got: Rs.len(),
            });
        }
        if let Err(e) = Rs.iter().try_for_each(|R| SECP256K1.validate(R)) {
            warn!(error = %e, "peer revealed a point outside the group, aborting ceremony");
            self.abort();
            return Err(e.into());
        }
        let ts = self
            .ts
            .as_deref()
            .ok_or(MusigError::MissingCommits { expected, got: 0 })?;
        if let Err(e) = verify_commitments(ts, &Rs) {
            warn!(error = %e, "nonce reveal failed commitment check, aborting ceremony");
            self.abort();
            return Err(e);
        }
        if !Rs.contains(self.nonce.public()) {
            return Err(MusigError::MissingOwnNonce);
        }
        debug!(nonces = Rs.len(), "recorded public nonces");
        self.Rs = Some(Rs);
        Ok(())
    }

    /// The list hash `L`.
    pub fn aggregation_hash(&self) -> Result<&[u8; 32], MusigError> {
        memo(&self.L, || aggregation_hash(self.participants()?))
    }

    /// Our aggregation coefficient `a_i = SHA256(L || p2b(X_i))`.
    pub fn coefficient(&self) -> Result<&BigUint, MusigError> {
        memo(&self.a, || {
            aggregation_coefficient(self.aggregation_hash()?, self.key.public())
        })
    }

    /// The aggregated public key `X_agg`.
    pub fn aggregated_public_key(&self) -> Result<&Point, MusigError> {
        memo(&self.X_agg, || keyagg(self.participants()?).map(|(X, _)| X))
    }

    /// The aggregated nonce `R_agg`.
    pub fn aggregated_nonce(&self) -> Result<&Point, MusigError> {
        memo(&self.R_agg, || {
            let expected = self.participants()?.len();
            let Rs = self
                .Rs
                .as_deref()
                .ok_or(MusigError::MissingNonces { expected, got: 0 })?;
            aggregate_nonces(Rs)
        })
    }

    /// The challenge `c` for `msg` under this session's aggregates.
    pub fn challenge(&self, msg: &[u8]) -> Result<BigUint, MusigError> {
        compute_challenge(self.aggregated_public_key()?, self.aggregated_nonce()?, msg)
    }

    /// Produce our partial signature `s_i = r_i + c * a_i * x_i mod N`.
    ///
    /// The nonce is consumed: a second call fails with [`MusigError::NonceReused`].
    pub fn sign(&mut self, msg: &[u8]) -> Result<Scalar, MusigError> {
        self.ensure_live()?;
        if self.nonce_used {
            return Err(MusigError::NonceReused);
        }
        let c = self.challenge(msg)?;
        let a = self.coefficient()?;
        let r = SECP256K1.scalar(self.nonce.secret().clone());
        let ca = &SECP256K1.scalar(c) * &SECP256K1.scalar(a.clone());
        let s = &r + &(&ca * &SECP256K1.scalar(self.key.secret().clone()));
        self.nonce_used = true;
        debug!(msg_len = msg.len(), "produced partial signature");
        Ok(s)
    }

    /// Verify a combined signature: `s * G == R_agg + c * X_agg`.
    pub fn verify(&self, msg: &[u8], signature: &Scalar) -> Result<bool, MusigError> {
        self.verify_with_offset(msg, signature, &Point::Infinity)
    }

    /// Verify a signature tweaked by an adaptor offset point:
    /// `s * G == offset + R_agg + c * X_agg`.
    pub fn verify_with_offset(
        &self,
        msg: &[u8],
        signature: &Scalar,
        offset: &Point,
    ) -> Result<bool, MusigError> {
        self.ensure_live()?;
        SECP256K1.validate(offset)?;
        let X_agg = self.aggregated_public_key()?;
        let R_agg = self.aggregated_nonce()?;
        let c = compute_challenge(X_agg, R_agg, msg)?;
        signature_holds(signature, &c, X_agg, R_agg, offset)
    }

    /// Verify one participant's partial signature: `s_j * G == R_j + c * a_j * X_j`.
    pub fn verify_partial(
        &self,
        msg: &[u8],
        partial: &Scalar,
        X_j: &Point,
        R_j: &Point,
    ) -> Result<bool, MusigError> {
        self.ensure_live()?;
        SECP256K1.validate(X_j)?;
        SECP256K1.validate(R_j)?;
        let c = self.challenge(msg)?;
        let a_j = aggregation_coefficient(self.aggregation_hash()?, X_j)?;
        partial_signature_holds(partial, &c, &a_j, X_j, R_j)
    }

    /// Abandon the ceremony, e.g. when a peer misses its round.
    ///
    /// The nonce is burnt; a retry needs a fresh session with a fresh nonce.
    pub fn abort(&mut self) {
        if !self.aborted {
            warn!("musig ceremony aborted");
        }
        self.aborted = true;
        self.nonce_used = true;
    }
}

#[cfg(test)]
mod musig_session_tests {
    use super::*;
    use crate::curve::CurveParams;
    use crate::error::ArithmeticError;
    use crate::secp256k1::generate_key_pair;
    use crate::sign::sum_signatures;

    fn session() -> MuSigSession {
        MuSigSession::new(generate_key_pair().unwrap(), generate_key_pair().unwrap())
    }

    /// Run rounds 1 and 2 between the given sessions.
    fn exchange(sessions: &mut [MuSigSession]) {
        let Xs: Vec<Point> = sessions.iter().map(|s| s.public_key().clone()).collect();
        for s in sessions.iter_mut() {
            s.set_public_keys(Xs.clone()).unwrap();
        }
        let ts: Vec<Commitment> = sessions.iter().map(|s| s.commitment().unwrap()).collect();
        for s in sessions.iter_mut() {
            s.set_commitments(ts.clone()).unwrap();
        }
        let Rs: Vec<Point> = sessions
            .iter()
            .map(|s| s.reveal_nonce().unwrap().clone())
            .collect();
        for s in sessions.iter_mut() {
            s.set_public_nonces(Rs.clone()).unwrap();
        }
    }

    #[test]
    fn single_party_falls_back_to_schnorr() {
        let mut sessions = vec![session()];
        exchange(&mut sessions);
        let s = &mut sessions[0];
        let sig = s.sign(b"Single-party test").unwrap();
        assert!(s.verify(b"Single-party test", &sig).unwrap());

        // plain Schnorr equation with X_agg = a * X, R_agg = R
        let a = s.coefficient().unwrap().clone();
        let X = s.public_key().clone();
        let curve = SECP256K1.curve();
        assert_eq!(
            s.aggregated_public_key().unwrap(),
            &curve.mul(&X, &a).unwrap()
        );
        assert_eq!(s.aggregated_nonce().unwrap(), s.reveal_nonce().unwrap());
    }

    #[test]
    fn two_party_flow_verifies() {
        let mut sessions = vec![session(), session()];
        exchange(&mut sessions);
        let msg = b"The MuSig test";
        let s1 = sessions[0].sign(msg).unwrap();
        let s2 = sessions[1].sign(msg).unwrap();
        let s = sum_signatures(&[s1.clone(), s2.clone()]);

        assert!(sessions[0].verify(msg, &s).unwrap());
        assert!(sessions[1].verify(msg, &s).unwrap());
        assert!(!sessions[0].verify(msg, &s1).unwrap());
        assert!(!sessions[0].verify(b"another message", &s).unwrap());
    }

    #[test]
    fn both_parties_derive_identical_aggregates() {
        let mut sessions = vec![session(), session(), session()];
        exchange(&mut sessions);
        let first = &sessions[0];
        for other in &sessions[1..] {
            assert_eq!(
                first.aggregation_hash().unwrap(),
                other.aggregation_hash().unwrap()
            );
            assert_eq!(
                first.aggregated_public_key().unwrap(),
                other.aggregated_public_key().unwrap()
            );
            assert_eq!(
                first.aggregated_nonce().unwrap(),
                other.aggregated_nonce().unwrap()
            );
        }
    }

    #[test]
    fn partial_signatures_verify_individually() {
        let mut sessions = vec![session(), session()];
        exchange(&mut sessions);
        let msg = b"partials";
        let X1 = sessions[0].public_key().clone();
        let R1 = sessions[0].reveal_nonce().unwrap().clone();
        let X2 = sessions[1].public_key().clone();
        let s1 = sessions[0].sign(msg).unwrap();

        assert!(sessions[1].verify_partial(msg, &s1, &X1, &R1).unwrap());
        assert!(!sessions[1].verify_partial(msg, &s1, &X2, &R1).unwrap());
    }

    #[test]
    fn nonce_is_not_revealed_before_commitments() {
        let mut a = session();
        let b = session();
        assert_eq!(a.reveal_nonce(), Err(MusigError::MissingPublicKeys));
        a.set_public_keys(vec![a.public_key().clone(), b.public_key().clone()])
            .unwrap();
        assert_eq!(
            a.reveal_nonce(),
            Err(MusigError::MissingCommits {
                expected: 2,
                got: 0
            })
        );
    }

    #[test]
    fn commitment_count_must_match() {
        let mut a = session();
        let b = session();
        a.set_public_keys(vec![a.public_key().clone(), b.public_key().clone()])
            .unwrap();
        let err = a.set_commitments(vec![a.commitment().unwrap()]).unwrap_err();
        assert_eq!(
            err,
            MusigError::MissingCommits {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn tampered_nonce_aborts() {
        let mut sessions = vec![session(), session()];
        let Xs: Vec<Point> = sessions.iter().map(|s| s.public_key().clone()).collect();
        for s in sessions.iter_mut() {
            s.set_public_keys(Xs.clone()).unwrap();
        }
        let ts: Vec<Commitment> = sessions.iter().map(|s| s.commitment().unwrap()).collect();
        for s in sessions.iter_mut() {
            s.set_commitments(ts.clone()).unwrap();
        }
        let mut Rs: Vec<Point> = sessions
            .iter()
            .map(|s| s.reveal_nonce().unwrap().clone())
            .collect();
        Rs[1] = generate_key_pair().unwrap().public().clone();

        let a = &mut sessions[0];
        assert_eq!(
            a.set_public_nonces(Rs),
            Err(MusigError::CommitmentMismatch { index: 1 })
        );
        assert!(a.is_aborted());
        assert_eq!(
            a.aggregated_nonce(),
            Err(MusigError::MissingNonces {
                expected: 2,
                got: 0
            })
        );
        assert_eq!(a.sign(b"m"), Err(MusigError::Aborted));
    }

    #[test]
    fn nonce_cannot_sign_twice() {
        let mut sessions = vec![session()];
        exchange(&mut sessions);
        sessions[0].sign(b"first").unwrap();
        assert_eq!(sessions[0].sign(b"second"), Err(MusigError::NonceReused));
    }

    #[test]
    fn inputs_are_write_once() {
        let mut sessions = vec![session(), session()];
        exchange(&mut sessions);
        let Xs = sessions[0].public_keys().unwrap().to_vec();
        assert_eq!(
            sessions[0].set_public_keys(Xs),
            Err(MusigError::InputsAlreadySet("public keys"))
        );
        let ts = sessions[0].commitments().unwrap().to_vec();
        assert_eq!(
            sessions[0].set_commitments(ts),
            Err(MusigError::InputsAlreadySet("commitments"))
        );
        let Rs = sessions[0].public_nonces().unwrap().to_vec();
        assert_eq!(
            sessions[0].set_public_nonces(Rs),
            Err(MusigError::InputsAlreadySet("public nonces"))
        );
    }

    #[test]
    fn participant_list_is_validated() {
        let mut a = session();
        let b = session();
        assert_eq!(a.set_public_keys(vec![]), Err(MusigError::NoParticipants));
        assert_eq!(
            a.set_public_keys(vec![b.public_key().clone()]),
            Err(MusigError::UnknownSigner)
        );
        assert_eq!(
            a.set_public_keys(vec![a.public_key().clone(), a.public_key().clone()]),
            Err(MusigError::DuplicateParticipant)
        );
        assert_eq!(
            a.set_public_keys(vec![a.public_key().clone(), Point::Infinity]),
            Err(MusigError::PointAtInfinity)
        );
    }

    #[test]
    fn off_curve_key_is_rejected() {
        let mut a = session();
        let field = SECP256K1.curve().field();
        let bogus = Point::Affine {
            x: field.element(1u8),
            y: field.element(1u8),
        };
        assert_eq!(
            a.set_public_keys(vec![a.public_key().clone(), bogus]),
            Err(MusigError::Arithmetic(ArithmeticError::NotOnCurve))
        );
        assert!(a.public_keys().is_none());
    }

    #[test]
    fn foreign_field_nonce_aborts_without_panicking() {
        let mut a = session();
        let b = session();
        a.set_public_keys(vec![a.public_key().clone(), b.public_key().clone()])
            .unwrap();

        // b commits to, then reveals, a point on an unrelated curve over F_97
        let toy = CurveParams::new(BigUint::from(97u8), BigUint::from(2u8), BigUint::from(3u8));
        let foreign = toy.point(BigUint::from(3u8), BigUint::from(6u8)).unwrap();
        a.set_commitments(vec![a.commitment().unwrap(), Commitment::to(&foreign).unwrap()])
            .unwrap();
        let own = a.reveal_nonce().unwrap().clone();

        assert_eq!(
            a.set_public_nonces(vec![own, foreign]),
            Err(MusigError::Arithmetic(ArithmeticError::NotOnCurve))
        );
        assert!(a.is_aborted());
        assert_eq!(a.sign(b"Hello"), Err(MusigError::Aborted));
    }

    #[test]
    fn explicit_abort_blocks_signing() {
        let mut sessions = vec![session(), session()];
        exchange(&mut sessions);
        sessions[0].abort();
        assert_eq!(sessions[0].sign(b"late"), Err(MusigError::Aborted));
        assert_eq!(sessions[0].reveal_nonce(), Err(MusigError::Aborted));
    }
}
