use thiserror::Error;

/// Errors raised by field and curve arithmetic.
///
/// These abort the current operation immediately: they mean the inputs were malformed
/// or hit a genuine edge case the caller has to reject.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    /// The divisor (or the element being inverted) is zero modulo `p`.
    #[error("division by zero")]
    DivisionByZero,

    /// The operation has no defined result, e.g. negating the Point at Infinity.
    #[error("undefined operation: {0}")]
    UndefinedOperation(&'static str),

    /// The coordinates do not satisfy `y^2 = x^3 + ax + b`.
    #[error("point is not on the curve")]
    NotOnCurve,
}

/// Errors that can occur during key aggregation, the nonce exchange and signing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MusigError {
    /// A field or curve operation failed.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// The Point at Infinity has no byte encoding.
    #[error("the point at infinity cannot be encoded")]
    PointAtInfinity,

    /// Input bytes had the wrong length.
    #[error("invalid encoding: expected {expected} bytes, got {got}")]
    InvalidEncoding {
        /// Required length in bytes.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// Key aggregation was asked to aggregate an empty key list.
    #[error("no participants")]
    NoParticipants,

    /// Nonce aggregation was asked to aggregate an empty nonce list.
    #[error("empty nonce list")]
    NoNonces,

    /// The same public key appears more than once in the participant list.
    #[error("duplicate participant public key")]
    DuplicateParticipant,

    /// Our own public key is not part of the participant list.
    #[error("own public key is not among the participants")]
    UnknownSigner,

    /// The participant list has not been assigned yet.
    #[error("participant public keys have not been set")]
    MissingPublicKeys,

    /// Not every participant's commitment has been recorded.
    #[error("missing commits: expected {expected}, got {got}")]
    MissingCommits {
        /// One commitment per participant.
        expected: usize,
        /// Number of commitments recorded.
        got: usize,
    },

    /// Not every participant's public nonce has been recorded.
    #[error("missing nonces: expected {expected}, got {got}")]
    MissingNonces {
        /// One public nonce per participant.
        expected: usize,
        /// Number of public nonces recorded.
        got: usize,
    },

    /// Our own nonce commitment or public nonce is missing from the exchanged lists.
    #[error("own nonce is not among the exchanged nonces")]
    MissingOwnNonce,

    /// A protocol input was assigned twice.
    #[error("{0} already set")]
    InputsAlreadySet(&'static str),

    /// A revealed nonce does not open its earlier commitment.
    #[error("nonce at index {index} does not match its commitment")]
    CommitmentMismatch {
        /// Position of the offending nonce in the exchanged list.
        index: usize,
    },

    /// The session nonce has already been used for a signature.
    #[error("nonce already used, start a fresh ceremony")]
    NonceReused,

    /// The ceremony was aborted and its state must not be used.
    #[error("ceremony aborted")]
    Aborted,

    /// A recovered adaptor offset does not match the published offset point.
    #[error("recovered offset does not match the published offset point")]
    OffsetMismatch,

    /// Scalar generation kept drawing zero.
    #[error("scalar is zero")]
    ZeroScalar,

    /// The operating system random source failed.
    #[error("entropy source failure: {0}")]
    Entropy(String),
}
