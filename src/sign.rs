//! Signature aggregation.
//!
//! Partial signatures are scalars modulo `N`; the combined signature is their sum.

use crate::secp256k1::{SECP256K1, Scalar};

/// Sum partial signatures modulo the group order: `s = sum(s_i) mod N`.
///
/// An empty list sums to zero.
pub fn sum_signatures(signatures: &[Scalar]) -> Scalar {
    signatures
        .iter()
        .fold(SECP256K1.scalar(0u8), |acc, s| &acc + s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn empty_sum_is_zero() {
        assert!(sum_signatures(&[]).is_zero());
    }

    #[test]
    fn sum_wraps_modulo_the_order() {
        let n_minus_one = SECP256K1.scalar(SECP256K1.order() - BigUint::from(1u8));
        let two = SECP256K1.scalar(2u8);
        assert_eq!(sum_signatures(&[n_minus_one, two]), SECP256K1.scalar(1u8));
    }

    #[test]
    fn order_of_partials_does_not_matter() {
        let a = SECP256K1.scalar(123u32);
        let b = SECP256K1.scalar(456u32);
        let c = SECP256K1.scalar(789u32);
        assert_eq!(
            sum_signatures(&[a.clone(), b.clone(), c.clone()]),
            sum_signatures(&[c, a, b])
        );
    }
}
