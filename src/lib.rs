#![deny(missing_docs)]

//! An implementation of FROST (Flexible Round-Optimized Schnorr Threshold)
//! signatures over secp256k1, producing BIP-340-compatible signatures.
//!
//! Any `t` of `n` participants can collaboratively sign a message under a
//! jointly-held public key established by a distributed key generation, and
//! the result is indistinguishable from an ordinary single-key BIP-340
//! Schnorr signature. Beyond keygen and signing, the crate covers the
//! share lifecycle: proactive refresh, repairing a participant's lost
//! share with the help of a committee, raising the threshold, lowering it
//! when a participant leaves, and BIP-32/taproot tweaking of the joint
//! key.
//!
//! > **WARNING**: nonce pairs must be used for exactly one signing
//! > attempt. This crate enforces that by consuming them, but the embedder
//! > is responsible for never persisting or replaying them.
//!
//! The crate is a protocol core: it exchanges plain scalars and points and
//! leaves transport, peer authentication and persistence to the embedder.
//! All operations are synchronous and compute-bound; the transport must
//! deliver every message of one round before the next round begins.
//!
//! A signing flow, with the key material already established:
//!
//! 1. each signer draws a [`NoncePair`] and publishes its
//!    [`NonceCommitmentPair`];
//! 2. an [`Aggregator`] is assembled from the joint key, the message, the
//!    commitment list and the signer set;
//! 3. each signer calls [`Participant::sign`] and sends back its share;
//! 4. [`Aggregator::signature`] combines the shares into the final
//!    64-byte [`Signature`].

use k256::elliptic_curve::ff::Field;
use k256::Scalar;

mod error;
mod hash;
mod signature;

pub mod aggregator;
pub mod dkg;
pub mod matrix;
pub mod nonce;
pub mod participant;
pub mod point;
pub mod repair;

pub use aggregator::{Aggregator, KeyTweaks};
pub use error::Error;
pub use matrix::Matrix;
pub use nonce::{NonceCommitmentPair, NoncePair};
pub use participant::Participant;
pub use repair::RepairShares;
pub use signature::Signature;

/// The Lagrange coefficient `λ(x; S, i) = Π_{j∈S, j≠i} (x − j)/(i − j)`,
/// evaluated in the scalar field.
///
/// At `x = 0` this is the weight that reconstructs the master secret from
/// the shares of the set `S`. The indexes must be pairwise distinct
/// ([`Error::DuplicateIndex`]); a zero denominator beyond that surfaces as
/// [`Error::NoInverse`].
pub fn lagrange_coefficient(x: u8, i: u8, indexes: &[u8]) -> Result<Scalar, Error> {
    for (position, &index) in indexes.iter().enumerate() {
        if indexes[..position].contains(&index) {
            return Err(Error::DuplicateIndex(index));
        }
    }

    let at = Scalar::from(u64::from(x));
    let own = Scalar::from(u64::from(i));
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;
    for &index in indexes {
        if index == i {
            continue;
        }
        let other = Scalar::from(u64::from(index));
        numerator *= at - other;
        denominator *= own - other;
    }

    let inverse = Option::<Scalar>::from(denominator.invert()).ok_or(Error::NoInverse)?;
    Ok(numerator * inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lagrange_weights_sum_to_one_at_any_member() {
        // Σ_i λ(x; S, i) interpolates the constant polynomial 1.
        let indexes = [1u8, 3, 5];
        let mut sum = Scalar::ZERO;
        for &i in &indexes {
            sum += lagrange_coefficient(0, i, &indexes).unwrap();
        }
        assert_eq!(sum, Scalar::ONE);
    }

    #[test]
    fn lagrange_rejects_duplicates() {
        assert_eq!(
            lagrange_coefficient(0, 1, &[1, 2, 2]).unwrap_err(),
            Error::DuplicateIndex(2)
        );
    }
}
