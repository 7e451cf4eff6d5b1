// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Signing-ephemeral nonces.

use k256::elliptic_curve::ff::Field;
use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// A pair of secret signing nonces `(d, e)`.
///
/// A nonce pair must be used for *exactly one* signing attempt; reuse leaks
/// the long-lived signing share. [`Participant::sign`](crate::Participant::sign)
/// therefore consumes the pair by value, and the secrets are zeroized on
/// drop.
pub struct NoncePair {
    pub(crate) hiding: Scalar,
    pub(crate) binding: Scalar,
}

impl NoncePair {
    /// Draw a fresh nonce pair from a cryptographic RNG.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        NoncePair {
            hiding: Scalar::random(&mut *rng),
            binding: Scalar::random(&mut *rng),
        }
    }

    /// The public commitments `(D, E) = (G·d, G·e)`, published to the
    /// aggregator ahead of signing.
    pub fn commitments(&self) -> NonceCommitmentPair {
        NonceCommitmentPair {
            hiding: ProjectivePoint::GENERATOR * self.hiding,
            binding: ProjectivePoint::GENERATOR * self.binding,
        }
    }
}

impl Zeroize for NoncePair {
    fn zeroize(&mut self) {
        self.hiding = Scalar::ZERO;
        self.binding = Scalar::ZERO;
    }
}

impl Drop for NoncePair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// The public halves of a [`NoncePair`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NonceCommitmentPair {
    /// The hiding commitment `D = G·d`.
    pub hiding: ProjectivePoint,
    /// The binding commitment `E = G·e`.
    pub binding: ProjectivePoint,
}

impl Default for NonceCommitmentPair {
    /// The identity pair, usable as the placeholder entry for non-signing
    /// slots of a session's 1-through-n commitment list.
    fn default() -> Self {
        NonceCommitmentPair {
            hiding: ProjectivePoint::IDENTITY,
            binding: ProjectivePoint::IDENTITY,
        }
    }
}
