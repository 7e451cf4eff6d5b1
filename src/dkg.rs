// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Distributed key generation rounds.
//!
//! Each party runs one [`Round`] per key-establishment flow: the initial
//! keygen, a share refresh, or a threshold increase. A round owns the
//! party's secret polynomial and publishes three things: the coefficient
//! commitments, a Schnorr proof of knowledge of the constant term (where one
//! exists), and one evaluation of the polynomial per counterparty. Receivers
//! check the broadcasts with [`verify_proof_of_knowledge`] and each share
//! with [`verify_share`], then complete the flow through
//! [`Participant`](crate::Participant).
//!
//! Rounds exchange plain values; ordering is the transport's problem. The
//! entry points assume all messages of one round are delivered before the
//! next begins.

use k256::elliptic_curve::ff::Field;
use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::hash::{scalar_from_digest, PROOF_CONTEXT};
use crate::{point, Error};

/// A Schnorr proof of knowledge of a committed polynomial's constant term,
/// broadcast alongside the coefficient commitments.
#[allow(non_snake_case)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ProofOfKnowledge {
    /// The prover's nonce commitment `R = G·k`.
    pub R: ProjectivePoint,
    /// The response scalar `μ = k + a₀·c mod Q`.
    pub mu: Scalar,
}

/// What a [`Round`] establishes, fixed at construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RoundKind {
    /// Initial keygen: a fresh polynomial with a secret constant term.
    Keygen,
    /// Share refresh: a polynomial with constant term zero, leaving the
    /// group key in place.
    Refresh,
    /// Threshold increase: a polynomial with no constant slot at all; the
    /// recipient multiplies its aggregated evaluation by its own index.
    ThresholdIncrease {
        /// The threshold in force before this round.
        from: u8,
    },
}

/// One party's in-flight key-establishment round.
///
/// The secret coefficients never leave the round and are zeroized when it is
/// dropped (completion via [`Participant`](crate::Participant) consumes the
/// round).
#[derive(Debug)]
pub struct Round {
    index: u8,
    participants: u8,
    kind: RoundKind,
    coefficients: Vec<Scalar>,
    commitments: Vec<ProjectivePoint>,
    proof_of_knowledge: Option<ProofOfKnowledge>,
}

impl Round {
    /// Start the initial keygen round: sample a polynomial of degree
    /// `threshold − 1` with every coefficient uniform, commit to each
    /// coefficient, and prove knowledge of the constant term (the party's
    /// secret contribution to the group key).
    pub fn keygen<R: RngCore + CryptoRng>(
        threshold: u8,
        participants: u8,
        index: u8,
        rng: &mut R,
    ) -> Result<Self, Error> {
        check_parameters(threshold, participants, index)?;

        let coefficients: Vec<Scalar> = (0..threshold)
            .map(|_| Scalar::random(&mut *rng))
            .collect();
        let commitments = commit(&coefficients);
        let proof_of_knowledge = Some(prove_knowledge(
            index,
            &coefficients[0],
            &commitments[0],
            rng,
        )?);

        Ok(Round {
            index,
            participants,
            kind: RoundKind::Keygen,
            coefficients,
            commitments,
            proof_of_knowledge,
        })
    }

    /// Start a share-refresh round: the constant term is pinned to zero so
    /// the group key is preserved, and the `threshold − 1` higher
    /// coefficients are uniform.
    ///
    /// There is no proof of knowledge: the constant commitment is the
    /// identity, which is both unencodable and exactly the property
    /// receivers check instead.
    pub fn refresh<R: RngCore + CryptoRng>(
        threshold: u8,
        participants: u8,
        index: u8,
        rng: &mut R,
    ) -> Result<Self, Error> {
        check_parameters(threshold, participants, index)?;

        let mut coefficients = vec![Scalar::ZERO];
        coefficients.extend((1..threshold).map(|_| Scalar::random(&mut *rng)));
        let commitments = commit(&coefficients);

        Ok(Round {
            index,
            participants,
            kind: RoundKind::Refresh,
            coefficients,
            commitments,
            proof_of_knowledge: None,
        })
    }

    /// Start a threshold-increase round from `threshold` to
    /// `new_threshold`.
    ///
    /// The sampled polynomial `g` has `new_threshold − 1` coefficients and
    /// *no constant slot*: the group increment is `δ(X) = X·g(X)`, zero at
    /// the origin, so the group key is preserved. Knowledge of the first
    /// coefficient is proven as in keygen.
    pub fn threshold_increase<R: RngCore + CryptoRng>(
        threshold: u8,
        new_threshold: u8,
        participants: u8,
        index: u8,
        rng: &mut R,
    ) -> Result<Self, Error> {
        check_parameters(threshold, participants, index)?;
        if new_threshold <= threshold || new_threshold > participants {
            return Err(Error::InvalidParameters {
                threshold: new_threshold,
                participants,
            });
        }

        let coefficients: Vec<Scalar> = (1..new_threshold)
            .map(|_| Scalar::random(&mut *rng))
            .collect();
        let commitments = commit(&coefficients);
        let proof_of_knowledge = Some(prove_knowledge(
            index,
            &coefficients[0],
            &commitments[0],
            rng,
        )?);

        Ok(Round {
            index,
            participants,
            kind: RoundKind::ThresholdIncrease { from: threshold },
            coefficients,
            commitments,
            proof_of_knowledge,
        })
    }

    /// This party's index.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The number of participants in the group.
    pub fn participants(&self) -> u8 {
        self.participants
    }

    /// The coefficient commitments `C_k = G·a_k`, broadcast to every
    /// counterparty.
    pub fn commitments(&self) -> &[ProjectivePoint] {
        &self.commitments
    }

    /// The proof of knowledge of the constant term. `None` for refresh
    /// rounds, whose constant term is fixed to zero.
    pub fn proof_of_knowledge(&self) -> Option<&ProofOfKnowledge> {
        self.proof_of_knowledge.as_ref()
    }

    /// The polynomial evaluated at `recipient`, to be sent to that party
    /// over a confidential channel.
    pub fn share_for(&self, recipient: u8) -> Result<Scalar, Error> {
        if recipient == 0 || recipient > self.participants {
            return Err(Error::IndexOutOfRange { index: recipient });
        }
        Ok(evaluate(&self.coefficients, recipient))
    }

    /// All shares in recipient order: entry `j − 1` is the share addressed
    /// to participant `j`.
    pub fn shares(&self) -> Vec<Scalar> {
        (1..=self.participants)
            .map(|recipient| evaluate(&self.coefficients, recipient))
            .collect()
    }

    pub(crate) fn kind(&self) -> RoundKind {
        self.kind
    }
}

impl Zeroize for Round {
    fn zeroize(&mut self) {
        for coefficient in &mut self.coefficients {
            *coefficient = Scalar::ZERO;
        }
    }
}

impl Drop for Round {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Check a counterparty's proof of knowledge of its constant term.
///
/// Accepts iff `G·μ − C₀·c == R` for the recomputed challenge `c`; this is
/// the usual Schnorr verification equation. Malformed inputs verify as
/// `false`, never as an error.
pub fn verify_proof_of_knowledge(
    index: u8,
    commitment: &ProjectivePoint,
    proof: &ProofOfKnowledge,
) -> bool {
    let challenge = match proof_challenge(index, commitment, &proof.R) {
        Ok(challenge) => challenge,
        Err(_) => return false,
    };
    ProjectivePoint::GENERATOR * proof.mu - *commitment * challenge == proof.R
}

/// Check a share received from the dealer who broadcast `commitments`.
///
/// This is the Feldman consistency check: `G·s` must equal the committed
/// polynomial evaluated at `receiver` in the exponent.
pub fn verify_share(receiver: u8, share: &Scalar, commitments: &[ProjectivePoint]) -> bool {
    if receiver == 0 || commitments.is_empty() {
        return false;
    }

    let x = Scalar::from(u64::from(receiver));
    let (_, expected) = commitments.iter().fold(
        (Scalar::ONE, ProjectivePoint::IDENTITY),
        |(power, sum), commitment| (power * x, sum + *commitment * power),
    );

    ProjectivePoint::GENERATOR * *share == expected
}

/// Evaluate the polynomial with the given coefficients (constant term
/// first) at `x`, by Horner's scheme from the highest degree down.
pub(crate) fn evaluate(coefficients: &[Scalar], x: u8) -> Scalar {
    let x = Scalar::from(u64::from(x));
    let mut value = Scalar::ZERO;
    for coefficient in coefficients.iter().rev() {
        value = value * x + coefficient;
    }
    value
}

fn check_parameters(threshold: u8, participants: u8, index: u8) -> Result<(), Error> {
    if threshold == 0 || participants == 0 || threshold > participants {
        return Err(Error::InvalidParameters {
            threshold,
            participants,
        });
    }
    if index == 0 || index > participants {
        return Err(Error::IndexOutOfRange { index });
    }
    Ok(())
}

fn commit(coefficients: &[Scalar]) -> Vec<ProjectivePoint> {
    coefficients
        .iter()
        .map(|coefficient| ProjectivePoint::GENERATOR * coefficient)
        .collect()
}

fn prove_knowledge<R: RngCore + CryptoRng>(
    index: u8,
    secret: &Scalar,
    commitment: &ProjectivePoint,
    rng: &mut R,
) -> Result<ProofOfKnowledge, Error> {
    let nonce = Scalar::random(&mut *rng);
    let nonce_commitment = ProjectivePoint::GENERATOR * nonce;
    let challenge = proof_challenge(index, commitment, &nonce_commitment)?;
    Ok(ProofOfKnowledge {
        R: nonce_commitment,
        mu: nonce + *secret * challenge,
    })
}

/// The proof challenge `c = H(i ‖ "FROST-BIP340" ‖ SEC1(C₀) ‖ SEC1(R))`,
/// reduced into the scalar field.
fn proof_challenge(
    index: u8,
    commitment: &ProjectivePoint,
    nonce_commitment: &ProjectivePoint,
) -> Result<Scalar, Error> {
    let digest = Sha256::new()
        .chain_update([index])
        .chain_update(PROOF_CONTEXT)
        .chain_update(point::serialize(commitment)?)
        .chain_update(point::serialize(nonce_commitment)?)
        .finalize();
    Ok(scalar_from_digest(digest.into()))
}
