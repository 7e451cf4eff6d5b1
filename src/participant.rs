// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Long-term participant state and its lifecycle.
//!
//! A [`Participant`] exists only once a key-establishment flow has
//! completed, so every field is always meaningful: there are no "not yet
//! initialized" sentinels. In-flight state lives elsewhere — polynomial
//! rounds in [`dkg::Round`](crate::dkg::Round), signing nonces in
//! [`NoncePair`](crate::NoncePair), repair randomness in
//! [`RepairShares`](crate::RepairShares) — and participants exchange plain
//! values, never references.

use k256::elliptic_curve::ff::Field;
use k256::{ProjectivePoint, Scalar};
use zeroize::Zeroize;

use crate::aggregator::{self, KeyTweaks};
use crate::dkg::{Round, RoundKind};
use crate::nonce::{NonceCommitmentPair, NoncePair};
use crate::{lagrange_coefficient, point, Error, Matrix};

/// One party's long-term view of the group: its identity, its secret
/// signing share, and the public data needed to verify anyone's share.
///
/// The signing share is zeroized when the participant is dropped. The
/// embedder persists `index`, `aggregate_share` and `group_commitments`;
/// this crate never serializes secrets.
pub struct Participant {
    index: u8,
    threshold: u8,
    participants: u8,
    aggregate_share: Scalar,
    public_key: ProjectivePoint,
    group_commitments: Vec<ProjectivePoint>,
}

impl Participant {
    /// Complete a keygen round: fold the shares the counterparties
    /// addressed to this party into the long-term signing share, and the
    /// broadcast commitment vectors into the group commitments.
    ///
    /// `received_shares` and `commitment_sets` hold one entry per
    /// *counterparty* (this party's own contribution comes from `round`).
    /// Order does not matter: shares are summed and commitment vectors are
    /// summed componentwise. Callers are expected to have checked each
    /// counterparty first with
    /// [`verify_proof_of_knowledge`](crate::dkg::verify_proof_of_knowledge)
    /// and [`verify_share`](crate::dkg::verify_share); this constructor
    /// still finishes with the Feldman self-check and fails with
    /// [`Error::InconsistentShare`] if the aggregate does not lie on the
    /// summed polynomial.
    pub fn from_dkg(
        round: Round,
        received_shares: &[Scalar],
        commitment_sets: &[Vec<ProjectivePoint>],
    ) -> Result<Self, Error> {
        if round.kind() != RoundKind::Keygen {
            return Err(Error::MismatchedRound);
        }

        let counterparties = usize::from(round.participants()) - 1;
        let threshold = round.commitments().len();
        check_counts(
            counterparties,
            threshold,
            received_shares,
            commitment_sets,
        )?;

        let mut aggregate_share = round.share_for(round.index())?;
        for share in received_shares {
            aggregate_share += share;
        }

        let mut group_commitments = round.commitments().to_vec();
        for set in commitment_sets {
            for (k, commitment) in set.iter().enumerate() {
                group_commitments[k] += commitment;
            }
        }

        let participant = Participant {
            index: round.index(),
            threshold: threshold as u8,
            participants: round.participants(),
            aggregate_share,
            public_key: group_commitments[0],
            group_commitments,
        };
        participant.check_consistency()?;
        Ok(participant)
    }

    /// Recover a lost share from a repair committee's aggregate repair
    /// shares (one per helper, `threshold` in total).
    ///
    /// The public group data comes from any surviving participant. The
    /// recovered share is accepted only if it passes the Feldman check
    /// against the group commitments (`Error::InconsistentShare`
    /// otherwise). A party that still holds its share has no use for this
    /// constructor — holding a [`Participant`] *is* holding the share.
    pub fn from_repair(
        index: u8,
        participants: u8,
        group_commitments: Vec<ProjectivePoint>,
        aggregate_repair_shares: &[Scalar],
    ) -> Result<Self, Error> {
        let threshold = group_commitments.len();
        if threshold == 0 || threshold > usize::from(participants) {
            return Err(Error::InvalidParameters {
                threshold: threshold as u8,
                participants,
            });
        }
        if index == 0 || index > participants {
            return Err(Error::IndexOutOfRange { index });
        }
        if aggregate_repair_shares.len() != threshold {
            return Err(Error::WrongShareCount {
                expected: threshold,
                got: aggregate_repair_shares.len(),
            });
        }

        let mut aggregate_share = Scalar::ZERO;
        for share in aggregate_repair_shares {
            aggregate_share += share;
        }

        let participant = Participant {
            index,
            threshold: threshold as u8,
            participants,
            aggregate_share,
            public_key: group_commitments[0],
            group_commitments,
        };
        participant.check_consistency()?;
        Ok(participant)
    }

    /// Fold a completed refresh round into this participant.
    ///
    /// Every dealer's constant commitment must be the identity (the
    /// property that keeps the group key in place); anything else fails
    /// with [`Error::InvalidRefresh`]. On success the signing share and the
    /// group commitments are updated in place and the public key is
    /// untouched.
    pub fn apply_refresh(
        &mut self,
        round: Round,
        received_shares: &[Scalar],
        commitment_sets: &[Vec<ProjectivePoint>],
    ) -> Result<(), Error> {
        if round.kind() != RoundKind::Refresh
            || round.index() != self.index
            || round.participants() != self.participants
            || round.commitments().len() != usize::from(self.threshold)
        {
            return Err(Error::MismatchedRound);
        }

        let counterparties = usize::from(self.participants) - 1;
        check_counts(
            counterparties,
            usize::from(self.threshold),
            received_shares,
            commitment_sets,
        )?;
        if commitment_sets
            .iter()
            .any(|set| set[0] != ProjectivePoint::IDENTITY)
        {
            return Err(Error::InvalidRefresh);
        }

        let mut delta = round.share_for(self.index)?;
        for share in received_shares {
            delta += share;
        }

        let previous_share = self.aggregate_share;
        let previous_commitments = self.group_commitments.clone();

        self.aggregate_share += delta;
        for (k, commitment) in round.commitments().iter().enumerate() {
            self.group_commitments[k] += commitment;
        }
        for set in commitment_sets {
            for (k, commitment) in set.iter().enumerate() {
                self.group_commitments[k] += commitment;
            }
        }

        if let Err(error) = self.check_consistency() {
            self.aggregate_share = previous_share;
            self.group_commitments = previous_commitments;
            return Err(error);
        }
        Ok(())
    }

    /// Fold a completed threshold-increase round into this participant.
    ///
    /// Each dealer contributed `δ_j(X) = X·g_j(X)`, exchanged as plain
    /// `g_j(i)` evaluations; the recipient multiplies the summed evaluation
    /// by its own index, which is what pins every increment to zero at the
    /// origin. The group commitments grow by one degree and the threshold
    /// becomes the round's target.
    pub fn apply_threshold_increase(
        &mut self,
        round: Round,
        received_shares: &[Scalar],
        commitment_sets: &[Vec<ProjectivePoint>],
    ) -> Result<(), Error> {
        match round.kind() {
            RoundKind::ThresholdIncrease { from } if from == self.threshold => {}
            _ => return Err(Error::MismatchedRound),
        }
        if round.index() != self.index || round.participants() != self.participants {
            return Err(Error::MismatchedRound);
        }

        let counterparties = usize::from(self.participants) - 1;
        let new_threshold = round.commitments().len() + 1;
        check_counts(
            counterparties,
            new_threshold - 1,
            received_shares,
            commitment_sets,
        )?;

        let mut delta = round.share_for(self.index)?;
        for share in received_shares {
            delta += share;
        }

        let previous_share = self.aggregate_share;
        let previous_commitments = self.group_commitments.clone();
        let previous_threshold = self.threshold;

        self.aggregate_share += Scalar::from(u64::from(self.index)) * delta;
        self.group_commitments
            .resize(new_threshold, ProjectivePoint::IDENTITY);
        for (k, commitment) in round.commitments().iter().enumerate() {
            self.group_commitments[k + 1] += commitment;
        }
        for set in commitment_sets {
            for (k, commitment) in set.iter().enumerate() {
                self.group_commitments[k + 1] += commitment;
            }
        }
        self.threshold = new_threshold as u8;

        if let Err(error) = self.check_consistency() {
            self.aggregate_share = previous_share;
            self.group_commitments = previous_commitments;
            self.threshold = previous_threshold;
            return Err(error);
        }
        Ok(())
    }

    /// Lower the threshold by one, given the share a departing participant
    /// has publicly revealed.
    ///
    /// The surviving share is projected onto the one-degree-lower
    /// polynomial through `(j*, s*)`:
    /// `q = (s_i − s*)·(i − j*)⁻¹`, `s_i := s* − j*·q`. The group
    /// commitments are recomputed by forming the projected verification
    /// shares of `threshold − 1` surviving indexes in the exponent and
    /// inverting their Vandermonde matrix.
    pub fn decrement_threshold(
        &mut self,
        revealed_share: &Scalar,
        leaving_index: u8,
    ) -> Result<(), Error> {
        if leaving_index == 0 || leaving_index > self.participants {
            return Err(Error::IndexOutOfRange {
                index: leaving_index,
            });
        }
        if self.threshold < 2 {
            return Err(Error::InvalidParameters {
                threshold: self.threshold,
                participants: self.participants,
            });
        }

        let new_threshold = usize::from(self.threshold) - 1;
        let leaving = Scalar::from(u64::from(leaving_index));
        let own = Scalar::from(u64::from(self.index));

        let difference_inverse = Option::<Scalar>::from((own - leaving).invert())
            .ok_or(Error::NoInverse)?;
        let quotient = (self.aggregate_share - revealed_share) * difference_inverse;

        // Interpolation points: the first threshold − 1 surviving indexes.
        // Any distinct choice determines the same projected polynomial.
        let indexes: Vec<u8> = (1..=self.participants)
            .filter(|&candidate| candidate != leaving_index)
            .take(new_threshold)
            .collect();

        let revealed_point = ProjectivePoint::GENERATOR * revealed_share;
        let mut projected = Vec::with_capacity(new_threshold);
        for &x in &indexes {
            let verification_share =
                derive_public_verification_share(&self.group_commitments, x)?;
            let coefficient = leaving
                * Option::<Scalar>::from((Scalar::from(u64::from(x)) - leaving).invert())
                    .ok_or(Error::NoInverse)?;
            projected.push(vec![
                revealed_point - (verification_share - revealed_point) * coefficient,
            ]);
        }

        let vandermonde = Matrix::vandermonde(&indexes)?;
        let commitments = vandermonde.inverse()?.mul_point_matrix(&projected)?;

        self.aggregate_share = *revealed_share - leaving * quotient;
        self.group_commitments = commitments.into_iter().map(|row| row[0]).collect();
        self.threshold = new_threshold as u8;
        self.check_consistency()
    }

    /// Compute this party's signature share for one session.
    ///
    /// `nonce_commitment_pairs` is the session's full 1-through-n list
    /// (placeholders for non-signers); `participant_indexes` is the signer
    /// set, in the order every session member agreed on. The nonce pair is
    /// consumed: a second signature needs a fresh pair.
    pub fn sign(
        &self,
        message: &[u8],
        nonce_pair: NoncePair,
        nonce_commitment_pairs: &[NonceCommitmentPair],
        participant_indexes: &[u8],
        tweaks: Option<&KeyTweaks>,
    ) -> Result<Scalar, Error> {
        let commitment =
            aggregator::group_commitment(message, nonce_commitment_pairs, participant_indexes)?;
        let (effective_key, parity) = match tweaks {
            Some(tweaks) => aggregator::tweak_key(tweaks, &self.public_key)?,
            None => (self.public_key, 0),
        };
        let challenge = aggregator::challenge(&commitment, &effective_key, message)?;

        let mut hiding = nonce_pair.hiding;
        let mut binding = nonce_pair.binding;
        if !point::has_even_y(&commitment)? {
            hiding = -hiding;
            binding = -binding;
        }

        let rho = aggregator::binding_value(
            self.index,
            message,
            nonce_commitment_pairs,
            participant_indexes,
        )?;
        let lambda = lagrange_coefficient(0, self.index, participant_indexes)?;

        let mut share = self.aggregate_share;
        let key_parity = u8::from(!point::has_even_y(&effective_key)?);
        if key_parity != parity {
            share = -share;
        }

        Ok(hiding + binding * rho + lambda * share * challenge)
    }

    /// This party's index.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The current signing threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// The number of participants in the group.
    pub fn participants(&self) -> u8 {
        self.participants
    }

    /// The joint public key `Y`.
    pub fn public_key(&self) -> &ProjectivePoint {
        &self.public_key
    }

    /// The coefficient commitments of the group polynomial, length equal to
    /// the current threshold.
    pub fn group_commitments(&self) -> &[ProjectivePoint] {
        &self.group_commitments
    }

    /// The long-term secret signing share `s_i`.
    ///
    /// Handle with care: this is the secret the whole protocol protects.
    /// It is exposed for the embedder's persistence layer and for revealing
    /// a share when leaving the group through a threshold decrease.
    pub fn aggregate_share(&self) -> &Scalar {
        &self.aggregate_share
    }

    /// The public verification share `F_j = G·s_j` of any participant,
    /// derived from the group commitments.
    pub fn public_verification_share(&self, index: u8) -> Result<ProjectivePoint, Error> {
        if index == 0 || index > self.participants {
            return Err(Error::IndexOutOfRange { index });
        }
        derive_public_verification_share(&self.group_commitments, index)
    }

    fn check_consistency(&self) -> Result<(), Error> {
        let expected = derive_public_verification_share(&self.group_commitments, self.index)?;
        if ProjectivePoint::GENERATOR * self.aggregate_share == expected {
            Ok(())
        } else {
            Err(Error::InconsistentShare)
        }
    }
}

impl Zeroize for Participant {
    fn zeroize(&mut self) {
        self.aggregate_share = Scalar::ZERO;
    }
}

impl Drop for Participant {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Evaluate the group polynomial at `index` in the exponent:
/// `F_index = Σ_k C_k·index^k`.
pub fn derive_public_verification_share(
    group_commitments: &[ProjectivePoint],
    index: u8,
) -> Result<ProjectivePoint, Error> {
    if index == 0 {
        return Err(Error::IndexOutOfRange { index });
    }

    let x = Scalar::from(u64::from(index));
    let (_, share) = group_commitments.iter().fold(
        (Scalar::ONE, ProjectivePoint::IDENTITY),
        |(power, sum), commitment| (power * x, sum + *commitment * power),
    );
    Ok(share)
}

fn check_counts(
    counterparties: usize,
    commitments_per_set: usize,
    received_shares: &[Scalar],
    commitment_sets: &[Vec<ProjectivePoint>],
) -> Result<(), Error> {
    if received_shares.len() != counterparties {
        return Err(Error::WrongShareCount {
            expected: counterparties,
            got: received_shares.len(),
        });
    }
    if commitment_sets.len() != counterparties {
        return Err(Error::WrongCommitmentCount {
            expected: counterparties,
            got: commitment_sets.len(),
        });
    }
    for set in commitment_sets {
        if set.len() != commitments_per_set {
            return Err(Error::WrongCommitmentCount {
                expected: commitments_per_set,
                got: set.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dkg::evaluate;
    use rand::thread_rng;

    /// Build a synthetic group directly from a master polynomial, without
    /// running the DKG: each participant holds f(i), and the group
    /// commitments are the coefficient commitments of f.
    fn synthetic_group(coefficients: &[Scalar], participants: u8) -> Vec<Participant> {
        let group_commitments: Vec<ProjectivePoint> = coefficients
            .iter()
            .map(|coefficient| ProjectivePoint::GENERATOR * coefficient)
            .collect();

        (1..=participants)
            .map(|index| Participant {
                index,
                threshold: coefficients.len() as u8,
                participants,
                aggregate_share: evaluate(coefficients, index),
                public_key: group_commitments[0],
                group_commitments: group_commitments.clone(),
            })
            .collect()
    }

    fn random_coefficients(count: usize) -> Vec<Scalar> {
        let mut rng = thread_rng();
        (0..count).map(|_| Scalar::random(&mut rng)).collect()
    }

    #[test]
    fn verification_shares_match_the_shares() {
        let coefficients = random_coefficients(3);
        for participant in synthetic_group(&coefficients, 5) {
            let derived = participant
                .public_verification_share(participant.index())
                .unwrap();
            assert_eq!(
                ProjectivePoint::GENERATOR * *participant.aggregate_share(),
                derived
            );
        }
    }

    #[test]
    fn decrement_threshold_preserves_the_group_key() {
        let coefficients = random_coefficients(3);
        let mut group = synthetic_group(&coefficients, 4);
        let public_key = *group[0].public_key();

        let revealed = *group[3].aggregate_share();
        let mut survivors: Vec<Participant> = group.drain(..3).collect();
        for participant in &mut survivors {
            participant.decrement_threshold(&revealed, 4).unwrap();
            assert_eq!(participant.group_commitments().len(), 2);
            assert_eq!(participant.group_commitments()[0], public_key);
        }

        // Any two survivors still reconstruct the master secret.
        let indexes = [1u8, 2];
        let mut secret_point = ProjectivePoint::IDENTITY;
        for participant in &survivors[..2] {
            let lambda =
                lagrange_coefficient(0, participant.index(), &indexes).unwrap();
            secret_point +=
                ProjectivePoint::GENERATOR * (lambda * participant.aggregate_share());
        }
        assert_eq!(secret_point, public_key);
    }

    #[test]
    fn decrement_threshold_rejects_the_leaver_itself() {
        let coefficients = random_coefficients(2);
        let mut group = synthetic_group(&coefficients, 3);

        let revealed = *group[0].aggregate_share();
        assert_eq!(
            group[0].decrement_threshold(&revealed, 1).unwrap_err(),
            Error::NoInverse
        );
    }

    #[test]
    fn sign_consumes_state_that_checks_out() {
        // A 1-of-1 "group" exercises the full signing path compactly.
        let coefficients = random_coefficients(1);
        let group = synthetic_group(&coefficients, 1);
        let mut rng = thread_rng();

        let nonce = NoncePair::generate(&mut rng);
        let pairs = [nonce.commitments()];
        let z = group[0].sign(b"fnord!", nonce, &pairs, &[1], None).unwrap();

        // G·z == R' + c·Y' with the even-y conventions applied.
        let commitment = aggregator::group_commitment(b"fnord!", &pairs, &[1]).unwrap();
        let challenge =
            aggregator::challenge(&commitment, group[0].public_key(), b"fnord!").unwrap();
        let even_commitment = if point::has_even_y(&commitment).unwrap() {
            commitment
        } else {
            -commitment
        };
        let even_key = if point::has_even_y(group[0].public_key()).unwrap() {
            *group[0].public_key()
        } else {
            -*group[0].public_key()
        };
        assert_eq!(
            ProjectivePoint::GENERATOR * z,
            even_commitment + even_key * challenge
        );
    }
}
