// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Share repair: rebuilding one participant's lost signing share.
//!
//! A committee of `threshold` surviving helpers can hand a participant its
//! share back without any of them learning it. Each helper splits its
//! Lagrange-weighted share contribution `λ_h·s_h` into `threshold` random
//! summands, commits to every summand, and routes one summand to each
//! committee member. Every member sums what it received into an aggregate
//! repair share; the lost participant sums those aggregates, which
//! telescopes to `Σ_h λ_h·s_h = f(i)` — its share. Recovery itself happens
//! in [`Participant::from_repair`](crate::Participant::from_repair).

use k256::elliptic_curve::ff::Field;
use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::participant::{derive_public_verification_share, Participant};
use crate::{lagrange_coefficient, Error};

/// One helper's secret repair contribution, bound to the sorted committee
/// it was generated for. Zeroized on drop.
pub struct RepairShares {
    committee: Vec<u8>,
    shares: Vec<Scalar>,
    commitments: Vec<ProjectivePoint>,
}

impl RepairShares {
    /// Split this helper's contribution to the lost share of
    /// `lost_index` into one random summand per committee member.
    ///
    /// The committee must contain exactly `threshold` distinct in-range
    /// helpers including this participant, and must not contain the lost
    /// index. The returned state carries the public commitments `G·r_k`
    /// for broadcast.
    pub fn generate<R: RngCore + CryptoRng>(
        participant: &Participant,
        committee: &[u8],
        lost_index: u8,
        rng: &mut R,
    ) -> Result<Self, Error> {
        if lost_index == 0 || lost_index > participant.participants() {
            return Err(Error::IndexOutOfRange { index: lost_index });
        }

        let mut committee = committee.to_vec();
        committee.sort_unstable();
        if committee.len() != usize::from(participant.threshold()) {
            return Err(Error::InvalidCommittee);
        }
        for (position, &member) in committee.iter().enumerate() {
            if member == 0 || member > participant.participants() {
                return Err(Error::IndexOutOfRange { index: member });
            }
            if position > 0 && committee[position - 1] == member {
                return Err(Error::DuplicateIndex(member));
            }
        }
        if committee.contains(&lost_index) || !committee.contains(&participant.index()) {
            return Err(Error::InvalidCommittee);
        }

        let lambda = lagrange_coefficient(lost_index, participant.index(), &committee)?;
        let target = lambda * participant.aggregate_share();

        let mut shares: Vec<Scalar> = (1..committee.len())
            .map(|_| Scalar::random(&mut *rng))
            .collect();
        let mut sum = Scalar::ZERO;
        for share in &shares {
            sum += share;
        }
        shares.push(target - sum);

        let commitments = shares
            .iter()
            .map(|share| ProjectivePoint::GENERATOR * share)
            .collect();

        Ok(RepairShares {
            committee,
            shares,
            commitments,
        })
    }

    /// The committee these shares are bound to, sorted ascending.
    pub fn committee(&self) -> &[u8] {
        &self.committee
    }

    /// The public commitments `G·r_k`, in committee order, broadcast so
    /// the other members can verify their summands.
    pub fn commitments(&self) -> &[ProjectivePoint] {
        &self.commitments
    }

    /// The summand addressed to `recipient`: the k-th share goes to the
    /// k-th member of the sorted committee.
    pub fn share_for(&self, recipient: u8) -> Result<Scalar, Error> {
        let position = self
            .committee
            .iter()
            .position(|&member| member == recipient)
            .ok_or(Error::IndexOutOfRange { index: recipient })?;
        Ok(self.shares[position])
    }
}

impl Zeroize for RepairShares {
    fn zeroize(&mut self) {
        for share in &mut self.shares {
            *share = Scalar::ZERO;
        }
    }
}

impl Drop for RepairShares {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Sum the repair summands one committee member holds (its own plus the
/// ones received from the other helpers) into its aggregate repair share.
pub fn aggregate_repair_shares(shares: &[Scalar]) -> Scalar {
    let mut aggregate = Scalar::ZERO;
    for share in shares {
        aggregate += share;
    }
    aggregate
}

/// Check one dealer's repair commitments against its public verification
/// share: the summands must add up to `λ_d·s_d`, so their commitments must
/// add up to `F_d·λ_d` in the exponent. Malformed inputs verify as
/// `false`.
pub fn verify_repair_share(
    dealer: u8,
    commitments: &[ProjectivePoint],
    committee: &[u8],
    lost_index: u8,
    group_commitments: &[ProjectivePoint],
) -> bool {
    if commitments.len() != committee.len() {
        return false;
    }
    let lambda = match lagrange_coefficient(lost_index, dealer, committee) {
        Ok(lambda) => lambda,
        Err(_) => return false,
    };
    let verification_share = match derive_public_verification_share(group_commitments, dealer) {
        Ok(share) => share,
        Err(_) => return false,
    };

    let mut sum = ProjectivePoint::IDENTITY;
    for commitment in commitments {
        sum += commitment;
    }
    sum == verification_share * lambda
}

/// Check a committee member's aggregate repair share against every
/// dealer's commitment to the summand routed to that member:
/// `G·aggregate == Σ_d C_d[pos]`. Malformed inputs verify as `false`.
pub fn verify_aggregate_repair_share(
    recipient: u8,
    aggregate: &Scalar,
    commitment_sets: &[Vec<ProjectivePoint>],
    committee: &[u8],
) -> bool {
    let position = match committee.iter().position(|&member| member == recipient) {
        Some(position) => position,
        None => return false,
    };

    let mut expected = ProjectivePoint::IDENTITY;
    for set in commitment_sets {
        match set.get(position) {
            Some(commitment) => expected += commitment,
            None => return false,
        }
    }
    ProjectivePoint::GENERATOR * *aggregate == expected
}
