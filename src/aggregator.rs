// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Signing-session aggregation.
//!
//! The aggregator is a semi-trusted coordinator: it can deny service but
//! learns no secrets and cannot forge. It fixes one session's message,
//! signer set and nonce commitments, and combines the participants' partial
//! signatures into a plain BIP-340 signature. The per-signer building
//! blocks ([`binding_value`], [`group_commitment`], [`challenge`],
//! [`tweak_key`]) are pure functions of the session values, so signers call
//! the same code while computing their shares.

use k256::elliptic_curve::ff::Field;
use k256::{ProjectivePoint, Scalar};
use sha2::{Digest, Sha256};

use crate::hash::{scalar_from_digest, tagged_hash, CHALLENGE_TAG};
use crate::nonce::NonceCommitmentPair;
use crate::{lagrange_coefficient, point, Error, Signature};

/// An additive adjustment of the group key: a BIP-32 child-derivation
/// tweak paired with a BIP-341 taproot tweak.
///
/// The protocol requires both tweaks or neither, so session APIs take an
/// `Option<&KeyTweaks>` and a lone tweak is unrepresentable.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyTweaks {
    /// The BIP-32 derivation tweak, applied first.
    pub bip32: Scalar,
    /// The taproot output tweak, applied to the x-only intermediate key.
    pub taproot: Scalar,
}

/// A signing session: the joint key, the message, the ordered nonce
/// commitment list (entry `j − 1` belongs to participant `j`; non-signer
/// entries may be placeholders), the signer set, and the optional tweak
/// data.
#[derive(Debug)]
pub struct Aggregator {
    public_key: ProjectivePoint,
    message: Vec<u8>,
    nonce_commitment_pairs: Vec<NonceCommitmentPair>,
    participant_indexes: Vec<u8>,
    tweak: Option<(ProjectivePoint, Scalar)>,
}

impl Aggregator {
    /// Assemble a session.
    ///
    /// The signer indexes must be distinct and within the commitment list;
    /// when tweaks are present the tweaked key and the effective aggregate
    /// tweak are precomputed here, surfacing [`Error::InvalidKey`] early.
    pub fn new(
        public_key: ProjectivePoint,
        message: &[u8],
        nonce_commitment_pairs: &[NonceCommitmentPair],
        participant_indexes: &[u8],
        tweaks: Option<&KeyTweaks>,
    ) -> Result<Self, Error> {
        for (position, &index) in participant_indexes.iter().enumerate() {
            if index == 0 || usize::from(index) > nonce_commitment_pairs.len() {
                return Err(Error::IndexOutOfRange { index });
            }
            if participant_indexes[..position].contains(&index) {
                return Err(Error::DuplicateIndex(index));
            }
        }

        let tweak = match tweaks {
            Some(tweaks) => {
                let (tweaked_key, tweak, _) = derive_tweaks(tweaks, &public_key)?;
                Some((tweaked_key, tweak))
            }
            None => None,
        };

        Ok(Aggregator {
            public_key,
            message: message.to_vec(),
            nonce_commitment_pairs: nonce_commitment_pairs.to_vec(),
            participant_indexes: participant_indexes.to_vec(),
            tweak,
        })
    }

    /// The tweaked session key, when the session was built with tweaks.
    pub fn tweaked_key(&self) -> Option<&ProjectivePoint> {
        self.tweak.as_ref().map(|(tweaked_key, _)| tweaked_key)
    }

    /// Combine the signers' partial signatures (in signer-set order) into
    /// the final 64-byte signature `x_only(R) ‖ z`.
    ///
    /// `z = Σ z_i mod Q`, plus `c·τ` when the session is tweaked.
    pub fn signature(&self, signature_shares: &[Scalar]) -> Result<Signature, Error> {
        if signature_shares.len() != self.participant_indexes.len() {
            return Err(Error::WrongShareCount {
                expected: self.participant_indexes.len(),
                got: signature_shares.len(),
            });
        }

        let commitment = group_commitment(
            &self.message,
            &self.nonce_commitment_pairs,
            &self.participant_indexes,
        )?;

        let mut z = Scalar::ZERO;
        for share in signature_shares {
            z += share;
        }
        if let Some((tweaked_key, tweak)) = &self.tweak {
            z += challenge(&commitment, tweaked_key, &self.message)? * tweak;
        }

        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&point::serialize_x_only(&commitment)?);
        bytes[32..].copy_from_slice(&z.to_bytes());
        Ok(Signature::from(bytes))
    }
}

/// The binding value `ρ_i = H(i ‖ m ‖ D_j ‖ E_j …)` tying participant `i`'s
/// second nonce to the message and the signer set.
///
/// The commitment pairs are folded in the order of `participant_indexes`,
/// which every session member must therefore agree on (conventionally
/// ascending).
pub fn binding_value(
    index: u8,
    message: &[u8],
    nonce_commitment_pairs: &[NonceCommitmentPair],
    participant_indexes: &[u8],
) -> Result<Scalar, Error> {
    if index == 0 || usize::from(index) > nonce_commitment_pairs.len() {
        return Err(Error::IndexOutOfRange { index });
    }

    let mut hasher = Sha256::new();
    hasher.update([index]);
    hasher.update(message);
    for &signer in participant_indexes {
        if signer == 0 || usize::from(signer) > nonce_commitment_pairs.len() {
            return Err(Error::IndexOutOfRange { index: signer });
        }
        let pair = &nonce_commitment_pairs[usize::from(signer) - 1];
        hasher.update(point::serialize(&pair.hiding)?);
        hasher.update(point::serialize(&pair.binding)?);
    }

    Ok(scalar_from_digest(hasher.finalize().into()))
}

/// The session's group commitment `R = Σ_i (D_i + ρ_i·E_i)` over the signer
/// set.
///
/// Fails with [`Error::DegenerateCommitment`] when `R` is the identity;
/// that session cannot produce a signature and must be restarted with fresh
/// nonces.
pub fn group_commitment(
    message: &[u8],
    nonce_commitment_pairs: &[NonceCommitmentPair],
    participant_indexes: &[u8],
) -> Result<ProjectivePoint, Error> {
    let mut commitment = ProjectivePoint::IDENTITY;
    for &signer in participant_indexes {
        if signer == 0 || usize::from(signer) > nonce_commitment_pairs.len() {
            return Err(Error::IndexOutOfRange { index: signer });
        }
        let rho = binding_value(signer, message, nonce_commitment_pairs, participant_indexes)?;
        let pair = &nonce_commitment_pairs[usize::from(signer) - 1];
        commitment += pair.hiding + pair.binding * rho;
    }

    if commitment == ProjectivePoint::IDENTITY {
        return Err(Error::DegenerateCommitment);
    }
    Ok(commitment)
}

/// The BIP-340 challenge `c = H_tag(x_only(R) ‖ x_only(Y) ‖ m) mod Q` with
/// tag `"BIP0340/challenge"`.
pub fn challenge(
    group_commitment: &ProjectivePoint,
    public_key: &ProjectivePoint,
    message: &[u8],
) -> Result<Scalar, Error> {
    let digest = tagged_hash(CHALLENGE_TAG)
        .chain_update(point::serialize_x_only(group_commitment)?)
        .chain_update(point::serialize_x_only(public_key)?)
        .chain_update(message)
        .finalize();
    Ok(scalar_from_digest(digest.into()))
}

/// Apply a tweak pair to the group key.
///
/// Returns the tweaked key `K` and the parity bit recording whether the
/// BIP-32 intermediate was negated to reach an even y. Signers feed the
/// parity into their share adjustment; the matching aggregate tweak is
/// folded into the signature by [`Aggregator::signature`].
pub fn tweak_key(
    tweaks: &KeyTweaks,
    public_key: &ProjectivePoint,
) -> Result<(ProjectivePoint, u8), Error> {
    let (tweaked_key, _, parity) = derive_tweaks(tweaks, public_key)?;
    Ok((tweaked_key, parity))
}

/// The full tweak derivation: `(K, τ, p)`.
///
/// `K₁ = Y + G·bip32`, negated (recording `p = 1` and negating the bip32
/// component) when its y is odd; `K = K₁ + G·taproot`;
/// `τ = bip32' + taproot`, negated when `K`'s y is odd.
pub(crate) fn derive_tweaks(
    tweaks: &KeyTweaks,
    public_key: &ProjectivePoint,
) -> Result<(ProjectivePoint, Scalar, u8), Error> {
    let mut bip32 = tweaks.bip32;
    let mut intermediate = *public_key + ProjectivePoint::GENERATOR * bip32;

    let parity = match point::has_even_y(&intermediate) {
        Ok(true) => 0,
        Ok(false) => {
            intermediate = -intermediate;
            bip32 = -bip32;
            1
        }
        Err(_) => return Err(Error::InvalidKey),
    };

    let tweaked_key = intermediate + ProjectivePoint::GENERATOR * tweaks.taproot;
    let mut tweak = bip32 + tweaks.taproot;
    match point::has_even_y(&tweaked_key) {
        Ok(true) => {}
        Ok(false) => tweak = -tweak,
        Err(_) => return Err(Error::InvalidKey),
    }

    Ok((tweaked_key, tweak, parity))
}

/// Check one participant's partial signature before aggregation, so a
/// misbehaving signer can be pointed at instead of discovering a bad final
/// signature.
///
/// Verifies `G·z_i == (D_i + ρ_i·E_i)' + F_i'·(c·λ_i)`, where the primes
/// apply the same negations the signer applies: the commitment flips with
/// an odd-y `R`, and the public verification share `F_i` flips when the
/// effective key parity disagrees with the tweak parity. Malformed inputs
/// verify as `false`.
#[allow(clippy::too_many_arguments)]
pub fn verify_signature_share(
    index: u8,
    signature_share: &Scalar,
    verification_share: &ProjectivePoint,
    public_key: &ProjectivePoint,
    message: &[u8],
    nonce_commitment_pairs: &[NonceCommitmentPair],
    participant_indexes: &[u8],
    tweaks: Option<&KeyTweaks>,
) -> bool {
    let commitment =
        match group_commitment(message, nonce_commitment_pairs, participant_indexes) {
            Ok(commitment) => commitment,
            Err(_) => return false,
        };
    let (effective_key, parity) = match tweaks {
        Some(tweaks) => match tweak_key(tweaks, public_key) {
            Ok(tweaked) => tweaked,
            Err(_) => return false,
        },
        None => (*public_key, 0),
    };

    let challenge = match challenge(&commitment, &effective_key, message) {
        Ok(challenge) => challenge,
        Err(_) => return false,
    };
    let rho = match binding_value(index, message, nonce_commitment_pairs, participant_indexes) {
        Ok(rho) => rho,
        Err(_) => return false,
    };
    let lambda = match lagrange_coefficient(0, index, participant_indexes) {
        Ok(lambda) => lambda,
        Err(_) => return false,
    };

    let pair = &nonce_commitment_pairs[usize::from(index) - 1];
    let mut nonce_commitment = pair.hiding + pair.binding * rho;
    match point::has_even_y(&commitment) {
        Ok(true) => {}
        Ok(false) => nonce_commitment = -nonce_commitment,
        Err(_) => return false,
    }

    let key_parity = match point::has_even_y(&effective_key) {
        Ok(even) => u8::from(!even),
        Err(_) => return false,
    };
    let mut share_point = *verification_share;
    if key_parity != parity {
        share_point = -share_point;
    }

    ProjectivePoint::GENERATOR * *signature_share
        == nonce_commitment + share_point * (challenge * lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::elliptic_curve::ff::Field;
    use rand::thread_rng;

    use crate::NoncePair;

    fn session(
        signers: &[u8],
        participants: u8,
    ) -> (Vec<NoncePair>, Vec<NonceCommitmentPair>) {
        let mut rng = thread_rng();
        let nonces: Vec<NoncePair> = (0..participants)
            .map(|_| NoncePair::generate(&mut rng))
            .collect();
        let pairs: Vec<NonceCommitmentPair> = nonces
            .iter()
            .enumerate()
            .map(|(position, nonce)| {
                if signers.contains(&((position + 1) as u8)) {
                    nonce.commitments()
                } else {
                    NonceCommitmentPair::default()
                }
            })
            .collect();
        (nonces, pairs)
    }

    #[test]
    fn binding_value_is_index_bound() {
        let (_, pairs) = session(&[1, 2], 3);
        let message = b"fnord!";

        let rho_1 = binding_value(1, message, &pairs, &[1, 2]).unwrap();
        let rho_2 = binding_value(2, message, &pairs, &[1, 2]).unwrap();
        assert_ne!(rho_1, rho_2);

        assert_eq!(
            binding_value(0, message, &pairs, &[1, 2]).unwrap_err(),
            Error::IndexOutOfRange { index: 0 }
        );
        assert_eq!(
            binding_value(4, message, &pairs, &[1, 2]).unwrap_err(),
            Error::IndexOutOfRange { index: 4 }
        );
    }

    #[test]
    fn binding_value_is_commitment_bound() {
        let message = b"fnord!";
        let (_, pairs) = session(&[1, 2], 3);
        let (_, other_pairs) = session(&[1, 2], 3);

        let rho = binding_value(1, message, &pairs, &[1, 2]).unwrap();
        let other_rho = binding_value(1, message, &other_pairs, &[1, 2]).unwrap();
        assert_ne!(rho, other_rho);
    }

    #[test]
    fn duplicate_or_stray_signers_are_rejected() {
        let (_, pairs) = session(&[1, 2], 3);
        let public_key = ProjectivePoint::GENERATOR;

        assert_eq!(
            Aggregator::new(public_key, b"m", &pairs, &[1, 1], None).unwrap_err(),
            Error::DuplicateIndex(1)
        );
        assert_eq!(
            Aggregator::new(public_key, b"m", &pairs, &[1, 4], None).unwrap_err(),
            Error::IndexOutOfRange { index: 4 }
        );
    }

    #[test]
    fn tweak_algebra_matches_the_signer_view() {
        let mut rng = thread_rng();
        let secret = Scalar::random(&mut rng);
        let public_key = ProjectivePoint::GENERATOR * secret;
        let tweaks = KeyTweaks {
            bip32: Scalar::random(&mut rng),
            taproot: Scalar::random(&mut rng),
        };

        let (tweaked_key, tweak, parity) = derive_tweaks(&tweaks, &public_key).unwrap();

        // The even-y representative of K must be G·(±x + τ), with the secret
        // negated exactly when the key parity disagrees with the recorded
        // parity bit. This is the identity the signing path relies on.
        let key_parity = u8::from(!point::has_even_y(&tweaked_key).unwrap());
        let effective_secret = if key_parity != parity { -secret } else { secret };
        let even_key = if key_parity == 1 { -tweaked_key } else { tweaked_key };
        assert_eq!(
            ProjectivePoint::GENERATOR * (effective_secret + tweak),
            even_key
        );
    }
}
