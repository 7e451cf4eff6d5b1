// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

use thiserror::Error;

/// An error arising from the threshold signing protocol.
///
/// Cryptographic *checks* (proof-of-knowledge, share and repair-share
/// verification) never produce an `Error`; they return `bool` so that an
/// expected negative outcome is not conflated with a structural failure.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The threshold parameters are unusable (zero, or threshold above the
    /// participant count).
    #[error("invalid threshold parameters (threshold {threshold}, participants {participants})")]
    InvalidParameters {
        /// The threshold that was requested.
        threshold: u8,
        /// The participant count that was requested.
        participants: u8,
    },
    /// A participant index was zero or beyond the participant count.
    #[error("participant index {index} is out of range")]
    IndexOutOfRange {
        /// The offending index.
        index: u8,
    },
    /// The same participant index appeared twice in a set that requires
    /// distinct members.
    #[error("duplicated participant index ({0})")]
    DuplicateIndex(u8),
    /// A share list had the wrong number of entries.
    #[error("wrong number of shares (expected {expected}, got {got})")]
    WrongShareCount {
        /// How many shares the operation requires.
        expected: usize,
        /// How many shares were supplied.
        got: usize,
    },
    /// A commitment list had the wrong number of entries.
    #[error("wrong number of commitments (expected {expected}, got {got})")]
    WrongCommitmentCount {
        /// How many commitments the operation requires.
        expected: usize,
        /// How many commitments were supplied.
        got: usize,
    },
    /// A round of one kind was fed to the completion step of another (for
    /// example a refresh round passed to
    /// [`Participant::from_dkg`](crate::Participant::from_dkg)).
    #[error("round state does not match the requested operation")]
    MismatchedRound,
    /// A refresh dealer committed to a nonzero constant term, which would
    /// move the group public key.
    #[error("a refresh round must commit to a zero constant term")]
    InvalidRefresh,
    /// The repair committee is not a valid helper set for the lost share.
    #[error("repair committee is not a valid helper set")]
    InvalidCommittee,
    /// An aggregated share does not lie on the polynomial fixed by the group
    /// commitments. Fatal: the round must be re-run.
    #[error("aggregate share is inconsistent with the group commitments")]
    InconsistentShare,
    /// A point encoding was malformed (wrong length, bad prefix, not on the
    /// curve, or the unserializable identity).
    #[error("malformed point encoding")]
    InvalidEncoding,
    /// The session's group commitment degenerated to the identity. Fatal for
    /// the session; restart with fresh nonces.
    #[error("group commitment is the identity; restart the session with fresh nonces")]
    DegenerateCommitment,
    /// A tweaked key had no affine representation.
    #[error("tweaked key has no valid x-only representation")]
    InvalidKey,
    /// A zero denominator was inverted, which indicates duplicate indexes or
    /// a caller bug.
    #[error("no modular inverse exists for a zero denominator")]
    NoInverse,
    /// A matrix with determinant zero was inverted.
    #[error("matrix is singular")]
    SingularMatrix,
    /// Matrix dimensions do not admit the requested operation.
    #[error("matrix dimensions are invalid for this operation")]
    InvalidDimensions,
}
