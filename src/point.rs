// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Point serialization for secp256k1.
//!
//! Group arithmetic itself comes from [`k256`]; this module owns the byte
//! surfaces the protocol exchanges: 33-byte SEC1 compressed points for
//! commitments, and 32-byte x-only points for BIP-340 keys and nonces.

use k256::elliptic_curve::group::{Group, GroupEncoding};
use k256::elliptic_curve::point::{AffineCoordinates, DecompressPoint};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::subtle::Choice;
use k256::{AffinePoint, CompressedPoint, ProjectivePoint};

use crate::Error;

/// Serialize a point in SEC1 compressed form: `0x02`/`0x03` by y parity,
/// followed by the x coordinate as 32 big-endian bytes.
///
/// The identity has no affine coordinates and is rejected with
/// [`Error::InvalidEncoding`].
pub fn serialize(point: &ProjectivePoint) -> Result<[u8; 33], Error> {
    if bool::from(point.is_identity()) {
        return Err(Error::InvalidEncoding);
    }

    let mut bytes = [0u8; 33];
    bytes.copy_from_slice(&point.to_bytes());
    Ok(bytes)
}

/// Deserialize a SEC1 compressed point.
///
/// Fails with [`Error::InvalidEncoding`] unless the input is exactly 33
/// bytes, carries a valid parity prefix, names an x coordinate on the curve,
/// and is not the identity encoding.
pub fn deserialize(bytes: &[u8]) -> Result<ProjectivePoint, Error> {
    if bytes.len() != 33 {
        return Err(Error::InvalidEncoding);
    }

    let point = Option::<ProjectivePoint>::from(ProjectivePoint::from_bytes(
        CompressedPoint::from_slice(bytes),
    ))
    .ok_or(Error::InvalidEncoding)?;

    if bool::from(point.is_identity()) {
        return Err(Error::InvalidEncoding);
    }
    Ok(point)
}

/// Serialize a point in BIP-340 x-only form: the x coordinate as 32
/// big-endian bytes. The y parity is discarded.
pub fn serialize_x_only(point: &ProjectivePoint) -> Result<[u8; 32], Error> {
    if bool::from(point.is_identity()) {
        return Err(Error::InvalidEncoding);
    }
    Ok(point.to_affine().x().into())
}

/// Deserialize an x-only point, reconstructing the even-y representative.
///
/// Fails with [`Error::InvalidEncoding`] unless the input is exactly 32
/// bytes and names an x coordinate whose cube-plus-seven is a quadratic
/// residue.
pub fn deserialize_x_only(bytes: &[u8]) -> Result<ProjectivePoint, Error> {
    let bytes: [u8; 32] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;

    let affine =
        Option::<AffinePoint>::from(AffinePoint::decompress(&bytes.into(), Choice::from(0)))
            .ok_or(Error::InvalidEncoding)?;

    Ok(ProjectivePoint::from(affine))
}

/// Whether the affine y coordinate of `point` is even.
///
/// The identity has no y coordinate and fails with [`Error::InvalidKey`].
pub fn has_even_y(point: &ProjectivePoint) -> Result<bool, Error> {
    if bool::from(point.is_identity()) {
        return Err(Error::InvalidKey);
    }
    Ok(!bool::from(point.to_affine().y_is_odd()))
}

/// The representative of `{P, -P}` with the numerically smaller y
/// coordinate. The identity maps to itself.
///
/// Not used on the signing path; provided so tests can compare points that
/// agree up to sign.
pub fn normalize(point: &ProjectivePoint) -> ProjectivePoint {
    if bool::from(point.is_identity()) {
        return *point;
    }

    let negated = -*point;
    let encoded = point.to_affine().to_encoded_point(false);
    let negated_encoded = negated.to_affine().to_encoded_point(false);
    match (encoded.y(), negated_encoded.y()) {
        (Some(y), Some(negated_y)) if negated_y.as_slice() < y.as_slice() => negated,
        _ => *point,
    }
}
