// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! BIP-340 signature wire type.

/// A 64-byte BIP-340 Schnorr signature: the x-only group commitment `R`
/// followed by the response scalar `z`, both big-endian.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub(crate) r_bytes: [u8; 32],
    pub(crate) z_bytes: [u8; 32],
}

impl Signature {
    /// The x-only encoding of the group commitment `R`.
    pub fn r_bytes(&self) -> [u8; 32] {
        self.r_bytes
    }

    /// The response scalar `z` as 32 big-endian bytes.
    pub fn z_bytes(&self) -> [u8; 32] {
        self.z_bytes
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Signature {
        let mut r_bytes = [0; 32];
        r_bytes.copy_from_slice(&bytes[..32]);
        let mut z_bytes = [0; 32];
        z_bytes.copy_from_slice(&bytes[32..]);
        Signature { r_bytes, z_bytes }
    }
}

impl From<Signature> for [u8; 64] {
    fn from(signature: Signature) -> [u8; 64] {
        let mut bytes = [0; 64];
        bytes[..32].copy_from_slice(&signature.r_bytes);
        bytes[32..].copy_from_slice(&signature.z_bytes);
        bytes
    }
}
