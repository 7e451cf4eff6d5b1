use k256::elliptic_curve::ops::Reduce;
use k256::{Scalar, U256};
use sha2::{Digest, Sha256};

/// Tag for the BIP-340 challenge hash.
pub(crate) const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// Domain separator for the keygen proof-of-knowledge challenge.
pub(crate) const PROOF_CONTEXT: &[u8] = b"FROST-BIP340";

/// A SHA-256 state pre-seeded with `SHA256(tag) ‖ SHA256(tag)`, the BIP-340
/// tagged-hash construction.
pub(crate) fn tagged_hash(tag: &[u8]) -> Sha256 {
    let tag_hash = Sha256::digest(tag);
    Sha256::new().chain_update(tag_hash).chain_update(tag_hash)
}

/// Interpret a 32-byte digest as a big-endian integer and reduce it into the
/// scalar field.
///
/// The scalar multiplies group elements of order Q, so reducing here is
/// indistinguishable from carrying the digest around unreduced.
pub(crate) fn scalar_from_digest(digest: [u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(&digest.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_hash_is_domain_separated() {
        let a: [u8; 32] = tagged_hash(CHALLENGE_TAG).chain_update(b"data").finalize().into();
        let b: [u8; 32] = tagged_hash(b"BIP0340/aux").chain_update(b"data").finalize().into();
        assert_ne!(a, b);

        let c: [u8; 32] = tagged_hash(CHALLENGE_TAG).chain_update(b"data").finalize().into();
        assert_eq!(a, c);
    }

    #[test]
    fn digest_reduction_is_stable() {
        let digest: [u8; 32] = Sha256::digest(b"fnord!").into();
        assert_eq!(scalar_from_digest(digest), scalar_from_digest(digest));
    }
}
