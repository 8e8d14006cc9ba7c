//! Cryptographic toolkit: group aliases, the fixed generator set, issuer
//! keys, the algebraic MAC, and the sigma-protocol proof engine shared by
//! the issuer and the client.

pub mod generators;
pub mod keys;
pub mod mac;
pub mod proof_system;
pub mod statement;
pub mod transcript;

pub use curve25519_dalek::ristretto::CompressedRistretto;
pub use curve25519_dalek::scalar::Scalar;

/// The prime-order group all commitments, MACs and proofs live in.
pub type GroupElement = curve25519_dalek::ristretto::RistrettoPoint;

use blake2::{Blake2b512, Digest};

/// Maps arbitrary bytes onto the group, with a domain separation label.
/// Used for the generator set and for deriving the per-MAC point `U`.
pub fn hash_to_group(label: &[u8], data: &[u8]) -> GroupElement {
    let mut hasher = Blake2b512::new();
    hasher.update((label.len() as u64).to_le_bytes());
    hasher.update(label);
    hasher.update((data.len() as u64).to_le_bytes());
    hasher.update(data);
    let mut digest = [0u8; 64];
    digest.copy_from_slice(&hasher.finalize());
    GroupElement::from_uniform_bytes(&digest)
}
