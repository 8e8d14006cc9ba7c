//! Anonymous credential core for the WabiSabi CoinJoin protocol.
//!
//! Two subsystems live here: the credential issuance/verification engine
//! (issuer and client halves, built on Pedersen commitments, an algebraic
//! MAC and sigma-protocol proofs over ristretto255), and the pure
//! [`dependency_graph::DependencyGraph`] planner that turns a participant's
//! input/output value vectors into a bounded-degree DAG of credential
//! requests whose declared amounts always balance.
//!
//! The round state machine, transport encoding, and wallet layers that sit
//! around this core are deliberately absent; everything in this crate is
//! scoped to a single CoinJoin round and dropped at round end.

pub mod credentials;
pub mod crypto;
pub mod dependency_graph;
pub mod error;

#[cfg(test)]
mod tests;

/// Number of credentials presented and requested in every registration
/// message (`K` in the protocol description).
pub const CREDENTIAL_NUMBER: usize = 2;

/// Upper bound (exclusive) on an amount credential's value, in satoshis.
pub const MAX_AMOUNT_CREDENTIAL_VALUE: u64 = 4_300_000_000_000;

/// Upper bound (exclusive) on a vsize credential's value, in virtual bytes.
pub const MAX_VSIZE_CREDENTIAL_VALUE: u64 = 255;

/// Width of the binary decomposition used by range proofs for values in
/// `[0, max_value)`.
pub fn range_proof_width(max_value: u64) -> usize {
    debug_assert!(max_value >= 2);
    max_value.next_power_of_two().trailing_zeros() as usize
}
