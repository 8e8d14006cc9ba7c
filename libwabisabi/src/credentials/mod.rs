//! Credential issuance and presentation: the wire messages, the
//! coordinator-side issuer, the client, and the client's credential pool.

pub mod client;
pub mod credential;
pub mod issuance;
pub mod issuer;
pub mod pool;
pub mod requests;

/// Transcript label shared by client and issuer for one credential
/// exchange. Both sides must fold statements in the same order under the
/// same label or every proof verification fails.
pub(crate) const TRANSCRIPT_LABEL: &[u8] = b"wabisabi-credentials";
