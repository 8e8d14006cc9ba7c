use crate::credentials::credential::CredentialPresentation;
use crate::credentials::issuance::IssuanceRequest;
use crate::crypto::mac::Mac;
use crate::crypto::statement::Proof;
use serde::{Deserialize, Serialize};

/// One registration message from client to issuer. Proof order is fixed:
/// one show-credential proof per presentation, one range-or-zero proof per
/// requested commitment, then (for non-null requests) the balance proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub delta: i64,
    pub presented: Vec<CredentialPresentation>,
    pub requested: Vec<IssuanceRequest>,
    pub proofs: Vec<Proof>,
}

impl CredentialsRequest {
    /// The bootstrap request for zero-value credentials presents nothing
    /// and its `delta` carries no meaning.
    pub fn is_null_request(&self) -> bool {
        self.presented.is_empty()
    }
}

/// The issuer's answer: one MAC per requested commitment, each with a
/// proof that it was computed under the published issuer parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsResponse {
    pub issued: Vec<Mac>,
    pub proofs: Vec<Proof>,
}
