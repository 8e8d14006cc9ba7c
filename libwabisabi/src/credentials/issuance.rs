use crate::crypto::{GroupElement, Scalar};
use serde::{Deserialize, Serialize};

/// One requested credential: the Pedersen commitment to the amount and,
/// for non-null requests, the bit commitments of its binary decomposition
/// backing the range proof. Null requests carry no bit commitments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRequest {
    pub ma: GroupElement,
    pub bit_commitments: Vec<GroupElement>,
}

/// The opening of an [`IssuanceRequest`] the client keeps to itself. It is
/// needed to check the issuer's response and to reconstruct the credential
/// once the MAC arrives.
#[derive(Debug, Clone)]
pub struct IssuanceValidationData {
    pub value: u64,
    pub randomness: Scalar,
    pub ma: GroupElement,
}
