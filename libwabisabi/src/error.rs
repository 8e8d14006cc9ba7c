use thiserror::Error;

/// Every way a credential request or response can be rejected.
///
/// All variants are fatal to the request that produced them; the caller
/// (the round orchestration layer) decides what to do with the
/// participant. Neither the issuer nor the client retries internally, and
/// a rejected request never changes issuer state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WabiSabiCryptoError {
    #[error("invalid number of requested credentials: expected {expected}, got {got}")]
    InvalidNumberOfRequestedCredentials { expected: usize, got: usize },

    #[error("invalid number of presented credentials: expected {expected}, got {got}")]
    InvalidNumberOfPresentedCredentials { expected: usize, got: usize },

    #[error("requested commitment carries the wrong number of bit commitments")]
    InvalidBitCommitment,

    #[error("a serial number appears more than once in the same request")]
    SerialNumberDuplicated,

    #[error("a presented serial number was already registered this round")]
    SerialNumberAlreadyUsed,

    #[error("the same credential was supplied twice for presentation")]
    CredentialToPresentDuplicated,

    #[error("the coordinator received invalid proofs")]
    CoordinatorReceivedInvalidProofs,

    #[error("the client received invalid proofs")]
    ClientReceivedInvalidProofs,

    #[error("issuing the requested credentials would make the round balance negative")]
    NegativeBalance,

    #[error("the response does not contain one credential per request")]
    IssuedCredentialNumberMismatch,

    #[error("not enough zero credentials available to fill the request")]
    NotEnoughZeroCredentialToFillTheRequest,
}
