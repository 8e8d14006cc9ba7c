use crate::credentials::credential::Credential;
use crate::credentials::issuance::IssuanceValidationData;
use crate::credentials::pool::CredentialPool;
use crate::credentials::requests::{CredentialsRequest, CredentialsResponse};
use crate::credentials::TRANSCRIPT_LABEL;
use crate::crypto::keys::IssuerParameters;
use crate::crypto::proof_system::{
    balance_proof_knowledge, issuer_parameters_statement, range_proof_knowledge,
    show_credential_knowledge, zero_proof_knowledge,
};
use crate::crypto::statement::{prove, verify, Knowledge, Statement};
use crate::crypto::transcript::Transcript;
use crate::crypto::Scalar;
use crate::error::WabiSabiCryptoError;
use crate::{range_proof_width, CREDENTIAL_NUMBER};
use log::debug;
use rand_core::{CryptoRng, RngCore};

/// Client-side handler for one credential type of one round. Owns the
/// pools of zero-value and real credentials the planner draws from.
pub struct WabiSabiClient {
    issuer_parameters: IssuerParameters,
    max_value: u64,
    zero_credentials: CredentialPool,
    real_credentials: CredentialPool,
}

/// What the client must remember between sending a request and receiving
/// the issuer's response: the transcript state after proving the request,
/// the credentials it gave up, and the openings of what it asked for.
pub struct CredentialsResponseValidation {
    transcript: Transcript,
    presented: Vec<Credential>,
    requested: Vec<IssuanceValidationData>,
}

impl WabiSabiClient {
    pub fn new(issuer_parameters: IssuerParameters, max_value: u64) -> Self {
        WabiSabiClient {
            issuer_parameters,
            max_value,
            zero_credentials: CredentialPool::new(),
            real_credentials: CredentialPool::new(),
        }
    }

    pub fn zero_credentials(&self) -> &CredentialPool {
        &self.zero_credentials
    }

    pub fn real_credentials(&self) -> &CredentialPool {
        &self.real_credentials
    }

    /// The bootstrap request: asks for the full complement of zero-value
    /// credentials while presenting nothing.
    pub fn create_request_for_zero_amount<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> (CredentialsRequest, CredentialsResponseValidation) {
        let mut requested = Vec::with_capacity(CREDENTIAL_NUMBER);
        let mut validation = Vec::with_capacity(CREDENTIAL_NUMBER);
        let mut knowledge = Vec::with_capacity(CREDENTIAL_NUMBER);
        for _ in 0..CREDENTIAL_NUMBER {
            let (request, data, k) = zero_proof_knowledge(rng);
            requested.push(request);
            validation.push(data);
            knowledge.push(k);
        }

        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        transcript.bind_request(CREDENTIAL_NUMBER, true);
        let proofs = prove(&mut transcript, &knowledge, rng);

        (
            CredentialsRequest { delta: 0, presented: Vec::new(), requested, proofs },
            CredentialsResponseValidation {
                transcript,
                presented: Vec::new(),
                requested: validation,
            },
        )
    }

    /// Builds a registration request presenting `credentials_to_present`
    /// and asking for `amounts`. Both are padded to the protocol's fixed
    /// count, amounts with zeros and presentations with zero-value
    /// credentials drawn from the pool. A rejected request leaves the
    /// pool exactly as it found it.
    pub fn create_request<R: RngCore + CryptoRng>(
        &self,
        amounts: &[u64],
        credentials_to_present: Vec<Credential>,
        rng: &mut R,
    ) -> Result<(CredentialsRequest, CredentialsResponseValidation), WabiSabiCryptoError> {
        if amounts.len() > CREDENTIAL_NUMBER {
            return Err(WabiSabiCryptoError::InvalidNumberOfRequestedCredentials {
                expected: CREDENTIAL_NUMBER,
                got: amounts.len(),
            });
        }
        if credentials_to_present.len() > CREDENTIAL_NUMBER {
            return Err(WabiSabiCryptoError::InvalidNumberOfPresentedCredentials {
                expected: CREDENTIAL_NUMBER,
                got: credentials_to_present.len(),
            });
        }

        let mut amounts: Vec<u64> = amounts.to_vec();
        amounts.resize(CREDENTIAL_NUMBER, 0);

        // Padding is drawn tentatively; every rejection below hands the
        // drawn credentials back to the pool.
        let mut drawn: Vec<Credential> = Vec::new();
        while credentials_to_present.len() + drawn.len() < CREDENTIAL_NUMBER {
            match self.zero_credentials.try_take() {
                Some(credential) => drawn.push(credential),
                None => {
                    for credential in drawn {
                        self.zero_credentials.send(credential);
                    }
                    return Err(WabiSabiCryptoError::NotEnoughZeroCredentialToFillTheRequest);
                }
            }
        }

        let all: Vec<&Credential> = credentials_to_present.iter().chain(&drawn).collect();
        if (1..all.len()).any(|i| all[..i].iter().any(|other| other.mac == all[i].mac)) {
            for credential in drawn {
                self.zero_credentials.send(credential);
            }
            return Err(WabiSabiCryptoError::CredentialToPresentDuplicated);
        }

        let mut presented = credentials_to_present;
        presented.extend(drawn);

        let mut knowledge: Vec<Knowledge> = Vec::with_capacity(2 * CREDENTIAL_NUMBER + 1);
        let mut presentations = Vec::with_capacity(CREDENTIAL_NUMBER);
        let mut z_sum = Scalar::ZERO;
        for credential in &presented {
            let z = Scalar::random(rng);
            let presentation = credential.present(z);
            knowledge.push(show_credential_knowledge(
                credential,
                z,
                &presentation,
                &self.issuer_parameters,
            ));
            presentations.push(presentation);
            z_sum += z;
        }

        let width = range_proof_width(self.max_value);
        let mut requested = Vec::with_capacity(CREDENTIAL_NUMBER);
        let mut validation = Vec::with_capacity(CREDENTIAL_NUMBER);
        let mut range_knowledge = Vec::with_capacity(CREDENTIAL_NUMBER);
        for &amount in &amounts {
            let (request, data, k) = range_proof_knowledge(amount, width, rng);
            requested.push(request);
            validation.push(data);
            range_knowledge.push(k);
        }
        knowledge.extend(range_knowledge);

        let delta = amounts.iter().sum::<u64>() as i64
            - presented.iter().map(|c| c.value).sum::<u64>() as i64;
        let randomness_delta = presented.iter().map(|c| c.randomness).sum::<Scalar>()
            - validation.iter().map(|v| v.randomness).sum::<Scalar>();
        knowledge.push(balance_proof_knowledge(
            delta,
            &presentations,
            &requested,
            z_sum,
            randomness_delta,
        ));

        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        transcript.bind_request(CREDENTIAL_NUMBER, false);
        let proofs = prove(&mut transcript, &knowledge, rng);

        Ok((
            CredentialsRequest { delta, presented: presentations, requested, proofs },
            CredentialsResponseValidation { transcript, presented, requested: validation },
        ))
    }

    /// Checks the issuer's response against the retained validation data,
    /// reconstructs the issued credentials, and refills the pools.
    pub fn handle_response(
        &self,
        response: &CredentialsResponse,
        validation: CredentialsResponseValidation,
    ) -> Result<Vec<Credential>, WabiSabiCryptoError> {
        if response.issued.len() != CREDENTIAL_NUMBER {
            return Err(WabiSabiCryptoError::IssuedCredentialNumberMismatch);
        }

        let statements: Vec<Statement> = response
            .issued
            .iter()
            .zip(&validation.requested)
            .map(|(mac, data)| issuer_parameters_statement(&self.issuer_parameters, mac, data.ma))
            .collect();
        let mut transcript = validation.transcript;
        if !verify(&mut transcript, &statements, &response.proofs) {
            return Err(WabiSabiCryptoError::ClientReceivedInvalidProofs);
        }

        debug!(
            "response verified, {} presented credentials consumed",
            validation.presented.len()
        );

        let credentials: Vec<Credential> = response
            .issued
            .iter()
            .zip(&validation.requested)
            .map(|(mac, data)| Credential {
                value: data.value,
                randomness: data.randomness,
                mac: *mac,
            })
            .collect();
        for credential in &credentials {
            if credential.value == 0 {
                self.zero_credentials.send(credential.clone());
            } else {
                self.real_credentials.send(credential.clone());
            }
        }
        Ok(credentials)
    }
}
