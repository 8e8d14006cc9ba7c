use crate::credentials::requests::{CredentialsRequest, CredentialsResponse};
use crate::credentials::TRANSCRIPT_LABEL;
use crate::crypto::keys::{CredentialIssuerSecretKey, IssuerParameters};
use crate::crypto::mac::Mac;
use crate::crypto::proof_system::{
    balance_proof_statement, issuer_parameters_knowledge, range_proof_statement,
    show_credential_statement, zero_proof_statement,
};
use crate::crypto::statement::{prove, verify, Knowledge, Statement};
use crate::crypto::transcript::Transcript;
use crate::crypto::{CompressedRistretto, Scalar};
use crate::error::WabiSabiCryptoError;
use crate::{range_proof_width, CREDENTIAL_NUMBER};
use log::{debug, warn};
use rand_core::{CryptoRng, RngCore};
use std::collections::HashSet;

/// Coordinator-side credential issuer for one credential type of one
/// round. Holds the round's MAC key, the serial numbers seen so far, and
/// the running balance of issued minus presented value.
///
/// Calls to [`CredentialIssuer::handle_request`] must be serialized per
/// instance; concurrent rounds use independent instances.
pub struct CredentialIssuer {
    secret_key: CredentialIssuerSecretKey,
    issuer_parameters: IssuerParameters,
    max_value: u64,
    serial_numbers: HashSet<CompressedRistretto>,
    balance: i64,
}

impl CredentialIssuer {
    pub fn new(secret_key: CredentialIssuerSecretKey, max_value: u64) -> Self {
        let issuer_parameters = secret_key.issuer_parameters();
        CredentialIssuer {
            secret_key,
            issuer_parameters,
            max_value,
            serial_numbers: HashSet::new(),
            balance: 0,
        }
    }

    pub fn issuer_parameters(&self) -> IssuerParameters {
        self.issuer_parameters
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Validates a request and, on success, issues one MAC per requested
    /// commitment. Every failure leaves the issuer untouched; serial
    /// numbers and balance only change after all proofs check out.
    pub fn handle_request<R: RngCore + CryptoRng>(
        &mut self,
        request: &CredentialsRequest,
        rng: &mut R,
    ) -> Result<CredentialsResponse, WabiSabiCryptoError> {
        let is_null = request.is_null_request();

        if request.requested.len() != CREDENTIAL_NUMBER {
            return Err(WabiSabiCryptoError::InvalidNumberOfRequestedCredentials {
                expected: CREDENTIAL_NUMBER,
                got: request.requested.len(),
            });
        }
        let expected_presented = if is_null { 0 } else { CREDENTIAL_NUMBER };
        if request.presented.len() != expected_presented {
            return Err(WabiSabiCryptoError::InvalidNumberOfPresentedCredentials {
                expected: expected_presented,
                got: request.presented.len(),
            });
        }

        let delta = if is_null { 0 } else { request.delta };
        if self.balance + delta < 0 {
            return Err(WabiSabiCryptoError::NegativeBalance);
        }

        let width = if is_null { 0 } else { range_proof_width(self.max_value) };
        if request.requested.iter().any(|r| r.bit_commitments.len() != width) {
            return Err(WabiSabiCryptoError::InvalidBitCommitment);
        }

        let serial_numbers: Vec<CompressedRistretto> =
            request.presented.iter().map(|p| p.serial_number()).collect();
        for (i, serial_number) in serial_numbers.iter().enumerate() {
            if serial_numbers[..i].contains(serial_number) {
                return Err(WabiSabiCryptoError::SerialNumberDuplicated);
            }
            if self.serial_numbers.contains(serial_number) {
                warn!(
                    "serial number {} was already presented this round",
                    hex::encode(serial_number.as_bytes())
                );
                return Err(WabiSabiCryptoError::SerialNumberAlreadyUsed);
            }
        }

        let mut statements: Vec<Statement> =
            Vec::with_capacity(request.presented.len() + request.requested.len() + 1);
        for presentation in &request.presented {
            let z_point = presentation.compute_z(&self.secret_key);
            statements.push(show_credential_statement(
                presentation,
                z_point,
                &self.issuer_parameters,
            ));
        }
        for requested in &request.requested {
            statements.push(if is_null {
                zero_proof_statement(requested.ma)
            } else {
                range_proof_statement(requested)
            });
        }
        if !is_null {
            statements.push(balance_proof_statement(
                request.delta,
                &request.presented,
                &request.requested,
            ));
        }

        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        transcript.bind_request(CREDENTIAL_NUMBER, is_null);
        if !verify(&mut transcript, &statements, &request.proofs) {
            return Err(WabiSabiCryptoError::CoordinatorReceivedInvalidProofs);
        }

        // The response proofs continue the transcript the request was just
        // verified against, binding response to request.
        let issued: Vec<Mac> = request
            .requested
            .iter()
            .map(|r| Mac::compute_mac(&self.secret_key, &r.ma, Scalar::random(rng)))
            .collect();
        let knowledge: Vec<Knowledge> = issued
            .iter()
            .zip(&request.requested)
            .map(|(mac, r)| issuer_parameters_knowledge(&self.secret_key, mac, r.ma))
            .collect();
        let proofs = prove(&mut transcript, &knowledge, rng);

        self.serial_numbers.extend(serial_numbers);
        self.balance += delta;
        debug!(
            "issued {} credentials (null: {}), balance now {}",
            issued.len(),
            is_null,
            self.balance
        );

        Ok(CredentialsResponse { issued, proofs })
    }
}
