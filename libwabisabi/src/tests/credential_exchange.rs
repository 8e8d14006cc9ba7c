use crate::credentials::client::WabiSabiClient;
use crate::credentials::credential::Credential;
use crate::credentials::issuer::CredentialIssuer;
use crate::crypto::keys::CredentialIssuerSecretKey;
use crate::crypto::Scalar;
use crate::error::WabiSabiCryptoError;
use crate::{CREDENTIAL_NUMBER, MAX_AMOUNT_CREDENTIAL_VALUE};
use rand_core::OsRng;

fn setup() -> (CredentialIssuer, WabiSabiClient) {
    let _ = env_logger::builder().is_test(true).try_init();
    let sk = CredentialIssuerSecretKey::random(&mut OsRng);
    let issuer = CredentialIssuer::new(sk, MAX_AMOUNT_CREDENTIAL_VALUE);
    let client = WabiSabiClient::new(issuer.issuer_parameters(), MAX_AMOUNT_CREDENTIAL_VALUE);
    (issuer, client)
}

/// Bootstraps the client's zero-credential supply through one null
/// request, returning the issued zero credentials.
fn bootstrap(issuer: &mut CredentialIssuer, client: &WabiSabiClient) -> Vec<Credential> {
    let mut rng = OsRng;
    let (request, validation) = client.create_request_for_zero_amount(&mut rng);
    assert!(request.is_null_request());
    let response = issuer.handle_request(&request, &mut rng).expect("null request accepted");
    client.handle_response(&response, validation).expect("response valid")
}

#[test]
fn zero_credentials_round_trip() {
    let (mut issuer, client) = setup();
    let credentials = bootstrap(&mut issuer, &client);
    assert_eq!(credentials.len(), CREDENTIAL_NUMBER);
    assert!(credentials.iter().all(|c| c.value == 0));
    assert_eq!(issuer.balance(), 0);
    assert_eq!(client.zero_credentials().len(), CREDENTIAL_NUMBER);

    // each zero credential is independently presentable
    let mut rng = OsRng;
    let (request, _) = client.create_request(&[1], vec![], &mut rng).expect("request built");
    let _ = issuer.handle_request(&request, &mut rng).expect("zero credentials presentable");
}

#[test]
fn real_credentials_round_trip_and_delta() {
    let (mut issuer, client) = setup();
    bootstrap(&mut issuer, &client);

    let mut rng = OsRng;
    let (request, validation) =
        client.create_request(&[5, 3], vec![], &mut rng).expect("request built");
    assert!(!request.is_null_request());
    assert_eq!(request.delta, 8);
    let response = issuer.handle_request(&request, &mut rng).expect("request accepted");
    let credentials = client.handle_response(&response, validation).expect("response valid");
    let mut values: Vec<u64> = credentials.iter().map(|c| c.value).collect();
    values.sort_unstable();
    assert_eq!(values, [3, 5]);
    assert_eq!(issuer.balance(), 8);

    // spend them back down; delta mirrors the presented sum
    let (request, validation) =
        client.create_request(&[], credentials, &mut rng).expect("request built");
    assert_eq!(request.delta, -8);
    let response = issuer.handle_request(&request, &mut rng).expect("request accepted");
    let credentials = client.handle_response(&response, validation).expect("response valid");
    assert!(credentials.iter().all(|c| c.value == 0));
    assert_eq!(issuer.balance(), 0);
}

#[test]
fn replayed_serial_number_is_rejected_without_state_change() {
    let (mut issuer, client) = setup();
    bootstrap(&mut issuer, &client);

    let mut rng = OsRng;
    let (request, validation) =
        client.create_request(&[4, 0], vec![], &mut rng).expect("request built");
    let response = issuer.handle_request(&request, &mut rng).expect("request accepted");
    let credentials = client.handle_response(&response, validation).expect("response valid");
    let balance = issuer.balance();

    let (first, _) = client
        .create_request(&[4, 0], credentials.clone(), &mut rng)
        .expect("request built");
    issuer.handle_request(&first, &mut rng).expect("first presentation accepted");
    let balance_after_first = issuer.balance();

    let (replay, _) =
        client.create_request(&[4, 0], credentials, &mut rng).expect("request built");
    assert_eq!(
        issuer.handle_request(&replay, &mut rng),
        Err(WabiSabiCryptoError::SerialNumberAlreadyUsed)
    );
    assert_eq!(issuer.balance(), balance_after_first);
    assert_eq!(balance_after_first, balance);
}

#[test]
fn negative_balance_is_rejected_before_proof_checking() {
    // credentials minted by a different issuer still fail the balance
    // check first, since it runs before any proof verification
    let (mut lender, lender_client) = setup();
    bootstrap(&mut lender, &lender_client);
    let mut rng = OsRng;
    let (request, validation) =
        lender_client.create_request(&[1, 0], vec![], &mut rng).expect("request built");
    let response = lender.handle_request(&request, &mut rng).expect("request accepted");
    let credentials =
        lender_client.handle_response(&response, validation).expect("response valid");

    let (mut issuer, _) = setup();
    let (overdraft, _) = lender_client
        .create_request(&[], credentials, &mut rng)
        .expect("request built");
    assert_eq!(overdraft.delta, -1);
    assert_eq!(
        issuer.handle_request(&overdraft, &mut rng),
        Err(WabiSabiCryptoError::NegativeBalance)
    );
    assert_eq!(issuer.balance(), 0);
}

#[test]
fn tampered_delta_fails_proof_verification() {
    let (mut issuer, client) = setup();
    bootstrap(&mut issuer, &client);
    let mut rng = OsRng;
    let (mut request, _) =
        client.create_request(&[5, 0], vec![], &mut rng).expect("request built");
    request.delta += 1;
    assert_eq!(
        issuer.handle_request(&request, &mut rng),
        Err(WabiSabiCryptoError::CoordinatorReceivedInvalidProofs)
    );
    assert_eq!(issuer.balance(), 0);
}

#[test]
fn malformed_requests_are_rejected_by_shape() {
    let (mut issuer, client) = setup();
    let mut rng = OsRng;

    // every request below pads its presentations from the zero pool
    for _ in 0..4 {
        bootstrap(&mut issuer, &client);
    }

    let (mut request, _) =
        client.create_request(&[5, 0], vec![], &mut rng).expect("request built");
    request.requested.pop();
    assert_eq!(
        issuer.handle_request(&request, &mut rng),
        Err(WabiSabiCryptoError::InvalidNumberOfRequestedCredentials {
            expected: CREDENTIAL_NUMBER,
            got: CREDENTIAL_NUMBER - 1,
        })
    );

    let (mut request, _) =
        client.create_request(&[5, 0], vec![], &mut rng).expect("request built");
    request.presented.pop();
    assert_eq!(
        issuer.handle_request(&request, &mut rng),
        Err(WabiSabiCryptoError::InvalidNumberOfPresentedCredentials {
            expected: CREDENTIAL_NUMBER,
            got: CREDENTIAL_NUMBER - 1,
        })
    );

    let (mut request, _) =
        client.create_request(&[5, 0], vec![], &mut rng).expect("request built");
    request.requested[0].bit_commitments.pop();
    assert_eq!(
        issuer.handle_request(&request, &mut rng),
        Err(WabiSabiCryptoError::InvalidBitCommitment)
    );

    let (mut request, _) =
        client.create_request(&[5, 0], vec![], &mut rng).expect("request built");
    request.presented[1] = request.presented[0];
    assert_eq!(
        issuer.handle_request(&request, &mut rng),
        Err(WabiSabiCryptoError::SerialNumberDuplicated)
    );
}

#[test]
fn duplicated_credentials_to_present_are_rejected_client_side() {
    let (mut issuer, client) = setup();
    bootstrap(&mut issuer, &client);
    let mut rng = OsRng;
    let (request, validation) =
        client.create_request(&[2, 0], vec![], &mut rng).expect("request built");
    let response = issuer.handle_request(&request, &mut rng).expect("request accepted");
    let credentials = client.handle_response(&response, validation).expect("response valid");

    let duplicate = credentials[0].clone();
    assert_eq!(
        client
            .create_request(&[], vec![credentials[0].clone(), duplicate], &mut rng)
            .err(),
        Some(WabiSabiCryptoError::CredentialToPresentDuplicated)
    );
}

#[test]
fn empty_zero_credential_pool_fails_padding() {
    let (_, client) = setup();
    let mut rng = OsRng;
    assert_eq!(
        client.create_request(&[1], vec![], &mut rng).err(),
        Some(WabiSabiCryptoError::NotEnoughZeroCredentialToFillTheRequest)
    );
}

#[test]
fn rejected_request_leaves_the_zero_pool_intact() {
    let (mut issuer, client) = setup();
    let credentials = bootstrap(&mut issuer, &client);
    let mut rng = OsRng;
    assert_eq!(client.zero_credentials().len(), CREDENTIAL_NUMBER);

    // padding draws the pooled twin of the presented credential
    assert_eq!(
        client.create_request(&[1], vec![credentials[0].clone()], &mut rng).err(),
        Some(WabiSabiCryptoError::CredentialToPresentDuplicated)
    );
    assert_eq!(client.zero_credentials().len(), CREDENTIAL_NUMBER);

    let _ = client.zero_credentials().try_take().expect("pool filled");
    assert_eq!(
        client.create_request(&[1], vec![], &mut rng).err(),
        Some(WabiSabiCryptoError::NotEnoughZeroCredentialToFillTheRequest)
    );
    assert_eq!(client.zero_credentials().len(), CREDENTIAL_NUMBER - 1);

    // the returned padding is still spendable
    let (request, _) = client
        .create_request(&[1], vec![credentials[1].clone()], &mut rng)
        .expect("request built");
    let _ = issuer.handle_request(&request, &mut rng).expect("request accepted");
}

#[test]
fn oversized_requests_are_rejected_client_side() {
    let (mut issuer, client) = setup();
    let credentials = bootstrap(&mut issuer, &client);
    let mut rng = OsRng;

    assert_eq!(
        client.create_request(&[1, 1, 1], vec![], &mut rng).err(),
        Some(WabiSabiCryptoError::InvalidNumberOfRequestedCredentials {
            expected: CREDENTIAL_NUMBER,
            got: 3,
        })
    );
    assert_eq!(
        client
            .create_request(
                &[],
                vec![credentials[0].clone(); CREDENTIAL_NUMBER + 1],
                &mut rng,
            )
            .err(),
        Some(WabiSabiCryptoError::InvalidNumberOfPresentedCredentials {
            expected: CREDENTIAL_NUMBER,
            got: CREDENTIAL_NUMBER + 1,
        })
    );
    assert_eq!(client.zero_credentials().len(), CREDENTIAL_NUMBER);
}

#[test]
fn tampered_response_is_rejected_by_the_client() {
    let (mut issuer, client) = setup();
    let mut rng = OsRng;

    let (request, validation) = client.create_request_for_zero_amount(&mut rng);
    let mut response = issuer.handle_request(&request, &mut rng).expect("request accepted");
    response.issued[0].t += Scalar::ONE;
    assert_eq!(
        client.handle_response(&response, validation),
        Err(WabiSabiCryptoError::ClientReceivedInvalidProofs)
    );

    let (request, validation) = client.create_request_for_zero_amount(&mut rng);
    let mut response = issuer.handle_request(&request, &mut rng).expect("request accepted");
    response.issued.pop();
    assert_eq!(
        client.handle_response(&response, validation),
        Err(WabiSabiCryptoError::IssuedCredentialNumberMismatch)
    );
}
