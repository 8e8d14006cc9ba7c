//! Statement and knowledge constructors for every proof the protocol
//! exchanges. Client and issuer must build byte-identical statements, so
//! all equation layouts live here and nowhere else.

use crate::credentials::credential::{Credential, CredentialPresentation};
use crate::credentials::issuance::{IssuanceRequest, IssuanceValidationData};
use crate::crypto::generators::generators;
use crate::crypto::keys::{CredentialIssuerSecretKey, IssuerParameters};
use crate::crypto::mac::Mac;
use crate::crypto::statement::{Equation, Knowledge, Statement};
use crate::crypto::{GroupElement, Scalar};
use curve25519_dalek::traits::Identity;
use rand_core::{CryptoRng, RngCore};

/// Signed amounts (`Delta`) embed into the scalar field with their sign.
pub fn scalar_from_i64(value: i64) -> Scalar {
    if value < 0 {
        -Scalar::from(value.unsigned_abs())
    } else {
        Scalar::from(value as u64)
    }
}

fn zero() -> GroupElement {
    GroupElement::identity()
}

/// Show-credential statement over witness `(z, -t·z, t, a, r)`:
///
/// ```text
/// Z   = z·I
/// Cx1 = t·Cx0 + (-t·z)·Gx0 + z·Gx1
/// Ca  = z·Ga + a·Gg + r·Gh
/// S   = r·Gs
/// ```
///
/// The issuer derives `Z` from its secret key, the client from `z·I`;
/// agreement is exactly what shows the MAC under the randomization.
pub fn show_credential_statement(
    presentation: &CredentialPresentation,
    z_point: GroupElement,
    issuer_parameters: &IssuerParameters,
) -> Statement {
    let g = generators();
    Statement::new(vec![
        Equation::new(z_point, vec![issuer_parameters.i, zero(), zero(), zero(), zero()]),
        Equation::new(presentation.cx1, vec![g.gx1, g.gx0, presentation.cx0, zero(), zero()]),
        Equation::new(presentation.ca, vec![g.ga, zero(), zero(), g.gg, g.gh]),
        Equation::new(presentation.s, vec![zero(), zero(), zero(), zero(), g.gs]),
    ])
}

pub fn show_credential_knowledge(
    credential: &Credential,
    z: Scalar,
    presentation: &CredentialPresentation,
    issuer_parameters: &IssuerParameters,
) -> Knowledge {
    let statement =
        show_credential_statement(presentation, z * issuer_parameters.i, issuer_parameters);
    let t = credential.mac.t;
    Knowledge::new(statement, vec![z, -(t * z), t, credential.amount(), credential.randomness])
}

/// Range statement over witness `(r, b_0.., r_0.., s_0..)` for a
/// `width`-bit binary decomposition:
///
/// ```text
/// Ma  = r·Gh + Σ_i b_i·(2^i·Gg)
/// B_i = b_i·Gg + r_i·Gh
/// 0   = b_i·(B_i − Gg) − s_i·Gh        (honest prover: s_i = b_i·r_i)
/// ```
///
/// The last family of equations forces `b_i·(b_i − 1) = 0`, so each bit
/// commitment holds 0 or 1 and `Ma` commits to a value in `[0, 2^width)`.
pub fn range_proof_statement(request: &IssuanceRequest) -> Statement {
    let g = generators();
    let width = request.bit_commitments.len();
    let columns = 1 + 3 * width;

    let mut first = vec![zero(); columns];
    first[0] = g.gh;
    for (i, column) in first.iter_mut().skip(1).take(width).enumerate() {
        *column = Scalar::from(1u64 << i) * g.gg;
    }
    let mut equations = vec![Equation::new(request.ma, first)];

    for (i, bit_commitment) in request.bit_commitments.iter().enumerate() {
        let mut opening = vec![zero(); columns];
        opening[1 + i] = g.gg;
        opening[1 + width + i] = g.gh;
        equations.push(Equation::new(*bit_commitment, opening));

        let mut bit = vec![zero(); columns];
        bit[1 + i] = bit_commitment - g.gg;
        bit[1 + 2 * width + i] = -g.gh;
        equations.push(Equation::new(zero(), bit));
    }

    Statement::new(equations)
}

/// Builds the commitment, its bit commitments, and the matching range
/// knowledge for one requested amount.
pub fn range_proof_knowledge<R: RngCore + CryptoRng>(
    value: u64,
    width: usize,
    rng: &mut R,
) -> (IssuanceRequest, IssuanceValidationData, Knowledge) {
    debug_assert!(width == 64 || value < (1u64 << width), "value out of range");
    let g = generators();
    let randomness = Scalar::random(rng);
    let ma = Scalar::from(value) * g.gg + randomness * g.gh;

    let bits: Vec<Scalar> =
        (0..width).map(|i| Scalar::from((value >> i) & 1)).collect();
    let bit_randomness: Vec<Scalar> = (0..width).map(|_| Scalar::random(rng)).collect();
    let bit_commitments: Vec<GroupElement> = bits
        .iter()
        .zip(&bit_randomness)
        .map(|(b, r)| b * g.gg + r * g.gh)
        .collect();

    let mut witness = Vec::with_capacity(1 + 3 * width);
    witness.push(randomness);
    witness.extend(bits.iter().copied());
    witness.extend(bit_randomness.iter().copied());
    witness.extend(bits.iter().zip(&bit_randomness).map(|(b, r)| b * r));

    let request = IssuanceRequest { ma, bit_commitments };
    let knowledge = Knowledge::new(range_proof_statement(&request), witness);
    let validation = IssuanceValidationData { value, randomness, ma };
    (request, validation, knowledge)
}

/// Zero statement over witness `(r)`: `Ma = r·Gh`, i.e. the commitment
/// opens to amount zero. Null requests carry one of these per requested
/// credential instead of a range proof.
pub fn zero_proof_statement(ma: GroupElement) -> Statement {
    Statement::new(vec![Equation::new(ma, vec![generators().gh])])
}

pub fn zero_proof_knowledge<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> (IssuanceRequest, IssuanceValidationData, Knowledge) {
    let randomness = Scalar::random(rng);
    let ma = randomness * generators().gh;
    let request = IssuanceRequest { ma, bit_commitments: Vec::new() };
    let knowledge = Knowledge::new(zero_proof_statement(ma), vec![randomness]);
    let validation = IssuanceValidationData { value: 0, randomness, ma };
    (request, validation, knowledge)
}

/// Balance statement over witness `(Σz, Σr_presented − Σr_requested)`:
///
/// ```text
/// Delta·Gg + Σ Ca − Σ Ma = Σz·Ga + rΔ·Gh
/// ```
///
/// Both sides can compute the left side from public values, which ties
/// the declared `Delta` to the hidden amounts of the presented and
/// requested credentials.
pub fn balance_proof_statement(
    delta: i64,
    presented: &[CredentialPresentation],
    requested: &[IssuanceRequest],
) -> Statement {
    let g = generators();
    let presented_sum = presented.iter().fold(zero(), |acc, p| acc + p.ca);
    let requested_sum = requested.iter().fold(zero(), |acc, r| acc + r.ma);
    let public = scalar_from_i64(delta) * g.gg + presented_sum - requested_sum;
    Statement::new(vec![Equation::new(public, vec![g.ga, g.gh])])
}

pub fn balance_proof_knowledge(
    delta: i64,
    presented: &[CredentialPresentation],
    requested: &[IssuanceRequest],
    z_sum: Scalar,
    randomness_delta: Scalar,
) -> Knowledge {
    Knowledge::new(
        balance_proof_statement(delta, presented, requested),
        vec![z_sum, randomness_delta],
    )
}

/// Issuance-correctness statement over witness `(w, wp, x0, x1, ya)`,
/// verified by the client against the round's public `(Cw, I)`:
///
/// ```text
/// Cw     = w·Gw + wp·Gwp
/// Gv − I = x0·Gx0 + x1·Gx1 + ya·Ga
/// V      = w·Gw + x0·U + x1·(t·U) + ya·Ma
/// ```
pub fn issuer_parameters_statement(
    issuer_parameters: &IssuerParameters,
    mac: &Mac,
    ma: GroupElement,
) -> Statement {
    let g = generators();
    let u = mac.u();
    Statement::new(vec![
        Equation::new(issuer_parameters.cw, vec![g.gw, g.gwp, zero(), zero(), zero()]),
        Equation::new(g.gv - issuer_parameters.i, vec![zero(), zero(), g.gx0, g.gx1, g.ga]),
        Equation::new(mac.v, vec![g.gw, zero(), u, mac.t * u, ma]),
    ])
}

pub fn issuer_parameters_knowledge(
    sk: &CredentialIssuerSecretKey,
    mac: &Mac,
    ma: GroupElement,
) -> Knowledge {
    Knowledge::new(
        issuer_parameters_statement(&sk.issuer_parameters(), mac, ma),
        vec![sk.w, sk.wp, sk.x0, sk.x1, sk.ya],
    )
}
