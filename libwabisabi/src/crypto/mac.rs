use crate::crypto::generators::generators;
use crate::crypto::keys::CredentialIssuerSecretKey;
use crate::crypto::{hash_to_group, GroupElement, Scalar};
use serde::{Deserialize, Serialize};

/// An algebraic MAC `(t, V)` over a Pedersen commitment `Ma`:
/// `V = w·Gw + x0·U + (x1·t)·U + ya·Ma` with `U` derived from `t` by
/// hash-to-group. Only the issuer can compute or check it directly;
/// holders show it in zero knowledge via a randomized presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mac {
    pub t: Scalar,
    pub v: GroupElement,
}

impl Mac {
    /// Deterministic MAC of `ma` under `sk` and the per-issuance scalar
    /// `t`. Issuance draws a fresh random `t` for every credential.
    pub fn compute_mac(sk: &CredentialIssuerSecretKey, ma: &GroupElement, t: Scalar) -> Self {
        let u = Mac::generate_u(t);
        let v = sk.w * generators().gw + (sk.x0 + sk.x1 * t) * u + sk.ya * ma;
        Mac { t, v }
    }

    /// The point `U` is a function of `t` alone, so it never needs to be
    /// transmitted alongside the MAC.
    pub fn generate_u(t: Scalar) -> GroupElement {
        hash_to_group(b"wabisabi-mac-u", t.as_bytes())
    }

    pub fn u(&self) -> GroupElement {
        Mac::generate_u(self.t)
    }

    /// Issuer-side check that `self` authenticates `ma`.
    pub fn verify_mac(&self, sk: &CredentialIssuerSecretKey, ma: &GroupElement) -> bool {
        *self == Mac::compute_mac(sk, ma, self.t)
    }
}
