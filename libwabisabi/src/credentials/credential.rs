use crate::crypto::generators::generators;
use crate::crypto::keys::CredentialIssuerSecretKey;
use crate::crypto::mac::Mac;
use crate::crypto::{CompressedRistretto, GroupElement, Scalar};
use serde::{Deserialize, Serialize};

/// A value-bearing anonymous credential held by a client. The issuer has
/// MACed the Pedersen commitment `Ma = value·Gg + randomness·Gh` without
/// learning `value`; presenting re-randomizes everything except the serial
/// number, which stays stable so the issuer can detect double spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub value: u64,
    pub randomness: Scalar,
    pub mac: Mac,
}

impl Credential {
    pub fn amount(&self) -> Scalar {
        Scalar::from(self.value)
    }

    pub fn commitment(&self) -> GroupElement {
        let g = generators();
        self.amount() * g.gg + self.randomness * g.gh
    }

    /// Randomizes the credential with blinding `z`. Two presentations of
    /// the same credential with different `z` are unlinkable to each other
    /// except through the serial number `S = randomness·Gs`.
    pub fn present(&self, z: Scalar) -> CredentialPresentation {
        let g = generators();
        let u = self.mac.u();
        CredentialPresentation {
            ca: z * g.ga + self.commitment(),
            cx0: z * g.gx0 + u,
            cx1: z * g.gx1 + self.mac.t * u,
            cv: z * g.gv + self.mac.v,
            s: self.randomness * g.gs,
        }
    }
}

/// The randomized form of a credential sent to the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPresentation {
    pub ca: GroupElement,
    pub cx0: GroupElement,
    pub cx1: GroupElement,
    pub cv: GroupElement,
    pub s: GroupElement,
}

impl CredentialPresentation {
    /// The stable serial number the issuer records against replay.
    pub fn serial_number(&self) -> CompressedRistretto {
        self.s.compress()
    }

    /// Issuer-side recovery of `Z = z·I` from the presentation and the
    /// secret key. A presentation of a validly MACed credential satisfies
    /// `Cv − (w·Gw + x0·Cx0 + x1·Cx1 + ya·Ca) = z·I`, which is what the
    /// show-credential proof is verified against.
    pub fn compute_z(&self, sk: &CredentialIssuerSecretKey) -> GroupElement {
        let g = generators();
        self.cv - (sk.w * g.gw + sk.x0 * self.cx0 + sk.x1 * self.cx1 + sk.ya * self.ca)
    }
}
