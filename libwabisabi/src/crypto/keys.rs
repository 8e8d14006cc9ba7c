use crate::crypto::generators::generators;
use crate::crypto::{GroupElement, Scalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

/// The issuer's MAC key. One key is generated per credential type per
/// round and dropped with the round.
#[derive(Clone, ZeroizeOnDrop)]
pub struct CredentialIssuerSecretKey {
    pub(crate) w: Scalar,
    pub(crate) wp: Scalar,
    pub(crate) x0: Scalar,
    pub(crate) x1: Scalar,
    pub(crate) ya: Scalar,
}

impl CredentialIssuerSecretKey {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        CredentialIssuerSecretKey {
            w: Scalar::random(rng),
            wp: Scalar::random(rng),
            x0: Scalar::random(rng),
            x1: Scalar::random(rng),
            ya: Scalar::random(rng),
        }
    }

    /// The public half clients verify issuance proofs against.
    pub fn issuer_parameters(&self) -> IssuerParameters {
        let g = generators();
        IssuerParameters {
            cw: self.w * g.gw + self.wp * g.gwp,
            i: g.gv - (self.x0 * g.gx0 + self.x1 * g.gx1 + self.ya * g.ga),
        }
    }
}

impl std::fmt::Debug for CredentialIssuerSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuerSecretKey").finish_non_exhaustive()
    }
}

/// Public issuer parameters: `Cw = w·Gw + wp·Gwp` and
/// `I = Gv − x0·Gx0 − x1·Gx1 − ya·Ga`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerParameters {
    pub cw: GroupElement,
    pub i: GroupElement,
}
