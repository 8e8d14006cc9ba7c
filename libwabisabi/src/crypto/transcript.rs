use crate::crypto::{GroupElement, Scalar};
use rand_core::{CryptoRng, RngCore};

/// Fiat–Shamir transcript shared by a whole request/response exchange.
///
/// Both sides construct the same transcript, fold the same statements and
/// nonces into it in the same order, and therefore derive the same
/// challenges. The issuer keeps proving its response on the transcript it
/// just verified the request against, which binds the two halves of the
/// exchange together; the client keeps its own copy in the response
/// validation data for the same reason.
#[derive(Clone)]
pub struct Transcript {
    inner: merlin::Transcript,
}

impl Transcript {
    pub fn new(label: &'static [u8]) -> Self {
        Transcript { inner: merlin::Transcript::new(label) }
    }

    /// Binds the request shape before any statement is folded in.
    pub fn bind_request(&mut self, credential_number: usize, is_null_request: bool) {
        self.inner.append_u64(b"credential-number", credential_number as u64);
        self.inner.append_message(b"null-request", &[u8::from(is_null_request)]);
    }

    pub fn append_u64(&mut self, label: &'static [u8], value: u64) {
        self.inner.append_u64(label, value);
    }

    pub fn append_point(&mut self, label: &'static [u8], point: &GroupElement) {
        self.inner.append_message(label, point.compress().as_bytes());
    }

    pub fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar {
        let mut buf = [0u8; 64];
        self.inner.challenge_bytes(label, &mut buf);
        Scalar::from_bytes_mod_order_wide(&buf)
    }

    /// Deterministic nonce generator keyed on the current transcript
    /// state, the witness, and fresh entropy. A nonce can only repeat if
    /// the whole proving context repeats, so witness leakage through
    /// reused nonces is ruled out even under a weak external RNG.
    pub fn witness_rng<R: RngCore + CryptoRng>(
        &self,
        witness: &[Scalar],
        rng: &mut R,
    ) -> merlin::TranscriptRng {
        let mut builder = self.inner.build_rng();
        for scalar in witness {
            builder = builder.rekey_with_witness_bytes(b"witness", scalar.as_bytes());
        }
        builder.finalize(rng)
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}
