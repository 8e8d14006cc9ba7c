use crate::crypto::transcript::Transcript;
use crate::crypto::{GroupElement, Scalar};
use curve25519_dalek::traits::Identity;
use log::warn;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// One linear relation `P = Σ_j x_j·G_j` over the statement's shared
/// witness vector. Positions a witness component does not occur at hold
/// the identity element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub public_point: GroupElement,
    pub generators: Vec<GroupElement>,
}

impl Equation {
    pub fn new(public_point: GroupElement, generators: Vec<GroupElement>) -> Self {
        Equation { public_point, generators }
    }

    fn evaluate(&self, scalars: &[Scalar]) -> GroupElement {
        self.generators
            .iter()
            .zip(scalars)
            .fold(GroupElement::identity(), |acc, (g, s)| acc + s * g)
    }
}

/// A conjunction of linear relations proved with one shared witness
/// vector. This is the verifier-side half of a proof of knowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    equations: Vec<Equation>,
}

impl Statement {
    /// Every equation must span the same witness vector.
    pub fn new(equations: Vec<Equation>) -> Self {
        assert!(!equations.is_empty(), "a statement needs at least one equation");
        let width = equations[0].generators.len();
        assert!(
            equations.iter().all(|eq| eq.generators.len() == width),
            "all equations of a statement must have the same width"
        );
        Statement { equations }
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn witness_width(&self) -> usize {
        self.equations[0].generators.len()
    }

    fn fold_into(&self, transcript: &mut Transcript) {
        transcript.append_u64(b"equations", self.equations.len() as u64);
        for equation in &self.equations {
            transcript.append_point(b"public-point", &equation.public_point);
            transcript.append_u64(b"width", equation.generators.len() as u64);
            for generator in &equation.generators {
                transcript.append_point(b"generator", generator);
            }
        }
    }
}

/// A statement together with the witness that satisfies it.
#[derive(Debug, Clone)]
pub struct Knowledge {
    pub statement: Statement,
    pub witness: Vec<Scalar>,
}

impl Knowledge {
    pub fn new(statement: Statement, witness: Vec<Scalar>) -> Self {
        assert_eq!(statement.witness_width(), witness.len(), "witness width mismatch");
        debug_assert!(
            statement.equations().iter().all(|eq| eq.evaluate(&witness) == eq.public_point),
            "witness does not satisfy the statement"
        );
        Knowledge { statement, witness }
    }
}

/// Schnorr-style proof for one statement: a public nonce per equation and
/// a response per witness component. The challenge is recomputed by the
/// verifier from the shared transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    public_nonces: Vec<GroupElement>,
    responses: Vec<Scalar>,
}

/// Proves a batch of statements under one shared challenge. All statements
/// are folded into the transcript before any nonce, so every proof is
/// bound to the whole batch and to everything folded in earlier.
pub fn prove<R: RngCore + CryptoRng>(
    transcript: &mut Transcript,
    knowledge: &[Knowledge],
    rng: &mut R,
) -> Vec<Proof> {
    for k in knowledge {
        k.statement.fold_into(transcript);
    }

    let mut nonces: Vec<Vec<Scalar>> = Vec::with_capacity(knowledge.len());
    let mut public_nonces: Vec<Vec<GroupElement>> = Vec::with_capacity(knowledge.len());
    for k in knowledge {
        let mut witness_rng = transcript.witness_rng(&k.witness, rng);
        let secret: Vec<Scalar> = (0..k.witness.len()).map(|_| Scalar::random(&mut witness_rng)).collect();
        let publics: Vec<GroupElement> =
            k.statement.equations().iter().map(|eq| eq.evaluate(&secret)).collect();
        for nonce in &publics {
            transcript.append_point(b"nonce", nonce);
        }
        nonces.push(secret);
        public_nonces.push(publics);
    }

    let challenge = transcript.challenge_scalar(b"challenge");

    knowledge
        .iter()
        .zip(nonces)
        .zip(public_nonces)
        .map(|((k, secret), publics)| {
            let responses =
                secret.iter().zip(&k.witness).map(|(n, x)| n + challenge * x).collect();
            Proof { public_nonces: publics, responses }
        })
        .collect()
}

/// Verifies a batch of proofs produced by [`prove`] against the same
/// transcript evolution. Returns `false` on any shape or equation
/// mismatch; the caller maps that to its own error taxonomy.
pub fn verify(transcript: &mut Transcript, statements: &[Statement], proofs: &[Proof]) -> bool {
    if statements.len() != proofs.len() {
        warn!(
            "proof count mismatch: {} statements, {} proofs",
            statements.len(),
            proofs.len()
        );
        return false;
    }
    for statement in statements {
        statement.fold_into(transcript);
    }
    for (statement, proof) in statements.iter().zip(proofs) {
        if proof.public_nonces.len() != statement.equations().len()
            || proof.responses.len() != statement.witness_width()
        {
            warn!("malformed proof shape");
            return false;
        }
        for nonce in &proof.public_nonces {
            transcript.append_point(b"nonce", nonce);
        }
    }

    let challenge = transcript.challenge_scalar(b"challenge");

    statements.iter().zip(proofs).all(|(statement, proof)| {
        statement.equations().iter().zip(&proof.public_nonces).all(|(eq, nonce)| {
            eq.evaluate(&proof.responses) == nonce + challenge * eq.public_point
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generators::generators;
    use rand_core::OsRng;

    fn pedersen_knowledge(value: u64, rng: &mut OsRng) -> Knowledge {
        let g = generators();
        let (a, r) = (Scalar::from(value), Scalar::random(rng));
        let commitment = a * g.gg + r * g.gh;
        Knowledge::new(
            Statement::new(vec![Equation::new(commitment, vec![g.gg, g.gh])]),
            vec![a, r],
        )
    }

    #[test]
    fn batch_round_trip() {
        let mut rng = OsRng;
        let knowledge = vec![pedersen_knowledge(7, &mut rng), pedersen_knowledge(11, &mut rng)];
        let statements: Vec<_> = knowledge.iter().map(|k| k.statement.clone()).collect();

        let mut prover = Transcript::new(b"test");
        let proofs = prove(&mut prover, &knowledge, &mut rng);

        let mut verifier = Transcript::new(b"test");
        assert!(verify(&mut verifier, &statements, &proofs));
    }

    #[test]
    fn rejects_wrong_statement() {
        let mut rng = OsRng;
        let knowledge = vec![pedersen_knowledge(7, &mut rng)];
        let mut prover = Transcript::new(b"test");
        let proofs = prove(&mut prover, &knowledge, &mut rng);

        let other = pedersen_knowledge(8, &mut rng);
        let mut verifier = Transcript::new(b"test");
        assert!(!verify(&mut verifier, &[other.statement], &proofs));
    }

    #[test]
    fn rejects_wrong_transcript_label() {
        let mut rng = OsRng;
        let knowledge = vec![pedersen_knowledge(7, &mut rng)];
        let statements: Vec<_> = knowledge.iter().map(|k| k.statement.clone()).collect();
        let mut prover = Transcript::new(b"test");
        let proofs = prove(&mut prover, &knowledge, &mut rng);

        let mut verifier = Transcript::new(b"other");
        assert!(!verify(&mut verifier, &statements, &proofs));
    }

    #[test]
    fn rejects_truncated_proof_batch() {
        let mut rng = OsRng;
        let knowledge = vec![pedersen_knowledge(7, &mut rng), pedersen_knowledge(11, &mut rng)];
        let statements: Vec<_> = knowledge.iter().map(|k| k.statement.clone()).collect();
        let mut prover = Transcript::new(b"test");
        let proofs = prove(&mut prover, &knowledge, &mut rng);

        let mut verifier = Transcript::new(b"test");
        assert!(!verify(&mut verifier, &statements, &proofs[..1]));
    }
}
