//! Non-interactive OR-proof that a published value encodes a single bit.
//!
//! The statement is `e = g^t · h^s` (bit 0) or `e = g^t · h^s · g` (bit 1) for
//! secrets `(t, s)`. The prover runs the Schnorr-style protocol honestly on the
//! branch its bit selects and simulates the other one; Fiat-Shamir over SHA-256
//! supplies the joint challenge, which the two branch challenges must sum to.

pub mod transcript;

use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::commitment::BidCommitment;
use crate::error::{AuctionError, PreconditionViolation, Result};
use crate::group::{sample_below, Element, GroupParameters, Scalar};

pub use transcript::compute_challenge;

const LOG_TARGET: &str = "sealed_bid::bit_proof";

/// `g^t · h^s · g^bit mod p`.
pub fn encode_bit(params: &GroupParameters, t: &Scalar, s: &Scalar, bit: u8) -> Result<Element> {
    let base = params.exp_gh(t, s);
    match bit {
        0 => Ok(base),
        1 => Ok(params.mul(&base, params.g())),
        other => Err(AuctionError::InvalidBitValue(other)),
    }
}

/// `(c1, z1, z2, a1)` answer the bit-0 equation `g^z1 h^z2 = a1 · e^c1`;
/// `(c2, w, v, a2)` answer the bit-1 equation `g^w h^v = a2 · (e/g)^c2`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitProof {
    pub c1: Scalar,
    pub c2: Scalar,
    pub z1: Scalar,
    pub z2: Scalar,
    pub w: Scalar,
    pub v: Scalar,
    pub a1: Element,
    pub a2: Element,
}

/// One `(e, proof, position)` triple to check against a commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitStatement {
    pub value: Element,
    pub proof: BitProof,
    pub position: u64,
}

/// Commitment and responses of a single branch.
struct Branch {
    challenge: Scalar,
    first: Scalar,
    second: Scalar,
    commitment: Element,
}

impl BitProof {
    /// Prove that `e` encodes `bit` under secrets `(t, s)`.
    #[allow(clippy::too_many_arguments)]
    pub fn generate<R>(
        params: &GroupParameters,
        commitment: &BidCommitment,
        e: &Element,
        t: &Scalar,
        s: &Scalar,
        bit: u8,
        position: u64,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if bit > 1 {
            return Err(AuctionError::InvalidBitValue(bit));
        }
        if !params.contains(e) {
            return Err(PreconditionViolation::NotGroupElement("e").into());
        }

        let alpha = sample_below(&mut *rng, params.q())?;
        let beta = sample_below(&mut *rng, params.q())?;
        let fake_challenge = sample_below(&mut *rng, params.q())?;
        let fake_first = sample_below(&mut *rng, params.q())?;
        let fake_second = sample_below(&mut *rng, params.q())?;

        // The other bit's branch value: e for bit 0, e/g for bit 1.
        let fake_value = if bit == 0 {
            params.div(e, params.g())?
        } else {
            e.clone()
        };

        // g^r1 h^r2 = a_f · V_f^{c_f}
        let fake_commitment = params.div(
            &params.exp_gh(&fake_first, &fake_second),
            &params.pow(&fake_value, &fake_challenge),
        )?;
        let real_commitment = params.exp_gh(&alpha, &beta);

        let (a1, a2) = if bit == 0 {
            (real_commitment.clone(), fake_commitment.clone())
        } else {
            (fake_commitment.clone(), real_commitment.clone())
        };

        let challenge = compute_challenge(params, commitment, e, &a1, &a2, position);
        let real_challenge = params.scalar_sub(&challenge, &fake_challenge);

        let real = Branch {
            first: params.scalar_add(&alpha, &params.scalar_mul(&real_challenge, t)),
            second: params.scalar_add(&beta, &params.scalar_mul(&real_challenge, s)),
            challenge: real_challenge,
            commitment: real_commitment,
        };
        let fake = Branch {
            challenge: fake_challenge,
            first: fake_first,
            second: fake_second,
            commitment: fake_commitment,
        };
        let (zero_branch, one_branch) = if bit == 0 { (real, fake) } else { (fake, real) };

        tracing::debug!(target: LOG_TARGET, position, "Generated bit proof");

        Ok(Self {
            c1: zero_branch.challenge,
            c2: one_branch.challenge,
            z1: zero_branch.first,
            z2: zero_branch.second,
            w: one_branch.first,
            v: one_branch.second,
            a1: zero_branch.commitment,
            a2: one_branch.commitment,
        })
    }

    /// Check the proof for `e` at `position` under `commitment`.
    pub fn verify(
        &self,
        params: &GroupParameters,
        commitment: &BidCommitment,
        e: &Element,
        position: u64,
    ) -> bool {
        let scalars = [&self.c1, &self.c2, &self.z1, &self.z2, &self.w, &self.v];
        if !scalars.iter().all(|s| params.is_canonical(s)) {
            tracing::debug!(target: LOG_TARGET, position, "Rejected: non-canonical scalar");
            return false;
        }
        let elements = [&self.a1, &self.a2, e, commitment.value()];
        if !elements.iter().all(|el| params.contains(el)) {
            tracing::debug!(target: LOG_TARGET, position, "Rejected: value outside the group");
            return false;
        }

        let expected = compute_challenge(params, commitment, e, &self.a1, &self.a2, position);
        if params.scalar_add(&self.c1, &self.c2) != expected {
            tracing::debug!(target: LOG_TARGET, position, "Rejected: challenge split");
            return false;
        }

        let zero_lhs = params.exp_gh(&self.z1, &self.z2);
        let zero_rhs = params.mul(&self.a1, &params.pow(e, &self.c1));
        if zero_lhs != zero_rhs {
            tracing::debug!(target: LOG_TARGET, position, "Rejected: bit-0 equation");
            return false;
        }

        let Ok(shifted) = params.div(e, params.g()) else {
            return false;
        };
        let one_lhs = params.exp_gh(&self.w, &self.v);
        let one_rhs = params.mul(&self.a2, &params.pow(&shifted, &self.c2));
        if one_lhs != one_rhs {
            tracing::debug!(target: LOG_TARGET, position, "Rejected: bit-1 equation");
            return false;
        }

        true
    }
}

/// Verify every statement against one commitment in parallel.
///
/// An empty batch proves nothing and is rejected.
pub fn verify_batch(
    params: &GroupParameters,
    commitment: &BidCommitment,
    statements: &[BitStatement],
) -> bool {
    if statements.is_empty() {
        return false;
    }
    statements.par_iter().all(|statement| {
        statement
            .proof
            .verify(params, commitment, &statement.value, statement.position)
    })
}
