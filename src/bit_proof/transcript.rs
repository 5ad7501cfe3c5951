//! Fiat-Shamir transcript for bit proofs.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use crate::commitment::BidCommitment;
use crate::group::{Element, GroupParameters, Scalar};

const DOMAIN_TAG: &[u8] = b"sealed_bid/bit_proof/challenge/v1";

/// Length-prefixed SHA-256 absorption of the proof statement.
pub struct ChallengeTranscript {
    hasher: Sha256,
}

impl ChallengeTranscript {
    pub fn new() -> Self {
        let mut hasher = Sha256::new();
        hasher.update((DOMAIN_TAG.len() as u16).to_be_bytes());
        hasher.update(DOMAIN_TAG);
        Self { hasher }
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u32).to_be_bytes());
        self.hasher.update(bytes);
    }

    pub fn append_u64(&mut self, value: u64) {
        self.hasher.update(value.to_be_bytes());
    }

    pub fn append_element(&mut self, label: &'static [u8], value: &Element) {
        self.append_bytes(label);
        self.append_bytes(&value.to_bytes_be());
    }

    /// Digest reduced into `Z_q`.
    pub fn challenge(self, params: &GroupParameters) -> Scalar {
        let digest = self.hasher.finalize();
        params.scalar_from_biguint(&BigUint::from_bytes_be(&digest))
    }
}

impl Default for ChallengeTranscript {
    fn default() -> Self {
        Self::new()
    }
}

/// `c = H(g, h, C, e, a1, a2, position) mod q`.
pub fn compute_challenge(
    params: &GroupParameters,
    commitment: &BidCommitment,
    value: &Element,
    a1: &Element,
    a2: &Element,
    position: u64,
) -> Scalar {
    let mut transcript = ChallengeTranscript::new();
    transcript.append_element(b"g", params.g());
    transcript.append_element(b"h", params.h());
    transcript.append_element(b"commitment", commitment.value());
    transcript.append_element(b"e", value);
    transcript.append_element(b"a1", a1);
    transcript.append_element(b"a2", a2);
    transcript.append_bytes(b"position");
    transcript.append_u64(position);
    transcript.challenge(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(params: &GroupParameters) -> (BidCommitment, Element, Element, Element) {
        let commitment = BidCommitment::commit(params, 3, &Scalar::from(17));
        let e = params.exp_g(&Scalar::from(5));
        let a1 = params.exp_g(&Scalar::from(6));
        let a2 = params.exp_h(&Scalar::from(7));
        (commitment, e, a1, a2)
    }

    #[test]
    fn test_challenge_is_deterministic() {
        let params = GroupParameters::safe_256().unwrap();
        let (c, e, a1, a2) = statement(&params);
        let first = compute_challenge(&params, &c, &e, &a1, &a2, 4);
        let second = compute_challenge(&params, &c, &e, &a1, &a2, 4);
        assert_eq!(first, second);
        assert!(params.is_canonical(&first));
    }

    #[test]
    fn test_challenge_binds_every_input() {
        let params = GroupParameters::safe_256().unwrap();
        let (c, e, a1, a2) = statement(&params);
        let base = compute_challenge(&params, &c, &e, &a1, &a2, 4);

        assert_ne!(base, compute_challenge(&params, &c, &e, &a1, &a2, 5));
        assert_ne!(base, compute_challenge(&params, &c, &e, &a2, &a1, 4));
        assert_ne!(base, compute_challenge(&params, &c, &a1, &e, &a2, 4));
        let other = BidCommitment::commit(&params, 4, &Scalar::from(17));
        assert_ne!(base, compute_challenge(&params, &other, &e, &a1, &a2, 4));
        // positions past 255 stay distinct
        assert_ne!(
            compute_challenge(&params, &c, &e, &a1, &a2, 1),
            compute_challenge(&params, &c, &e, &a1, &a2, 257)
        );
    }
}
