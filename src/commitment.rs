//! Pedersen commitments to bids.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{PreconditionViolation, Result};
use crate::group::{sample_below, Element, GroupParameters, Scalar};

const LOG_TARGET: &str = "sealed_bid::commitment";

/// `C = g^bid · h^r mod p`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidCommitment {
    value: Element,
}

impl BidCommitment {
    pub fn commit(params: &GroupParameters, bid: u64, randomness: &Scalar) -> Self {
        let value = params.exp_gh(&params.scalar_from_u64(bid), randomness);
        Self { value }
    }

    /// Commit under fresh randomness, returning the opening alongside.
    pub fn commit_random<R>(params: &GroupParameters, bid: u64, rng: &mut R) -> Result<(Self, Scalar)>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let randomness = sample_below(rng, params.q())?;
        let commitment = Self::commit(params, bid, &randomness);
        tracing::debug!(target: LOG_TARGET, commitment = %commitment.value, "Committed to bid");
        Ok((commitment, randomness))
    }

    /// Wrap a received commitment value, rejecting anything outside the group.
    pub fn from_element(params: &GroupParameters, value: Element) -> Result<Self> {
        if !params.contains(&value) {
            return Err(PreconditionViolation::NotGroupElement("commitment").into());
        }
        Ok(Self { value })
    }

    pub fn value(&self) -> &Element {
        &self.value
    }

    pub fn verify_opening(&self, params: &GroupParameters, bid: u64, randomness: &Scalar) -> bool {
        params.is_canonical(randomness) && Self::commit(params, bid, randomness) == *self
    }
}
