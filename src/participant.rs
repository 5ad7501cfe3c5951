//! Per-bidder secret and public material.

use std::fmt;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::bits;
use crate::clearing::PublicBoard;
use crate::error::{PreconditionViolation, Result};
use crate::group::{sample_below, Element, GroupParameters, Scalar};

const LOG_TARGET: &str = "sealed_bid::participant";

/// Secret exponents for one bit position. Never leaves its owner.
#[derive(Clone)]
pub struct BitSecrets {
    pub x: Scalar,
    pub s: Scalar,
}

/// Broadcast values for one bit position: `(g^x, g^s)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitPublics {
    pub x: Element,
    pub s: Element,
}

/// What every other participant sees of a bidder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParticipant {
    pub id: usize,
    pub public_bits: Vec<BitPublics>,
}

pub struct ParticipantState {
    id: usize,
    participant_count: usize,
    bid: u64,
    bits: Vec<bool>,
    secrets: Vec<BitSecrets>,
    publics: Vec<BitPublics>,
    is_lost: bool,
    blinding: Vec<Element>,
}

impl ParticipantState {
    /// Create bidder `id` of `participant_count` with a fresh secret pair per bit.
    pub fn new<R>(
        params: &GroupParameters,
        bid: u64,
        id: usize,
        bit_length: usize,
        participant_count: usize,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        bits::check_bit_length(bit_length)?;
        if id >= participant_count {
            return Err(PreconditionViolation::ParticipantId {
                id,
                participant_count,
            }
            .into());
        }
        if !bits::fits(bid, bit_length) {
            return Err(PreconditionViolation::BidOutOfRange {
                participant: id,
                bid,
                bit_length,
            }
            .into());
        }
        let bits = bits::to_bits(bid, bit_length)?;

        let mut secrets = Vec::with_capacity(bit_length);
        let mut publics = Vec::with_capacity(bit_length);
        for _ in 0..bit_length {
            let x = sample_below(&mut *rng, params.q())?;
            let s = sample_below(&mut *rng, params.q())?;
            publics.push(BitPublics {
                x: params.exp_g(&x),
                s: params.exp_g(&s),
            });
            secrets.push(BitSecrets { x, s });
        }

        tracing::debug!(target: LOG_TARGET, id, bit_length, "Generated participant material");

        Ok(Self {
            id,
            participant_count,
            bid,
            bits,
            secrets,
            publics,
            is_lost: false,
            blinding: Vec::new(),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn participant_count(&self) -> usize {
        self.participant_count
    }

    pub fn bit_length(&self) -> usize {
        self.bits.len()
    }

    pub fn bid(&self) -> u64 {
        self.bid
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn secrets(&self) -> &[BitSecrets] {
        &self.secrets
    }

    pub fn publics(&self) -> &[BitPublics] {
        &self.publics
    }

    pub fn public_view(&self) -> PublicParticipant {
        PublicParticipant {
            id: self.id,
            public_bits: self.publics.clone(),
        }
    }

    pub fn is_lost(&self) -> bool {
        self.is_lost
    }

    /// Blinding bases `T_i[j]`; empty until [`Self::compute_blinding`] runs.
    pub fn blinding(&self) -> &[Element] {
        &self.blinding
    }

    /// Derive `T_i[j] = (∏_{k<i} X[k][j]) / (∏_{k>i} X[k][j])` for every position.
    pub fn compute_blinding(&mut self, params: &GroupParameters, board: &PublicBoard) -> Result<()> {
        self.blinding = board.blinding_for(params, self.id)?;
        Ok(())
    }

    /// The term this participant publishes in the round for `position`.
    ///
    /// An active participant with a 0 bit raises its base to `s`; everyone else
    /// (bit 1, or already eliminated) raises to `x`, which keeps the product
    /// telescoping to the identity.
    ///
    /// Panics if `position` is out of range or the blinding bases are missing.
    pub(crate) fn published_term(&self, params: &GroupParameters, position: usize) -> Element {
        let base = &self.blinding[position];
        let secrets = &self.secrets[position];
        if !self.bits[position] && !self.is_lost {
            params.pow(base, &secrets.s)
        } else {
            params.pow(base, &secrets.x)
        }
    }

    /// One-way transition: once lost, always lost.
    pub(crate) fn mark_lost(&mut self) {
        if !self.is_lost {
            tracing::debug!(target: LOG_TARGET, id = self.id, "Participant eliminated");
        }
        self.is_lost = true;
    }
}

impl fmt::Debug for ParticipantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticipantState")
            .field("id", &self.id)
            .field("participant_count", &self.participant_count)
            .field("bit_length", &self.bits.len())
            .field("is_lost", &self.is_lost)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for BitSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BitSecrets(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuctionError;
    use crate::test_utils::FailingRng;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_material_matches_secrets() {
        let params = GroupParameters::toy().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let p = ParticipantState::new(&params, 11, 0, 4, 3, &mut rng).unwrap();

        assert_eq!(p.bits(), &[true, false, true, true]);
        assert_eq!(p.publics().len(), 4);
        for (secret, public) in p.secrets().iter().zip(p.publics()) {
            assert!(params.is_canonical(&secret.x));
            assert!(params.is_canonical(&secret.s));
            assert_eq!(params.exp_g(&secret.x), public.x);
            assert_eq!(params.exp_g(&secret.s), public.s);
        }
        assert!(!p.is_lost());
        assert!(p.blinding().is_empty());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let params = GroupParameters::toy().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            ParticipantState::new(&params, 16, 0, 4, 1, &mut rng),
            Err(AuctionError::Precondition(PreconditionViolation::BidOutOfRange { .. }))
        ));
        assert!(matches!(
            ParticipantState::new(&params, 1, 3, 4, 3, &mut rng),
            Err(AuctionError::Precondition(PreconditionViolation::ParticipantId { .. }))
        ));
        assert!(matches!(
            ParticipantState::new(&params, 1, 0, 0, 1, &mut rng),
            Err(AuctionError::Precondition(PreconditionViolation::BitLength(0)))
        ));
    }

    #[test]
    fn test_random_failure_aborts_construction() {
        let params = GroupParameters::toy().unwrap();
        assert!(matches!(
            ParticipantState::new(&params, 3, 0, 4, 1, &mut FailingRng),
            Err(AuctionError::RandomSource(_))
        ));
    }

    #[test]
    fn test_published_term_follows_bit_and_status() {
        let params = GroupParameters::safe_256().unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        // 2 = 10
        let mut ps: Vec<ParticipantState> = [2, 1, 3]
            .iter()
            .enumerate()
            .map(|(id, &bid)| ParticipantState::new(&params, bid, id, 2, 3, &mut rng).unwrap())
            .collect();
        let board = PublicBoard::from_participants(&ps, 2).unwrap();
        for p in ps.iter_mut() {
            p.compute_blinding(&params, &board).unwrap();
        }

        let p = &mut ps[0];
        let with = |p: &ParticipantState, j: usize, secret: &Scalar| params.pow(&p.blinding()[j], secret);
        assert_eq!(p.blinding().len(), 2);
        assert_eq!(p.published_term(&params, 0), with(p, 0, &p.secrets()[0].x));
        assert_eq!(p.published_term(&params, 1), with(p, 1, &p.secrets()[1].s));

        // eliminated bidders always raise to x
        p.mark_lost();
        assert_eq!(p.published_term(&params, 1), with(p, 1, &p.secrets()[1].x));
    }

    #[test]
    fn test_debug_hides_bid_and_secrets() {
        let params = GroupParameters::toy().unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let p = ParticipantState::new(&params, 13, 0, 4, 1, &mut rng).unwrap();
        let rendered = format!("{p:?} {:?}", p.secrets()[0]);
        assert!(!rendered.contains("bid"));
        assert!(!rendered.contains(&p.secrets()[0].x.to_string()));
    }

    #[test]
    fn test_public_view_serializes() {
        let params = GroupParameters::toy().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let p = ParticipantState::new(&params, 5, 1, 3, 2, &mut rng).unwrap();
        crate::test_utils::serde::assert_round_trip_eq(&p.public_view());
    }
}
