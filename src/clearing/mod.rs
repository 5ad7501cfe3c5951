//! Clearing-price resolution: a secure minimum over bids, one bit position per round.
//!
//! Every participant `i` publishes `X_ij = g^{x_ij}` for each bit position `j`. From
//! the broadcast board each derives `T_ij = g^{Σ_{k<i} x_kj − Σ_{k>i} x_kj}`. In round
//! `j` participant `i` publishes `T_ij^{x_ij}`, unless it is still active and its bit
//! is 0, in which case it publishes `T_ij^{s_ij}`. The cross terms cancel exactly when
//! every term used `x`, so the round's product is the identity iff no active bidder
//! has a 0 at `j`. Rounds run from the most significant bit down; a 0 in the clearing
//! price eliminates every active bidder holding a 1 there.

mod board;
mod round;


pub use board::*;
pub use round::RoundRecord;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::bits;
use crate::error::{PreconditionViolation, Result};
use crate::group::GroupParameters;
use crate::participant::ParticipantState;

const LOG_TARGET: &str = "sealed_bid::clearing";

/// Group orders below this many bits make a misread round likely enough to matter.
const MIN_RECOMMENDED_SECURITY_BITS: u64 = 128;

/// Elimination record of a completed run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingOutcome {
    pub clearing_price: u64,
    pub clearing_bits: Vec<bool>,
    pub rounds: Vec<RoundRecord>,
    /// Ids still active after the last round, i.e. the bidders at the clearing price.
    pub winners: Vec<usize>,
}

pub struct ClearingPriceEngine<'a> {
    params: &'a GroupParameters,
}

impl<'a> ClearingPriceEngine<'a> {
    pub fn new(params: &'a GroupParameters) -> Self {
        if params.security_bits() < MIN_RECOMMENDED_SECURITY_BITS {
            tracing::warn!(
                target: LOG_TARGET,
                q_bits = params.security_bits(),
                "Group order is small; rounds may be misread with non-negligible probability"
            );
        }
        Self { params }
    }

    pub fn params(&self) -> &'a GroupParameters {
        self.params
    }

    /// Clearing price of `bids` under `bit_length`-bit encoding.
    pub fn run<R>(&self, bids: &[u64], bit_length: usize, rng: &mut R) -> Result<u64>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        self.resolve(bids, bit_length, &mut *rng)
            .map(|outcome| outcome.clearing_price)
    }

    /// Run the whole protocol and return its elimination record.
    pub fn resolve<R>(&self, bids: &[u64], bit_length: usize, rng: &mut R) -> Result<ClearingOutcome>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let _span = tracing::info_span!(
            target: LOG_TARGET,
            "resolve",
            participants = bids.len(),
            bit_length
        )
        .entered();

        let participants = self.participants(bids, bit_length, &mut *rng)?;
        let mut session = self.start(participants, bit_length)?;
        while session.step().is_some() {}
        let outcome = session.finish();

        tracing::info!(
            target: LOG_TARGET,
            clearing_price = outcome.clearing_price,
            winners = ?outcome.winners,
            "Clearing price resolved"
        );
        Ok(outcome)
    }

    /// Build one [`ParticipantState`] per bid, checking every bid before sampling anything.
    pub fn participants<R>(
        &self,
        bids: &[u64],
        bit_length: usize,
        rng: &mut R,
    ) -> Result<Vec<ParticipantState>>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        bits::check_bit_length(bit_length)?;
        if let Some((participant, &bid)) = bids
            .iter()
            .enumerate()
            .find(|&(_, &bid)| !bits::fits(bid, bit_length))
        {
            return Err(PreconditionViolation::BidOutOfRange {
                participant,
                bid,
                bit_length,
            }
            .into());
        }

        bids.iter()
            .enumerate()
            .map(|(id, &bid)| {
                ParticipantState::new(self.params, bid, id, bit_length, bids.len(), &mut *rng)
            })
            .collect()
    }

    /// Validate `participants`, publish their board and derive every blinding base.
    pub fn start(
        &self,
        mut participants: Vec<ParticipantState>,
        bit_length: usize,
    ) -> Result<ClearingSession<'a>> {
        bits::check_bit_length(bit_length)?;
        let count = participants.len();
        for (slot, p) in participants.iter().enumerate() {
            if p.id() != slot {
                return Err(PreconditionViolation::ParticipantOrder { slot, id: p.id() }.into());
            }
            if p.participant_count() != count {
                return Err(PreconditionViolation::ParticipantCount {
                    participant: slot,
                    declared: p.participant_count(),
                    actual: count,
                }
                .into());
            }
            if p.bit_length() != bit_length {
                return Err(PreconditionViolation::BitLengthMismatch {
                    participant: slot,
                    expected: bit_length,
                    actual: p.bit_length(),
                }
                .into());
            }
        }

        let board = PublicBoard::from_participants(&participants, bit_length)?;
        for p in participants.iter_mut() {
            p.compute_blinding(self.params, &board)?;
        }

        // No bidders, no rounds: the price stays at zero.
        let rounds_total = if count == 0 { 0 } else { bit_length };

        Ok(ClearingSession {
            params: self.params,
            participants,
            board,
            rounds_total,
            clearing_bits: Vec::with_capacity(rounds_total),
            rounds: Vec::with_capacity(rounds_total),
        })
    }
}

/// A run in progress. Rounds can only be taken in order, one at a time.
pub struct ClearingSession<'a> {
    params: &'a GroupParameters,
    participants: Vec<ParticipantState>,
    board: PublicBoard,
    rounds_total: usize,
    clearing_bits: Vec<bool>,
    rounds: Vec<RoundRecord>,
}

impl<'a> ClearingSession<'a> {
    /// Position the next [`Self::step`] will evaluate, if any.
    pub fn next_position(&self) -> Option<usize> {
        (self.rounds.len() < self.rounds_total).then_some(self.rounds.len())
    }

    pub fn is_finished(&self) -> bool {
        self.next_position().is_none()
    }

    /// Evaluate and apply the next round.
    pub fn step(&mut self) -> Option<&RoundRecord> {
        let position = self.next_position()?;
        let record = round::evaluate_round(self.params, &self.participants, position);
        round::apply_round(&mut self.participants, &record);
        self.clearing_bits.push(record.clearing_bit);
        self.rounds.push(record);
        self.rounds.last()
    }

    pub fn participants(&self) -> &[ParticipantState] {
        &self.participants
    }

    pub fn board(&self) -> &PublicBoard {
        &self.board
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn clearing_bits(&self) -> &[bool] {
        &self.clearing_bits
    }

    /// Close the session, running any rounds not yet taken.
    pub fn finish(mut self) -> ClearingOutcome {
        while self.step().is_some() {}
        let winners = self
            .participants
            .iter()
            .filter(|p| !p.is_lost())
            .map(ParticipantState::id)
            .collect();
        ClearingOutcome {
            clearing_price: bits::from_bits(&self.clearing_bits),
            clearing_bits: self.clearing_bits,
            rounds: self.rounds,
            winners,
        }
    }
}
