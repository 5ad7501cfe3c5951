use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::group::{Element, GroupParameters};
use crate::participant::ParticipantState;

const LOG_TARGET: &str = "sealed_bid::clearing::round";

/// Immutable result of one elimination round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Bit position, 0 being the most significant.
    pub position: usize,
    /// `E_j = ∏_i e_ij mod p`.
    pub aggregate: Element,
    /// Bit of the clearing price at this position.
    pub clearing_bit: bool,
    /// Ids of the participants this round eliminates.
    pub eliminated: Vec<usize>,
}

/// Evaluate the round for `position` against the current `is_lost` snapshot.
///
/// Nothing is mutated here; the returned record is applied with [`apply_round`].
pub(crate) fn evaluate_round(
    params: &GroupParameters,
    participants: &[ParticipantState],
    position: usize,
) -> RoundRecord {
    let _span = tracing::debug_span!(target: LOG_TARGET, "evaluate_round", position).entered();

    // Independent per participant; the product below is the barrier.
    let terms: Vec<Element> = participants
        .par_iter()
        .map(|p| p.published_term(params, position))
        .collect();
    let aggregate = params.product(terms.iter());

    let clearing_bit = match participants {
        // T is the identity for a lone bidder, so E_j carries no information;
        // the clearing price is their bid and nobody else can learn anything.
        [only] => only.bits()[position],
        // Identity ⇔ every term used x ⇔ no active participant has a 0 here.
        _ => aggregate.is_one(),
    };

    let eliminated = if clearing_bit {
        Vec::new()
    } else {
        participants
            .iter()
            .filter(|p| !p.is_lost() && p.bits()[position])
            .map(ParticipantState::id)
            .collect()
    };

    tracing::debug!(
        target: LOG_TARGET,
        position,
        clearing_bit,
        eliminated = ?eliminated,
        "Round decided"
    );

    RoundRecord {
        position,
        aggregate,
        clearing_bit,
        eliminated,
    }
}

/// Apply a round's eliminations all at once.
pub(crate) fn apply_round(participants: &mut [ParticipantState], record: &RoundRecord) {
    for &id in &record.eliminated {
        if let Some(p) = participants.get_mut(id) {
            p.mark_lost();
        }
    }
}
