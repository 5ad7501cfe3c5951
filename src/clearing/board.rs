use serde::{Deserialize, Serialize};

use crate::error::{PreconditionViolation, Result};
use crate::group::{Element, GroupParameters};
use crate::participant::{BitPublics, ParticipantState};

const LOG_TARGET: &str = "sealed_bid::clearing::board";

/// Everything participants broadcast before round 0: `rows[k][j] = (X_kj, S_kj)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicBoard {
    bit_length: usize,
    rows: Vec<Vec<BitPublics>>,
}

impl PublicBoard {
    pub fn new(bit_length: usize, rows: Vec<Vec<BitPublics>>) -> Result<Self> {
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != bit_length {
                return Err(PreconditionViolation::BoardShape {
                    row,
                    expected: bit_length,
                    actual: entries.len(),
                }
                .into());
            }
        }
        Ok(Self { bit_length, rows })
    }

    pub fn from_participants(participants: &[ParticipantState], bit_length: usize) -> Result<Self> {
        Self::new(
            bit_length,
            participants.iter().map(|p| p.publics().to_vec()).collect(),
        )
    }

    pub fn participant_count(&self) -> usize {
        self.rows.len()
    }

    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// `X[k][j]` for every k, at one position.
    pub fn column_x(&self, position: usize) -> impl Iterator<Item = &Element> + '_ {
        self.rows.iter().map(move |row| &row[position].x)
    }

    /// Blinding bases for participant `id`:
    /// `T[j] = (∏_{k<id} X[k][j]) · (∏_{k>id} X[k][j])^{-1} mod p`.
    pub fn blinding_for(&self, params: &GroupParameters, id: usize) -> Result<Vec<Element>> {
        if id >= self.rows.len() {
            return Err(PreconditionViolation::ParticipantId {
                id,
                participant_count: self.rows.len(),
            }
            .into());
        }

        let (before, rest) = self.rows.split_at(id);
        let after = &rest[1..];

        (0..self.bit_length)
            .map(|j| {
                let earlier = params.product(before.iter().map(|row| &row[j].x));
                let later = params.product(after.iter().map(|row| &row[j].x));
                params.div(&earlier, &later)
            })
            .collect::<Result<Vec<_>>>()
            .inspect(|_| {
                tracing::debug!(target: LOG_TARGET, id, "Computed blinding bases");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Scalar;
    use rand::{rngs::StdRng, SeedableRng};

    fn participants(params: &GroupParameters, bids: &[u64], bit_length: usize) -> Vec<ParticipantState> {
        let mut rng = StdRng::seed_from_u64(99);
        bids.iter()
            .enumerate()
            .map(|(i, &bid)| {
                ParticipantState::new(params, bid, i, bit_length, bids.len(), &mut rng).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_blinding_exponents_telescope() {
        let params = GroupParameters::safe_256().unwrap();
        let mut ps = participants(&params, &[3, 9, 12, 0, 7], 4);
        let board = PublicBoard::from_participants(&ps, 4).unwrap();
        for p in ps.iter_mut() {
            p.compute_blinding(&params, &board).unwrap();
        }

        // Σ_i x_i (Σ_{k<i} x_k − Σ_{k>i} x_k) = 0, so ∏_i T_i^{x_i} = 1
        for j in 0..4 {
            let product = params.product(
                ps.iter()
                    .map(|p| params.pow(&p.blinding()[j], &p.secrets()[j].x))
                    .collect::<Vec<_>>()
                    .iter(),
            );
            assert!(product.is_one(), "position {j} did not cancel");
        }
    }

    #[test]
    fn test_blinding_matches_exponent_form() {
        let params = GroupParameters::toy().unwrap();
        let ps = participants(&params, &[1, 2, 3], 2);
        let board = PublicBoard::from_participants(&ps, 2).unwrap();

        let t = board.blinding_for(&params, 1).unwrap();
        for (j, t_j) in t.iter().enumerate() {
            let exponent = params.scalar_sub(&ps[0].secrets()[j].x, &ps[2].secrets()[j].x);
            assert_eq!(*t_j, params.exp_g(&exponent));
        }
    }

    #[test]
    fn test_edges_of_the_board() {
        let params = GroupParameters::toy().unwrap();
        let ps = participants(&params, &[1], 3);
        let board = PublicBoard::from_participants(&ps, 3).unwrap();
        // alone on the board: nothing before, nothing after
        assert!(board
            .blinding_for(&params, 0)
            .unwrap()
            .iter()
            .all(Element::is_one));
        assert!(board.blinding_for(&params, 1).is_err());
        assert_eq!(board.column_x(2).count(), 1);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let params = GroupParameters::toy().unwrap();
        let entry = BitPublics {
            x: params.exp_g(&Scalar::from(2)),
            s: params.exp_g(&Scalar::from(3)),
        };
        let err = PublicBoard::new(2, vec![vec![entry.clone(), entry.clone()], vec![entry]]);
        assert!(matches!(
            err,
            Err(crate::error::AuctionError::Precondition(
                PreconditionViolation::BoardShape { row: 1, .. }
            ))
        ));
    }
}
