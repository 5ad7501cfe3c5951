pub mod bit_proof;
pub mod bits;
pub mod clearing;
pub mod commitment;
pub mod config;
pub mod error;
pub mod group;
pub mod participant;

#[cfg(test)]
pub mod test_utils;

pub use bit_proof::{encode_bit, verify_batch, BitProof, BitStatement};
pub use clearing::{ClearingOutcome, ClearingPriceEngine, ClearingSession, PublicBoard, RoundRecord};
pub use commitment::BidCommitment;
pub use error::{AuctionError, PreconditionViolation, Result};
pub use group::{Element, GroupParameters, Scalar};
pub use participant::{ParticipantState, PublicParticipant};
