//! Fixed-width, most-significant-first binary expansion of bids.

use crate::error::{PreconditionViolation, Result};

/// Largest supported bit length (bids are `u64`).
pub const MAX_BIT_LENGTH: usize = 64;

pub fn check_bit_length(bit_length: usize) -> Result<(), PreconditionViolation> {
    if bit_length == 0 || bit_length > MAX_BIT_LENGTH {
        return Err(PreconditionViolation::BitLength(bit_length));
    }
    Ok(())
}

/// Whether `value < 2^bit_length`.
pub fn fits(value: u64, bit_length: usize) -> bool {
    bit_length >= MAX_BIT_LENGTH || value >> bit_length == 0
}

/// Expand `value` into exactly `bit_length` bits, most significant first.
pub fn to_bits(value: u64, bit_length: usize) -> Result<Vec<bool>> {
    check_bit_length(bit_length)?;
    if !fits(value, bit_length) {
        return Err(PreconditionViolation::ValueOutOfRange { value, bit_length }.into());
    }
    Ok((0..bit_length)
        .rev()
        .map(|shift| (value >> shift) & 1 == 1)
        .collect())
}

/// Inverse of [`to_bits`]. Only the last 64 bits are significant.
pub fn from_bits(bits: &[bool]) -> u64 {
    bits.iter()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
}
