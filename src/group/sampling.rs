use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use super::Scalar;
use crate::error::{AuctionError, Result};

const LOG_TARGET: &str = "sealed_bid::group::sampling";

/// Rejection sampling gives up after this many out-of-range draws in a row.
/// Each draw succeeds with probability above 1/2, so reaching it means the
/// source is broken.
pub const MAX_SAMPLING_ATTEMPTS: usize = 128;

/// Sample a scalar uniformly from `[0, bound)`.
///
/// Uses `try_fill_bytes` so an unavailable entropy source surfaces as
/// [`AuctionError::RandomSource`] instead of a panic.
pub fn sample_below<R>(rng: &mut R, bound: &BigUint) -> Result<Scalar>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let bits = bound.bits();
    if bits == 0 {
        return Err(AuctionError::invalid_parameters("sampling bound is zero"));
    }
    let len = (bits as usize).div_ceil(8);
    let excess = (len * 8) as u64 - bits;
    let top_mask = 0xffu8 >> excess;

    let mut buf = vec![0u8; len];
    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| AuctionError::RandomSource(e.to_string()))?;
        buf[0] &= top_mask;
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(Scalar::new(candidate));
        }
    }

    tracing::error!(target: LOG_TARGET, bits, "Random source never produced an in-range value");
    Err(AuctionError::RandomSource(format!(
        "no value below the {bits}-bit bound after {MAX_SAMPLING_ATTEMPTS} draws"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ConstantRng, FailingRng};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_samples_stay_below_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let bound = BigUint::from(1019u32);
        let mut seen_high = false;
        for _ in 0..2000 {
            let s = sample_below(&mut rng, &bound).unwrap();
            assert!(s.as_biguint() < &bound);
            seen_high |= s.as_biguint() >= &BigUint::from(1000u32);
        }
        // values close to the bound do come up
        assert!(seen_high);
    }

    #[test]
    fn test_failing_source_is_reported() {
        let err = sample_below(&mut FailingRng, &BigUint::from(1019u32)).unwrap_err();
        assert!(matches!(err, AuctionError::RandomSource(_)));
    }

    #[test]
    fn test_stuck_source_is_reported() {
        // 0xff.. masks to 1023, which is never below 1019
        let err = sample_below(&mut ConstantRng(0xff), &BigUint::from(1019u32)).unwrap_err();
        assert!(matches!(err, AuctionError::RandomSource(_)));
    }
}
