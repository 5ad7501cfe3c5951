//! Public parameters of the prime-order subgroup of `Z_p*` used by every component.

pub mod arith;
pub mod element;
pub mod sampling;

pub use element::*;
pub use sampling::*;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AuctionError, Result};

const LOG_TARGET: &str = "sealed_bid::group";

const DOMAIN_GENERATOR: &[u8] = b"sealed_bid/group/generator/v1";
const MAX_GENERATOR_ATTEMPTS: u32 = 256;

/// 256-bit safe prime p = 2q + 1.
const SAFE_256_P: &str = "f2b19788485432e856c0ea5a5f416206e341dd3a152a90d0d39c2273de2df0b7";
const SAFE_256_Q: &str = "7958cbc4242a19742b60752d2fa0b10371a0ee9d0a95486869ce1139ef16f85b";

/// 1024-bit safe prime p = 2q + 1.
const SAFE_1024_P: &str = concat!(
    "f2804719d4659489b879e889951200a5acc1f6c022d93633218aeead32b23700",
    "def8faf3eb9441f4275fae7078222c1de986e3d4d32fee0bc384134843e7270f",
    "b33d2dfae38f66b1a2718a45da13abd4c9c47b0f5ec36087995754016423d775",
    "b2ec966f2c8a9f994e72f4cb71fc94fdc8cc81425deb4519f909707735b8d15f",
);
const SAFE_1024_Q: &str = concat!(
    "7940238cea32ca44dc3cf444ca890052d660fb60116c9b1990c5775699591b80",
    "6f7c7d79f5ca20fa13afd7383c11160ef4c371ea6997f705e1c209a421f39387",
    "d99e96fd71c7b358d138c522ed09d5ea64e23d87af61b043ccabaa00b211ebba",
    "d9764b3796454fcca7397a65b8fe4a7ee46640a12ef5a28cfc84b83b9adc68af",
);

/// `(p, q, g, h)` with `q | p - 1` and `g`, `h` of order `q`.
///
/// Constructed once, validated, and then passed by reference into every
/// operation. Deserialization goes through the same validation as [`GroupParameters::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupParameters", into = "RawGroupParameters")]
pub struct GroupParameters {
    p: BigUint,
    q: BigUint,
    g: Element,
    h: Element,
}

/// Unvalidated wire form of [`GroupParameters`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawGroupParameters {
    #[serde(with = "element::hex_biguint")]
    pub p: BigUint,
    #[serde(with = "element::hex_biguint")]
    pub q: BigUint,
    #[serde(with = "element::hex_biguint")]
    pub g: BigUint,
    #[serde(with = "element::hex_biguint")]
    pub h: BigUint,
}

impl TryFrom<RawGroupParameters> for GroupParameters {
    type Error = AuctionError;

    fn try_from(raw: RawGroupParameters) -> Result<Self> {
        GroupParameters::new(raw.p, raw.q, raw.g, raw.h)
    }
}

impl From<GroupParameters> for RawGroupParameters {
    fn from(params: GroupParameters) -> Self {
        RawGroupParameters {
            p: params.p,
            q: params.q,
            g: params.g.into_biguint(),
            h: params.h.into_biguint(),
        }
    }
}

impl GroupParameters {
    pub fn new(p: BigUint, q: BigUint, g: BigUint, h: BigUint) -> Result<Self> {
        let three = BigUint::from(3u32);
        if p <= three {
            return Err(AuctionError::invalid_parameters("p must be greater than 3"));
        }
        if q <= BigUint::one() {
            return Err(AuctionError::invalid_parameters("q must be greater than 1"));
        }
        let p_minus_one = &p - 1u32;
        if !(&p_minus_one % &q).is_zero() {
            return Err(AuctionError::invalid_parameters("q does not divide p - 1"));
        }
        for (name, value) in [("g", &g), ("h", &h)] {
            if *value <= BigUint::one() || *value >= p {
                return Err(AuctionError::InvalidParameters(format!(
                    "{name} must lie in [2, p)"
                )));
            }
            if !value.modpow(&q, &p).is_one() {
                return Err(AuctionError::InvalidParameters(format!(
                    "{name} does not generate the order-q subgroup"
                )));
            }
        }
        if g == h {
            return Err(AuctionError::invalid_parameters("g and h must differ"));
        }

        tracing::debug!(
            target: LOG_TARGET,
            p_bits = p.bits(),
            q_bits = q.bits(),
            "Validated group parameters"
        );

        Ok(Self {
            p,
            q,
            g: Element::new(g),
            h: Element::new(h),
        })
    }

    /// Small group with `p = 2039`.
    ///
    /// Only 10 bits of group order: the clearing engine misreads a round with
    /// probability around `1/q`. Suitable for demos and proof tests.
    pub fn toy() -> Result<Self> {
        Self::new(
            BigUint::from(2039u32),
            BigUint::from(1019u32),
            BigUint::from(9u32),
            BigUint::from(461u32),
        )
    }

    /// 256-bit safe-prime group with `g = 4` and a hash-derived `h`.
    pub fn safe_256() -> Result<Self> {
        Self::from_safe_prime(SAFE_256_P, SAFE_256_Q, b"safe256")
    }

    /// 1024-bit safe-prime group with `g = 4` and a hash-derived `h`.
    pub fn safe_1024() -> Result<Self> {
        Self::from_safe_prime(SAFE_1024_P, SAFE_1024_Q, b"safe1024")
    }

    fn from_safe_prime(p_hex: &str, q_hex: &str, seed: &[u8]) -> Result<Self> {
        let p = parse_hex(p_hex)?;
        let q = parse_hex(q_hex)?;
        // 4 = 2^2 is a quadratic residue, hence of order q when p = 2q + 1
        let g = BigUint::from(4u32);
        let h = derive_generator(&p, &q, seed)?;
        Self::new(p, q, g, h)
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn g(&self) -> &Element {
        &self.g
    }

    pub fn h(&self) -> &Element {
        &self.h
    }

    /// Bit length of the subgroup order.
    pub fn security_bits(&self) -> u64 {
        self.q.bits()
    }
}

fn parse_hex(text: &str) -> Result<BigUint> {
    BigUint::parse_bytes(text.as_bytes(), 16)
        .ok_or_else(|| AuctionError::InvalidParameters(format!("malformed hex constant {text}")))
}

/// Hash `seed` into the order-`q` subgroup of `Z_p*`.
///
/// The candidate is expanded from SHA-256 to `|p| + 16` bytes, reduced mod `p`
/// and raised to the cofactor `(p - 1) / q`. Nobody learns `log_g` of the result.
pub fn derive_generator(p: &BigUint, q: &BigUint, seed: &[u8]) -> Result<BigUint> {
    if q.is_zero() || p <= &BigUint::one() {
        return Err(AuctionError::invalid_parameters("degenerate modulus"));
    }
    let cofactor = (p - 1u32) / q;
    let wide_len = (p.bits() as usize).div_ceil(8) + 16;

    for counter in 0..MAX_GENERATOR_ATTEMPTS {
        let mut wide = Vec::with_capacity(wide_len + 32);
        let mut block = 0u32;
        while wide.len() < wide_len {
            let mut hasher = Sha256::new();
            hasher.update(DOMAIN_GENERATOR);
            hasher.update((seed.len() as u32).to_be_bytes());
            hasher.update(seed);
            hasher.update(counter.to_be_bytes());
            hasher.update(block.to_be_bytes());
            wide.extend_from_slice(&hasher.finalize());
            block += 1;
        }
        wide.truncate(wide_len);

        let candidate = BigUint::from_bytes_be(&wide) % p;
        let h = candidate.modpow(&cofactor, p);
        if h > BigUint::one() {
            tracing::debug!(target: LOG_TARGET, counter, "Derived subgroup generator");
            return Ok(h);
        }
    }

    Err(AuctionError::invalid_parameters(
        "could not derive a subgroup generator",
    ))
}
