//! Modular arithmetic over the parameters' moduli.
//!
//! Group operations reduce mod `p`, scalar operations reduce mod `q`. Results are
//! always canonical (in `[0, modulus)`).

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::{Element, GroupParameters, Scalar};
use crate::error::{AuctionError, Result};

impl GroupParameters {
    pub fn identity(&self) -> Element {
        Element::one()
    }

    pub fn mul(&self, a: &Element, b: &Element) -> Element {
        Element::new((a.as_biguint() * b.as_biguint()) % self.p())
    }

    pub fn pow(&self, base: &Element, exponent: &Scalar) -> Element {
        Element::new(base.as_biguint().modpow(exponent.as_biguint(), self.p()))
    }

    /// `g^exponent mod p`
    pub fn exp_g(&self, exponent: &Scalar) -> Element {
        self.pow(self.g(), exponent)
    }

    /// `h^exponent mod p`
    pub fn exp_h(&self, exponent: &Scalar) -> Element {
        self.pow(self.h(), exponent)
    }

    /// `g^a · h^b mod p`
    pub fn exp_gh(&self, a: &Scalar, b: &Scalar) -> Element {
        self.mul(&self.exp_g(a), &self.exp_h(b))
    }

    pub fn product<'a, I>(&self, elements: I) -> Element
    where
        I: IntoIterator<Item = &'a Element>,
    {
        elements
            .into_iter()
            .fold(self.identity(), |acc, e| self.mul(&acc, e))
    }

    pub fn inverse(&self, a: &Element) -> Result<Element> {
        let reduced = a.as_biguint() % self.p();
        reduced
            .modinv(self.p())
            .map(Element::new)
            .ok_or_else(|| AuctionError::ModularInverse {
                value: a.to_string(),
                modulus: format!("0x{}", self.p().to_str_radix(16)),
            })
    }

    /// `a · b^{-1} mod p`
    pub fn div(&self, a: &Element, b: &Element) -> Result<Element> {
        Ok(self.mul(a, &self.inverse(b)?))
    }

    /// Whether `e` is in `[1, p)` and of order dividing `q`.
    pub fn contains(&self, e: &Element) -> bool {
        let value = e.as_biguint();
        !value.is_zero() && value < self.p() && value.modpow(self.q(), self.p()).is_one()
    }

    /// Whether `s` is a canonical scalar, i.e. in `[0, q)`.
    pub fn is_canonical(&self, s: &Scalar) -> bool {
        s.as_biguint() < self.q()
    }

    pub fn scalar_add(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar::new((a.as_biguint() + b.as_biguint()) % self.q())
    }

    pub fn scalar_sub(&self, a: &Scalar, b: &Scalar) -> Scalar {
        let q = self.q();
        let a = a.as_biguint() % q;
        let b = b.as_biguint() % q;
        Scalar::new(((a + q) - b) % q)
    }

    pub fn scalar_mul(&self, a: &Scalar, b: &Scalar) -> Scalar {
        Scalar::new((a.as_biguint() * b.as_biguint()) % self.q())
    }

    /// Reduce an arbitrary integer into `Z_q`.
    pub fn scalar_from_biguint(&self, value: &BigUint) -> Scalar {
        Scalar::new(value % self.q())
    }

    pub fn scalar_from_u64(&self, value: u64) -> Scalar {
        self.scalar_from_biguint(&BigUint::from(value))
    }

    pub fn scalar_one(&self) -> Scalar {
        self.scalar_from_biguint(&BigUint::one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> GroupParameters {
        GroupParameters::toy().unwrap()
    }

    #[test]
    fn test_inverse_and_div() {
        let params = toy();
        let a = Element::from(1234);
        let inv = params.inverse(&a).unwrap();
        assert!(params.mul(&a, &inv).is_one());

        let b = Element::from(77);
        let quotient = params.div(&a, &b).unwrap();
        assert_eq!(params.mul(&quotient, &b), a);
    }

    #[test]
    fn test_inverse_of_zero_and_multiple_of_p_fails() {
        let params = toy();
        assert!(matches!(
            params.inverse(&Element::from(0)),
            Err(AuctionError::ModularInverse { .. })
        ));
        assert!(matches!(
            params.div(&Element::from(5), &Element::from(2039 * 3)),
            Err(AuctionError::ModularInverse { .. })
        ));
    }

    #[test]
    fn test_scalar_sub_wraps() {
        let params = toy();
        let diff = params.scalar_sub(&Scalar::from(3), &Scalar::from(10));
        assert_eq!(diff, Scalar::from(1019 - 7));
        assert_eq!(params.scalar_add(&diff, &Scalar::from(10)), Scalar::from(3));
        assert!(params.scalar_add(&diff, &Scalar::from(7)).as_biguint().is_zero());
    }

    #[test]
    fn test_exponent_arithmetic_matches_group() {
        let params = toy();
        let a = Scalar::from(345);
        let b = Scalar::from(999);
        let lhs = params.mul(&params.exp_g(&a), &params.exp_g(&b));
        let rhs = params.exp_g(&params.scalar_add(&a, &b));
        assert_eq!(lhs, rhs);
        // g has order q, so exponents only matter mod q
        assert!(params.exp_g(&Scalar::from(1019)).is_one());
    }

    #[test]
    fn test_contains() {
        let params = toy();
        assert!(params.contains(params.g()));
        assert!(params.contains(&params.exp_gh(&Scalar::from(3), &Scalar::from(4))));
        assert!(!params.contains(&Element::from(0)));
        assert!(!params.contains(&Element::from(2039)));
        // -1 has order 2
        assert!(!params.contains(&Element::from(2038)));
    }

    #[test]
    fn test_product_of_nothing_is_identity() {
        let params = toy();
        assert!(params.product(std::iter::empty()).is_one());
    }
}
