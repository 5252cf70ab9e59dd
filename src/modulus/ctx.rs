use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::error::{Error, Result};
use crate::limb;
use crate::modulus::biguint_from_limbs;
use crate::tuning::Tuning;

/// Widest supported modulus, in 64-bit limbs.
pub const MAX_LIMBS: usize = 16;

/// Capacity of the stack buffers fed to [`crate::ModCtx::reduce_wide`]; wide
/// enough for every unreduced accumulator in the crate (element products,
/// dot sums, Karatsuba coefficients, Kronecker windows, CRT recombination).
pub(crate) const WIDE_CAP: usize = 2 * MAX_LIMBS + 8;

/// Whether the ring is known to be a field. Caller-asserted, never computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IsField {
    Unknown,
    True,
    False,
}

/// Ring of integers modulo a multi-limb modulus.
///
/// Immutable once constructed and freely shared between threads; element,
/// vector, polynomial and matrix storage is always owned by the caller.
#[derive(Clone, Debug)]
pub struct ModCtx {
    nlimbs: usize,
    m: [u64; MAX_LIMBS],
    mbits: u32,
    /// Left shift making the top limb of `mnorm` have its high bit set.
    norm: u32,
    mnorm: [u64; MAX_LIMBS],
    /// Moller-Granlund reciprocal of the top normalized limbs: the 2by1
    /// inverse of `mnorm[0]` when `nlimbs == 1`, the 3by2 inverse of the top
    /// two limbs otherwise.
    minv: u64,
    is_field: IsField,
    tuning: Tuning,
}

impl ModCtx {
    pub fn new(modulus: &[u64]) -> Result<Self> {
        Self::with_tuning(modulus, Tuning::default())
    }

    pub fn with_tuning(modulus: &[u64], tuning: Tuning) -> Result<Self> {
        let n = modulus.len();
        if n == 0 {
            return Err(Error::InvalidModulus("empty limb array".into()));
        }
        if n > MAX_LIMBS {
            return Err(Error::Unable(format!(
                "{} limbs exceeds the supported maximum of {}",
                n, MAX_LIMBS
            )));
        }
        if modulus[n - 1] == 0 {
            return Err(Error::InvalidModulus(
                "top limb is zero: the limb count must be minimal".into(),
            ));
        }
        if n == 1 && modulus[0] < 2 {
            return Err(Error::InvalidModulus("modulus must be >= 2".into()));
        }

        let mut m = [0u64; MAX_LIMBS];
        m[..n].copy_from_slice(modulus);

        let norm = modulus[n - 1].leading_zeros();
        let mut mnorm = [0u64; MAX_LIMBS];
        let cy = limb::shl_n(&mut mnorm[..n], modulus, norm);
        debug_assert!(cy == 0);

        // Reciprocal of the top normalized limb(s), by exact division at init.
        let one: BigUint = One::one();
        let minv = if n == 1 {
            let d = BigUint::from(mnorm[0]);
            let v = ((&one << 128u32) - 1u32) / d - (&one << 64u32);
            v.to_u64().expect("2by1 reciprocal fits one limb")
        } else {
            let d = (BigUint::from(mnorm[n - 1]) << 64u32) + BigUint::from(mnorm[n - 2]);
            let v = ((&one << 192u32) - 1u32) / d - (&one << 64u32);
            v.to_u64().expect("3by2 reciprocal fits one limb")
        };

        let mbits = limb::bits_n(modulus);

        Ok(Self {
            nlimbs: n,
            m,
            mbits,
            norm,
            mnorm,
            minv,
            is_field: IsField::Unknown,
            tuning,
        })
    }

    #[inline(always)]
    pub fn nlimbs(&self) -> usize {
        self.nlimbs
    }

    /// The canonical modulus.
    #[inline(always)]
    pub fn modulus(&self) -> &[u64] {
        &self.m[..self.nlimbs]
    }

    #[inline(always)]
    pub fn modulus_bits(&self) -> u32 {
        self.mbits
    }

    #[inline(always)]
    pub(crate) fn norm(&self) -> u32 {
        self.norm
    }

    #[inline(always)]
    pub(crate) fn mnorm(&self) -> &[u64] {
        &self.mnorm[..self.nlimbs]
    }

    #[inline(always)]
    pub(crate) fn minv(&self) -> u64 {
        self.minv
    }

    #[inline(always)]
    pub fn is_field(&self) -> IsField {
        self.is_field
    }

    /// Asserts whether the modulus is prime. The flag is advisory: algorithms
    /// that need an inverse always try and surface `NotInvertible`.
    pub fn set_is_field(&mut self, is_field: bool) {
        self.is_field = if is_field { IsField::True } else { IsField::False };
    }

    #[inline(always)]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub(crate) fn modulus_biguint(&self) -> BigUint {
        biguint_from_limbs(self.modulus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_moduli() {
        assert!(matches!(ModCtx::new(&[]), Err(Error::InvalidModulus(_))));
        assert!(matches!(ModCtx::new(&[5, 0]), Err(Error::InvalidModulus(_))));
        assert!(matches!(ModCtx::new(&[1]), Err(Error::InvalidModulus(_))));
        assert!(matches!(ModCtx::new(&[1u64; 17]), Err(Error::Unable(_))));
        assert!(ModCtx::new(&[2]).is_ok());
    }

    #[test]
    fn normalization_shifts_top_bit() {
        let ctx = ModCtx::new(&[0x1234, 0x5]).unwrap();
        assert_eq!(ctx.nlimbs(), 2);
        assert!(ctx.mnorm()[1] >> 63 == 1);
    }
}
