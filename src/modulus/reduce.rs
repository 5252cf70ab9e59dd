use crate::limb;
use crate::modulus::ctx::{ModCtx, WIDE_CAP};

impl ModCtx {
    /// Reduces an unreduced little-endian value of up to [`WIDE_CAP`] limbs to
    /// a canonical element.
    ///
    /// This is the single funnel every lazy accumulator in the crate drains
    /// through: full element products, dot-product sums, Karatsuba and
    /// Kronecker coefficients, CRT recombinations. One normalized schoolbook
    /// division using the precomputed reciprocal, nothing else.
    pub fn reduce_wide(&self, dst: &mut [u64], src: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(dst.len() == n);
        let mut t = src.len();
        while t > 0 && src[t - 1] == 0 {
            t -= 1;
        }
        if t < n || (t == n && limb::cmp_n(&src[..n], self.modulus()) == core::cmp::Ordering::Less)
        {
            dst[..t].copy_from_slice(&src[..t]);
            dst[t..].fill(0);
            return;
        }
        debug_assert!(t + 1 <= WIDE_CAP, "accumulator wider than WIDE_CAP");
        let mut un = [0u64; WIDE_CAP];
        un[t] = limb::shl_n(&mut un[..t], &src[..t], self.norm());
        limb::rem_normalized(&mut un[..t + 1], self.mnorm(), self.minv());
        limb::shr_n(dst, &un[..n], self.norm());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulus::{biguint_from_limbs, limbs_from_biguint};

    fn check(modulus: &[u64], src: &[u64]) {
        let ctx = ModCtx::new(modulus).unwrap();
        let mut dst = vec![0u64; modulus.len()];
        ctx.reduce_wide(&mut dst, src);
        let want = biguint_from_limbs(src) % biguint_from_limbs(modulus);
        let mut want_limbs = vec![0u64; modulus.len()];
        limbs_from_biguint(&mut want_limbs, &want);
        assert_eq!(dst, want_limbs, "modulus {:?} src {:?}", modulus, src);
    }

    #[test]
    fn agrees_with_bigint_remainder() {
        check(&[97], &[12345]);
        check(&[97], &[u64::MAX, u64::MAX, u64::MAX]);
        check(&[u64::MAX, 1], &[u64::MAX, u64::MAX, u64::MAX, u64::MAX, 7]);
        check(&[0xffff_ffff_ffff_ff61, u64::MAX], &[5, 0, 1, 2, 3]);
        check(
            &[1, 2, 3, 0x8000_0000_0000_0000],
            &[u64::MAX; 9],
        );
        check(&[2], &[u64::MAX, u64::MAX]);
        // already reduced inputs pass through
        check(&[1000], &[999]);
        check(&[u64::MAX, 7, 9], &[4, 5]);
    }
}
