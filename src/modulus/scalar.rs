//! Precomputed-multiplier fast paths for repeated scalar multiplication.
//!
//! Both precomputations pay a one-time cost proportional to a handful of
//! element multiplications and then make each subsequent product cheaper than
//! a full multiply-and-reduce; the vector layer picks between them (or the
//! direct path) per call.

use crate::limb;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};
use crate::modulus::{biguint_from_limbs, limbs_from_biguint};

/// Shoup-style precomputation: `qhat = floor(scalar * B^n / m)`.
///
/// One truncated multiply by `qhat` estimates the reduction quotient; the
/// estimate is off by at most two, so two conditional subtracts finish the
/// job in place of a full division step.
#[derive(Clone, Debug)]
pub struct ShoupPrecomp {
    scalar: [u64; MAX_LIMBS],
    qhat: [u64; MAX_LIMBS],
}

/// Per-limb projection table: `row[j] = scalar * B^j mod m`.
///
/// `scalar * b = sum_j b_j * row[j]` accumulates unreduced in `n + 2` limbs
/// and reduces once, which stays profitable where Shoup's single correction
/// no longer covers the error of a wide estimate.
#[derive(Clone, Debug)]
pub struct LimbMulTable {
    rows: Vec<u64>,
}

impl ModCtx {
    pub fn shoup_prepare(&self, scalar: &[u64]) -> ShoupPrecomp {
        let n = self.nlimbs();
        debug_assert!(scalar.len() == n);
        let q = (biguint_from_limbs(scalar) << (64 * n)) / self.modulus_biguint();
        let mut pre = ShoupPrecomp {
            scalar: [0u64; MAX_LIMBS],
            qhat: [0u64; MAX_LIMBS],
        };
        pre.scalar[..n].copy_from_slice(scalar);
        limbs_from_biguint(&mut pre.qhat[..n], &q);
        pre
    }

    /// `dst = scalar * b mod m` using the precomputed quotient estimate.
    pub fn shoup_mul(&self, dst: &mut [u64], b: &[u64], pre: &ShoupPrecomp) {
        let n = self.nlimbs();
        debug_assert!(dst.len() == n && b.len() == n);
        // t = floor(qhat * b / B^n)
        let mut full = [0u64; 2 * MAX_LIMBS];
        limb::mul_basecase(&mut full[..2 * n], &pre.qhat[..n], b);
        // r = (scalar * b - t * m) mod B^(n+1); the true value is < 3m.
        let mut lo1 = [0u64; MAX_LIMBS + 1];
        let mut lo2 = [0u64; MAX_LIMBS + 1];
        limb::mul_low(&mut lo1[..n + 1], &pre.scalar[..n], b);
        limb::mul_low(&mut lo2[..n + 1], &full[n..2 * n], self.modulus());
        let mut r = [0u64; MAX_LIMBS + 1];
        limb::sub_n(&mut r[..n + 1], &lo1[..n + 1], &lo2[..n + 1]);
        for _ in 0..2 {
            if r[n] != 0 || limb::cmp_n(&r[..n], self.modulus()) != core::cmp::Ordering::Less {
                let bw = limb::sub_n_assign(&mut r[..n], self.modulus());
                r[n] = r[n].wrapping_sub(bw);
            }
        }
        debug_assert!(r[n] == 0);
        dst.copy_from_slice(&r[..n]);
    }

    pub fn limb_table_prepare(&self, scalar: &[u64]) -> LimbMulTable {
        let n = self.nlimbs();
        debug_assert!(scalar.len() == n);
        let mut rows = vec![0u64; n * n];
        rows[..n].copy_from_slice(scalar);
        let mut shifted = [0u64; MAX_LIMBS + 1];
        for j in 1..n {
            // row[j] = row[j-1] << 64 mod m
            shifted[0] = 0;
            shifted[1..n + 1].copy_from_slice(&rows[(j - 1) * n..j * n]);
            let mut row = [0u64; MAX_LIMBS];
            self.reduce_wide(&mut row[..n], &shifted[..n + 1]);
            rows[j * n..(j + 1) * n].copy_from_slice(&row[..n]);
        }
        LimbMulTable { rows }
    }

    /// `dst = scalar * b mod m` via the projection table.
    pub fn limb_table_mul(&self, dst: &mut [u64], b: &[u64], pre: &LimbMulTable) {
        let n = self.nlimbs();
        debug_assert!(dst.len() == n && b.len() == n && pre.rows.len() == n * n);
        let mut acc = [0u64; MAX_LIMBS + 2];
        for j in 0..n {
            if b[j] == 0 {
                continue;
            }
            let cy = limb::addmul_1(&mut acc[..n], &pre.rows[j * n..(j + 1) * n], b[j]);
            let _ = limb::add_n_assign(&mut acc[n..n + 2], &[cy]);
        }
        self.reduce_wide(dst, &acc[..n + 2]);
    }
}
