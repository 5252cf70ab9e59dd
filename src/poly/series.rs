//! Truncated power series inversion and division.
//!
//! Below the cutoff both run the classical recurrences with one lazy dot per
//! coefficient; above it, inversion switches to Newton iteration, doubling
//! the solved length each step on top of a basecase solution.

use crate::error::Result;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

impl ModCtx {
    /// `q = b^-1 mod x^outlen`. Requires `b[0]` invertible.
    pub fn poly_inv_series(&self, q: &mut [u64], b: &[u64], outlen: usize) -> Result<()> {
        let n = self.nlimbs();
        debug_assert!(q.len() == outlen * n);
        let lenb = b.len() / n;
        debug_assert!(lenb >= 1 && outlen >= 1);

        let mut b0_inv = [0u64; MAX_LIMBS];
        self.inv(&mut b0_inv[..n], &b[..n])?;

        let base = outlen.min(self.tuning().inv_series_newton_cutoff.max(1));
        self.inv_series_basecase(&mut q[..base * n], b, base, &b0_inv[..n]);

        let mut l = base;
        while l < outlen {
            let l2 = (2 * l).min(outlen);
            // B*Q = 1 mod x^l, so the correction is -(Q * (B*Q)[l..l2]) mod x^(l2-l)
            let mut t = vec![0u64; l2 * n];
            self.poly_mullow(&mut t, &b[..lenb.min(l2) * n], &q[..l * n], l2);
            let tpart = &t[l * n..l2 * n];
            let mut u = vec![0u64; (l2 - l) * n];
            self.poly_mullow(&mut u, &q[..l.min(l2 - l) * n], tpart, l2 - l);
            let (_solved, qtail) = q.split_at_mut(l * n);
            self.vec_neg(&mut qtail[..(l2 - l) * n], &u);
            l = l2;
        }
        Ok(())
    }

    fn inv_series_basecase(&self, q: &mut [u64], b: &[u64], outlen: usize, b0_inv: &[u64]) {
        let n = self.nlimbs();
        let lenb = b.len() / n;
        q[..n].copy_from_slice(b0_inv);
        if outlen == 1 {
            return;
        }
        let mut e = [0u64; MAX_LIMBS];
        self.neg(&mut e[..n], b0_inv);
        let mut s = [0u64; MAX_LIMBS];
        for k in 1..outlen {
            let l = k.min(lenb - 1);
            if l == 0 {
                q[k * n..(k + 1) * n].fill(0);
                continue;
            }
            // s = sum_{j=1..l} b[j] * q[k-j]
            let bwin = &b[n..(l + 1) * n];
            let (qdone, qk) = q.split_at_mut(k * n);
            let qwin = &qdone[(k - l) * n..];
            self.vec_dot_rev(&mut s[..n], None, false, bwin, qwin);
            self.mul(&mut qk[..n], &e[..n], &s[..n]);
        }
    }

    /// `q = a / b mod x^outlen`. Requires `b[0]` invertible.
    pub fn poly_div_series(&self, q: &mut [u64], a: &[u64], b: &[u64], outlen: usize) -> Result<()> {
        let n = self.nlimbs();
        debug_assert!(q.len() == outlen * n);
        let lena = a.len() / n;
        let lenb = b.len() / n;
        debug_assert!(lenb >= 1 && outlen >= 1);

        if outlen < self.tuning().inv_series_newton_cutoff {
            let mut b0_inv = [0u64; MAX_LIMBS];
            self.inv(&mut b0_inv[..n], &b[..n])?;
            let mut s = [0u64; MAX_LIMBS];
            for k in 0..outlen {
                let l = k.min(lenb - 1);
                let init = if k < lena { Some(&a[k * n..(k + 1) * n]) } else { None };
                let (qdone, qk) = q.split_at_mut(k * n);
                if l == 0 {
                    match init {
                        Some(ak) => s[..n].copy_from_slice(ak),
                        None => s[..n].fill(0),
                    }
                } else {
                    // s = a[k] - sum_{j=1..l} b[j] * q[k-j]
                    let bwin = &b[n..(l + 1) * n];
                    let qwin = &qdone[(k - l) * n..];
                    self.vec_dot_rev(&mut s[..n], init, true, bwin, qwin);
                }
                self.mul(&mut qk[..n], &b0_inv[..n], &s[..n]);
            }
            return Ok(());
        }

        let mut binv = vec![0u64; outlen * n];
        self.poly_inv_series(&mut binv, b, outlen)?;
        self.poly_mullow(q, &a[..lena.min(outlen) * n], &binv, outlen);
        Ok(())
    }
}
