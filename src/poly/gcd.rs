//! Euclidean gcd and extended gcd.
//!
//! The remainder sequence runs through `poly_divrem`, so every leading
//! coefficient inversion can surface `NotInvertible` over a non-field
//! modulus; the result is normalized monic.

use crate::error::Result;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};
use crate::poly::trimmed_len;

impl ModCtx {
    /// Monic gcd of `a` and `b` as an owned coefficient vector
    /// (empty for gcd(0, 0)).
    pub fn poly_gcd(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        let n = self.nlimbs();
        let mut f = a[..trimmed_len(self, a) * n].to_vec();
        let mut g = b[..trimmed_len(self, b) * n].to_vec();
        while !g.is_empty() {
            let (_q, r) = self.divrem_trimmed(&f, &g)?;
            f = g;
            g = r;
        }
        self.make_monic(&mut f)?;
        Ok(f)
    }

    /// Extended gcd: returns `(g, u, v)` with `u*a + v*b == g`, `g` monic.
    pub fn poly_xgcd(&self, a: &[u64], b: &[u64]) -> Result<(Vec<u64>, Vec<u64>, Vec<u64>)> {
        let n = self.nlimbs();
        let mut r0 = a[..trimmed_len(self, a) * n].to_vec();
        let mut r1 = b[..trimmed_len(self, b) * n].to_vec();
        let mut s0 = self.poly_one();
        let mut s1: Vec<u64> = Vec::new();
        let mut t0: Vec<u64> = Vec::new();
        let mut t1 = self.poly_one();

        while !r1.is_empty() {
            let (q, r2) = self.divrem_trimmed(&r0, &r1)?;
            let s2 = self.poly_sub_vec(&s0, &self.poly_mul_vec(&q, &s1));
            let t2 = self.poly_sub_vec(&t0, &self.poly_mul_vec(&q, &t1));
            r0 = core::mem::replace(&mut r1, r2);
            s0 = core::mem::replace(&mut s1, s2);
            t0 = core::mem::replace(&mut t1, t2);
        }

        // scale all three by the inverse leading coefficient of g
        if !r0.is_empty() {
            let len = r0.len() / n;
            let mut lead_inv = [0u64; MAX_LIMBS];
            self.inv(&mut lead_inv[..n], &r0[(len - 1) * n..])?;
            let src = r0.clone();
            self.vec_mul_scalar(&mut r0, &src, &lead_inv[..n]);
            let src = s0.clone();
            self.vec_mul_scalar(&mut s0, &src, &lead_inv[..n]);
            let src = t0.clone();
            self.vec_mul_scalar(&mut t0, &src, &lead_inv[..n]);
        }
        Ok((r0, s0, t0))
    }

    fn poly_one(&self) -> Vec<u64> {
        let n = self.nlimbs();
        let mut v = vec![0u64; n];
        self.one(&mut v);
        v
    }

    /// Full product of two owned polynomials (empty inputs allowed).
    fn poly_mul_vec(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let n = self.nlimbs();
        let la = a.len() / n;
        let lb = b.len() / n;
        if la == 0 || lb == 0 {
            return Vec::new();
        }
        let mut out = vec![0u64; (la + lb - 1) * n];
        self.poly_mullow(&mut out, a, b, la + lb - 1);
        out
    }

    /// `a - b` with trailing zeros trimmed.
    fn poly_sub_vec(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let n = self.nlimbs();
        let la = a.len() / n;
        let lb = b.len() / n;
        let lo = la.max(lb);
        let mut out = vec![0u64; lo * n];
        out[..a.len()].copy_from_slice(a);
        for j in 0..lb {
            let mut t = [0u64; MAX_LIMBS];
            t[..n].copy_from_slice(&out[j * n..(j + 1) * n]);
            self.sub(&mut out[j * n..(j + 1) * n], &t[..n], &b[j * n..(j + 1) * n]);
        }
        out.truncate(trimmed_len(self, &out) * n);
        out
    }

    fn divrem_trimmed(&self, a: &[u64], b: &[u64]) -> Result<(Vec<u64>, Vec<u64>)> {
        let n = self.nlimbs();
        let la = a.len() / n;
        let lb = b.len() / n;
        debug_assert!(lb >= 1);
        if la < lb {
            return Ok((Vec::new(), a.to_vec()));
        }
        let mut q = vec![0u64; (la - lb + 1) * n];
        let mut r = vec![0u64; (lb - 1) * n];
        self.poly_divrem(&mut q, &mut r, a, b)?;
        r.truncate(trimmed_len(self, &r) * n);
        Ok((q, r))
    }

    fn make_monic(&self, f: &mut Vec<u64>) -> Result<()> {
        let n = self.nlimbs();
        if f.is_empty() {
            return Ok(());
        }
        let len = f.len() / n;
        let mut lead_inv = [0u64; MAX_LIMBS];
        self.inv(&mut lead_inv[..n], &f[(len - 1) * n..])?;
        let src = f.clone();
        self.vec_mul_scalar(f, &src, &lead_inv[..n]);
        Ok(())
    }
}
