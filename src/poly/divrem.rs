//! Polynomial division.
//!
//! The basecase walks the dividend high to low, keeping every working
//! coefficient in a `2n+1`-limb accumulator; the quotient-times-divisor
//! subtraction is realized as addition of the negated divisor so the
//! accumulators stay nonnegative and are reduced exactly once each.

use crate::error::{Error, Result};
use crate::limb;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

impl ModCtx {
    /// `a = q * b + r` with `deg r < deg b`.
    ///
    /// `q` must hold `len(a) - len(b) + 1` coefficients (0 when
    /// `len(a) < len(b)`), `r` must hold `len(b) - 1`. The leading
    /// coefficient of `b` must be nonzero; `NotInvertible` propagates from
    /// inverting it over a non-field modulus.
    pub fn poly_divrem(&self, q: &mut [u64], r: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
        let n = self.nlimbs();
        let lena = a.len() / n;
        let lenb = b.len() / n;
        if lenb == 0 || self.is_zero(&b[(lenb - 1) * n..]) {
            return Err(Error::Domain(
                "division requires a nonzero leading coefficient".into(),
            ));
        }
        if lena < lenb {
            debug_assert!(q.is_empty());
            r[..a.len()].copy_from_slice(a);
            r[a.len()..].fill(0);
            return Ok(());
        }
        let qlen = lena - lenb + 1;
        debug_assert!(q.len() == qlen * n && r.len() == (lenb - 1) * n);

        let mut lead_inv = [0u64; MAX_LIMBS];
        self.inv(&mut lead_inv[..n], &b[(lenb - 1) * n..])?;

        if lenb == 1 {
            self.vec_mul_scalar(q, a, &lead_inv[..n]);
            return Ok(());
        }
        if qlen == 1 {
            // closed form: q0 = lead(a) / lead(b), r = a - q0 * b
            let mut q0 = [0u64; MAX_LIMBS];
            self.mul(&mut q0[..n], &a[(lena - 1) * n..], &lead_inv[..n]);
            q.copy_from_slice(&q0[..n]);
            r.copy_from_slice(&a[..(lenb - 1) * n]);
            self.vec_submul_scalar(r, &b[..(lenb - 1) * n], &q0[..n]);
            return Ok(());
        }
        if qlen >= self.tuning().divrem_newton_cutoff {
            return self.divrem_newton(q, r, a, b);
        }
        self.divrem_basecase(q, r, a, b, &lead_inv[..n]);
        Ok(())
    }

    /// Quotient only.
    pub fn poly_div(&self, q: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
        let n = self.nlimbs();
        let lenb = b.len() / n;
        let mut r = vec![0u64; lenb.saturating_sub(1) * n];
        self.poly_divrem(q, &mut r, a, b)
    }

    fn divrem_basecase(&self, q: &mut [u64], r: &mut [u64], a: &[u64], b: &[u64], lead_inv: &[u64]) {
        let n = self.nlimbs();
        let lena = a.len() / n;
        let lenb = b.len() / n;
        let w = 2 * n + 1;

        let mut scratch = crate::scratch::ScratchOwned::new(lena * w + (lenb - 1) * n);
        let mut scratch = scratch.borrow();
        let work = scratch.take(lena * w);
        let negb = scratch.take((lenb - 1) * n);
        for i in 0..lena {
            work[i * w..i * w + n].copy_from_slice(&a[i * n..(i + 1) * n]);
        }
        for j in 0..lenb - 1 {
            let (dst, src) = (&mut negb[j * n..(j + 1) * n], &b[j * n..(j + 1) * n]);
            self.neg(dst, src);
        }

        let mut red = [0u64; MAX_LIMBS];
        let mut qi = [0u64; MAX_LIMBS];
        let mut p = [0u64; 2 * MAX_LIMBS];
        for i in (lenb - 1..lena).rev() {
            self.reduce_wide(&mut red[..n], &work[i * w..(i + 1) * w]);
            self.mul(&mut qi[..n], &red[..n], lead_inv);
            let qpos = i - lenb + 1;
            q[qpos * n..(qpos + 1) * n].copy_from_slice(&qi[..n]);
            if limb::is_zero_n(&qi[..n]) {
                continue;
            }
            for j in 0..lenb - 1 {
                let nb = &negb[j * n..(j + 1) * n];
                if limb::is_zero_n(nb) {
                    continue;
                }
                limb::mul_basecase(&mut p[..2 * n], &qi[..n], nb);
                let cy = limb::add_n_assign(&mut work[(qpos + j) * w..(qpos + j + 1) * w], &p[..2 * n]);
                debug_assert!(cy == 0);
            }
        }
        for j in 0..lenb - 1 {
            self.reduce_wide(&mut r[j * n..(j + 1) * n], &work[j * w..(j + 1) * w]);
        }
    }

    /// Division by power series inversion of the reversed divisor.
    fn divrem_newton(&self, q: &mut [u64], r: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
        let n = self.nlimbs();
        let lena = a.len() / n;
        let lenb = b.len() / n;
        let qlen = lena - lenb + 1;

        let arev = reverse_coeffs(a, lena, n);
        let brev = reverse_coeffs(b, lenb, n);
        let mut qrev = vec![0u64; qlen * n];
        self.poly_div_series(
            &mut qrev,
            &arev[..lena.min(qlen) * n],
            &brev[..lenb.min(qlen) * n],
            qlen,
        )?;
        let qr = reverse_coeffs(&qrev, qlen, n);
        q.copy_from_slice(&qr);

        if lenb > 1 {
            let mut t = vec![0u64; (lenb - 1) * n];
            self.poly_mullow(&mut t, q, b, lenb - 1);
            self.vec_sub(r, &a[..(lenb - 1) * n], &t);
        }
        Ok(())
    }
}

fn reverse_coeffs(v: &[u64], len: usize, n: usize) -> Vec<u64> {
    let mut out = vec![0u64; len * n];
    for i in 0..len {
        out[i * n..(i + 1) * n].copy_from_slice(&v[(len - 1 - i) * n..(len - i) * n]);
    }
    out
}
