//! Polynomial layer.
//!
//! Polynomials are coefficient vectors (length in elements implied by the
//! slice length); the coefficient count is explicit at the call sites that
//! care about normalized length. Multiplication dispatches between three
//! algorithms that agree bit for bit; division between a delayed-reduction
//! basecase and a Newton preinverse path.

mod classical;
mod divrem;
mod gcd;
mod karatsuba;
mod kronecker;
mod series;

use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

impl ModCtx {
    /// Truncated product: `r = a * b mod x^outlen`.
    ///
    /// `r` holds `outlen` coefficients; coefficients past `len(a)+len(b)-1`
    /// are zeroed.
    pub fn poly_mullow(&self, r: &mut [u64], a: &[u64], b: &[u64], outlen: usize) {
        let n = self.nlimbs();
        debug_assert!(r.len() == outlen * n);
        let lena = a.len() / n;
        let lenb = b.len() / n;
        if lena == 0 || lenb == 0 || outlen == 0 {
            r.fill(0);
            return;
        }
        let short = lena.min(lenb);
        let sqr = core::ptr::eq(a.as_ptr(), b.as_ptr()) && lena == lenb;
        let t = self.tuning();
        let kara_cutoff = if sqr {
            t.sqr_karatsuba_cutoff[n - 1]
        } else {
            t.mul_karatsuba_cutoff[n - 1]
        };
        if short >= t.mul_ks_cutoff {
            kronecker::mullow_ks(self, r, a, b, outlen);
        } else if lena == lenb && lena >= kara_cutoff {
            karatsuba::mullow_karatsuba(self, r, a, b, outlen, sqr);
        } else {
            classical::mullow_classical(self, r, a, b, outlen);
        }
    }

    /// Truncated square, using the squaring cutoff row.
    pub fn poly_sqrlow(&self, r: &mut [u64], a: &[u64], outlen: usize) {
        // `poly_mullow` detects the shared operand
        let a2: &[u64] = a;
        self.poly_mullow(r, a, a2, outlen);
    }

    /// Horner evaluation of the polynomial at `x`.
    pub fn poly_evaluate(&self, r: &mut [u64], poly: &[u64], x: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && x.len() == n);
        let len = poly.len() / n;
        let mut acc = [0u64; MAX_LIMBS];
        for i in (0..len).rev() {
            let mut t = [0u64; MAX_LIMBS];
            self.mul(&mut t[..n], &acc[..n], x);
            self.add(&mut acc[..n], &t[..n], &poly[i * n..(i + 1) * n]);
        }
        r.copy_from_slice(&acc[..n]);
    }
}

pub(crate) fn trimmed_len(ctx: &ModCtx, v: &[u64]) -> usize {
    let n = ctx.nlimbs();
    let mut len = v.len() / n;
    while len > 0 && crate::limb::is_zero_n(&v[(len - 1) * n..len * n]) {
        len -= 1;
    }
    len
}
