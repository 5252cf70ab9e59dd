//! Characteristic polynomial.
//!
//! Berkowitz builds the polynomial division-free through iterated Toeplitz
//! products (expressed as truncated polynomial convolutions), so it works
//! over any modulus. Danilevsky reduces to companion form by similarity
//! transformations and wins for larger matrices, but divides by pivots;
//! when a pivot is not invertible the dispatcher falls back to Berkowitz.

use crate::error::{Error, Result};
use crate::mat::{Mat, MatRef};
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

impl ModCtx {
    /// Monic characteristic polynomial of `a`, ascending coefficients
    /// (`dim + 1` of them) in `dst`.
    pub fn mat_charpoly(&self, dst: &mut [u64], a: MatRef<'_>) -> Result<()> {
        let n = self.nlimbs();
        if a.rows != a.cols {
            return Err(Error::DimensionMismatch("mat_charpoly: square matrix required".into()));
        }
        let dim = a.rows;
        debug_assert!(dst.len() == (dim + 1) * n);
        if dim <= self.tuning().charpoly_danilevsky_cutoff {
            let p = self.charpoly_berkowitz(a);
            dst.copy_from_slice(&p);
            return Ok(());
        }
        match self.charpoly_danilevsky(a) {
            Ok(p) => {
                dst.copy_from_slice(&p);
                Ok(())
            }
            Err(Error::NotInvertible) => {
                let p = self.charpoly_berkowitz(a);
                dst.copy_from_slice(&p);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Ascending coefficients, `dim + 1` elements, leading coefficient 1.
    pub(crate) fn charpoly_berkowitz(&self, a: MatRef<'_>) -> Vec<u64> {
        let n = self.nlimbs();
        let dim = a.rows;
        // `poly[j]` is the coefficient of x^(k-j) for the leading k x k minor
        let mut poly = vec![0u64; n];
        self.one(&mut poly[..n]);
        let mut s = [0u64; MAX_LIMBS];
        for k in 1..=dim {
            // column vector of the Toeplitz factor:
            // 1, -a[k-1][k-1], -(r * s), -(r * m * s), ..., with
            // r = row k-1, s = column k-1, m = leading (k-1) minor
            let mut cvec = vec![0u64; (k + 1) * n];
            self.one(&mut cvec[..n]);
            self.neg(&mut s[..n], a.entry(k - 1, k - 1));
            cvec[n..2 * n].copy_from_slice(&s[..n]);
            if k >= 2 {
                let mut rvec = vec![0u64; (k - 1) * n];
                for t in 0..k - 1 {
                    rvec[t * n..(t + 1) * n].copy_from_slice(a.entry(k - 1, t));
                }
                let mut v = vec![0u64; (k - 1) * n];
                for t in 0..k - 1 {
                    v[t * n..(t + 1) * n].copy_from_slice(a.entry(t, k - 1));
                }
                let mut vnext = vec![0u64; (k - 1) * n];
                for j in 2..=k {
                    self.vec_dot(&mut s[..n], None, true, &rvec, &v);
                    cvec[j * n..(j + 1) * n].copy_from_slice(&s[..n]);
                    if j < k {
                        for t in 0..k - 1 {
                            let row = a.submatrix(t, 0, 1, k - 1);
                            self.vec_dot(&mut s[..n], None, false, row.row(0), &v);
                            vnext[t * n..(t + 1) * n].copy_from_slice(&s[..n]);
                        }
                        core::mem::swap(&mut v, &mut vnext);
                    }
                }
            }
            // Toeplitz multiply == truncated convolution
            let mut next = vec![0u64; (k + 1) * n];
            self.poly_mullow(&mut next, &cvec, &poly, k + 1);
            poly = next;
        }
        // descending to ascending
        let mut out = vec![0u64; (dim + 1) * n];
        for j in 0..=dim {
            out[j * n..(j + 1) * n].copy_from_slice(&poly[(dim - j) * n..(dim - j + 1) * n]);
        }
        out
    }

    /// Companion-form reduction. Returns ascending coefficients or
    /// `NotInvertible` if a pivot cannot be divided by.
    fn charpoly_danilevsky(&self, a: MatRef<'_>) -> Result<Vec<u64>> {
        let n = self.nlimbs();
        let dim = a.rows;
        let mut m = Mat::from_ref(a);
        // factors of the characteristic polynomial from split-off blocks
        let mut factors: Vec<Vec<u64>> = Vec::new();
        let mut na = dim;

        let mut v = vec![0u64; dim * n];
        let mut t = [0u64; MAX_LIMBS];
        let mut pinv = [0u64; MAX_LIMBS];
        while na > 1 {
            let k = na - 1;
            if self.is_zero(m.entry(k, k - 1)) {
                // look left for a usable pivot
                let mut found = None;
                for j in 0..k - 1 {
                    if !self.is_zero(m.entry(k, j)) {
                        found = Some(j);
                        break;
                    }
                }
                match found {
                    Some(j) => {
                        // simultaneous row and column swap keeps similarity
                        swap_rows_cols(self, &mut m, j, k - 1, na);
                    }
                    None => {
                        // rows k..na already form a companion block: split it
                        factors.push(companion_block_poly(self, &m, k, na));
                        na = k;
                        continue;
                    }
                }
            }
            self.inv(&mut pinv[..n], m.entry(k, k - 1))?;
            // save row k before the column operations rewrite it
            v[..na * n].copy_from_slice(m.as_ref().submatrix(k, 0, 1, na).row(0));

            // column ops: col[k-1] *= pinv, col[j] -= v[j] * col[k-1]
            for i in 0..na {
                self.mul(&mut t[..n], m.entry(i, k - 1), &pinv[..n]);
                m.entry_mut(i, k - 1).copy_from_slice(&t[..n]);
            }
            for j in 0..na {
                if j == k - 1 || self.is_zero(&v[j * n..(j + 1) * n]) {
                    continue;
                }
                for i in 0..na {
                    let mut prod = [0u64; MAX_LIMBS];
                    self.mul(&mut prod[..n], m.entry(i, k - 1), &v[j * n..(j + 1) * n]);
                    self.sub_assign(m.entry_mut(i, j), &prod[..n]);
                }
            }
            // row op: row[k-1] = v * M
            let mut newrow = vec![0u64; na * n];
            for j in 0..na {
                let mut col = vec![0u64; na * n];
                for i in 0..na {
                    col[i * n..(i + 1) * n].copy_from_slice(m.entry(i, j));
                }
                self.vec_dot(&mut t[..n], None, false, &v[..na * n], &col);
                newrow[j * n..(j + 1) * n].copy_from_slice(&t[..n]);
            }
            for j in 0..na {
                m.entry_mut(k - 1, j).copy_from_slice(&newrow[j * n..(j + 1) * n]);
            }
            // row k is now the unit vector e_{k-1}
            for j in 0..na {
                let e = if j == k - 1 { 1u64 } else { 0 };
                let cell = m.entry_mut(k, j);
                cell.fill(0);
                cell[0] = e;
            }
            na -= 1;
        }
        // the remaining 1x1 (or 0x0) leading block
        if na == 1 {
            factors.push(companion_block_poly(self, &m, 0, 1));
        }
        // multiply the factors together
        let mut acc = vec![0u64; n];
        self.one(&mut acc[..n]);
        for f in &factors {
            let la = acc.len() / n;
            let lf = f.len() / n;
            let mut next = vec![0u64; (la + lf - 1) * n];
            self.poly_mullow(&mut next, &acc, f, la + lf - 1);
            acc = next;
        }
        debug_assert!(acc.len() == (dim + 1) * n);
        Ok(acc)
    }
}

/// Characteristic polynomial of the companion block in rows/cols `k..na`:
/// row `k` holds the coefficient row `(c_0, ..., c_{d-1})`, the subdiagonal
/// below it is 1, and the polynomial is
/// `x^d - c_0 x^(d-1) - c_1 x^(d-2) - ... - c_{d-1}`.
fn companion_block_poly(ctx: &ModCtx, m: &Mat, k: usize, na: usize) -> Vec<u64> {
    let n = ctx.nlimbs();
    let d = na - k;
    let mut p = vec![0u64; (d + 1) * n];
    ctx.one(&mut p[d * n..]);
    for j in 0..d {
        // coefficient of x^(d-1-jj) is -m[k][k+jj] for jj over block columns
        let mut t = [0u64; MAX_LIMBS];
        ctx.neg(&mut t[..n], m.entry(k, k + j));
        p[(d - 1 - j) * n..(d - j) * n].copy_from_slice(&t[..n]);
    }
    p
}

fn swap_rows_cols(ctx: &ModCtx, m: &mut Mat, i: usize, j: usize, na: usize) {
    let n = ctx.nlimbs();
    let cols = m.cols();
    for c in 0..na {
        for l in 0..n {
            m.data.swap((i * cols + c) * n + l, (j * cols + c) * n + l);
        }
    }
    for r in 0..na {
        for l in 0..n {
            m.data.swap((r * cols + i) * n + l, (r * cols + j) * n + l);
        }
    }
}
