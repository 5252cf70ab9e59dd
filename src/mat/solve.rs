//! Triangular solves by forward/back substitution, one lazy dot per entry.

use crate::error::{Error, Result};
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};
use crate::mat::{MatMut, MatRef};

impl ModCtx {
    /// `x = l^-1 * b` for lower-triangular `l`; with `unit` the diagonal is
    /// taken as 1 and never read.
    pub fn mat_nonsingular_solve_tril(
        &self,
        x: &mut MatMut<'_>,
        l: MatRef<'_>,
        b: MatRef<'_>,
        unit: bool,
    ) -> Result<()> {
        let dim = l.rows;
        if l.cols != dim || b.rows != dim || x.rows != dim || x.cols != b.cols {
            return Err(Error::DimensionMismatch("solve_tril".into()));
        }
        let n = self.nlimbs();
        let mut dinv = vec![0u64; dim * n];
        if !unit {
            for i in 0..dim {
                self.inv(&mut dinv[i * n..(i + 1) * n], l.entry(i, i))?;
            }
        }
        let mut xcol = vec![0u64; dim * n];
        let mut s = [0u64; MAX_LIMBS];
        for c in 0..b.cols {
            for i in 0..dim {
                // s = b[i][c] - sum_{t<i} l[i][t] * x[t][c]
                self.vec_dot(
                    &mut s[..n],
                    Some(b.entry(i, c)),
                    true,
                    &l.row(i)[..i * n],
                    &xcol[..i * n],
                );
                if unit {
                    xcol[i * n..(i + 1) * n].copy_from_slice(&s[..n]);
                } else {
                    self.mul(&mut xcol[i * n..(i + 1) * n], &s[..n], &dinv[i * n..(i + 1) * n]);
                }
                x.entry_mut(i, c).copy_from_slice(&xcol[i * n..(i + 1) * n]);
            }
        }
        Ok(())
    }

    /// `x = u^-1 * b` for upper-triangular `u`.
    pub fn mat_nonsingular_solve_triu(
        &self,
        x: &mut MatMut<'_>,
        u: MatRef<'_>,
        b: MatRef<'_>,
        unit: bool,
    ) -> Result<()> {
        let dim = u.rows;
        if u.cols != dim || b.rows != dim || x.rows != dim || x.cols != b.cols {
            return Err(Error::DimensionMismatch("solve_triu".into()));
        }
        let n = self.nlimbs();
        let mut dinv = vec![0u64; dim * n];
        if !unit {
            for i in 0..dim {
                self.inv(&mut dinv[i * n..(i + 1) * n], u.entry(i, i))?;
            }
        }
        // xrev[q] holds x[dim-1-q][c] so the solved suffix stays contiguous
        let mut xrev = vec![0u64; dim * n];
        let mut s = [0u64; MAX_LIMBS];
        for c in 0..b.cols {
            for i in (0..dim).rev() {
                let solved = dim - 1 - i;
                self.vec_dot_rev(
                    &mut s[..n],
                    Some(b.entry(i, c)),
                    true,
                    &u.row(i)[(i + 1) * n..],
                    &xrev[..solved * n],
                );
                let slot = solved;
                if unit {
                    xrev[slot * n..(slot + 1) * n].copy_from_slice(&s[..n]);
                } else {
                    self.mul(&mut xrev[slot * n..(slot + 1) * n], &s[..n], &dinv[i * n..(i + 1) * n]);
                }
                x.entry_mut(i, c).copy_from_slice(&xrev[slot * n..(slot + 1) * n]);
            }
        }
        Ok(())
    }
}
