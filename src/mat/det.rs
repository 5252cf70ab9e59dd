//! Determinant.
//!
//! Cofactor expansion for the smallest matrices, division-free Berkowitz for
//! the next band and as the fallback whenever LU meets a non-invertible
//! pivot, LU with a permutation sign otherwise.

use crate::error::{Error, Result};
use crate::mat::{Mat, MatRef};
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

impl ModCtx {
    pub fn mat_det(&self, dst: &mut [u64], a: MatRef<'_>) -> Result<()> {
        let n = self.nlimbs();
        debug_assert!(dst.len() == n);
        if a.rows != a.cols {
            return Err(Error::DimensionMismatch("mat_det: square matrix required".into()));
        }
        let dim = a.rows;
        if dim == 0 {
            self.one(dst);
            return Ok(());
        }
        if dim <= 4 {
            det_cofactor(self, dst, a);
            return Ok(());
        }
        if dim <= 5 {
            return self.det_berkowitz(dst, a);
        }
        match self.det_lu(dst, a) {
            Err(Error::NotInvertible) => self.det_berkowitz(dst, a),
            other => other,
        }
    }

    fn det_lu(&self, dst: &mut [u64], a: MatRef<'_>) -> Result<()> {
        let n = self.nlimbs();
        let dim = a.rows;
        let mut work = Mat::from_ref(a);
        let mut perm = vec![0usize; dim];
        let rank = self.mat_lu(&mut perm, &mut work.as_mut(), false)?;
        if rank < dim {
            self.zero(dst);
            return Ok(());
        }
        let mut det = [0u64; MAX_LIMBS];
        self.one(&mut det[..n]);
        for i in 0..dim {
            self.mul_assign(&mut det[..n], work.entry(i, i));
        }
        if perm_sign(&perm) < 0 {
            self.neg_assign(&mut det[..n]);
        }
        dst.copy_from_slice(&det[..n]);
        Ok(())
    }

    fn det_berkowitz(&self, dst: &mut [u64], a: MatRef<'_>) -> Result<()> {
        let n = self.nlimbs();
        let dim = a.rows;
        let charpoly = self.charpoly_berkowitz(a);
        // det = (-1)^dim * p(0)
        dst.copy_from_slice(&charpoly[..n]);
        if dim % 2 == 1 {
            self.neg_assign(dst);
        }
        Ok(())
    }
}

/// Parity of the permutation, from its cycle decomposition.
pub(crate) fn perm_sign(perm: &[usize]) -> i32 {
    let mut seen = vec![false; perm.len()];
    let mut sign = 1;
    for start in 0..perm.len() {
        if seen[start] {
            continue;
        }
        let mut len = 0;
        let mut i = start;
        while !seen[i] {
            seen[i] = true;
            i = perm[i];
            len += 1;
        }
        if len % 2 == 0 {
            sign = -sign;
        }
    }
    sign
}

/// Recursive expansion along the first row; only used for `dim <= 4`.
fn det_cofactor(ctx: &ModCtx, dst: &mut [u64], a: MatRef<'_>) {
    let n = ctx.nlimbs();
    let dim = a.rows;
    if dim == 1 {
        dst.copy_from_slice(a.entry(0, 0));
        return;
    }
    let mut acc = [0u64; MAX_LIMBS];
    let mut minor_det = [0u64; MAX_LIMBS];
    let mut term = [0u64; MAX_LIMBS];
    for j in 0..dim {
        let minor = minor_without(ctx, a, 0, j);
        det_cofactor(ctx, &mut minor_det[..n], minor.as_ref());
        ctx.mul(&mut term[..n], a.entry(0, j), &minor_det[..n]);
        if j % 2 == 0 {
            ctx.add_assign(&mut acc[..n], &term[..n]);
        } else {
            ctx.sub_assign(&mut acc[..n], &term[..n]);
        }
    }
    dst.copy_from_slice(&acc[..n]);
}

fn minor_without(ctx: &ModCtx, a: MatRef<'_>, row: usize, col: usize) -> Mat {
    let dim = a.rows;
    let mut m = Mat::new(ctx, dim - 1, dim - 1);
    let mut di = 0;
    for i in 0..dim {
        if i == row {
            continue;
        }
        let mut dj = 0;
        for j in 0..dim {
            if j == col {
                continue;
            }
            m.entry_mut(di, dj).copy_from_slice(a.entry(i, j));
            dj += 1;
        }
        di += 1;
    }
    m
}
