//! Matrix layer.
//!
//! Matrices are row-major element buffers addressed through `(data, stride)`
//! views so that windows and submatrices are never copies and elimination
//! runs in place. Multiplication dispatches between classical, Waksman,
//! Strassen and multi-modular CRT algorithms; LU between classical, delayed
//! and recursive block variants.

mod charpoly;
mod det;
mod lu;
mod mul_classical;
mod multimod;
mod solve;
mod strassen;
mod waksman;

use crate::error::{Error, Result};
use crate::modulus::ctx::ModCtx;

/// Owned row-major matrix of canonical elements.
#[derive(Clone, Debug)]
pub struct Mat {
    pub(crate) data: Vec<u64>,
    rows: usize,
    cols: usize,
    nlimbs: usize,
}

impl Mat {
    pub fn new(ctx: &ModCtx, rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0u64; rows * cols * ctx.nlimbs()],
            rows,
            cols,
            nlimbs: ctx.nlimbs(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw row-major limb storage.
    pub fn as_slice(&self) -> &[u64] {
        &self.data
    }

    #[inline(always)]
    pub fn entry(&self, i: usize, j: usize) -> &[u64] {
        let n = self.nlimbs;
        &self.data[(i * self.cols + j) * n..(i * self.cols + j + 1) * n]
    }

    #[inline(always)]
    pub fn entry_mut(&mut self, i: usize, j: usize) -> &mut [u64] {
        let n = self.nlimbs;
        &mut self.data[(i * self.cols + j) * n..(i * self.cols + j + 1) * n]
    }

    pub fn as_ref(&self) -> MatRef<'_> {
        MatRef {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
            stride: self.cols,
            nlimbs: self.nlimbs,
        }
    }

    pub fn as_mut(&mut self) -> MatMut<'_> {
        MatMut {
            data: &mut self.data,
            rows: self.rows,
            cols: self.cols,
            stride: self.cols,
            nlimbs: self.nlimbs,
        }
    }

    pub(crate) fn from_ref(src: MatRef<'_>) -> Self {
        let n = src.nlimbs;
        let mut data = vec![0u64; src.rows * src.cols * n];
        for i in 0..src.rows {
            data[i * src.cols * n..(i + 1) * src.cols * n].copy_from_slice(src.row(i));
        }
        Self {
            data,
            rows: src.rows,
            cols: src.cols,
            nlimbs: n,
        }
    }
}

/// Borrowed `(pointer, stride)` view of a matrix.
#[derive(Clone, Copy)]
pub struct MatRef<'a> {
    data: &'a [u64],
    pub rows: usize,
    pub cols: usize,
    pub stride: usize,
    pub(crate) nlimbs: usize,
}

impl<'a> MatRef<'a> {
    pub fn new(data: &'a [u64], rows: usize, cols: usize, stride: usize, nlimbs: usize) -> Self {
        debug_assert!(stride >= cols);
        debug_assert!(rows == 0 || (rows - 1) * stride + cols <= data.len() / nlimbs);
        Self { data, rows, cols, stride, nlimbs }
    }

    #[inline(always)]
    pub fn entry(&self, i: usize, j: usize) -> &'a [u64] {
        debug_assert!(i < self.rows && j < self.cols);
        let n = self.nlimbs;
        &self.data[(i * self.stride + j) * n..(i * self.stride + j + 1) * n]
    }

    /// Contiguous slice of row `i` (`cols` elements).
    #[inline(always)]
    pub fn row(&self, i: usize) -> &'a [u64] {
        debug_assert!(i < self.rows);
        let n = self.nlimbs;
        &self.data[i * self.stride * n..(i * self.stride + self.cols) * n]
    }

    pub fn submatrix(&self, r0: usize, c0: usize, rows: usize, cols: usize) -> MatRef<'a> {
        debug_assert!(r0 + rows <= self.rows && c0 + cols <= self.cols);
        let n = self.nlimbs;
        MatRef {
            data: &self.data[(r0 * self.stride + c0) * n..],
            rows,
            cols,
            stride: self.stride,
            nlimbs: n,
        }
    }
}

/// Mutable `(pointer, stride)` view of a matrix.
pub struct MatMut<'a> {
    data: &'a mut [u64],
    pub rows: usize,
    pub cols: usize,
    pub stride: usize,
    pub(crate) nlimbs: usize,
}

impl<'a> MatMut<'a> {
    pub fn new(data: &'a mut [u64], rows: usize, cols: usize, stride: usize, nlimbs: usize) -> Self {
        debug_assert!(stride >= cols);
        debug_assert!(rows == 0 || (rows - 1) * stride + cols <= data.len() / nlimbs);
        Self { data, rows, cols, stride, nlimbs }
    }

    /// Reborrow with a shorter lifetime.
    pub fn rb(&mut self) -> MatMut<'_> {
        MatMut {
            data: &mut *self.data,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
            nlimbs: self.nlimbs,
        }
    }

    pub fn as_ref(&self) -> MatRef<'_> {
        MatRef {
            data: &*self.data,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
            nlimbs: self.nlimbs,
        }
    }

    #[inline(always)]
    pub fn entry(&self, i: usize, j: usize) -> &[u64] {
        debug_assert!(i < self.rows && j < self.cols);
        let n = self.nlimbs;
        &self.data[(i * self.stride + j) * n..(i * self.stride + j + 1) * n]
    }

    #[inline(always)]
    pub fn entry_mut(&mut self, i: usize, j: usize) -> &mut [u64] {
        debug_assert!(i < self.rows && j < self.cols);
        let n = self.nlimbs;
        &mut self.data[(i * self.stride + j) * n..(i * self.stride + j + 1) * n]
    }

    #[inline(always)]
    pub fn row(&self, i: usize) -> &[u64] {
        debug_assert!(i < self.rows);
        let n = self.nlimbs;
        &self.data[i * self.stride * n..(i * self.stride + self.cols) * n]
    }

    #[inline(always)]
    pub fn row_mut(&mut self, i: usize) -> &mut [u64] {
        debug_assert!(i < self.rows);
        let n = self.nlimbs;
        &mut self.data[i * self.stride * n..(i * self.stride + self.cols) * n]
    }

    /// Disjoint mutable row slices, `i != j`.
    pub fn two_rows_mut(&mut self, i: usize, j: usize) -> (&mut [u64], &mut [u64]) {
        debug_assert!(i != j && i < self.rows && j < self.rows);
        let n = self.nlimbs;
        let (lo, hi) = (i.min(j), i.max(j));
        let (head, tail) = self.data.split_at_mut(hi * self.stride * n);
        let lo_row = &mut head[lo * self.stride * n..(lo * self.stride + self.cols) * n];
        let hi_row = &mut tail[..self.cols * n];
        if i < j {
            (lo_row, hi_row)
        } else {
            (hi_row, lo_row)
        }
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (a, b) = self.two_rows_mut(i, j);
        a.swap_with_slice(b);
    }

    pub fn submatrix_mut(&mut self, r0: usize, c0: usize, rows: usize, cols: usize) -> MatMut<'_> {
        debug_assert!(r0 + rows <= self.rows && c0 + cols <= self.cols);
        let n = self.nlimbs;
        MatMut {
            data: &mut self.data[(r0 * self.stride + c0) * n..],
            rows,
            cols,
            stride: self.stride,
            nlimbs: n,
        }
    }
}

impl ModCtx {
    /// `c = a * b`; the algorithm is picked from the dimensions and the
    /// modulus bit width.
    pub fn mat_mul(&self, c: &mut MatMut<'_>, a: MatRef<'_>, b: MatRef<'_>) -> Result<()> {
        if a.cols != b.rows || c.rows != a.rows || c.cols != b.cols {
            return Err(Error::DimensionMismatch(format!(
                "mat_mul: ({}x{}) * ({}x{}) -> ({}x{})",
                a.rows, a.cols, b.rows, b.cols, c.rows, c.cols
            )));
        }
        debug_assert!(a.nlimbs == self.nlimbs() && b.nlimbs == self.nlimbs());
        let t = self.tuning();
        let dim = a.rows.min(a.cols).min(b.cols);
        if dim < t.mat_mul_waksman_cutoff {
            mul_classical::mat_mul_classical(self, c, a, b);
        } else if dim < t.mat_mul_multimod_cutoff {
            waksman::mat_mul_waksman(self, c, a, b);
        } else if self.modulus_bits() <= t.mat_mul_strassen_bits {
            strassen::mat_mul_strassen(self, c, a, b);
        } else {
            multimod::mat_mul_multimod(self, c, a, b);
        }
        Ok(())
    }

    /// Rank of `a`, by LU on a scratch copy.
    pub fn mat_rank(&self, a: MatRef<'_>) -> Result<usize> {
        let mut work = Mat::from_ref(a);
        let mut perm = vec![0usize; a.rows];
        self.mat_lu(&mut perm, &mut work.as_mut(), false)
    }

    /// Solves `a * x = b` for nonsingular square `a`.
    pub fn mat_nonsingular_solve(
        &self,
        x: &mut MatMut<'_>,
        a: MatRef<'_>,
        b: MatRef<'_>,
    ) -> Result<()> {
        let dim = a.rows;
        if a.cols != dim || b.rows != dim || x.rows != dim || x.cols != b.cols {
            return Err(Error::DimensionMismatch("mat_nonsingular_solve".into()));
        }
        let mut lu = Mat::from_ref(a);
        let mut perm = vec![0usize; dim];
        let rank = self.mat_lu(&mut perm, &mut lu.as_mut(), true)?;
        if rank != dim {
            return Err(Error::Domain("matrix is singular".into()));
        }
        // pb = P * b
        let mut pb = Mat::new(self, dim, b.cols);
        let n = self.nlimbs();
        for i in 0..dim {
            pb.data[i * b.cols * n..(i + 1) * b.cols * n].copy_from_slice(b.row(perm[i]));
        }
        let mut y = Mat::new(self, dim, b.cols);
        self.mat_nonsingular_solve_tril(&mut y.as_mut(), lu.as_ref(), pb.as_ref(), true)?;
        self.mat_nonsingular_solve_triu(x, lu.as_ref(), y.as_ref(), false)?;
        Ok(())
    }
}
