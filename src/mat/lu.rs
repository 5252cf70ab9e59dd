//! LU decomposition with partial pivoting.
//!
//! All variants store the multipliers below the diagonal and U on and above
//! it, permuting rows in place and mirroring every swap in `perm`, so that
//! `(P*A)[i] = A[perm[i]] = (L*U)[i]`.
//!
//! Pivot search takes the first nonzero entry below the diagonal. With
//! `rank_check` a missing pivot aborts immediately with a reported rank of
//! zero; a pivot that is nonzero but not invertible over a non-field modulus
//! surfaces `NotInvertible`.

use crate::error::Result;
use crate::limb;
use crate::mat::{Mat, MatMut};
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

impl ModCtx {
    /// Decomposes `a` in place, returning the rank.
    pub fn mat_lu(&self, perm: &mut [usize], a: &mut MatMut<'_>, rank_check: bool) -> Result<usize> {
        debug_assert!(perm.len() == a.rows);
        for (i, p) in perm.iter_mut().enumerate() {
            *p = i;
        }
        self.lu_dispatch(perm, a, rank_check)
    }

    fn lu_dispatch(&self, perm: &mut [usize], a: &mut MatMut<'_>, rank_check: bool) -> Result<usize> {
        let n = self.nlimbs();
        let d = a.rows.min(a.cols);
        let t = self.tuning();
        if d < t.mat_lu_delayed_cutoff[n - 1] {
            lu_classical(self, perm, a, rank_check)
        } else if d < t.mat_lu_recursive_cutoff {
            lu_delayed(self, perm, a, rank_check)
        } else {
            lu_recursive(self, perm, a, rank_check)
        }
    }
}

fn lu_classical(
    ctx: &ModCtx,
    perm: &mut [usize],
    a: &mut MatMut<'_>,
    rank_check: bool,
) -> Result<usize> {
    let n = ctx.nlimbs();
    let m = a.rows;
    let ncols = a.cols;
    let mut row = 0;
    let mut col = 0;
    while row < m && col < ncols {
        let mut piv = None;
        for r in row..m {
            if !ctx.is_zero(a.entry(r, col)) {
                piv = Some(r);
                break;
            }
        }
        let piv = match piv {
            None => {
                if rank_check {
                    return Ok(0);
                }
                col += 1;
                continue;
            }
            Some(p) => p,
        };
        if piv != row {
            a.swap_rows(piv, row);
            perm.swap(piv, row);
        }
        let mut pinv = [0u64; MAX_LIMBS];
        ctx.inv(&mut pinv[..n], a.entry(row, col))?;
        for r2 in row + 1..m {
            let mut f = [0u64; MAX_LIMBS];
            ctx.mul(&mut f[..n], a.entry(r2, col), &pinv[..n]);
            a.entry_mut(r2, col).copy_from_slice(&f[..n]);
            if limb::is_zero_n(&f[..n]) || col + 1 == ncols {
                continue;
            }
            let (prow, r2row) = a.two_rows_mut(row, r2);
            let tail = (col + 1) * n;
            ctx.vec_submul_scalar(&mut r2row[tail..], &prow[tail..], &f[..n]);
        }
        row += 1;
        col += 1;
    }
    Ok(row)
}

/// Trailing submatrix kept in `2n+1`-limb accumulators; a column is reduced
/// to canonical form only when it is about to be searched for a pivot, so
/// each elimination step costs one unreduced multiply-add per entry instead
/// of a multiply-and-reduce.
fn lu_delayed(
    ctx: &ModCtx,
    perm: &mut [usize],
    a: &mut MatMut<'_>,
    rank_check: bool,
) -> Result<usize> {
    let n = ctx.nlimbs();
    let w = 2 * n + 1;
    let m = a.rows;
    let ncols = a.cols;

    let mut scratch = crate::scratch::ScratchOwned::new(m * ncols * w + 2 * ncols * n);
    let mut scratch = scratch.borrow();
    let work = scratch.take(m * ncols * w);
    let urow = scratch.take(ncols * n);
    let negu = scratch.take(ncols * n);
    for i in 0..m {
        for j in 0..ncols {
            work[(i * ncols + j) * w..(i * ncols + j) * w + n].copy_from_slice(a.entry(i, j));
        }
    }

    let mut row = 0;
    let mut col = 0;
    let mut red = [0u64; MAX_LIMBS];
    while row < m && col < ncols {
        // canonicalize the pivot column for the search
        for r in row..m {
            let cell = &mut work[(r * ncols + col) * w..(r * ncols + col + 1) * w];
            ctx.reduce_wide(&mut red[..n], cell);
            cell.fill(0);
            cell[..n].copy_from_slice(&red[..n]);
        }
        let mut piv = None;
        for r in row..m {
            if !limb::is_zero_n(&work[(r * ncols + col) * w..(r * ncols + col) * w + n]) {
                piv = Some(r);
                break;
            }
        }
        let piv = match piv {
            None => {
                if rank_check {
                    return Ok(0);
                }
                col += 1;
                continue;
            }
            Some(p) => p,
        };
        if piv != row {
            for j in 0..ncols {
                let (lo, hi) = (row.min(piv), row.max(piv));
                let (head, tail) = work.split_at_mut((hi * ncols + j) * w);
                head[(lo * ncols + j) * w..(lo * ncols + j + 1) * w]
                    .swap_with_slice(&mut tail[..w]);
            }
            perm.swap(piv, row);
        }
        // the pivot row becomes a U row: canonicalize and cache its negation
        for j in col..ncols {
            let cell = &mut work[(row * ncols + j) * w..(row * ncols + j + 1) * w];
            ctx.reduce_wide(&mut red[..n], cell);
            cell.fill(0);
            cell[..n].copy_from_slice(&red[..n]);
            urow[j * n..(j + 1) * n].copy_from_slice(&red[..n]);
        }
        for j in col + 1..ncols {
            let (u, g) = (&urow[j * n..(j + 1) * n], &mut negu[j * n..(j + 1) * n]);
            ctx.neg(g, u);
        }
        let mut pinv = [0u64; MAX_LIMBS];
        ctx.inv(&mut pinv[..n], &urow[col * n..(col + 1) * n])?;

        let mut f = [0u64; MAX_LIMBS];
        let mut prod = [0u64; 2 * MAX_LIMBS];
        for r2 in row + 1..m {
            let cell = &work[(r2 * ncols + col) * w..(r2 * ncols + col) * w + n];
            let mut lead = [0u64; MAX_LIMBS];
            lead[..n].copy_from_slice(cell);
            ctx.mul(&mut f[..n], &lead[..n], &pinv[..n]);
            let cell = &mut work[(r2 * ncols + col) * w..(r2 * ncols + col + 1) * w];
            cell.fill(0);
            cell[..n].copy_from_slice(&f[..n]);
            if limb::is_zero_n(&f[..n]) {
                continue;
            }
            // trailing update: acc += f * (m - u), congruent to acc - f*u
            for j in col + 1..ncols {
                let g = &negu[j * n..(j + 1) * n];
                if limb::is_zero_n(g) {
                    continue;
                }
                limb::mul_basecase(&mut prod[..2 * n], &f[..n], g);
                let cell = &mut work[(r2 * ncols + j) * w..(r2 * ncols + j + 1) * w];
                let cy = limb::add_n_assign(cell, &prod[..2 * n]);
                debug_assert!(cy == 0);
            }
        }
        row += 1;
        col += 1;
    }

    // drain every accumulator back to canonical entries
    for i in 0..m {
        for j in 0..ncols {
            ctx.reduce_wide(&mut red[..n], &work[(i * ncols + j) * w..(i * ncols + j + 1) * w]);
            a.entry_mut(i, j).copy_from_slice(&red[..n]);
        }
    }
    Ok(row)
}

/// Block-recursive LU: eliminate the left half, solve the panel against the
/// unit-lower factor, update the Schur complement with a full matrix product,
/// recurse on it. Falls back to the delayed variant when the left half is
/// rank deficient.
fn lu_recursive(
    ctx: &ModCtx,
    perm: &mut [usize],
    a: &mut MatMut<'_>,
    rank_check: bool,
) -> Result<usize> {
    let n = ctx.nlimbs();
    let m = a.rows;
    let ncols = a.cols;
    let n1 = ncols / 2;
    if n1 == 0 || m <= 1 {
        return lu_delayed(ctx, perm, a, rank_check);
    }

    let backup = Mat::from_ref(a.as_ref());
    let perm_backup = perm.to_vec();

    let r1 = {
        let mut left = a.submatrix_mut(0, 0, m, n1);
        ctx.lu_dispatch(perm, &mut left, false)?
    };
    if r1 < n1 {
        if rank_check {
            return Ok(0);
        }
        // restore and run the flat algorithm on the whole matrix
        for i in 0..m {
            a.row_mut(i).copy_from_slice(backup.as_ref().row(i));
        }
        perm.copy_from_slice(&perm_backup);
        return lu_delayed(ctx, perm, a, rank_check);
    }

    // replay the left half's row permutation on the right half
    let pi = relative_perm(&perm_backup, perm);
    apply_row_perm(ctx, &mut a.submatrix_mut(0, n1, m, ncols - n1), &pi);

    // A01 <- L00^-1 * A01 (unit lower triangular, forward substitution)
    {
        let mut top = a.submatrix_mut(0, 0, r1, ncols);
        for i in 1..r1 {
            for t in 0..i {
                let mut f = [0u64; MAX_LIMBS];
                f[..n].copy_from_slice(top.entry(i, t));
                if limb::is_zero_n(&f[..n]) {
                    continue;
                }
                let (trow, irow) = top.two_rows_mut(t, i);
                ctx.vec_submul_scalar(&mut irow[n1 * n..], &trow[n1 * n..], &f[..n]);
            }
        }
    }

    // A11 -= A10 * A01
    if m > r1 {
        let a10 = Mat::from_ref(a.as_ref().submatrix(r1, 0, m - r1, r1));
        let a01 = Mat::from_ref(a.as_ref().submatrix(0, n1, r1, ncols - n1));
        let mut prod = Mat::new(ctx, m - r1, ncols - n1);
        ctx.mat_mul(&mut prod.as_mut(), a10.as_ref(), a01.as_ref())?;
        let mut a11 = a.submatrix_mut(r1, n1, m - r1, ncols - n1);
        for i in 0..m - r1 {
            let r = a11.row_mut(i);
            ctx.vec_sub_assign(r, prod.as_ref().row(i));
        }

        // recurse on the Schur complement
        let perm_mid = perm[r1..].to_vec();
        let r2 = {
            let mut low = a.submatrix_mut(r1, n1, m - r1, ncols - n1);
            ctx.lu_dispatch(&mut perm[r1..], &mut low, false)?
        };
        if rank_check && r2 < (m - r1).min(ncols - n1) {
            return Ok(0);
        }
        // replay the bottom permutation on the bottom-left panel
        let pi2 = relative_perm(&perm_mid, &perm[r1..]);
        apply_row_perm(ctx, &mut a.submatrix_mut(r1, 0, m - r1, n1), &pi2);
        Ok(r1 + r2)
    } else {
        Ok(r1)
    }
}

/// `pi` such that `after[i] == before[pi[i]]`.
///
/// The permutation entries are row ids from the outermost call, so the
/// inverse table is sized by their range, not by the slice length.
fn relative_perm(before: &[usize], after: &[usize]) -> Vec<usize> {
    let span = before.iter().max().map_or(0, |&x| x + 1);
    let mut inv = vec![usize::MAX; span];
    for (i, &b) in before.iter().enumerate() {
        inv[b] = i;
    }
    after.iter().map(|&x| inv[x]).collect()
}

fn apply_row_perm(ctx: &ModCtx, block: &mut MatMut<'_>, pi: &[usize]) {
    let n = ctx.nlimbs();
    let cols = block.cols;
    let mut tmp = vec![0u64; block.rows * cols * n];
    for i in 0..block.rows {
        tmp[i * cols * n..(i + 1) * cols * n].copy_from_slice(block.row(pi[i]));
    }
    for i in 0..block.rows {
        block.row_mut(i).copy_from_slice(&tmp[i * cols * n..(i + 1) * cols * n]);
    }
}
