use crate::mat::{MatMut, MatRef};
use crate::modulus::ctx::ModCtx;
use crate::scratch::ScratchOwned;

/// Row-times-column lazy dots; columns of `b` are gathered once and reused
/// across all rows.
pub(crate) fn mat_mul_classical(ctx: &ModCtx, c: &mut MatMut<'_>, a: MatRef<'_>, b: MatRef<'_>) {
    let n = ctx.nlimbs();
    let inner = a.cols;
    let mut scratch = ScratchOwned::new(inner * n);
    let mut scratch = scratch.borrow();
    let col = scratch.take(inner * n);
    for j in 0..b.cols {
        for t in 0..inner {
            col[t * n..(t + 1) * n].copy_from_slice(b.entry(t, j));
        }
        for i in 0..a.rows {
            let arow = a.row(i);
            ctx.vec_dot(c.entry_mut(i, j), None, false, arow, col);
        }
    }
}
