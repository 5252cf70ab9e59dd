//! Waksman-style multiplication: the shared dimension is processed in pairs,
//! one multiplication of two operand sums yielding two output contributions,
//! with per-row/per-column correction sums subtracted at the end. All
//! intermediates are exact unreduced integers; each output entry is reduced
//! once. An odd shared dimension contributes one classical correction term.

use crate::limb;
use crate::mat::{MatMut, MatRef};
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};
use crate::scratch::ScratchOwned;

pub(crate) fn mat_mul_waksman(ctx: &ModCtx, c: &mut MatMut<'_>, a: MatRef<'_>, b: MatRef<'_>) {
    let n = ctx.nlimbs();
    let w = 2 * (n + 1) + 1;
    let m = a.rows;
    let inner = a.cols;
    let p = b.cols;
    let half = inner / 2;

    let mut scratch = ScratchOwned::new((m + p + 1) * w);
    let mut scratch = scratch.borrow();
    let rcor = scratch.take(m * w);
    let ccor = scratch.take(p * w);
    let acc = scratch.take(w);

    // row corrections: rcor[i] = sum_t a[i,2t] * a[i,2t+1]
    let mut prod = [0u64; 2 * MAX_LIMBS + 2];
    for i in 0..m {
        let ri = &mut rcor[i * w..(i + 1) * w];
        for t in 0..half {
            limb::mul_basecase(&mut prod[..2 * n], a.entry(i, 2 * t), a.entry(i, 2 * t + 1));
            let cy = limb::add_n_assign(ri, &prod[..2 * n]);
            debug_assert!(cy == 0);
        }
    }
    // column corrections: ccor[j] = sum_t b[2t,j] * b[2t+1,j]
    for j in 0..p {
        let cj = &mut ccor[j * w..(j + 1) * w];
        for t in 0..half {
            limb::mul_basecase(&mut prod[..2 * n], b.entry(2 * t, j), b.entry(2 * t + 1, j));
            let cy = limb::add_n_assign(cj, &prod[..2 * n]);
            debug_assert!(cy == 0);
        }
    }

    let mut s1 = [0u64; MAX_LIMBS + 1];
    let mut s2 = [0u64; MAX_LIMBS + 1];
    for i in 0..m {
        for j in 0..p {
            acc.fill(0);
            for t in 0..half {
                // (a[i,2t] + b[2t+1,j]) * (a[i,2t+1] + b[2t,j])
                s1[n] = limb::add_n(&mut s1[..n], a.entry(i, 2 * t), b.entry(2 * t + 1, j));
                s2[n] = limb::add_n(&mut s2[..n], a.entry(i, 2 * t + 1), b.entry(2 * t, j));
                limb::mul_basecase(&mut prod[..2 * n + 2], &s1[..n + 1], &s2[..n + 1]);
                let cy = limb::add_n_assign(acc, &prod[..2 * n + 2]);
                debug_assert!(cy == 0);
            }
            // the pair products overshoot by exactly rcor[i] + ccor[j]
            let bw = limb::sub_n_assign(acc, &rcor[i * w..(i + 1) * w]);
            debug_assert!(bw == 0);
            let bw = limb::sub_n_assign(acc, &ccor[j * w..(j + 1) * w]);
            debug_assert!(bw == 0);
            if inner % 2 == 1 {
                limb::mul_basecase(&mut prod[..2 * n], a.entry(i, inner - 1), b.entry(inner - 1, j));
                let cy = limb::add_n_assign(acc, &prod[..2 * n]);
                debug_assert!(cy == 0);
            }
            ctx.reduce_wide(c.entry_mut(i, j), acc);
        }
    }
}
