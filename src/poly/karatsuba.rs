//! Recursive Karatsuba multiplication with delayed reduction.
//!
//! Operands are carried one limb wider than canonical; operand sums at each
//! recursion level reuse that headroom instead of growing. A margin counter
//! tracks the spare bits left in the extra limb and is decremented per level;
//! it starts at >= 64 and recursion depth is bounded by `log2(len) < 64`, so
//! the counter never reaches zero (asserted). Every output coefficient is an
//! exact integer in `2*(n+1)+1` limbs and is reduced exactly once at the top.

use crate::limb;
use crate::modulus::ctx::ModCtx;

pub(crate) fn mullow_karatsuba(
    ctx: &ModCtx,
    r: &mut [u64],
    a: &[u64],
    b: &[u64],
    outlen: usize,
    sqr: bool,
) {
    let n = ctx.nlimbs();
    let len = a.len() / n;
    debug_assert!(b.len() / n == len && len >= 1);
    let aw = n + 1;
    let ow = 2 * aw + 1;
    let cutoff = if sqr {
        ctx.tuning().sqr_karatsuba_cutoff[n - 1]
    } else {
        ctx.tuning().mul_karatsuba_cutoff[n - 1]
    }
    .max(1);

    let wa = widen(a, n, aw);
    let wb = if sqr { Vec::new() } else { widen(b, n, aw) };
    let wb_ref: &[u64] = if sqr { &wa } else { &wb };

    let mut out = vec![0u64; (2 * len - 1) * ow];
    let margin = 64 * aw as u32 - ctx.modulus_bits();
    debug_assert!(margin >= 64);
    kara_rec(&mut out, &wa, wb_ref, len, aw, ow, margin, cutoff, sqr);

    for k in 0..outlen {
        let rk = &mut r[k * n..(k + 1) * n];
        if k < 2 * len - 1 {
            ctx.reduce_wide(rk, &out[k * ow..(k + 1) * ow]);
        } else {
            rk.fill(0);
        }
    }
}

fn widen(src: &[u64], n: usize, aw: usize) -> Vec<u64> {
    let len = src.len() / n;
    let mut v = vec![0u64; len * aw];
    for i in 0..len {
        v[i * aw..i * aw + n].copy_from_slice(&src[i * n..(i + 1) * n]);
    }
    v
}

#[allow(clippy::too_many_arguments)]
fn kara_rec(
    out: &mut [u64],
    a: &[u64],
    b: &[u64],
    len: usize,
    aw: usize,
    ow: usize,
    margin: u32,
    cutoff: usize,
    sqr: bool,
) {
    debug_assert!(out.len() == (2 * len - 1) * ow);
    debug_assert!(margin > 0, "karatsuba margin exhausted");
    if len <= cutoff {
        basecase(out, a, b, len, aw, ow, sqr);
        return;
    }
    let h = (len + 1) / 2;
    let l2 = len - h;

    let mut asum = a[..h * aw].to_vec();
    for i in 0..l2 {
        let cy = limb::add_n_assign(&mut asum[i * aw..(i + 1) * aw], &a[(h + i) * aw..(h + i + 1) * aw]);
        debug_assert!(cy == 0);
    }
    let bsum;
    let bsum_ref: &[u64] = if sqr {
        &asum
    } else {
        let mut s = b[..h * aw].to_vec();
        for i in 0..l2 {
            let cy =
                limb::add_n_assign(&mut s[i * aw..(i + 1) * aw], &b[(h + i) * aw..(h + i + 1) * aw]);
            debug_assert!(cy == 0);
        }
        bsum = s;
        &bsum
    };

    let mut p0 = vec![0u64; (2 * h - 1) * ow];
    kara_rec(&mut p0, &a[..h * aw], &b[..h * aw], h, aw, ow, margin - 1, cutoff, sqr);
    let mut p2 = vec![0u64; (2 * l2 - 1) * ow];
    kara_rec(&mut p2, &a[h * aw..], &b[h * aw..], l2, aw, ow, margin - 1, cutoff, sqr);
    let mut ps = vec![0u64; (2 * h - 1) * ow];
    kara_rec(&mut ps, &asum, bsum_ref, h, aw, ow, margin - 1, cutoff, sqr);

    // out = p0 + (ps - p0 - p2) * x^h + p2 * x^(2h)
    out[..(2 * h - 1) * ow].copy_from_slice(&p0);
    out[(2 * h - 1) * ow..2 * h * ow].fill(0);
    out[2 * h * ow..].copy_from_slice(&p2);
    let mut mid = vec![0u64; ow];
    for k in 0..2 * h - 1 {
        mid.copy_from_slice(&ps[k * ow..(k + 1) * ow]);
        // coefficientwise (a0*b1 + a1*b0)_k: exact and nonnegative
        let bw = limb::sub_n_assign(&mut mid, &p0[k * ow..(k + 1) * ow]);
        debug_assert!(bw == 0);
        if k < 2 * l2 - 1 {
            let bw = limb::sub_n_assign(&mut mid, &p2[k * ow..(k + 1) * ow]);
            debug_assert!(bw == 0);
        }
        let cy = limb::add_n_assign(&mut out[(h + k) * ow..(h + k + 1) * ow], &mid);
        debug_assert!(cy == 0);
    }
}

fn basecase(out: &mut [u64], a: &[u64], b: &[u64], len: usize, aw: usize, ow: usize, sqr: bool) {
    let mut p = vec![0u64; 2 * aw];
    if sqr {
        for i in 0..len {
            limb::mul_basecase(&mut p, &a[i * aw..(i + 1) * aw], &a[i * aw..(i + 1) * aw]);
            let cy = limb::add_n_assign(&mut out[2 * i * ow..(2 * i + 1) * ow], &p);
            debug_assert!(cy == 0);
            for j in i + 1..len {
                limb::mul_basecase(&mut p, &a[i * aw..(i + 1) * aw], &b[j * aw..(j + 1) * aw]);
                for _ in 0..2 {
                    let cy = limb::add_n_assign(&mut out[(i + j) * ow..(i + j + 1) * ow], &p);
                    debug_assert!(cy == 0);
                }
            }
        }
    } else {
        for i in 0..len {
            for j in 0..len {
                limb::mul_basecase(&mut p, &a[i * aw..(i + 1) * aw], &b[j * aw..(j + 1) * aw]);
                let cy = limb::add_n_assign(&mut out[(i + j) * ow..(i + j + 1) * ow], &p);
                debug_assert!(cy == 0);
            }
        }
    }
}
