//! Strassen multiplication: seven recursive products on the even part,
//! classical peeling for odd rows, columns and inner dimension.

use crate::mat::{Mat, MatMut, MatRef};
use crate::mat::mul_classical::mat_mul_classical;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};

pub(crate) fn mat_mul_strassen(ctx: &ModCtx, c: &mut MatMut<'_>, a: MatRef<'_>, b: MatRef<'_>) {
    let am = Mat::from_ref(a);
    let bm = Mat::from_ref(b);
    let cm = strassen_mat(ctx, &am, &bm);
    for i in 0..c.rows {
        c.row_mut(i).copy_from_slice(cm.as_ref().row(i));
    }
}

fn strassen_mat(ctx: &ModCtx, a: &Mat, b: &Mat) -> Mat {
    let (m, inner, p) = (a.rows(), a.cols(), b.cols());
    let mut c = Mat::new(ctx, m, p);
    if m.min(inner).min(p) <= ctx.tuning().mat_mul_strassen_cutoff {
        mat_mul_classical(ctx, &mut c.as_mut(), a.as_ref(), b.as_ref());
        return c;
    }
    let hm = m / 2;
    let hk = inner / 2;
    let hp = p / 2;

    let a11 = block(a, 0, 0, hm, hk);
    let a12 = block(a, 0, hk, hm, hk);
    let a21 = block(a, hm, 0, hm, hk);
    let a22 = block(a, hm, hk, hm, hk);
    let b11 = block(b, 0, 0, hk, hp);
    let b12 = block(b, 0, hp, hk, hp);
    let b21 = block(b, hk, 0, hk, hp);
    let b22 = block(b, hk, hp, hk, hp);

    let m1 = strassen_mat(ctx, &add(ctx, &a11, &a22), &add(ctx, &b11, &b22));
    let m2 = strassen_mat(ctx, &add(ctx, &a21, &a22), &b11);
    let m3 = strassen_mat(ctx, &a11, &sub(ctx, &b12, &b22));
    let m4 = strassen_mat(ctx, &a22, &sub(ctx, &b21, &b11));
    let m5 = strassen_mat(ctx, &add(ctx, &a11, &a12), &b22);
    let m6 = strassen_mat(ctx, &sub(ctx, &a21, &a11), &add(ctx, &b11, &b12));
    let m7 = strassen_mat(ctx, &sub(ctx, &a12, &a22), &add(ctx, &b21, &b22));

    // c11 = m1 + m4 - m5 + m7
    let mut c11 = add(ctx, &m1, &m4);
    ctx.vec_sub_assign(&mut c11.data, &m5.data);
    ctx.vec_add_assign(&mut c11.data, &m7.data);
    // c12 = m3 + m5
    let c12 = add(ctx, &m3, &m5);
    // c21 = m2 + m4
    let c21 = add(ctx, &m2, &m4);
    // c22 = m1 - m2 + m3 + m6
    let mut c22 = sub(ctx, &m1, &m2);
    ctx.vec_add_assign(&mut c22.data, &m3.data);
    ctx.vec_add_assign(&mut c22.data, &m6.data);

    write_block(&mut c, 0, 0, &c11);
    write_block(&mut c, 0, hp, &c12);
    write_block(&mut c, hm, 0, &c21);
    write_block(&mut c, hm, hp, &c22);

    let n = ctx.nlimbs();
    if inner % 2 == 1 {
        // rank-1 update from the peeled inner column/row
        let mut t = [0u64; MAX_LIMBS];
        for i in 0..2 * hm {
            for j in 0..2 * hp {
                ctx.mul(&mut t[..n], a.entry(i, inner - 1), b.entry(inner - 1, j));
                ctx.add_assign(c.entry_mut(i, j), &t[..n]);
            }
        }
    }
    if m % 2 == 1 {
        let i = m - 1;
        for j in 0..p {
            full_dot(ctx, &mut c, a, b, i, j);
        }
    }
    if p % 2 == 1 {
        let j = p - 1;
        for i in 0..m - (m % 2) {
            full_dot(ctx, &mut c, a, b, i, j);
        }
    }
    c
}

fn full_dot(ctx: &ModCtx, c: &mut Mat, a: &Mat, b: &Mat, i: usize, j: usize) {
    let n = ctx.nlimbs();
    let inner = a.cols();
    let mut col = vec![0u64; inner * n];
    for t in 0..inner {
        col[t * n..(t + 1) * n].copy_from_slice(b.entry(t, j));
    }
    ctx.vec_dot(c.entry_mut(i, j), None, false, a.as_ref().row(i), &col);
}

fn block(src: &Mat, r0: usize, c0: usize, rows: usize, cols: usize) -> Mat {
    Mat::from_ref(src.as_ref().submatrix(r0, c0, rows, cols))
}

fn write_block(dst: &mut Mat, r0: usize, c0: usize, src: &Mat) {
    for i in 0..src.rows() {
        for j in 0..src.cols() {
            dst.entry_mut(r0 + i, c0 + j).copy_from_slice(src.entry(i, j));
        }
    }
}

fn add(ctx: &ModCtx, a: &Mat, b: &Mat) -> Mat {
    let mut r = Mat::new(ctx, a.rows(), a.cols());
    ctx.vec_add(&mut r.data, &a.data, &b.data);
    r
}

fn sub(ctx: &ModCtx, a: &Mat, b: &Mat) -> Mat {
    let mut r = Mat::new(ctx, a.rows(), a.cols());
    ctx.vec_sub(&mut r.data, &a.data, &b.data);
    r
}
