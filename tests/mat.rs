use mpn_mod::{Error, Mat, ModCtx, Tuning};
use num_bigint::BigInt;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

fn bigint(limbs: &[u64]) -> BigInt {
    let bytes: Vec<u8> = limbs.iter().flat_map(|l| l.to_le_bytes()).collect();
    BigInt::from_bytes_le(num_bigint::Sign::Plus, &bytes)
}

fn rand_mat(ctx: &ModCtx, rng: &mut ChaCha8Rng, rows: usize, cols: usize) -> Mat {
    let n = ctx.nlimbs();
    let mut m = Mat::new(ctx, rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            let wide: Vec<u64> = (0..2 * n + 1).map(|_| rng.next_u64()).collect();
            let mut e = vec![0u64; n];
            ctx.set_from_wide(&mut e, &wide);
            m.entry_mut(i, j).copy_from_slice(&e);
        }
    }
    m
}

/// Schoolbook oracle over BigInt.
fn mat_mul_oracle(ctx: &ModCtx, a: &Mat, b: &Mat) -> Mat {
    let n = ctx.nlimbs();
    let mb = bigint(ctx.modulus());
    let mut c = Mat::new(ctx, a.rows(), b.cols());
    for i in 0..a.rows() {
        for j in 0..b.cols() {
            let mut acc = BigInt::from(0);
            for t in 0..a.cols() {
                acc += bigint(a.entry(i, t)) * bigint(b.entry(t, j));
            }
            acc %= &mb;
            let (_, bytes) = acc.to_bytes_le();
            let cell = c.entry_mut(i, j);
            for (bi, by) in bytes.iter().enumerate() {
                cell[bi / 8] |= (*by as u64) << (8 * (bi % 8));
            }
        }
    }
    c
}

fn moduli() -> Vec<Vec<u64>> {
    vec![
        vec![0xffff_ffff_ffff_ffc5],
        vec![0xffff_ffff_ffff_ff61, u64::MAX],
        vec![1, 0, 1],
        vec![7, 0, 0, 0, 0, 0, 0, 0, 0x100],
    ]
}

fn tuned(m: &[u64], f: impl FnOnce(&mut Tuning)) -> ModCtx {
    let mut t = Tuning::default();
    f(&mut t);
    ModCtx::with_tuning(m, t).unwrap()
}

#[test]
fn mat_mul_algorithms_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(20);
    for m in moduli() {
        let classical = tuned(&m, |t| t.mat_mul_waksman_cutoff = usize::MAX);
        let waksman = tuned(&m, |t| {
            t.mat_mul_waksman_cutoff = 1;
            t.mat_mul_multimod_cutoff = usize::MAX;
        });
        let strassen = tuned(&m, |t| {
            t.mat_mul_waksman_cutoff = 1;
            t.mat_mul_multimod_cutoff = 1;
            t.mat_mul_strassen_bits = u32::MAX;
            t.mat_mul_strassen_cutoff = 2;
        });
        let multimod = tuned(&m, |t| {
            t.mat_mul_waksman_cutoff = 1;
            t.mat_mul_multimod_cutoff = 1;
            t.mat_mul_strassen_bits = 0;
        });
        for (r, k, c) in [(1, 1, 1), (3, 4, 5), (8, 8, 8), (10, 13, 9), (16, 16, 16)] {
            let a = rand_mat(&classical, &mut rng, r, k);
            let b = rand_mat(&classical, &mut rng, k, c);
            let want = mat_mul_oracle(&classical, &a, &b);
            for (name, ctx) in [
                ("classical", &classical),
                ("waksman", &waksman),
                ("strassen", &strassen),
                ("multimod", &multimod),
            ] {
                let mut got = Mat::new(ctx, r, c);
                ctx.mat_mul(&mut got.as_mut(), a.as_ref(), b.as_ref()).unwrap();
                assert_eq!(got.as_slice(), want.as_slice(), "{name} {}x{}x{} {} limbs", r, k, c, ctx.nlimbs());
            }
        }
    }
}

#[test]
fn mat_mul_shape_check() {
    let m = vec![97u64];
    let ctx = ModCtx::new(&m).unwrap();
    let a = Mat::new(&ctx, 2, 3);
    let b = Mat::new(&ctx, 4, 2);
    let mut c = Mat::new(&ctx, 2, 2);
    assert!(matches!(
        ctx.mat_mul(&mut c.as_mut(), a.as_ref(), b.as_ref()),
        Err(Error::DimensionMismatch(_))
    ));
}

#[test]
fn multimod_thread_counts_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let m = vec![0xffff_ffff_ffff_ff61u64, u64::MAX];
    let single = tuned(&m, |t| {
        t.mat_mul_waksman_cutoff = 1;
        t.mat_mul_multimod_cutoff = 1;
        t.mat_mul_strassen_bits = 0;
        t.nthreads = 1;
    });
    let four = tuned(&m, |t| {
        t.mat_mul_waksman_cutoff = 1;
        t.mat_mul_multimod_cutoff = 1;
        t.mat_mul_strassen_bits = 0;
        t.nthreads = 4;
    });
    let a = rand_mat(&single, &mut rng, 11, 7);
    let b = rand_mat(&single, &mut rng, 7, 13);
    let mut c1 = Mat::new(&single, 11, 13);
    single.mat_mul(&mut c1.as_mut(), a.as_ref(), b.as_ref()).unwrap();
    let mut c4 = Mat::new(&four, 11, 13);
    four.mat_mul(&mut c4.as_mut(), a.as_ref(), b.as_ref()).unwrap();
    assert_eq!(c1.as_slice(), c4.as_slice());
}

fn lu_ctxs(m: &[u64]) -> Vec<(&'static str, ModCtx)> {
    vec![
        ("classical", tuned(m, |t| t.mat_lu_delayed_cutoff = [usize::MAX; 16])),
        (
            "delayed",
            tuned(m, |t| {
                t.mat_lu_delayed_cutoff = [0; 16];
                t.mat_lu_recursive_cutoff = usize::MAX;
            }),
        ),
        (
            "recursive",
            tuned(m, |t| {
                t.mat_lu_delayed_cutoff = [0; 16];
                t.mat_lu_recursive_cutoff = 4;
            }),
        ),
    ]
}

/// Rebuild P*A from the packed LU factors and compare.
fn check_lu_reconstruction(ctx: &ModCtx, a: &Mat, lu: &Mat, perm: &[usize], rank: usize) {
    let n = ctx.nlimbs();
    let dim = a.rows();
    assert_eq!(rank, dim);
    let mut l = Mat::new(ctx, dim, dim);
    let mut u = Mat::new(ctx, dim, dim);
    for i in 0..dim {
        ctx.one(l.entry_mut(i, i));
        for j in 0..dim {
            if j < i {
                l.entry_mut(i, j).copy_from_slice(lu.entry(i, j));
            } else {
                u.entry_mut(i, j).copy_from_slice(lu.entry(i, j));
            }
        }
    }
    let mut prod = Mat::new(ctx, dim, dim);
    ctx.mat_mul(&mut prod.as_mut(), l.as_ref(), u.as_ref()).unwrap();
    for i in 0..dim {
        for j in 0..dim {
            assert_eq!(
                prod.entry(i, j),
                a.entry(perm[i], j),
                "reconstruction failed at ({i},{j})"
            );
        }
    }
    let _ = n;
}

#[test]
fn lu_reconstructs_permuted_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(22);
    for m in [vec![0xffff_ffff_ffff_ffc5u64], vec![0xffff_ffff_ffff_ff61, u64::MAX]] {
        for (name, ctx) in lu_ctxs(&m) {
            for dim in [1usize, 2, 5, 8, 13] {
                let a = rand_mat(&ctx, &mut rng, dim, dim);
                let mut work = a.clone();
                let mut perm = vec![0usize; dim];
                let rank = ctx.mat_lu(&mut perm, &mut work.as_mut(), false).unwrap();
                // random matrices over a large prime are nonsingular
                check_lu_reconstruction(&ctx, &a, &work, &perm, rank);
                let _ = name;
            }
        }
    }
}

#[test]
fn lu_zero_pivot_interchange() {
    // 8x8, nonsingular, but with a zero pivot in the naive elimination order
    let m = vec![0xffff_ffff_ffff_ffc5u64];
    for (name, ctx) in lu_ctxs(&m) {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let mut a = rand_mat(&ctx, &mut rng, 8, 8);
        ctx.zero(a.entry_mut(0, 0));
        // make the top-left 2x2 block singular in the naive order:
        // row1 starts with a nonzero entry that must be swapped up
        let mut work = a.clone();
        let mut perm = vec![0usize; 8];
        let rank = ctx.mat_lu(&mut perm, &mut work.as_mut(), false).unwrap();
        assert_eq!(rank, 8, "{name}: rank must survive the row interchange");
        check_lu_reconstruction(&ctx, &a, &work, &perm, rank);
    }
}

#[test]
fn lu_detects_rank_deficiency() {
    let m = vec![0xffff_ffff_ffff_ffc5u64];
    for (name, ctx) in lu_ctxs(&m) {
        let mut rng = ChaCha8Rng::seed_from_u64(24);
        let mut a = rand_mat(&ctx, &mut rng, 6, 6);
        // row 4 := row 2 (duplicate rows drop the rank to 5)
        let row2 = a.as_ref().row(2).to_vec();
        a.as_mut().row_mut(4).copy_from_slice(&row2);
        assert_eq!(ctx.mat_rank(a.as_ref()).unwrap(), 5, "{name}");

        let mut work = a.clone();
        let mut perm = vec![0usize; 6];
        let rank = ctx.mat_lu(&mut perm, &mut work.as_mut(), true).unwrap();
        assert_eq!(rank, 0, "{name}: rank_check reports zero on singular input");
    }
}

#[test]
fn triangular_solves() {
    let mut rng = ChaCha8Rng::seed_from_u64(25);
    let m = vec![0xffff_ffff_ffff_ff61u64, u64::MAX];
    let ctx = ModCtx::new(&m).unwrap();
    let dim = 9;
    let cols = 4;
    // build a well-formed lower-triangular matrix with unit-free diagonal
    let mut l = rand_mat(&ctx, &mut rng, dim, dim);
    for i in 0..dim {
        for j in i + 1..dim {
            ctx.zero(l.entry_mut(i, j));
        }
        if ctx.is_zero(l.entry(i, i)) {
            ctx.one(l.entry_mut(i, i));
        }
    }
    let b = rand_mat(&ctx, &mut rng, dim, cols);
    let mut x = Mat::new(&ctx, dim, cols);
    ctx.mat_nonsingular_solve_tril(&mut x.as_mut(), l.as_ref(), b.as_ref(), false)
        .unwrap();
    let mut back = Mat::new(&ctx, dim, cols);
    ctx.mat_mul(&mut back.as_mut(), l.as_ref(), x.as_ref()).unwrap();
    assert_eq!(back.as_slice(), b.as_slice());

    // upper-triangular via the transpose layout
    let mut u = rand_mat(&ctx, &mut rng, dim, dim);
    for i in 0..dim {
        for j in 0..i {
            ctx.zero(u.entry_mut(i, j));
        }
        if ctx.is_zero(u.entry(i, i)) {
            ctx.one(u.entry_mut(i, i));
        }
    }
    let mut y = Mat::new(&ctx, dim, cols);
    ctx.mat_nonsingular_solve_triu(&mut y.as_mut(), u.as_ref(), b.as_ref(), false)
        .unwrap();
    let mut back2 = Mat::new(&ctx, dim, cols);
    ctx.mat_mul(&mut back2.as_mut(), u.as_ref(), y.as_ref()).unwrap();
    assert_eq!(back2.as_slice(), b.as_slice());
}

#[test]
fn nonsingular_solve_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(26);
    for m in [vec![0xffff_ffff_ffff_ffc5u64], vec![0xffff_ffff_ffff_ff61, u64::MAX]] {
        let ctx = ModCtx::new(&m).unwrap();
        let dim = 7;
        let a = rand_mat(&ctx, &mut rng, dim, dim);
        let b = rand_mat(&ctx, &mut rng, dim, 3);
        let mut x = Mat::new(&ctx, dim, 3);
        ctx.mat_nonsingular_solve(&mut x.as_mut(), a.as_ref(), b.as_ref())
            .unwrap();
        let mut back = Mat::new(&ctx, dim, 3);
        ctx.mat_mul(&mut back.as_mut(), a.as_ref(), x.as_ref()).unwrap();
        assert_eq!(back.as_slice(), b.as_slice());
    }
}

/// Exact integer determinant by cofactor expansion, reduced mod m.
fn det_oracle(ctx: &ModCtx, a: &Mat) -> BigInt {
    fn go(a: &Vec<Vec<BigInt>>) -> BigInt {
        let d = a.len();
        if d == 0 {
            return BigInt::from(1);
        }
        if d == 1 {
            return a[0][0].clone();
        }
        let mut acc = BigInt::from(0);
        for j in 0..d {
            let minor: Vec<Vec<BigInt>> = (1..d)
                .map(|i| {
                    (0..d)
                        .filter(|&c| c != j)
                        .map(|c| a[i][c].clone())
                        .collect()
                })
                .collect();
            let term = &a[0][j] * go(&minor);
            if j % 2 == 0 {
                acc += term;
            } else {
                acc -= term;
            }
        }
        acc
    }
    let cells: Vec<Vec<BigInt>> = (0..a.rows())
        .map(|i| (0..a.cols()).map(|j| bigint(a.entry(i, j))).collect())
        .collect();
    let mb = bigint(ctx.modulus());
    ((go(&cells) % &mb) + &mb) % &mb
}

#[test]
fn determinant_dispatch_agrees_with_oracle() {
    let mut rng = ChaCha8Rng::seed_from_u64(27);
    for m in moduli() {
        let ctx = ModCtx::new(&m).unwrap();
        let n = ctx.nlimbs();
        for dim in [0usize, 1, 2, 3, 4, 5, 6, 7] {
            let a = rand_mat(&ctx, &mut rng, dim, dim);
            let mut det = vec![0u64; n];
            ctx.mat_det(&mut det, a.as_ref()).unwrap();
            assert_eq!(bigint(&det), det_oracle(&ctx, &a), "dim {dim}, {} limbs", n);
        }
    }
}

#[test]
fn determinant_of_singular_is_zero() {
    let mut rng = ChaCha8Rng::seed_from_u64(28);
    let m = vec![0xffff_ffff_ffff_ffc5u64];
    let ctx = ModCtx::new(&m).unwrap();
    let mut a = rand_mat(&ctx, &mut rng, 8, 8);
    let row0 = a.as_ref().row(0).to_vec();
    a.as_mut().row_mut(7).copy_from_slice(&row0);
    let mut det = vec![0u64; 1];
    ctx.mat_det(&mut det, a.as_ref()).unwrap();
    assert!(ctx.is_zero(&det));
}

#[test]
fn determinant_composite_modulus_fallback() {
    // over 2^128 + 1 (composite) LU can hit non-invertible pivots;
    // Berkowitz must still deliver the exact answer
    let mut rng = ChaCha8Rng::seed_from_u64(29);
    let m = vec![1u64, 0, 1];
    let ctx = ModCtx::new(&m).unwrap();
    let n = ctx.nlimbs();
    for dim in [6usize, 7] {
        let mut a = rand_mat(&ctx, &mut rng, dim, dim);
        // plant a non-invertible entry in pivot position
        let mut e = vec![0u64; n];
        ctx.set_u64(&mut e, 59649589127497217);
        a.entry_mut(0, 0).copy_from_slice(&e);
        let mut det = vec![0u64; n];
        ctx.mat_det(&mut det, a.as_ref()).unwrap();
        assert_eq!(bigint(&det), det_oracle(&ctx, &a), "dim {dim}");
    }
}

#[test]
fn charpoly_berkowitz_vs_danilevsky() {
    let mut rng = ChaCha8Rng::seed_from_u64(30);
    for m in [vec![0xffff_ffff_ffff_ffc5u64], vec![0xffff_ffff_ffff_ff61, u64::MAX]] {
        let berkowitz = tuned(&m, |t| t.charpoly_danilevsky_cutoff = usize::MAX);
        let danilevsky = tuned(&m, |t| t.charpoly_danilevsky_cutoff = 0);
        let n = berkowitz.nlimbs();
        for dim in [1usize, 2, 5, 9, 14] {
            let a = rand_mat(&berkowitz, &mut rng, dim, dim);
            let mut p1 = vec![0u64; (dim + 1) * n];
            berkowitz.mat_charpoly(&mut p1, a.as_ref()).unwrap();
            let mut p2 = vec![0u64; (dim + 1) * n];
            danilevsky.mat_charpoly(&mut p2, a.as_ref()).unwrap();
            assert_eq!(p1, p2, "dim {dim}, {} limbs", n);
            // monic of the right degree
            assert!(berkowitz.is_one(&p1[dim * n..]));
        }
    }
}

#[test]
fn charpoly_two_by_two_trace_det() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let m = vec![0xffff_ffff_ffff_ff61u64, u64::MAX];
    let ctx = ModCtx::new(&m).unwrap();
    let n = ctx.nlimbs();
    let a = rand_mat(&ctx, &mut rng, 2, 2);
    let mut p = vec![0u64; 3 * n];
    ctx.mat_charpoly(&mut p, a.as_ref()).unwrap();
    // x^2 - tr x + det
    let mut tr = vec![0u64; n];
    ctx.add(&mut tr, a.entry(0, 0), a.entry(1, 1));
    let mut negtr = vec![0u64; n];
    ctx.neg(&mut negtr, &tr);
    assert_eq!(&p[n..2 * n], &negtr[..]);
    let mut det = vec![0u64; n];
    ctx.mat_det(&mut det, a.as_ref()).unwrap();
    assert_eq!(&p[..n], &det[..]);
}
