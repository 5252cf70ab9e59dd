use mpn_mod::{ModCtx, Tuning};
use num_bigint::BigUint;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

fn biguint(limbs: &[u64]) -> BigUint {
    let bytes: Vec<u8> = limbs.iter().flat_map(|l| l.to_le_bytes()).collect();
    BigUint::from_bytes_le(&bytes)
}

fn rand_poly(ctx: &ModCtx, rng: &mut ChaCha8Rng, len: usize) -> Vec<u64> {
    let n = ctx.nlimbs();
    let mut v = vec![0u64; len * n];
    for i in 0..len {
        let wide: Vec<u64> = (0..2 * n + 1).map(|_| rng.next_u64()).collect();
        let mut e = vec![0u64; n];
        ctx.set_from_wide(&mut e, &wide);
        v[i * n..(i + 1) * n].copy_from_slice(&e);
    }
    v
}

/// Schoolbook oracle over BigUint.
fn mullow_oracle(ctx: &ModCtx, a: &[u64], b: &[u64], outlen: usize) -> Vec<u64> {
    let n = ctx.nlimbs();
    let la = a.len() / n;
    let lb = b.len() / n;
    let mb = biguint(ctx.modulus());
    let mut out = vec![0u64; outlen * n];
    for k in 0..outlen {
        let mut acc = BigUint::from(0u32);
        for i in 0..la {
            if k >= i && k - i < lb {
                acc += biguint(&a[i * n..(i + 1) * n]) * biguint(&b[(k - i) * n..(k - i + 1) * n]);
            }
        }
        acc %= &mb;
        let digits = acc.to_u64_digits();
        out[k * n..k * n + digits.len()].copy_from_slice(&digits);
    }
    out
}

fn moduli() -> Vec<Vec<u64>> {
    vec![
        vec![0xffff_ffff_ffff_ffc5],
        vec![0xffff_ffff_ffff_ff61, u64::MAX],
        vec![1, 0, 1],
        vec![0x1111_1111, 2, 3, 4, 5, 6, 7, 8, 0x8000_0000_0000_0000],
    ]
}

fn ctx_forced(m: &[u64], kara: usize, ks: usize) -> ModCtx {
    let mut t = Tuning::default();
    t.mul_karatsuba_cutoff = [kara; 16];
    t.sqr_karatsuba_cutoff = [kara; 16];
    t.mul_ks_cutoff = ks;
    ModCtx::with_tuning(m, t).unwrap()
}

#[test]
fn mullow_algorithms_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    for m in moduli() {
        let classical = ctx_forced(&m, usize::MAX, usize::MAX);
        let karatsuba = ctx_forced(&m, 2, usize::MAX);
        let kronecker = ctx_forced(&m, usize::MAX, 1);
        for (la, lb) in [(1, 1), (4, 4), (13, 13), (17, 5), (33, 33)] {
            let a = rand_poly(&classical, &mut rng, la);
            let b = rand_poly(&classical, &mut rng, lb);
            let outlen = la + lb - 1;
            let n = classical.nlimbs();

            let want = mullow_oracle(&classical, &a, &b, outlen);
            let mut r = vec![0u64; outlen * n];
            classical.poly_mullow(&mut r, &a, &b, outlen);
            assert_eq!(r, want, "classical {} limbs ({la},{lb})", n);
            karatsuba.poly_mullow(&mut r, &a, &b, outlen);
            assert_eq!(r, want, "karatsuba {} limbs ({la},{lb})", n);
            kronecker.poly_mullow(&mut r, &a, &b, outlen);
            assert_eq!(r, want, "kronecker {} limbs ({la},{lb})", n);

            // truncation
            let short = outlen / 2 + 1;
            let mut rs = vec![0u64; short * n];
            karatsuba.poly_mullow(&mut rs, &a, &b, short);
            assert_eq!(rs, want[..short * n], "truncated karatsuba");
        }
    }
}

#[test]
fn squaring_agrees() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for m in moduli() {
        let classical = ctx_forced(&m, usize::MAX, usize::MAX);
        let karatsuba = ctx_forced(&m, 2, usize::MAX);
        let n = classical.nlimbs();
        let a = rand_poly(&classical, &mut rng, 21);
        let outlen = 41;
        let want = mullow_oracle(&classical, &a, &a, outlen);
        let mut r = vec![0u64; outlen * n];
        classical.poly_sqrlow(&mut r, &a, outlen);
        assert_eq!(r, want);
        karatsuba.poly_sqrlow(&mut r, &a, outlen);
        assert_eq!(r, want);
    }
}

#[test]
fn nine_limb_degree_50_scenario() {
    // 9-limb modulus, two random degree-50 polynomials: classical and
    // Karatsuba must produce identical length-101 output
    let m = [u64::MAX, 1, 2, 3, 4, 5, 6, 7, 0x4242_4242];
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let classical = ctx_forced(&m, usize::MAX, usize::MAX);
    let karatsuba = ctx_forced(&m, 2, usize::MAX);
    let n = classical.nlimbs();
    let a = rand_poly(&classical, &mut rng, 51);
    let b = rand_poly(&classical, &mut rng, 51);
    let mut r1 = vec![0u64; 101 * n];
    let mut r2 = vec![0u64; 101 * n];
    classical.poly_mullow(&mut r1, &a, &b, 101);
    karatsuba.poly_mullow(&mut r2, &a, &b, 101);
    assert_eq!(r1, r2);
}

fn check_division_law(ctx: &ModCtx, a: &[u64], b: &[u64]) {
    let n = ctx.nlimbs();
    let la = a.len() / n;
    let lb = b.len() / n;
    let qlen = la + 1 - lb;
    let mut q = vec![0u64; qlen * n];
    let mut r = vec![0u64; (lb - 1) * n];
    ctx.poly_divrem(&mut q, &mut r, a, b).unwrap();
    // a == q*b + r, deg r < deg b by construction of the buffer
    let mut qb = vec![0u64; la * n];
    ctx.poly_mullow(&mut qb, &q, b, la);
    let mut rhs = qb;
    let mut t = vec![0u64; (lb - 1) * n];
    t.copy_from_slice(&r);
    for j in 0..lb - 1 {
        let mut s = vec![0u64; n];
        ctx.add(&mut s, &rhs[j * n..(j + 1) * n], &t[j * n..(j + 1) * n]);
        rhs[j * n..(j + 1) * n].copy_from_slice(&s);
    }
    assert_eq!(rhs, a);
}

#[test]
fn divrem_law_holds() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for m in [vec![0xffff_ffff_ffff_ffc5u64], vec![0xffff_ffff_ffff_ff61, u64::MAX]] {
        let basecase = {
            let mut t = Tuning::default();
            t.divrem_newton_cutoff = usize::MAX;
            ModCtx::with_tuning(&m, t).unwrap()
        };
        let newton = {
            let mut t = Tuning::default();
            t.divrem_newton_cutoff = 2;
            t.inv_series_newton_cutoff = 2;
            ModCtx::with_tuning(&m, t).unwrap()
        };
        for (la, lb) in [(1, 1), (7, 3), (8, 8), (20, 7), (25, 1)] {
            let a = rand_poly(&basecase, &mut rng, la);
            let mut b = rand_poly(&basecase, &mut rng, lb);
            // leading coefficient must be nonzero (and here invertible)
            let n = basecase.nlimbs();
            if basecase.is_zero(&b[(lb - 1) * n..]) {
                basecase.one(&mut b[(lb - 1) * n..]);
            }
            check_division_law(&basecase, &a, &b);
            check_division_law(&newton, &a, &b);

            // both paths agree coefficientwise
            let qlen = la.max(lb) + 1 - lb;
            if la >= lb {
                let mut q1 = vec![0u64; qlen * n];
                let mut r1 = vec![0u64; (lb - 1) * n];
                basecase.poly_divrem(&mut q1, &mut r1, &a, &b).unwrap();
                let mut q2 = vec![0u64; qlen * n];
                let mut r2 = vec![0u64; (lb - 1) * n];
                newton.poly_divrem(&mut q2, &mut r2, &a, &b).unwrap();
                assert_eq!(q1, q2);
                assert_eq!(r1, r2);
            }
        }
    }
}

#[test]
fn inv_series_and_div_series() {
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let m = vec![0xffff_ffff_ffff_ff61u64, u64::MAX];
    let basecase = {
        let mut t = Tuning::default();
        t.inv_series_newton_cutoff = usize::MAX;
        ModCtx::with_tuning(&m, t).unwrap()
    };
    let newton = {
        let mut t = Tuning::default();
        t.inv_series_newton_cutoff = 2;
        ModCtx::with_tuning(&m, t).unwrap()
    };
    let n = basecase.nlimbs();
    for len in [1usize, 2, 5, 16, 31] {
        let mut b = rand_poly(&basecase, &mut rng, 8.min(len + 1));
        if basecase.is_zero(&b[..n]) {
            basecase.one(&mut b[..n]);
        }
        let mut q1 = vec![0u64; len * n];
        basecase.poly_inv_series(&mut q1, &b, len).unwrap();
        let mut q2 = vec![0u64; len * n];
        newton.poly_inv_series(&mut q2, &b, len).unwrap();
        assert_eq!(q1, q2, "len {len}");

        // b * inv_series(b) == 1 mod x^len
        let mut check = vec![0u64; len * n];
        basecase.poly_mullow(&mut check, &b, &q1, len);
        assert!(basecase.is_one(&check[..n]));
        assert!(check[n..].iter().all(|&l| l == 0));

        // div_series consistency: (a/b) * b == a mod x^len
        let a = rand_poly(&basecase, &mut rng, len);
        let mut d = vec![0u64; len * n];
        basecase.poly_div_series(&mut d, &a, &b, len).unwrap();
        let mut back = vec![0u64; len * n];
        basecase.poly_mullow(&mut back, &d, &b, len);
        assert_eq!(back, a);

        let mut d2 = vec![0u64; len * n];
        newton.poly_div_series(&mut d2, &a, &b, len).unwrap();
        assert_eq!(d, d2);
    }
}

#[test]
fn xgcd_bezout_identity() {
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    let m = vec![0xffff_ffff_ffff_ffc5u64];
    let ctx = ModCtx::new(&m).unwrap();
    let n = ctx.nlimbs();
    for (la, lb) in [(6, 4), (9, 9), (12, 1), (1, 5)] {
        let a = rand_poly(&ctx, &mut rng, la);
        let b = rand_poly(&ctx, &mut rng, lb);
        let (g, u, v) = ctx.poly_xgcd(&a, &b).unwrap();
        let lg = g.len() / n;
        assert!(lg >= 1);
        // g is monic
        assert!(ctx.is_one(&g[(lg - 1) * n..]));

        // u*a + v*b == g
        let prod_len = |x: &Vec<u64>, y: &[u64]| -> usize {
            if x.is_empty() || y.is_empty() { 0 } else { x.len() / n + y.len() / n - 1 }
        };
        let out_len = prod_len(&u, &a).max(prod_len(&v, &b)).max(lg);
        let mut ua = vec![0u64; out_len * n];
        if !u.is_empty() {
            ctx.poly_mullow(&mut ua[..prod_len(&u, &a) * n], &u, &a, prod_len(&u, &a));
        }
        let mut vb = vec![0u64; out_len * n];
        if !v.is_empty() {
            ctx.poly_mullow(&mut vb[..prod_len(&v, &b) * n], &v, &b, prod_len(&v, &b));
        }
        let mut sum = vec![0u64; out_len * n];
        ctx.vec_add(&mut sum, &ua, &vb);
        assert_eq!(&sum[..g.len()], &g[..]);
        assert!(sum[g.len()..].iter().all(|&l| l == 0));

        // g divides both inputs
        for f in [&a, &b] {
            let lf = f.len() / n;
            if lf < lg {
                continue;
            }
            let mut q = vec![0u64; (lf + 1 - lg) * n];
            let mut r = vec![0u64; (lg - 1) * n];
            ctx.poly_divrem(&mut q, &mut r, f, &g).unwrap();
            assert!(r.iter().all(|&l| l == 0), "gcd must divide the input");
        }

        // plain gcd agrees with the xgcd gcd
        let g2 = ctx.poly_gcd(&a, &b).unwrap();
        assert_eq!(g, g2);
    }
}

#[test]
fn evaluate_matches_powers() {
    let mut rng = ChaCha8Rng::seed_from_u64(16);
    let m = vec![0xffff_ffff_ffff_ff61u64, u64::MAX];
    let ctx = ModCtx::new(&m).unwrap();
    let n = ctx.nlimbs();
    let p = rand_poly(&ctx, &mut rng, 9);
    let x = rand_poly(&ctx, &mut rng, 1);
    let mut want = vec![0u64; n];
    let mut xp = vec![0u64; n];
    ctx.one(&mut xp);
    for i in 0..9 {
        let mut term = vec![0u64; n];
        ctx.mul(&mut term, &p[i * n..(i + 1) * n], &xp);
        ctx.add_assign(&mut want, &term);
        ctx.mul_assign(&mut xp, &x);
    }
    let mut got = vec![0u64; n];
    ctx.poly_evaluate(&mut got, &p, &x);
    assert_eq!(got, want);
}
