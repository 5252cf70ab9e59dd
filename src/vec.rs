//! Vector layer: batched elementwise operations, precomputed scalar
//! multiplication, and the lazy dot products everything above is built on.
//!
//! A dot product accumulates the full double-width sum of products in an
//! oversized accumulator and reduces exactly once at the end; reduction is a
//! division-like operation, limb addition is not, so the accumulator width
//! buys back almost all of the reduction cost.

use itertools::izip;

use crate::limb;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};
use crate::modulus::scalar::{LimbMulTable, ShoupPrecomp};
use crate::unreduced::Unreduced;

enum ScalarStrategy {
    Direct,
    Shoup(ShoupPrecomp),
    Table(LimbMulTable),
}

impl ModCtx {
    #[inline(always)]
    fn vlen(&self, v: &[u64]) -> usize {
        debug_assert!(v.len() % self.nlimbs() == 0);
        v.len() / self.nlimbs()
    }

    pub fn vec_zero(&self, r: &mut [u64]) {
        r.fill(0);
    }

    pub fn vec_set(&self, r: &mut [u64], a: &[u64]) {
        debug_assert!(r.len() == a.len());
        r.copy_from_slice(a);
    }

    pub fn vec_neg(&self, r: &mut [u64], a: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len());
        for (rc, ac) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n)) {
            self.neg(rc, ac);
        }
    }

    pub fn vec_add(&self, r: &mut [u64], a: &[u64], b: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        for (rc, ac, bc) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n), b.chunks_exact(n)) {
            self.add(rc, ac, bc);
        }
    }

    pub fn vec_sub(&self, r: &mut [u64], a: &[u64], b: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        for (rc, ac, bc) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n), b.chunks_exact(n)) {
            self.sub(rc, ac, bc);
        }
    }

    pub fn vec_mul(&self, r: &mut [u64], a: &[u64], b: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len() && r.len() == b.len());
        for (rc, ac, bc) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n), b.chunks_exact(n)) {
            self.mul(rc, ac, bc);
        }
    }

    pub fn vec_add_assign(&self, r: &mut [u64], a: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len());
        for (rc, ac) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n)) {
            self.add_assign(rc, ac);
        }
    }

    pub fn vec_sub_assign(&self, r: &mut [u64], a: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len());
        for (rc, ac) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n)) {
            self.sub_assign(rc, ac);
        }
    }

    fn scalar_strategy(&self, scalar: &[u64], len: usize) -> ScalarStrategy {
        let t = self.tuning();
        if len < t.scalar_shoup_threshold {
            ScalarStrategy::Direct
        } else if self.nlimbs() >= t.scalar_table_limbs {
            ScalarStrategy::Table(self.limb_table_prepare(scalar))
        } else {
            ScalarStrategy::Shoup(self.shoup_prepare(scalar))
        }
    }

    #[inline(always)]
    fn scalar_apply(&self, dst: &mut [u64], src: &[u64], strat: &ScalarStrategy, scalar: &[u64]) {
        match strat {
            ScalarStrategy::Direct => self.mul(dst, src, scalar),
            ScalarStrategy::Shoup(pre) => self.shoup_mul(dst, src, pre),
            ScalarStrategy::Table(pre) => self.limb_table_mul(dst, src, pre),
        }
    }

    /// `r[i] = a[i] * scalar`.
    pub fn vec_mul_scalar(&self, r: &mut [u64], a: &[u64], scalar: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len() && scalar.len() == n);
        let strat = self.scalar_strategy(scalar, self.vlen(a));
        for (rc, ac) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n)) {
            self.scalar_apply(rc, ac, &strat, scalar);
        }
    }

    /// `r[i] += a[i] * scalar`.
    pub fn vec_addmul_scalar(&self, r: &mut [u64], a: &[u64], scalar: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len() && scalar.len() == n);
        let strat = self.scalar_strategy(scalar, self.vlen(a));
        let mut t = [0u64; MAX_LIMBS];
        for (rc, ac) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n)) {
            self.scalar_apply(&mut t[..n], ac, &strat, scalar);
            self.add_assign(rc, &t[..n]);
        }
    }

    /// `r[i] -= a[i] * scalar`.
    pub fn vec_submul_scalar(&self, r: &mut [u64], a: &[u64], scalar: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == a.len() && scalar.len() == n);
        let strat = self.scalar_strategy(scalar, self.vlen(a));
        let mut t = [0u64; MAX_LIMBS];
        for (rc, ac) in izip!(r.chunks_exact_mut(n), a.chunks_exact(n)) {
            self.scalar_apply(&mut t[..n], ac, &strat, scalar);
            self.sub_assign(rc, &t[..n]);
        }
    }

    /// `r = initial +/- sum_i a[i] * b[i]`.
    ///
    /// The whole sum lives in a `2n+1`-limb accumulator; no term is reduced.
    pub fn vec_dot(
        &self,
        r: &mut [u64],
        initial: Option<&[u64]>,
        subtract: bool,
        a: &[u64],
        b: &[u64],
    ) {
        self.dot_engine(r, initial, subtract, a, b, false);
    }

    /// Convolution-order variant: `r = initial +/- sum_i a[i] * b[len-1-i]`.
    pub fn vec_dot_rev(
        &self,
        r: &mut [u64],
        initial: Option<&[u64]>,
        subtract: bool,
        a: &[u64],
        b: &[u64],
    ) {
        self.dot_engine(r, initial, subtract, a, b, true);
    }

    fn dot_engine(
        &self,
        r: &mut [u64],
        initial: Option<&[u64]>,
        subtract: bool,
        a: &[u64],
        b: &[u64],
        rev: bool,
    ) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == b.len());
        let len = self.vlen(a);
        let mut sum = [0u64; MAX_LIMBS];
        match n {
            1 => dot_acc_1(&mut sum[..1], a, b, rev, self),
            2 => dot_acc_2(&mut sum[..2], a, b, rev, self),
            3 => dot_acc_3(&mut sum[..3], a, b, rev, self),
            _ => dot_acc_generic(&mut sum[..n], a, b, len, rev, self),
        }
        if subtract {
            self.neg_assign(&mut sum[..n]);
        }
        match initial {
            Some(init) => self.add(r, init, &sum[..n]),
            None => r.copy_from_slice(&sum[..n]),
        }
    }
}

/// 1-limb elements: 3-limb accumulator, one `u128` add per term.
fn dot_acc_1(sum: &mut [u64], a: &[u64], b: &[u64], rev: bool, ctx: &ModCtx) {
    let len = a.len();
    let mut lo: u128 = 0;
    let mut hi: u64 = 0;
    for i in 0..len {
        let bj = if rev { b[len - 1 - i] } else { b[i] };
        let t = (a[i] as u128) * (bj as u128);
        let (s, ov) = lo.overflowing_add(t);
        lo = s;
        hi += ov as u64;
    }
    ctx.reduce_wide(sum, &[lo as u64, (lo >> 64) as u64, hi]);
}

/// 2-limb elements: 4-limb products summed into a 5-limb accumulator.
fn dot_acc_2(sum: &mut [u64], a: &[u64], b: &[u64], rev: bool, ctx: &ModCtx) {
    let len = a.len() / 2;
    let mut acc = Unreduced::<5>::zero();
    let mut p = [0u64; 4];
    for i in 0..len {
        let j = if rev { len - 1 - i } else { i };
        limb::mul_2(&mut p, &a[2 * i..2 * i + 2], &b[2 * j..2 * j + 2]);
        acc.add_limbs(&p);
    }
    acc.reduce(ctx, sum);
}

/// 3-limb elements: 6-limb products summed into a 7-limb accumulator.
fn dot_acc_3(sum: &mut [u64], a: &[u64], b: &[u64], rev: bool, ctx: &ModCtx) {
    let len = a.len() / 3;
    let mut acc = Unreduced::<7>::zero();
    let mut p = [0u64; 6];
    for i in 0..len {
        let j = if rev { len - 1 - i } else { i };
        limb::mul_3(&mut p, &a[3 * i..3 * i + 3], &b[3 * j..3 * j + 3]);
        acc.add_limbs(&p);
    }
    acc.reduce(ctx, sum);
}

fn dot_acc_generic(sum: &mut [u64], a: &[u64], b: &[u64], len: usize, rev: bool, ctx: &ModCtx) {
    let n = ctx.nlimbs();
    let mut acc = Unreduced::<{ 2 * MAX_LIMBS + 1 }>::zero();
    let mut p = [0u64; 2 * MAX_LIMBS];
    for i in 0..len {
        let j = if rev { len - 1 - i } else { i };
        limb::mul_basecase(&mut p[..2 * n], &a[i * n..(i + 1) * n], &b[j * n..(j + 1) * n]);
        acc.add_limbs(&p[..2 * n]);
    }
    acc.reduce(ctx, sum);
}
