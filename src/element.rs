//! Element arithmetic on fixed-width limb slices.
//!
//! Every element is `nlimbs` little-endian words in canonical form (strictly
//! below the modulus). Storage is owned by the caller; the context only reads
//! its own precomputed state.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed};

use crate::error::{Error, Result};
use crate::limb;
use crate::modulus::ctx::{ModCtx, MAX_LIMBS};
use crate::modulus::{biguint_from_limbs, limbs_from_biguint};

impl ModCtx {
    #[inline(always)]
    pub fn zero(&self, r: &mut [u64]) {
        debug_assert!(r.len() == self.nlimbs());
        r.fill(0);
    }

    #[inline(always)]
    pub fn one(&self, r: &mut [u64]) {
        debug_assert!(r.len() == self.nlimbs());
        r.fill(0);
        r[0] = 1;
        // modulus >= 2, so 1 is canonical
    }

    #[inline(always)]
    pub fn set(&self, r: &mut [u64], a: &[u64]) {
        debug_assert!(r.len() == self.nlimbs() && a.len() == self.nlimbs());
        r.copy_from_slice(a);
    }

    #[inline(always)]
    pub fn swap(&self, a: &mut [u64], b: &mut [u64]) {
        debug_assert!(a.len() == self.nlimbs() && b.len() == self.nlimbs());
        a.swap_with_slice(b);
    }

    #[inline(always)]
    pub fn is_zero(&self, a: &[u64]) -> bool {
        limb::is_zero_n(a)
    }

    #[inline(always)]
    pub fn is_one(&self, a: &[u64]) -> bool {
        a[0] == 1 && limb::is_zero_n(&a[1..])
    }

    #[inline(always)]
    pub fn equal(&self, a: &[u64], b: &[u64]) -> bool {
        a == b
    }

    /// Reduces a small integer into the ring.
    pub fn set_u64(&self, r: &mut [u64], v: u64) {
        self.reduce_wide(r, &[v]);
    }

    /// Reduces an over-wide value (for example a `2n+1`-limb accumulator)
    /// directly to canonical form.
    #[inline(always)]
    pub fn set_from_wide(&self, r: &mut [u64], wide: &[u64]) {
        self.reduce_wide(r, wide);
    }

    #[inline(always)]
    pub fn add(&self, r: &mut [u64], a: &[u64], b: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n && b.len() == n);
        if n == 2 {
            let aa = (a[0] as u128) | ((a[1] as u128) << 64);
            let bb = (b[0] as u128) | ((b[1] as u128) << 64);
            let mm = (self.modulus()[0] as u128) | ((self.modulus()[1] as u128) << 64);
            let (mut s, ov) = aa.overflowing_add(bb);
            if ov || s >= mm {
                s = s.wrapping_sub(mm);
            }
            r[0] = s as u64;
            r[1] = (s >> 64) as u64;
            return;
        }
        let cy = limb::add_n(r, a, b);
        if cy != 0 || limb::cmp_n(r, self.modulus()) != core::cmp::Ordering::Less {
            limb::sub_n_assign(r, self.modulus());
        }
    }

    #[inline(always)]
    pub fn add_assign(&self, r: &mut [u64], a: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n);
        let cy = limb::add_n_assign(r, a);
        if cy != 0 || limb::cmp_n(r, self.modulus()) != core::cmp::Ordering::Less {
            limb::sub_n_assign(r, self.modulus());
        }
    }

    #[inline(always)]
    pub fn sub(&self, r: &mut [u64], a: &[u64], b: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n && b.len() == n);
        if n == 2 {
            let aa = (a[0] as u128) | ((a[1] as u128) << 64);
            let bb = (b[0] as u128) | ((b[1] as u128) << 64);
            let mm = (self.modulus()[0] as u128) | ((self.modulus()[1] as u128) << 64);
            let (mut s, bw) = aa.overflowing_sub(bb);
            if bw {
                s = s.wrapping_add(mm);
            }
            r[0] = s as u64;
            r[1] = (s >> 64) as u64;
            return;
        }
        let bw = limb::sub_n(r, a, b);
        if bw != 0 {
            limb::add_n_assign(r, self.modulus());
        }
    }

    #[inline(always)]
    pub fn sub_assign(&self, r: &mut [u64], a: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n);
        let bw = limb::sub_n_assign(r, a);
        if bw != 0 {
            limb::add_n_assign(r, self.modulus());
        }
    }

    #[inline(always)]
    pub fn neg(&self, r: &mut [u64], a: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n);
        if limb::is_zero_n(a) {
            r.fill(0);
        } else {
            limb::sub_n(r, self.modulus(), a);
        }
    }

    #[inline(always)]
    pub fn neg_assign(&self, r: &mut [u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n);
        if !limb::is_zero_n(r) {
            let mut t = [0u64; MAX_LIMBS];
            t[..n].copy_from_slice(r);
            limb::sub_n(r, self.modulus(), &t[..n]);
        }
    }

    /// `r = a * b mod m`: one full double-width product, one reduction.
    pub fn mul(&self, r: &mut [u64], a: &[u64], b: &[u64]) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n && b.len() == n);
        match n {
            1 => {
                let t = (a[0] as u128) * (b[0] as u128);
                self.reduce_wide(r, &[t as u64, (t >> 64) as u64]);
            }
            2 => {
                let mut t = [0u64; 4];
                limb::mul_2(&mut t, a, b);
                self.reduce_wide(r, &t);
            }
            3 => {
                let mut t = [0u64; 6];
                limb::mul_3(&mut t, a, b);
                self.reduce_wide(r, &t);
            }
            _ => {
                let mut t = [0u64; 2 * MAX_LIMBS];
                limb::mul_basecase(&mut t[..2 * n], a, b);
                self.reduce_wide(r, &t[..2 * n]);
            }
        }
    }

    pub fn mul_assign(&self, r: &mut [u64], b: &[u64]) {
        let n = self.nlimbs();
        let mut t = [0u64; MAX_LIMBS];
        t[..n].copy_from_slice(r);
        self.mul(r, &t[..n], b);
    }

    pub fn sqr(&self, r: &mut [u64], a: &[u64]) {
        self.mul(r, a, a);
    }

    /// `r = a^-1 mod m`, or `NotInvertible` when `gcd(a, m) != 1`.
    ///
    /// Inversion happens at the big-integer boundary: it is a per-division /
    /// per-pivot operation, never a per-coefficient one.
    pub fn inv(&self, r: &mut [u64], a: &[u64]) -> Result<()> {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n);
        let ab = BigInt::from(biguint_from_limbs(a));
        let mb = BigInt::from(self.modulus_biguint());
        let e = ab.extended_gcd(&mb);
        if !e.gcd.is_one() {
            return Err(Error::NotInvertible);
        }
        let x = e.x.mod_floor(&mb);
        debug_assert!(!x.is_negative());
        limbs_from_biguint(r, x.magnitude());
        Ok(())
    }

    /// `r = a / b mod m`.
    pub fn div(&self, r: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
        let n = self.nlimbs();
        let mut binv = [0u64; MAX_LIMBS];
        self.inv(&mut binv[..n], b)?;
        self.mul(r, a, &binv[..n]);
        Ok(())
    }

    /// Boundary conversion to a big integer.
    pub fn to_biguint(&self, a: &[u64]) -> num_bigint::BigUint {
        debug_assert!(a.len() == self.nlimbs());
        biguint_from_limbs(a)
    }

    /// Reduces a big integer into the ring.
    pub fn set_biguint(&self, r: &mut [u64], v: &num_bigint::BigUint) {
        debug_assert!(r.len() == self.nlimbs());
        let reduced = v % self.modulus_biguint();
        limbs_from_biguint(r, &reduced);
    }

    /// `r = a^exp mod m` by binary square-and-multiply.
    pub fn pow(&self, r: &mut [u64], a: &[u64], exp: u64) {
        let n = self.nlimbs();
        debug_assert!(r.len() == n && a.len() == n);
        let mut y = [0u64; MAX_LIMBS];
        let mut x = [0u64; MAX_LIMBS];
        self.one(&mut y[..n]);
        x[..n].copy_from_slice(a);
        let mut i = exp;
        while i > 0 {
            if i & 1 == 1 {
                self.mul_assign(&mut y[..n], &x[..n]);
            }
            let mut t = [0u64; MAX_LIMBS];
            t[..n].copy_from_slice(&x[..n]);
            self.mul(&mut x[..n], &t[..n], &t[..n]);
            i >>= 1;
        }
        r.copy_from_slice(&y[..n]);
    }
}
