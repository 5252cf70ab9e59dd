//! Multi-modular matrix multiplication.
//!
//! The product is computed modulo a set of word-size primes whose product
//! exceeds `inner * (m-1)^2`, one machine-word matrix product per prime.
//! Primes are partitioned across scoped worker threads writing disjoint
//! residue blocks; a single-threaded Chinese Remainder pass recombines each
//! entry and reduces it into the ring.

use std::thread;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::limb;
use crate::mat::{MatMut, MatRef};
use crate::modulus::ctx::ModCtx;
use crate::modulus::limbs_from_biguint;

#[inline(always)]
fn mulmod_u64(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

fn powmod_u64(mut a: u64, mut e: u64, p: u64) -> u64 {
    let mut r = 1u64;
    a %= p;
    while e > 0 {
        if e & 1 == 1 {
            r = mulmod_u64(r, a, p);
        }
        a = mulmod_u64(a, a, p);
        e >>= 1;
    }
    r
}

/// Deterministic Miller-Rabin for 64-bit inputs.
fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &[2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }
    'outer: for &a in &[2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let mut x = powmod_u64(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mulmod_u64(x, x, n);
            if x == n - 1 {
                continue 'outer;
            }
        }
        return false;
    }
    true
}

fn prev_prime(mut n: u64) -> u64 {
    if n % 2 == 0 {
        n -= 1;
    }
    while !is_prime_u64(n) {
        n -= 2;
    }
    n
}

pub(crate) fn mat_mul_multimod(ctx: &ModCtx, c: &mut MatMut<'_>, a: MatRef<'_>, b: MatRef<'_>) {
    let m = a.rows;
    let inner = a.cols;
    let p = b.cols;
    if inner == 0 {
        for i in 0..m {
            c.row_mut(i).fill(0);
        }
        return;
    }

    // primes just below 2^62: enough that their product covers inner * (m-1)^2
    let needed_bits = 2 * ctx.modulus_bits() as u64 + limb::bits_u64(inner as u64) as u64 + 1;
    let mut primes: Vec<u64> = Vec::new();
    let mut have_bits = 0u64;
    let mut cand = (1u64 << 62) - 1;
    while have_bits < needed_bits {
        cand = prev_prime(cand);
        primes.push(cand);
        have_bits += cand.ilog2() as u64;
        cand -= 2;
    }
    let np = primes.len();

    let mut residues = vec![0u64; np * m * p];
    let nthreads = ctx.tuning().worker_threads().min(np).max(1);
    let chunk = np.div_ceil(nthreads);
    thread::scope(|scope| {
        for (prime_chunk, out_chunk) in primes.chunks(chunk).zip(residues.chunks_mut(chunk * m * p))
        {
            scope.spawn(move || {
                for (pi, &prime) in prime_chunk.iter().enumerate() {
                    residue_matmul(a, b, prime, &mut out_chunk[pi * m * p..(pi + 1) * m * p]);
                }
            });
        }
    });

    // CRT basis: g[i] = (M / p_i) * ((M / p_i)^-1 mod p_i), as limbs of M
    let mprod = primes.iter().fold(BigUint::one(), |acc, &q| acc * q);
    let lm = (mprod.bits() as usize).div_ceil(64);
    let mut basis = vec![0u64; np * lm];
    for (i, &q) in primes.iter().enumerate() {
        let mi = &mprod / q;
        let mi_mod = (&mi % q).to_u64().expect("residue fits");
        let inv = powmod_u64(mi_mod, q - 2, q);
        let gi = mi * inv;
        limbs_from_biguint(&mut basis[i * lm..(i + 1) * lm], &gi);
    }
    let wide = WideMod::new(&mprod, lm);

    let mut acc = vec![0u64; lm + 2];
    let mut folded = vec![0u64; lm];
    for i in 0..m {
        for j in 0..p {
            acc.fill(0);
            for t in 0..np {
                let r = residues[t * m * p + i * p + j];
                if r == 0 {
                    continue;
                }
                let cy = limb::addmul_1(&mut acc[..lm], &basis[t * lm..(t + 1) * lm], r);
                let _ = limb::add_n_assign(&mut acc[lm..], &[cy]);
            }
            wide.rem(&acc, &mut folded);
            ctx.reduce_wide(c.entry_mut(i, j), &folded);
        }
    }
}

/// One residue product: entries reduced into the word prime, rows against
/// gathered columns with a three-limb unreduced accumulator per entry.
fn residue_matmul(a: MatRef<'_>, b: MatRef<'_>, prime: u64, out: &mut [u64]) {
    let m = a.rows;
    let inner = a.cols;
    let p = b.cols;
    let mut am = vec![0u64; m * inner];
    for i in 0..m {
        for t in 0..inner {
            am[i * inner + t] = fold_mod(a.entry(i, t), prime);
        }
    }
    // column-major residues of b for contiguous inner loops
    let mut bt = vec![0u64; p * inner];
    for t in 0..inner {
        for j in 0..p {
            bt[j * inner + t] = fold_mod(b.entry(t, j), prime);
        }
    }
    for i in 0..m {
        let arow = &am[i * inner..(i + 1) * inner];
        for j in 0..p {
            let bcol = &bt[j * inner..(j + 1) * inner];
            let mut lo: u128 = 0;
            let mut hi: u64 = 0;
            for t in 0..inner {
                let prod = (arow[t] as u128) * (bcol[t] as u128);
                let (s, ov) = lo.overflowing_add(prod);
                lo = s;
                hi += ov as u64;
            }
            out[i * p + j] = fold_mod(&[lo as u64, (lo >> 64) as u64, hi], prime);
        }
    }
}

#[inline(always)]
fn fold_mod(limbs: &[u64], p: u64) -> u64 {
    let mut r: u64 = 0;
    for &l in limbs.iter().rev() {
        r = ((((r as u128) << 64) | l as u128) % p as u128) as u64;
    }
    r
}

/// Normalized divisor for the prime product, for reducing CRT sums below `M`.
struct WideMod {
    dnorm: Vec<u64>,
    norm: u32,
    vinv: u64,
}

impl WideMod {
    fn new(mprod: &BigUint, lm: usize) -> Self {
        let mut d = vec![0u64; lm];
        limbs_from_biguint(&mut d, mprod);
        let norm = d[lm - 1].leading_zeros();
        let mut dnorm = vec![0u64; lm];
        let cy = limb::shl_n(&mut dnorm, &d, norm);
        debug_assert!(cy == 0);
        let one: BigUint = One::one();
        let vinv = if lm == 1 {
            let dd = BigUint::from(dnorm[0]);
            (((&one << 128u32) - 1u32) / dd - (&one << 64u32)).to_u64().unwrap()
        } else {
            let dd = (BigUint::from(dnorm[lm - 1]) << 64u32) + BigUint::from(dnorm[lm - 2]);
            (((&one << 192u32) - 1u32) / dd - (&one << 64u32)).to_u64().unwrap()
        };
        Self { dnorm, norm, vinv }
    }

    /// `out = value mod M`; `value` is a few limbs wider than `M`.
    fn rem(&self, value: &[u64], out: &mut [u64]) {
        let lm = self.dnorm.len();
        let mut un = vec![0u64; value.len() + 1];
        un[value.len()] = limb::shl_n(&mut un[..value.len()], value, self.norm);
        limb::rem_normalized(&mut un, &self.dnorm, self.vinv);
        limb::shr_n(out, &un[..lm], self.norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulus::biguint_from_limbs;

    #[test]
    fn small_primality() {
        assert!(is_prime_u64(2) && is_prime_u64(3) && is_prime_u64(61));
        assert!(!is_prime_u64(1) && !is_prime_u64(91) && !is_prime_u64(1 << 62));
        let q = prev_prime((1 << 62) - 1);
        assert!(is_prime_u64(q) && q < (1 << 62));
    }

    #[test]
    fn fold_matches_naive() {
        let p = 1_000_000_007u64;
        let v = biguint_from_limbs(&[u64::MAX, 12345, 99]);
        let want = (&v % p).to_u64().unwrap();
        assert_eq!(fold_mod(&[u64::MAX, 12345, 99], p), want);
    }
}
