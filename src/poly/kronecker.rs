//! Kronecker substitution: pack the coefficients at a fixed limb stride wide
//! enough that no product term can spill into its neighbor, do one big
//! integer multiplication, then reduce each stride window independently.

use num_bigint::BigUint;

use crate::limb;
use crate::modulus::biguint_from_limbs;
use crate::modulus::ctx::ModCtx;

pub(crate) fn mullow_ks(ctx: &ModCtx, r: &mut [u64], a: &[u64], b: &[u64], outlen: usize) {
    let n = ctx.nlimbs();
    let lena = a.len() / n;
    let lenb = b.len() / n;
    let minlen = lena.min(lenb) as u64;
    // every product coefficient is < m^2 * minlen
    let stride_bits = 2 * ctx.modulus_bits() as usize + limb::bits_u64(minlen) as usize;
    let stride = stride_bits.div_ceil(64);

    let pack = |v: &[u64], lenv: usize| -> BigUint {
        let mut packed = vec![0u64; lenv * stride];
        for i in 0..lenv {
            packed[i * stride..i * stride + n].copy_from_slice(&v[i * n..(i + 1) * n]);
        }
        biguint_from_limbs(&packed)
    };

    let c = pack(a, lena) * pack(b, lenb);
    let digits = c.to_u64_digits();
    for k in 0..outlen {
        let rk = &mut r[k * n..(k + 1) * n];
        let lo = (k * stride).min(digits.len());
        let hi = ((k + 1) * stride).min(digits.len());
        ctx.reduce_wide(rk, &digits[lo..hi]);
    }
}
