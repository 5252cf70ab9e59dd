pub mod ctx;
pub mod reduce;
pub mod scalar;

use num_bigint::BigUint;

/// Boundary conversion: little-endian limbs to a big integer.
pub(crate) fn biguint_from_limbs(limbs: &[u64]) -> BigUint {
    let bytes: Vec<u8> = limbs.iter().flat_map(|l| l.to_le_bytes()).collect();
    BigUint::from_bytes_le(&bytes)
}

/// Boundary conversion: big integer into fixed-width little-endian limbs.
/// The value must fit.
pub(crate) fn limbs_from_biguint(dst: &mut [u64], v: &BigUint) {
    let mut digits = v.iter_u64_digits();
    for d in dst.iter_mut() {
        *d = digits.next().unwrap_or(0);
    }
    debug_assert!(digits.next().is_none());
}
