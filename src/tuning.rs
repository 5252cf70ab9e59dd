use crate::MAX_LIMBS;

/// Algorithm-selection cutoffs, owned by a [`crate::ModCtx`].
///
/// The boundaries are performance knobs, not correctness requirements: every
/// algorithm pair agrees on every input. Defaults below are round starting
/// points meant to be re-derived by benchmarking on the target machine;
/// [`crate::ModCtx::with_tuning`] injects replacements without touching any
/// algorithm code.
#[derive(Clone, Debug)]
pub struct Tuning {
    /// Minimum (balanced) length at which `poly_mullow` leaves the classical
    /// algorithm for Karatsuba, indexed by `nlimbs - 1`.
    pub mul_karatsuba_cutoff: [usize; MAX_LIMBS],
    /// Same, for squaring; symmetry roughly halves the sub-products so the
    /// crossover sits later.
    pub sqr_karatsuba_cutoff: [usize; MAX_LIMBS],
    /// Minimum balanced length at which Kronecker substitution takes over
    /// from Karatsuba.
    pub mul_ks_cutoff: usize,
    /// Minimum vector length before a Shoup scalar precomputation pays for
    /// itself.
    pub scalar_shoup_threshold: usize,
    /// Limb count at and above which the per-limb projection table replaces
    /// the Shoup path for scalar multiplication.
    pub scalar_table_limbs: usize,
    /// Quotient length at which `poly_divrem` switches from the basecase to
    /// the Newton preinverse path.
    pub divrem_newton_cutoff: usize,
    /// Series length at which `poly_inv_series` switches from the basecase
    /// to Newton doubling.
    pub inv_series_newton_cutoff: usize,
    /// Matrix dimension at which Waksman replaces classical multiplication.
    pub mat_mul_waksman_cutoff: usize,
    /// Matrix dimension at which multi-modular multiplication replaces
    /// Waksman.
    pub mat_mul_multimod_cutoff: usize,
    /// Modulus bit width below which Strassen is preferred over the
    /// multi-modular path on a single thread.
    pub mat_mul_strassen_bits: u32,
    /// Recursion floor for Strassen.
    pub mat_mul_strassen_cutoff: usize,
    /// Matrix dimension at which delayed-reduction LU replaces classical LU,
    /// indexed by `nlimbs - 1`.
    pub mat_lu_delayed_cutoff: [usize; MAX_LIMBS],
    /// Matrix dimension at which recursive block LU takes over.
    pub mat_lu_recursive_cutoff: usize,
    /// Matrix dimension at which the characteristic polynomial switches from
    /// Berkowitz to Danilevsky.
    pub charpoly_danilevsky_cutoff: usize,
    /// Worker threads for the multi-modular matrix product;
    /// 0 means `std::thread::available_parallelism()`.
    pub nthreads: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            mul_karatsuba_cutoff: [40, 32, 28, 24, 24, 20, 20, 20, 16, 16, 16, 16, 12, 12, 12, 12],
            sqr_karatsuba_cutoff: [60, 48, 40, 36, 36, 30, 30, 30, 24, 24, 24, 24, 18, 18, 18, 18],
            mul_ks_cutoff: 200,
            scalar_shoup_threshold: 8,
            scalar_table_limbs: 8,
            divrem_newton_cutoff: 60,
            inv_series_newton_cutoff: 30,
            mat_mul_waksman_cutoff: 8,
            mat_mul_multimod_cutoff: 48,
            mat_mul_strassen_bits: 192,
            mat_mul_strassen_cutoff: 24,
            mat_lu_delayed_cutoff: [24, 16, 12, 12, 10, 10, 8, 8, 8, 8, 6, 6, 6, 6, 6, 6],
            mat_lu_recursive_cutoff: 64,
            charpoly_danilevsky_cutoff: 12,
            nthreads: 0,
        }
    }
}

impl Tuning {
    pub(crate) fn worker_threads(&self) -> usize {
        if self.nthreads != 0 {
            return self.nthreads;
        }
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
}
