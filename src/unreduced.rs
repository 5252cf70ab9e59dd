//! Typed unreduced accumulators.
//!
//! An [`Unreduced`] value is a sum of double-width products that has not been
//! folded back into the ring yet. Keeping it as its own type (rather than a
//! bare limb buffer) means an unreduced value cannot be compared, stored or
//! returned as an element: the only way out is [`Unreduced::reduce`], which
//! funnels through [`crate::ModCtx::reduce_wide`]. The width parameter is the
//! magnitude bound: `W` limbs hold any sum the callers can legally build.

use crate::limb;
use crate::modulus::ctx::ModCtx;

#[derive(Clone, Copy, Debug)]
pub struct Unreduced<const W: usize>([u64; W]);

impl<const W: usize> Default for Unreduced<W> {
    fn default() -> Self {
        Self([0u64; W])
    }
}

impl<const W: usize> Unreduced<W> {
    #[inline(always)]
    pub fn zero() -> Self {
        Self([0u64; W])
    }

    /// Accumulates an unreduced product (or any nonnegative limb value).
    #[inline(always)]
    pub fn add_limbs(&mut self, p: &[u64]) {
        debug_assert!(p.len() <= W);
        let cy = limb::add_n_assign(&mut self.0, p);
        debug_assert!(cy == 0, "accumulator width exhausted");
    }

    /// Folds the accumulator into a canonical element.
    #[inline(always)]
    pub fn reduce(&self, ctx: &ModCtx, dst: &mut [u64]) {
        ctx.reduce_wide(dst, &self.0);
    }
}
