//! Ring of integers modulo a multi-limb modulus, with vector, polynomial and
//! matrix layers built on delayed reduction.
//!
//! A [`ModCtx`] owns the modulus, its normalized form and a precomputed
//! reciprocal; elements are caller-owned fixed-width limb slices kept in
//! canonical form. Higher layers accumulate unreduced sums of products in
//! oversized buffers and funnel them through a single reduction
//! ([`ModCtx::reduce_wide`]) as late as the accumulator width allows.
//! Polynomial and matrix operations pick between competing algorithms from
//! the injectable [`Tuning`] tables owned by the context.

pub mod error;
pub mod limb;
pub mod mat;
pub mod modulus;
pub mod poly;
pub mod scratch;
pub mod tuning;
pub mod unreduced;

mod element;
mod vec;

pub use error::{Error, Result};
pub use mat::{Mat, MatMut, MatRef};
pub use modulus::ctx::{IsField, ModCtx, MAX_LIMBS};
pub use modulus::scalar::{LimbMulTable, ShoupPrecomp};
pub use scratch::{Scratch, ScratchOwned};
pub use tuning::Tuning;
pub use unreduced::Unreduced;
