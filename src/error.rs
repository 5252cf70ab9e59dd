/// Errors surfaced by ring, polynomial and matrix operations.
///
/// `NotInvertible` is an expected outcome over a non-field modulus and must be
/// handled by callers that cannot assume primality; the other variants signal
/// misuse or unsupported parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The modulus is zero, below 2, or not minimally sized.
    #[error("InvalidModulus: {0}")]
    InvalidModulus(String),
    /// The context or size is outside what this implementation supports
    /// (for example a modulus wider than [`crate::MAX_LIMBS`] limbs); the
    /// caller should pick a different backend rather than retry.
    #[error("Unable: {0}")]
    Unable(String),
    /// gcd(a, modulus) != 1: the element has no inverse in this ring.
    #[error("NotInvertible")]
    NotInvertible,
    /// The operation is mathematically undefined for the given input.
    #[error("Domain: {0}")]
    Domain(String),
    #[error("DimensionMismatch: {0}")]
    DimensionMismatch(String),
}

pub type Result<T> = core::result::Result<T, Error>;
