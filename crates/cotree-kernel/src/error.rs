//! Error types for cotree kernel operations.

/// Errors arising from invalid arithmetic, missing symmetry data, or
/// malformed tree notation.
///
/// Canonicalization, cut enumeration, and planar / symmetric aggregation
/// are total and never produce these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CotreeError {
    /// A fraction was constructed with denominator zero.
    #[error("invalid fraction: zero denominator (numerator {numerator})")]
    ZeroDenominator { numerator: String },

    /// A value was divided by zero.
    #[error("division by zero: {dividend} / 0")]
    DivisionByZero { dividend: String },

    /// Orbit normalization was requested without the whole tree.
    #[error(
        "missing symmetry context: symmetric-orbit aggregation needs the whole input tree \
         to compute |Aut(T)|"
    )]
    MissingSymmetryContext,

    /// The semiring cannot divide exactly by an automorphism count.
    #[error("inexact division: semiring `{semiring}` cannot divide by {divisor}")]
    InexactDivision { semiring: &'static str, divisor: String },

    /// Tree notation could not be parsed.
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },
}
