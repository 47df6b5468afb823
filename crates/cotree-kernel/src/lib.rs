//! # Cotree Kernel
//!
//! The weight engine of the combinatorial tree cooperad: enumerate the
//! admissible cuts of a rooted tree, identify cuts up to tree symmetry,
//! and sum per-cut weights in a pluggable semiring.
//!
//! ## Architecture
//!
//! ```text
//! Rational              ← exact p/q in lowest terms
//!     │
//! Semiring              ← Natural, Integer, Rationals, Polynomial<M, R>
//!     │
//! Tree / Forest         ← ordered trees, injective keys, text notation
//!     │
//! canonicalize          ← AHU code + |Aut(T)|
//!     │
//! Cuts                  ← lazy admissible cuts (forest, trunk)
//!     │
//! delta / aggregate     ← planar | symmetric-agg | symmetric-orbit
//! ```
//!
//! Everything is built per call and immutable; nothing is shared between
//! calls.

pub mod canonical;
pub mod cuts;
pub mod delta;
pub mod error;
pub mod rational;
pub mod semiring;
pub mod tree;

pub use canonical::{CanonicalInfo, canonicalize, canonicalize_labeled, factorial, forest_code};
pub use cuts::{Cuts, admissible_cuts, cut_count};
pub use delta::{
    Delta, DeltaMode, DeltaOptions, Symmetry, WeightFn, WeightedTerm, aggregate, delta,
};
pub use error::CotreeError;
pub use rational::Rational;
pub use semiring::{Concat, Degree, Integer, Monoid, Natural, Polynomial, Rationals, Semiring};
pub use tree::{
    Forest, Tree, escape_label, key_forest, key_forest_with, key_of, key_of_with, parse_forest,
};
