//! Weighted coproduct Δ(T) = Σ c · (forest ⊗ trunk).
//!
//! The aggregator pulls admissible cuts, gives each a coefficient (the
//! weight function, `one` by default), and merges terms that share a key
//! by semiring addition. What "share a key" means is the symmetry mode:
//!
//! - **planar**: exact ordered structure, `key_forest | key_of`.
//! - **symmetric-agg**: canonical codes, so isomorphic but differently
//!   arranged terms collapse and their coefficients add up.
//! - **symmetric-orbit**: canonical codes, and every coefficient is divided
//!   by `|Aut(T)|` of the whole input tree before it is added.

use crate::canonical::{CanonicalInfo, canonicalize, canonicalize_labeled, multiset_code};
use crate::error::CotreeError;
use crate::semiring::Semiring;
use crate::tree::{Forest, Tree, key_forest, key_of};
use num_bigint::BigUint;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use tracing::{debug, instrument};

/// The symmetry mode of an aggregation, carrying what the mode needs.
#[derive(Debug)]
pub enum Symmetry<'t, A> {
    Planar,
    SymmetricAgg,
    /// Orbit normalization divides by `|Aut(whole)|`; `whole` must be set.
    SymmetricOrbit { whole: Option<&'t Tree<A>> },
}

impl<A> Symmetry<'_, A> {
    pub fn mode(&self) -> DeltaMode {
        match self {
            Self::Planar => DeltaMode::Planar,
            Self::SymmetricAgg => DeltaMode::SymmetricAgg,
            Self::SymmetricOrbit { .. } => DeltaMode::SymmetricOrbit,
        }
    }
}

impl<A> Clone for Symmetry<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Symmetry<'_, A> {}

/// The bare mode tag, as selected on a command line or in a config file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DeltaMode {
    #[default]
    Planar,
    SymmetricAgg,
    SymmetricOrbit,
}

impl DeltaMode {
    /// Attach the whole tree, producing a complete [`Symmetry`].
    pub fn bind<A>(self, whole: &Tree<A>) -> Symmetry<'_, A> {
        match self {
            Self::Planar => Symmetry::Planar,
            Self::SymmetricAgg => Symmetry::SymmetricAgg,
            Self::SymmetricOrbit => Symmetry::SymmetricOrbit { whole: Some(whole) },
        }
    }
}

impl fmt::Display for DeltaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planar => write!(f, "planar"),
            Self::SymmetricAgg => write!(f, "symmetric-agg"),
            Self::SymmetricOrbit => write!(f, "symmetric-orbit"),
        }
    }
}

impl std::str::FromStr for DeltaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "planar" => Ok(Self::Planar),
            "symmetric-agg" | "agg" => Ok(Self::SymmetricAgg),
            "symmetric-orbit" | "orbit" => Ok(Self::SymmetricOrbit),
            _ => Err(format!("unknown delta mode: {s}")),
        }
    }
}

/// Per-term coefficient override.
pub type WeightFn<'w, A, C> = Box<dyn Fn(&Forest<A>, &Tree<A>) -> C + 'w>;

/// Knobs shared by every mode.
pub struct DeltaOptions<'w, A, C> {
    /// Coefficient of each admissible cut; `one` when absent.
    pub weight: Option<WeightFn<'w, A, C>>,
    /// Fold labels into canonical keys (symmetric modes only).
    pub label_sensitive: bool,
}

impl<A, C> Default for DeltaOptions<'_, A, C> {
    fn default() -> Self {
        Self {
            weight: None,
            label_sensitive: false,
        }
    }
}

impl<'w, A, C> DeltaOptions<'w, A, C> {
    pub fn with_weight(mut self, weight: impl Fn(&Forest<A>, &Tree<A>) -> C + 'w) -> Self {
        self.weight = Some(Box::new(weight));
        self
    }

    pub fn label_sensitive(mut self, on: bool) -> Self {
        self.label_sensitive = on;
        self
    }
}

/// One merged term: its accumulated coefficient and a representative cut.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WeightedTerm<C, A> {
    pub coefficient: C,
    pub forest: Forest<A>,
    pub trunk: Tree<A>,
}

/// The aggregated coproduct: key → merged term.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<C, A> {
    mode: DeltaMode,
    cuts_seen: usize,
    terms: BTreeMap<String, WeightedTerm<C, A>>,
}

impl<C, A> Delta<C, A> {
    pub fn mode(&self) -> DeltaMode {
        self.mode
    }

    /// Admissible cuts consumed before merging.
    pub fn cuts_seen(&self) -> usize {
        self.cuts_seen
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&WeightedTerm<C, A>> {
        self.terms.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WeightedTerm<C, A>)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sum of all coefficients.
    pub fn total<S: Semiring<Elem = C>>(&self, semiring: &S) -> C {
        semiring.sum(self.terms.values().map(|t| &t.coefficient))
    }
}

impl<C, A> IntoIterator for Delta<C, A> {
    type Item = (String, WeightedTerm<C, A>);
    type IntoIter = std::collections::btree_map::IntoIter<String, WeightedTerm<C, A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

/// Aggregate every admissible cut of `tree` under `mode`.
///
/// The whole tree is supplied to orbit normalization automatically.
pub fn delta<S, A>(
    tree: &Tree<A>,
    semiring: &S,
    mode: DeltaMode,
    options: &DeltaOptions<'_, A, S::Elem>,
) -> Result<Delta<S::Elem, A>, CotreeError>
where
    S: Semiring,
    A: Clone + fmt::Display,
{
    aggregate(tree.cuts(), semiring, mode.bind(tree), options)
}

/// Aggregate an arbitrary stream of `(forest, trunk)` cuts.
#[instrument(level = "debug", skip_all, fields(mode = %symmetry.mode(), semiring = semiring.name()))]
pub fn aggregate<S, A, I>(
    cuts: I,
    semiring: &S,
    symmetry: Symmetry<'_, A>,
    options: &DeltaOptions<'_, A, S::Elem>,
) -> Result<Delta<S::Elem, A>, CotreeError>
where
    S: Semiring,
    A: fmt::Display,
    I: IntoIterator<Item = (Forest<A>, Tree<A>)>,
{
    let canon = |tree: &Tree<A>| -> CanonicalInfo {
        if options.label_sensitive {
            canonicalize_labeled(tree, &|label: &A| label.to_string())
        } else {
            canonicalize(tree)
        }
    };

    // Fail before consuming anything.
    let orbit: Option<BigUint> = match symmetry {
        Symmetry::SymmetricOrbit { whole: None } => {
            return Err(CotreeError::MissingSymmetryContext);
        }
        Symmetry::SymmetricOrbit { whole: Some(whole) } => {
            let aut = canon(whole).aut;
            debug!(%aut, "orbit normalization");
            Some(aut)
        }
        Symmetry::Planar | Symmetry::SymmetricAgg => None,
    };

    let mut terms: BTreeMap<String, WeightedTerm<S::Elem, A>> = BTreeMap::new();
    let mut cuts_seen = 0usize;
    for (forest, trunk) in cuts {
        cuts_seen += 1;
        let key = match symmetry {
            Symmetry::Planar => format!("{}|{}", key_forest(&forest), key_of(&trunk)),
            Symmetry::SymmetricAgg | Symmetry::SymmetricOrbit { .. } => format!(
                "{}|{}",
                multiset_code(forest.iter().map(|t| canon(t).code)),
                canon(&trunk).code
            ),
        };
        let mut coefficient = match &options.weight {
            Some(weight) => weight(&forest, &trunk),
            None => semiring.one(),
        };
        if let Some(aut) = &orbit {
            coefficient = semiring.divide_by(&coefficient, aut)?;
        }
        match terms.entry(key) {
            Entry::Occupied(mut slot) => {
                let merged = semiring.add(&slot.get().coefficient, &coefficient);
                slot.get_mut().coefficient = merged;
            }
            Entry::Vacant(slot) => {
                slot.insert(WeightedTerm {
                    coefficient,
                    forest,
                    trunk,
                });
            }
        }
    }

    debug!(cuts_seen, distinct = terms.len(), "aggregated coproduct");
    Ok(Delta {
        mode: symmetry.mode(),
        cuts_seen,
        terms,
    })
}
