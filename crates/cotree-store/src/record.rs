//! Flat, serializable form of one aggregated term.

use cotree_kernel::{CotreeError, Delta, DeltaMode, Forest, Tree, WeightedTerm, key_of};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One line of an exported coproduct.
///
/// Trees are stored in the kernel's text notation, so a record can be read
/// back with `str::parse::<Tree<String>>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub mode: DeltaMode,
    pub key: String,
    /// Rendered coefficient (`"3"`, `"1/6"`, ...).
    pub coefficient: String,
    pub forest: Vec<String>,
    pub trunk: String,
}

impl DeltaRecord {
    pub fn from_term<C: Display, A: Display>(
        mode: DeltaMode,
        key: &str,
        term: &WeightedTerm<C, A>,
    ) -> Self {
        Self {
            mode,
            key: key.to_string(),
            coefficient: term.coefficient.to_string(),
            forest: term.forest.iter().map(key_of).collect(),
            trunk: key_of(&term.trunk),
        }
    }

    /// Parse the stored forest and trunk back into trees.
    pub fn trees(&self) -> Result<(Forest<String>, Tree<String>), CotreeError> {
        let forest = self
            .forest
            .iter()
            .map(|key| key.parse())
            .collect::<Result<Forest<String>, _>>()?;
        Ok((forest, self.trunk.parse()?))
    }
}

/// Flatten every term of `delta`, in key order.
pub fn records<C: Display, A: Display>(delta: &Delta<C, A>) -> Vec<DeltaRecord> {
    delta
        .iter()
        .map(|(key, term)| DeltaRecord::from_term(delta.mode(), key, term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotree_kernel::{DeltaOptions, Natural, Rationals, delta};

    #[test]
    fn records_follow_key_order() {
        let tree: Tree<String> = "f(x,y)".parse().unwrap();
        let d = delta(
            &tree,
            &Rationals,
            DeltaMode::SymmetricOrbit,
            &DeltaOptions::default(),
        )
        .unwrap();
        let rows = records(&d);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["[(),()]|()", "[()]|(())", "[]|(()())"]);
        assert_eq!(rows[0].coefficient, "1/2");
        assert_eq!(rows[0].forest, ["x", "y"]);
        assert_eq!(rows[0].trunk, "f");
        assert_eq!(rows[1].coefficient, "1");
        assert!(rows.iter().all(|r| r.mode == DeltaMode::SymmetricOrbit));
    }

    #[test]
    fn stored_trees_parse_back_with_awkward_labels() {
        let tree = Tree::node(
            "f ".to_string(),
            vec![Tree::leaf("a,b".to_string()), Tree::leaf(" c".to_string())],
        );
        let d = delta(&tree, &Natural, DeltaMode::Planar, &DeltaOptions::default()).unwrap();
        for row in records(&d) {
            let (forest, trunk) = row.trees().unwrap();
            assert_eq!(cotree_kernel::key_forest(&forest), format!("[{}]", row.forest.join(",")));
            assert_eq!(trunk.label, "f ");
        }
        let whole = records(&d)
            .into_iter()
            .find(|row| row.forest.is_empty())
            .unwrap();
        assert_eq!(whole.trees().unwrap().1, tree);
    }
}
