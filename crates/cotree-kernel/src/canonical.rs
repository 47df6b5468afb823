//! AHU canonical codes and exact automorphism counts.
//!
//! Bottom-up over the unordered tree:
//!
//! ```text
//! leaf      code = "()"                              aut = 1
//! node      code = "(" + sorted child codes + ")"     aut = Π_class aut_c^m · m!
//! ```
//!
//! where a class groups the children sharing one code and `m` is its size.
//! Sorting the child codes is what forgets child order, so two trees get
//! the same code exactly when they are isomorphic as unordered rooted trees.
//!
//! Evaluation walks a preorder index in reverse (children before parents),
//! so tree height is bounded by memory, not by the call stack.

use crate::tree::{Preorder, Tree};
use num_bigint::BigUint;
use num_traits::One;
use serde::{Serialize, Serializer};

/// Canonical code plus `|Aut(T)|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalInfo {
    pub code: String,
    #[serde(serialize_with = "serialize_biguint")]
    pub aut: BigUint,
}

fn serialize_biguint<S: Serializer>(n: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(n)
}

/// Shape-only canonical form: labels are ignored.
pub fn canonicalize<A>(tree: &Tree<A>) -> CanonicalInfo {
    canonicalize_with(tree, None)
}

/// Label-sensitive canonical form.
///
/// Each node's code becomes `("label"...)`, the label quoted and escaped,
/// so only label-preserving isomorphisms identify trees and `aut` counts
/// label-preserving automorphisms.
pub fn canonicalize_labeled<A>(tree: &Tree<A>, render: &dyn Fn(&A) -> String) -> CanonicalInfo {
    canonicalize_with(tree, Some(render))
}

fn canonicalize_with<A>(tree: &Tree<A>, render: Option<&dyn Fn(&A) -> String>) -> CanonicalInfo {
    let index = Preorder::new(tree);
    let mut done: Vec<Option<CanonicalInfo>> = vec![None; index.len()];
    for id in (0..index.len()).rev() {
        let mut kids: Vec<CanonicalInfo> = index
            .children(id)
            .iter()
            .filter_map(|&c| done[c].take())
            .collect();
        let prefix = render.map(|r| format!("{:?}", r(&index.node(id).label)));
        done[id] = Some(combine(prefix.as_deref(), &mut kids));
    }
    done[0].take().unwrap_or_else(|| CanonicalInfo {
        code: "()".into(),
        aut: BigUint::one(),
    })
}

/// Fold already-canonical children into their parent's info.
fn combine(prefix: Option<&str>, kids: &mut [CanonicalInfo]) -> CanonicalInfo {
    kids.sort_by(|a, b| a.code.cmp(&b.code));

    let mut code = String::from("(");
    if let Some(p) = prefix {
        code.push_str(p);
    }
    let mut aut = BigUint::one();
    let mut start = 0;
    while start < kids.len() {
        let mut end = start + 1;
        while end < kids.len() && kids[end].code == kids[start].code {
            end += 1;
        }
        let multiplicity = end - start;
        for kid in &kids[start..end] {
            code.push_str(&kid.code);
        }
        aut *= kids[start].aut.pow(multiplicity as u32);
        aut *= factorial(multiplicity);
        start = end;
    }
    code.push(')');

    CanonicalInfo { code, aut }
}

/// Exact `n!`.
pub fn factorial(n: usize) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, k| acc * BigUint::from(k))
}

/// Canonical key of a forest treated as a multiset of trees.
pub fn forest_code<A>(forest: &[Tree<A>]) -> String {
    multiset_code(forest.iter().map(|t| canonicalize(t).code))
}

pub(crate) fn multiset_code(codes: impl Iterator<Item = String>) -> String {
    let mut codes: Vec<String> = codes.collect();
    codes.sort();
    format!("[{}]", codes.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Tree<String> {
        s.parse().unwrap()
    }

    fn aut(s: &str) -> u64 {
        u64::try_from(canonicalize(&t(s)).aut).unwrap()
    }

    #[test]
    fn leaf_is_empty_parens() {
        let info = canonicalize(&t("x"));
        assert_eq!(info.code, "()");
        assert_eq!(info.aut, BigUint::one());
    }

    #[test]
    fn symmetric_pair() {
        let info = canonicalize(&t("f(x,y)"));
        assert_eq!(info.code, "(()())");
        assert_eq!(info.aut, BigUint::from(2u32));
    }

    #[test]
    fn three_identical_children() {
        assert_eq!(aut("f(a,b,c)"), 6);
    }

    #[test]
    fn child_order_is_forgotten() {
        let a = canonicalize(&t("f(g(x,y),z)"));
        let b = canonicalize(&t("f(z,g(y,x))"));
        assert_eq!(a, b);
        assert_eq!(a.code, "((()())())");
        assert_ne!(a.code, canonicalize(&t("f(g(x),y,z)")).code);
    }

    #[test]
    fn automorphisms_compose_recursively() {
        // Two copies of a cherry: 2 · 2 swaps inside, times 2! for the pair.
        assert_eq!(aut("r(a(x,y),b(u,v))"), 8);
        // Cherry next to a leaf: only the inner swap.
        assert_eq!(aut("r(a(x,y),z)"), 2);
        // Star with four leaves.
        assert_eq!(aut("r(a,b,c,d)"), 24);
        // Path has no symmetry.
        assert_eq!(aut("a(b(c(d)))"), 1);
    }

    #[test]
    fn aut_is_exact_beyond_u64() {
        let leaves = vec!["x"; 30].join(",");
        let info = canonicalize(&t(&format!("r({leaves})")));
        assert_eq!(info.aut, factorial(30));
        assert!(u64::try_from(info.aut).is_err());
    }

    #[test]
    fn labels_only_matter_when_requested() {
        let render = |l: &String| l.clone();
        let a = t("f(x,y)");
        let b = t("f(x,x)");
        assert_eq!(canonicalize(&a), canonicalize(&b));
        let la = canonicalize_labeled(&a, &render);
        let lb = canonicalize_labeled(&b, &render);
        assert_ne!(la.code, lb.code);
        assert_eq!(la.aut, BigUint::one());
        assert_eq!(lb.aut, BigUint::from(2u32));
        assert_eq!(la.code, "(\"f\"(\"x\")(\"y\"))");
    }

    #[test]
    fn forest_code_is_order_free() {
        assert_eq!(
            forest_code(&[t("x"), t("g(y)")]),
            forest_code(&[t("g(y)"), t("x")])
        );
        assert_eq!(forest_code::<String>(&[]), "[]");
    }

    #[test]
    fn factorials() {
        assert_eq!(factorial(0), BigUint::one());
        assert_eq!(factorial(1), BigUint::one());
        assert_eq!(factorial(5), BigUint::from(120u32));
    }

    #[test]
    fn deep_chain_is_iterative() {
        let depth = 5_000;
        let src = format!("{}x{}", "a(".repeat(depth), ")".repeat(depth));
        let tree = t(&src);
        let info = canonicalize(&tree);
        assert_eq!(info.aut, BigUint::one());
        assert_eq!(info.code.len(), 2 * (depth + 1));
    }
}
