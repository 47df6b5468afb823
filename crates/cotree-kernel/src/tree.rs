//! Rooted trees with ordered children.
//!
//! Trees are freely generated values: no sharing, no cycles, never mutated
//! once built. Child order is significant for identity (`key_of`) and
//! ignored by canonical codes (see `canonical`).
//!
//! ## Notation
//!
//! The text form is `label` for a leaf and `label(child, child, ...)` for an
//! internal node, e.g. `f(g(x,y),z)`. Labels escape the reserved characters
//! `\ ( ) , [ ] |` with a backslash, so rendering is injective. Whitespace
//! around a label is layout unless escaped.

use crate::error::CotreeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A label plus an ordered, finite list of children.
///
/// `Clone`, `Drop`, equality and hashing walk the tree with explicit
/// worklists, so arbitrarily deep trees never touch the native stack.
#[derive(Debug, Serialize, Deserialize)]
pub struct Tree<A> {
    pub label: A,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Tree<A>>,
}

/// The pruned-away branches of a cut, in left-to-right order.
pub type Forest<A> = Vec<Tree<A>>;

impl<A> Tree<A> {
    pub fn leaf(label: A) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    pub fn node(label: A, children: Vec<Tree<A>>) -> Self {
        Self { label, children }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        Preorder::new(self).len()
    }

    /// Edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let index = Preorder::new(self);
        let mut depth = vec![0usize; index.len()];
        for i in 1..index.len() {
            depth[i] = depth[index.parent(i)] + 1;
        }
        depth.into_iter().max().unwrap_or(0)
    }
}

impl<A> Drop for Tree<A> {
    fn drop(&mut self) {
        // Detach grandchildren first so every nested drop sees no children.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

impl<A: Clone> Clone for Tree<A> {
    fn clone(&self) -> Self {
        Preorder::new(self).rebuild(0, |_| true)
    }
}

impl<A: PartialEq> PartialEq for Tree<A> {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];
        while let Some((a, b)) = pairs.pop() {
            if a.label != b.label || a.children.len() != b.children.len() {
                return false;
            }
            pairs.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl<A: Eq> Eq for Tree<A> {}

impl<A: Hash> Hash for Tree<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Preorder (label, arity) pairs determine the tree.
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            tree.label.hash(state);
            tree.children.len().hash(state);
            stack.extend(tree.children.iter().rev());
        }
    }
}

// ─── Preorder index ─────────────────────────────────────────────────────────

/// A flattened preorder view of a borrowed tree.
///
/// Node 0 is the root, and every child has a larger index than its parent,
/// so iterating indices in reverse visits children before parents. Lets
/// the canonicalizer and enumerator run without native recursion.
#[derive(Debug)]
pub(crate) struct Preorder<'a, A> {
    nodes: Vec<&'a Tree<A>>,
    parents: Vec<usize>,
    children: Vec<Vec<usize>>,
    /// One past the last index of each subtree; subtrees are contiguous.
    ends: Vec<usize>,
}

impl<'a, A> Preorder<'a, A> {
    pub(crate) fn new(root: &'a Tree<A>) -> Self {
        let mut nodes = Vec::new();
        let mut parents = Vec::new();
        let mut children: Vec<Vec<usize>> = Vec::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((tree, parent)) = stack.pop() {
            let id = nodes.len();
            nodes.push(tree);
            parents.push(parent);
            children.push(Vec::with_capacity(tree.children.len()));
            if id > 0 {
                children[parent].push(id);
            }
            // Reverse push so the leftmost child is popped (and numbered) first.
            for child in tree.children.iter().rev() {
                stack.push((child, id));
            }
        }
        let mut ends = vec![0usize; nodes.len()];
        for id in (0..nodes.len()).rev() {
            ends[id] = children[id].last().map_or(id + 1, |&last| ends[last]);
        }
        Self {
            nodes,
            parents,
            children,
            ends,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: usize) -> &'a Tree<A> {
        self.nodes[id]
    }

    /// The root is its own parent.
    pub(crate) fn parent(&self, id: usize) -> usize {
        self.parents[id]
    }

    pub(crate) fn children(&self, id: usize) -> &[usize] {
        &self.children[id]
    }

    /// Owned copy of the subtree at `id`, dropping every descendant for
    /// which `keep` is false (and with it that descendant's subtree).
    /// Built bottom-up over the subtree's index range.
    pub(crate) fn rebuild(&self, id: usize, keep: impl Fn(usize) -> bool) -> Tree<A>
    where
        A: Clone,
    {
        let end = self.ends[id];
        let mut built: Vec<Option<Tree<A>>> = (id..end).map(|_| None).collect();
        let gather = |built: &mut Vec<Option<Tree<A>>>, n: usize| -> Vec<Tree<A>> {
            self.children[n]
                .iter()
                .filter_map(|&c| built[c - id].take())
                .collect()
        };
        for n in (id + 1..end).rev() {
            if keep(n) {
                let children = gather(&mut built, n);
                built[n - id] = Some(Tree::node(self.nodes[n].label.clone(), children));
            }
        }
        let children = gather(&mut built, id);
        Tree::node(self.nodes[id].label.clone(), children)
    }
}

// ─── Keys ───────────────────────────────────────────────────────────────────

const RESERVED: &[char] = &['\\', '(', ')', ',', '[', ']', '|'];

/// Escape the notation's reserved characters in a rendered label, plus any
/// leading or trailing whitespace (the parser treats bare edge whitespace
/// as layout).
pub fn escape_label(raw: &str) -> String {
    let start = raw.len() - raw.trim_start().len();
    let end = raw.trim_end().len();
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.char_indices() {
        let edge_space = ch.is_whitespace() && (i < start || i >= end);
        if RESERVED.contains(&ch) || edge_space {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Structural identity key of a tree, rendering labels with `Display`.
///
/// Equal keys iff the trees are equal as ordered trees (given an injective
/// `Display` for `A`).
pub fn key_of<A: fmt::Display>(tree: &Tree<A>) -> String {
    key_of_with(tree, &|label: &A| label.to_string())
}

/// Structural identity key of a tree with a caller-supplied label renderer.
pub fn key_of_with<A>(tree: &Tree<A>, render: &dyn Fn(&A) -> String) -> String {
    let mut out = String::new();
    write_key(&mut out, tree, render);
    out
}

/// Structural identity key of a forest: `[key,key,...]`.
pub fn key_forest<A: fmt::Display>(forest: &[Tree<A>]) -> String {
    key_forest_with(forest, &|label: &A| label.to_string())
}

pub fn key_forest_with<A>(forest: &[Tree<A>], render: &dyn Fn(&A) -> String) -> String {
    let mut out = String::from("[");
    for (i, tree) in forest.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_key(&mut out, tree, render);
    }
    out.push(']');
    out
}

enum KeyStep<'a, A> {
    Enter(&'a Tree<A>),
    Text(&'static str),
}

fn write_key<A>(out: &mut String, tree: &Tree<A>, render: &dyn Fn(&A) -> String) {
    let mut stack = vec![KeyStep::Enter(tree)];
    while let Some(step) = stack.pop() {
        match step {
            KeyStep::Text(s) => out.push_str(s),
            KeyStep::Enter(t) => {
                out.push_str(&escape_label(&render(&t.label)));
                if t.children.is_empty() {
                    continue;
                }
                out.push('(');
                stack.push(KeyStep::Text(")"));
                for (i, child) in t.children.iter().enumerate().rev() {
                    stack.push(KeyStep::Enter(child));
                    if i > 0 {
                        stack.push(KeyStep::Text(","));
                    }
                }
            }
        }
    }
}

impl<A: fmt::Display> fmt::Display for Tree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&key_of(self))
    }
}

// ─── Parsing ────────────────────────────────────────────────────────────────

impl FromStr for Tree<String> {
    type Err = CotreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            chars: s.char_indices().collect(),
            pos: 0,
            len: s.len(),
        };
        let tree = parser.tree()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(tree),
            Some((offset, ch)) => Err(CotreeError::Parse {
                offset,
                message: format!("unexpected `{ch}` after tree"),
            }),
        }
    }
}

/// Parse a forest in `[t1,t2,...]` notation.
pub fn parse_forest(s: &str) -> Result<Forest<String>, CotreeError> {
    let mut parser = Parser {
        chars: s.char_indices().collect(),
        pos: 0,
        len: s.len(),
    };
    parser.skip_ws();
    parser.expect('[')?;
    let mut forest = Vec::new();
    parser.skip_ws();
    if parser.eat(']') {
        return Ok(forest);
    }
    loop {
        forest.push(parser.tree()?);
        parser.skip_ws();
        if parser.eat(']') {
            break;
        }
        parser.expect(',')?;
    }
    parser.skip_ws();
    match parser.peek() {
        None => Ok(forest),
        Some((offset, ch)) => Err(CotreeError::Parse {
            offset,
            message: format!("unexpected `{ch}` after forest"),
        }),
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
}

/// A node whose children are still being read.
struct Open {
    label: String,
    children: Vec<Tree<String>>,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.len, |(o, _)| o)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, want: char) -> bool {
        if matches!(self.peek(), Some((_, c)) if c == want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: char) -> Result<(), CotreeError> {
        if self.eat(want) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{want}`")))
        }
    }

    fn error(&self, message: String) -> CotreeError {
        CotreeError::Parse {
            offset: self.offset(),
            message,
        }
    }

    fn label(&mut self) -> Result<String, CotreeError> {
        self.skip_ws();
        let mut label = String::new();
        let mut kept = 0;
        while let Some((_, ch)) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some((_, escaped)) => label.push(escaped),
                    None => return Err(self.error("dangling escape".into())),
                }
                self.pos += 1;
                kept = label.len();
            } else if RESERVED.contains(&ch) {
                break;
            } else {
                label.push(ch);
                self.pos += 1;
                if !ch.is_whitespace() {
                    kept = label.len();
                }
            }
        }
        // Unescaped trailing whitespace is layout; escaped whitespace is label.
        label.truncate(kept);
        if label.is_empty() {
            return Err(self.error("expected a label".into()));
        }
        Ok(label)
    }

    /// Iterative so that deeply nested input cannot exhaust the stack.
    fn tree(&mut self) -> Result<Tree<String>, CotreeError> {
        let mut open: Vec<Open> = Vec::new();
        loop {
            let label = self.label()?;
            self.skip_ws();
            if self.eat('(') {
                open.push(Open {
                    label,
                    children: Vec::new(),
                });
                continue;
            }
            let mut done = Tree::leaf(label);
            loop {
                let Some(parent) = open.last_mut() else {
                    return Ok(done);
                };
                parent.children.push(done);
                self.skip_ws();
                if self.eat(',') {
                    break;
                }
                self.expect(')')?;
                let Some(closed) = open.pop() else {
                    return Err(self.error("unbalanced `)`".into()));
                };
                done = Tree::node(closed.label, closed.children);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod strategies {
    use super::Tree;
    use proptest::prelude::*;

    /// Small labeled trees with repeated labels, so mirror images are common.
    pub(crate) fn arb_tree() -> impl Strategy<Value = Tree<String>> {
        let leaf = prop::sample::select(vec!["x", "y"]).prop_map(|l| Tree::leaf(l.to_string()));
        leaf.prop_recursive(4, 24, 3, |inner| {
            (
                prop::sample::select(vec!["f", "g"]),
                prop::collection::vec(inner, 1..=3),
            )
                .prop_map(|(label, children)| Tree::node(label.to_string(), children))
        })
    }
}
