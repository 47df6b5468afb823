//! Admissible cuts: the terms of the tree coproduct Δ.
//!
//! An admissible cut removes some subtrees (the forest) and keeps the rest
//! (the trunk), with at most one removal on any root-to-leaf path.
//!
//! Every non-root node is either **cut** (its whole subtree goes to the
//! forest) or **kept** (it stays in the trunk and its own children choose
//! in turn). Only nodes whose ancestors are all kept get to choose, which
//! is exactly the admissibility condition.
//!
//! ## Order
//!
//! For a node with children c₁…cₖ the cuts form a Cartesian product of the
//! per-child choice lists `[cut, keep(sub-cut₁), keep(sub-cut₂), ...]`, with
//! c₁ varying fastest. [`Cuts`] walks that product as an odometer over a
//! preorder index with an explicit stack, so it is lazy, restartable, and
//! independent of tree height.

use crate::tree::{Forest, Preorder, Tree};
use num_bigint::BigUint;
use num_traits::One;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Cut,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Running,
    Done,
}

/// Lazy iterator over the admissible cuts of a borrowed tree, yielding
/// `(forest, trunk)` pairs.
#[derive(Debug)]
pub struct Cuts<'a, A> {
    index: Preorder<'a, A>,
    choice: Vec<Choice>,
    phase: Phase,
}

/// Enumerate the admissible cuts of `tree`.
pub fn admissible_cuts<A: Clone>(tree: &Tree<A>) -> Cuts<'_, A> {
    Cuts::new(tree)
}

impl<A> Tree<A> {
    /// Enumerate the admissible cuts of this tree.
    pub fn cuts(&self) -> Cuts<'_, A>
    where
        A: Clone,
    {
        Cuts::new(self)
    }
}

impl<'a, A: Clone> Cuts<'a, A> {
    pub fn new(tree: &'a Tree<A>) -> Self {
        let index = Preorder::new(tree);
        // First combination: every child of the root is cut.
        let choice = vec![Choice::Cut; index.len()];
        Self {
            index,
            choice,
            phase: Phase::Fresh,
        }
    }

    /// Step the odometer. Returns false once every combination was seen.
    fn advance(&mut self) -> bool {
        // Frames are (node, index of the child currently being advanced).
        let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
        loop {
            let Some(&(node, next)) = stack.last() else {
                return false;
            };
            let kids = self.index.children(node);
            if next == kids.len() {
                // This kept subtree has wrapped around: roll it back to
                // "cut" and carry into the parent's next child.
                stack.pop();
                let Some(frame) = stack.last_mut() else {
                    return false;
                };
                self.choice[node] = Choice::Cut;
                frame.1 += 1;
                continue;
            }
            let child = kids[next];
            match self.choice[child] {
                Choice::Cut => {
                    self.choice[child] = Choice::Keep;
                    for &grandchild in self.index.children(child) {
                        self.choice[grandchild] = Choice::Cut;
                    }
                    return true;
                }
                Choice::Keep => stack.push((child, 0)),
            }
        }
    }

    /// Materialize the current combination.
    fn emit(&self) -> (Forest<A>, Tree<A>) {
        let n = self.index.len();
        let mut live = vec![false; n];
        live[0] = true;
        let mut forest = Vec::new();
        // Preorder visits cut points left to right.
        for id in 1..n {
            if !live[self.index.parent(id)] {
                continue;
            }
            match self.choice[id] {
                Choice::Cut => forest.push(self.index.rebuild(id, |_| true)),
                Choice::Keep => live[id] = true,
            }
        }
        let trunk = self.index.rebuild(0, |id| live[id]);
        (forest, trunk)
    }
}

impl<A: Clone> Iterator for Cuts<'_, A> {
    type Item = (Forest<A>, Tree<A>);

    fn next(&mut self) -> Option<Self::Item> {
        match self.phase {
            Phase::Done => return None,
            Phase::Fresh => self.phase = Phase::Running,
            Phase::Running => {
                if !self.advance() {
                    self.phase = Phase::Done;
                    return None;
                }
            }
        }
        let cut = self.emit();
        tracing::trace!(forest_len = cut.0.len(), "admissible cut");
        Some(cut)
    }
}

impl<A: Clone> std::iter::FusedIterator for Cuts<'_, A> {}

/// Number of admissible cuts: `1` for a leaf, `Π (1 + count(cᵢ))` otherwise.
pub fn cut_count<A>(tree: &Tree<A>) -> BigUint {
    let index = Preorder::new(tree);
    let mut counts: Vec<BigUint> = vec![BigUint::one(); index.len()];
    for id in (0..index.len()).rev() {
        let product = index
            .children(id)
            .iter()
            .fold(BigUint::one(), |acc, &c| acc * (&counts[c] + 1u32));
        counts[id] = product;
    }
    counts.swap_remove(0)
}
