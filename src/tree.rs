use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Tree value that matches any matcher not matched exactly at its level.
pub const WILDCARD: &str = "*";

/// Matcher used when a schema function extracts nothing.
pub const UNDEFINED: &str = "undefined";

/// One position in a tree path: an exact string or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dimension {
    Exact(String),
    Wildcard,
}

impl Dimension {
    /// Parse a condition segment; `"*"` is the wildcard, anything else is exact.
    ///
    /// There is no escape: `"*"` always means the wildcard, quoted or not, so
    /// an exact literal `*` matcher cannot be expressed.
    #[must_use]
    pub fn parse(segment: &str) -> Dimension {
        if segment == WILDCARD {
            Dimension::Wildcard
        } else {
            Dimension::Exact(segment.to_owned())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Dimension::Exact(value) => value,
            Dimension::Wildcard => WILDCARD,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("path has {found} dimensions but the tree has {expected}")]
    DepthMismatch { expected: usize, found: usize },

    #[error("path is already present in the tree")]
    DuplicatePath,
}

#[derive(Debug, Default)]
struct Node {
    exact: HashMap<Box<str>, usize>,
    wildcard: Option<usize>,
    leaf: Option<usize>,
}

/// An immutable multi-level lookup structure keyed by an ordered matcher list.
///
/// Nodes live in a flat arena. Each level branches on exact strings plus an
/// optional wildcard child; only nodes at full depth carry a leaf.
#[derive(Debug)]
pub struct RuleTree<V> {
    nodes: Vec<Node>,
    leaves: Vec<V>,
    depth: usize,
}

/// A successful lookup: the leaf plus the tree value consumed at each level.
#[derive(Debug, PartialEq)]
pub struct TreeMatch<'t, V> {
    pub leaf: &'t V,
    pub matched: Vec<&'t str>,
}

impl<V> RuleTree<V> {
    /// Number of dimensions every lookup must supply.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaves (distinct paths) in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Descend one dimension at a time. An exact child wins over the wildcard
    /// child at the same level; a level with neither ends the lookup. There
    /// is no backtracking into an earlier level's wildcard.
    ///
    /// Returns `None` when no path accepts `matchers`, including when the
    /// number of matchers differs from [`depth`](Self::depth).
    pub fn lookup<S: AsRef<str>>(&self, matchers: &[S]) -> Option<TreeMatch<'_, V>> {
        if matchers.len() != self.depth {
            return None;
        }

        let mut node = &self.nodes[0];
        let mut matched = Vec::with_capacity(self.depth);
        for matcher in matchers {
            let next = match node.exact.get_key_value(matcher.as_ref()) {
                Some((key, &child)) => {
                    matched.push(&**key);
                    child
                }
                None => {
                    let child = node.wildcard?;
                    matched.push(WILDCARD);
                    child
                }
            };
            node = &self.nodes[next];
        }

        node.leaf.map(|idx| TreeMatch {
            leaf: &self.leaves[idx],
            matched,
        })
    }

    /// Iterate over all leaves in insertion order.
    pub fn leaves(&self) -> impl Iterator<Item = &V> {
        self.leaves.iter()
    }
}

/// Builder for a [`RuleTree`] of a fixed depth.
#[derive(Debug)]
pub struct RuleTreeBuilder<V> {
    nodes: Vec<Node>,
    leaves: Vec<V>,
    depth: usize,
}

impl<V> RuleTreeBuilder<V> {
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            nodes: vec![Node::default()],
            leaves: Vec::new(),
            depth,
        }
    }

    /// Add a path terminating in `leaf`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DepthMismatch`] if the path length differs from the
    /// tree depth and [`TreeError::DuplicatePath`] if the same path was
    /// already inserted.
    pub fn insert(&mut self, path: &[Dimension], leaf: V) -> Result<(), TreeError> {
        if path.len() != self.depth {
            return Err(TreeError::DepthMismatch {
                expected: self.depth,
                found: path.len(),
            });
        }

        let mut current = 0;
        for dimension in path {
            current = self.child_or_insert(current, dimension);
        }

        if self.nodes[current].leaf.is_some() {
            return Err(TreeError::DuplicatePath);
        }
        self.nodes[current].leaf = Some(self.leaves.len());
        self.leaves.push(leaf);
        Ok(())
    }

    fn child_or_insert(&mut self, parent: usize, dimension: &Dimension) -> usize {
        let existing = match dimension {
            Dimension::Exact(value) => self.nodes[parent].exact.get(value.as_str()).copied(),
            Dimension::Wildcard => self.nodes[parent].wildcard,
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(Node::default());
        match dimension {
            Dimension::Exact(value) => {
                self.nodes[parent]
                    .exact
                    .insert(value.as_str().into(), child);
            }
            Dimension::Wildcard => self.nodes[parent].wildcard = Some(child),
        }
        child
    }

    #[must_use]
    pub fn build(self) -> RuleTree<V> {
        RuleTree {
            nodes: self.nodes,
            leaves: self.leaves,
            depth: self.depth,
        }
    }
}
