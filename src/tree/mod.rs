//! Solution trees: immutable binary trees of elements whose leaves are base elements.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

mod key;
mod wire;

pub use key::CanonicalKey;

/// One derivation of an element, as an immutable shared value.
///
/// Cloning is a reference-count bump, so the same subtree can be reused by any number of
/// candidates across threads without copying.
#[derive(Clone)]
pub struct SolutionTree {
    root: Arc<TreeNode>,
}

struct TreeNode {
    name: String,
    image_path: String,
    children: Option<(SolutionTree, SolutionTree)>,
    node_count: usize,
    depth: usize,
}

impl SolutionTree {
    /// A single base element.
    pub fn leaf(name: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            root: Arc::new(TreeNode {
                name: name.into(),
                image_path: image_path.into(),
                children: None,
                node_count: 1,
                depth: 1,
            }),
        }
    }

    /// An element made by combining two subtrees.
    pub fn combine(
        name: impl Into<String>,
        image_path: impl Into<String>,
        first: SolutionTree,
        second: SolutionTree,
    ) -> Self {
        let node_count = first.node_count() + second.node_count() + 1;
        let depth = first.depth().max(second.depth()) + 1;
        Self {
            root: Arc::new(TreeNode {
                name: name.into(),
                image_path: image_path.into(),
                children: Some((first, second)),
                node_count,
                depth,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.root.name
    }

    pub fn image_path(&self) -> &str {
        &self.root.image_path
    }

    /// The two ingredient subtrees, or `None` for a leaf.
    pub fn children(&self) -> Option<(&SolutionTree, &SolutionTree)> {
        self.root.children.as_ref().map(|(a, b)| (a, b))
    }

    pub fn is_leaf(&self) -> bool {
        self.root.children.is_none()
    }

    /// Total number of nodes in the tree. This is the cost minimized by best-tree searches.
    pub fn node_count(&self) -> usize {
        self.root.node_count
    }

    pub fn depth(&self) -> usize {
        self.root.depth
    }

    /// Pre-order traversal of every subtree, starting with this one.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &SolutionTree> {
        self.iter().filter(|t| t.is_leaf())
    }

    /// Whether any node in the tree is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|t| t.name() == name)
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::of(self)
    }
}

/// Pre-order iterator over the subtrees of a `SolutionTree`.
pub struct Iter<'a> {
    stack: Vec<&'a SolutionTree>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SolutionTree;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        if let Some((first, second)) = tree.children() {
            self.stack.push(second);
            self.stack.push(first);
        }
        Some(tree)
    }
}

// Structural equality: same name and recursively identical children.
impl PartialEq for SolutionTree {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
            || (self.root.node_count == other.root.node_count
                && self.root.name == other.root.name
                && self.root.children == other.root.children)
    }
}

impl Eq for SolutionTree {}

impl Hash for SolutionTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.name.hash(state);
        if let Some((first, second)) = &self.root.children {
            first.hash(state);
            second.hash(state);
        }
    }
}

impl fmt::Display for SolutionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some((first, second)) = self.children() {
            write!(f, "({},{})", first, second)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SolutionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SolutionTree({}, nodes={})", self, self.node_count())
    }
}
