//! Arena-backed hierarchy of named nodes.
//!
//! Every node lives in the arena of the [`Tree`] that owns it. Parent links are
//! arena indices, so dropping a tree drops every node in it and no node can
//! outlive its ancestors.

use std::collections::BTreeMap;
use std::ops;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, TreeResult};

/// Separator used by [`Tree::id`], [`Tree::get`] and [`Tree::update`].
pub const DEFAULT_SEPARATOR: char = '.';

/// Batch of values keyed by dotted path, relative to the node it is applied to.
pub type Payload = BTreeMap<String, Option<f64>>;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Handle of a node inside one [`Tree`].
///
/// A handle only resolves in the tree that issued it. Handles of a tree
/// consumed by [`Tree::add_child`] are foreign to every tree afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u64,
    idx: Index,
}

/// Tree node in the arena-based hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    name: String,
    /// Parent handle, None for the root
    parent: Option<NodeId>,
    /// Child handles keyed by name; keeps sibling names unique and iteration sorted
    children: BTreeMap<String, NodeId>,
    /// Scalar value, unset until an update reaches this node
    pub value: Option<f64>,
}

impl TreeNode {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: BTreeMap::new(),
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in ascending name order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A rooted hierarchy. Always holds at least its root node.
///
/// A clone is a separate tree: it issues its own handles, so handles of the
/// original are foreign to it (re-resolve them with [`Tree::find`]).
#[derive(Debug)]
pub struct Tree {
    id: u64,
    arena: Arena<TreeNode>,
    root: NodeId,
}

impl Tree {
    /// Create a tree consisting of a single, valueless root node.
    ///
    /// Empty names are rejected: they could never be addressed by a path.
    #[instrument(level = "trace")]
    pub fn new(name: &str) -> TreeResult<Self> {
        if name.is_empty() {
            return Err(DomainError::InvalidName(name.to_string()));
        }
        let id = next_tree_id();
        let mut arena = Arena::new();
        let root = NodeId {
            tree: id,
            idx: arena.insert(TreeNode::new(name.to_string())),
        };
        Ok(Self { id, arena, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, idx: NodeId) -> Option<&TreeNode> {
        if idx.tree != self.id {
            return None;
        }
        self.arena.get(idx.idx)
    }

    pub fn node_mut(&mut self, idx: NodeId) -> Option<&mut TreeNode> {
        if idx.tree != self.id {
            return None;
        }
        self.arena.get_mut(idx.idx)
    }

    pub fn contains(&self, idx: NodeId) -> bool {
        self.node(idx).is_some()
    }

    /// Attach `child` (a detached tree) below `parent`.
    ///
    /// All nodes of `child` move into this tree's arena; the returned handle
    /// addresses the grafted child root. Sibling names must stay unique, so a
    /// clash fails with [`DomainError::DuplicateSibling`] and leaves this tree
    /// untouched.
    #[instrument(level = "trace", skip(self, child))]
    pub fn add_child(&mut self, parent: NodeId, mut child: Tree) -> TreeResult<NodeId> {
        let child_name = child.arena[child.root.idx].name.clone();
        let taken = self
            .node(parent)
            .ok_or(DomainError::ForeignNode(parent))?
            .children
            .contains_key(&child_name);
        if taken {
            return Err(DomainError::DuplicateSibling {
                parent: self.id(parent).unwrap_or_default(),
                name: child_name,
            });
        }

        let mut grafted = None;
        let mut stack = vec![(child.root.idx, parent)];
        while let Some((src_idx, dst_parent)) = stack.pop() {
            if let Some(node) = child.arena.remove(src_idx) {
                let TreeNode {
                    name,
                    children,
                    value,
                    ..
                } = node;
                let dst = NodeId {
                    tree: self.id,
                    idx: self.arena.insert(TreeNode {
                        name: name.clone(),
                        parent: Some(dst_parent),
                        children: BTreeMap::new(),
                        value,
                    }),
                };
                self.arena[dst_parent.idx].children.insert(name, dst);
                grafted.get_or_insert(dst);

                for grandchild in children.values() {
                    stack.push((grandchild.idx, dst));
                }
            }
        }

        debug!("attached '{}' below {:?}", child_name, parent);
        grafted.ok_or(DomainError::ForeignNode(child.root))
    }

    /// Dotted path from the root to `idx`, or None for a foreign handle.
    pub fn id(&self, idx: NodeId) -> Option<String> {
        self.id_with(idx, DEFAULT_SEPARATOR)
    }

    pub fn id_with(&self, idx: NodeId, sep: char) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(idx);
        while let Some(node_idx) = current {
            let node = self.node(node_idx)?;
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        Some(names.join(&sep.to_string()))
    }

    /// Pre-order traversal of the whole tree.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `idx`, `idx` first.
    pub fn iter_from(&self, idx: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, idx)
    }

    /// Number of nodes in the tree, root included.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.count(self.root)
    }

    /// Number of nodes in the subtree rooted at `idx`, `idx` included.
    pub fn count(&self, idx: NodeId) -> usize {
        self.iter_from(idx).count()
    }

    /// Resolve a dotted path relative to the root.
    pub fn get(&self, path: &str) -> TreeResult<NodeId> {
        self.get_from(self.root, path, DEFAULT_SEPARATOR)
    }

    /// Resolve `path` relative to `from`, one exact, case-sensitive segment per level.
    ///
    /// The node matched by the last segment is returned. A segment without a
    /// matching child fails with [`DomainError::NotFound`]; a found node whose
    /// value is unset is not an error.
    #[instrument(level = "trace", skip(self))]
    pub fn get_from(&self, from: NodeId, path: &str, sep: char) -> TreeResult<NodeId> {
        if !self.contains(from) {
            return Err(DomainError::ForeignNode(from));
        }
        self.resolve(from, path, sep)
            .map_err(|segment| DomainError::NotFound {
                path: path.to_string(),
                segment: segment.to_string(),
            })
    }

    /// Walk `path` below `from`, which must be a live node of this tree.
    /// Fails with the first segment that matched no child.
    fn resolve<'p>(&self, from: NodeId, path: &'p str, sep: char) -> Result<NodeId, &'p str> {
        let mut current = from;
        for segment in path.split(sep) {
            current = self.arena[current.idx]
                .child(segment)
                .ok_or(segment)?;
        }
        Ok(current)
    }

    /// Resolve an absolute id as produced by [`Tree::id`], root name included.
    pub fn find(&self, id: &str) -> TreeResult<NodeId> {
        self.find_with(id, DEFAULT_SEPARATOR)
    }

    pub fn find_with(&self, id: &str, sep: char) -> TreeResult<NodeId> {
        let (head, rest) = match id.split_once(sep) {
            Some((head, rest)) => (head, Some(rest)),
            None => (id, None),
        };
        let not_found = |segment: &str| DomainError::NotFound {
            path: id.to_string(),
            segment: segment.to_string(),
        };
        if head != self.arena[self.root.idx].name {
            return Err(not_found(head));
        }
        match rest {
            None => Ok(self.root),
            Some(rest) => self.resolve(self.root, rest, sep).map_err(not_found),
        }
    }

    /// Value of the node at `path` (relative to the root).
    pub fn value(&self, path: &str) -> TreeResult<Option<f64>> {
        let idx = self.get(path)?;
        Ok(self.arena[idx.idx].value)
    }

    /// Apply `payload` relative to the root. See [`Tree::update_from`].
    pub fn update(&mut self, payload: &Payload) -> usize {
        self.apply(self.root, payload, DEFAULT_SEPARATOR)
    }

    /// Set the value of every node addressed by `payload`, relative to `from`.
    ///
    /// Entries whose path does not resolve are skipped; they never abort the
    /// batch. Returns the number of entries applied. A `from` handle of
    /// another tree fails with [`DomainError::ForeignNode`] before anything
    /// is written.
    pub fn update_from(&mut self, from: NodeId, payload: &Payload, sep: char) -> TreeResult<usize> {
        if !self.contains(from) {
            return Err(DomainError::ForeignNode(from));
        }
        Ok(self.apply(from, payload, sep))
    }

    #[instrument(level = "debug", skip(self, payload), fields(entries = payload.len()))]
    fn apply(&mut self, from: NodeId, payload: &Payload, sep: char) -> usize {
        let mut applied = 0;
        for (path, value) in payload {
            match self.resolve(from, path, sep) {
                Ok(idx) => {
                    self.arena[idx.idx].value = *value;
                    applied += 1;
                }
                Err(segment) => debug!("skipping '{}': no child named '{}'", path, segment),
            }
        }
        applied
    }

    /// Number of levels, a root-only tree has depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            for child in self.arena[idx.idx].children() {
                stack.push((child, level + 1));
            }
        }
        deepest
    }

    /// Handles of all leaf nodes, in traversal order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// `"<id> = <value>"`, unset values shown as `null`.
    pub fn describe(&self, idx: NodeId) -> Option<String> {
        self.describe_with(idx, DEFAULT_SEPARATOR)
    }

    pub fn describe_with(&self, idx: NodeId, sep: char) -> Option<String> {
        let node = self.node(idx)?;
        Some(format!("{} = {}", self.id_with(idx, sep)?, format_value(node.value)))
    }
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        let id = next_tree_id();
        let mut arena = self.arena.clone();
        for (_, node) in arena.iter_mut() {
            if let Some(parent) = node.parent.as_mut() {
                parent.tree = id;
            }
            for child in node.children.values_mut() {
                child.tree = id;
            }
        }
        Self {
            id,
            arena,
            root: NodeId {
                tree: id,
                idx: self.root.idx,
            },
        }
    }
}

impl ops::Index<NodeId> for Tree {
    type Output = TreeNode;

    fn index(&self, idx: NodeId) -> &TreeNode {
        match self.node(idx) {
            Some(node) => node,
            None => panic!("node handle {:?} does not belong to this tree", idx),
        }
    }
}

impl ops::IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, idx: NodeId) -> &mut TreeNode {
        match self.node_mut(idx) {
            Some(node) => node,
            None => panic!("node handle {:?} does not belong to this tree", idx),
        }
    }
}

/// Render a node value the way `describe` and the CLI print it.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.tree.node(current_idx)?;
        // Push children in reverse order so they pop in name order
        for &child in node.children.values().rev() {
            self.stack.push(child);
        }
        Some((current_idx, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing;

    //      node1
    //        |
    //      node2
    fn pair() -> (Tree, NodeId) {
        testing::init_test_setup();
        let mut tree = Tree::new("node1").unwrap();
        let root = tree.root();
        let node2 = tree.add_child(root, Tree::new("node2").unwrap()).unwrap();
        (tree, node2)
    }

    #[test]
    fn test_add_child_sets_parent_and_membership() {
        let (tree, node2) = pair();
        assert_eq!(tree[node2].parent(), Some(tree.root()));
        assert!(tree[tree.root()].children().any(|c| c == node2));
    }

    #[test]
    fn test_id() {
        let (tree, node2) = pair();
        assert_eq!(tree.id(tree.root()).unwrap(), "node1");
        assert_eq!(tree.id(node2).unwrap(), "node1.node2");
        assert_eq!(tree.id_with(node2, '/').unwrap(), "node1/node2");
    }

    #[test]
    fn test_get() {
        let (tree, node2) = pair();
        assert_eq!(tree.get("node2").unwrap(), node2);
    }

    #[test]
    fn test_new_rejects_empty_name() {
        assert_eq!(
            Tree::new("").unwrap_err(),
            DomainError::InvalidName(String::new())
        );
    }

    #[test]
    fn test_add_child_rejects_duplicate_name() {
        let (mut tree, _) = pair();
        let root = tree.root();
        let err = tree
            .add_child(root, Tree::new("node2").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateSibling {
                parent: "node1".into(),
                name: "node2".into()
            }
        );
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_add_child_moves_whole_subtree() {
        let (mut tree, node2) = pair();
        let mut sub = Tree::new("sub").unwrap();
        let sub_root = sub.root();
        let leaf = sub.add_child(sub_root, Tree::new("leaf").unwrap()).unwrap();
        sub[leaf].value = Some(1.5);

        let grafted = tree.add_child(node2, sub).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.id(grafted).unwrap(), "node1.node2.sub");
        assert_eq!(tree.value("node2.sub.leaf").unwrap(), Some(1.5));
    }

    #[test]
    fn test_iter_is_preorder_by_name() {
        let mut tree = Tree::new("r").unwrap();
        let root = tree.root();
        let b = tree.add_child(root, Tree::new("b").unwrap()).unwrap();
        tree.add_child(root, Tree::new("a").unwrap()).unwrap();
        tree.add_child(b, Tree::new("c").unwrap()).unwrap();

        let names: Vec<&str> = tree.iter().map(|(_, n)| n.name()).collect();
        assert_eq!(names, vec!["r", "a", "b", "c"]);
        assert_eq!(tree.count(b), 2);
    }

    #[test]
    fn test_grafted_subtree_handles_are_foreign() {
        let (mut tree, node2) = pair();
        let mut sub = Tree::new("sub").unwrap();
        let sub_root = sub.root();
        let leaf = sub.add_child(sub_root, Tree::new("leaf").unwrap()).unwrap();

        tree.add_child(node2, sub).unwrap();
        assert!(!tree.contains(leaf));
        assert!(!tree.contains(sub_root));
        assert_eq!(tree.id(leaf), None);
        assert_eq!(
            tree.get_from(leaf, "x", '.').unwrap_err(),
            DomainError::ForeignNode(leaf)
        );
    }

    #[test]
    fn test_root_of_other_tree_is_foreign() {
        let big = load_tree(r#"{"site": {"rack1": {"sg1": null}}}"#);
        let mut small = Tree::new("small").unwrap();
        let small_root = small.root();
        small.add_child(small_root, Tree::new("sg1").unwrap()).unwrap();

        assert!(!small.contains(big.root()));
        assert_eq!(small.node(big.root()), None);
        assert_eq!(
            small.get_from(big.root(), "sg1", '.').unwrap_err(),
            DomainError::ForeignNode(big.root())
        );
        assert_eq!(small.iter_from(big.root()).count(), 0);
    }

    #[test]
    fn test_update_from_foreign_handle_fails() {
        let (mut tree, _) = pair();
        let other = Tree::new("other").unwrap();
        let payload = Payload::from([("node2".to_string(), Some(1.0))]);

        assert_eq!(
            tree.update_from(other.root(), &payload, '.').unwrap_err(),
            DomainError::ForeignNode(other.root())
        );
        assert_eq!(tree.value("node2").unwrap(), None);
    }

    #[test]
    fn test_clone_issues_own_handles() {
        let (tree, node2) = pair();
        let copy = tree.clone();

        assert!(!copy.contains(node2));
        let copied = copy.find("node1.node2").unwrap();
        assert_eq!(copy[copied].parent(), Some(copy.root()));
        assert_eq!(copy.id(copied).unwrap(), "node1.node2");
    }

    #[test]
    fn test_depth_of_long_chain() {
        let mut tree = Tree::new("n").unwrap();
        let mut last = tree.root();
        for _ in 0..100_000 {
            last = tree.add_child(last, Tree::new("n").unwrap()).unwrap();
        }
        assert_eq!(tree.depth(), 100_001);
        assert_eq!(tree.len(), 100_001);
    }

    fn load_tree(source: &str) -> Tree {
        crate::domain::load_str(source).unwrap()
    }
}
