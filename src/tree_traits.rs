use std::collections::HashMap;

use tracing::instrument;

use crate::domain::{format_value, NodeId, Tree};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> termtree::Tree<String>;
}

impl TreeNodeConvert for Tree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> termtree::Tree<String> {
        build_tree_representation(self, self.root())
    }
}

/// Node label: `name`, or `name = value` once a value is set.
pub fn label(tree: &Tree, idx: NodeId) -> String {
    match tree.node(idx) {
        Some(node) if node.value.is_some() => {
            format!("{} = {}", node.name(), format_value(node.value))
        }
        Some(node) => node.name().to_string(),
        None => String::new(),
    }
}

/// Display tree of the subtree at `node_idx`, assembled bottom-up from the
/// reversed pre-order so every child is built before its parent.
pub fn build_tree_representation(tree: &Tree, node_idx: NodeId) -> termtree::Tree<String> {
    let order: Vec<NodeId> = tree.iter_from(node_idx).map(|(idx, _)| idx).collect();
    let mut built: HashMap<NodeId, termtree::Tree<String>> = HashMap::new();

    for &idx in order.iter().rev() {
        let leaves: Vec<termtree::Tree<String>> = tree[idx]
            .children()
            .filter_map(|child| built.remove(&child))
            .collect();
        built.insert(idx, termtree::Tree::new(label(tree, idx)).with_leaves(leaves));
    }

    built
        .remove(&node_idx)
        .unwrap_or_else(|| termtree::Tree::new(label(tree, node_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::load_str;

    #[test]
    fn test_to_tree_string() {
        let mut tree = load_str(r#"{"rack1": {"sg2": {"ckt1": null}, "sg1": null}}"#).unwrap();
        let ckt1 = tree.get("sg2.ckt1").unwrap();
        tree[ckt1].value = Some(30.0);

        let expected = "rack1\n├── sg1\n└── sg2\n    └── ckt1 = 30\n";
        assert_eq!(tree.to_tree_string().to_string(), expected);
    }

    #[test]
    fn test_subtree_representation() {
        let tree = load_str(r#"{"site": {"rack1": {"sg1": null}, "rack2": null}}"#).unwrap();
        let rack1 = tree.get("rack1").unwrap();
        assert_eq!(
            build_tree_representation(&tree, rack1).to_string(),
            "rack1\n└── sg1\n"
        );
    }
}
