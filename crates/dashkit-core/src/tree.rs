#![forbid(unsafe_code)]

//! Pure tree algorithms over [`TreeNode`].
//!
//! Every structural operation takes the current root by reference and returns
//! a freshly built root. Callers treat the result, never the input, as the
//! current tree; nothing in the result aliases the input.
//!
//! Ids are assumed unique. Under duplicates the first pre-order match wins
//! for lookups and single-node updates; [`remove_subtree`] removes every
//! match.

use serde_json::Value;

use crate::error::TreeError;
use crate::node::TreeNode;

/// Pre-order depth-first search for `id`.
#[must_use]
pub fn find_deep<'a>(root: &'a TreeNode, id: &str) -> Option<&'a TreeNode> {
    root.iter().find(|node| node.id == id)
}

/// True if `id` is present anywhere under (or at) `root`.
#[must_use]
pub fn contains(root: &TreeNode, id: &str) -> bool {
    find_deep(root, id).is_some()
}

/// New tree with the subtree rooted at `id` excised.
///
/// The root itself is the tree's anchor and is never removed: asking for it
/// returns an unchanged copy, as does an unknown id.
#[must_use]
pub fn remove_subtree(root: &TreeNode, id: &str) -> TreeNode {
    let mut next = root.clone();
    if next.id != id {
        prune(&mut next.children, id);
    }
    next
}

fn prune(children: &mut Vec<TreeNode>, id: &str) {
    children.retain(|child| child.id != id);
    for child in children.iter_mut() {
        prune(&mut child.children, id);
    }
}

/// New tree with `f` applied to the first node matching `id`.
///
/// The flag reports whether a node matched.
pub fn update_node(root: &TreeNode, id: &str, f: impl FnOnce(&mut TreeNode)) -> (TreeNode, bool) {
    let mut next = root.clone();
    let mut f = Some(f);
    let found = update_first(&mut next, id, &mut f);
    (next, found)
}

fn update_first<F: FnOnce(&mut TreeNode)>(node: &mut TreeNode, id: &str, f: &mut Option<F>) -> bool {
    if node.id == id {
        if let Some(f) = f.take() {
            f(node);
        }
        return true;
    }
    node.children
        .iter_mut()
        .any(|child| update_first(child, id, f))
}

/// New tree where the property `name` of node `id` is replaced with
/// `updater(old)`. See [`TreeNode::apply_property`] for naming rules.
///
/// Unknown ids yield an unchanged copy.
#[must_use]
pub fn set_property(
    root: &TreeNode,
    id: &str,
    name: &str,
    updater: impl FnOnce(Option<&Value>) -> Option<Value>,
) -> TreeNode {
    update_node(root, id, |node| {
        node.apply_property(name, updater);
    })
    .0
}

/// New tree with `child` appended to the children of `parent_id`.
///
/// # Errors
///
/// [`TreeError::NotFound`] if `parent_id` is absent and
/// [`TreeError::InvariantViolation`] if the parent is a leaf.
pub fn add_child(root: &TreeNode, parent_id: &str, child: TreeNode) -> Result<TreeNode, TreeError> {
    let parent = find_deep(root, parent_id).ok_or_else(|| TreeError::node_not_found(parent_id))?;
    if parent.is_leaf {
        return Err(TreeError::invariant(
            parent_id,
            format!("leaf cannot accept child {:?}", child.id),
        ));
    }
    let (next, _) = update_node(root, parent_id, move |parent| parent.children.push(child));
    Ok(next)
}

/// Number of leaves under `node`; a node with no children is itself a leaf.
#[must_use]
pub fn count_leaves(node: &TreeNode) -> usize {
    if node.children.is_empty() {
        return 1;
    }
    node.children.iter().map(count_leaves).sum()
}

/// Number of descendants (children, grandchildren, ...) of `id`.
///
/// Returns 0 when `id` is absent.
#[must_use]
pub fn descendant_count(root: &TreeNode, id: &str) -> usize {
    find_deep(root, id).map_or(0, |node| node.iter().count() - 1)
}
