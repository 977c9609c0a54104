#![forbid(unsafe_code)]

//! Flat, depth-annotated view of the tree and its inverse.
//!
//! # Invariants
//!
//! 1. [`flatten`] is pre-order: a child never precedes its parent.
//! 2. `build_tree(flatten(t)) == t` for every tree `t`, and the result does not
//!    depend on the order of the flattened items (siblings are re-ordered by
//!    their `index`).
//! 3. Collapsed-view filtering never hides the collapsed container itself,
//!    only its descendants.

use std::collections::{HashMap, HashSet};

use crate::node::{FlattenedNode, ROOT_ID, TreeNode};

/// Flatten `root` into pre-order with parent, depth and sibling index.
#[must_use]
pub fn flatten(root: &TreeNode) -> Vec<FlattenedNode> {
    let mut out = Vec::new();
    push_flattened(&mut out, root, None, 0, 0);
    out
}

fn push_flattened(
    out: &mut Vec<FlattenedNode>,
    node: &TreeNode,
    parent_id: Option<&str>,
    depth: usize,
    index: usize,
) {
    out.push(FlattenedNode {
        node: node.shell(),
        parent_id: parent_id.map(str::to_string),
        depth,
        index,
        child_count: node.children.len(),
    });
    for (child_index, child) in node.children.iter().enumerate() {
        push_flattened(out, child, Some(&node.id), depth + 1, child_index);
    }
}

/// Rebuild a tree from flattened items.
///
/// The anchor is the first item without a parent; when there is none a bare
/// [`ROOT_ID`] container is synthesized. Other parentless items, and items
/// whose parent is missing from the input, hang off the anchor. Parents may
/// appear after their children. Items that cannot be reached from the anchor
/// (parent cycles) are dropped.
#[must_use]
pub fn build_tree(items: Vec<FlattenedNode>) -> TreeNode {
    let anchor_pos = items.iter().position(|item| item.parent_id.is_none());
    let known: HashSet<String> = items.iter().map(|item| item.node.id.clone()).collect();

    let mut anchor = None;
    let mut groups: HashMap<String, Vec<(usize, usize, TreeNode)>> = HashMap::new();
    let anchor_id = anchor_pos.map_or_else(|| ROOT_ID.to_string(), |pos| items[pos].node.id.clone());

    for (seq, item) in items.into_iter().enumerate() {
        let FlattenedNode {
            mut node,
            parent_id,
            index,
            ..
        } = item;
        node.children.clear();
        if Some(seq) == anchor_pos {
            anchor = Some(node);
            continue;
        }
        let parent = match parent_id {
            Some(parent) if known.contains(&parent) => parent,
            Some(_parent) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    node_id = %node.id,
                    parent_id = %_parent,
                    "flattened item references a missing parent; attaching to anchor"
                );
                anchor_id.clone()
            }
            None => anchor_id.clone(),
        };
        groups.entry(parent).or_default().push((index, seq, node));
    }

    let mut root = anchor.unwrap_or_else(|| TreeNode::container(anchor_id.as_str()));
    attach_children(&mut root, &mut groups);

    #[cfg(feature = "tracing")]
    {
        let dropped: usize = groups.values().map(Vec::len).sum();
        if dropped > 0 {
            tracing::warn!(dropped, "flattened items unreachable from the anchor were dropped");
        }
    }

    root
}

fn attach_children(node: &mut TreeNode, groups: &mut HashMap<String, Vec<(usize, usize, TreeNode)>>) {
    let Some(mut kids) = groups.remove(&node.id) else {
        return;
    };
    kids.sort_by_key(|(index, seq, _)| (*index, *seq));
    for (_, _, mut kid) in kids {
        attach_children(&mut kid, groups);
        node.children.push(kid);
    }
}

/// Drop every item whose ancestor chain passes through one of `collapsed_ids`.
///
/// The collapsed items themselves stay; input order is irrelevant.
#[must_use]
pub fn remove_descendants_of_collapsed<S: AsRef<str>>(
    items: &[FlattenedNode],
    collapsed_ids: &[S],
) -> Vec<FlattenedNode> {
    let hidden: HashSet<&str> = collapsed_ids.iter().map(|id| id.as_ref()).collect();
    if hidden.is_empty() {
        return items.to_vec();
    }
    let parents: HashMap<&str, Option<&str>> = items
        .iter()
        .map(|item| (item.id(), item.parent_id()))
        .collect();

    items
        .iter()
        .filter(|item| !has_hidden_ancestor(item, &parents, &hidden))
        .cloned()
        .collect()
}

fn has_hidden_ancestor(
    item: &FlattenedNode,
    parents: &HashMap<&str, Option<&str>>,
    hidden: &HashSet<&str>,
) -> bool {
    let mut current = item.parent_id();
    // Bounded walk so a malformed parent cycle cannot spin forever.
    for _ in 0..=parents.len() {
        let Some(parent) = current else {
            return false;
        };
        if hidden.contains(parent) {
            return true;
        }
        current = parents.get(parent).copied().flatten();
    }
    false
}

/// Ids of collapsed items that actually have children to hide.
#[must_use]
pub fn collapsed_ids(items: &[FlattenedNode]) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.node.is_collapsed() && item.child_count > 0)
        .map(|item| item.node.id.clone())
        .collect()
}

/// The rows a sortable tree view shows: collapsed subtrees are hidden, and
/// while `active_id` is being dragged its own subtree travels with it and is
/// hidden too.
#[must_use]
pub fn visible_items(items: &[FlattenedNode], active_id: Option<&str>) -> Vec<FlattenedNode> {
    let mut hidden = collapsed_ids(items);
    if let Some(active) = active_id {
        hidden.insert(0, active.to_string());
    }
    remove_descendants_of_collapsed(items, &hidden)
}

/// Move the element at `from` so it ends up at `to`, shifting the rest.
///
/// Out-of-range positions leave the slice untouched.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Re-number each item's `index` by its position among same-parent items in
/// sequence order.
///
/// Used after a reorder, when the indices captured at flatten time are stale.
pub fn reindex(items: &mut [FlattenedNode]) {
    let mut next_index: HashMap<Option<String>, usize> = HashMap::new();
    for item in items.iter_mut() {
        let slot = next_index.entry(item.parent_id.clone()).or_insert(0);
        item.index = *slot;
        *slot += 1;
    }
}
