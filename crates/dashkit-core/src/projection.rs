#![forbid(unsafe_code)]

//! Drag-and-drop depth projection over the flattened tree.
//!
//! While an item is dragged, the drag layer reports the item being moved
//! (`active`), the row it hovers (`over`) and the horizontal pointer offset.
//! [`projected_depth`] turns that into the nesting depth and parent the item
//! would land at; [`apply_projection`] commits the move on the flattened list,
//! ready for [`crate::flatten::build_tree`].
//!
//! # Rules
//!
//! - Every `indentation_width` pixels of horizontal drag shift the candidate
//!   depth by one (rounded to nearest).
//! - `max_depth` is the depth of the row preceding the drop point plus one, or
//!   exactly its depth when that row is a leaf (leaves cannot gain children).
//!   With no preceding row it is 0.
//! - `min_depth` is the depth of the row following the drop point, 0 if none.
//! - A projection at or above `max_depth` snaps to `max_depth`; below
//!   `min_depth` it snaps to `min_depth`.
//!
//! Both functions are pure.

use serde::{Deserialize, Serialize};

use crate::flatten::{array_move, reindex};
use crate::node::FlattenedNode;

/// Where a dragged item would land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub depth: usize,
    pub min_depth: usize,
    pub max_depth: usize,
    /// New parent; `None` means the tree root.
    pub parent_id: Option<String>,
}

impl Projection {
    /// The parent id with the root resolved to `root_id`.
    #[must_use]
    pub fn parent_or<'a>(&'a self, root_id: &'a str) -> &'a str {
        self.parent_id.as_deref().unwrap_or(root_id)
    }
}

fn drag_depth(offset: f64, indentation_width: f64) -> i64 {
    if !(indentation_width > 0.0) || !offset.is_finite() {
        return 0;
    }
    (offset / indentation_width).round() as i64
}

/// Project the landing depth and parent for dragging `active_id` onto
/// `over_id` with a horizontal `drag_offset`.
///
/// Returns `None` when either id is missing from `items`.
#[must_use]
pub fn projected_depth(
    items: &[FlattenedNode],
    active_id: &str,
    over_id: &str,
    drag_offset: f64,
    indentation_width: f64,
) -> Option<Projection> {
    let over_index = items.iter().position(|item| item.id() == over_id)?;
    let active_index = items.iter().position(|item| item.id() == active_id)?;
    let active_depth = items[active_index].depth;

    let mut moved: Vec<&FlattenedNode> = items.iter().collect();
    array_move(&mut moved, active_index, over_index);
    let previous = over_index.checked_sub(1).map(|i| moved[i]);
    let next = moved.get(over_index + 1).copied();

    let projected = active_depth as i64 + drag_depth(drag_offset, indentation_width);
    let max_depth = previous.map_or(0, |prev| {
        if prev.is_leaf() {
            prev.depth
        } else {
            prev.depth + 1
        }
    });
    let min_depth = next.map_or(0, |next| next.depth);

    let depth = if projected >= max_depth as i64 {
        max_depth
    } else if projected < min_depth as i64 {
        min_depth
    } else {
        projected as usize
    };

    let parent_id = match previous {
        _ if depth == 0 => None,
        None => None,
        Some(prev) if depth == prev.depth => prev.parent_id.clone(),
        Some(prev) if depth > prev.depth => Some(prev.id().to_string()),
        Some(_) => moved[..over_index]
            .iter()
            .rev()
            .find(|item| item.depth == depth)
            .and_then(|item| item.parent_id.clone()),
    };

    Some(Projection {
        depth,
        min_depth,
        max_depth,
        parent_id,
    })
}

/// Commit a drop: give `active_id` the projected depth and parent, move it to
/// the position of `over_id`, and renumber sibling indices.
///
/// A root-level projection (`parent_id == None`) resolves to the anchor item
/// (the first parentless item) so the anchor stays the tree root.
///
/// Returns `None` when an id is missing, when `active_id` is the anchor, or
/// when the projected parent lies inside the active item's own subtree.
#[must_use]
pub fn apply_projection(
    items: &[FlattenedNode],
    active_id: &str,
    over_id: &str,
    projection: &Projection,
) -> Option<Vec<FlattenedNode>> {
    let anchor = items.iter().find(|item| item.parent_id.is_none())?;
    if anchor.id() == active_id {
        return None;
    }
    let parent = projection
        .parent_id
        .clone()
        .unwrap_or_else(|| anchor.id().to_string());
    if is_within(items, &parent, active_id) {
        return None;
    }

    let mut next = items.to_vec();
    let over_index = next.iter().position(|item| item.id() == over_id)?;
    let active_index = next.iter().position(|item| item.id() == active_id)?;
    let active = &mut next[active_index];
    active.depth = projection.depth;
    active.parent_id = Some(parent);
    array_move(&mut next, active_index, over_index);
    reindex(&mut next);
    Some(next)
}

/// True if `id` is `ancestor` or one of its descendants.
fn is_within(items: &[FlattenedNode], id: &str, ancestor: &str) -> bool {
    let mut current = Some(id);
    for _ in 0..=items.len() {
        let Some(cursor) = current else {
            return false;
        };
        if cursor == ancestor {
            return true;
        }
        current = items
            .iter()
            .find(|item| item.id() == cursor)
            .and_then(FlattenedNode::parent_id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{build_tree, flatten, visible_items};
    use crate::node::TreeNode;
    use crate::tree::find_deep;

    const INDENT: f64 = 50.0;

    fn sample() -> TreeNode {
        TreeNode::root()
            .child(TreeNode::container("a").child(TreeNode::leaf("a1")))
            .child(TreeNode::leaf("b"))
            .child(TreeNode::container("c"))
    }

    #[test]
    fn first_position_projects_to_root() {
        let flat = flatten(&sample());
        let projection = projected_depth(&flat, "b", "root", 200.0, INDENT).expect("ids exist");
        assert_eq!(projection.depth, 0);
        assert_eq!(projection.max_depth, 0);
        assert_eq!(projection.parent_id, None);
        assert_eq!(projection.parent_or("root"), "root");
    }

    #[test]
    fn dropping_in_place_keeps_parent() {
        let flat = visible_items(&flatten(&sample()), Some("c"));
        let projection = projected_depth(&flat, "c", "c", 0.0, INDENT).expect("ids exist");
        assert_eq!(projection.depth, 1);
        assert_eq!(projection.parent_id.as_deref(), Some("root"));
    }

    #[test]
    fn container_predecessor_range_is_d_to_d_plus_one() {
        let root = TreeNode::root()
            .child(TreeNode::container("box"))
            .child(TreeNode::leaf("item"));
        let flat = flatten(&root);
        let flat_projection = projected_depth(&flat, "item", "item", 0.0, INDENT).expect("ids");
        assert_eq!(flat_projection.max_depth, 2);
        assert!((1..=2).contains(&flat_projection.depth));

        let nested = projected_depth(&flat, "item", "item", INDENT, INDENT).expect("ids");
        assert_eq!(nested.depth, 2);
        assert_eq!(nested.parent_id.as_deref(), Some("box"));
    }

    #[test]
    fn leaf_predecessor_caps_max_depth() {
        let flat = flatten(&sample());
        let projection = projected_depth(&flat, "c", "c", 500.0, INDENT).expect("ids");
        assert_eq!(projection.max_depth, 1, "b is a leaf at depth 1");
        assert_eq!(projection.depth, 1);
    }

    #[test]
    fn outdent_walks_back_for_parent() {
        let root = TreeNode::root().child(
            TreeNode::container("a").child(
                TreeNode::container("a1")
                    .child(TreeNode::leaf("x"))
                    .child(TreeNode::leaf("y")),
            ),
        );
        let flat = flatten(&root);
        // Drag "y" two indents left: depth 3 -> 1, parent resolves to root.
        let projection = projected_depth(&flat, "y", "y", -2.0 * INDENT, INDENT).expect("ids");
        assert_eq!(projection.min_depth, 0);
        assert_eq!(projection.depth, 1);
        assert_eq!(projection.parent_id.as_deref(), Some("root"));
    }

    #[test]
    fn min_depth_follows_next_row() {
        let flat = flatten(&sample());
        // Moving "b" onto "a1" puts it between "a" and "a1"; "a1" sits at depth 2.
        let projection = projected_depth(&flat, "b", "a1", -500.0, INDENT).expect("ids");
        assert_eq!(projection.min_depth, 2);
        assert_eq!(projection.max_depth, 2);
        assert_eq!(projection.depth, 2);
        assert_eq!(projection.parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn missing_ids_yield_none() {
        let flat = flatten(&sample());
        assert!(projected_depth(&flat, "ghost", "a", 0.0, INDENT).is_none());
        assert!(projected_depth(&flat, "a", "ghost", 0.0, INDENT).is_none());
    }

    #[test]
    fn zero_indentation_ignores_offset() {
        let flat = flatten(&sample());
        let a = projected_depth(&flat, "b", "b", 1e9, 0.0).expect("ids");
        let b = projected_depth(&flat, "b", "b", 0.0, INDENT).expect("ids");
        assert_eq!(a, b);
    }

    #[test]
    fn commit_moves_item_under_new_parent() {
        let root = TreeNode::root()
            .child(TreeNode::container("box"))
            .child(TreeNode::leaf("item"));
        let flat = flatten(&root);
        let projection = projected_depth(&flat, "item", "item", INDENT, INDENT).expect("ids");
        let moved = apply_projection(&flat, "item", "item", &projection).expect("commit");
        let rebuilt = build_tree(moved);
        let container = find_deep(&rebuilt, "box").expect("box");
        assert_eq!(container.children().len(), 1);
        assert_eq!(container.children()[0].id(), "item");
        assert_eq!(rebuilt.children().len(), 1);
    }

    #[test]
    fn commit_to_first_row_keeps_anchor_as_root() {
        let flat = flatten(&sample());
        let projection = projected_depth(&flat, "c", "root", 0.0, INDENT).expect("ids");
        let moved = apply_projection(&flat, "c", "root", &projection).expect("commit");
        let rebuilt = build_tree(moved);
        assert_eq!(rebuilt.id(), "root");
        let order: Vec<&str> = rebuilt.children().iter().map(TreeNode::id).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn commit_rejects_anchor_and_self_nesting() {
        let flat = flatten(&sample());
        let to_root = Projection {
            depth: 0,
            min_depth: 0,
            max_depth: 0,
            parent_id: None,
        };
        assert!(apply_projection(&flat, "root", "a", &to_root).is_none());
        let into_self = Projection {
            depth: 2,
            min_depth: 0,
            max_depth: 2,
            parent_id: Some("a1".to_string()),
        };
        assert!(apply_projection(&flat, "a", "b", &into_self).is_none());
    }

    #[test]
    fn commit_carries_descendants() {
        let flat = flatten(&sample());
        let projection = Projection {
            depth: 2,
            min_depth: 0,
            max_depth: 2,
            parent_id: Some("c".to_string()),
        };
        let moved = apply_projection(&flat, "a", "c", &projection).expect("commit");
        let rebuilt = build_tree(moved);
        let c = find_deep(&rebuilt, "c").expect("c");
        assert_eq!(c.children()[0].id(), "a");
        assert_eq!(c.children()[0].children()[0].id(), "a1");
    }
}
