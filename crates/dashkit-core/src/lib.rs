#![forbid(unsafe_code)]

//! Core: dashboard tree model and pure tree algorithms.
//!
//! # Role in dashkit
//! `dashkit-core` is the data layer. It owns the node model, the structural
//! algorithms (find, remove, property updates, child append), the flattened
//! view drag-and-drop reordering works on, and JSON snapshots. Nothing here
//! holds state between calls.
//!
//! # How it fits in the system
//! `dashkit-runtime` wraps a tree in a client that stores the current root and
//! notifies observers after each mutation. UI layers read snapshots from the
//! client and call back into these algorithms through it.

pub mod error;
pub mod flatten;
pub mod node;
pub mod projection;
pub mod snapshot;
pub mod style;
pub mod tree;

pub use error::{NotFoundKind, TreeError};
pub use flatten::{
    array_move, build_tree, collapsed_ids, flatten, reindex, remove_descendants_of_collapsed,
    visible_items,
};
pub use node::{FlattenedNode, Props, ROOT_ID, STYLE_PROPERTY, TreeNode, WIDGET_PROPERTY};
pub use projection::{Projection, apply_projection, projected_depth};
pub use snapshot::{
    DashboardSnapshot, InvariantCode, InvariantIssue, InvariantReport, SNAPSHOT_SCHEMA_VERSION,
    check_invariants, export_to_json, import_from_json,
};
pub use style::{AlignItems, FlexDirection, JustifyContent, StyleProps, merge_style};
pub use tree::{
    add_child, contains, count_leaves, descendant_count, find_deep, remove_subtree, set_property,
    update_node,
};
