#![forbid(unsafe_code)]

//! Dashboard tree node model.
//!
//! A [`TreeNode`] carries the structural shape the algorithms care about
//! (`id`, `children`, `is_leaf`) plus a `collapsed` display flag and an open
//! bag of extension properties. The extension bag is serialized flattened into
//! the node object, so a node round-trips through JSON as
//!
//! ```json
//! { "id": "chart-1", "children": [], "isLeaf": true, "widget": "chart" }
//! ```
//!
//! # Example
//!
//! ```
//! use dashkit_core::node::TreeNode;
//!
//! let root = TreeNode::root()
//!     .child(TreeNode::container("row")
//!         .child(TreeNode::leaf("map"))
//!         .child(TreeNode::leaf("chart")))
//!     .child(TreeNode::leaf("footer"));
//!
//! assert_eq!(root.id(), "root");
//! assert_eq!(root.children().len(), 2);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Id of the anchor container every dashboard tree starts from.
pub const ROOT_ID: &str = "root";

/// Extension property holding the id of the registered widget a leaf renders.
pub const WIDGET_PROPERTY: &str = "widget";

/// Extension property holding layout style knobs (see [`crate::style`]).
pub const STYLE_PROPERTY: &str = "styleProps";

/// Extension properties, keyed by name.
pub type Props = BTreeMap<String, Value>;

/// One element of the dashboard tree: a container or a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub is_leaf: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Extension bag; copied through untouched by every structural transform.
    #[serde(flatten)]
    pub props: Props,
}

impl TreeNode {
    /// Create a container node.
    #[must_use]
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            is_leaf: false,
            collapsed: None,
            props: Props::new(),
        }
    }

    /// Create a leaf node.
    #[must_use]
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            is_leaf: true,
            ..Self::container(id)
        }
    }

    /// The empty anchor container with id [`ROOT_ID`].
    #[must_use]
    pub fn root() -> Self {
        Self::container(ROOT_ID)
    }

    /// Anchor container seeded with `children`.
    #[must_use]
    pub fn root_with(children: Vec<TreeNode>) -> Self {
        Self::root().with_children(children)
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, node: TreeNode) -> Self {
        self.children.push(node);
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<TreeNode>) -> Self {
        self.children = nodes;
        self
    }

    /// Set an extension property.
    #[must_use]
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Set the collapsed display flag.
    #[must_use]
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Whether the node is collapsed (absent flag reads as expanded).
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.collapsed.unwrap_or(false)
    }

    /// Id of the registered widget this node references, if any.
    #[must_use]
    pub fn widget_id(&self) -> Option<&str> {
        self.props.get(WIDGET_PROPERTY).and_then(Value::as_str)
    }

    /// Read a property by name.
    ///
    /// `id`, `isLeaf` and `collapsed` resolve to the built-in fields;
    /// `children` is structural and never exposed as a value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "isLeaf" => Some(Value::Bool(self.is_leaf)),
            "collapsed" => self.collapsed.map(Value::Bool),
            "children" => None,
            _ => self.props.get(name).cloned(),
        }
    }

    /// Replace the property `name` with `updater(old)`.
    ///
    /// Returning `None` from the updater removes an extension property (or
    /// clears `collapsed`). Structural names (`id`, `children`) and values of
    /// the wrong type for a built-in field leave the node untouched, as does
    /// marking a container that still has children as a leaf. The return
    /// value reports whether anything was written.
    pub fn apply_property(
        &mut self,
        name: &str,
        updater: impl FnOnce(Option<&Value>) -> Option<Value>,
    ) -> bool {
        match name {
            "id" | "children" => false,
            "isLeaf" => {
                let old = Value::Bool(self.is_leaf);
                match updater(Some(&old)) {
                    Some(Value::Bool(true)) if !self.children.is_empty() => false,
                    Some(Value::Bool(flag)) => {
                        self.is_leaf = flag;
                        true
                    }
                    _ => false,
                }
            }
            "collapsed" => {
                let old = self.collapsed.map(Value::Bool);
                match updater(old.as_ref()) {
                    Some(Value::Bool(flag)) => {
                        self.collapsed = Some(flag);
                        true
                    }
                    None => {
                        self.collapsed = None;
                        true
                    }
                    Some(_) => false,
                }
            }
            _ => {
                match updater(self.props.get(name)) {
                    Some(value) => {
                        self.props.insert(name.to_string(), value);
                    }
                    None => {
                        self.props.remove(name);
                    }
                }
                true
            }
        }
    }

    /// Copy of this node without its children.
    #[must_use]
    pub fn shell(&self) -> Self {
        Self {
            id: self.id.clone(),
            children: Vec::new(),
            is_leaf: self.is_leaf,
            collapsed: self.collapsed,
            props: self.props.clone(),
        }
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Pre-order traversal returned by [`TreeNode::iter`].
#[derive(Debug)]
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A node projected into the flat, depth-annotated list that drag reordering
/// and collapsed-view filtering operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedNode {
    /// The node payload with `children` stripped.
    #[serde(flatten)]
    pub node: TreeNode,
    /// Parent id, `None` for the tree root.
    pub parent_id: Option<String>,
    /// Root depth is 0.
    pub depth: usize,
    /// Position among siblings.
    pub index: usize,
    /// Direct children the node had when flattened.
    #[serde(default)]
    pub child_count: usize,
}

impl FlattenedNode {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.node.id
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}
