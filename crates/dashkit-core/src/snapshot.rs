#![forbid(unsafe_code)]

//! Lossless JSON snapshots of a dashboard tree, plus invariant inspection.
//!
//! Snapshots are plain data: widgets appear as the string id stored under
//! [`crate::node::WIDGET_PROPERTY`], never as live component references, so a
//! dashboard can be copied, pasted, or persisted as text.
//!
//! ```json
//! { "schemaVersion": 1, "root": { "id": "root", "children": [], "isLeaf": false } }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::TreeNode;

/// Current snapshot schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    SNAPSHOT_SCHEMA_VERSION
}

/// Serialized envelope around an optional root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// `None` encodes the empty tree.
    pub root: Option<TreeNode>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn new(root: Option<TreeNode>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            root,
        }
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`TreeError::Json`] if an extension value cannot be serialized.
    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and version-check a snapshot.
    ///
    /// Nesting depth is unbounded: the parser grows its stack on the heap
    /// instead of stopping at serde_json's default recursion limit, so every
    /// exported tree imports back.
    ///
    /// # Errors
    ///
    /// [`TreeError::Json`] for malformed input and
    /// [`TreeError::UnsupportedSchemaVersion`] for unknown versions.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let mut parser = serde_json::Deserializer::from_str(json);
        parser.disable_recursion_limit();
        let snapshot = Self::deserialize(serde_stacker::Deserializer::new(&mut parser))?;
        parser.end()?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(TreeError::UnsupportedSchemaVersion {
                version: snapshot.schema_version,
            });
        }
        Ok(snapshot)
    }
}

/// Export a tree (or the empty tree) as a JSON snapshot.
///
/// # Errors
///
/// See [`DashboardSnapshot::to_json`].
pub fn export_to_json(root: Option<&TreeNode>) -> Result<String, TreeError> {
    DashboardSnapshot::new(root.cloned()).to_json()
}

/// Import a tree from a JSON snapshot produced by [`export_to_json`].
///
/// # Errors
///
/// See [`DashboardSnapshot::from_json`].
pub fn import_from_json(json: &str) -> Result<Option<TreeNode>, TreeError> {
    Ok(DashboardSnapshot::from_json(json)?.root)
}

/// Kind of invariant finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCode {
    DuplicateNodeId,
    LeafWithChildren,
}

/// One invariant finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub node_id: String,
    pub message: String,
}

/// Findings over a whole tree. Mutations never run this; it is a diagnostic
/// for imported or hand-built trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn has(&self, code: InvariantCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

/// Check id uniqueness and that no leaf carries children.
#[must_use]
pub fn check_invariants(root: &TreeNode) -> InvariantReport {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for node in root.iter() {
        if !seen.insert(node.id.as_str()) {
            issues.push(InvariantIssue {
                code: InvariantCode::DuplicateNodeId,
                node_id: node.id.clone(),
                message: format!("node id {:?} appears more than once", node.id),
            });
        }
        if node.is_leaf && !node.children.is_empty() {
            issues.push(InvariantIssue {
                code: InvariantCode::LeafWithChildren,
                node_id: node.id.clone(),
                message: format!(
                    "leaf {:?} carries {} children",
                    node.id,
                    node.children.len()
                ),
            });
        }
    }
    InvariantReport { issues }
}
