#![forbid(unsafe_code)]

//! Error taxonomy shared by the tree algorithms and the clients.
//!
//! Mutations on a missing node are not errors at the client level (the UI may
//! race a removal against a pending edit), so `NotFound` mostly surfaces from
//! get-or-fail lookups and from the pure algorithms that callers may choose to
//! ignore.

use std::fmt;

use crate::snapshot::SNAPSHOT_SCHEMA_VERSION;

/// What kind of identifier a [`TreeError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Node,
    Widget,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Widget => f.write_str("widget"),
        }
    }
}

/// Errors raised by dashboard tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// An id was absent from the relevant collection.
    NotFound { kind: NotFoundKind, id: String },
    /// Caller misuse: leaf-only operation on a container, a second widget
    /// assignment, a child appended to a leaf.
    InvariantViolation { node_id: String, reason: String },
    /// Detach was requested on a channel that was never created (or was
    /// already pruned).
    NoChannel { id: String },
    /// A widget with this id is already registered.
    DuplicateWidget { id: String },
    /// Snapshot envelope carries a schema version this build cannot read.
    UnsupportedSchemaVersion { version: u16 },
    /// Malformed JSON snapshot.
    Json(String),
}

impl TreeError {
    #[must_use]
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: NotFoundKind::Node,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn widget_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: NotFoundKind::Widget,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn invariant(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// True for any `NotFound` variant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} {id:?} not found"),
            Self::InvariantViolation { node_id, reason } => {
                write!(f, "invariant violated on node {node_id:?}: {reason}")
            }
            Self::NoChannel { id } => write!(f, "no notification channel for {id:?}"),
            Self::DuplicateWidget { id } => write!(f, "widget {id:?} is already registered"),
            Self::UnsupportedSchemaVersion { version } => write!(
                f,
                "unsupported snapshot schema version {version} (expected {SNAPSHOT_SCHEMA_VERSION})"
            ),
            Self::Json(msg) => write!(f, "malformed snapshot: {msg}"),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
