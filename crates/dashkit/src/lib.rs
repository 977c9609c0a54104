#![forbid(unsafe_code)]

//! dashkit public facade crate.
//!
//! Re-exports the tree model and algorithms from `dashkit-core` and, with the
//! default `runtime` feature, the stateful client from `dashkit-runtime`.
//!
//! ```
//! use dashkit::prelude::*;
//!
//! let client = TreeClient::new(Some(TreeNode::root_with(vec![TreeNode::container("row")])));
//! client.add_child_to_node("row", TreeNode::leaf("chart"))?;
//! assert_eq!(client.child_count("root"), 2);
//! # Ok::<(), dashkit::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use dashkit_core::{
    AlignItems, DashboardSnapshot, FlattenedNode, FlexDirection, InvariantCode, InvariantIssue,
    InvariantReport, JustifyContent, NotFoundKind, Projection, ROOT_ID, SNAPSHOT_SCHEMA_VERSION,
    STYLE_PROPERTY, StyleProps, TreeError, TreeNode, WIDGET_PROPERTY, check_invariants,
    export_to_json, import_from_json, merge_style,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "config")]
pub use dashkit_runtime::ConfigError;
#[cfg(feature = "runtime")]
pub use dashkit_runtime::{
    BuilderClient, ClientConfig, RegisteredWidget, SpecialNode, TreeClient, Watch, WidgetSlot,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for dashkit apps.
#[derive(Debug)]
pub enum Error {
    /// Tree, widget, channel or snapshot error.
    Tree(TreeError),
    /// Configuration could not be loaded.
    #[cfg(feature = "config")]
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "{err}"),
            #[cfg(feature = "config")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            #[cfg(feature = "config")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

#[cfg(feature = "config")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for dashkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{Error, FlattenedNode, Projection, Result, StyleProps, TreeError, TreeNode};

    #[cfg(feature = "runtime")]
    pub use crate::{
        BuilderClient, ClientConfig, RegisteredWidget, SpecialNode, TreeClient, Watch, WidgetSlot,
    };

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use dashkit_core as core;
#[cfg(feature = "runtime")]
pub use dashkit_runtime as runtime;
