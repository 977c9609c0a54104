#![forbid(unsafe_code)]

//! Named pointers into the tree ("the selected node", "the node whose
//! settings are open"), tracked outside the tree itself.

use std::fmt;

/// Name of a special-node pointer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecialNode {
    /// The node currently selected in the builder.
    Selected,
    /// The node whose settings panel is open.
    Settings,
    /// Application-defined pointer.
    Named(String),
}

impl SpecialNode {
    /// Pointer called `name`. The well-known names map to their variants.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "selected" => Self::Selected,
            "settings" => Self::Settings,
            _ => Self::Named(name),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Selected => "selected",
            Self::Settings => "settings",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for SpecialNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SpecialNode {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}
