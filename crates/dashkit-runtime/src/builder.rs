#![forbid(unsafe_code)]

//! Tree client with a widget registry.
//!
//! Widgets are registered once per session and referenced from leaf nodes by
//! id (the `"widget"` property). `C` is whatever the host renders with: a
//! component handle, a factory closure, or just a name.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use dashkit_core::{TreeError, TreeNode, WIDGET_PROPERTY};

use crate::client::TreeClient;
use crate::config::ClientConfig;

/// Id of the placeholder widget every builder starts with.
pub const DEFAULT_WIDGET_ID: &str = "default";

/// A widget available to the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredWidget<C> {
    pub id: String,
    pub display_name: String,
    pub component: C,
}

impl<C> RegisteredWidget<C> {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, component: C) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            component,
        }
    }
}

/// Registered widgets in registration order, plus the default used for
/// leaves with no widget assigned.
#[derive(Debug, Clone)]
pub struct WidgetRegistry<C> {
    widgets: Vec<RegisteredWidget<C>>,
    default: RegisteredWidget<C>,
}

impl<C: Clone> WidgetRegistry<C> {
    /// Empty registry whose default is the `"default"` placeholder rendering
    /// `placeholder`.
    pub fn new(placeholder: C) -> Self {
        Self {
            widgets: Vec::new(),
            default: RegisteredWidget::new(DEFAULT_WIDGET_ID, "Default", placeholder),
        }
    }

    pub fn register(&mut self, widget: RegisteredWidget<C>) -> Result<(), TreeError> {
        if self.get(&widget.id).is_some() {
            return Err(TreeError::DuplicateWidget { id: widget.id });
        }
        self.widgets.push(widget);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegisteredWidget<C>> {
        self.widgets.iter().find(|widget| widget.id == id)
    }

    /// Make the registered widget `id` the default. Unknown ids leave the
    /// current default in place.
    pub fn set_default(&mut self, id: &str) -> Result<(), TreeError> {
        let widget = self.get(id).cloned().ok_or_else(|| TreeError::widget_not_found(id))?;
        self.default = widget;
        Ok(())
    }

    #[must_use]
    pub fn default_widget(&self) -> &RegisteredWidget<C> {
        &self.default
    }

    #[must_use]
    pub fn widgets(&self) -> &[RegisteredWidget<C>] {
        &self.widgets
    }
}

/// What a node renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetSlot<C> {
    /// The node is a container and renders its children.
    Container,
    /// A leaf with no widget; renders the registry default.
    Unassigned(RegisteredWidget<C>),
    /// A leaf with a registered widget.
    Assigned(RegisteredWidget<C>),
}

/// [`TreeClient`] plus a widget registry. Derefs to the tree client, and
/// clones share both the tree and the registry.
#[derive(Clone)]
pub struct BuilderClient<C> {
    tree: TreeClient,
    registry: Rc<RefCell<WidgetRegistry<C>>>,
}

impl<C> fmt::Debug for BuilderClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("BuilderClient")
            .field("tree", &self.tree)
            .field("widgets", &registry.widgets.len())
            .field("default", &registry.default.id)
            .finish()
    }
}

impl<C> Deref for BuilderClient<C> {
    type Target = TreeClient;

    fn deref(&self) -> &TreeClient {
        &self.tree
    }
}

impl<C: Clone> BuilderClient<C> {
    pub fn new(root: Option<TreeNode>, placeholder: C) -> Self {
        Self::with_config(root, ClientConfig::default(), placeholder)
    }

    pub fn with_config(root: Option<TreeNode>, config: ClientConfig, placeholder: C) -> Self {
        Self {
            tree: TreeClient::with_config(root, config),
            registry: Rc::new(RefCell::new(WidgetRegistry::new(placeholder))),
        }
    }

    /// The underlying tree client.
    #[must_use]
    pub fn tree(&self) -> &TreeClient {
        &self.tree
    }

    /// Register `widget`; chainable.
    pub fn register(&self, widget: RegisteredWidget<C>) -> Result<&Self, TreeError> {
        self.registry.borrow_mut().register(widget)?;
        Ok(self)
    }

    pub fn set_default_widget(&self, id: &str) -> Result<(), TreeError> {
        self.registry.borrow_mut().set_default(id)
    }

    #[must_use]
    pub fn default_widget(&self) -> RegisteredWidget<C> {
        self.registry.borrow().default.clone()
    }

    #[must_use]
    pub fn widgets(&self) -> Vec<RegisteredWidget<C>> {
        self.registry.borrow().widgets.clone()
    }

    /// Registered widget `id`, or `NotFound`.
    pub fn widget(&self, id: &str) -> Result<RegisteredWidget<C>, TreeError> {
        self.registry
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::widget_not_found(id))
    }

    /// Put widget `widget_id` on leaf `node_id`.
    ///
    /// A missing node is a no-op (`Ok(false)`). Unknown widgets, containers and
    /// leaves that already carry a widget are errors.
    pub fn assign_widget(&self, node_id: &str, widget_id: &str) -> Result<bool, TreeError> {
        self.widget(widget_id)?;
        let Some(node) = self.tree.find_node(node_id) else {
            debug!(node_id, widget_id, "assign_widget: no such node");
            return Ok(false);
        };
        if !node.is_leaf {
            return Err(TreeError::invariant(node_id, "containers cannot hold a widget"));
        }
        if let Some(existing) = node.widget_id() {
            return Err(TreeError::invariant(
                node_id,
                format!("already holds widget {existing}"),
            ));
        }
        let widget_id = widget_id.to_string();
        Ok(self
            .tree
            .set_node_property(node_id, WIDGET_PROPERTY, move |_| Some(Value::String(widget_id))))
    }

    /// Resolve what node `node_id` renders as. `Ok(None)` when the node is
    /// missing; a reference to an unregistered widget is an error.
    pub fn widget_slot(&self, node_id: &str) -> Result<Option<WidgetSlot<C>>, TreeError> {
        let Some(node) = self.tree.find_node(node_id) else {
            return Ok(None);
        };
        if !node.is_leaf {
            return Ok(Some(WidgetSlot::Container));
        }
        let slot = match node.widget_id() {
            Some(id) => WidgetSlot::Assigned(self.widget(id)?),
            None => WidgetSlot::Unassigned(self.default_widget()),
        };
        Ok(Some(slot))
    }
}
