#![forbid(unsafe_code)]

//! Stateful owner of one dashboard tree.
//!
//! # Design
//!
//! [`TreeClient`] is a cheap handle over `Rc<RefCell<ClientState>>`; clones
//! share the same tree and channels. Every method takes `&self` and releases
//! its borrow before any observer runs, so observers are free to read from or
//! mutate the client they are watching.
//!
//! Each applied mutation is followed by exactly one cascade:
//!
//! 1. every special channel receives its current pointer (`None` when clear);
//! 2. the tree channel receives a copy of the root (`None` when empty);
//! 3. node channels for ids present in the tree receive a copy of that node,
//!    in pre-order;
//! 4. node channels for ids no longer in the tree receive `None`.
//!
//! Calls that change nothing (unknown id, root removal, clearing an unset
//! pointer) do not cascade.
//!
//! # Invariants
//!
//! 1. Observers only ever see copies; nothing they hold aliases client state.
//! 2. Node and special channels exist only while they have observers. A detach
//!    that empties a channel removes it.
//! 3. A cascade started from inside an observer supersedes the one in flight:
//!    the outer cascade stops delivering once the nested one has run.
//!
//! # Failure Modes
//!
//! - **Observer ping-pong**: two observers that keep mutating in response to
//!   each other recurse without bound. Depth past
//!   [`ClientConfig::reentrancy_warn_depth`] is logged, never refused.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::{debug, info_span, warn};
use web_time::Instant;

use dashkit_core::{
    FlattenedNode, Projection, TreeError, TreeNode, add_child, apply_projection, build_tree,
    descendant_count, export_to_json, find_deep, flatten, import_from_json, projected_depth,
    remove_subtree, update_node, visible_items,
};

use crate::config::ClientConfig;
use crate::special::SpecialNode;
use crate::subject::{ObserverRef, Subject, observer};

/// Observer of a whole tree or of a single node. `None` means "no tree" or
/// "node no longer present".
pub type NodeObserver = ObserverRef<Option<TreeNode>>;

/// Observer of a special pointer. `None` means the pointer is clear.
pub type SpecialObserver = ObserverRef<Option<String>>;

type NodeChannel = Rc<Subject<Option<TreeNode>>>;
type SpecialChannel = Rc<Subject<Option<String>>>;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

struct ClientState {
    config: ClientConfig,
    root: Option<TreeNode>,
    tree_channel: NodeChannel,
    node_channels: BTreeMap<String, NodeChannel>,
    specials: BTreeMap<SpecialNode, String>,
    special_channels: BTreeMap<SpecialNode, SpecialChannel>,
    generation: u64,
    depth: usize,
}

/// Everything one cascade will deliver, computed under a single borrow.
struct Deliveries {
    specials: Vec<(SpecialChannel, Option<String>)>,
    tree: (NodeChannel, Option<TreeNode>),
    nodes: Vec<(NodeChannel, Option<TreeNode>)>,
}

impl ClientState {
    fn deliveries(&self) -> Deliveries {
        let specials = self
            .special_channels
            .iter()
            .map(|(name, channel)| (Rc::clone(channel), self.specials.get(name).cloned()))
            .collect();

        let mut nodes = Vec::new();
        let mut present = HashSet::new();
        if let Some(root) = &self.root {
            for node in root.iter() {
                if !present.insert(node.id.as_str()) {
                    continue;
                }
                if let Some(channel) = self.node_channels.get(&node.id) {
                    nodes.push((Rc::clone(channel), Some(node.clone())));
                }
            }
        }
        for (id, channel) in &self.node_channels {
            if !present.contains(id.as_str()) {
                nodes.push((Rc::clone(channel), None));
            }
        }

        Deliveries {
            specials,
            tree: (Rc::clone(&self.tree_channel), self.root.clone()),
            nodes,
        }
    }

    fn detach_node(&mut self, id: &str, handle: &NodeObserver) -> Result<(), TreeError> {
        let channel = self
            .node_channels
            .get(id)
            .ok_or_else(|| TreeError::NoChannel { id: id.to_string() })?;
        channel.detach(handle);
        if channel.is_empty() {
            self.node_channels.remove(id);
        }
        Ok(())
    }

    fn detach_special(&mut self, name: &SpecialNode, handle: &SpecialObserver) -> Result<(), TreeError> {
        let channel = self
            .special_channels
            .get(name)
            .ok_or_else(|| TreeError::NoChannel { id: name.to_string() })?;
        channel.detach(handle);
        if channel.is_empty() {
            self.special_channels.remove(name);
        }
        Ok(())
    }
}

/// Handle to a dashboard tree and its notification channels.
#[derive(Clone)]
pub struct TreeClient {
    client_id: u64,
    state: Rc<RefCell<ClientState>>,
}

impl fmt::Debug for TreeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TreeClient")
            .field("client_id", &self.client_id)
            .field("root", &state.root.as_ref().map(|root| root.id.as_str()))
            .field("node_channels", &state.node_channels.len())
            .field("special_channels", &state.special_channels.len())
            .finish()
    }
}

impl Default for TreeClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TreeClient {
    /// Client over `root` with the default configuration.
    #[must_use]
    pub fn new(root: Option<TreeNode>) -> Self {
        Self::with_config(root, ClientConfig::default())
    }

    /// Client over `root`. An empty root is replaced by the sample navigation
    /// tree when `config.seed_children` is set.
    #[must_use]
    pub fn with_config(root: Option<TreeNode>, config: ClientConfig) -> Self {
        for problem in config.validate() {
            warn!(problem = %problem, "dashkit client config");
        }
        let root = match root {
            None if config.seed_children => Some(seeded_root(&config.root_id)),
            other => other,
        };
        Self {
            client_id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            state: Rc::new(RefCell::new(ClientState {
                config,
                root,
                tree_channel: Rc::new(Subject::new()),
                node_channels: BTreeMap::new(),
                specials: BTreeMap::new(),
                special_channels: BTreeMap::new(),
                generation: 0,
                depth: 0,
            })),
        }
    }

    /// Process-unique id of this client. Clones report the same id.
    #[must_use]
    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    #[must_use]
    pub fn config(&self) -> ClientConfig {
        self.state.borrow().config.clone()
    }

    /// Copy of the current root.
    #[must_use]
    pub fn root(&self) -> Option<TreeNode> {
        self.state.borrow().root.clone()
    }

    /// Replace the whole tree.
    ///
    /// Special pointers to ids absent from the new tree are cleared.
    pub fn set_root(&self, root: Option<TreeNode>) {
        {
            let mut state = self.state.borrow_mut();
            {
                let present: HashSet<&str> = root
                    .iter()
                    .flat_map(|root| root.iter())
                    .map(|node| node.id.as_str())
                    .collect();
                state
                    .specials
                    .retain(|_, pointer| present.contains(pointer.as_str()));
            }
            state.root = root;
        }
        self.cascade();
    }

    /// Copy of the node with `id`, if present.
    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<TreeNode> {
        let state = self.state.borrow();
        state.root.as_ref().and_then(|root| find_deep(root, id)).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        let state = self.state.borrow();
        state.root.as_ref().is_some_and(|root| find_deep(root, id).is_some())
    }

    /// Remove the subtree rooted at `id`.
    ///
    /// Special pointers into the removed subtree are cleared. The root itself
    /// cannot be removed. Returns whether anything changed.
    pub fn remove_node(&self, id: &str) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(root) = state.root.as_ref() else {
                debug!(id, "remove_node on empty client");
                return false;
            };
            if root.id == id {
                debug!(id, "remove_node refused for root");
                return false;
            }
            let Some(target) = find_deep(root, id) else {
                debug!(id, "remove_node: no such node");
                return false;
            };
            let removed: HashSet<String> = target.iter().map(|node| node.id.clone()).collect();
            let next = remove_subtree(root, id);
            state.root = Some(next);
            state
                .specials
                .retain(|_, pointer| !removed.contains(pointer.as_str()));
        }
        self.cascade();
        true
    }

    /// Apply `f` to the node with `id`. Returns whether the node was found.
    pub fn update_node(&self, id: &str, f: impl FnOnce(&mut TreeNode)) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(root) = state.root.as_ref() else {
                return false;
            };
            let (next, found) = update_node(root, id, f);
            if !found {
                debug!(id, "update_node: no such node");
                return false;
            }
            state.root = Some(next);
        }
        self.cascade();
        true
    }

    /// Replace property `name` on node `id` with `updater(old)`.
    ///
    /// Returns `false` without notifying when the node is missing or the
    /// property is not writable.
    pub fn set_node_property(
        &self,
        id: &str,
        name: &str,
        updater: impl FnOnce(Option<&Value>) -> Option<Value>,
    ) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(root) = state.root.as_ref() else {
                return false;
            };
            let mut written = false;
            let (next, found) = update_node(root, id, |node| {
                written = node.apply_property(name, updater);
            });
            if !(found && written) {
                debug!(id, name, found, "set_node_property not applied");
                return false;
            }
            state.root = Some(next);
        }
        self.cascade();
        true
    }

    /// Flip the collapsed flag of container `id`. Leaves are left alone.
    pub fn toggle_collapsed(&self, id: &str) -> bool {
        match self.find_node(id) {
            Some(node) if !node.is_leaf => self.update_node(id, |node| {
                node.collapsed = Some(!node.is_collapsed());
            }),
            _ => false,
        }
    }

    /// Append `child` to `parent_id`.
    ///
    /// A missing parent is a no-op (`Ok(false)`); a leaf parent is an error.
    pub fn add_child_to_node(&self, parent_id: &str, child: TreeNode) -> Result<bool, TreeError> {
        {
            let mut state = self.state.borrow_mut();
            let Some(root) = state.root.as_ref() else {
                return Ok(false);
            };
            match add_child(root, parent_id, child) {
                Ok(next) => state.root = Some(next),
                Err(err) if err.is_not_found() => {
                    debug!(parent_id, "add_child_to_node: no such parent");
                    return Ok(false);
                }
                Err(err) => return Err(err),
            }
        }
        self.cascade();
        Ok(true)
    }

    /// Number of descendants of `id` (0 when missing).
    #[must_use]
    pub fn child_count(&self, id: &str) -> usize {
        let state = self.state.borrow();
        state.root.as_ref().map_or(0, |root| descendant_count(root, id))
    }

    #[must_use]
    pub fn flatten(&self) -> Vec<FlattenedNode> {
        let state = self.state.borrow();
        state.root.as_ref().map(flatten).unwrap_or_default()
    }

    /// Rows shown by the tree view while `active_id` is being dragged.
    #[must_use]
    pub fn visible_items(&self, active_id: Option<&str>) -> Vec<FlattenedNode> {
        visible_items(&self.flatten(), active_id)
    }

    /// Where `active_id` would land if dropped on `over_id` now.
    #[must_use]
    pub fn projected_depth(&self, active_id: &str, over_id: &str, drag_offset: f64) -> Option<Projection> {
        let width = self.state.borrow().config.indentation_width;
        let visible = self.visible_items(Some(active_id));
        projected_depth(&visible, active_id, over_id, drag_offset, width)
    }

    /// Drop `active_id` on `over_id` and rebuild the tree.
    ///
    /// Returns `false` when either id is unknown or the drop would move a node
    /// into its own subtree.
    pub fn commit_drop(&self, active_id: &str, over_id: &str, drag_offset: f64) -> bool {
        let Some(projection) = self.projected_depth(active_id, over_id, drag_offset) else {
            debug!(active_id, over_id, "commit_drop: unknown id");
            return false;
        };
        let Some(items) = apply_projection(&self.flatten(), active_id, over_id, &projection) else {
            debug!(active_id, over_id, "commit_drop rejected");
            return false;
        };
        self.rebuild_from_flattened(items);
        true
    }

    /// Replace the tree with one assembled from `items`.
    pub fn rebuild_from_flattened(&self, items: Vec<FlattenedNode>) {
        self.set_root(Some(build_tree(items)));
    }

    /// Serialize the current tree in the snapshot envelope.
    pub fn export_json(&self) -> Result<String, TreeError> {
        export_to_json(self.state.borrow().root.as_ref())
    }

    /// Replace the tree with a snapshot. On error the tree is unchanged and
    /// nothing is notified.
    pub fn import_json(&self, json: &str) -> Result<(), TreeError> {
        let root = import_from_json(json)?;
        self.set_root(root);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Special pointers
    // ---------------------------------------------------------------------

    /// Node id `name` points at.
    #[must_use]
    pub fn special(&self, name: &SpecialNode) -> Option<String> {
        self.state.borrow().specials.get(name).cloned()
    }

    /// Point `name` at node `id`. Unknown nodes are ignored.
    pub fn set_special(&self, name: SpecialNode, id: &str) -> bool {
        if !self.contains(id) {
            debug!(special = %name, id, "set_special: no such node");
            return false;
        }
        self.state.borrow_mut().specials.insert(name, id.to_string());
        self.cascade();
        true
    }

    /// Clear `name`. Returns whether it was set.
    pub fn clear_special(&self, name: &SpecialNode) -> bool {
        let was_set = self.state.borrow_mut().specials.remove(name).is_some();
        if was_set {
            self.cascade();
        }
        was_set
    }

    /// Clear `name` if it already points at `id`, otherwise point it there.
    pub fn toggle_special(&self, name: SpecialNode, id: &str) -> bool {
        if self.special(&name).as_deref() == Some(id) {
            self.clear_special(&name)
        } else {
            self.set_special(name, id)
        }
    }

    // ---------------------------------------------------------------------
    // Channels
    // ---------------------------------------------------------------------

    pub fn tree_attach(&self, observer: NodeObserver) {
        let channel = Rc::clone(&self.state.borrow().tree_channel);
        channel.attach(observer);
    }

    /// Detach from the tree channel. Unknown observers are ignored.
    pub fn tree_detach(&self, observer: &NodeObserver) -> bool {
        let channel = Rc::clone(&self.state.borrow().tree_channel);
        channel.detach(observer)
    }

    /// Observe node `id`. The channel is created on first attach and may be
    /// attached before the node exists.
    pub fn node_attach(&self, id: &str, observer: NodeObserver) {
        let channel = {
            let mut state = self.state.borrow_mut();
            Rc::clone(state.node_channels.entry(id.to_string()).or_default())
        };
        channel.attach(observer);
    }

    /// Detach from node `id`'s channel, removing the channel once empty.
    pub fn node_detach(&self, id: &str, observer: &NodeObserver) -> Result<(), TreeError> {
        self.state.borrow_mut().detach_node(id, observer)
    }

    pub fn special_attach(&self, name: SpecialNode, observer: SpecialObserver) {
        let channel = {
            let mut state = self.state.borrow_mut();
            Rc::clone(state.special_channels.entry(name).or_default())
        };
        channel.attach(observer);
    }

    /// Detach from `name`'s channel, removing the channel once empty.
    pub fn special_detach(&self, name: &SpecialNode, observer: &SpecialObserver) -> Result<(), TreeError> {
        self.state.borrow_mut().detach_special(name, observer)
    }

    /// Whether node `id` currently has a channel.
    #[must_use]
    pub fn has_node_channel(&self, id: &str) -> bool {
        self.state.borrow().node_channels.contains_key(id)
    }

    /// Whether `name` currently has a channel.
    #[must_use]
    pub fn has_special_channel(&self, name: &SpecialNode) -> bool {
        self.state.borrow().special_channels.contains_key(name)
    }

    /// Attach `f` to the tree channel until the guard drops.
    pub fn watch_tree(&self, f: impl Fn(&Option<TreeNode>) + 'static) -> Watch {
        let handle: NodeObserver = observer(f);
        self.tree_attach(Rc::clone(&handle));
        let state = Rc::downgrade(&self.state);
        Watch::new(move || {
            if let Some(state) = state.upgrade() {
                let channel = Rc::clone(&state.borrow().tree_channel);
                channel.detach(&handle);
            }
        })
    }

    /// Attach `f` to node `id` until the guard drops.
    pub fn watch_node(&self, id: &str, f: impl Fn(&Option<TreeNode>) + 'static) -> Watch {
        let handle: NodeObserver = observer(f);
        self.node_attach(id, Rc::clone(&handle));
        let state = Rc::downgrade(&self.state);
        let id = id.to_string();
        Watch::new(move || {
            if let Some(state) = Weak::upgrade(&state) {
                let _ = state.borrow_mut().detach_node(&id, &handle);
            }
        })
    }

    /// Attach `f` to special pointer `name` until the guard drops.
    pub fn watch_special(&self, name: SpecialNode, f: impl Fn(&Option<String>) + 'static) -> Watch {
        let handle: SpecialObserver = observer(f);
        self.special_attach(name.clone(), Rc::clone(&handle));
        let state = Rc::downgrade(&self.state);
        Watch::new(move || {
            if let Some(state) = Weak::upgrade(&state) {
                let _ = state.borrow_mut().detach_special(&name, &handle);
            }
        })
    }

    // ---------------------------------------------------------------------
    // Cascade
    // ---------------------------------------------------------------------

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    fn cascade(&self) {
        let (generation, depth, warn_depth, deliveries) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.depth += 1;
            (
                state.generation,
                state.depth,
                state.config.reentrancy_warn_depth,
                state.deliveries(),
            )
        };

        let start = Instant::now();
        let _span = info_span!(
            "dashkit.cascade",
            client_id = self.client_id,
            generation,
            depth = depth as u64,
            observers_notified = tracing::field::Empty,
            duration_us = tracing::field::Empty
        )
        .entered();
        if depth > warn_depth {
            warn!(client_id = self.client_id, depth, warn_depth, "deep re-entrant cascade");
        }

        let mut notified = 0usize;
        let completed = 'deliver: {
            for (channel, pointer) in &deliveries.specials {
                if !self.is_current(generation) {
                    break 'deliver false;
                }
                notified += channel.notify(pointer);
            }
            let (channel, root) = &deliveries.tree;
            if !self.is_current(generation) {
                break 'deliver false;
            }
            notified += channel.notify(root);
            for (channel, node) in &deliveries.nodes {
                if !self.is_current(generation) {
                    break 'deliver false;
                }
                notified += channel.notify(node);
            }
            true
        };

        self.state.borrow_mut().depth -= 1;
        let duration_us = start.elapsed().as_micros() as u64;
        tracing::Span::current().record("observers_notified", notified as u64);
        tracing::Span::current().record("duration_us", duration_us);
        if !completed {
            debug!(generation, "cascade superseded by a nested cascade");
        }
    }
}

/// Guard returned by the `watch_*` methods. Dropping it detaches the
/// observer (and prunes its channel if that leaves it empty).
pub struct Watch {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Watch {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch").finish_non_exhaustive()
    }
}

fn section(id: &str, children: &[&str]) -> TreeNode {
    TreeNode::container(id).with_children(children.iter().map(|c| TreeNode::container(*c)).collect())
}

/// The navigation tree a seeded client starts with.
fn seeded_root(root_id: &str) -> TreeNode {
    TreeNode::container(root_id).with_children(vec![
        section("Home", &[]),
        section("Collections", &["Spring", "Summer", "Fall", "Winter"]),
        section("About Us", &[]),
        section("My Account", &["Addresses", "Order History"]),
    ])
}
