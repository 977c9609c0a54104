//! Scripted editing session over the sample navigation tree.

use std::cell::Cell;
use std::rc::Rc;

use tracing::info;

use dashkit::{
    BuilderClient, ClientConfig, RegisteredWidget, STYLE_PROPERTY, SpecialNode, TreeNode,
    check_invariants, merge_style,
};

use crate::error::Result;
use crate::outline::render_outline;

/// What a session produced.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outline: String,
    pub snapshot: String,
    pub cascades: usize,
}

pub fn run_session(config: ClientConfig) -> Result<SessionReport> {
    let client = BuilderClient::with_config(None, config, "placeholder");
    client
        .register(RegisteredWidget::new("kpi", "KPI", "kpi-card"))?
        .register(RegisteredWidget::new("chart", "Chart", "line-chart"))?
        .register(RegisteredWidget::new("table", "Table", "data-table"))?;
    client.set_default_widget("kpi")?;

    let cascades = Rc::new(Cell::new(0usize));
    let _tree_watch = {
        let cascades = Rc::clone(&cascades);
        client.watch_tree(move |root| {
            cascades.set(cascades.get() + 1);
            let nodes = root.as_ref().map_or(0, |root| root.iter().count());
            info!(nodes, "tree changed");
        })
    };
    let _selection_watch = client.watch_special(SpecialNode::Selected, |selected| {
        info!(selected = selected.as_deref().unwrap_or("-"), "selection changed");
    });

    let root_id = client.config().root_id;
    client.add_child_to_node(&root_id, TreeNode::container("Dashboard"))?;
    client.add_child_to_node("Dashboard", TreeNode::leaf("Revenue"))?;
    client.add_child_to_node("Dashboard", TreeNode::leaf("Orders"))?;
    client.add_child_to_node("Dashboard", TreeNode::leaf("Notes"))?;

    client.assign_widget("Revenue", "chart")?;
    client.assign_widget("Orders", "table")?;
    client.set_node_property("Revenue", STYLE_PROPERTY, merge_style("md", 8));
    client.set_node_property("Orders", STYLE_PROPERTY, merge_style("md", 4));

    client.set_special(SpecialNode::Selected, "Revenue");
    client.commit_drop("Orders", "Revenue", 0.0);
    client.toggle_collapsed("Collections");
    client.remove_node("About Us");
    client.remove_node("Revenue");

    let root = client.root().unwrap_or_else(|| TreeNode::container(root_id.clone()));
    let report = check_invariants(&root);
    info!(clean = report.is_clean(), issues = report.issues.len(), "session finished");

    Ok(SessionReport {
        outline: render_outline(&root),
        snapshot: client.export_json()?,
        cascades: cascades.get(),
    })
}
