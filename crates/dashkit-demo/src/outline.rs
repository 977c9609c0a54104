use std::fmt::Write as _;

use dashkit::core::{flatten, visible_items};
use dashkit::{StyleProps, TreeNode};

/// Indented text rendering of the rows a tree view would show.
///
/// Collapsed containers are marked `+` and hide their children; expanded
/// containers are marked `-`. Leaves show their widget and column span.
#[must_use]
pub fn render_outline(root: &TreeNode) -> String {
    let mut out = String::new();
    for item in visible_items(&flatten(root), None) {
        let indent = "  ".repeat(item.depth);
        let node = &item.node;
        if node.is_leaf {
            let style = StyleProps::of(node);
            let widget = node.widget_id().unwrap_or("default");
            let _ = writeln!(out, "{indent}* {} [{widget}, md={}]", node.id, style.md);
        } else {
            let marker = if node.is_collapsed() { '+' } else { '-' };
            let _ = writeln!(out, "{indent}{marker} {} ({})", node.id, item.child_count);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_children_are_hidden() {
        let root = TreeNode::root_with(vec![
            TreeNode::container("open").child(TreeNode::leaf("shown").with_prop("widget", "chart")),
            TreeNode::container("shut")
                .with_collapsed(true)
                .child(TreeNode::leaf("hidden")),
        ]);
        let outline = render_outline(&root);
        assert_eq!(
            outline,
            "- root (2)\n  - open (1)\n    * shown [chart, md=12]\n  + shut (1)\n"
        );
    }
}
