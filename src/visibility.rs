/*!
 * View filtering over a built project tree
 */

use std::collections::BTreeSet;

use crate::types::{NodeId, ProjectTree};

/// Refresh exclusion flags and hide excluded nodes unless `show_excluded`.
///
/// Only `excluded` and `hidden` are written; checked state and the tree
/// shape are left alone, so this can be rerun after every toggle. Returns
/// the number of hidden nodes.
pub fn apply_visibility(
    tree: &mut ProjectTree,
    excluded: &BTreeSet<String>,
    show_excluded: bool,
) -> usize {
    let mut hidden = 0;
    for node in tree.iter_mut() {
        node.excluded = !node.rel_path.is_empty() && excluded.contains(&node.rel_path);
        node.hidden = node.excluded && !show_excluded;
        if node.hidden {
            hidden += 1;
        }
    }
    hidden
}

/// Relative paths of every node currently on screen, in display order.
///
/// The root is omitted; descendants of hidden directories are not visible.
pub fn visible_paths(tree: &ProjectTree) -> Vec<String> {
    let mut visible = Vec::new();
    walk_visible(tree, tree.root(), &mut |id| {
        let node = tree.node(id);
        if !node.rel_path.is_empty() {
            visible.push(node.rel_path.clone());
        }
    });
    visible
}

/// Render the visible part of the tree as an indented listing
pub fn render_visible(tree: &ProjectTree) -> String {
    let mut out = String::new();
    let root = tree.node(tree.root());
    out.push_str(&root.name);
    out.push_str("/\n");
    render_children(tree, tree.root(), 1, &mut out);
    out
}

fn render_children(tree: &ProjectTree, id: NodeId, depth: usize, out: &mut String) {
    for child in &tree.node(id).children {
        let node = tree.node(*child);
        if node.hidden {
            continue;
        }
        out.push_str(&"  ".repeat(depth));
        if node.is_dir() {
            out.push_str(&node.name);
            out.push('/');
        } else {
            out.push_str(if node.checked { "[x] " } else { "[ ] " });
            out.push_str(&node.name);
        }
        if node.excluded {
            out.push_str("  (excluded)");
        }
        out.push('\n');
        if node.is_dir() {
            render_children(tree, *child, depth + 1, out);
        }
    }
}

fn walk_visible<F: FnMut(NodeId)>(tree: &ProjectTree, id: NodeId, visit: &mut F) {
    if tree.node(id).hidden {
        return;
    }
    visit(id);
    for child in &tree.node(id).children {
        walk_visible(tree, *child, visit);
    }
}
