/*!
 * Core types and data structures for projprep
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Represents the kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Directory that may hold further entries
    Directory,
    /// Regular file
    File,
}

/// Index of a node inside a [`ProjectTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single filesystem entry of the project tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated; empty for the root
    pub rel_path: String,
    /// Entry kind
    pub kind: NodeKind,
    /// Children in display order (empty for files)
    pub children: Vec<NodeId>,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Checked for export (files only)
    pub checked: bool,
    /// Listed in the project's exclusion set
    pub excluded: bool,
    /// Hidden from the current view
    pub hidden: bool,
}

impl TreeNode {
    /// Whether this node is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Whether this node is a file
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// Arena holding one build of a project tree.
///
/// Nodes are never carried over between builds; state that must survive a
/// reload lives in the stores and is looked up by relative path.
#[derive(Debug, Clone)]
pub struct ProjectTree {
    root_path: PathBuf,
    nodes: Vec<TreeNode>,
    by_rel_path: HashMap<String, NodeId>,
}

impl ProjectTree {
    /// Create a tree holding only the root directory node
    pub fn new(root_path: &Path) -> Self {
        let name = root_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let root = TreeNode {
            name,
            path: root_path.to_path_buf(),
            rel_path: String::new(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            parent: None,
            checked: false,
            excluded: false,
            hidden: false,
        };

        let mut by_rel_path = HashMap::new();
        by_rel_path.insert(String::new(), NodeId(0));

        Self {
            root_path: root_path.to_path_buf(),
            nodes: vec![root],
            by_rel_path,
        }
    }

    /// Append a child under `parent` and return its id
    pub fn push_child(
        &mut self,
        parent: NodeId,
        name: String,
        path: PathBuf,
        rel_path: String,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_rel_path.insert(rel_path.clone(), id);
        self.nodes.push(TreeNode {
            name,
            path,
            rel_path,
            kind,
            children: Vec::new(),
            parent: Some(parent),
            checked: false,
            excluded: false,
            hidden: false,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Absolute path of the project root
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// Look up a node by relative path
    pub fn find(&self, rel_path: &str) -> Option<NodeId> {
        self.by_rel_path.get(rel_path).copied()
    }

    /// Total number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over every node in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Mutable iteration in arena order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TreeNode> {
        self.nodes.iter_mut()
    }

    /// Node ids in depth-first display order, root first
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Checked files in display order, as absolute paths
    pub fn checked_files(&self) -> Vec<PathBuf> {
        self.preorder()
            .into_iter()
            .map(|id| self.node(id))
            .filter(|n| n.is_file() && n.checked)
            .map(|n| n.path.clone())
            .collect()
    }

    /// Checked files in display order, as relative paths
    pub fn checked_rel_paths(&self) -> Vec<String> {
        self.preorder()
            .into_iter()
            .map(|id| self.node(id))
            .filter(|n| n.is_file() && n.checked)
            .map(|n| n.rel_path.clone())
            .collect()
    }

    /// Set the checked state of every file under `id` (inclusive)
    pub fn check_subtree(&mut self, id: NodeId, checked: bool) -> usize {
        let mut changed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current.0];
            if node.is_file() && node.checked != checked {
                node.checked = checked;
                changed += 1;
            }
            stack.extend(node.children.iter().copied());
        }
        changed
    }

    /// Whether the node and all its ancestors are shown
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur);
            if node.hidden {
                return false;
            }
            current = node.parent;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectTree {
        let mut tree = ProjectTree::new(Path::new("/p"));
        let src = tree.push_child(
            tree.root(),
            "src".into(),
            "/p/src".into(),
            "src".into(),
            NodeKind::Directory,
        );
        tree.push_child(
            src,
            "a.py".into(),
            "/p/src/a.py".into(),
            "src/a.py".into(),
            NodeKind::File,
        );
        tree.push_child(
            tree.root(),
            "b.md".into(),
            "/p/b.md".into(),
            "b.md".into(),
            NodeKind::File,
        );
        tree
    }

    #[test]
    fn test_preorder_follows_child_order() {
        let tree = sample();
        let names: Vec<_> = tree
            .preorder()
            .into_iter()
            .map(|id| tree.node(id).rel_path.clone())
            .collect();
        assert_eq!(names, vec!["", "src", "src/a.py", "b.md"]);
    }

    #[test]
    fn test_check_subtree_only_touches_files() {
        let mut tree = sample();
        let changed = tree.check_subtree(tree.root(), true);
        assert_eq!(changed, 2);
        assert!(!tree.node(tree.root()).checked);
        assert_eq!(tree.checked_rel_paths(), vec!["src/a.py", "b.md"]);
        assert_eq!(
            tree.checked_files(),
            vec![PathBuf::from("/p/src/a.py"), PathBuf::from("/p/b.md")]
        );
    }

    #[test]
    fn test_visibility_follows_ancestors() {
        let mut tree = sample();
        let src = tree.find("src").unwrap();
        let file = tree.find("src/a.py").unwrap();
        tree.node_mut(src).hidden = true;
        assert!(!tree.is_visible(file));
        assert!(tree.is_visible(tree.find("b.md").unwrap()));
    }
}
