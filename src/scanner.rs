/*!
 * Project tree scanning
 */

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classifier::{EntryClassifier, EntryRules};
use crate::state::STATE_FILES;
use crate::types::{NodeId, NodeKind, ProjectTree};
use crate::utils::relative_path;

/// Scanner statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScannerStatistics {
    /// Directories added to the tree
    pub directories: usize,
    /// Files added to the tree
    pub files: usize,
    /// Directories whose listing failed and were left empty
    pub unreadable: usize,
}

/// Builds [`ProjectTree`]s for a project directory
pub struct Scanner {
    /// Entry filter
    classifier: EntryClassifier,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(rules: &EntryRules, progress: Arc<ProgressBar>) -> Self {
        Self {
            classifier: EntryClassifier::new(rules),
            progress,
        }
    }

    /// Scanner with default rules and no visible progress
    pub fn hidden() -> Self {
        Self::new(&EntryRules::default(), Arc::new(ProgressBar::hidden()))
    }

    /// Scan `root` and return the annotated tree.
    ///
    /// Nodes whose relative path is in `excluded` are marked excluded; files
    /// listed in `selection` are checked once the walk is complete. A root
    /// that is missing or not a directory yields a tree with no children.
    pub fn scan(
        &self,
        root: &Path,
        excluded: &BTreeSet<String>,
        selection: &[String],
    ) -> (ProjectTree, ScannerStatistics) {
        let mut tree = ProjectTree::new(root);
        let mut stats = ScannerStatistics::default();

        if root.is_dir() {
            let root_id = tree.root();
            self.scan_directory(&mut tree, root_id, root, excluded, &mut stats);
        } else {
            warn!("Project root {} is not a directory", root.display());
        }

        let marked = mark_selected(&mut tree, selection);
        debug!(
            "Scanned {}: {} directories, {} files, {} restored checks",
            root.display(),
            stats.directories,
            stats.files,
            marked
        );

        (tree, stats)
    }

    /// Scan a directory and append its surviving entries under `parent`
    fn scan_directory(
        &self,
        tree: &mut ProjectTree,
        parent: NodeId,
        abs_path: &Path,
        excluded: &BTreeSet<String>,
        stats: &mut ScannerStatistics,
    ) {
        let at_root = parent == tree.root();
        for entry in self.list_entries(abs_path, stats) {
            let name = entry.file_name().to_string_lossy().to_string();
            // The project's own state files are not part of the project
            if at_root && STATE_FILES.contains(&name.as_str()) {
                continue;
            }
            let entry_path = entry.path().to_path_buf();
            let Some(rel_path) = relative_path(tree.root_path(), &entry_path) else {
                continue;
            };
            let kind = if entry.file_type().is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };

            let id = tree.push_child(parent, name, entry_path.clone(), rel_path, kind);
            let node = tree.node_mut(id);
            node.excluded = excluded.contains(&node.rel_path);

            match kind {
                NodeKind::Directory => {
                    stats.directories += 1;
                    self.scan_directory(tree, id, &entry_path, excluded, stats);
                }
                NodeKind::File => {
                    stats.files += 1;
                    self.progress.inc(1);
                    self.progress
                        .set_message(format!("Current file: {}", display_name(&entry_path)));
                }
            }
        }
    }

    /// List one directory level, filtered and in display order.
    ///
    /// Listing failures are absorbed; the directory just yields fewer entries.
    fn list_entries(&self, abs_path: &Path, stats: &mut ScannerStatistics) -> Vec<DirEntry> {
        let mut failed = false;
        let mut entries: Vec<DirEntry> = WalkDir::new(abs_path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping entry under {}: {}", abs_path.display(), e);
                    failed = true;
                    None
                }
            })
            .filter(|e| {
                // Directory symlinks could lead back up the tree
                if e.path_is_symlink() && e.path().is_dir() {
                    debug!("Skipping directory symlink {}", e.path().display());
                    return false;
                }
                let name = e.file_name().to_string_lossy();
                self.classifier.include(&name, e.file_type().is_dir())
            })
            .collect();

        if failed {
            stats.unreadable += 1;
        }

        entries.sort_by(|a, b| {
            let a_dir = a.file_type().is_dir();
            let b_dir = b.file_type().is_dir();
            b_dir.cmp(&a_dir).then_with(|| {
                let a_name = a.file_name().to_string_lossy().to_lowercase();
                let b_name = b.file_name().to_string_lossy().to_lowercase();
                a_name
                    .cmp(&b_name)
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
        });

        entries
    }
}

/// Check every file whose relative path appears in `selection`.
///
/// Stale selection entries match nothing and are ignored. Returns the number
/// of files checked.
pub fn mark_selected(tree: &mut ProjectTree, selection: &[String]) -> usize {
    if selection.is_empty() {
        return 0;
    }
    let wanted: HashSet<&str> = selection.iter().map(String::as_str).collect();
    let mut marked = 0;
    for node in tree.iter_mut() {
        if node.is_file() && wanted.contains(node.rel_path.as_str()) {
            node.checked = true;
            marked += 1;
        }
    }
    marked
}

/// Shorten long file names for the progress line
fn display_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let count = file_name.chars().count();
    if count > 40 {
        let tail: String = file_name.chars().skip(count - 37).collect();
        format!("...{}", tail)
    } else {
        file_name
    }
}
