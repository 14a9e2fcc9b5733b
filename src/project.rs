/*!
 * Project session
 *
 * Owns one built tree plus the authoritative in-memory copies of the
 * project's exclusion and selection stores. Every mutation goes through
 * here and is flushed immediately.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::info;

use crate::{bail, error};
use crate::config::Config;
use crate::error::Result;
use crate::scanner::{Scanner, ScannerStatistics};
use crate::stage::{StageSummary, Stager};
use crate::state::{ExclusionStore, FilterStateStore, SelectionStore};
use crate::types::ProjectTree;
use crate::utils::normalize_relative;
use crate::visibility::{apply_visibility, visible_paths};
use crate::writer::{Canvas, CanvasWriter};

/// An opened project
pub struct Project {
    root: PathBuf,
    name: String,
    scanner: Scanner,
    stager: Stager,
    exclusions: ExclusionStore,
    selection: SelectionStore,
    tree: ProjectTree,
    stats: ScannerStatistics,
    show_excluded: bool,
}

impl Project {
    /// Open `root`, restoring its exclusions and saved selection.
    ///
    /// A missing root is not an error; the tree is simply empty.
    pub fn open(root: &Path, config: &Config, progress: Arc<ProgressBar>) -> Self {
        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let name = root
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let mut project = Self {
            scanner: Scanner::new(&config.entry_rules, progress),
            stager: Stager::new(config.stage_rules.clone()),
            exclusions: ExclusionStore::load(&root),
            selection: SelectionStore::load(&root),
            tree: ProjectTree::new(&root),
            stats: ScannerStatistics::default(),
            show_excluded: false,
            root,
            name,
        };
        project.reload();
        project
    }

    /// Rebuild the tree from disk.
    ///
    /// Checks are restored from the current selection, then the selection is
    /// recomputed from the tree so stale entries drop out of memory.
    pub fn reload(&mut self) {
        let (mut tree, stats) =
            self.scanner
                .scan(&self.root, self.exclusions.items(), self.selection.items());
        apply_visibility(&mut tree, self.exclusions.items(), self.show_excluded);
        self.selection.replace(tree.checked_rel_paths());
        self.tree = tree;
        self.stats = stats;
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project directory name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current tree
    pub fn tree(&self) -> &ProjectTree {
        &self.tree
    }

    /// Statistics of the last scan
    pub fn stats(&self) -> ScannerStatistics {
        self.stats
    }

    /// The exclusion store
    pub fn exclusions(&self) -> &ExclusionStore {
        &self.exclusions
    }

    /// Relative paths currently selected, in tree order
    pub fn selection(&self) -> &[String] {
        self.selection.items()
    }

    /// Whether excluded entries are shown
    pub fn show_excluded(&self) -> bool {
        self.show_excluded
    }

    /// Toggle exclusion of `rel_path`, save, and refresh visibility.
    ///
    /// Returns whether the entry is excluded afterwards.
    pub fn toggle_exclusion(&mut self, rel_path: &str) -> Result<bool> {
        let excluded = self.exclusions.toggle(rel_path)?;
        apply_visibility(&mut self.tree, self.exclusions.items(), self.show_excluded);
        Ok(excluded)
    }

    /// Show or hide excluded entries
    pub fn set_show_excluded(&mut self, show: bool) {
        self.show_excluded = show;
        apply_visibility(&mut self.tree, self.exclusions.items(), show);
    }

    /// Check or uncheck one file.
    pub fn set_checked(&mut self, rel_path: &str, checked: bool) -> Result<()> {
        let rel_path = normalize_relative(rel_path);
        let id = self
            .tree
            .find(&rel_path)
            .ok_or_else(|| error!(NotFound, "{} is not in the tree", rel_path))?;
        let node = self.tree.node_mut(id);
        if !node.is_file() {
            bail!(
                InvalidArgument,
                "{} is a directory; only files can be checked",
                rel_path
            );
        }
        node.checked = checked;
        self.sync_selection();
        Ok(())
    }

    /// Check every file in the tree, excluded or not
    pub fn check_all(&mut self) -> usize {
        let root = self.tree.root();
        let changed = self.tree.check_subtree(root, true);
        self.sync_selection();
        changed
    }

    /// Uncheck every file
    pub fn clear_checks(&mut self) -> usize {
        let root = self.tree.root();
        let changed = self.tree.check_subtree(root, false);
        self.sync_selection();
        changed
    }

    /// Checked files as absolute paths, in tree order
    pub fn checked_files(&self) -> Vec<PathBuf> {
        self.tree.checked_files()
    }

    /// Persist the current selection
    pub fn save_selection(&self) -> Result<()> {
        self.selection.save()
    }

    /// Render the canvas of the checked files and save the selection
    pub fn export_canvas(&mut self, writer: &CanvasWriter) -> Result<Canvas> {
        let selected = self.checked_files();
        if selected.is_empty() {
            bail!(InvalidArgument, "no files selected");
        }
        let canvas = writer.export(&self.root, &self.name, &selected);
        self.sync_selection();
        self.selection.save()?;
        info!("Exported canvas of {} files for {}", selected.len(), self.name);
        Ok(canvas)
    }

    /// Stage the checked files and save the selection
    pub fn prepare(&mut self) -> Result<StageSummary> {
        let selected = self.checked_files();
        if selected.is_empty() {
            bail!(InvalidArgument, "no files selected");
        }
        let summary = self.stager.prepare(&self.root, &selected)?;
        self.sync_selection();
        self.selection.save()?;
        Ok(summary)
    }

    /// Write the visible entries to the filter-state cache
    pub fn save_filter_state(&self) -> Result<Vec<String>> {
        let visible = visible_paths(&self.tree);
        FilterStateStore::new(&self.root).save(&visible)?;
        Ok(visible)
    }

    fn sync_selection(&mut self) {
        self.selection.replace(self.tree.checked_rel_paths());
    }
}
