/*!
 * Per-project persisted state
 *
 * Exclusions, the export selection and the cached filter view are each a
 * JSON array of relative paths stored inside the project directory.
 */

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ensure;
use crate::error::Result;
use crate::utils::normalize_relative;

/// File holding the user's excluded entries
pub const EXCLUSION_FILE: &str = "excluded_items.json";
/// File holding the files checked for export
pub const SELECTION_FILE: &str = "qwen_selection.json";
/// File caching the currently visible entries
pub const FILTER_STATE_FILE: &str = "filter_state.json";

/// Every state file kept in a project root
pub const STATE_FILES: [&str; 3] = [EXCLUSION_FILE, SELECTION_FILE, FILTER_STATE_FILE];

/// Read a JSON state file.
///
/// A missing file yields `None`. So does a file that cannot be read or
/// parsed; it is left on disk untouched until the next save.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Ignoring unreadable state file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt state file {}: {}", path.display(), e);
            None
        }
    }
}

/// Write a value as pretty JSON through a temporary sibling file.
///
/// The rename means readers see either the old or the new content.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    debug!("Saved {}", path.display());
    Ok(())
}

/// The set of entries the user has hidden in one project
#[derive(Debug, Clone)]
pub struct ExclusionStore {
    file: PathBuf,
    items: BTreeSet<String>,
}

impl ExclusionStore {
    /// Load the exclusion set of `project_root`; absent or corrupt files give an empty set
    pub fn load(project_root: &Path) -> Self {
        let file = project_root.join(EXCLUSION_FILE);
        let items: BTreeSet<String> = read_json::<Vec<String>>(&file)
            .unwrap_or_default()
            .iter()
            .map(|p| normalize_relative(p))
            .filter(|p| !p.is_empty())
            .collect();
        debug!("Loaded {} excluded entries from {}", items.len(), file.display());
        Self { file, items }
    }

    /// Persist the current set
    pub fn save(&self) -> Result<()> {
        let items: Vec<&String> = self.items.iter().collect();
        write_json(&self.file, &items)
    }

    /// Flip membership of `rel_path` and save immediately.
    ///
    /// Returns whether the path is excluded after the call.
    pub fn toggle(&mut self, rel_path: &str) -> Result<bool> {
        let rel_path = normalize_relative(rel_path);
        ensure!(
            !rel_path.is_empty(),
            InvalidArgument,
            "the project root cannot be excluded"
        );

        let excluded = if self.items.remove(&rel_path) {
            false
        } else {
            self.items.insert(rel_path.clone());
            true
        };
        info!(
            "{} {}",
            if excluded { "Excluded" } else { "Included" },
            rel_path
        );
        self.save()?;
        Ok(excluded)
    }

    /// Whether `rel_path` is excluded
    pub fn contains(&self, rel_path: &str) -> bool {
        self.items.contains(rel_path)
    }

    /// The excluded relative paths, sorted
    pub fn items(&self) -> &BTreeSet<String> {
        &self.items
    }

    /// Location of the backing file
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Load, toggle and save in one step, for callers without an open session
pub fn toggle_exclusion(project_root: &Path, rel_path: &str) -> Result<bool> {
    ExclusionStore::load(project_root).toggle(rel_path)
}

/// The ordered list of files checked for export in one project
#[derive(Debug, Clone)]
pub struct SelectionStore {
    file: PathBuf,
    items: Vec<String>,
}

impl SelectionStore {
    /// Load the saved selection of `project_root`
    pub fn load(project_root: &Path) -> Self {
        let file = project_root.join(SELECTION_FILE);
        let mut items: Vec<String> = Vec::new();
        for path in read_json::<Vec<String>>(&file).unwrap_or_default() {
            let path = normalize_relative(&path);
            if !path.is_empty() && !items.contains(&path) {
                items.push(path);
            }
        }
        debug!("Loaded {} selected entries from {}", items.len(), file.display());
        Self { file, items }
    }

    /// Replace the selection wholesale
    pub fn replace<I>(&mut self, rel_paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.items.clear();
        for path in rel_paths {
            if !self.items.contains(&path) {
                self.items.push(path);
            }
        }
    }

    /// Persist the current selection
    pub fn save(&self) -> Result<()> {
        write_json(&self.file, &self.items)
    }

    /// Selected relative paths, in selection order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Location of the backing file
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Cache of the relative paths visible in the last saved view
#[derive(Debug, Clone)]
pub struct FilterStateStore {
    file: PathBuf,
}

impl FilterStateStore {
    /// Store for `project_root`
    pub fn new(project_root: &Path) -> Self {
        Self {
            file: project_root.join(FILTER_STATE_FILE),
        }
    }

    /// Visible paths from the last save; empty if never saved
    pub fn load(&self) -> BTreeSet<String> {
        read_json::<Vec<String>>(&self.file)
            .unwrap_or_default()
            .into_iter()
            .collect()
    }

    /// Overwrite the cache with `visible`
    pub fn save(&self, visible: &[String]) -> Result<()> {
        write_json(&self.file, visible)
    }
}
