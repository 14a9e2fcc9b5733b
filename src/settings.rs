/*!
 * Global application settings and project discovery
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::state::{read_json, write_json};

/// Maximum number of remembered project directories
pub const MAX_RECENT_DIRS: usize = 10;

/// Entry whose presence marks a subdirectory as a project
pub const DEFAULT_PROJECT_MARKER: &str = ".idea";

/// Settings shared by every project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Recently used projects directories, most recent last
    #[serde(default)]
    pub recent_dirs: Vec<PathBuf>,
    /// Projects directory used last
    #[serde(default)]
    pub last_used_dir: Option<PathBuf>,
    /// Project (name under `last_used_dir`) opened last
    #[serde(default)]
    pub last_opened_project: Option<String>,
}

impl AppSettings {
    /// Default settings file under the user's config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("projprep")
            .join("settings.json")
    }

    /// Load settings; a missing or corrupt file gives the defaults
    pub fn load(path: &Path) -> Self {
        let settings: Self = read_json(path).unwrap_or_default();
        debug!("Loaded settings from {}", path.display());
        settings
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Make `dir` the current projects directory and move it to the end of
    /// the recent list, keeping at most [`MAX_RECENT_DIRS`].
    pub fn remember_dir(&mut self, dir: &Path) {
        self.recent_dirs.retain(|d| d != dir);
        self.recent_dirs.push(dir.to_path_buf());
        if self.recent_dirs.len() > MAX_RECENT_DIRS {
            let excess = self.recent_dirs.len() - MAX_RECENT_DIRS;
            self.recent_dirs.drain(..excess);
        }
        self.last_used_dir = Some(dir.to_path_buf());
    }

    /// Record `project` as the last opened project
    pub fn remember_project(&mut self, project: &Path) {
        if let Some(parent) = project.parent() {
            self.remember_dir(parent);
        }
        self.last_opened_project = project
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
    }

    /// Full path of the last opened project, if both halves are known
    pub fn last_project_path(&self) -> Option<PathBuf> {
        let dir = self.last_used_dir.as_ref()?;
        let name = self.last_opened_project.as_ref().filter(|n| !n.is_empty())?;
        Some(dir.join(name))
    }
}

/// Names of subdirectories of `dir` that contain `marker`, sorted.
///
/// An unreadable or missing directory has no projects.
pub fn discover_projects(dir: &Path, marker: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut projects: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir() && entry.path().join(marker).exists())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    projects.sort();
    projects
}
