/*!
 * Filtered project backups
 *
 * A backup mirrors the project minus a fixed set of junk patterns. User
 * exclusions and selections are deliberately not consulted.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use glob_match::glob_match;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{bail, ensure};
use crate::error::{ProjPrepError, Result};
use crate::utils::DEFAULT_BACKUP_IGNORE;

/// Patterns pruned from every backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRules {
    /// Glob patterns matched against each entry's file name
    pub ignore_patterns: Vec<String>,
}

impl Default for BackupRules {
    fn default() -> Self {
        Self {
            ignore_patterns: DEFAULT_BACKUP_IGNORE.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl BackupRules {
    /// Add extra ignore patterns
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            let pattern = pattern.into();
            if !pattern.is_empty() && !self.ignore_patterns.contains(&pattern) {
                self.ignore_patterns.push(pattern);
            }
        }
        self
    }
}

/// Result of a completed backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    /// Where the copy was written
    pub destination: PathBuf,
    /// Directories created
    pub directories: usize,
    /// Files copied
    pub files: usize,
    /// Bytes copied
    pub bytes: u64,
    /// Entries pruned by the ignore patterns
    pub pruned: usize,
}

/// Default backup location: `<name>_backup` next to the project
pub fn default_backup_destination(project: &Path) -> PathBuf {
    let name = project
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let parent = project.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}_backup", name))
}

/// Copies a project while pruning junk entries
#[derive(Debug, Clone, Default)]
pub struct BackupExporter {
    rules: BackupRules,
}

impl BackupExporter {
    /// Create an exporter for the given rules
    pub fn new(rules: BackupRules) -> Self {
        Self { rules }
    }

    /// Whether an entry name matches one of the ignore patterns
    pub fn is_ignored(&self, name: &str) -> bool {
        self.rules
            .ignore_patterns
            .iter()
            .any(|pattern| pattern == name || glob_match(pattern, name))
    }

    /// Replace `destination` with a filtered copy of `project`.
    ///
    /// An existing destination is removed first. The first failure aborts the
    /// copy; whatever was already written stays in place.
    pub fn backup(&self, project: &Path, destination: &Path) -> Result<BackupSummary> {
        ensure!(
            project.is_dir(),
            NotFound,
            "Project directory not found: {}",
            project.display()
        );

        // Replacing the project or one of its parents would destroy the source
        if let (Ok(project_abs), Ok(existing_abs)) =
            (fs::canonicalize(project), fs::canonicalize(destination))
        {
            if project_abs.starts_with(&existing_abs) {
                bail!(
                    InvalidArgument,
                    "backup destination {} contains the project {}",
                    destination.display(),
                    project.display()
                );
            }
        }

        if destination.exists() {
            info!("Replacing existing backup at {}", destination.display());
            remove_existing(destination).map_err(|e| ProjPrepError::backup(destination, e))?;
        }

        fs::create_dir_all(destination).map_err(|e| ProjPrepError::backup(destination, e))?;

        // A destination nested in the project must not be copied into itself
        let destination_abs =
            fs::canonicalize(destination).unwrap_or_else(|_| destination.to_path_buf());

        let mut summary = BackupSummary {
            destination: destination.to_path_buf(),
            directories: 0,
            files: 0,
            bytes: 0,
            pruned: 0,
        };

        let mut pruned = 0;
        let walker = WalkDir::new(project)
            .min_depth(1)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                if self.is_ignored(&name) {
                    debug!("Pruned {}", entry.path().display());
                    pruned += 1;
                    return false;
                }
                let is_destination = entry.file_type().is_dir()
                    && fs::canonicalize(entry.path())
                        .map(|p| p == destination_abs)
                        .unwrap_or(false);
                !is_destination
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| project.to_path_buf());
                let source = e.into_io_error().unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::Other, "filesystem loop detected")
                });
                ProjPrepError::backup(path, source)
            })?;

            let rel = entry.path().strip_prefix(project).map_err(|e| {
                ProjPrepError::backup(entry.path(), io::Error::new(io::ErrorKind::Other, e))
            })?;
            let target = destination.join(rel);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| ProjPrepError::backup(entry.path(), e))?;
                summary.directories += 1;
            } else {
                summary.bytes += copy_file(entry.path(), &target)
                    .map_err(|e| ProjPrepError::backup(entry.path(), e))?;
                summary.files += 1;
            }
        }

        summary.pruned = pruned;
        info!(
            "Backed up {} to {} ({} files, {} pruned)",
            project.display(),
            destination.display(),
            summary.files,
            summary.pruned
        );
        Ok(summary)
    }
}

fn remove_existing(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Copy contents and permissions, then carry over the timestamps
pub(crate) fn copy_file(source: &Path, target: &Path) -> io::Result<u64> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = fs::copy(source, target)?;
    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        target,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;
    Ok(bytes)
}
