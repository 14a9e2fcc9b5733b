/*!
 * Staging of selected files for upload-style assistants
 *
 * Selected source files are copied flat into a folder inside the project,
 * each renamed to `.txt`.
 */

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::backup::copy_file;
use crate::error::{Result, ResultExt};

/// Default staging folder name inside the project
pub const DEFAULT_STAGING_DIR: &str = "forQwen";

/// Which files get staged and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRules {
    /// Folder created inside the project root
    pub staging_dir: String,
    /// Suffixes (with dot) of files that are staged
    pub extensions: Vec<String>,
}

impl Default for StageRules {
    fn default() -> Self {
        Self {
            staging_dir: DEFAULT_STAGING_DIR.to_string(),
            extensions: vec![".py".to_string()],
        }
    }
}

/// Outcome of a staging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    /// Staging folder
    pub destination: PathBuf,
    /// Files written, as staged paths
    pub copied: Vec<PathBuf>,
    /// Selected files whose extension is not staged
    pub skipped: usize,
}

/// Copies selected files into the staging folder
#[derive(Debug, Clone, Default)]
pub struct Stager {
    rules: StageRules,
}

impl Stager {
    /// Create a stager for the given rules
    pub fn new(rules: StageRules) -> Self {
        Self { rules }
    }

    /// Staging folder for `project_root`
    pub fn destination(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.rules.staging_dir)
    }

    /// Copy each matching file of `selected` to `<staging>/<stem>.txt`.
    ///
    /// Files sharing a stem overwrite each other; the last one in selection
    /// order wins.
    pub fn prepare(&self, project_root: &Path, selected: &[PathBuf]) -> Result<StageSummary> {
        let destination = self.destination(project_root);
        fs::create_dir_all(&destination)
            .with_context(|| format!("Failed to create {}", destination.display()))?;

        let mut copied = Vec::new();
        let mut skipped = 0;
        for source in selected {
            let Some(staged_name) = self.staged_name(source) else {
                debug!("Not staging {}", source.display());
                skipped += 1;
                continue;
            };
            let target = destination.join(staged_name);
            copy_file(source, &target).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), target.display())
            })?;
            copied.push(target);
        }

        info!(
            "Staged {} files into {} ({} skipped)",
            copied.len(),
            destination.display(),
            skipped
        );
        Ok(StageSummary {
            destination,
            copied,
            skipped,
        })
    }

    /// `<stem>.txt` when the file has a staged extension
    fn staged_name(&self, source: &Path) -> Option<String> {
        let name = source.file_name()?.to_string_lossy().to_string();
        let lower = name.to_lowercase();
        let ext = self
            .rules
            .extensions
            .iter()
            .find(|ext| lower.ends_with(&ext.to_lowercase()))?;
        let stem = name.get(..name.len().checked_sub(ext.len())?)?;
        Some(format!("{}.txt", stem))
    }
}
