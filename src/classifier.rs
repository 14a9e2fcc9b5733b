/*!
 * Entry classification for the project tree
 *
 * Decides, from the name alone, whether a filesystem entry belongs in the
 * browsable tree. User exclusions are applied later and never affect this.
 */

use crate::utils::{
    DEFAULT_IMAGE_EXTENSIONS, DEFAULT_MEDIA_DIRS, DEFAULT_SKIP_DIRS, DEFAULT_SOURCE_EXTENSIONS,
};

/// Static rule set consulted by [`EntryClassifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRules {
    /// Tooling and dependency directory names (matched case-insensitively)
    pub skip_dirs: Vec<String>,
    /// Image folder names
    pub media_dirs: Vec<String>,
    /// Image file suffixes, including the dot
    pub image_extensions: Vec<String>,
    /// Suffixes of files shown in the tree, including the dot
    pub source_extensions: Vec<String>,
}

impl Default for EntryRules {
    fn default() -> Self {
        Self {
            skip_dirs: owned(&DEFAULT_SKIP_DIRS),
            media_dirs: owned(&DEFAULT_MEDIA_DIRS),
            image_extensions: owned(&DEFAULT_IMAGE_EXTENSIONS),
            source_extensions: owned(&DEFAULT_SOURCE_EXTENSIONS),
        }
    }
}

impl EntryRules {
    /// Add source suffixes, accepting them with or without the leading dot
    pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = ext.as_ref().trim();
            if ext.is_empty() {
                continue;
            }
            let ext = if ext.starts_with('.') {
                ext.to_lowercase()
            } else {
                format!(".{}", ext.to_lowercase())
            };
            if !self.source_extensions.contains(&ext) {
                self.source_extensions.push(ext);
            }
        }
        self
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn lower(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

/// Name-based filter for tree entries
#[derive(Debug, Clone)]
pub struct EntryClassifier {
    skip_dirs: Vec<String>,
    media_dirs: Vec<String>,
    image_extensions: Vec<String>,
    source_extensions: Vec<String>,
}

impl EntryClassifier {
    /// Create a classifier; rule entries are lower-cased once up front
    pub fn new(rules: &EntryRules) -> Self {
        Self {
            skip_dirs: lower(&rules.skip_dirs),
            media_dirs: lower(&rules.media_dirs),
            image_extensions: lower(&rules.image_extensions),
            source_extensions: lower(&rules.source_extensions),
        }
    }

    /// Whether an entry with this name belongs in the tree. First match wins.
    pub fn include(&self, name: &str, is_dir: bool) -> bool {
        let name = name.to_lowercase();

        // Skip-set names are rejected even when the entry is not a directory
        if self.skip_dirs.iter().any(|d| *d == name) {
            return false;
        }

        if is_dir && self.media_dirs.iter().any(|d| *d == name) {
            return false;
        }

        if !is_dir && self.image_extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            return false;
        }

        if !is_dir && self.source_extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            return true;
        }

        is_dir
    }
}

impl Default for EntryClassifier {
    fn default() -> Self {
        Self::new(&EntryRules::default())
    }
}
