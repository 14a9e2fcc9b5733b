/*!
 * Utility functions for projprep
 */

use std::path::{Component, Path};

use once_cell::sync::Lazy;

/// Separator used in every stored relative path, independent of the host
pub const REL_SEPARATOR: char = '/';

/// Express `path` relative to `root` using `/` separators.
///
/// Returns `None` when `path` is not under `root`. The root itself maps to
/// the empty string.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(join_components(rel))
}

/// Like [`relative_path`], but falls back to the full path when `path` lies
/// outside `root`.
pub fn relative_or_full(root: &Path, path: &Path) -> String {
    relative_path(root, path).unwrap_or_else(|| join_components(path))
}

/// Turn a user-supplied relative path (either separator, optional `./`)
/// into canonical form.
pub fn normalize_relative(input: &str) -> String {
    let unified = input.replace('\\', "/");
    join_components(Path::new(&unified))
}

/// Split a canonical relative path into its segments
pub fn split_relative(rel: &str) -> impl Iterator<Item = &str> {
    rel.split(REL_SEPARATOR).filter(|s| !s.is_empty())
}

fn join_components(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::RootDir => Some(String::new()),
            Component::Prefix(prefix) => {
                Some(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::CurDir | Component::ParentDir => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Directories never shown in the project tree
pub static DEFAULT_SKIP_DIRS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // IDE
        ".idea",
        // Python
        "__pycache__",
        ".venv",
        "venv",
        "env",
        // Version Control
        ".git",
        // Dependencies
        "node_modules",
    ]
});

/// Image folders, hidden from the project tree
pub static DEFAULT_MEDIA_DIRS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["images", "img", "pics", "photos", "screenshots"]);

/// Image file suffixes
pub static DEFAULT_IMAGE_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".webp",
    ]
});

/// Source and text suffixes that make a file eligible for the tree
pub static DEFAULT_SOURCE_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".py", ".js", ".ts", ".html", ".css", ".json", ".txt", ".md", ".yaml", ".yml",
    ]
});

/// Junk patterns pruned from every backup
pub static DEFAULT_BACKUP_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Directories
        ".idea",
        "__pycache__",
        ".git",
        ".venv",
        "venv",
        "env",
        "node_modules",
        // Images
        "*.jpg",
        "*.jpeg",
        "*.png",
        "*.gif",
        "*.bmp",
        "*.svg",
        "*.ico",
        "*.webp",
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = PathBuf::from("/work/proj");
        let file = root.join("src").join("main.py");
        assert_eq!(relative_path(&root, &file).as_deref(), Some("src/main.py"));
        assert_eq!(relative_path(&root, &root).as_deref(), Some(""));
        assert_eq!(relative_path(&root, Path::new("/elsewhere/x.py")), None);
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("./src/util.py"), "src/util.py");
        assert_eq!(normalize_relative("src\\util.py"), "src/util.py");
        assert_eq!(normalize_relative("src//util.py/"), "src/util.py");
    }

    #[test]
    fn test_split_relative() {
        let parts: Vec<_> = split_relative("a/b/c.py").collect();
        assert_eq!(parts, vec!["a", "b", "c.py"]);
        assert_eq!(split_relative("").count(), 0);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(12), "12 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }
}
