/*!
 * Canvas writer for projprep
 *
 * Serializes a selection of project files into one text document: a header,
 * a nested outline of the selected paths, then every file in a fenced block.
 */

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::report::FileReportInfo;
use crate::utils::{relative_or_full, split_relative};

/// Width of the `=` rule around each file header
const RULE_WIDTH: usize = 50;

/// Nested mapping of path segments; shared prefixes collapse into one entry
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outline {
    children: BTreeMap<String, Outline>,
}

impl Outline {
    /// Build an outline from relative paths
    pub fn from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut outline = Self::default();
        for path in paths {
            outline.insert(path);
        }
        outline
    }

    /// Insert one relative path
    pub fn insert(&mut self, rel_path: &str) {
        let mut node = self;
        for segment in split_relative(rel_path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
    }

    /// Render depth-first, keys sorted, two spaces of indent per level
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_level(0, &mut lines);
        lines.join("\n")
    }

    fn render_level(&self, depth: usize, lines: &mut Vec<String>) {
        for (key, child) in &self.children {
            lines.push(format!("{}- {}", "  ".repeat(depth), key));
            child.render_level(depth + 1, lines);
        }
    }
}

/// A rendered canvas with per-file statistics
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Full document text
    pub text: String,
    /// Relative path and counts for each file, in selection order
    pub files: Vec<(String, FileReportInfo)>,
}

impl Canvas {
    /// Write the text to `path`
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(self.text.as_bytes())?;
        Ok(())
    }
}

/// Builds canvases from selected files
#[derive(Debug, Clone, Default)]
pub struct CanvasWriter;

impl CanvasWriter {
    /// Create a new canvas writer
    pub fn new() -> Self {
        Self
    }

    /// Serialize `selected` (absolute paths, in selection order).
    ///
    /// Unreadable files get an inline error marker instead of content, so
    /// the export itself never fails.
    pub fn export(&self, project_root: &Path, project_name: &str, selected: &[PathBuf]) -> Canvas {
        let rel_paths: Vec<String> = selected
            .iter()
            .map(|p| relative_or_full(project_root, p))
            .collect();

        let outline = Outline::from_paths(rel_paths.iter().map(String::as_str));

        // Reads may run in parallel; collect keeps selection order
        let contents: Vec<String> = selected.par_iter().map(|p| read_lossy(p)).collect();

        let mut parts: Vec<String> = Vec::with_capacity(selected.len() + 4);
        parts.push(format!("PROJECT: {}\n", project_name));
        parts.push("STRUCTURE:".to_string());
        parts.push(outline.render());
        parts.push("\n".to_string());

        let mut files = Vec::with_capacity(selected.len());
        for (rel, content) in rel_paths.into_iter().zip(contents) {
            parts.push(self.file_block(&rel, &content));
            files.push((rel, FileReportInfo::from_content(&content)));
        }

        debug!("Rendered canvas for {} with {} files", project_name, files.len());
        Canvas {
            text: parts.join("\n"),
            files,
        }
    }

    /// Header rule, path line, and fenced content for one file
    fn file_block(&self, rel_path: &str, content: &str) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        format!(
            "\n{rule}\n# FILE: {rel_path}\n{rule}\n```{lang}\n{content}\n```\n",
            lang = fence_language(rel_path)
        )
    }
}

/// Read a file as text, replacing invalid UTF-8
fn read_lossy(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            format!("# ERROR READING FILE: {}", e)
        }
    }
}

/// Code fence info string for a file name
pub fn fence_language(path: &str) -> &'static str {
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "rs" => "rust",
        "sh" => "bash",
        _ => "",
    }
}
