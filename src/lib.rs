/*!
 * projprep - Prepare project trees for backups and LLM canvases
 *
 * This library browses a project directory as a filtered tree, keeps a
 * per-project list of excluded entries and of files selected for export,
 * and produces either a pruned backup copy or a single text canvas.
 */

pub mod backup;
pub mod classifier;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod project;
pub mod report;
pub mod scanner;
pub mod settings;
pub mod stage;
pub mod state;
pub mod types;
pub mod utils;
pub mod visibility;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use backup::{BackupExporter, BackupRules, BackupSummary};
pub use classifier::{EntryClassifier, EntryRules};
pub use config::Config;
pub use error::{ProjPrepError, Result};
pub use project::Project;
pub use report::{CanvasReport, FileReportInfo, ReportFormat, Reporter};
pub use scanner::{Scanner, ScannerStatistics};
pub use settings::AppSettings;
pub use stage::{StageRules, StageSummary, Stager};
pub use types::{NodeId, NodeKind, ProjectTree, TreeNode};
pub use writer::{Canvas, CanvasWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
