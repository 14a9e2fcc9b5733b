/*!
 * Reporting functionality for projprep
 *
 * Renders run summaries with the tabled library for clean, consistent
 * console output.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::backup::BackupSummary;
use crate::stage::StageSummary;
use crate::utils::format_file_size;

/// Information about a file in the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

impl FileReportInfo {
    /// Count lines and characters of `content`
    pub fn from_content(content: &str) -> Self {
        Self {
            lines: content.lines().count(),
            chars: content.chars().count(),
        }
    }

    /// Rough token estimate (four characters per token)
    pub fn estimated_tokens(&self) -> usize {
        self.chars / 4
    }
}

/// Summary of one canvas export
#[derive(Debug, Clone)]
pub struct CanvasReport {
    /// Where the canvas went (file path, stdout, clipboard)
    pub target: String,
    /// Time taken to build the canvas
    pub duration: Duration,
    /// Per-file details, in selection order
    pub file_details: Vec<(String, FileReportInfo)>,
}

impl CanvasReport {
    /// Sum of all file lines
    pub fn total_lines(&self) -> usize {
        self.file_details.iter().map(|(_, f)| f.lines).sum()
    }

    /// Sum of all file characters
    pub fn total_chars(&self) -> usize {
        self.file_details.iter().map(|(_, f)| f.chars).sum()
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Keep the tail of long paths
    fn format_path(&self, path: &str, max_len: usize) -> String {
        let count = path.chars().count();
        if count <= max_len {
            return path.to_string();
        }
        let tail: String = path.chars().skip(count - (max_len - 3)).collect();
        format!("...{}", tail)
    }

    fn styled(&self, mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    /// Report for a canvas export
    pub fn canvas_report(&self, report: &CanvasReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => {
                let files = self.create_files_table(report);
                let summary = self.create_canvas_summary(report);
                format!(
                    "📋  CANVAS FILES\n{}\n\n✅  CANVAS READY\n{}",
                    files, summary
                )
            }
        }
    }

    /// Report for a backup
    pub fn backup_report(&self, summary: &BackupSummary, duration: Duration) -> String {
        match self.format {
            ReportFormat::ConsoleTable => {
                let rows = vec![
                    SummaryRow::new("📂 Destination", summary.destination.display().to_string()),
                    SummaryRow::new("⏱️ Process Time", format!("{:.4?}", duration)),
                    SummaryRow::new("📁 Directories", self.format_number(summary.directories)),
                    SummaryRow::new("📄 Files Copied", self.format_number(summary.files)),
                    SummaryRow::new("📦 Size", format_file_size(summary.bytes)),
                    SummaryRow::new("🧹 Pruned Entries", self.format_number(summary.pruned)),
                ];
                format!("✅  BACKUP COMPLETE\n{}", self.styled(Table::new(rows)))
            }
        }
    }

    /// Report for a staging run
    pub fn stage_report(&self, summary: &StageSummary) -> String {
        match self.format {
            ReportFormat::ConsoleTable => {
                let rows = vec![
                    SummaryRow::new("📂 Staging Folder", summary.destination.display().to_string()),
                    SummaryRow::new("📄 Files Staged", self.format_number(summary.copied.len())),
                    SummaryRow::new("⏭️ Skipped", self.format_number(summary.skipped)),
                ];
                format!("✅  FILES PREPARED\n{}", self.styled(Table::new(rows)))
            }
        }
    }

    /// Print a report to stderr, keeping stdout for document output
    pub fn print(&self, report: &str) {
        eprintln!("\n{}", report);
    }

    fn create_canvas_summary(&self, report: &CanvasReport) -> String {
        let rows = vec![
            SummaryRow::new("📂 Output", report.target.clone()),
            SummaryRow::new("⏱️ Process Time", format!("{:.4?}", report.duration)),
            SummaryRow::new("📄 Files", self.format_number(report.file_details.len())),
            SummaryRow::new("📝 Total Lines", self.format_number(report.total_lines())),
            SummaryRow::new(
                "📦 LLM Tokens",
                format!("{} tokens (estimated)", self.format_number(report.total_chars() / 4)),
            ),
        ];
        self.styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &CanvasReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        let rows: Vec<FileRow> = report
            .file_details
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, 60),
                lines: self.format_number(info.lines),
                tokens: self.format_number(info.estimated_tokens()),
            })
            .collect();

        self.styled(Table::new(rows))
    }
}
