/*!
 * Configuration handling for projprep
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::backup::BackupRules;
use crate::classifier::EntryRules;
use crate::ensure;
use crate::error::Result;
use crate::settings::{AppSettings, DEFAULT_PROJECT_MARKER};
use crate::stage::StageRules;

/// Command-line arguments for projprep
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "projprep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Browse a project tree, keep exclusions and selections, export backups and LLM canvases",
    long_about = "Keeps a per-project list of excluded entries and of files selected for export, and produces either a filtered backup copy of the project or a single text canvas (outline plus file contents) ready to paste into an LLM chat."
)]
pub struct Args {
    /// Settings file (defaults to the user config directory)
    #[clap(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Number of threads to use for reading files
    #[clap(long, default_value = "4", global = true)]
    pub threads: usize,

    /// Comma-separated extra patterns pruned from backups
    #[clap(long, value_delimiter = ',', global = true)]
    pub ignore_patterns: Vec<String>,

    /// Comma-separated extra file extensions shown in the tree
    #[clap(long, value_delimiter = ',', global = true)]
    pub source_extensions: Vec<String>,

    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Operation to run
    #[clap(subcommand)]
    pub command: Commands,
}

/// Operations exposed by the CLI
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the project tree
    Tree {
        /// Project directory (defaults to the last opened project)
        project: Option<PathBuf>,

        /// Also show excluded entries
        #[clap(long)]
        show_excluded: bool,

        /// Save the visible entries to filter_state.json
        #[clap(long)]
        save_filter: bool,
    },

    /// Toggle exclusion of entries (paths relative to the project)
    Exclude {
        /// Project directory
        project: PathBuf,

        /// Entries to toggle
        #[clap(required = true)]
        paths: Vec<String>,
    },

    /// Check files for export and save the selection
    Select {
        /// Project directory (defaults to the last opened project)
        #[clap(long, short)]
        project: Option<PathBuf>,

        /// Files to check (paths relative to the project)
        paths: Vec<String>,

        /// Check every file in the tree
        #[clap(long, conflicts_with = "clear")]
        all: bool,

        /// Uncheck everything first
        #[clap(long)]
        clear: bool,
    },

    /// Build the canvas from the saved selection
    Canvas {
        /// Project directory (defaults to the last opened project)
        project: Option<PathBuf>,

        /// Write the canvas to a file instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Copy the canvas to the system clipboard
        #[clap(long)]
        clip: bool,
    },

    /// Copy selected source files into the staging folder as .txt
    Prepare {
        /// Project directory (defaults to the last opened project)
        project: Option<PathBuf>,
    },

    /// Copy the project without junk files
    Backup {
        /// Project directory (defaults to the last opened project)
        project: Option<PathBuf>,

        /// Destination (defaults to <project>_backup next to the project)
        #[clap(long)]
        dest: Option<PathBuf>,

        /// Replace the destination if it exists
        #[clap(long)]
        force: bool,
    },

    /// List projects in a directory
    Projects {
        /// Directory to search (defaults to the last used directory)
        dir: Option<PathBuf>,

        /// Entry that marks a project
        #[clap(long, default_value = DEFAULT_PROJECT_MARKER)]
        marker: String,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[clap(value_enum)]
        shell: Shell,
    },
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Tree classification rules
    pub entry_rules: EntryRules,

    /// Backup pruning rules
    pub backup_rules: BackupRules,

    /// Staging rules
    pub stage_rules: StageRules,

    /// Number of threads to use for reading files
    pub num_threads: usize,

    /// Settings file location
    pub settings_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_rules: EntryRules::default(),
            backup_rules: BackupRules::default(),
            stage_rules: StageRules::default(),
            num_threads: 4,
            settings_path: AppSettings::default_path(),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Self {
        Self {
            entry_rules: EntryRules::default()
                .with_source_extensions(args.source_extensions.iter()),
            backup_rules: BackupRules::default()
                .with_patterns(args.ignore_patterns.iter().map(|p| p.trim().to_string())),
            stage_rules: StageRules::default(),
            num_threads: args.threads,
            settings_path: args
                .settings
                .clone()
                .unwrap_or_else(AppSettings::default_path),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_threads > 0,
            Config,
            "thread count must be at least 1"
        );
        ensure!(
            !self.stage_rules.staging_dir.trim().is_empty(),
            Config,
            "staging folder name must not be empty"
        );
        ensure!(
            self.backup_rules.ignore_patterns.iter().all(|p| !p.is_empty()),
            Config,
            "backup ignore patterns must not be empty"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_merges_extra_rules() {
        let args = Args::parse_from([
            "projprep",
            "--ignore-patterns",
            "*.log, dist",
            "--source-extensions",
            "rs,toml",
            "--settings",
            "/tmp/s.json",
            "tree",
        ]);
        let config = Config::from_args(&args);

        assert!(config.backup_rules.ignore_patterns.contains(&"*.log".to_string()));
        assert!(config.backup_rules.ignore_patterns.contains(&"dist".to_string()));
        assert!(config.entry_rules.source_extensions.contains(&".rs".to_string()));
        assert_eq!(config.settings_path, PathBuf::from("/tmp/s.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = Config {
            num_threads: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_flags_conflict() {
        let parsed = Args::try_parse_from(["projprep", "select", "--all", "--clear"]);
        assert!(parsed.is_err());
    }
}
