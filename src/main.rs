/*!
 * Command-line interface for projprep
 */

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use projprep::backup::{default_backup_destination, BackupExporter};
use projprep::clipboard::copy_to_clipboard;
use projprep::config::{Args, Commands, Config};
use projprep::error::Result;
use projprep::project::Project;
use projprep::report::{CanvasReport, ReportFormat, Reporter};
use projprep::settings::{discover_projects, AppSettings};
use projprep::utils::normalize_relative;
use projprep::visibility::render_visible;
use projprep::writer::CanvasWriter;
use projprep::{bail, ensure, error};

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(args) {
        eprintln!("projprep: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args);
    config.validate()?;

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!("Failed to set thread pool size: {}", e);
    }

    let mut settings = AppSettings::load(&config.settings_path);
    let reporter = Reporter::new(ReportFormat::ConsoleTable);

    let project_root = match args.command {
        Commands::Tree {
            project,
            show_excluded,
            save_filter,
        } => {
            let root = resolve_project(project, &settings)?;
            let mut project = open_project(&root, &config);
            project.set_show_excluded(show_excluded);
            print!("{}", render_visible(project.tree()));
            if save_filter {
                let visible = project.save_filter_state()?;
                debug!("Saved {} visible entries", visible.len());
            }
            Some(root)
        }

        Commands::Exclude { project, paths } => {
            let root = resolve_project(Some(project), &settings)?;
            let mut project = open_project(&root, &config);
            for path in &paths {
                let excluded = project.toggle_exclusion(path)?;
                let state = if excluded { "excluded" } else { "included" };
                println!("{} {}", state, normalize_relative(path));
            }
            Some(root)
        }

        Commands::Select {
            project,
            paths,
            all,
            clear,
        } => {
            let root = resolve_project(project, &settings)?;
            let mut project = open_project(&root, &config);
            if clear {
                project.clear_checks();
            }
            if all {
                project.check_all();
            }
            for path in &paths {
                project.set_checked(path, true)?;
            }
            project.save_selection()?;
            for path in project.selection() {
                println!("{}", path);
            }
            Some(root)
        }

        Commands::Canvas {
            project,
            output,
            clip,
        } => {
            let root = resolve_project(project, &settings)?;
            let mut project = open_project(&root, &config);

            let start_time = Instant::now();
            let canvas = project.export_canvas(&CanvasWriter::new())?;

            let mut targets = Vec::new();
            if let Some(path) = &output {
                canvas.write_to(path)?;
                targets.push(path.display().to_string());
            }
            if clip {
                copy_to_clipboard(&canvas.text)?;
                targets.push("clipboard".to_string());
            }
            if targets.is_empty() {
                print!("{}", canvas.text);
                targets.push("stdout".to_string());
            }

            let report = CanvasReport {
                target: targets.join(", "),
                duration: start_time.elapsed(),
                file_details: canvas.files,
            };
            reporter.print(&reporter.canvas_report(&report));
            Some(root)
        }

        Commands::Prepare { project } => {
            let root = resolve_project(project, &settings)?;
            let mut project = open_project(&root, &config);
            let summary = project.prepare()?;
            reporter.print(&reporter.stage_report(&summary));
            Some(root)
        }

        Commands::Backup {
            project,
            dest,
            force,
        } => {
            let root = resolve_project(project, &settings)?;
            let destination = dest.unwrap_or_else(|| default_backup_destination(&root));
            ensure!(
                force || !destination.exists(),
                InvalidArgument,
                "{} already exists; pass --force to replace it",
                destination.display()
            );

            let start_time = Instant::now();
            let summary = BackupExporter::new(config.backup_rules.clone())
                .backup(&root, &destination)?;
            reporter.print(&reporter.backup_report(&summary, start_time.elapsed()));
            Some(root)
        }

        Commands::Projects { dir, marker } => {
            let dir = match dir.or_else(|| settings.last_used_dir.clone()) {
                Some(dir) => dir,
                None => bail!(InvalidArgument, "no directory given and none used before"),
            };
            ensure!(
                dir.is_dir(),
                NotFound,
                "directory not found: {}",
                dir.display()
            );
            for name in discover_projects(&dir, &marker) {
                println!("{}", name);
            }
            settings.remember_dir(&dir.canonicalize()?);
            None
        }

        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Args::command(), "projprep", &mut io::stdout());
            return Ok(());
        }
    };

    if let Some(root) = project_root {
        settings.remember_project(&root);
    }
    if let Err(e) = settings.save(&config.settings_path) {
        warn!("Failed to save settings: {}", e);
    }

    Ok(())
}

/// The given project, or the last opened one
fn resolve_project(project: Option<PathBuf>, settings: &AppSettings) -> Result<PathBuf> {
    let path = project
        .or_else(|| settings.last_project_path())
        .ok_or_else(|| error!(InvalidArgument, "no project given and none opened before"))?;
    ensure!(
        path.is_dir(),
        NotFound,
        "project directory not found: {}",
        path.display()
    );
    Ok(path.canonicalize()?)
}

fn open_project(root: &Path, config: &Config) -> Project {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos} files")
    {
        progress.set_style(style);
    }
    progress.set_prefix("📂 Scanning");
    progress.enable_steady_tick(Duration::from_millis(100));

    let progress = Arc::new(progress);
    let project = Project::open(root, config, Arc::clone(&progress));
    progress.finish_and_clear();

    let stats = project.stats();
    debug!(
        "Scanned {}: {} directories, {} files, {} unreadable",
        project.name(),
        stats.directories,
        stats.files,
        stats.unreadable
    );
    project
}
