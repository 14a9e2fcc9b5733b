/*!
 * Scenario tests for projprep
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::tempdir;

use crate::backup::BackupExporter;
use crate::classifier::{EntryClassifier, EntryRules};
use crate::config::Config;
use crate::project::Project;
use crate::state::{ExclusionStore, EXCLUSION_FILE, SELECTION_FILE};
use crate::utils::DEFAULT_SKIP_DIRS;
use crate::visibility::{apply_visibility, visible_paths};
use crate::writer::CanvasWriter;

// Helper function to create the sample project used across scenarios
fn setup_test_project() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("demo");

    fs::create_dir_all(root.join("src"))?;
    fs::create_dir_all(root.join(".idea"))?;

    let mut main = File::create(root.join("src").join("main.py"))?;
    writeln!(main, "from util import greet\n\ngreet()")?;

    let mut util = File::create(root.join("src").join("util.py"))?;
    writeln!(util, "def greet():\n    print(\"hi\")")?;

    let mut workspace = File::create(root.join(".idea").join("workspace.xml"))?;
    writeln!(workspace, "<project version=\"4\" />")?;

    // A few bytes of PNG header are enough
    let mut image = File::create(root.join("image.png"))?;
    image.write_all(&[0x89, b'P', b'N', b'G'])?;

    Ok(temp_dir)
}

fn open(root: &Path) -> Project {
    Project::open(root, &Config::default(), Arc::new(ProgressBar::hidden()))
}

#[test]
fn test_classifier_drops_project_noise() {
    let temp_dir = setup_test_project().unwrap();
    let project = open(&temp_dir.path().join("demo"));
    let tree = project.tree();

    let src = tree.find("src").expect("src should be present");
    assert!(tree.node(src).is_dir());
    assert!(tree.is_visible(src));

    let names: Vec<&str> = tree
        .node(src)
        .children
        .iter()
        .map(|id| tree.node(*id).name.as_str())
        .collect();
    assert_eq!(names, vec!["main.py", "util.py"]);

    // Filtered out entirely, not merely hidden
    assert!(tree.find(".idea").is_none());
    assert!(tree.find(".idea/workspace.xml").is_none());
    assert!(tree.find("image.png").is_none());
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_skip_dirs_rejected_whatever_the_kind() {
    let classifier = EntryClassifier::new(&EntryRules::default());
    for name in DEFAULT_SKIP_DIRS.iter() {
        assert!(!classifier.include(name, true), "{} as directory", name);
        assert!(!classifier.include(name, false), "{} as file", name);
    }
    for name in ["app.py", "index.JS", "notes.md", "conf.yml"] {
        assert!(classifier.include(name, false), "{}", name);
    }
}

#[test]
fn test_show_excluded_toggle() {
    let temp_dir = setup_test_project().unwrap();
    let mut project = open(&temp_dir.path().join("demo"));

    assert!(project.toggle_exclusion("src/util.py").unwrap());
    let util = project.tree().find("src/util.py").unwrap();

    project.set_show_excluded(false);
    assert!(project.tree().node(util).hidden);
    assert!(!visible_paths(project.tree()).contains(&"src/util.py".to_string()));

    project.set_show_excluded(true);
    let node = project.tree().node(util);
    assert!(!node.hidden);
    assert!(node.excluded);
    assert!(visible_paths(project.tree()).contains(&"src/util.py".to_string()));
}

#[test]
fn test_visibility_is_pure() {
    let temp_dir = setup_test_project().unwrap();
    let root = temp_dir.path().join("demo");
    let mut project = open(&root);
    project.set_checked("src/main.py", true).unwrap();
    project.toggle_exclusion("src").unwrap();

    let mut tree = project.tree().clone();
    let exclusions = ExclusionStore::load(&root).items().clone();
    let checked_before = tree.checked_rel_paths();

    apply_visibility(&mut tree, &exclusions, false);
    let first: Vec<bool> = tree.iter().map(|(_, n)| n.hidden).collect();
    apply_visibility(&mut tree, &exclusions, false);
    let second: Vec<bool> = tree.iter().map(|(_, n)| n.hidden).collect();

    assert_eq!(first, second);
    assert_eq!(tree.checked_rel_paths(), checked_before);
}

#[test]
fn test_selection_survives_rebuild() {
    let temp_dir = setup_test_project().unwrap();
    let root = temp_dir.path().join("demo");

    let mut project = open(&root);
    project.set_checked("src/main.py", true).unwrap();
    project.set_checked("src/util.py", true).unwrap();
    project.save_selection().unwrap();
    drop(project);

    let project = open(&root);
    let mut checked = project.tree().checked_rel_paths();
    checked.sort();
    assert_eq!(checked, vec!["src/main.py", "src/util.py"]);
    assert!(root.join(SELECTION_FILE).exists());
}

#[test]
fn test_selection_drops_deleted_files() {
    let temp_dir = setup_test_project().unwrap();
    let root = temp_dir.path().join("demo");

    let mut project = open(&root);
    project.check_all();
    project.save_selection().unwrap();
    fs::remove_file(root.join("src").join("util.py")).unwrap();

    let project = open(&root);
    assert_eq!(project.selection(), &["src/main.py".to_string()]);
}

#[test]
fn test_canvas_is_deterministic() {
    let temp_dir = setup_test_project().unwrap();
    let mut project = open(&temp_dir.path().join("demo"));
    project.check_all();

    let writer = CanvasWriter::new();
    let first = project.export_canvas(&writer).unwrap();
    let second = project.export_canvas(&writer).unwrap();
    assert_eq!(first.text, second.text);

    assert!(first.text.starts_with("PROJECT: demo\n"));
    assert!(first.text.contains("# FILE: src/main.py"));
    assert!(first.text.contains("```python\nfrom util import greet"));
    assert_eq!(first.files.len(), 2);
}

#[test]
fn test_canvas_marks_unreadable_files() {
    let temp_dir = setup_test_project().unwrap();
    let root = temp_dir.path().join("demo");
    let mut project = open(&root);
    project.check_all();
    fs::remove_file(root.join("src").join("util.py")).unwrap();

    let canvas = project.export_canvas(&CanvasWriter::new()).unwrap();
    assert!(canvas.text.contains("# ERROR READING FILE:"));
    assert!(canvas.text.contains("from util import greet"));
}

#[test]
fn test_backup_prunes_junk() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("proj");
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
    fs::write(root.join("photo.png"), [0u8, 1, 2]).unwrap();
    fs::write(root.join("app.py"), "print('ok')\n").unwrap();

    let dest = temp_dir.path().join("proj_backup");
    let summary = BackupExporter::default().backup(&root, &dest).unwrap();

    assert_eq!(summary.files, 1);
    assert!(dest.join("app.py").exists());
    assert!(!dest.join(".git").exists());
    assert!(!dest.join("photo.png").exists());
}

#[test]
fn test_toggle_twice_is_identity() {
    let temp_dir = setup_test_project().unwrap();
    let root = temp_dir.path().join("demo");
    let mut project = open(&root);
    project.toggle_exclusion("src/main.py").unwrap();
    let before = project.exclusions().items().clone();

    project.toggle_exclusion("src/util.py").unwrap();
    project.toggle_exclusion("src/util.py").unwrap();

    assert_eq!(project.exclusions().items(), &before);
    assert_eq!(ExclusionStore::load(&root).items(), &before);
}

#[test]
fn test_corrupt_state_is_tolerated() {
    let temp_dir = setup_test_project().unwrap();
    let root = temp_dir.path().join("demo");
    fs::write(root.join(EXCLUSION_FILE), "not json at all").unwrap();
    fs::write(root.join(SELECTION_FILE), "{\"a\": 1}").unwrap();

    let mut project = open(&root);
    assert!(project.exclusions().items().is_empty());
    assert!(project.selection().is_empty());
    assert_eq!(
        fs::read_to_string(root.join(EXCLUSION_FILE)).unwrap(),
        "not json at all"
    );

    // The next legitimate save replaces the corrupt file
    project.toggle_exclusion("src").unwrap();
    let saved: Vec<String> =
        serde_json::from_str(&fs::read_to_string(root.join(EXCLUSION_FILE)).unwrap()).unwrap();
    assert_eq!(saved, vec!["src"]);
}

#[test]
fn test_missing_root_gives_empty_tree() {
    let temp_dir = tempdir().unwrap();
    let project = open(&temp_dir.path().join("gone"));
    assert!(project.tree().is_empty());
    assert!(visible_paths(project.tree()).is_empty());
}
