use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn setup_test_project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("demo");

    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join(".idea")).unwrap();
    fs::write(root.join("src/main.py"), "print('main')\n").unwrap();
    fs::write(root.join("src/util.py"), "def helper():\n    return 1\n").unwrap();
    fs::write(root.join(".idea/workspace.xml"), "<project />").unwrap();
    fs::write(root.join("image.png"), [0x89u8, b'P', b'N', b'G']).unwrap();

    (dir, root)
}

fn projprep(settings: &Path) -> Command {
    let mut cmd = Command::cargo_bin("projprep").unwrap();
    cmd.arg("--settings").arg(settings);
    cmd
}

#[test]
fn test_tree_hides_classified_entries() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");

    projprep(&settings)
        .arg("tree")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("demo/\n"))
        .stdout(predicate::str::contains("  src/\n"))
        .stdout(predicate::str::contains("[ ] main.py"))
        .stdout(predicate::str::contains(".idea").not())
        .stdout(predicate::str::contains("image.png").not());
}

#[test]
fn test_exclude_and_show_excluded() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");

    projprep(&settings)
        .arg("exclude")
        .arg(&root)
        .arg("src/util.py")
        .assert()
        .success()
        .stdout("excluded src/util.py\n");

    projprep(&settings)
        .arg("tree")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("util.py").not());

    projprep(&settings)
        .args(["tree", "--show-excluded"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("util.py  (excluded)"));

    // Toggling again includes it
    projprep(&settings)
        .arg("exclude")
        .arg(&root)
        .arg("src/util.py")
        .assert()
        .success()
        .stdout("included src/util.py\n");
}

#[test]
fn test_select_then_canvas_to_file() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");
    let output = dir.path().join("canvas.txt");

    projprep(&settings)
        .arg("select")
        .arg("--project")
        .arg(&root)
        .arg("src/main.py")
        .assert()
        .success()
        .stdout("src/main.py\n");

    projprep(&settings)
        .arg("canvas")
        .arg(&root)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("CANVAS READY"));

    let canvas = fs::read_to_string(&output).unwrap();
    assert!(canvas.starts_with("PROJECT: demo\n"));
    assert!(canvas.contains("# FILE: src/main.py"));
    assert!(!canvas.contains("# FILE: src/util.py"));
}

#[test]
fn test_canvas_without_selection_fails() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");

    projprep(&settings)
        .arg("canvas")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no files selected"));
}

#[test]
fn test_last_project_is_remembered() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");

    projprep(&settings).arg("tree").arg(&root).assert().success();

    let saved = fs::read_to_string(&settings).unwrap();
    assert!(saved.contains("\"last_opened_project\": \"demo\""));

    projprep(&settings)
        .args(["select", "--all"])
        .assert()
        .success()
        .stdout("src/main.py\nsrc/util.py\n");

    projprep(&settings)
        .arg("canvas")
        .assert()
        .success()
        .stdout(predicate::str::contains("# FILE: src/util.py"));
}

#[test]
fn test_no_project_and_no_history_fails() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");

    projprep(&settings)
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project given"));
}

#[test]
fn test_backup_prunes_and_requires_force() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");
    let backup = dir.path().join("demo_backup");

    projprep(&settings)
        .arg("backup")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("BACKUP COMPLETE"));

    assert!(backup.join("src/main.py").exists());
    assert!(!backup.join(".idea").exists());
    assert!(!backup.join("image.png").exists());

    projprep(&settings)
        .arg("backup")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    projprep(&settings)
        .args(["backup", "--force"])
        .arg(&root)
        .assert()
        .success();
}

#[test]
fn test_projects_lists_marked_directories() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    let workspace = dir.path().join("work");
    fs::create_dir_all(workspace.join("beta/.idea")).unwrap();
    fs::create_dir_all(workspace.join("alpha/.idea")).unwrap();
    fs::create_dir_all(workspace.join("plain")).unwrap();

    projprep(&settings)
        .arg("projects")
        .arg(&workspace)
        .assert()
        .success()
        .stdout("alpha\nbeta\n");

    // The directory is remembered for the next call
    projprep(&settings)
        .arg("projects")
        .assert()
        .success()
        .stdout("alpha\nbeta\n");
}

#[test]
fn test_completions() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");

    projprep(&settings)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("projprep"));
}

#[test]
fn test_backup_refuses_to_replace_the_project() {
    let (dir, root) = setup_test_project();
    let settings = dir.path().join("settings.json");

    projprep(&settings)
        .args(["backup", "--force", "--dest"])
        .arg(&root)
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("contains the project"));

    assert!(root.join("src/main.py").exists());
}
