//! # Modpack Packaging Integration Tests
//!
//! File: cli/tests/package.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! End-to-end runs of the `modpack` binary against temporary projects.
//! Most tests pass `--no-vcs` since the temporary project is not a git
//! repository; the stash tests create one and return early when `git` is
//! not installed.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

#[test]
fn test_flat_archive_written_to_output() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(&ws.mods)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive written to"))
        .stdout(predicate::str::contains("whistle_1.2.0.zip"));

    assert_eq!(
        entry_names(&ws.mods.join("whistle_1.2.0.zip")),
        vec!["control.lua", "info.json", "locale/en/whistle.cfg"]
    );
}

#[test]
fn test_nested_layout() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--no-vcs", "--layout", "nested", "-o"])
        .arg(&ws.mods)
        .assert()
        .success();

    assert_eq!(
        entry_names(&ws.mods.join("whistle_1.2.0.zip")),
        vec![
            "whistle_1.2.0/control.lua",
            "whistle_1.2.0/info.json",
            "whistle_1.2.0/locale/en/whistle.cfg"
        ]
    );
}

#[test]
fn test_vcs_files_and_archives_excluded() {
    let ws = Workspace::new();
    write(&ws.project, ".gitignore", "*.zip\n");
    write(&ws.project, ".git/HEAD", "ref: refs/heads/main\n");
    write(&ws.project, "build/whistle_0.1.0.zip", "stale");
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(&ws.mods)
        .assert()
        .success();

    let names = entry_names(&ws.mods.join("whistle_1.2.0.zip"));
    assert!(names.iter().all(|n| !n.contains(".git") && !n.ends_with(".zip")));
}

#[test]
fn test_old_versions_pruned() {
    let ws = Workspace::new();
    write(&ws.mods, "whistle_1.1.0.zip", "old");
    write(&ws.mods, "horn_2.0.0.zip", "unrelated");
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(&ws.mods)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed old version"));

    assert_eq!(zips_in(&ws.mods), vec!["horn_2.0.0.zip", "whistle_1.2.0.zip"]);
}

#[test]
fn test_keep_old_flag() {
    let ws = Workspace::new();
    write(&ws.mods, "whistle_1.1.0.zip", "old");
    ws.cmd()
        .args(["--no-vcs", "--keep-old", "-o"])
        .arg(&ws.mods)
        .assert()
        .success();

    assert_eq!(zips_in(&ws.mods), vec!["whistle_1.1.0.zip", "whistle_1.2.0.zip"]);
}

#[test]
fn test_rerun_is_idempotent() {
    let ws = Workspace::new();
    for _ in 0..2 {
        ws.cmd()
            .args(["--no-vcs", "-o"])
            .arg(&ws.mods)
            .assert()
            .success();
    }
    assert_eq!(zips_in(&ws.mods), vec!["whistle_1.2.0.zip"]);
}

#[test]
fn test_missing_descriptor_fails() {
    let ws = Workspace::new();
    fs::remove_file(ws.project.join("info.json")).unwrap();
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(&ws.mods)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("info.json"));

    assert!(zips_in(&ws.mods).is_empty());
}

#[test]
fn test_malformed_descriptor_fails() {
    let ws = Workspace::new();
    write(&ws.project, "info.json", r#"{"name": "whistle"}"#);
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(&ws.mods)
        .assert()
        .failure()
        .code(1);

    assert!(zips_in(&ws.mods).is_empty());
}

#[test]
fn test_unencodable_name_removes_partial_archive() {
    let ws = Workspace::new();
    write(&ws.project, "locale/ja/汽笛.cfg", "[mod-name]\n");
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(&ws.mods)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("汽笛"));

    assert!(zips_in(&ws.mods).is_empty());
}

#[test]
fn test_missing_output_falls_back_to_current_dir() {
    let ws = Workspace::new();
    write(&ws.cwd, "whistle_1.0.0.zip", "old");
    ws.cmd()
        .args(["--no-vcs", "-o"])
        .arg(ws.root.path().join("no-such-dir"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning"));

    assert_eq!(zips_in(&ws.cwd), vec!["whistle_1.0.0.zip", "whistle_1.2.0.zip"]);
}

#[test]
fn test_here_writes_to_current_dir() {
    let ws = Workspace::new();
    ws.cmd().args(["--no-vcs", "--here"]).assert().success();
    assert_eq!(zips_in(&ws.cwd), vec!["whistle_1.2.0.zip"]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_platform_default_destination() {
    let ws = Workspace::new();
    let home_mods = ws.root.path().join(".factorio/mods");
    fs::create_dir_all(&home_mods).unwrap();
    ws.cmd()
        .env("HOME", ws.root.path())
        .arg("--no-vcs")
        .assert()
        .success();

    assert_eq!(zips_in(&home_mods), vec!["whistle_1.2.0.zip"]);
}

#[test]
fn test_config_file_settings_apply() {
    let ws = Workspace::new();
    write(&ws.project, "art/whistle.psd", "layers");
    fs::write(
        &ws.config,
        format!(
            "[output]\ndirectory = {:?}\n\n[vcs]\nenabled = false\n\n[archive]\nexclude = [\"*.psd\"]\n",
            ws.mods.to_string_lossy()
        ),
    )
    .unwrap();
    ws.cmd().assert().success();

    let names = entry_names(&ws.mods.join("whistle_1.2.0.zip"));
    assert!(!names.iter().any(|n| n.ends_with(".psd")));
}

#[test]
fn test_unknown_config_key_fails() {
    let ws = Workspace::new();
    fs::write(&ws.config, "[output]\nfolder = \"x\"\n").unwrap();
    ws.cmd().arg("--no-vcs").assert().failure().code(1);
}

// --- git-backed runs ---

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(output.status.success(), "git {:?} failed: {:?}", args, output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "--quiet"]);
    git(dir, &["config", "user.name", "Modpack Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["add", "."]);
    git(dir, &["commit", "--quiet", "-m", "initial"]);
}

fn archived_text(archive: &Path, entry: &str) -> String {
    use std::io::Read;
    let mut zip = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
    let mut text = String::new();
    zip.by_name(entry).unwrap().read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_dirty_tree_packages_last_commit_and_restores() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    init_repo(&ws.project);
    let edited = "script.on_init(function() game.print('toot') end)\n";
    write(&ws.project, "control.lua", edited);

    ws.cmd()
        .arg("-o")
        .arg(&ws.mods)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stashed uncommitted changes"));

    assert_eq!(
        archived_text(&ws.mods.join("whistle_1.2.0.zip"), "control.lua"),
        "script.on_init(function() end)\n"
    );
    assert_eq!(fs::read_to_string(ws.project.join("control.lua")).unwrap(), edited);
    assert!(git(&ws.project, &["stash", "list"]).trim().is_empty());
}

#[test]
fn test_dirty_tree_restored_after_failure() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    write(&ws.project, "locale/ja/汽笛.cfg", "[mod-name]\n");
    init_repo(&ws.project);
    write(&ws.project, "control.lua", "-- work in progress\n");

    ws.cmd().arg("-o").arg(&ws.mods).assert().failure().code(1);

    assert_eq!(
        fs::read_to_string(ws.project.join("control.lua")).unwrap(),
        "-- work in progress\n"
    );
    assert!(git(&ws.project, &["stash", "list"]).trim().is_empty());
    assert!(zips_in(&ws.mods).is_empty());
}

#[test]
fn test_apply_restore_keeps_stash_entry() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    init_repo(&ws.project);
    write(&ws.project, "control.lua", "-- edited\n");

    ws.cmd()
        .args(["--restore", "apply", "-o"])
        .arg(&ws.mods)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(ws.project.join("control.lua")).unwrap(), "-- edited\n");
    assert_eq!(git(&ws.project, &["stash", "list"]).lines().count(), 1);
}

#[test]
fn test_archive_inside_project_survives_include_untracked() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    init_repo(&ws.project);
    fs::write(&ws.config, "[vcs]\ninclude_untracked = true\n").unwrap();
    write(&ws.project, "control.lua", "-- edited\n");

    for _ in 0..2 {
        ws.cmd()
            .current_dir(&ws.project)
            .arg("--here")
            .assert()
            .success();
        assert!(ws.project.join("whistle_1.2.0.zip").is_file());
    }

    assert_eq!(fs::read_to_string(ws.project.join("control.lua")).unwrap(), "-- edited\n");
    assert!(git(&ws.project, &["stash", "list"]).trim().is_empty());
}

#[test]
fn test_untracked_files_are_reported() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    init_repo(&ws.project);
    write(&ws.project, "notes.txt", "scratch");

    ws.cmd()
        .env_remove("RUST_LOG")
        .arg("-o")
        .arg(&ws.mods)
        .assert()
        .success()
        .stderr(predicate::str::contains("untracked file(s) will be packaged"))
        .stderr(predicate::str::contains("notes.txt"));

    assert!(entry_names(&ws.mods.join("whistle_1.2.0.zip"))
        .iter()
        .any(|n| n == "notes.txt"));
}
