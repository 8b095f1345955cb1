// tests/watch_bindings.rs

//! Mapping changed paths to rebuild triggers.

mod common;
use crate::common::{TestResult, init_tracing, with_timeout};

use std::path::Path;
use std::time::Duration;

use assetflow::engine::{RuntimeEvent, TriggerReason};
use assetflow::types::ReloadKind;
use assetflow::watch::{
    WatchBinding, default_bindings, process_file_change, relative_str, reload_kinds,
    spawn_watcher, tasks_for_path,
};
use tokio::sync::mpsc;

#[test]
fn default_bindings_route_changes_to_tasks() -> TestResult {
    let bindings = default_bindings()?;

    assert_eq!(tasks_for_path(&bindings, "src/app.js"), vec!["browserify"]);
    assert_eq!(
        tasks_for_path(&bindings, "assets/css/site.scss"),
        vec!["sass", "copy_assets"]
    );
    assert_eq!(tasks_for_path(&bindings, "assets/index.html"), vec!["copy_assets"]);
    assert!(tasks_for_path(&bindings, "src/lib/util.js").is_empty());
    assert!(tasks_for_path(&bindings, "dist/js/app.js").is_empty());
    assert!(tasks_for_path(&bindings, "package.json").is_empty());
    Ok(())
}

#[test]
fn styles_reload_in_place() -> TestResult {
    let kinds = reload_kinds(&default_bindings()?);

    assert_eq!(kinds.get("sass"), Some(&ReloadKind::Css));
    assert_eq!(kinds.get("browserify"), Some(&ReloadKind::Full));
    assert_eq!(kinds.get("copy_assets"), Some(&ReloadKind::Full));
    Ok(())
}

#[test]
fn one_trigger_per_task_even_with_overlapping_bindings() -> TestResult {
    let bindings = vec![
        WatchBinding::new("assets/**/*.scss", "sass", ReloadKind::Css)?,
        WatchBinding::new("assets/css/*", "sass", ReloadKind::Css)?,
    ];
    assert_eq!(tasks_for_path(&bindings, "assets/css/a.scss"), vec!["sass"]);
    Ok(())
}

#[test]
fn relative_paths_use_forward_slashes() {
    let root = Path::new("/project");
    assert_eq!(
        relative_str(root, &root.join("assets").join("css").join("a.scss")).as_deref(),
        Some("assets/css/a.scss")
    );
}

#[tokio::test]
async fn file_change_sends_one_trigger_per_bound_task() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let bindings = default_bindings()?;
    let (tx, mut rx) = mpsc::channel(8);

    let sent = process_file_change(
        dir.path(),
        &dir.path().join("assets").join("css").join("site.scss"),
        &bindings,
        &tx,
    )
    .await;
    assert_eq!(sent, 2);

    let mut triggered = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                assert_eq!(reason, TriggerReason::FileWatch);
                triggered.push(task);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(triggered, vec!["sass", "copy_assets"]);
    Ok(())
}

#[tokio::test]
async fn unrelated_change_sends_nothing() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (tx, mut rx) = mpsc::channel(8);

    let sent = process_file_change(
        dir.path(),
        &dir.path().join("README.md"),
        &default_bindings()?,
        &tx,
    )
    .await;

    assert_eq!(sent, 0);
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn path_outside_root_is_ignored() -> TestResult {
    let dir = tempfile::tempdir()?;
    let other = tempfile::tempdir()?;
    let (tx, _rx) = mpsc::channel(8);

    let sent = process_file_change(
        dir.path(),
        &other.path().join("src").join("app.js"),
        &default_bindings()?,
        &tx,
    )
    .await;

    assert_eq!(sent, 0);
    Ok(())
}

#[tokio::test]
async fn watcher_skips_missing_directories() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("src"))?;
    let (tx, _rx) = mpsc::channel(8);

    let handle = spawn_watcher(dir.path(), default_bindings()?, tx)?;

    assert_eq!(handle.roots().len(), 1);
    assert!(handle.roots()[0].ends_with("src"));
    Ok(())
}

#[tokio::test]
async fn watcher_triggers_on_real_file_writes() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("src"))?;
    std::fs::create_dir_all(dir.path().join("assets").join("css"))?;
    let (tx, mut rx) = mpsc::channel(64);

    let _handle = spawn_watcher(dir.path(), default_bindings()?, tx)?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(dir.path().join("src").join("app.js"), "console.log(1);")?;

    let event = with_timeout(rx.recv()).await.ok_or("watcher channel closed")?;
    match event {
        RuntimeEvent::TaskTriggered { task, reason } => {
            assert_eq!(task, "browserify");
            assert_eq!(reason, TriggerReason::FileWatch);
        }
        other => panic!("unexpected event {other:?}"),
    }
    Ok(())
}
