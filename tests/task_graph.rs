// tests/task_graph.rs

mod common;
use crate::common::{Recorder, TestResult, recording_graph};

use assetflow::build_task_graph;
use assetflow::dag::{TaskAction, TaskGraphBuilder};
use assetflow::errors::AssetflowError;

#[test]
fn builtin_graph_is_valid_and_ordered() -> TestResult {
    let graph = build_task_graph()?;

    for task in [
        "showconf",
        "prettify",
        "sass",
        "make_conf_js",
        "browserify",
        "copy_ext_assets",
        "templating",
        "copy_assets",
        "uglify",
        "clean",
        "dist",
        "serve",
        "e2e",
        "unittest",
    ] {
        assert!(graph.contains(task), "missing task {task}");
    }

    assert_eq!(
        graph.dependencies_of("dist"),
        ["sass", "browserify", "copy_assets", "uglify"]
    );
    assert_eq!(graph.dependencies_of("browserify"), ["make_conf_js"]);
    assert_eq!(
        graph.dependencies_of("copy_assets"),
        ["copy_ext_assets", "templating"]
    );

    // Every task comes after its prerequisites.
    for task in graph.tasks() {
        let pos = graph.position_of(task).unwrap();
        for dep in graph.dependencies_of(task) {
            assert!(graph.position_of(dep).unwrap() < pos, "{dep} must precede {task}");
        }
    }
    Ok(())
}

#[test]
fn execution_plan_is_the_prerequisite_closure() -> TestResult {
    let graph = build_task_graph()?;

    let mut plan = graph.execution_plan("uglify")?;
    assert_eq!(plan.last().map(String::as_str), Some("uglify"));
    plan.sort();
    assert_eq!(
        plan,
        [
            "browserify",
            "copy_assets",
            "copy_ext_assets",
            "make_conf_js",
            "sass",
            "templating",
            "uglify"
        ]
    );

    assert_eq!(graph.execution_plan("clean")?, ["clean"]);
    Ok(())
}

#[test]
fn unknown_target_is_task_not_found() {
    let graph = recording_graph(&[("a", &[])], &Recorder::new());
    let err = graph.execution_plan("nope").unwrap_err();
    assert!(matches!(err, AssetflowError::TaskNotFound(name) if name == "nope"));
}

#[test]
fn duplicate_declaration_is_rejected() {
    let mut builder = TaskGraphBuilder::new();
    builder
        .declare("a", &[], TaskAction::noop())
        .declare("a", &[], TaskAction::noop());

    let err = builder.build().unwrap_err();
    assert!(matches!(err, AssetflowError::DuplicateTask(name) if name == "a"));
}

#[test]
fn unknown_prerequisite_is_rejected() {
    let mut builder = TaskGraphBuilder::new();
    builder.declare("dist", &["sass"], TaskAction::noop());

    let err = builder.build().unwrap_err();
    match err {
        AssetflowError::UnknownPrerequisite { task, prerequisite } => {
            assert_eq!(task, "dist");
            assert_eq!(prerequisite, "sass");
        }
        other => panic!("expected UnknownPrerequisite, got {other:?}"),
    }
}

#[test]
fn self_prerequisite_is_a_cycle() {
    let mut builder = TaskGraphBuilder::new();
    builder.declare("a", &["a"], TaskAction::noop());

    assert!(matches!(builder.build(), Err(AssetflowError::DagCycle(_))));
}

#[test]
fn transitive_cycle_is_rejected() {
    let mut builder = TaskGraphBuilder::new();
    builder
        .declare("a", &["c"], TaskAction::noop())
        .declare("b", &["a"], TaskAction::noop())
        .declare("c", &["b"], TaskAction::noop());

    assert!(matches!(builder.build(), Err(AssetflowError::DagCycle(_))));
}

#[test]
fn repeated_prerequisites_collapse() -> TestResult {
    let mut builder = TaskGraphBuilder::new();
    builder
        .declare("a", &[], TaskAction::noop())
        .declare("b", &["a", "a"], TaskAction::noop());
    let graph = builder.build()?;

    assert_eq!(graph.dependencies_of("b"), ["a"]);
    assert_eq!(graph.dependents_of("a"), ["b"]);
    Ok(())
}
