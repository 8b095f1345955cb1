// tests/pipeline_fake_executor.rs

mod common;
use crate::common::{FakeExecutor, Recorder, TestResult, init_tracing, recording_graph, with_timeout};

use std::sync::Arc;

use assetflow::engine::Pipeline;
use assetflow::errors::AssetflowError;

fn chain_graph() -> Arc<assetflow::dag::TaskGraph> {
    Arc::new(recording_graph(
        &[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["b", "c"]),
            ("other", &[]),
        ],
        &Recorder::new(),
    ))
}

#[tokio::test]
async fn prerequisites_dispatch_before_dependents() -> TestResult {
    init_tracing();
    let executor = FakeExecutor::new();
    let pipeline = Pipeline::new(chain_graph(), executor.clone());

    let report = with_timeout(pipeline.run("d")).await?;

    let executed = executor.executed();
    assert_eq!(executed.len(), 4);
    assert_eq!(executed.first().map(String::as_str), Some("a"));
    assert_eq!(executed.last().map(String::as_str), Some("d"));
    assert!(!executed.contains(&"other".to_string()));

    assert_eq!(report.target, "d");
    assert_eq!(report.completed.len(), 4);
    Ok(())
}

#[tokio::test]
async fn runs_get_fresh_state_and_ids() -> TestResult {
    let executor = FakeExecutor::new();
    let pipeline = Pipeline::new(chain_graph(), executor.clone());

    let first = with_timeout(pipeline.run("b")).await?;
    let second = with_timeout(pipeline.run("b")).await?;

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(executor.executed(), ["a", "b", "a", "b"]);
    Ok(())
}

#[tokio::test]
async fn failing_prerequisite_fails_the_run() -> TestResult {
    let executor = FakeExecutor::new().failing(&["b"]);
    let pipeline = Pipeline::new(chain_graph(), executor.clone());

    let err = with_timeout(pipeline.run("d")).await.unwrap_err();

    match err {
        AssetflowError::TaskFailed { task, failures } => {
            assert_eq!(task, "d");
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].task, "b");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert!(!executor.executed().contains(&"d".to_string()));
    Ok(())
}

#[tokio::test]
async fn unknown_target_is_rejected() {
    let pipeline = Pipeline::new(chain_graph(), FakeExecutor::new());
    let err = with_timeout(pipeline.run("zzz")).await.unwrap_err();
    assert!(matches!(err, AssetflowError::TaskNotFound(_)));
}
