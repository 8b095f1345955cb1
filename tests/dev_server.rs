// tests/dev_server.rs

//! Dev server lifecycle and the HTML it serves.

mod common;
use crate::common::{FakeExecutor, Recorder, TestResult, init_tracing, recording_graph, test_config, with_timeout};

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use assetflow::config::ProjectLayout;
use assetflow::engine::Pipeline;
use assetflow::errors::AssetflowError;
use assetflow::server::http::router;
use assetflow::server::reload::{CLIENT_SCRIPT, SCRIPT_PATH};
use assetflow::server::{DevServer, ReloadHub, ServerState};
use serde_json::json;
use tokio::net::TcpListener;

fn dev_server(
    executor: FakeExecutor,
    root: &Path,
    config: serde_json::Value,
) -> TestResult<DevServer<FakeExecutor>> {
    let graph = recording_graph(&[("sass", &[]), ("dist", &["sass"])], &Recorder::new());
    let pipeline = Arc::new(Pipeline::new(Arc::new(graph), executor));
    let server = DevServer::new(
        pipeline,
        Arc::new(ProjectLayout::new(root)),
        Arc::new(test_config(config)),
    )?;
    Ok(server)
}

#[tokio::test]
async fn failing_initial_build_never_serves() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let executor = FakeExecutor::new().failing(&["sass"]);
    let mut server = dev_server(executor.clone(), dir.path(), json!({"serverPort": 0}))?;
    assert_eq!(server.state(), ServerState::Stopped);

    let err = with_timeout(server.serve("dist")).await.unwrap_err();

    assert!(matches!(err, AssetflowError::TaskFailed { ref task, .. } if task == "dist"), "{err:?}");
    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(executor.executed(), vec!["sass"]);
    Ok(())
}

#[tokio::test]
async fn invalid_port_fails_before_building() -> TestResult {
    let dir = tempfile::tempdir()?;
    let executor = FakeExecutor::new();
    let mut server = dev_server(executor.clone(), dir.path(), json!({"serverPort": "http"}))?;

    let err = with_timeout(server.serve("dist")).await.unwrap_err();

    assert!(matches!(err, AssetflowError::ConfigError(_)), "{err:?}");
    assert!(executor.executed().is_empty());
    assert_eq!(server.state(), ServerState::Stopped);
    Ok(())
}

/// Serve `dist` on an ephemeral port.
async fn serve_dist(dist: &Path) -> TestResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(dist.to_path_buf(), ReloadHub::new());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

#[tokio::test]
async fn html_pages_get_the_reload_client() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("index.html"), "<html><body>hi</body></html>")?;
    let addr = serve_dist(dir.path()).await?;

    let response = with_timeout(reqwest::get(format!("http://{addr}/"))).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let length = response.content_length();
    let body = response.text().await?;

    let tag = format!("<script src=\"{SCRIPT_PATH}\"></script>");
    assert_eq!(body, format!("<html><body>hi{tag}</body></html>"));
    if let Some(length) = length {
        assert_eq!(length, body.len() as u64);
    }
    Ok(())
}

#[tokio::test]
async fn other_responses_pass_through() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("js"))?;
    std::fs::write(dir.path().join("js").join("app.js"), "console.log('</body>');")?;
    std::fs::write(dir.path().join("fragment.html"), "<p>no body tag</p>")?;
    let addr = serve_dist(dir.path()).await?;

    let script = with_timeout(reqwest::get(format!("http://{addr}/js/app.js"))).await?;
    assert_eq!(script.status(), reqwest::StatusCode::OK);
    assert_eq!(script.text().await?, "console.log('</body>');");

    let fragment = with_timeout(reqwest::get(format!("http://{addr}/fragment.html"))).await?;
    assert_eq!(fragment.text().await?, "<p>no body tag</p>");

    let missing = with_timeout(reqwest::get(format!("http://{addr}/missing.html"))).await?;
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(!missing.text().await?.contains(SCRIPT_PATH));
    Ok(())
}

#[tokio::test]
async fn reload_client_script_is_served() -> TestResult {
    let dir = tempfile::tempdir()?;
    let addr = serve_dist(dir.path()).await?;

    let response = with_timeout(reqwest::get(format!("http://{addr}{SCRIPT_PATH}"))).await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await?, CLIENT_SCRIPT);
    Ok(())
}
