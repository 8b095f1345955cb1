// src/server/http.rs

//! Static file server for the output tree, plus the live-reload endpoints.

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::server::reload::{CLIENT_SCRIPT, ReloadHub, SCRIPT_PATH, SOCKET_PATH, inject_client};
use crate::types::ReloadKind;

/// Serve `dist` with live reload wired into every HTML page.
pub fn router(dist: PathBuf, hub: ReloadHub) -> Router {
    Router::new()
        .route(SOCKET_PATH, get(livereload_socket))
        .route(SCRIPT_PATH, get(client_script))
        .fallback_service(ServeDir::new(dist))
        .layer(middleware::from_fn(inject_reload_client))
        .with_state(hub)
}

async fn client_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        CLIENT_SCRIPT,
    )
}

async fn livereload_socket(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> Response {
    ws.on_upgrade(move |socket| forward_reloads(socket, hub.subscribe()))
}

async fn forward_reloads(mut socket: WebSocket, mut rx: broadcast::Receiver<ReloadKind>) {
    debug!("live-reload client connected");
    loop {
        tokio::select! {
            kind = rx.recv() => {
                let kind = match kind {
                    Ok(kind) => kind,
                    // Missed notifications collapse into a full reload.
                    Err(RecvError::Lagged(_)) => ReloadKind::Full,
                    Err(RecvError::Closed) => break,
                };
                if socket.send(Message::Text(kind.as_message().into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    debug!("live-reload client disconnected");
}

async fn inject_reload_client(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    if !is_html || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer html response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body = match inject_client(&String::from_utf8_lossy(&bytes)) {
        Some(html) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Body::from(html)
        }
        None => Body::from(bytes),
    };
    Response::from_parts(parts, body)
}
