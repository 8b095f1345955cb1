// src/server/reload.rs

//! Live-reload fan-out to connected browsers.

use tokio::sync::broadcast;
use tracing::debug;

use crate::types::ReloadKind;

/// Path of the websocket browsers connect to.
pub const SOCKET_PATH: &str = "/__livereload";

/// Path the client script is served from.
pub const SCRIPT_PATH: &str = "/__livereload.js";

/// Browser side of live reload: `css` re-fetches stylesheets in place,
/// anything else reloads the page.
pub const CLIENT_SCRIPT: &str = r#"(function () {
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var socket = new WebSocket(proto + location.host + "/__livereload");
  socket.addEventListener("message", function (event) {
    if (event.data === "css") {
      document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
        var url = new URL(link.href);
        url.searchParams.set("livereload", Date.now());
        link.href = url.toString();
      });
    } else {
      window.location.reload();
    }
  });
})();
"#;

const CHANNEL_CAPACITY: usize = 16;

/// Broadcasts reload notifications to every connected browser session.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadKind>,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns the number of sessions notified.
    pub fn notify(&self, kind: ReloadKind) -> usize {
        let sessions = self.tx.send(kind).unwrap_or(0);
        debug!(?kind, sessions, "sent live-reload notification");
        sessions
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadKind> {
        self.tx.subscribe()
    }
}

/// Insert the client script tag before `</body>`.
///
/// Documents without a closing body tag are returned unchanged.
pub fn inject_client(html: &str) -> Option<String> {
    let idx = html.rfind("</body>")?;
    let tag = format!("<script src=\"{SCRIPT_PATH}\"></script>");

    let mut out = String::with_capacity(html.len() + tag.len());
    out.push_str(&html[..idx]);
    out.push_str(&tag);
    out.push_str(&html[idx..]);
    Some(out)
}
