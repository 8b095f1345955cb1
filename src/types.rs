use std::str::FromStr;

use serde::Deserialize;

/// Behaviour when a watch trigger arrives for a task whose previous run is
/// still in flight.
///
/// - `Queue`: coalesce every such trigger into a single follow-up run that
///   starts as soon as the in-flight run finishes (default behaviour).
/// - `Drop`: ignore the trigger; the in-flight run's result stands.
///
/// Running builds are never cancelled in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RebuildWhileRunning {
    #[default]
    Queue,
    Drop,
}

impl FromStr for RebuildWhileRunning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(RebuildWhileRunning::Queue),
            "drop" => Ok(RebuildWhileRunning::Drop),
            other => Err(format!(
                "invalid rebuildWhileRunning: {other} (expected \"queue\" or \"drop\")"
            )),
        }
    }
}

/// What connected browsers should do after a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Reload the whole page.
    Full,
    /// Re-fetch stylesheets in place without reloading the page.
    Css,
}

impl ReloadKind {
    /// Message sent over the live-reload socket.
    pub fn as_message(self) -> &'static str {
        match self {
            ReloadKind::Full => "reload",
            ReloadKind::Css => "css",
        }
    }
}
