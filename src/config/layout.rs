// src/config/layout.rs

use std::path::{Path, PathBuf};

/// Fixed directory layout of a project, resolved against its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Override layers (`config/config*.json|hjson`) and `karma.conf.js`.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Script sources; `src/app.js` is the bundle entry point.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Templates, styles and static assets.
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    /// The output tree.
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join("dist")
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root.join("test")
    }

    pub fn node_modules_dir(&self) -> PathBuf {
        self.root.join("node_modules")
    }

    pub fn package_json(&self) -> PathBuf {
        self.root.join("package.json")
    }

    pub fn script_entry(&self) -> PathBuf {
        self.src_dir().join("app.js")
    }

    pub fn script_bundle(&self) -> PathBuf {
        self.dist_dir().join("js").join("app.js")
    }

    pub fn config_script(&self) -> PathBuf {
        self.dist_dir().join("js").join("config.js")
    }
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self::new(".")
    }
}
