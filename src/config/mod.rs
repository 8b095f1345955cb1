// src/config/mod.rs

//! Configuration loading for assetflow.
//!
//! Responsibilities:
//! - Define the immutable runtime [`Configuration`] (`model.rs`).
//! - Describe where the project's source and output trees live (`layout.rs`).
//! - Seed defaults and merge the optional override layers (`loader.rs`).

pub mod layout;
pub mod loader;
pub mod model;

pub use layout::ProjectLayout;
pub use loader::{candidate_files, parse_layer, ConfigLoader, ConfigSeed};
pub use model::{BuildInfo, Configuration};
