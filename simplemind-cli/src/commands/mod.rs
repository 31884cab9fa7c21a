//! CLI command implementations.

pub mod list;
pub mod render;

pub use list::{list_recent, show_section};
pub use render::{render_uri, resolve_uri};

use anyhow::{Context, Result};
use simplemind_core::{Config, Site};
use std::path::Path;

/// Load the config (defaults when the file is absent) and build the site
pub fn load_site(config_path: &Path, content: Option<&Path>) -> Result<Site> {
    let mut config = if config_path.exists() {
        tracing::debug!("Loading config from {:?}", config_path);
        Config::from_file(config_path).context("Failed to load configuration")?
    } else {
        tracing::debug!("No config at {:?}, using defaults", config_path);
        Config::default()
    };

    if let Some(dir) = content {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };
        config.content_root = dir;
    }

    Site::new(config).context("Invalid pipeline configuration")
}
