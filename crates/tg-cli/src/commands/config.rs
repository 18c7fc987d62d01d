//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_info, print_success, print_warning};
use tg_core::config;

/// Config file to use: the `--config` flag, else the default location
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Write the starter config
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_config_path(config_path);

    if path.exists() && !force {
        print_warning(&format!("Config file already exists: {}", path.display()));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    config::write_default_config(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    print_success(&format!("Config written to {}", path.display()));
    print_info("Fill in gist_id and server.github_token before running the server");
    Ok(())
}

/// Print the config file location
pub fn config_path(config_path: Option<&Path>) {
    println!("{}", resolve_config_path(config_path).display());
}
