//! Configuration command.

use anyhow::Context;
use std::path::Path;

use crate::config::{self, Config};

/// Print the effective configuration, or write it with `init`
pub fn cmd_config(config: &Config, explicit_path: Option<&Path>, init: bool) -> anyhow::Result<()> {
    if init {
        let path = match explicit_path {
            Some(path) => {
                config::save_to(config, path)?;
                path.to_path_buf()
            }
            None => config::save(config)?,
        };
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let location = explicit_path
        .map(Path::to_path_buf)
        .or_else(config::config_path);
    match location {
        Some(path) if path.exists() => println!("# Config file: {}", path.display()),
        Some(path) => println!("# Config file: {} (not created, showing defaults)", path.display()),
        None => println!("# No config directory on this system, showing defaults"),
    }

    let contents = toml::to_string_pretty(config).context("Cannot render configuration")?;
    println!("{}", contents);
    Ok(())
}
