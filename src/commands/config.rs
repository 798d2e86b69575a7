// src/commands/config.rs
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::config::{global_path, load, Commitrc, PROJECT_CONFIG_FILES};
use crate::error::Error;
use crate::git::get_repo_root;

pub fn cmd_types() -> Result<()> {
    let root = get_repo_root().ok_or(Error::NoRepositoryRoot)?;
    let loaded = load(&root);
    let types = loaded.config.visible_types();

    if types.is_empty() {
        println!("No commit types configured.");
        return Ok(());
    }
    for t in types {
        println!("  {:<10} {}", t.label, t.detail);
    }
    Ok(())
}

pub fn cmd_config() -> Result<()> {
    let root = get_repo_root().ok_or(Error::NoRepositoryRoot)?;
    let loaded = load(&root);

    let global = global_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unknown)".into());
    let global_state = if loaded.global.is_some() { "" } else { " (not found)" };

    println!("Status:         {}", loaded.status());
    println!("Global file:    {}{}", global, global_state);
    println!(
        "Project file:   {}",
        loaded
            .project
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("(none; looked for {})", PROJECT_CONFIG_FILES.join(", ")))
    );
    println!("\nEffective configuration:");
    println!("{}", serde_json::to_string_pretty(&loaded.config)?);

    println!("\nPriority: .commitrc > ~/.commit-lint.toml > defaults");
    Ok(())
}

pub fn cmd_init(force: bool) -> Result<()> {
    let root = get_repo_root().ok_or(Error::NoRepositoryRoot)?;
    let path = write_default_commitrc(&root, force)?;
    println!("Config saved to: {}", path.display());
    Ok(())
}

pub fn write_default_commitrc(root: &Path, force: bool) -> Result<std::path::PathBuf> {
    let path = root.join(PROJECT_CONFIG_FILES[0]);
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }
    let content = serde_json::to_string_pretty(&Commitrc::default())
        .context("Failed to serialize config")?;
    fs::write(&path, format!("{}\n", content)).context("Failed to write config file")?;
    Ok(path)
}
