// src/git.rs
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// =============================================================================
// GIT UTILITIES
// =============================================================================
pub fn is_git_repo() -> bool {
    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn rev_parse_path(flag: &str) -> Option<PathBuf> {
    let output = Command::new("git").args(["rev-parse", flag]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path_str.is_empty() {
        return None;
    }
    Some(PathBuf::from(path_str))
}

pub fn get_git_dir() -> Option<PathBuf> {
    rev_parse_path("--git-dir")
}

/// Top of the working tree; `None` in a bare repository.
pub fn get_repo_root() -> Option<PathBuf> {
    rev_parse_path("--show-toplevel")
}

pub fn hook_path(git_dir: &Path) -> PathBuf {
    git_dir.join("hooks").join("prepare-commit-msg")
}

pub fn commit_args(all: bool) -> Vec<&'static str> {
    let mut args = vec!["commit"];
    if all {
        args.push("-a");
    }
    // Message on stdin keeps multi-paragraph bodies intact.
    args.extend(["-F", "-"]);
    args
}

/// Returns (stdout, stderr, success).
pub fn commit_with_message(message: &str, all: bool) -> Result<(String, String, bool)> {
    let mut child = Command::new("git")
        .args(commit_args(all))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to execute git")?;

    child
        .stdin
        .take()
        .context("git stdin unavailable")?
        .write_all(message.as_bytes())
        .context("Failed to pass the message to git")?;

    let output = child.wait_with_output()?;
    Ok((
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    ))
}
