// src/commands/hook.rs
use anyhow::{bail, Context, Result};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;

use crate::cli::{HookCommands, HOOK_MARKER, HOOK_SCRIPT};
use crate::git::{get_git_dir, hook_path};

/// What currently sits at the prepare-commit-msg path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookState {
    Missing,
    Ours,
    Foreign,
}

impl HookState {
    fn of(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(HookState::Missing);
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(if content.contains(HOOK_MARKER) {
            HookState::Ours
        } else {
            HookState::Foreign
        })
    }
}

pub fn cmd_hook(command: HookCommands) -> Result<()> {
    let git_dir =
        get_git_dir().context("Could not locate .git directory. Are you in a git repo?")?;
    let path = hook_path(&git_dir);
    let state = HookState::of(&path)?;
    debug!(?state, path = %path.display(), "prepare-commit-msg hook");

    match command {
        HookCommands::Install => {
            install(&path, state)?;
            println!("Hook installed at {}", path.display());
            println!("`git commit -m` and merges keep their own message.");
        }
        HookCommands::Uninstall => {
            if uninstall(&path, state)? {
                println!("Hook uninstalled successfully.");
            }
        }
    }
    Ok(())
}

fn install(path: &Path, state: HookState) -> Result<()> {
    match state {
        HookState::Foreign => bail!(
            "A prepare-commit-msg hook already exists at {}. Please back it up or delete it first.",
            path.display()
        ),
        // Rewriting our own hook picks up script changes from newer versions.
        HookState::Missing | HookState::Ours => {}
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, HOOK_SCRIPT).context("Failed to write hook")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// `true` when a hook was removed.
fn uninstall(path: &Path, state: HookState) -> Result<bool> {
    match state {
        HookState::Missing => {
            println!("No hook found to uninstall.");
            Ok(false)
        }
        HookState::Foreign => {
            println!("The existing hook was not created by commit-lint. Manual removal required.");
            Ok(false)
        }
        HookState::Ours => {
            fs::remove_file(path).context("Failed to remove hook")?;
            Ok(true)
        }
    }
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = hook_path(dir.path());
        assert_eq!(HookState::of(&path).unwrap(), HookState::Missing);

        install(&path, HookState::Missing).unwrap();
        assert_eq!(HookState::of(&path).unwrap(), HookState::Ours);

        fs::write(&path, "#!/bin/sh\necho custom\n").unwrap();
        assert_eq!(HookState::of(&path).unwrap(), HookState::Foreign);
    }

    #[test]
    fn reinstall_refreshes_own_hook() {
        let dir = tempfile::tempdir().unwrap();
        let path = hook_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("#!/bin/sh\n# {}: old\n", HOOK_MARKER)).unwrap();

        install(&path, HookState::of(&path).unwrap()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), HOOK_SCRIPT);

        assert!(uninstall(&path, HookState::Ours).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn foreign_hook_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = hook_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "#!/bin/sh\necho custom\n").unwrap();

        assert!(install(&path, HookState::Foreign).is_err());
        assert!(!uninstall(&path, HookState::Foreign).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\necho custom\n");
    }

    #[cfg(unix)]
    #[test]
    fn hook_without_terminal_keeps_commit_going() {
        use std::process::{Command, Stdio};

        let dir = tempfile::tempdir().unwrap();
        let path = hook_path(dir.path());
        install(&path, HookState::Missing).unwrap();

        // No controlling terminal: the hook must exit 0 whatever is on PATH.
        let status = Command::new("setsid")
            .arg("sh")
            .arg(&path)
            .arg(dir.path().join("COMMIT_EDITMSG"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Ok(status) = status {
            assert!(status.success());
        }
    }
}
