// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::validate::DEFAULT_VALIDATION_DELAY_MS;

#[derive(Parser)]
#[command(
    name = "commit-lint",
    version,
    about = "Compose Conventional Commits messages through a guided prompt\n\nType -> scope -> subject -> body -> footer, validated against .commitrc rules.",
    after_help = "EXAMPLES:
    commit-lint commit              # Guided message, then git commit
    commit-lint commit -a           # Same, staging tracked changes first
    commit-lint commit --print      # Print the message instead of committing

    commit-lint types               # Commit types offered by the effective config
    commit-lint config              # Show where the configuration comes from
    commit-lint init                # Write a .commitrc with the defaults

    commit-lint hook install        # Run the prompt from `git commit`
    commit-lint hook uninstall      # Remove the commit-lint git hook

PROMPT COMMANDS:
    :back    Return to the previous step
    :skip    Skip the body
    :clear   Empty a pre-filled answer
    :q       Cancel without committing"
)]
pub struct Cli {
    /// Minimum severity of log lines (overrides RUST_LOG)
    #[arg(long, global = true, env = "COMMIT_LINT_LOG", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Delay before each validation answers, in milliseconds
    #[arg(
        long,
        global = true,
        env = "COMMIT_LINT_VALIDATION_DELAY_MS",
        default_value_t = DEFAULT_VALIDATION_DELAY_MS
    )]
    pub validation_delay_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a message step by step and commit it
    ///
    /// By default the message is passed to `git commit`. Use `--print` to only
    /// print it. Canceling a prompt leaves the repository untouched.
    Commit {
        /// Stage modified tracked files before committing (`git commit -a`)
        #[arg(short = 'a', long)]
        all: bool,

        /// Write the message to a file instead of committing (used by git hooks)
        #[arg(long, hide = true, conflicts_with_all = ["all", "print"])]
        write_to: Option<PathBuf>,

        /// Print the message to stdout instead of committing
        #[arg(long, conflicts_with = "all")]
        print: bool,
    },

    /// List the commit types offered by the effective configuration
    Types,

    /// Show the configuration files in use and the effective configuration
    Config,

    /// Write a `.commitrc` with the default configuration at the repository root
    Init {
        /// Overwrite an existing `.commitrc`
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Manage the git hook that runs the prompt on `git commit`
    Hook {
        #[command(subcommand)]
        command: HookCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum HookCommands {
    /// Install the prepare-commit-msg hook
    Install,
    /// Uninstall the prepare-commit-msg hook
    Uninstall,
}

pub const HOOK_MARKER: &str = "commit-lint-hook";

pub const HOOK_SCRIPT: &str = r#"#!/bin/sh
# commit-lint-hook: Auto-generated by commit-lint
# This script runs on Linux, macOS, and Windows (via Git Bash)

# Skip if commit-lint is not in PATH
if ! command -v commit-lint >/dev/null 2>&1; then
    exit 0
fi

COMMIT_MSG_FILE=$1
COMMIT_SOURCE=$2

# Skip if the user provided a message via -m, -F, or if it's a merge/squash
if [ -n "$COMMIT_SOURCE" ]; then
    exit 0
fi

# Prompts need the terminal; git hooks run without stdin. Without a
# controlling terminal (GUI clients) leave the message to git.
if ( exec < /dev/tty ) 2>/dev/null; then
    exec < /dev/tty
else
    exit 0
fi
commit-lint commit --write-to "$COMMIT_MSG_FILE"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_commit_command() {
        let cli = Cli::try_parse_from(["commit-lint", "commit"]).unwrap();
        if let Commands::Commit { all, write_to, print } = cli.command {
            assert!(!all);
            assert!(write_to.is_none());
            assert!(!print);
        } else {
            panic!("Expected Commit command");
        }
    }

    #[test]
    fn cli_parses_commit_all() {
        let cli = Cli::try_parse_from(["commit-lint", "commit", "-a"]).unwrap();
        assert!(matches!(cli.command, Commands::Commit { all: true, .. }));
    }

    #[test]
    fn cli_parses_commit_with_write_to() {
        let cli = Cli::try_parse_from(["commit-lint", "commit", "--write-to", "/tmp/msg"]).unwrap();
        if let Commands::Commit { write_to, .. } = cli.command {
            assert_eq!(write_to, Some(PathBuf::from("/tmp/msg")));
        } else {
            panic!("Expected Commit command");
        }
    }

    #[test]
    fn cli_rejects_print_with_write_to() {
        let result = Cli::try_parse_from(["commit-lint", "commit", "--print", "--write-to", "/tmp/msg"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "commit-lint",
            "--log-level",
            "debug",
            "--validation-delay-ms",
            "0",
            "types",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.validation_delay_ms, 0);
        assert!(matches!(cli.command, Commands::Types));
    }

    #[test]
    fn cli_defaults_validation_delay() {
        let cli = Cli::try_parse_from(["commit-lint", "config"]).unwrap();
        assert_eq!(cli.validation_delay_ms, DEFAULT_VALIDATION_DELAY_MS);
    }

    #[test]
    fn cli_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["commit-lint", "--log-level", "loud", "types"]).is_err());
    }

    #[test]
    fn cli_parses_init_force() {
        let cli = Cli::try_parse_from(["commit-lint", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn cli_parses_hook_install() {
        let cli = Cli::try_parse_from(["commit-lint", "hook", "install"]).unwrap();
        assert!(matches!(cli.command, Commands::Hook { command: HookCommands::Install }));
    }

    #[test]
    fn cli_parses_hook_uninstall() {
        let cli = Cli::try_parse_from(["commit-lint", "hook", "uninstall"]).unwrap();
        assert!(matches!(cli.command, Commands::Hook { command: HookCommands::Uninstall }));
    }

    #[test]
    fn hook_script_contains_marker() {
        assert!(HOOK_SCRIPT.contains(HOOK_MARKER));
    }

    #[test]
    fn hook_script_skips_when_message_provided() {
        assert!(HOOK_SCRIPT.contains("COMMIT_SOURCE"));
    }

    #[test]
    fn hook_script_guards_tty_before_prompting() {
        let guard = HOOK_SCRIPT.find("if ( exec < /dev/tty ) 2>/dev/null").unwrap();
        let prompt = HOOK_SCRIPT.find("commit-lint commit --write-to").unwrap();
        assert!(guard < prompt);
        assert!(!HOOK_SCRIPT.contains("\nexec < /dev/tty\n"));
    }

    #[test]
    fn hook_script_writes_to_message_file() {
        assert!(HOOK_SCRIPT.contains("command -v commit-lint"));
        assert!(HOOK_SCRIPT.contains("--write-to \"$COMMIT_MSG_FILE\""));
    }
}
