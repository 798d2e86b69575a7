// src/commands/commit.rs
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::load;
use crate::error::Error;
use crate::flow::FlowOutcome;
use crate::git::{commit_with_message, get_repo_root};
use crate::message::format_message;
use crate::steps::collect;
use crate::terminal::TerminalHost;

/// Where a finished message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSink {
    Commit { all: bool },
    File(PathBuf),
    Stdout,
}

impl MessageSink {
    pub fn from_flags(all: bool, write_to: Option<PathBuf>, print: bool) -> Self {
        match (write_to, print) {
            (Some(path), _) => MessageSink::File(path),
            (None, true) => MessageSink::Stdout,
            (None, false) => MessageSink::Commit { all },
        }
    }

    pub fn deliver(&self, message: &str) -> Result<()> {
        match self {
            MessageSink::Commit { all } => {
                eprintln!("Committing...");
                let (out, err, ok) = commit_with_message(message, *all)?;
                eprintln!("{}{}", out, err);
                if !ok {
                    anyhow::bail!("Commit failed.");
                }
            }
            MessageSink::File(path) => {
                fs::write(path, format!("{}\n", message))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                debug!("Message written to {}", path.display());
            }
            MessageSink::Stdout => println!("{}", message),
        }
        Ok(())
    }
}

pub async fn cmd_commit(sink: MessageSink, delay: Duration) -> Result<()> {
    let root = get_repo_root().ok_or(Error::NoRepositoryRoot)?;
    let loaded = load(&root);
    info!("{}", loaded.status());

    let mut host = TerminalHost::new();
    let outcome = collect(&loaded.config, delay, &mut host, None).await?;
    if outcome.is_canceled() {
        eprintln!("Canceled.");
        return Ok(());
    }
    if let FlowOutcome::Completed(state) = outcome {
        let message = format_message(&state).context("No commit type was chosen")?;
        sink.deliver(&message)?;
    }
    Ok(())
}
