// src/error.rs
use std::io;
use std::path::PathBuf;

/// Failures the commands classify before handing them to `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not a git repository")]
    NotARepository,

    #[error("Could not locate the repository root. Is this a bare repository?")]
    NoRepositoryRoot,

    #[error("Could not read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Check The File {} Field.", .path.display())]
    ConfigParse { path: PathBuf, reason: String },
}
