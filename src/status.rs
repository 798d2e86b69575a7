// src/status.rs
use std::fmt;
use std::path::Path;

/// Persistent indicator of which configuration the flow runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    /// Defaults, possibly with the global file.
    Global,
    /// A project `.commitrc` was read.
    WithProfile,
}

impl ProfileStatus {
    pub fn for_project(project: Option<&Path>) -> Self {
        match project {
            Some(_) => ProfileStatus::WithProfile,
            None => ProfileStatus::Global,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ProfileStatus::Global => "check",
            ProfileStatus::WithProfile => "check-all",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$({}) CommitLint", self.icon())
    }
}
