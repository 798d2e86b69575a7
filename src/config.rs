// src/config.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::status::ProfileStatus;
use crate::validate::{Field, FieldRules};

// =============================================================================
// FILE LOCATIONS
// =============================================================================
/// Project override files, looked up at the repository root in this order.
pub const PROJECT_CONFIG_FILES: &[&str] = &[".commitrc", ".commitrc.json"];
pub const GLOBAL_CONFIG_FILENAME: &str = ".commit-lint.toml";
pub const DEFAULT_TITLE: &str = "Create Git Commit Message";

pub fn global_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_FILENAME))
}

pub fn find_project_file(root: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

// =============================================================================
// SCHEMA
// =============================================================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitType {
    pub label: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl CommitType {
    pub fn new(label: &str, detail: &str) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
            visible: None,
        }
    }

    /// Absent counts as visible.
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }
}

/// Per-field display strings, used for both `title` and `placeholder`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Labels {
    fn overlay(&self, other: Option<&Labels>) -> Labels {
        let Some(other) = other else {
            return self.clone();
        };
        Labels {
            type_: other.type_.clone().or_else(|| self.type_.clone()),
            scope: other.scope.clone().or_else(|| self.scope.clone()),
            subject: other.subject.clone().or_else(|| self.subject.clone()),
            body: other.body.clone().or_else(|| self.body.clone()),
            footer: other.footer.clone().or_else(|| self.footer.clone()),
        }
    }

    pub fn for_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Scope => self.scope.as_deref(),
            Field::Subject => self.subject.as_deref(),
            Field::Body => self.body.as_deref(),
            Field::Footer => self.footer.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    pub scope_empty: bool,
    pub subject_empty: bool,
    pub body_empty: bool,
    pub footer_empty: bool,

    pub scope_max_length: usize,
    pub scope_min_length: usize,
    pub subject_max_length: usize,
    pub subject_min_length: usize,
    pub body_max_length: usize,
    pub body_min_length: usize,
    pub footer_max_length: usize,
    pub footer_min_length: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            scope_empty: true,
            subject_empty: false,
            body_empty: true,
            footer_empty: true,
            scope_max_length: 20,
            scope_min_length: 0,
            subject_max_length: 72,
            subject_min_length: 3,
            body_max_length: 500,
            body_min_length: 0,
            footer_max_length: 200,
            footer_min_length: 0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesOverride {
    pub scope_empty: Option<bool>,
    pub subject_empty: Option<bool>,
    pub body_empty: Option<bool>,
    pub footer_empty: Option<bool>,

    pub scope_max_length: Option<usize>,
    pub scope_min_length: Option<usize>,
    pub subject_max_length: Option<usize>,
    pub subject_min_length: Option<usize>,
    pub body_max_length: Option<usize>,
    pub body_min_length: Option<usize>,
    pub footer_max_length: Option<usize>,
    pub footer_min_length: Option<usize>,
}

impl Rules {
    pub fn field(&self, field: Field) -> FieldRules {
        let (empty, min_length, max_length) = match field {
            Field::Scope => (self.scope_empty, self.scope_min_length, self.scope_max_length),
            Field::Subject => (self.subject_empty, self.subject_min_length, self.subject_max_length),
            Field::Body => (self.body_empty, self.body_min_length, self.body_max_length),
            Field::Footer => (self.footer_empty, self.footer_min_length, self.footer_max_length),
        };
        FieldRules { empty, min_length, max_length }
    }

    fn overlay(&self, other: Option<&RulesOverride>) -> Rules {
        let Some(o) = other else {
            return *self;
        };
        Rules {
            scope_empty: o.scope_empty.unwrap_or(self.scope_empty),
            subject_empty: o.subject_empty.unwrap_or(self.subject_empty),
            body_empty: o.body_empty.unwrap_or(self.body_empty),
            footer_empty: o.footer_empty.unwrap_or(self.footer_empty),
            scope_max_length: o.scope_max_length.unwrap_or(self.scope_max_length),
            scope_min_length: o.scope_min_length.unwrap_or(self.scope_min_length),
            subject_max_length: o.subject_max_length.unwrap_or(self.subject_max_length),
            subject_min_length: o.subject_min_length.unwrap_or(self.subject_min_length),
            body_max_length: o.body_max_length.unwrap_or(self.body_max_length),
            body_min_length: o.body_min_length.unwrap_or(self.body_min_length),
            footer_max_length: o.footer_max_length.unwrap_or(self.footer_max_length),
            footer_min_length: o.footer_min_length.unwrap_or(self.footer_min_length),
        }
    }
}

/// The effective configuration the flow runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitrc {
    pub title: Labels,
    pub placeholder: Labels,
    pub types: Vec<CommitType>,
    pub rules: Rules,
    pub ignore_focus_out: bool,
}

impl Default for Commitrc {
    fn default() -> Self {
        let label = |s: &str| Some(s.to_string());
        Self {
            title: Labels {
                type_: label("Commit type"),
                scope: label("Commit scope"),
                subject: label("Commit subject"),
                body: label("Commit body"),
                footer: label("Commit footer"),
            },
            placeholder: Labels {
                type_: label("Pick a type of this commit"),
                scope: label("Affected module or area (optional)"),
                subject: label("Short imperative summary of the change"),
                body: label("Motivation and contrast with previous behavior"),
                footer: label("Breaking changes or closed issues, e.g. Closes #123"),
            },
            types: vec![
                CommitType::new("feat", "A new feature"),
                CommitType::new("fix", "A bug fix"),
                CommitType::new("docs", "Documentation only changes"),
                CommitType::new("style", "Formatting, white-space, missing semicolons"),
                CommitType::new("refactor", "A change that neither fixes a bug nor adds a feature"),
                CommitType::new("perf", "A change that improves performance"),
                CommitType::new("test", "Adding or correcting tests"),
                CommitType::new("build", "Build system or external dependency changes"),
                CommitType::new("ci", "CI configuration changes"),
                CommitType::new("chore", "Other changes that don't modify src or test files"),
                CommitType::new("revert", "Reverts a previous commit"),
            ],
            rules: Rules::default(),
            ignore_focus_out: true,
        }
    }
}

impl Commitrc {
    pub fn visible_types(&self) -> Vec<&CommitType> {
        self.types.iter().filter(|t| t.is_visible()).collect()
    }

    pub fn title_for(&self, field: Option<Field>) -> String {
        let title = match field {
            None => self.title.type_.as_deref(),
            Some(f) => self.title.for_field(f),
        };
        title.unwrap_or(DEFAULT_TITLE).to_string()
    }

    pub fn placeholder_for(&self, field: Option<Field>) -> Option<String> {
        match field {
            None => self.placeholder.type_.clone(),
            Some(f) => self.placeholder.for_field(f).map(str::to_string),
        }
    }
}

/// A global or project file: every key optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitrcOverride {
    pub title: Option<Labels>,
    pub placeholder: Option<Labels>,
    pub types: Option<Vec<CommitType>>,
    pub rules: Option<RulesOverride>,
    pub ignore_focus_out: Option<bool>,
}

impl CommitrcOverride {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.placeholder.is_none()
            && self.types.is_none()
            && self.rules.is_none()
            && self.ignore_focus_out.is_none()
    }

    /// `.toml` files are TOML, everything else is JSON.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, Error> {
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let parsed = if is_toml {
            toml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(|reason| Error::ConfigParse {
            path: path.to_path_buf(),
            reason,
        })
    }
}

// =============================================================================
// MERGE
// =============================================================================
pub fn merge(default: &Commitrc, over: Option<&CommitrcOverride>) -> Commitrc {
    let Some(over) = over.filter(|o| !o.is_empty()) else {
        return default.clone();
    };

    let types = match over.types.as_deref() {
        Some(types) if !types.is_empty() => merge_types(&default.types, types),
        _ => default.types.clone(),
    };

    Commitrc {
        title: default.title.overlay(over.title.as_ref()),
        placeholder: default.placeholder.overlay(over.placeholder.as_ref()),
        types,
        rules: default.rules.overlay(over.rules.as_ref()),
        ignore_focus_out: over.ignore_focus_out.unwrap_or(default.ignore_focus_out),
    }
}

/// Keyed by label in first-insertion order: a later entry replaces an
/// earlier one in place, unknown labels append. Hidden entries are dropped
/// after merging.
pub fn merge_types(origin: &[CommitType], source: &[CommitType]) -> Vec<CommitType> {
    let mut merged: Vec<CommitType> = Vec::with_capacity(origin.len() + source.len());
    for item in origin.iter().chain(source) {
        match merged.iter_mut().find(|m| m.label == item.label) {
            Some(slot) => *slot = item.clone(),
            None => merged.push(item.clone()),
        }
    }
    merged.retain(CommitType::is_visible);
    merged
}

// =============================================================================
// LOADING
// =============================================================================
pub struct LoadedConfig {
    pub config: Commitrc,
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl LoadedConfig {
    pub fn status(&self) -> ProfileStatus {
        ProfileStatus::for_project(self.project.as_deref())
    }
}

pub fn load(root: &Path) -> LoadedConfig {
    load_from(root, global_path().as_deref())
}

/// Defaults, then the global file, then the project file. A file that
/// cannot be read or parsed is reported once and skipped.
pub fn load_from(root: &Path, global: Option<&Path>) -> LoadedConfig {
    let defaults = Commitrc::default();

    let global_override = global
        .filter(|p| p.is_file())
        .and_then(|p| read_or_warn(p).map(|o| (p.to_path_buf(), o)));
    let base = merge(&defaults, global_override.as_ref().map(|(_, o)| o));

    let project_override = find_project_file(root).and_then(|p| read_or_warn(&p).map(|o| (p, o)));

    match project_override {
        Some((path, over)) => {
            info!("Configuration file: {}", path.display());
            LoadedConfig {
                config: merge(&base, Some(&over)),
                global: global_override.map(|(p, _)| p),
                project: Some(path),
            }
        }
        None => {
            info!("No project configuration read, using global configuration");
            LoadedConfig {
                config: base,
                global: global_override.map(|(p, _)| p),
                project: None,
            }
        }
    }
}

fn read_or_warn(path: &Path) -> Option<CommitrcOverride> {
    match CommitrcOverride::from_file(path) {
        Ok(over) => Some(over),
        Err(e) => {
            if let Error::ConfigParse { reason, .. } = &e {
                debug!("{}", reason);
            }
            warn!("{}", e);
            None
        }
    }
}
