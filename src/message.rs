// src/message.rs
use std::fmt;

use crate::steps::CommitState;

/// `type(scope): subject`, then body and footer as blank-line separated
/// paragraphs. Empty parts are left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitMessage<'a> {
    pub kind: &'a str,
    pub scope: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub footer: &'a str,
}

impl<'a> CommitMessage<'a> {
    /// `None` until a type has been chosen.
    pub fn from_state(state: &'a CommitState) -> Option<Self> {
        let kind = state.commit_type.as_ref()?;
        Some(Self {
            kind: &kind.label,
            scope: state.scope.as_deref().unwrap_or_default(),
            subject: state.subject.as_deref().unwrap_or_default(),
            body: state.body.as_deref().unwrap_or_default(),
            footer: state.footer.as_deref().unwrap_or_default(),
        })
    }
}

impl fmt::Display for CommitMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_empty() {
            write!(f, "{}: {}", self.kind, self.subject)?;
        } else {
            write!(f, "{}({}): {}", self.kind, self.scope, self.subject)?;
        }
        for section in [self.body, self.footer] {
            if !section.is_empty() {
                write!(f, "\n\n{}", section)?;
            }
        }
        Ok(())
    }
}

pub fn format_message(state: &CommitState) -> Option<String> {
    CommitMessage::from_state(state).map(|m| m.to_string())
}
