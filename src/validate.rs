// src/validate.rs
use std::future::Future;
use std::time::Duration;

use tracing::debug;

pub const DEFAULT_VALIDATION_DELAY_MS: u64 = 1000;

// =============================================================================
// FIELDS & RULES
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Scope,
    Subject,
    Body,
    Footer,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Scope => "scope",
            Field::Subject => "subject",
            Field::Body => "body",
            Field::Footer => "footer",
        }
    }
}

/// Limits for one text field. `min_length <= max_length` is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    pub empty: bool,
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    /// The field was left empty and the rules forbid it. Carries no text.
    EmptyNotAllowed,
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Text to show next to the input, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Invalid(message) => Some(message),
            ValidationOutcome::Valid | ValidationOutcome::EmptyNotAllowed => None,
        }
    }
}

// =============================================================================
// CHECKS
// =============================================================================

/// Emptiness first, then the maximum (inclusive, so `len == max` fails),
/// then the minimum.
pub fn check(text: &str, rules: &FieldRules) -> ValidationOutcome {
    if text.is_empty() {
        return if rules.empty {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::EmptyNotAllowed
        };
    }

    let len = text.chars().count();
    if len >= rules.max_length {
        return ValidationOutcome::Invalid(format!(
            "Sorry, too many characters. ({}/{})",
            len, rules.max_length
        ));
    }
    if len < rules.min_length {
        return ValidationOutcome::Invalid(format!(
            "Enter at least {} characters.",
            rules.min_length
        ));
    }
    ValidationOutcome::Valid
}

#[derive(Debug, Clone)]
pub struct Validator {
    field: Field,
    rules: FieldRules,
    delay: Duration,
}

impl Validator {
    pub fn new(field: Field, rules: FieldRules, delay: Duration) -> Self {
        Self { field, rules, delay }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Resolves after the configured delay. The returned future owns its
    /// input so callers can keep several in flight at once.
    pub fn validate(&self, text: String) -> impl Future<Output = ValidationOutcome> + Send + 'static {
        let Validator { field, rules, delay } = self.clone();
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = check(&text, &rules);
            debug!(field = field.name(), len = text.chars().count(), ?outcome, "validated");
            outcome
        }
    }
}

// =============================================================================
// MODULE TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn rules(empty: bool, min_length: usize, max_length: usize) -> FieldRules {
        FieldRules { empty, min_length, max_length }
    }

    #[test]
    fn empty_is_checked_before_lengths() {
        let r = rules(false, 2, 5);
        assert_eq!(check("", &r), ValidationOutcome::EmptyNotAllowed);
    }

    #[test]
    fn empty_allowed_skips_length_rules() {
        let r = rules(true, 3, 10);
        assert_eq!(check("", &r), ValidationOutcome::Valid);
    }

    #[test]
    fn max_length_is_inclusive() {
        let r = rules(false, 1, 10);
        let outcome = check(&"x".repeat(10), &r);
        assert_eq!(
            outcome,
            ValidationOutcome::Invalid("Sorry, too many characters. (10/10)".into())
        );
        assert_eq!(check(&"x".repeat(9), &r), ValidationOutcome::Valid);
    }

    #[test]
    fn max_is_checked_before_min() {
        // Inverted limits: the maximum message wins.
        let r = rules(false, 20, 3);
        assert!(check("abcd", &r).message().unwrap().starts_with("Sorry, too many"));
    }

    #[test]
    fn min_length_is_exclusive() {
        let r = rules(false, 3, 10);
        assert_eq!(
            check("ab", &r),
            ValidationOutcome::Invalid("Enter at least 3 characters.".into())
        );
        assert_eq!(check("abc", &r), ValidationOutcome::Valid);
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let r = rules(false, 1, 4);
        assert_eq!(check("äöü", &r), ValidationOutcome::Valid);
    }

    #[test]
    fn whitespace_is_not_empty() {
        let r = rules(false, 1, 10);
        assert_eq!(check(" ", &r), ValidationOutcome::Valid);
    }

    #[test]
    fn only_invalid_carries_a_message() {
        assert_eq!(ValidationOutcome::Valid.message(), None);
        assert_eq!(ValidationOutcome::EmptyNotAllowed.message(), None);
        assert_eq!(ValidationOutcome::Invalid("no".into()).message(), Some("no"));
        assert!(!ValidationOutcome::EmptyNotAllowed.is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn validate_waits_for_the_delay() {
        let validator = Validator::new(Field::Subject, rules(false, 1, 50), Duration::from_secs(1));
        let start = tokio::time::Instant::now();
        let outcome = validator.validate("add parser".into()).await;
        assert!(outcome.is_valid());
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn validate_without_delay_resolves_immediately() {
        let validator = Validator::new(Field::Scope, rules(false, 1, 5), Duration::ZERO);
        assert_eq!(validator.validate(String::new()).await, ValidationOutcome::EmptyNotAllowed);
        assert_eq!(validator.field(), Field::Scope);
    }
}
