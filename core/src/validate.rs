//! Validator capability and the validation-failure contract.
//!
//! The constraint engine itself lives outside this crate: anything
//! implementing [`Validator`] can be injected into a
//! [`Mapper`](crate::Mapper). The adapter contract is atomic — either the
//! engine reports no violations, or the call fails with the complete
//! ordered [`Violation`] list, never a subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Instance;

/// A single constraint failure: which field path failed and why.
///
/// # Examples
///
/// ```
/// use datamap_core::Violation;
///
/// let violation = Violation::new("children[1].name", "must not be blank");
/// assert_eq!(violation.path, "children[1].name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path to the offending field (e.g. `children[1].name`).
    pub path: String,
    /// Human-readable constraint message.
    pub message: String,
}

impl Violation {
    /// Creates a violation for the given field path.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Injected constraint engine.
///
/// Implementations inspect a populated instance and return every
/// violation they find, in a stable order. Wrap a closure in
/// [`FnValidator`] for test and ad-hoc validators.
///
/// # Examples
///
/// ```
/// use datamap_core::{FnValidator, Instance, Validator, Violation};
///
/// let non_empty_name = FnValidator(|instance: &Instance| {
///     match instance.get("name").and_then(|v| v.as_str()) {
///         Some(name) if !name.is_empty() => Vec::new(),
///         _ => vec![Violation::new("name", "must not be blank")],
///     }
/// });
/// let engine: &dyn Validator = &non_empty_name;
/// ```
pub trait Validator {
    /// Returns all violations found on the instance; empty means valid.
    fn validate(&self, instance: &Instance) -> Vec<Violation>;
}

/// Adapts a closure into a [`Validator`].
pub struct FnValidator<F>(pub F);

impl<F> Validator for FnValidator<F>
where
    F: Fn(&Instance) -> Vec<Violation>,
{
    fn validate(&self, instance: &Instance) -> Vec<Violation> {
        (self.0)(instance)
    }
}

/// Validator that accepts every instance.
///
/// Useful when only the mapping half of the pipeline is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _instance: &Instance) -> Vec<Violation> {
        Vec::new()
    }
}

/// Raised when one or more declared constraints fail after a fill.
///
/// Carries the full ordered violation set; callers match on field path
/// and message. Nested shape failures surface through the same type,
/// unwrapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed with {} violation(s)", .violations.len())]
pub struct ValidationError {
    /// Every constraint failure reported by the engine, in order.
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Wraps a non-empty violation list.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::ShapeSchema;

    use super::*;

    #[test]
    fn test_fn_validator_adapts_closures() {
        let always_fails =
            FnValidator(|_: &Instance| vec![Violation::new("name", "must not be blank")]);
        let instance = Instance::new(&ShapeSchema::new("User"));

        let violations = always_fails.validate(&instance);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "name");
    }

    #[test]
    fn test_accept_all_reports_nothing() {
        let instance = Instance::new(&ShapeSchema::new("User"));
        assert!(AcceptAll.validate(&instance).is_empty());
    }

    #[test]
    fn test_error_display_counts_violations() {
        let error = ValidationError::new(vec![
            Violation::new("a", "x"),
            Violation::new("b", "y"),
        ]);
        assert_eq!(error.to_string(), "validation failed with 2 violation(s)");
    }
}
