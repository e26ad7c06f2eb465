//! Field-level validation collector.
//!
//! # Responsibility
//! - Accumulate `(field, message)` pairs across many checks in one pass.
//! - Provide the error payload carried by `ResourceError::ValidationFailed`.
//!
//! # Invariants
//! - Checks never short-circuit; every violated field is reported.
//! - The first message recorded for a field wins; later ones are dropped.
//! - Iteration order is stable (sorted by field name).

use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Types that can check their own field-level rules.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Accumulated field errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Returns the message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names only; safe to log.
    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for FieldErrors {}

/// Collects field errors from a sequence of checks.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Records `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the collector, returning `Err` when anything was recorded.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Returns everything recorded so far, possibly empty.
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

/// Shared check: a string must be present and not exceed `max_bytes`.
pub(crate) fn check_required_text(v: &mut Validator, field: &str, value: &str, max_bytes: usize) {
    v.check(!value.is_empty(), field, "must be provided");
    v.check(
        value.len() <= max_bytes,
        field,
        format!("must not be more than {max_bytes} bytes long"),
    );
}

#[cfg(test)]
mod tests {
    use super::Validator;

    #[test]
    fn accumulates_distinct_fields_without_short_circuit() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(true, "sort", "invalid sort value");
        v.check(false, "page_size", "must be a maximum of 100");

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut v = Validator::new();
        v.add_error("name", "must be provided");
        v.add_error("name", "must not be more than 100 bytes long");

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.get("name"), Some("must be provided"));
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut v = Validator::new();
        v.add_error("email", "must be a valid email address");
        let errors = v.finish().unwrap_err();

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["email"], "must be a valid email address");
    }
}
