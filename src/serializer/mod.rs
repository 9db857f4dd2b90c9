//! Serializers: validated, bidirectional mapping between entities and their
//! flat JSON representation.
//!
//! Each entity has an explicit field list. Output goes through
//! `to_representation`; input goes through `validate`, which collects every
//! offending field into a [`ValidationErrors`] map instead of stopping at the
//! first problem.

pub mod booking_serializer;
pub mod fields;
pub mod listing_serializer;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub use booking_serializer::BookingData;
pub use listing_serializer::ListingData;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Per-field validation messages, keyed by field name.
///
/// Serializes as `{"field": ["message", ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding a single message for `field`.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Appends a message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns the messages recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `true` when no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the offending fields, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_messages_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("title", "This field is required.");
        errors.add("price_per_night", "A valid number is required.");
        errors.add("title", "second");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("title"),
            Some(&["This field is required.".to_string(), "second".to_string()][..])
        );
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["price_per_night", "title"]
        );
    }

    #[test]
    fn serializes_as_field_map() {
        let errors = ValidationErrors::single("user_email", "Enter a valid email address.");
        let json = serde_json::to_value(&errors).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({"user_email": ["Enter a valid email address."]})
        );
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("a", "one");
        errors.add("b", "two");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}
