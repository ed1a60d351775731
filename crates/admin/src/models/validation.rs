//! Input validation shared by route handlers and dashboard forms.
//!
//! Request bodies deserialize into lenient `*Input` types (every field
//! optional) and are then checked into strict `*Draft` types. The first
//! failing field wins, and its message is what the caller sees in the
//! 400 response body.

use thiserror::Error;

/// A missing or malformed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: &'static str,
}

impl ValidationError {
    /// Create a validation error with a user-facing message.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }

    /// The user-facing message, e.g. "Name is required".
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

/// Conversion from a lenient request body into a validated draft.
pub trait Validate {
    /// The strict type produced on success.
    type Draft;

    /// Check required fields in order and build the draft.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    fn validate(&self) -> Result<Self::Draft, ValidationError>;
}

/// Require a non-blank string field.
///
/// # Errors
///
/// Returns `ValidationError` with `message` if the value is absent or blank.
pub fn require_text(
    value: Option<&String>,
    message: &'static str,
) -> Result<String, ValidationError> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ValidationError::new(message)),
    }
}

/// Require a non-blank identifier field.
///
/// # Errors
///
/// Returns `ValidationError` with `message` if the id is absent or blank.
pub fn require_id<T>(value: Option<&T>, message: &'static str) -> Result<T, ValidationError>
where
    T: AsRef<str> + Clone,
{
    match value {
        Some(id) if !id.as_ref().trim().is_empty() => Ok(id.clone()),
        _ => Err(ValidationError::new(message)),
    }
}

/// Treat blank optional identifiers as absent.
#[must_use]
pub fn optional_id<T>(value: Option<&T>) -> Option<T>
where
    T: AsRef<str> + Clone,
{
    value.filter(|id| !id.as_ref().trim().is_empty()).cloned()
}

/// Treat blank optional text as absent.
#[must_use]
pub fn optional_text(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storedash_core::ColorId;

    #[test]
    fn test_require_text_trims() {
        let value = "  Red ".to_string();
        assert_eq!(require_text(Some(&value), "Name is required"), Ok("Red".to_string()));
    }

    #[test]
    fn test_require_text_rejects_blank() {
        let blank = "   ".to_string();
        let err = require_text(Some(&blank), "Name is required");
        assert_eq!(err.map_err(|e| e.message()), Err("Name is required"));
        assert!(require_text(None, "Name is required").is_err());
    }

    #[test]
    fn test_optional_id_drops_blank() {
        let blank = ColorId::new("");
        assert_eq!(optional_id(Some(&blank)), None);
        let id = ColorId::new("color1");
        assert_eq!(optional_id(Some(&id)), Some(ColorId::new("color1")));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(&" ".to_string())), None);
        assert_eq!(optional_text(Some(&"Soft".to_string())).as_deref(), Some("Soft"));
    }
}
