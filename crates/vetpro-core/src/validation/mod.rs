//! Form normalization and validation helpers.
//!
//! Forms are validated with `validator` derives. Every form trims its text fields and turns
//! blank optional fields into `None` before the checks run, so nothing partial reaches a gateway.

use std::borrow::Cow;

use chrono_tz::Tz;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

/// A user-facing form that turns into a validated gateway input.
pub trait FormInput: Validate + Sized {
    type Output;

    /// Trim text and collapse blank optional fields.
    fn normalize(&mut self);

    /// Build the output once the derived checks passed.
    fn build(self) -> Result<Self::Output, AppError>;

    fn into_input(mut self) -> Result<Self::Output, AppError> {
        self.normalize();
        self.validate()?;
        self.build()
    }
}

/// Trim a value and treat an empty result as absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_timezone(value: &str) -> Result<(), ValidationError> {
    value.parse::<Tz>().map(|_| ()).map_err(|_| {
        with_message(
            "timezone",
            format!("timezone '{}' is not a valid IANA timezone", value),
        )
    })
}

pub fn validate_currency(value: &str) -> Result<(), ValidationError> {
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(with_message(
            "currency",
            format!("currency '{}' must be a 3-letter code", value),
        ))
    }
}

fn with_message(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Join field errors into one blocking message, ordered by field name.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.clone(), message)
            })
        })
        .collect();
    messages.sort();
    messages
        .into_iter()
        .map(|(_, message)| message)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" juan@email.com ".to_string())),
            Some("juan@email.com".to_string())
        );
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("America/Argentina/Buenos_Aires").is_ok());
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Nowhere/City").is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("ARS").is_ok());
        assert!(validate_currency("AR").is_err());
        assert!(validate_currency("A$S").is_err());
    }

    #[test]
    fn test_describe_errors_is_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("timezone", with_message("timezone", "bad tz".to_string()));
        errors.add("currency", with_message("currency", "bad currency".to_string()));
        assert_eq!(describe_errors(&errors), "bad currency; bad tz");
    }
}
