use serde::Serialize;

use crate::domain::{format_cents, Cents, MAX_AMOUNT_CENTS};

use super::AppError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A single field constraint violation, reported to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Accumulates field errors so a caller sees every violated constraint at
/// once instead of fixing them one round-trip at a time.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required text field with a maximum length.
    pub fn require_text(&mut self, field: &'static str, value: &str, max_len: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "must not be empty".to_string());
        } else if value.chars().count() > max_len {
            self.push(field, format!("must be at most {} characters", max_len));
        }
        self
    }

    /// Optional text field with a maximum length.
    pub fn optional_text(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        max_len: usize,
    ) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max_len {
                self.push(field, format!("must be at most {} characters", max_len));
            }
        }
        self
    }

    /// Fixed-point amount: two decimal places, at most four integer digits.
    pub fn amount(&mut self, field: &'static str, cents: Cents) -> &mut Self {
        if cents.abs() > MAX_AMOUNT_CENTS {
            self.push(
                field,
                format!("must be within ±{}", format_cents(MAX_AMOUNT_CENTS)),
            );
        }
        self
    }

    fn push(&mut self, field: &'static str, message: String) {
        self.errors.push(FieldError { field, message });
    }

    /// Succeeds iff no constraint was violated.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
