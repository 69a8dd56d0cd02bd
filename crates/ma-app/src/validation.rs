//! Field-level validation that blocks step completion.
//!
//! Validation errors never leave the section: they are reported to the host
//! for display and no update call is made.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// Letters, dot, comma, space and hyphen; at most 25 characters.
    static ref NAME_MASK: Regex = Regex::new(r"^[A-Za-z., -]{0,25}$").expect("name mask");

    /// Must not start with whitespace and must stay on one line.
    static ref SINGLE_LINE: Regex = Regex::new(r"^\S[^\r\n\t\f\v]*$").expect("single line mask");

    static ref ZIP_CODE: Regex = Regex::new(r"^\d{5}$").expect("zip code mask");
}

const EMAIL_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collects field errors for one step.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn name(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() || !NAME_MASK.is_match(value) {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn single_line(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !SINGLE_LINE.is_match(value) {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn zip_code(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !ZIP_CODE.is_match(value) {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        let value = value.trim();
        let well_formed = value
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
            .unwrap_or(false);
        if !well_formed || value.len() > EMAIL_MAX_LEN {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize, message: &str) -> &mut Self {
        if value.chars().count() < min {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}
