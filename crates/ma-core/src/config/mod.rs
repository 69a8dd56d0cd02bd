//! # Flow configuration DTO
//!
//! Maps a parsed TOML document onto [`FlowConfig`]. Missing keys fall back to
//! the built-in defaults; values that are present are taken as they are.

use std::path::PathBuf;

use crate::designation::{DesignationTable, SelectListItem};
use crate::ports::PasswordChangeConfig;

const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// User-facing copy produced by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMessages {
    pub saved: String,
    pub validated_access: String,
    pub not_validated: String,
    pub password_updated: String,
    pub generic_error: String,
}

impl Default for FlowMessages {
    fn default() -> Self {
        Self {
            saved: "Your changes have been saved.".to_string(),
            validated_access: "We have verified your license information. \
                You now have full access to professional resources, including sample ordering \
                (subject to availability and eligibility)."
                .to_string(),
            not_validated: "Unfortunately, we were unable to verify the license information you provided. \
                To access resources offered exclusively to verified healthcare professionals, \
                including sample ordering (subject to availability and eligibility), \
                please update your Last Name and/or license information, \
                or call us at 1-800-505-4426 for further assistance."
                .to_string(),
            password_updated: "Your password has been updated.".to_string(),
            generic_error: "An error occurred. Please try again later.".to_string(),
        }
    }
}

impl FlowMessages {
    /// Success copy for a profile update.
    pub fn profile_saved(&self, became_validated: bool) -> String {
        if became_validated {
            format!("{}\n{}", self.saved, self.validated_access)
        } else {
            self.saved.clone()
        }
    }
}

/// Flow configuration (pure data).
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub messages: FlowMessages,
    pub password: PasswordChangeConfig,
    pub password_min_length: usize,
    pub designations: DesignationTable,
    /// Directory for rolling log files; `None` logs to stdout only.
    pub log_dir: Option<PathBuf>,
    /// JSON fixture seeding the in-memory auth service.
    pub fixture_path: Option<PathBuf>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            messages: FlowMessages::default(),
            password: PasswordChangeConfig::default(),
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            designations: DesignationTable::us_default(),
            log_dir: None,
            fixture_path: None,
        }
    }
}

impl FlowConfig {
    /// Create a FlowConfig from a TOML value.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let message = |key: &str, fallback: String| {
            str_at(toml_value, "messages", key)
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        let messages = FlowMessages {
            saved: message("saved", defaults.messages.saved),
            validated_access: message("validated_access", defaults.messages.validated_access),
            not_validated: message("not_validated", defaults.messages.not_validated),
            password_updated: message("password_updated", defaults.messages.password_updated),
            generic_error: message("generic_error", defaults.messages.generic_error),
        };

        let password = match toml_value.get("password").and_then(|p| p.get("change")) {
            Some(value) => value.clone().try_into::<PasswordChangeConfig>()?,
            None => defaults.password,
        };

        let password_min_length = toml_value
            .get("password")
            .and_then(|p| p.get("min_length"))
            .and_then(|v| v.as_integer())
            .map(|v| v.max(0) as usize)
            .unwrap_or(defaults.password_min_length);

        let designations = match toml_value.get("designations") {
            Some(value) => {
                DesignationTable::new(value.clone().try_into::<Vec<SelectListItem>>()?)
            }
            None => defaults.designations,
        };

        Ok(Self {
            messages,
            password,
            password_min_length,
            designations,
            log_dir: str_at(toml_value, "logging", "dir").map(PathBuf::from),
            fixture_path: str_at(toml_value, "auth", "fixture_path").map(PathBuf::from),
        })
    }
}

fn str_at<'a>(value: &'a toml::Value, table: &str, key: &str) -> Option<&'a str> {
    value
        .get(table)
        .and_then(|t| t.get(key))
        .and_then(|v| v.as_str())
}
