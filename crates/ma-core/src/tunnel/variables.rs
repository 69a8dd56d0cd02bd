use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Disables the active step's primary action while set.
pub const DISABLE_ACTION_BUTTON: &str = "disableActionButton";
/// True once the signed-in user is a validated HCP.
pub const HCP_VALIDATION_STATUS: &str = "hcpValidationStatus";

pub type FormVariables = HashMap<String, FormValue>;

/// Value of a flow-scoped form variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Flag(bool),
    Text(String),
}

impl FormValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Flag(_) => None,
        }
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
