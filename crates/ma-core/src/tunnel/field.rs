use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Live value of a field, tagged by the kind of widget that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Text(String),
    Selection(String),
    Toggle(bool),
    Secret(String),
    License {
        number: String,
        issuing_authority: String,
    },
}

impl FieldValue {
    /// String form used by the registry's `get_value`.
    ///
    /// Toggles render as `"true"`/`"false"`; a license renders as its number.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(value) | Self::Selection(value) | Self::Secret(value) => value.clone(),
            Self::Toggle(checked) => checked.to_string(),
            Self::License { number, .. } => number.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Toggle(_) => false,
            other => other.as_text().is_empty(),
        }
    }

    /// The same kind of value with its content blanked.
    pub fn cleared(&self) -> Self {
        match self {
            Self::Text(_) => Self::Text(String::new()),
            Self::Selection(_) => Self::Selection(String::new()),
            Self::Toggle(_) => Self::Toggle(false),
            Self::Secret(_) => Self::Secret(String::new()),
            Self::License { .. } => Self::License {
                number: String::new(),
                issuing_authority: String::new(),
            },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Selection(_) => FieldKind::Select,
            Self::Toggle(_) => FieldKind::Checkbox,
            Self::Secret(_) => FieldKind::Password,
            Self::License { .. } => FieldKind::License,
        }
    }
}

/// Registration-time kind of a field widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Email,
    Select,
    Checkbox,
    Password,
    License,
}

/// Payload a field announces alongside its accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
}

impl FieldMetadata {
    pub fn new(kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Capability every registrable field exposes.
///
/// Implementations must read their value at call time; the registry never
/// caches a snapshot.
pub trait FieldHandle: Send + Sync {
    fn name(&self) -> &str;

    fn current(&self) -> FieldValue;

    fn value(&self) -> String {
        self.current().as_text()
    }

    fn is_disabled(&self) -> bool {
        false
    }

    fn set_disabled(&self, _disabled: bool) {}

    fn clear(&self) {}
}

/// A field as stored in the registry.
#[derive(Clone)]
pub struct FieldRegistration {
    pub name: String,
    pub accessor: Arc<dyn FieldHandle>,
    pub metadata: FieldMetadata,
}

impl FieldRegistration {
    pub fn value(&self) -> String {
        self.accessor.value()
    }
}

impl fmt::Debug for FieldRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistration")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("disabled", &self.accessor.is_disabled())
            .finish_non_exhaustive()
    }
}
