//! Concrete form field widgets.
//!
//! Each widget holds its live value behind a lock and announces itself to
//! the flow's registry when mounted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ma_core::tunnel::{FieldHandle, FieldKind, FieldMetadata, FieldValue};

use crate::context::FlowContext;

pub struct FormField {
    name: String,
    metadata: FieldMetadata,
    value: Mutex<FieldValue>,
    disabled: AtomicBool,
}

impl FormField {
    fn build(name: &str, metadata: FieldMetadata, initial: FieldValue) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            metadata,
            value: Mutex::new(initial),
            disabled: AtomicBool::new(false),
        })
    }

    pub fn text(name: &str, label: &str) -> Arc<Self> {
        Self::build(
            name,
            FieldMetadata::new(FieldKind::Text, label).required(),
            FieldValue::Text(String::new()),
        )
    }

    pub fn email(name: &str, label: &str) -> Arc<Self> {
        Self::build(
            name,
            FieldMetadata::new(FieldKind::Email, label).required(),
            FieldValue::Text(String::new()),
        )
    }

    pub fn select(name: &str, label: &str) -> Arc<Self> {
        Self::build(
            name,
            FieldMetadata::new(FieldKind::Select, label).required(),
            FieldValue::Selection(String::new()),
        )
    }

    pub fn checkbox(name: &str, label: &str) -> Arc<Self> {
        Self::build(
            name,
            FieldMetadata::new(FieldKind::Checkbox, label),
            FieldValue::Toggle(false),
        )
    }

    pub fn password(name: &str, label: &str) -> Arc<Self> {
        Self::build(
            name,
            FieldMetadata::new(FieldKind::Password, label).required(),
            FieldValue::Secret(String::new()),
        )
    }

    /// Composite license input: number plus issuing authority (`DEA` or a state).
    pub fn license(name: &str, label: &str) -> Arc<Self> {
        Self::build(
            name,
            FieldMetadata::new(FieldKind::License, label),
            FieldValue::License {
                number: String::new(),
                issuing_authority: String::new(),
            },
        )
    }

    pub fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    /// Replace the live value.
    pub fn set_value(&self, value: FieldValue) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Set the value from text, keeping the widget's kind.
    ///
    /// Checkboxes accept `true`/`on`; a license keeps its issuing authority.
    pub fn set_text(&self, text: &str) {
        let mut guard = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        let next = match &*guard {
            FieldValue::Text(_) => FieldValue::Text(text.to_string()),
            FieldValue::Selection(_) => FieldValue::Selection(text.to_string()),
            FieldValue::Secret(_) => FieldValue::Secret(text.to_string()),
            FieldValue::Toggle(_) => FieldValue::Toggle(matches!(text, "true" | "on")),
            FieldValue::License {
                issuing_authority, ..
            } => FieldValue::License {
                number: text.to_string(),
                issuing_authority: issuing_authority.clone(),
            },
        };
        *guard = next;
    }

    /// Register under this widget's name in the flow registry.
    pub fn mount(self: &Arc<Self>, ctx: &FlowContext) -> bool {
        let handle: Arc<dyn FieldHandle> = self.clone();
        let metadata = self.metadata.clone();
        ctx.with_tunnel(|tunnel| tunnel.register_handle(handle, metadata))
    }

    pub fn unmount(&self, ctx: &FlowContext) {
        ctx.with_tunnel(|tunnel| tunnel.unregister(&self.name));
    }
}

impl FieldHandle for FormField {
    fn name(&self) -> &str {
        &self.name
    }

    fn current(&self) -> FieldValue {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn clear(&self) {
        let mut guard = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.cleared();
    }
}

impl std::fmt::Debug for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self.current() {
            FieldValue::Secret(_) => "[REDACTED]".to_string(),
            other => other.as_text(),
        };
        f.debug_struct("FormField")
            .field("name", &self.name)
            .field("kind", &self.metadata.kind)
            .field("value", &value)
            .field("disabled", &self.is_disabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounted_field_is_read_live() {
        let ctx = FlowContext::new();
        let field = FormField::text("givenName", "First name");
        assert!(field.mount(&ctx));

        field.set_text("Ada");
        assert_eq!(ctx.get_value("givenName"), "Ada");

        field.unmount(&ctx);
        assert_eq!(ctx.get_value("givenName"), "");
    }

    #[test]
    fn set_text_keeps_license_authority() {
        let field = FormField::license("hcpId", "License");
        field.set_value(FieldValue::License {
            number: "1".into(),
            issuing_authority: "DEA".into(),
        });
        field.set_text("AB1234563");
        assert_eq!(
            field.current(),
            FieldValue::License {
                number: "AB1234563".into(),
                issuing_authority: "DEA".into()
            }
        );
    }

    #[test]
    fn checkbox_parses_on() {
        let field = FormField::checkbox("marketing_consent", "Marketing");
        field.set_text("on");
        assert_eq!(field.current(), FieldValue::Toggle(true));
        field.clear();
        assert_eq!(field.current(), FieldValue::Toggle(false));
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let field = FormField::password("oldPassword", "Current password");
        field.set_text("hunter22");
        assert!(!format!("{:?}", field).contains("hunter22"));
    }
}
