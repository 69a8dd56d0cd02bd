use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::field::{FieldHandle, FieldMetadata, FieldRegistration};
use super::variables::{FormValue, FormVariables};

/// Registry of mounted fields plus the flow's form variables.
///
/// Registrations are keyed by name and the last one for a name wins. The
/// variable map is independent of the registrations.
#[derive(Default)]
pub struct FormTunnel {
    fields: HashMap<String, FieldRegistration>,
    variables: FormVariables,
}

impl FormTunnel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the registration under `name`.
    ///
    /// Returns `false` when the registration was dropped for lacking a name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        accessor: Arc<dyn FieldHandle>,
        metadata: FieldMetadata,
    ) -> bool {
        let name = name.into();
        if name.is_empty() {
            info!("component registration attempted without name attribute, skipped");
            return false;
        }

        debug!(field = %name, kind = ?metadata.kind, "field registered");
        let registration = FieldRegistration {
            name: name.clone(),
            accessor,
            metadata,
        };
        self.fields.insert(name, registration);
        true
    }

    /// Register a handle under its own announced name.
    pub fn register_handle(&mut self, accessor: Arc<dyn FieldHandle>, metadata: FieldMetadata) -> bool {
        let name = accessor.name().to_string();
        self.register(name, accessor, metadata)
    }

    pub fn unregister(&mut self, name: &str) -> Option<FieldRegistration> {
        let removed = self.fields.remove(name);
        if removed.is_some() {
            debug!(field = %name, "field unregistered");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&FieldRegistration> {
        self.fields.get(name)
    }

    /// Live value of `name`, or an empty string when nothing is registered.
    pub fn get_value(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(FieldRegistration::value)
            .unwrap_or_default()
    }

    /// Every registration, sorted by name.
    pub fn registrations(&self) -> Vec<&FieldRegistration> {
        let mut all: Vec<_> = self.fields.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get_variable(&self, key: &str) -> Option<&FormValue> {
        self.variables.get(key)
    }

    /// Boolean view of a variable; unset and non-boolean values read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.variables
            .get(key)
            .and_then(FormValue::as_flag)
            .unwrap_or(false)
    }

    pub fn variables(&self) -> &FormVariables {
        &self.variables
    }

    /// Put `keys` back to their value in `snapshot`.
    ///
    /// A key absent from the snapshot is removed. Other variables are left
    /// as they are.
    pub fn restore_variables(&mut self, keys: &[&str], snapshot: &FormVariables) {
        for key in keys {
            match snapshot.get(*key) {
                Some(value) => {
                    self.variables.insert(key.to_string(), value.clone());
                }
                None => {
                    self.variables.remove(*key);
                }
            }
        }
    }

    /// Drop all registrations and variables at session teardown.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.variables.clear();
    }
}
