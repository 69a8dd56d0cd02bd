//! Field registry ("Tunnel") and flow-scoped form variables.
//!
//! Field widgets announce themselves here so the flow can read their live
//! values at step completion without knowing their concrete types.

pub mod field;
pub mod registry;
pub mod variables;

pub use field::{FieldHandle, FieldKind, FieldMetadata, FieldRegistration, FieldValue};
pub use registry::FormTunnel;
pub use variables::{FormValue, FormVariables, DISABLE_ACTION_BUTTON, HCP_VALIDATION_STATUS};
