use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifies one running edit-account flow.
///
/// Each flow instance owns its own registry and variables; the id only tags
/// spans and lifecycle events so concurrent flows can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowSessionId(String);

impl_id!(FlowSessionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_session_ids_are_unique() {
        let a = FlowSessionId::new();
        let b = FlowSessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_flow_session_id_from_str() {
        let id: FlowSessionId = "flow-1".into();
        assert_eq!(id.as_str(), "flow-1");
        assert_eq!(id.to_string(), "flow-1");
    }
}
