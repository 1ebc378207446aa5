//! Host-facing result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One attribute that a plan would change.
///
/// `before` is `None` for an attribute being set for the first time and
/// `after` is `None` for one being cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub path: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl AttributeChange {
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }
}

impl From<AttributeChange> for crate::generated::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        let encode = |value: Option<Value>| {
            value
                .and_then(|v| serde_json::to_vec(&v).ok())
                .unwrap_or_default()
        };
        Self {
            path: change.path,
            before: encode(change.before),
            after: encode(change.after),
        }
    }
}

/// Outcome of planning one resource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub planned_state: Value,
    pub changes: Vec<AttributeChange>,
    pub requires_replace: bool,
}

impl PlanResult {
    /// Nothing to do; the planned state is `state`.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// State produced by importing an existing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub resource_type: String,
    pub state: Value,
}

impl ImportedResource {
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Names the provider serves, returned from `GetMetadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Whether the provider wants to be asked to plan destroys.
    pub plan_destroy: bool,
}

/// Version of the host protocol spoken by this binary.
pub const PROTOCOL_VERSION: u32 = 1;

/// First field of the handshake line printed on startup.
pub const HANDSHAKE_PREFIX: &str = "HEMMER_PROVIDER";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_to_proto_encodes_json() {
        let change = AttributeChange::new("label", Some(json!("old")), Some(json!("new")));
        let proto: crate::generated::AttributeChange = change.into();
        assert_eq!(proto.path, "label");
        assert_eq!(proto.before, b"\"old\"".to_vec());
        assert_eq!(proto.after, b"\"new\"".to_vec());
    }

    #[test]
    fn test_change_to_proto_leaves_absent_sides_empty() {
        let proto: crate::generated::AttributeChange =
            AttributeChange::new("users", None, Some(json!([1]))).into();
        assert!(proto.before.is_empty());
        assert_eq!(proto.after, b"[1]".to_vec());
    }

    #[test]
    fn test_plan_result() {
        let plan = PlanResult::no_change(json!({"id": "1"}));
        assert!(!plan.has_changes());
        assert!(!plan.requires_replace);
    }
}
