//! Schema-driven planning.
//!
//! Every resource plans the same way, so the provider computes plans from
//! the schema alone:
//!
//! 1. omitted optional attributes get their schema default,
//! 2. computed attributes keep their prior value, or become `null` (unknown)
//!    on create and on replacement,
//! 3. attributes with diff suppression keep the prior value when the
//!    difference is suppressed,
//! 4. each remaining difference becomes an [`AttributeChange`], with sets
//!    compared as sets,
//! 5. a change to a `force_new` attribute marks the plan as a replacement.

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` (absent on create) to `proposed`
/// (`null` on destroy).
pub fn plan(
    schema: &Schema,
    prior: Option<&Value>,
    proposed: &Value,
) -> Result<PlanResult, ProviderError> {
    let prior = match prior {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(ProviderError::Validation(format!(
                "prior state must be an object, got {}",
                other
            )))
        }
    };

    let proposed = match proposed {
        Value::Null => return Ok(plan_destroy(prior)),
        Value::Object(map) => map,
        other => {
            return Err(ProviderError::Validation(format!(
                "proposed state must be an object, got {}",
                other
            )))
        }
    };

    let mut planned = proposed.clone();
    for (name, attr) in &schema.block.attributes {
        let current = non_null(planned.get(name));
        let before = prior.and_then(|p| non_null(p.get(name)));

        let value = if is_computed_only(attr) {
            before.cloned().unwrap_or(Value::Null)
        } else if current.is_none() {
            attr.default.clone().unwrap_or(Value::Null)
        } else {
            match (attr.diff_suppress, before, current) {
                (Some(suppress), Some(b), Some(c)) if suppress.suppresses(b, c) => b.clone(),
                _ => current.cloned().unwrap_or(Value::Null),
            }
        };
        planned.insert(name.clone(), value);
    }

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for (name, attr) in &schema.block.attributes {
        if is_computed_only(attr) {
            continue;
        }
        let before = prior.and_then(|p| non_null(p.get(name)));
        let after = non_null(planned.get(name));
        if values_equal(&attr.attr_type, before, after) {
            continue;
        }
        if prior.is_some() && attr.force_new {
            requires_replace = true;
        }
        changes.push(AttributeChange::new(
            name.clone(),
            before.cloned(),
            after.cloned(),
        ));
    }

    if requires_replace {
        for (name, attr) in &schema.block.attributes {
            if is_computed_only(attr) {
                planned.insert(name.clone(), Value::Null);
            }
        }
    }

    Ok(PlanResult::with_changes(
        Value::Object(planned),
        changes,
        requires_replace,
    ))
}

fn plan_destroy(prior: Option<&Map<String, Value>>) -> PlanResult {
    let changes = prior
        .into_iter()
        .flatten()
        .filter(|(_, v)| !v.is_null())
        .map(|(name, v)| AttributeChange::new(name.clone(), Some(v.clone()), None))
        .collect();
    PlanResult::with_changes(Value::Null, changes, false)
}

fn is_computed_only(attr: &Attribute) -> bool {
    attr.flags.computed && !attr.flags.optional && !attr.flags.required
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Sets are equal regardless of element order; an empty set equals an
/// absent one.
fn values_equal(attr_type: &AttributeType, a: Option<&Value>, b: Option<&Value>) -> bool {
    if attr_type.is_set() {
        return sorted_members(a) == sorted_members(b);
    }
    a == b
}

fn sorted_members(value: Option<&Value>) -> Vec<String> {
    let mut members: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(Value::to_string).collect(),
        Some(other) => vec![other.to_string()],
        None => Vec::new(),
    };
    members.sort();
    members.dedup();
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, DiffSuppress};
    use serde_json::json;

    fn node_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "expression",
                Attribute::required_string().with_diff_suppress(DiffSuppress::TrimSpace),
            )
            .with_attribute("enabled", Attribute::optional_bool().with_default(true))
            .with_attribute("index_id", Attribute::required_int64().with_force_new())
            .with_attribute("node_id", Attribute::computed_int64())
            .with_attribute("tags", Attribute::optional_int_set())
    }

    #[test]
    fn test_create_applies_defaults_and_unknowns() {
        let result = plan(
            &node_schema(),
            None,
            &json!({"expression": "{{ document.label }}", "index_id": 3}),
        )
        .unwrap();

        assert_eq!(result.planned_state["enabled"], json!(true));
        assert_eq!(result.planned_state["id"], Value::Null);
        assert_eq!(result.planned_state["node_id"], Value::Null);
        assert!(!result.requires_replace);

        let paths: Vec<_> = result.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["enabled", "expression", "index_id"]);
        assert!(result.changes.iter().all(|c| c.before.is_none()));
    }

    #[test]
    fn test_no_change_keeps_computed() {
        let prior = json!({
            "id": "3-8", "expression": "x", "enabled": true,
            "index_id": 3, "node_id": 8, "tags": [2, 1]
        });
        let proposed = json!({"id": null, "expression": "x", "index_id": 3, "tags": [1, 2]});

        let result = plan(&node_schema(), Some(&prior), &proposed).unwrap();
        assert!(result.changes.is_empty(), "{:?}", result.changes);
        assert_eq!(result.planned_state["id"], json!("3-8"));
        assert_eq!(result.planned_state["node_id"], json!(8));
    }

    #[test]
    fn test_whitespace_only_expression_change_suppressed() {
        let prior = json!({
            "id": "3-8",
            "expression": "{{ x }}",
            "enabled": true,
            "index_id": 3,
            "node_id": 8
        });
        let proposed = json!({"expression": "  {{ x }}\n", "enabled": true, "index_id": 3});

        let result = plan(&node_schema(), Some(&prior), &proposed).unwrap();
        assert!(result.changes.is_empty());
        assert_eq!(result.planned_state["expression"], json!("{{ x }}"));
    }

    #[test]
    fn test_force_new_change_replaces() {
        let prior = json!({
            "id": "3-8",
            "expression": "x",
            "enabled": true,
            "index_id": 3,
            "node_id": 8
        });
        let proposed = json!({"expression": "x", "enabled": true, "index_id": 4});

        let result = plan(&node_schema(), Some(&prior), &proposed).unwrap();
        assert!(result.requires_replace);
        assert_eq!(result.planned_state["id"], Value::Null);
        assert_eq!(result.planned_state["node_id"], Value::Null);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].before, Some(json!(3)));
        assert_eq!(result.changes[0].after, Some(json!(4)));
    }

    #[test]
    fn test_in_place_change() {
        let prior = json!({
            "id": "3-8",
            "expression": "x",
            "enabled": true,
            "index_id": 3,
            "node_id": 8
        });
        let proposed = json!({"expression": "x", "enabled": false, "index_id": 3});

        let result = plan(&node_schema(), Some(&prior), &proposed).unwrap();
        assert!(!result.requires_replace);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].path, "enabled");
    }

    #[test]
    fn test_destroy() {
        let prior = json!({
            "id": "3-8",
            "expression": "x",
            "enabled": true,
            "index_id": 3,
            "node_id": null
        });
        let result = plan(&node_schema(), Some(&prior), &Value::Null).unwrap();
        assert_eq!(result.planned_state, Value::Null);
        assert_eq!(result.changes.len(), 4);
        assert!(result.changes.iter().all(|c| c.after.is_none()));
    }

    #[test]
    fn test_rejects_non_object_proposed() {
        assert!(plan(&node_schema(), None, &json!("x")).is_err());
    }
}
