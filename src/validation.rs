//! Configuration validation against a [`Schema`].
//!
//! # Example
//!
//! ```
//! use mayanedms_provider::schema::{Attribute, Schema};
//! use mayanedms_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("label", Attribute::required_string())
//!     .with_attribute(
//!         "delete_time_unit",
//!         Attribute::optional_string().with_allowed_values(&["minutes", "hours", "days"]),
//!     );
//!
//! assert!(validate(&schema, &json!({"label": "Invoice"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"label": "Invoice", "delete_time_unit": "weeks"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute.as_deref(), Some("delete_time_unit"));
//! ```

use std::collections::HashSet;

use serde_json::Value;

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};

/// Validate a configuration object against a schema.
///
/// - Required attributes must be present and non-null
/// - Computed-only attributes must not be set
/// - Attributes unknown to the schema are rejected
/// - Values must match the declared type and, if any, the allowed values
/// - Set members must be unique
///
/// A `null` configuration is checked as an empty object.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let empty = serde_json::Map::new();
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(other))),
            );
            return diagnostics;
        }
    };

    for (name, attr) in &schema.block.attributes {
        validate_attribute(name, attr, obj.get(name), &mut diagnostics);
    }

    for name in obj.keys() {
        if !schema.block.attributes.contains_key(name) {
            diagnostics.push(
                Diagnostic::error(format!("Unsupported attribute '{}'", name))
                    .with_detail("This attribute is not expected here")
                    .with_attribute(name.as_str()),
            );
        }
    }

    diagnostics
}

/// Like [`validate`], but as a `Result`.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a configuration is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    path: &str,
    attr: &Attribute,
    value: Option<&Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let computed_only = attr.flags.computed && !attr.flags.optional && !attr.flags.required;

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(_) if computed_only => {
            diagnostics.push(
                Diagnostic::error(format!("Attribute '{}' cannot be set", path))
                    .with_detail("This value is computed by the provider")
                    .with_attribute(path),
            );
        }
        Some(v) => {
            if validate_type(&attr.attr_type, v, path, diagnostics) {
                validate_allowed(attr, v, path, diagnostics);
            }
        }
    }
}

/// Returns whether the value had the right type.
fn validate_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let ok = match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Int64 => is_int64(value),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Set(element_type) => {
            let Some(items) = value.as_array() else {
                diagnostics.push(type_error(path, "set", value));
                return false;
            };
            let mut all_ok = true;
            let mut seen = HashSet::new();
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                if !validate_type(element_type, item, &item_path, diagnostics) {
                    all_ok = false;
                    continue;
                }
                if !seen.insert(item.to_string()) {
                    diagnostics.push(
                        Diagnostic::error(format!("Duplicate set element in '{}'", path))
                            .with_detail(format!("{} appears more than once", item))
                            .with_attribute(path),
                    );
                    all_ok = false;
                }
            }
            return all_ok;
        }
    };

    if !ok {
        let expected = match attr_type {
            AttributeType::String => "string",
            AttributeType::Int64 => "int64",
            AttributeType::Bool => "bool",
            AttributeType::Set(_) => "set",
        };
        diagnostics.push(type_error(path, expected, value));
    }
    ok
}

fn validate_allowed(
    attr: &Attribute,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.allowed_values.is_empty() || attr.allowed_values.contains(value) {
        return;
    }
    let expected: Vec<String> = attr.allowed_values.iter().map(|v| v.to_string()).collect();
    diagnostics.push(
        Diagnostic::error(format!("Invalid value for attribute '{}'", path))
            .with_detail(format!(
                "Expected one of [{}], got {}",
                expected.join(", "),
                value
            ))
            .with_attribute(path),
    );
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64()
                || n.as_f64().is_some_and(|f| {
                    f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
                })
        }
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("users", Attribute::optional_int_set())
    }

    #[test]
    fn test_validate_required_string() {
        let diagnostics = validate(&group_schema(), &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("name"));
        assert!(diagnostics[0].summary.contains("Missing required"));

        let diagnostics = validate(&group_schema(), &json!({"name": null}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_null_config_reports_required() {
        let diagnostics = validate(&group_schema(), &Value::Null);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("name"));
    }

    #[test]
    fn test_validate_computed_cannot_be_set() {
        let diagnostics = validate(&group_schema(), &json!({"name": "editors", "id": "4"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("cannot be set"));
    }

    #[test]
    fn test_validate_unknown_attribute() {
        let diagnostics = validate(&group_schema(), &json!({"name": "editors", "colour": "red"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("colour"));
    }

    #[test]
    fn test_validate_int64() {
        let schema = Schema::v0().with_attribute("interval", Attribute::required_int64());
        assert!(is_valid(&schema, &json!({"interval": 600})));
        assert!(is_valid(&schema, &json!({"interval": 600.0})));
        assert!(!is_valid(&schema, &json!({"interval": 1.5})));
        assert!(!is_valid(&schema, &json!({"interval": "600"})));
    }

    #[test]
    fn test_validate_set_elements_and_uniqueness() {
        let schema = group_schema();
        assert!(is_valid(&schema, &json!({"name": "g", "users": [1, 2, 3]})));

        let diagnostics = validate(&schema, &json!({"name": "g", "users": [1, "two"]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("users.1"));

        let diagnostics = validate(&schema, &json!({"name": "g", "users": [1, 1]}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Duplicate"));

        let diagnostics = validate(&schema, &json!({"name": "g", "users": 1}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_allowed_values() {
        let schema = Schema::v0().with_attribute(
            "uncompress",
            Attribute::optional_string().with_allowed_values(&["ask", "yes", "no"]),
        );
        assert!(is_valid(&schema, &json!({"uncompress": "yes"})));

        let diagnostics = validate(&schema, &json!({"uncompress": "maybe"}));
        assert_eq!(diagnostics.len(), 1);
        let detail = diagnostics[0].detail.as_deref().unwrap();
        assert!(detail.contains("\"ask\""));
        assert!(detail.contains("\"maybe\""));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let schema = Schema::v0()
            .with_attribute("label", Attribute::required_string())
            .with_attribute("color", Attribute::required_string());
        let diagnostics = validate(&schema, &json!({"label": 3}));
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_validate_result_helper() {
        let schema = group_schema();
        assert!(validate_result(&schema, &json!({"name": "g"})).is_ok());
        let err = validate_result(&schema, &json!({})).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_validate_root_not_object() {
        let diagnostics = validate(&group_schema(), &json!("nope"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
    }
}
