//! Per-operation attribute state.
//!
//! The host hands every operation plain JSON objects. [`ResourceData`] wraps
//! one of them as an explicit attribute map plus identifier, keeps the prior
//! state alongside when there is one, and offers typed access so handlers
//! never index raw JSON.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::composite_id::CompositeId;
use crate::error::ProviderError;
use crate::reconcile::SetDiff;

/// Name of the identifier attribute present on every resource.
pub const ID_KEY: &str = "id";

/// Attribute values for one resource instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    attrs: Map<String, Value>,
    prior: Option<Map<String, Value>>,
}

impl ResourceData {
    /// An empty instance with no identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a state or config object. `null` yields an empty instance.
    pub fn from_state(state: Value) -> Result<Self, ProviderError> {
        let mut attrs = into_object(state)?;
        let id = match attrs.remove(ID_KEY) {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Ok(Self {
            id,
            attrs,
            prior: None,
        })
    }

    /// Wrap `planned` and remember `prior` so set changes can be diffed.
    ///
    /// The identifier is taken from `prior` when `planned` carries none.
    pub fn with_prior(planned: Value, prior: Value) -> Result<Self, ProviderError> {
        let mut data = Self::from_state(planned)?;
        let prior = Self::from_state(prior)?;
        if data.id.is_none() {
            data.id = prior.id;
        }
        data.prior = Some(prior.attrs);
        Ok(data)
    }

    /// The stored identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl ToString) {
        self.id = Some(id.to_string());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// The identifier as a plain integer.
    pub fn numeric_id(&self) -> Result<i64, ProviderError> {
        let id = self.require_id()?;
        parse_numeric_id(id)
    }

    /// The identifier as a `parent-child` pair.
    pub fn composite_id(&self) -> Result<CompositeId, ProviderError> {
        self.require_id()?.parse()
    }

    fn require_id(&self) -> Result<&str, ProviderError> {
        self.id
            .as_deref()
            .ok_or_else(|| ProviderError::Validation("state has no identifier".to_string()))
    }

    /// Raw value of an attribute; `None` when absent or null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    pub fn get_str(&self, key: &str) -> Result<String, ProviderError> {
        self.get_opt_str(key)?.ok_or_else(|| missing(key))
    }

    pub fn get_opt_str(&self, key: &str) -> Result<Option<String>, ProviderError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key, "a string")),
        }
    }

    pub fn get_str_or(&self, key: &str, default: &str) -> Result<String, ProviderError> {
        Ok(self.get_opt_str(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, ProviderError> {
        self.get_opt_i64(key)?.ok_or_else(|| missing(key))
    }

    pub fn get_opt_i64(&self, key: &str) -> Result<Option<i64>, ProviderError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value_as_i64(value)
                .map(Some)
                .ok_or_else(|| wrong_type(key, "an integer")),
        }
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> Result<i64, ProviderError> {
        Ok(self.get_opt_i64(key)?.unwrap_or(default))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ProviderError> {
        self.get_opt_bool(key)?.ok_or_else(|| missing(key))
    }

    pub fn get_opt_bool(&self, key: &str) -> Result<Option<bool>, ProviderError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(wrong_type(key, "a boolean")),
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ProviderError> {
        Ok(self.get_opt_bool(key)?.unwrap_or(default))
    }

    /// A set of integers; absent means empty.
    pub fn get_int_set(&self, key: &str) -> Result<BTreeSet<i64>, ProviderError> {
        int_set(self.get(key), key)
    }

    /// A set of strings; absent means empty.
    pub fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>, ProviderError> {
        string_set(self.get(key), key)
    }

    pub fn set_int_set(&mut self, key: &str, members: impl IntoIterator<Item = i64>) {
        let sorted: BTreeSet<i64> = members.into_iter().collect();
        self.set(key, sorted.into_iter().collect::<Vec<_>>());
    }

    pub fn set_string_set(&mut self, key: &str, members: impl IntoIterator<Item = String>) {
        let sorted: BTreeSet<String> = members.into_iter().collect();
        self.set(key, sorted.into_iter().collect::<Vec<_>>());
    }

    /// Whether `key` differs from the prior state. Without a prior state
    /// every present attribute counts as changed.
    pub fn has_change(&self, key: &str) -> bool {
        let before = self.prior.as_ref().and_then(|p| p.get(key)).filter(|v| !v.is_null());
        before != self.get(key)
    }

    /// Members to remove and add to move the integer set `key` from its prior
    /// value to its current one.
    pub fn int_set_change(&self, key: &str) -> Result<SetDiff<i64>, ProviderError> {
        let old = int_set(self.prior_value(key), key)?;
        Ok(SetDiff::new(old, self.get_int_set(key)?))
    }

    /// As [`int_set_change`](Self::int_set_change) for string sets.
    pub fn string_set_change(&self, key: &str) -> Result<SetDiff<String>, ProviderError> {
        let old = string_set(self.prior_value(key), key)?;
        Ok(SetDiff::new(old, self.get_string_set(key)?))
    }

    fn prior_value(&self, key: &str) -> Option<&Value> {
        self.prior
            .as_ref()
            .and_then(|p| p.get(key))
            .filter(|v| !v.is_null())
    }

    /// Render as a state object, identifier included (`null` when cleared).
    pub fn into_state(self) -> Value {
        let mut attrs = self.attrs;
        attrs.insert(
            ID_KEY.to_string(),
            self.id.map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(attrs)
    }
}

/// Parse an identifier assigned by the server.
pub fn parse_numeric_id(id: &str) -> Result<i64, ProviderError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProviderError::InvalidId(format!(
            "'{}' is not a numeric identifier",
            id
        )));
    }
    id.parse()
        .map_err(|_| ProviderError::InvalidId(format!("'{}' is out of range", id)))
}

fn into_object(value: Value) -> Result<Map<String, Value>, ProviderError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(ProviderError::Validation(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn int_set(value: Option<&Value>, key: &str) -> Result<BTreeSet<i64>, ProviderError> {
    match value {
        None => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| value_as_i64(item).ok_or_else(|| wrong_type(key, "a set of integers")))
            .collect(),
        Some(_) => Err(wrong_type(key, "a set of integers")),
    }
}

fn string_set(value: Option<&Value>, key: &str) -> Result<BTreeSet<String>, ProviderError> {
    match value {
        None => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_type(key, "a set of strings"))
            })
            .collect(),
        Some(_) => Err(wrong_type(key, "a set of strings")),
    }
}

fn missing(key: &str) -> ProviderError {
    ProviderError::Validation(format!("missing required attribute '{}'", key))
}

fn wrong_type(key: &str, expected: &str) -> ProviderError {
    ProviderError::Validation(format!("attribute '{}' must be {}", key, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_state_extracts_id() {
        let data = ResourceData::from_state(json!({"id": "12", "label": "Invoice"})).unwrap();
        assert_eq!(data.id(), Some("12"));
        assert_eq!(data.numeric_id().unwrap(), 12);
        assert_eq!(data.get_str("label").unwrap(), "Invoice");
        assert!(data.get(ID_KEY).is_none());
    }

    #[test]
    fn test_null_state_is_empty() {
        let data = ResourceData::from_state(Value::Null).unwrap();
        assert_eq!(data.id(), None);
        assert!(matches!(data.numeric_id(), Err(ProviderError::Validation(_))));
    }

    #[test]
    fn test_non_object_state_rejected() {
        assert!(ResourceData::from_state(json!([1, 2])).is_err());
    }

    #[test]
    fn test_typed_getters() {
        let data = ResourceData::from_state(json!({
            "label": "Contract",
            "period": 30,
            "enabled": true,
            "trash": null,
        }))
        .unwrap();

        assert_eq!(data.get_i64("period").unwrap(), 30);
        assert!(data.get_bool("enabled").unwrap());
        assert_eq!(data.get_opt_i64("trash").unwrap(), None);
        assert_eq!(data.get_str_or("unit", "days").unwrap(), "days");
        assert!(matches!(data.get_str("missing"), Err(ProviderError::Validation(_))));
        assert!(matches!(data.get_i64("label"), Err(ProviderError::Validation(_))));
    }

    #[test]
    fn test_numeric_id_rejects_garbage() {
        for id in ["abc", "-3", "1-2", " 4"] {
            let mut data = ResourceData::new();
            data.set_id(id);
            assert!(matches!(data.numeric_id(), Err(ProviderError::InvalidId(_))), "{id}");
        }
    }

    #[test]
    fn test_composite_id() {
        let mut data = ResourceData::new();
        data.set_id(CompositeId::new(3, 17));
        assert_eq!(data.composite_id().unwrap(), CompositeId::new(3, 17));
    }

    #[test]
    fn test_set_change_against_prior() {
        let data = ResourceData::with_prior(
            json!({"users": [2, 3, 4]}),
            json!({"id": "9", "users": [1, 2, 3]}),
        )
        .unwrap();

        assert_eq!(data.id(), Some("9"));
        assert!(data.has_change("users"));
        let diff = data.int_set_change("users").unwrap();
        assert_eq!(diff.removed, vec![1]);
        assert_eq!(diff.added, vec![4]);
    }

    #[test]
    fn test_set_change_without_prior_adds_everything() {
        let data = ResourceData::from_state(json!({"permissions": ["b", "a"]})).unwrap();
        let diff = data.string_set_change("permissions").unwrap();
        assert!(diff.removed.is_empty());
        assert_eq!(diff.added, vec!["a", "b"]);
    }

    #[test]
    fn test_into_state_writes_sorted_sets_and_id() {
        let mut data = ResourceData::new();
        data.set_id(5);
        data.set("name", "editors");
        data.set_int_set("users", [9, 1, 4]);

        assert_eq!(
            data.into_state(),
            json!({"id": "5", "name": "editors", "users": [1, 4, 9]})
        );
    }

    #[test]
    fn test_cleared_id_is_null() {
        let mut data = ResourceData::from_state(json!({"id": "5"})).unwrap();
        data.clear_id();
        assert_eq!(data.into_state(), json!({"id": null}));
    }
}
