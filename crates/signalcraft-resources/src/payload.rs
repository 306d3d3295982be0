//! Helpers for building wire payloads from opaque desired specs.
//!
//! Desired specs are structured values owned by the front ends. Well-known
//! scalar fields are extracted by key; nested condition/rule/action trees
//! pass through untouched so their shape is preserved on the wire.

use serde_json::{Map, Value};

use signalcraft_core::{CoreError, ManagedResource};

/// Ordered JSON object under construction.
pub(crate) struct PayloadBuilder(Map<String, Value>);

impl PayloadBuilder {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert the field only when present in the spec (omitted otherwise,
    /// matching the wire contract's optional fields).
    pub fn optional_from(mut self, resource: &ManagedResource, key: &str) -> Self {
        if let Some(value) = resource.spec_field(key) {
            if !value.is_null() {
                self.0.insert(key.to_string(), value.clone());
            }
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

/// A required pass-through tree (e.g. `rules`, `conditions`, `actions`).
pub(crate) fn require_tree(resource: &ManagedResource, key: &str) -> Result<Value, CoreError> {
    resource
        .spec_field(key)
        .cloned()
        .ok_or_else(|| CoreError::invalid_spec(format!("missing field '{key}'")))
}

/// The spec's member id list as a set; absent means empty.
pub(crate) fn member_set(
    resource: &ManagedResource,
) -> Result<std::collections::BTreeSet<String>, CoreError> {
    let Some(value) = resource.spec_field("members") else {
        return Ok(Default::default());
    };
    let items = value
        .as_array()
        .ok_or_else(|| CoreError::invalid_spec("field 'members' must be an array"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| CoreError::invalid_spec("field 'members' must contain strings"))
        })
        .collect()
}
