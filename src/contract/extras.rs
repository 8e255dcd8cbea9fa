//! Residual-field capture and replay.
//!
//! Wire structs keep every key they do not declare in a flattened
//! [`ExtraFields`] bag. On the contract side those bags travel as
//! [`VendorExtras`], tagged with the vendor that produced them, so that a
//! translator for another vendor can recognise and skip them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::LogSink;

pub type ExtraFields = serde_json::Map<String, Value>;

/// Vendor dialects that can contribute extras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    OpenAiChat,
    OpenAiResponses,
}

impl Vendor {
    /// Namespace key used in [`Extensions`].
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::OpenAiChat => "openai_chat",
            Self::OpenAiResponses => "openai_responses",
        }
    }
}

/// Static allow-list of the field names a wire struct declares.
///
/// The list must match the struct's serialized keys (minus the flattened bag).
pub trait KnownFields {
    const KNOWN_FIELDS: &'static [&'static str];

    fn is_known(key: &str) -> bool {
        Self::KNOWN_FIELDS.contains(&key)
    }
}

/// Drop extras keys that `T` already declares. Known fields always win; a
/// collision is reported to `log` and the extras value is discarded.
#[must_use]
pub fn strip_known<T: KnownFields>(extras: &ExtraFields, log: &dyn LogSink) -> ExtraFields {
    extras
        .iter()
        .filter(|(key, _)| {
            if T::is_known(key) {
                log.debug(
                    "extras",
                    format!("dropping extras key '{key}' that collides with a declared field"),
                );
                false
            } else {
                true
            }
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Residual-field bag carried by contract values, tagged with its origin.
///
/// The bag is only ever non-empty when `source` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Vendor>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    fields: ExtraFields,
}

impl VendorExtras {
    /// Bag holding `fields` from `vendor`. An empty map yields an untagged, empty bag.
    #[must_use]
    pub fn from_fields(vendor: Vendor, fields: ExtraFields) -> Self {
        if fields.is_empty() {
            return Self::default();
        }
        Self {
            source: Some(vendor),
            fields,
        }
    }

    /// Single-entry bag.
    #[must_use]
    pub fn single(vendor: Vendor, key: &str, value: Value) -> Self {
        let mut fields = ExtraFields::new();
        fields.insert(key.to_string(), value);
        Self::from_fields(vendor, fields)
    }

    #[must_use]
    pub const fn source(&self) -> Option<Vendor> {
        self.source
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields regardless of origin.
    #[must_use]
    pub const fn fields(&self) -> &ExtraFields {
        &self.fields
    }

    /// The fields, but only if they were contributed by `vendor`.
    #[must_use]
    pub fn for_vendor(&self, vendor: Vendor) -> Option<&ExtraFields> {
        (self.source == Some(vendor) && !self.fields.is_empty()).then_some(&self.fields)
    }

    /// Look up `key` among the fields contributed by `vendor`.
    #[must_use]
    pub fn get(&self, vendor: Vendor, key: &str) -> Option<&Value> {
        self.for_vendor(vendor).and_then(|fields| fields.get(key))
    }

    /// `true` when `vendor` set `key` to JSON `true`.
    #[must_use]
    pub fn flag(&self, vendor: Vendor, key: &str) -> bool {
        self.get(vendor, key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Insert a field on behalf of `vendor`.
    ///
    /// Fields from a different vendor already in the bag are discarded first so
    /// the bag never mixes origins.
    pub fn insert(&mut self, vendor: Vendor, key: impl Into<String>, value: Value) {
        if self.source != Some(vendor) {
            self.fields.clear();
            self.source = Some(vendor);
        }
        self.fields.insert(key.into(), value);
    }

    /// Copy of the fields contributed by `vendor`, minus `skip` keys.
    #[must_use]
    pub fn residual_for(&self, vendor: Vendor, skip: &[&str]) -> ExtraFields {
        self.for_vendor(vendor)
            .map(|fields| {
                fields
                    .iter()
                    .filter(|(key, _)| !skip.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Namespaced side channel on stream events: namespace → field map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(BTreeMap<String, ExtraFields>);

impl Extensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(serde_json::Map::is_empty)
    }

    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Option<&ExtraFields> {
        self.0.get(namespace)
    }

    #[must_use]
    pub fn get(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.0.get(namespace).and_then(|fields| fields.get(key))
    }

    #[must_use]
    pub fn get_str(&self, namespace: &str, key: &str) -> Option<&str> {
        self.get(namespace, key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, namespace: &str, key: impl Into<String>, value: Value) {
        self.0
            .entry(namespace.to_string())
            .or_default()
            .insert(key.into(), value);
    }

    /// Merge `fields` into `namespace`; incoming keys overwrite existing ones.
    pub fn merge(&mut self, namespace: &str, fields: ExtraFields) {
        if fields.is_empty() {
            return;
        }
        self.0.entry(namespace.to_string()).or_default().extend(fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::SharedLogger;
    use serde_json::json;

    struct Sample;

    impl KnownFields for Sample {
        const KNOWN_FIELDS: &'static [&'static str] = &["model", "messages"];
    }

    fn object(value: Value) -> ExtraFields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_strip_known_logs_collisions() {
        let logger = SharedLogger::in_memory();
        let extras = object(json!({"model": "shadow", "service_tier": "flex"}));

        let stripped = strip_known::<Sample>(&extras, &logger);

        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains_key("service_tier"));
        assert_eq!(logger.recent(5).len(), 1);
    }

    #[test]
    fn test_empty_bag_has_no_source() {
        let extras = VendorExtras::from_fields(Vendor::OpenAiChat, ExtraFields::new());
        assert!(extras.is_empty());
        assert_eq!(extras.source(), None);
    }

    #[test]
    fn test_foreign_extras_are_invisible() {
        let extras =
            VendorExtras::single(Vendor::OpenAiResponses, "truncation", json!("auto"));

        assert!(extras.for_vendor(Vendor::OpenAiChat).is_none());
        assert_eq!(
            extras.get(Vendor::OpenAiResponses, "truncation"),
            Some(&json!("auto"))
        );
    }

    #[test]
    fn test_insert_never_mixes_vendors() {
        let mut extras = VendorExtras::single(Vendor::OpenAiResponses, "a", json!(1));
        extras.insert(Vendor::OpenAiChat, "b", json!(2));

        assert_eq!(extras.source(), Some(Vendor::OpenAiChat));
        assert_eq!(extras.fields().len(), 1);
        assert!(extras.get(Vendor::OpenAiResponses, "a").is_none());
    }

    #[test]
    fn test_extensions_merge_per_namespace() {
        let mut ext = Extensions::new();
        ext.insert("openai_chat", "object", json!("chat.completion.chunk"));
        ext.merge("openai_chat", object(json!({"service_tier": "default"})));
        ext.insert("other", "x", json!(1));

        assert_eq!(ext.get_str("openai_chat", "service_tier"), Some("default"));
        assert_eq!(ext.get("other", "x"), Some(&json!(1)));
        assert!(!ext.is_empty());
    }
}
