//! Ordered attribute document backing the pass builder.
//!
//! Every builder view writes into a single [`AttributeDocument`]: an
//! insertion-ordered mapping from camel-cased key to JSON value. The document
//! also acts as the canonical serializer; the bytes it produces are what the
//! package manifest digests, so serialization must be deterministic for a
//! given document.

use crate::Result;
use serde_json::{Map, Value};

/// Lower-cases the first character of a key, leaving the rest untouched.
///
/// `"PassTypeIdentifier"` becomes `"passTypeIdentifier"`; already-camel-cased
/// names pass through unchanged.
pub(crate) fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Insertion-ordered key/value document holding the pass definition.
///
/// Keys are stored camel-cased regardless of the name a caller used. Values
/// are plain JSON values; typed domain values are converted to their
/// canonical encodings before they are written (see
/// [`values`](crate::pass::values)). Absent optionals are simply never
/// inserted, so serialization never emits `null`.
#[derive(Debug, Clone, Default)]
pub struct AttributeDocument {
    values: Map<String, Value>,
}

impl AttributeDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Parses an existing pass document from JSON bytes.
    ///
    /// The top-level value must be a JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let values: Map<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self { values })
    }

    /// Sets `name` (camel-cased) to `value`, overwriting any previous value.
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(camel_case(name), value);
    }

    /// Appends `value` to the list under `name`, creating the list first if
    /// the key is absent.
    pub fn append(&mut self, name: &str, value: Value) {
        let slot = self
            .values
            .entry(camel_case(name))
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(value);
        }
    }

    /// Returns the nested object under `name`, creating it if absent.
    pub fn bag(&mut self, name: &str) -> &mut Map<String, Value> {
        let slot = self
            .values
            .entry(camel_case(name))
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("bag slot was just normalized to an object"),
        }
    }

    /// Pushes a fresh object onto the list `list_name` inside the bag
    /// `bag_name`, creating both as needed, and returns the new object.
    ///
    /// Backs the per-field sub-documents of the field-collection builders.
    pub fn append_bag_item(&mut self, bag_name: &str, list_name: &str) -> &mut Map<String, Value> {
        let bag = self.bag(bag_name);
        let slot = bag
            .entry(camel_case(list_name))
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(Value::Object(Map::new()));
            if let Some(Value::Object(map)) = items.last_mut() {
                return map;
            }
        }
        unreachable!("list item was just pushed")
    }

    /// Read access to the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Renders the document as UTF-8 JSON bytes.
    ///
    /// Keys keep their insertion order, so the same document always
    /// serializes to the same bytes. This matters because the package
    /// manifest digest is computed over exactly these bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("PassTypeIdentifier"), "passTypeIdentifier");
        assert_eq!(camel_case("passTypeIdentifier"), "passTypeIdentifier");
        assert_eq!(camel_case("X"), "x");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_set_camel_cases_keys() {
        let mut doc = AttributeDocument::new();
        doc.set("SerialNumber", json!("001"));
        assert_eq!(doc.as_map().get("serialNumber"), Some(&json!("001")));
        assert!(doc.as_map().get("SerialNumber").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let mut doc = AttributeDocument::new();
        doc.set("description", json!("first"));
        doc.set("Description", json!("second"));
        assert_eq!(doc.as_map().len(), 1);
        assert_eq!(doc.as_map().get("description"), Some(&json!("second")));
    }

    #[test]
    fn test_append_creates_then_pushes() {
        let mut doc = AttributeDocument::new();
        doc.append("Barcodes", json!({"message": "a"}));
        doc.append("Barcodes", json!({"message": "b"}));
        assert_eq!(
            doc.as_map().get("barcodes"),
            Some(&json!([{"message": "a"}, {"message": "b"}]))
        );
    }

    #[test]
    fn test_bag_is_reused() {
        let mut doc = AttributeDocument::new();
        doc.bag("Coupon").insert("transitType".into(), json!("x"));
        doc.bag("coupon").insert("other".into(), json!("y"));
        assert_eq!(
            doc.as_map().get("coupon"),
            Some(&json!({"transitType": "x", "other": "y"}))
        );
    }

    #[test]
    fn test_append_bag_item() {
        let mut doc = AttributeDocument::new();
        doc.append_bag_item("coupon", "PrimaryFields")
            .insert("key".into(), json!("offer"));
        doc.append_bag_item("coupon", "primaryFields")
            .insert("key".into(), json!("deal"));
        assert_eq!(
            doc.as_map().get("coupon"),
            Some(&json!({"primaryFields": [{"key": "offer"}, {"key": "deal"}]}))
        );
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut doc = AttributeDocument::new();
        doc.set("zulu", json!(1));
        doc.set("alpha", json!(2));
        doc.append("list", json!("x"));
        let first = doc.to_json().unwrap();
        let second = doc.to_json().unwrap();
        assert_eq!(first, second);
        // Insertion order is preserved, not alphabetized.
        let text = String::from_utf8(first).unwrap();
        assert!(text.find("zulu").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_from_json_round_trip() {
        let bytes = br#"{"formatVersion":1,"serialNumber":"001"}"#;
        let doc = AttributeDocument::from_json(bytes).unwrap();
        assert_eq!(doc.to_json().unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(AttributeDocument::from_json(b"[1,2,3]").is_err());
        assert!(AttributeDocument::from_json(b"not json").is_err());
    }
}
