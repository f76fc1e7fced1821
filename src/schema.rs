use serde::{ Deserialize, Serialize };
use serde_json::Value;

/// Field name reserved by the index backend for document identity. It exists
/// implicitly on every collection and can never be dropped, so it is excluded
/// from target schemas and from drop batches.
pub const RESERVED_ID_FIELD: &str = "id";

/// Value types understood by the index backend. Serialized with the backend's
/// wire names (`string[]` for string arrays, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "geopoint")]
    Geopoint,
}

/// A single named, typed attribute within a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Documents may omit this field.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Field is usable for categorical filtering and counting.
    #[serde(default, skip_serializing_if = "is_false")]
    pub facet: bool,
    /// Value assigned when an indexed document omits the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            optional: false,
            facet: false,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn facet(mut self) -> Self {
        self.facet = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// The declared target schema for one collection. Immutable for the duration
/// of a reconcile run; serialized verbatim when the collection is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

/// Remote collection state as reported by the backend. Fetched fresh per
/// reconcile call and never cached across calls; the backend remains the
/// system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub num_documents: u64,
}

/// One entry in a batched schema-update call: drop an existing field by name
/// or add a fully-specified new one. Untagged so a batch serializes exactly
/// as the backend's `{"fields": [...]}` update payload expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldOp {
    Drop(DropField),
    Add(FieldSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropField {
    pub name: String,
    pub drop: bool,
}

impl FieldOp {
    pub fn drop(name: impl Into<String>) -> Self {
        FieldOp::Drop(DropField { name: name.into(), drop: true })
    }

    pub fn add(spec: FieldSpec) -> Self {
        FieldOp::Add(spec)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_field_spec_serializes_name_and_type_only() {
        let spec = FieldSpec::new("title", FieldType::String);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({ "name": "title", "type": "string" })
        );
    }

    #[test]
    fn attributed_field_spec_serializes_all_attributes() {
        let spec = FieldSpec::new("rating", FieldType::Float).facet().default_value(0.0);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({ "name": "rating", "type": "float", "facet": true, "default": 0.0 })
        );
    }

    #[test]
    fn array_and_geopoint_types_use_backend_wire_names() {
        let images = FieldSpec::new("images", FieldType::StringArray).optional();
        let location = FieldSpec::new("location", FieldType::Geopoint).optional();
        assert_eq!(
            serde_json::to_value(&images).unwrap(),
            json!({ "name": "images", "type": "string[]", "optional": true })
        );
        assert_eq!(
            serde_json::to_value(&location).unwrap(),
            json!({ "name": "location", "type": "geopoint", "optional": true })
        );
    }

    #[test]
    fn drop_op_serializes_to_backend_drop_shape() {
        let op = FieldOp::drop("old_field");
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({ "name": "old_field", "drop": true })
        );
    }

    #[test]
    fn add_op_serializes_as_full_field_spec() {
        let op = FieldOp::add(FieldSpec::new("city", FieldType::String).facet());
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({ "name": "city", "type": "string", "facet": true })
        );
    }

    #[test]
    fn collection_info_deserializes_backend_payload() {
        let payload = json!({
            "name": "spaces",
            "num_documents": 42,
            "fields": [
                { "name": "title", "type": "string" },
                { "name": "city", "type": "string", "facet": true, "optional": false }
            ],
            "created_at": 1700000000
        });
        let info: CollectionInfo = serde_json::from_value(payload).unwrap();
        assert_eq!(info.name, "spaces");
        assert_eq!(info.num_documents, 42);
        assert_eq!(info.fields.len(), 2);
        assert!(info.fields[1].facet);
        assert!(!info.fields[1].optional);
    }
}
