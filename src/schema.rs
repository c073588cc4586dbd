use crate::model::SchemaType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON schema fragment as it appears in request models and OpenAPI documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Title, used for named request models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    /// Schema of a single primitive type
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Object schema; an empty `required` list is omitted
    pub fn object(properties: BTreeMap<String, Schema>, required: Vec<String>) -> Self {
        Self {
            schema_type: Some(SchemaType::Object.as_str().to_string()),
            properties: Some(properties),
            required: if required.is_empty() { None } else { Some(required) },
            ..Self::default()
        }
    }

    /// `$ref` pointing at a named component schema
    pub fn component_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_schema_serializes_type_only() {
        let json = serde_json::to_value(Schema::of(SchemaType::Integer)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "integer" }));
    }

    #[test]
    fn test_object_schema_omits_empty_required() {
        let mut properties = BTreeMap::new();
        properties.insert("nickname".to_string(), Schema::of(SchemaType::String));

        let json = serde_json::to_value(Schema::object(properties, Vec::new())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "object",
                "properties": { "nickname": { "type": "string" } }
            })
        );
    }

    #[test]
    fn test_component_ref() {
        let json = serde_json::to_value(Schema::component_ref("CreateUserRequest")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "$ref": "#/components/schemas/CreateUserRequest" })
        );
    }
}
