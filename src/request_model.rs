use crate::model::{ParameterDefinition, ParameterSource, SchemaType};
use crate::schema::Schema;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validation schema generated for an operation that takes body input.
///
/// Every operation gets its own model, even when two operations declare identical
/// body fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestModel {
    /// Model name, derived from the operation name
    pub name: String,
    /// Body field name -> declared type
    pub properties: BTreeMap<String, SchemaType>,
    /// Names of the required body fields, in declaration order
    pub required: Vec<String>,
}

impl RequestModel {
    /// Model name used for an operation
    pub fn name_for(operation_name: &str) -> String {
        format!("{}Request", operation_name)
    }

    /// Render as a JSON schema object
    pub fn to_schema(&self) -> Schema {
        let properties = self
            .properties
            .iter()
            .map(|(name, ty)| (name.clone(), Schema::of(*ty)))
            .collect();
        Schema::object(properties, self.required.clone()).with_title(self.name.clone())
    }
}

/// Builds request models from resolved parameters
pub struct RequestModelFactory;

impl RequestModelFactory {
    /// Returns a model when `parameters` contains at least one body parameter.
    pub fn create(operation_name: &str, parameters: &[ParameterDefinition]) -> Option<RequestModel> {
        let body: Vec<&ParameterDefinition> = parameters
            .iter()
            .filter(|p| p.source == ParameterSource::Body)
            .collect();

        if body.is_empty() {
            return None;
        }

        let properties = body
            .iter()
            .map(|p| (p.name.clone(), p.schema_type))
            .collect();
        let required = body
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect();

        let model = RequestModel {
            name: RequestModel::name_for(operation_name),
            properties,
            required,
        };
        debug!(
            "Generated request model {} with {} field(s)",
            model.name,
            model.properties.len()
        );
        Some(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_body_parameters_no_model() {
        let params = vec![ParameterDefinition::path("userId")];
        assert!(RequestModelFactory::create("GetUser", &params).is_none());
        assert!(RequestModelFactory::create("Health", &[]).is_none());
    }

    #[test]
    fn test_required_email_model() {
        let params = vec![ParameterDefinition::body("email", SchemaType::String, true)];
        let model = RequestModelFactory::create("CreateUser", &params).unwrap();

        assert_eq!(model.name, "CreateUserRequest");
        assert_eq!(model.properties.get("email"), Some(&SchemaType::String));
        assert_eq!(model.required, vec!["email".to_string()]);
    }

    #[test]
    fn test_optional_fields_are_typed_but_not_required() {
        let params = vec![
            ParameterDefinition::path("userId"),
            ParameterDefinition::body("channel", SchemaType::String, true),
            ParameterDefinition::body("enabled", SchemaType::Boolean, false),
        ];
        let model = RequestModelFactory::create("CreateChannel", &params).unwrap();

        assert_eq!(model.properties.len(), 2);
        assert_eq!(model.properties.get("enabled"), Some(&SchemaType::Boolean));
        assert!(!model.properties.contains_key("userId"));
        assert_eq!(model.required, vec!["channel".to_string()]);
    }

    #[test]
    fn test_identical_bodies_get_distinct_models() {
        let params = vec![ParameterDefinition::body("email", SchemaType::String, true)];
        let a = RequestModelFactory::create("CreateUser", &params).unwrap();
        let b = RequestModelFactory::create("InviteUser", &params).unwrap();

        assert_eq!(a.properties, b.properties);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn test_to_schema() {
        let params = vec![ParameterDefinition::body("email", SchemaType::String, true)];
        let model = RequestModelFactory::create("CreateUser", &params).unwrap();

        let json = serde_json::to_value(model.to_schema()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "object",
                "title": "CreateUserRequest",
                "properties": { "email": { "type": "string" } },
                "required": ["email"]
            })
        );
    }
}
