use crate::model::{ParameterDefinition, ParameterSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request template that forwards the whole JSON payload unchanged
pub const PASSTHROUGH_TEMPLATE: &str = "$input.json('$')";

/// Tag of the strategy used to build the payload handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingStrategy {
    /// Forward the raw request body unmodified
    BodyPassthrough,
    /// Build a key -> value object from the named path parameters
    PathParameterMap,
    /// No input payload
    Empty,
}

impl fmt::Display for MappingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappingStrategy::BodyPassthrough => "BodyPassthrough",
            MappingStrategy::PathParameterMap => "PathParameterMap",
            MappingStrategy::Empty => "Empty",
        };
        f.write_str(name)
    }
}

/// One entry of a path parameter map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathParameterMapping {
    pub name: String,
    pub extraction_rule: String,
}

/// Integration mapping chosen for an operation, with the data needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy")]
pub enum IntegrationMapping {
    BodyPassthrough,
    PathParameterMap { parameters: Vec<PathParameterMapping> },
    Empty,
}

impl IntegrationMapping {
    pub fn strategy(&self) -> MappingStrategy {
        match self {
            IntegrationMapping::BodyPassthrough => MappingStrategy::BodyPassthrough,
            IntegrationMapping::PathParameterMap { .. } => MappingStrategy::PathParameterMap,
            IntegrationMapping::Empty => MappingStrategy::Empty,
        }
    }

    /// The `application/json` request template, `None` when there is no payload.
    pub fn request_template(&self) -> Option<String> {
        match self {
            IntegrationMapping::BodyPassthrough => Some(PASSTHROUGH_TEMPLATE.to_string()),
            IntegrationMapping::PathParameterMap { parameters } => {
                let entries: Vec<String> = parameters
                    .iter()
                    .map(|p| {
                        format!(
                            "  {}: {}",
                            json_string(&p.name),
                            json_string(&p.extraction_rule)
                        )
                    })
                    .collect();
                Some(format!("{{\n{}\n}}", entries.join(",\n")))
            }
            IntegrationMapping::Empty => None,
        }
    }
}

/// Quoted and escaped JSON string literal
fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// Chooses the integration mapping for a route's resolved parameters
pub struct TemplateSynthesizer;

impl TemplateSynthesizer {
    /// Body input wins over path input, which wins over no input.
    ///
    /// This is a priority rule: when a route has both, path extraction is dropped
    /// and the raw body is forwarded.
    pub fn synthesize(parameters: &[ParameterDefinition]) -> IntegrationMapping {
        if parameters.iter().any(|p| p.source == ParameterSource::Body) {
            return IntegrationMapping::BodyPassthrough;
        }

        let path: Vec<PathParameterMapping> = parameters
            .iter()
            .filter(|p| p.source == ParameterSource::Path)
            .map(|p| PathParameterMapping {
                name: p.name.clone(),
                extraction_rule: p.effective_extraction_rule(),
            })
            .collect();

        if path.is_empty() {
            IntegrationMapping::Empty
        } else {
            IntegrationMapping::PathParameterMap { parameters: path }
        }
    }
}
