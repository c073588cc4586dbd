use crate::manifest::ApiSettings;
use crate::model::{BackendRef, HttpMethod, ParameterSource, SchemaType};
use crate::registry::ComposedApi;
use crate::schema::Schema;
use crate::template::{IntegrationMapping, MappingStrategy};
use crate::tree::{MethodBinding, ResourceNode};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Request template answering a mock integration with status 200
const MOCK_TEMPLATE: &str = "{\"statusCode\": 200}";

const CORS_HEADERS: [&str; 3] = [
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Headers",
];

/// Renders a [`ComposedApi`] as an OpenAPI 3.0 document
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Base URLs the API is served under
    servers: Vec<Server>,
    /// Whether to add CORS preflight operations
    cors: bool,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Path parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses
    pub responses: BTreeMap<String, Response>,
    /// How the front-end hands the request to its backend
    #[serde(rename = "x-integration", skip_serializing_if = "Option::is_none")]
    pub integration: Option<IntegrationExtension>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Header>>,
}

/// OpenAPI Header object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub schema: Schema,
}

/// Kind of integration behind an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    /// Forwards to the operation's backend reference
    Backend,
    /// Answered by the front-end itself
    Mock,
}

/// `x-integration` extension describing the request mapping of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationExtension {
    #[serde(rename = "type")]
    pub kind: IntegrationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendRef>,
    pub strategy: MappingStrategy,
    /// Content type -> request template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_templates: Option<BTreeMap<String, String>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// Servers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Composed API".to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            servers: Vec::new(),
            cors: false,
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Apply the `api` section of a route manifest
    pub fn with_settings(mut self, settings: &ApiSettings) -> Self {
        if let Some(name) = &settings.name {
            self.info.title = name.clone();
        }
        if let Some(version) = &settings.version {
            self.info.version = version.clone();
        }
        if settings.description.is_some() {
            self.info.description = settings.description.clone();
        }
        if let Some(stage) = &settings.stage {
            self.servers = vec![Server {
                url: format!("/{}", stage.trim_matches('/')),
            }];
        }
        self.cors = settings.cors;
        self
    }

    /// Build the OpenAPI document for a composed API
    pub fn build(&self, api: &ComposedApi) -> OpenApiDocument {
        debug!("Building OpenAPI document");

        let mut paths = BTreeMap::new();
        for (path, node) in api.tree().walk() {
            // With CORS every resource answers preflight requests, bound or not
            if !node.has_bindings() && !self.cors {
                continue;
            }
            paths.insert(path.clone(), self.path_item(&path, node));
        }

        let schemas: BTreeMap<String, Schema> = api
            .models()
            .values()
            .map(|model| (model.name.clone(), model.to_schema()))
            .collect();
        let components = if schemas.is_empty() {
            None
        } else {
            Some(Components {
                schemas: Some(schemas),
            })
        };

        debug!("Rendered {} path(s)", paths.len());
        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info.clone(),
            servers: if self.servers.is_empty() {
                None
            } else {
                Some(self.servers.clone())
            },
            paths,
            components,
        }
    }

    fn path_item(&self, path: &str, node: &ResourceNode) -> PathItem {
        let mut item = PathItem::default();
        for (method, binding) in node.bindings() {
            *item.slot(method) = Some(Self::operation(method, path, binding));
        }

        if self.cors && item.options.is_none() {
            let mut methods: Vec<&str> = node.bindings().map(|(m, _)| m.as_str()).collect();
            methods.push(HttpMethod::Options.as_str());
            item.options = Some(Self::preflight_operation(path, &methods));
        }
        item
    }

    fn operation(method: HttpMethod, path: &str, binding: &MethodBinding) -> Operation {
        let parameters: Vec<Parameter> = binding
            .parameters
            .iter()
            .filter(|p| p.source == ParameterSource::Path)
            .map(|p| Parameter {
                name: p.name.clone(),
                location: "path".to_string(),
                // OpenAPI requires every path parameter to be required
                required: true,
                schema: Schema::of(p.schema_type),
            })
            .collect();

        let request_body = binding.request_model.as_ref().map(|model| RequestBody {
            description: Some(format!("{} payload", binding.operation_name)),
            required: !model.required.is_empty(),
            content: BTreeMap::from([(
                JSON_CONTENT_TYPE.to_string(),
                MediaType {
                    schema: Schema::component_ref(&model.name),
                },
            )]),
        });

        Operation {
            summary: Some(format!("{} {}", method, path)),
            description: None,
            operation_id: Some(binding.operation_name.clone()),
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters)
            },
            request_body,
            responses: BTreeMap::from([(
                "200".to_string(),
                Response {
                    description: "Successful response".to_string(),
                    headers: None,
                },
            )]),
            integration: Some(Self::integration(binding)),
        }
    }

    fn integration(binding: &MethodBinding) -> IntegrationExtension {
        IntegrationExtension {
            kind: IntegrationKind::Backend,
            backend: Some(binding.backend.clone()),
            strategy: binding.integration.strategy(),
            request_templates: binding
                .integration
                .request_template()
                .map(|template| BTreeMap::from([(JSON_CONTENT_TYPE.to_string(), template)])),
        }
    }

    fn preflight_operation(path: &str, methods: &[&str]) -> Operation {
        let headers = CORS_HEADERS
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    Header {
                        schema: Schema::of(SchemaType::String),
                    },
                )
            })
            .collect();

        Operation {
            summary: Some(format!("CORS preflight for {}", path)),
            description: Some(format!("Allowed methods: {}", methods.join(", "))),
            operation_id: None,
            parameters: None,
            request_body: None,
            responses: BTreeMap::from([(
                "200".to_string(),
                Response {
                    description: "CORS preflight response".to_string(),
                    headers: Some(headers),
                },
            )]),
            integration: Some(IntegrationExtension {
                kind: IntegrationKind::Mock,
                backend: None,
                strategy: IntegrationMapping::Empty.strategy(),
                request_templates: Some(BTreeMap::from([(
                    JSON_CONTENT_TYPE.to_string(),
                    MOCK_TEMPLATE.to_string(),
                )])),
            }),
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
