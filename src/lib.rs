//! Route composer - turns declarative HTTP route lists into a composed API description.
//!
//! Routes are declared as plain values (method, path segments, opaque backend reference,
//! unique operation name) alongside a dictionary of parameter declarations. Composition
//! folds them into a shared resource tree where routes with a common path prefix share
//! nodes, and attaches to every operation its required path parameters, an optional
//! request-validation model and the strategy used to hand the request to its backend.
//!
//! # Architecture
//!
//! The pure composition core:
//!
//! 1. [`resolver`] - Resolves the parameters of a route from the parameter dictionary
//! 2. [`request_model`] - Generates request-validation models for body input
//! 3. [`template`] - Chooses the integration mapping strategy and request template
//! 4. [`tree`] - Builds the shared resource tree and its method bindings
//! 5. [`registry`] - Applies a route list through the stages above ([`compose`])
//!
//! Around it:
//!
//! - [`manifest`] / [`scanner`] - Load route manifests from YAML/JSON files or directories
//! - [`openapi`] - Renders a composed API as an OpenAPI 3.0 document
//! - [`serializer`] - Serializes rendered output to YAML or JSON
//! - [`cli`] - Command-line workflow
//!
//! # Example Usage
//!
//! ```
//! use route_composer::{
//!     compose,
//!     model::{HttpMethod, ParameterDefinition, ParameterDictionary, RouteDefinition, SchemaType},
//!     openapi::OpenApiBuilder,
//!     serializer::serialize_yaml,
//!     template::MappingStrategy,
//! };
//!
//! let routes = vec![
//!     RouteDefinition::new(HttpMethod::Post, "/users", "create-user-fn", "CreateUser").unwrap(),
//!     RouteDefinition::new(HttpMethod::Get, "/users/{userId}", "get-user-fn", "GetUser").unwrap(),
//! ];
//! let params = ParameterDictionary::new()
//!     .with("CreateUser", ParameterDefinition::body("email", SchemaType::String, true));
//!
//! let api = compose(&routes, &params).unwrap();
//! let get_user = api.tree().find("/users/{userId}").unwrap().binding(HttpMethod::Get).unwrap();
//! assert_eq!(get_user.integration.strategy(), MappingStrategy::PathParameterMap);
//!
//! let document = OpenApiBuilder::new().build(&api);
//! let yaml = serialize_yaml(&document).unwrap();
//! println!("{}", yaml);
//! ```

pub mod cli;
pub mod error;
pub mod manifest;
pub mod model;
pub mod openapi;
pub mod registry;
pub mod request_model;
pub mod resolver;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod template;
pub mod tree;

pub use error::{ComposeError, Result};
pub use registry::{compose, ComposedApi, RouteRegistry};
