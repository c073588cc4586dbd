use crate::error::{ComposeError, Result};
use crate::model::{ParameterDictionary, ParameterSource, RouteDefinition};
use crate::request_model::{RequestModel, RequestModelFactory};
use crate::resolver::ParameterResolver;
use crate::template::TemplateSynthesizer;
use crate::tree::{MethodBinding, ResourceTree};
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Finished result of composing a route list.
///
/// Immutable once returned: only read access is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedApi {
    tree: ResourceTree,
    /// Operation name -> generated request model
    models: BTreeMap<String, RequestModel>,
}

impl ComposedApi {
    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    pub fn models(&self) -> &BTreeMap<String, RequestModel> {
        &self.models
    }

    pub fn model(&self, operation_name: &str) -> Option<&RequestModel> {
        self.models.get(operation_name)
    }

}

/// Applies route definitions one by one to a shared tree.
///
/// A route that fails to register leaves the registry as it was.
pub struct RouteRegistry<'a> {
    parameters: &'a ParameterDictionary,
    resolver: ParameterResolver<'a>,
    tree: ResourceTree,
    models: BTreeMap<String, RequestModel>,
    operations: HashSet<String>,
    /// Dictionary keys a registered route can match: placeholder texts and operation names
    matched_keys: HashSet<String>,
}

impl<'a> RouteRegistry<'a> {
    pub fn new(parameters: &'a ParameterDictionary) -> Self {
        Self {
            parameters,
            resolver: ParameterResolver::new(parameters),
            tree: ResourceTree::new(),
            models: BTreeMap::new(),
            operations: HashSet::new(),
            matched_keys: HashSet::new(),
        }
    }

    /// Resolve, model, map and insert one route.
    pub fn register(&mut self, route: &RouteDefinition) -> Result<()> {
        debug!("Registering {} {} as {}", route.method, route.path(), route.operation_name);

        for segment in &route.segments {
            segment.validate()?;
        }

        if self.operations.contains(&route.operation_name) {
            return Err(ComposeError::configuration(format!(
                "operation name {} is used by more than one route",
                route.operation_name
            )));
        }

        let parameters = self.resolver.resolve(route)?;
        let request_model = RequestModelFactory::create(&route.operation_name, &parameters);
        let integration = TemplateSynthesizer::synthesize(&parameters);

        debug!("{} maps its input with {}", route.operation_name, integration.strategy());

        let required_path_parameters = parameters
            .iter()
            .filter(|p| p.source == ParameterSource::Path)
            .map(|p| p.name.clone())
            .collect();

        let binding = MethodBinding {
            operation_name: route.operation_name.clone(),
            backend: route.backend.clone(),
            required_path_parameters,
            request_model: request_model.clone(),
            integration,
            parameters,
        };
        self.tree.insert(&route.segments, route.method, binding)?;

        self.operations.insert(route.operation_name.clone());
        self.matched_keys.insert(route.operation_name.clone());
        self.matched_keys.extend(
            route
                .segments
                .iter()
                .filter(|segment| segment.is_placeholder())
                .map(|segment| segment.segment_text()),
        );
        if let Some(model) = request_model {
            self.models.insert(route.operation_name.clone(), model);
        }
        Ok(())
    }

    /// Dictionary keys that no registered route has matched so far, in key order
    pub fn unmatched_parameter_keys(&self) -> Vec<&'a str> {
        self.parameters
            .keys()
            .filter(|key| !self.matched_keys.contains(*key))
            .collect()
    }

    pub fn finish(self) -> ComposedApi {
        ComposedApi {
            tree: self.tree,
            models: self.models,
        }
    }
}

/// Compose `routes` into a resource tree, in input order.
///
/// Stops at the first error; no partial result is returned. A parameter dictionary
/// key that matches no placeholder and no operation name of any route is a
/// configuration error, since its declarations would otherwise be dropped.
///
/// # Example
///
/// ```
/// use route_composer::model::{HttpMethod, ParameterDefinition, ParameterDictionary, RouteDefinition, SchemaType};
/// use route_composer::registry::compose;
///
/// let routes = vec![
///     RouteDefinition::new(HttpMethod::Post, "/users", "create-user-fn", "CreateUser").unwrap(),
///     RouteDefinition::new(HttpMethod::Get, "/users/{userId}", "get-user-fn", "GetUser").unwrap(),
/// ];
/// let params = ParameterDictionary::new()
///     .with("CreateUser", ParameterDefinition::body("email", SchemaType::String, true));
///
/// let api = compose(&routes, &params).unwrap();
/// assert!(api.tree().find("/users/{userId}").is_some());
/// assert!(api.model("CreateUser").is_some());
/// ```
pub fn compose(routes: &[RouteDefinition], parameters: &ParameterDictionary) -> Result<ComposedApi> {
    let mut registry = RouteRegistry::new(parameters);
    for route in routes {
        registry.register(route)?;
    }

    let unmatched = registry.unmatched_parameter_keys();
    if !unmatched.is_empty() {
        return Err(ComposeError::configuration(format!(
            "parameter key(s) {} match no placeholder such as {{userId}} and no operation name",
            unmatched.join(", ")
        )));
    }

    let api = registry.finish();
    info!(
        "Composed {} operation(s) into {} resource node(s), {} request model(s)",
        api.tree.operation_count(),
        api.tree.node_count(),
        api.models.len()
    );
    Ok(api)
}
