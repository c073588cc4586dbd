use crate::error::{ComposeError, Result};
use crate::model::{ParameterDefinition, ParameterDictionary, ParameterSource, PathSegment, RouteDefinition};
use log::debug;
use std::collections::{BTreeMap, HashSet};

/// Resolves the input parameters of a route against a [`ParameterDictionary`].
///
/// Placeholder segments are looked up by their segment text (`{userId}`); an
/// undeclared placeholder becomes a required string path parameter. Entries stored
/// under the route's operation name contribute body parameters, and path entries
/// there override the segment-level declaration for that route only.
///
/// The result lists path parameters in path order followed by body parameters in
/// declaration order.
pub struct ParameterResolver<'a> {
    dictionary: &'a ParameterDictionary,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(dictionary: &'a ParameterDictionary) -> Self {
        Self { dictionary }
    }

    /// Resolve every parameter of `route`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Configuration`] when a placeholder has no usable path
    /// parameter (body-sourced, misnamed, optional or ambiguous declaration), when a
    /// placeholder repeats within the path, when an operation-level path entry names
    /// a placeholder the route lacks, or when a body field is declared twice.
    pub fn resolve(&self, route: &RouteDefinition) -> Result<Vec<ParameterDefinition>> {
        debug!(
            "Resolving parameters for {} {} ({})",
            route.method,
            route.path(),
            route.operation_name
        );

        let (mut path_overrides, body) = self.operation_entries(route)?;

        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        for segment in &route.segments {
            let Some(name) = segment.placeholder_name() else {
                continue;
            };

            if !seen.insert(name) {
                return Err(ComposeError::configuration(format!(
                    "placeholder {{{}}} appears more than once in {}",
                    name,
                    route.path()
                )));
            }

            let parameter = match path_overrides.remove(name) {
                Some(definition) => definition.clone(),
                None => self.resolve_placeholder(segment, name, route)?,
            };
            resolved.push(parameter);
        }

        if let Some(name) = path_overrides.keys().next() {
            return Err(ComposeError::configuration(format!(
                "operation {} declares path parameter '{}' but {} has no placeholder {{{}}}",
                route.operation_name,
                name,
                route.path(),
                name
            )));
        }

        resolved.extend(body.into_iter().cloned());

        debug!(
            "Resolved {} parameter(s) for {}",
            resolved.len(),
            route.operation_name
        );
        Ok(resolved)
    }

    /// Look up the declaration for one placeholder by its segment text
    fn resolve_placeholder(
        &self,
        segment: &PathSegment,
        name: &str,
        route: &RouteDefinition,
    ) -> Result<ParameterDefinition> {
        let key = segment.segment_text();

        match self.dictionary.get(&key) {
            [] => {
                debug!("No declaration for {}, defaulting to required string path parameter", key);
                Ok(ParameterDefinition::path(name))
            }
            [definition] => {
                if definition.source == ParameterSource::Body {
                    return Err(ComposeError::configuration(format!(
                        "placeholder {} in {} is declared with body source",
                        key,
                        route.path()
                    )));
                }
                if definition.name != name {
                    return Err(ComposeError::configuration(format!(
                        "placeholder {} in {} is declared as parameter '{}'",
                        key,
                        route.path(),
                        definition.name
                    )));
                }
                if !definition.required {
                    return Err(ComposeError::configuration(format!(
                        "placeholder {} in {} is declared optional; path parameters are always required",
                        key,
                        route.path()
                    )));
                }
                Ok(definition.clone())
            }
            _ => Err(ComposeError::configuration(format!(
                "placeholder {} has more than one parameter declaration",
                key
            ))),
        }
    }

    /// Split operation-level entries into path overrides and body fields
    #[allow(clippy::type_complexity)]
    fn operation_entries(
        &self,
        route: &RouteDefinition,
    ) -> Result<(BTreeMap<&'a str, &'a ParameterDefinition>, Vec<&'a ParameterDefinition>)> {
        let mut path_overrides = BTreeMap::new();
        let mut body = Vec::new();
        let mut body_names = HashSet::new();

        for definition in self.dictionary.get(&route.operation_name) {
            match definition.source {
                ParameterSource::Path => {
                    if !definition.required {
                        return Err(ComposeError::configuration(format!(
                            "operation {} declares path parameter '{}' optional; path parameters are always required",
                            route.operation_name, definition.name
                        )));
                    }
                    if path_overrides
                        .insert(definition.name.as_str(), definition)
                        .is_some()
                    {
                        return Err(ComposeError::configuration(format!(
                            "operation {} declares path parameter '{}' more than once",
                            route.operation_name, definition.name
                        )));
                    }
                }
                ParameterSource::Body => {
                    if !body_names.insert(definition.name.as_str()) {
                        return Err(ComposeError::configuration(format!(
                            "operation {} declares body parameter '{}' more than once",
                            route.operation_name, definition.name
                        )));
                    }
                    body.push(definition);
                }
            }
        }

        Ok((path_overrides, body))
    }
}
