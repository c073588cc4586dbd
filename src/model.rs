//! Value types shared by every stage of route composition.
//!
//! A [`RouteDefinition`] is the plain description of one operation: its HTTP method,
//! its path as a list of [`PathSegment`]s, an opaque [`BackendRef`] and a unique
//! operation name. Parameters are declared separately in a [`ParameterDictionary`]
//! keyed by placeholder segment text (`{userId}`) or by operation name (`CreateUser`).
//!
//! # Example
//!
//! ```
//! use route_composer::model::{HttpMethod, ParameterDefinition, ParameterDictionary, RouteDefinition};
//!
//! let route = RouteDefinition::new(HttpMethod::Get, "/users/{userId}", "get-user-fn", "GetUser").unwrap();
//! assert_eq!(route.path(), "/users/{userId}");
//!
//! let mut params = ParameterDictionary::new();
//! params.insert("{userId}", ParameterDefinition::path("userId"));
//! assert_eq!(params.get("{userId}").len(), 1);
//! ```

use crate::error::{ComposeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods an operation can be bound to.
///
/// Parsed case-insensitively, always rendered upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Lower-case key used for this method in an OpenAPI path item.
    pub fn openapi_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(ComposeError::configuration(format!(
                "unsupported HTTP method '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = ComposeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// One component of a route path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Fixed text, e.g. `users` in `/users/{userId}`
    Literal(String),
    /// Named path parameter, e.g. `userId` in `/users/{userId}`
    Placeholder(String),
}

impl PathSegment {
    /// Parses one segment. `{name}` is a placeholder, anything else without braces
    /// or slashes is a literal.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ComposeError::configuration("empty path segment"));
        }
        if text.contains('/') {
            return Err(ComposeError::configuration(format!(
                "path segment '{}' must not contain '/'",
                text
            )));
        }

        if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
            if inner.is_empty() || inner.contains('{') || inner.contains('}') {
                return Err(ComposeError::configuration(format!(
                    "malformed placeholder segment '{}'",
                    text
                )));
            }
            return Ok(PathSegment::Placeholder(inner.to_string()));
        }

        if text.contains('{') || text.contains('}') {
            return Err(ComposeError::configuration(format!(
                "malformed placeholder segment '{}'",
                text
            )));
        }

        Ok(PathSegment::Literal(text.to_string()))
    }

    /// Splits a slash separated path such as `/users/{userId}/characters`.
    ///
    /// Leading and trailing slashes are ignored, so `/` yields no segments (the root).
    pub fn parse_path(path: &str) -> Result<Vec<Self>> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        trimmed.split('/').map(Self::parse).collect()
    }

    /// Text this segment is keyed by in the resource tree.
    pub fn segment_text(&self) -> String {
        match self {
            PathSegment::Literal(text) => text.clone(),
            PathSegment::Placeholder(name) => format!("{{{}}}", name),
        }
    }

    pub fn placeholder_name(&self) -> Option<&str> {
        match self {
            PathSegment::Placeholder(name) => Some(name),
            PathSegment::Literal(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PathSegment::Placeholder(_))
    }

    /// Checks a segment built without [`parse`](Self::parse) against the same rules.
    ///
    /// A literal whose text reads as a placeholder (`Literal("{id}")`) is rejected.
    pub fn validate(&self) -> Result<()> {
        let text = self.segment_text();
        if &Self::parse(&text)? != self {
            return Err(ComposeError::configuration(format!(
                "path segment '{}' does not parse back to the same segment",
                text
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment_text())
    }
}

/// Joins segments into a `/`-prefixed path.
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut path = String::from("/");
    let parts: Vec<String> = segments.iter().map(PathSegment::segment_text).collect();
    path.push_str(&parts.join("/"));
    path
}

/// Opaque handle to the function or service an operation invokes.
///
/// The composer never interprets it; it is carried through to the output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendRef(String);

impl BackendRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendRef {
    fn from(handle: &str) -> Self {
        Self::new(handle)
    }
}

impl From<String> for BackendRef {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

/// A single declared operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub method: HttpMethod,
    pub segments: Vec<PathSegment>,
    pub backend: BackendRef,
    pub operation_name: String,
}

impl RouteDefinition {
    /// Create a route from a slash separated path
    pub fn new(
        method: HttpMethod,
        path: &str,
        backend: impl Into<BackendRef>,
        operation_name: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::from_segments(
            method,
            PathSegment::parse_path(path)?,
            backend,
            operation_name,
        ))
    }

    /// Create a route from already parsed segments
    pub fn from_segments(
        method: HttpMethod,
        segments: Vec<PathSegment>,
        backend: impl Into<BackendRef>,
        operation_name: impl Into<String>,
    ) -> Self {
        Self {
            method,
            segments,
            backend: backend.into(),
            operation_name: operation_name.into(),
        }
    }

    pub fn path(&self) -> String {
        render_path(&self.segments)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(PathSegment::placeholder_name)
    }
}

/// JSON schema primitive a parameter is typed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
        }
    }
}

/// Where a parameter value is taken from in the incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    /// Path parameter embedded in the URL (e.g., `/users/{userId}`)
    Path,
    /// Field of the JSON request body
    Body,
}

fn default_required() -> bool {
    true
}

/// Declaration of one input parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub schema_type: SchemaType,
    #[serde(default = "default_required")]
    pub required: bool,
    pub source: ParameterSource,
    /// Expression that extracts the value from the request; derived from the
    /// source when absent.
    #[serde(default, alias = "template", skip_serializing_if = "Option::is_none")]
    pub extraction_rule: Option<String>,
}

impl ParameterDefinition {
    /// Required string path parameter, the default for an undeclared placeholder
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_type: SchemaType::String,
            required: true,
            source: ParameterSource::Path,
            extraction_rule: None,
        }
    }

    /// Body field of the given type
    pub fn body(name: impl Into<String>, schema_type: SchemaType, required: bool) -> Self {
        Self {
            name: name.into(),
            schema_type,
            required,
            source: ParameterSource::Body,
            extraction_rule: None,
        }
    }

    pub fn with_type(mut self, schema_type: SchemaType) -> Self {
        self.schema_type = schema_type;
        self
    }

    pub fn with_extraction_rule(mut self, rule: impl Into<String>) -> Self {
        self.extraction_rule = Some(rule.into());
        self
    }

    /// The declared extraction rule, or the conventional one for the source.
    pub fn effective_extraction_rule(&self) -> String {
        match (&self.extraction_rule, self.source) {
            (Some(rule), _) => rule.clone(),
            (None, ParameterSource::Path) => {
                format!("$util.escapeJavaScript($input.params('{}'))", self.name)
            }
            (None, ParameterSource::Body) => format!("$input.json('$.{}')", self.name),
        }
    }
}

/// Parameter declarations keyed by placeholder segment text or operation name.
///
/// Passed explicitly into composition; there is no global lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterDictionary {
    entries: BTreeMap<String, Vec<ParameterDefinition>>,
}

impl ParameterDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition under `key`, keeping earlier ones for the same key.
    pub fn insert(&mut self, key: impl Into<String>, definition: ParameterDefinition) {
        self.entries.entry(key.into()).or_default().push(definition);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, definition: ParameterDefinition) -> Self {
        self.insert(key, definition);
        self
    }

    /// Definitions stored under `key`, empty when the key is unknown
    pub fn get(&self, key: &str) -> &[ParameterDefinition] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!(" DELETE ".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_http_method_serde_uses_upper_case() {
        let json = serde_json::to_string(&HttpMethod::Patch).unwrap();
        assert_eq!(json, "\"PATCH\"");
        let method: HttpMethod = serde_json::from_str("\"head\"").unwrap();
        assert_eq!(method, HttpMethod::Head);
    }

    #[test]
    fn test_parse_literal_and_placeholder() {
        assert_eq!(
            PathSegment::parse("users").unwrap(),
            PathSegment::Literal("users".to_string())
        );
        assert_eq!(
            PathSegment::parse("{userId}").unwrap(),
            PathSegment::Placeholder("userId".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_malformed_segments() {
        assert!(PathSegment::parse("").is_err());
        assert!(PathSegment::parse("{}").is_err());
        assert!(PathSegment::parse("{user").is_err());
        assert!(PathSegment::parse("user}").is_err());
        assert!(PathSegment::parse("{a{b}}").is_err());
        assert!(PathSegment::parse("a/b").is_err());
    }

    #[test]
    fn test_parse_path() {
        let segments = PathSegment::parse_path("/users/{userId}/characters/").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Literal("users".to_string()),
                PathSegment::Placeholder("userId".to_string()),
                PathSegment::Literal("characters".to_string()),
            ]
        );
        assert!(PathSegment::parse_path("/").unwrap().is_empty());
        assert!(PathSegment::parse_path("users//characters").is_err());
    }

    #[test]
    fn test_validate_hand_built_segments() {
        assert!(PathSegment::Literal("users".to_string()).validate().is_ok());
        assert!(PathSegment::Placeholder("userId".to_string()).validate().is_ok());

        assert!(PathSegment::Literal("{id}".to_string()).validate().is_err());
        assert!(PathSegment::Literal(String::new()).validate().is_err());
        assert!(PathSegment::Literal("a/b".to_string()).validate().is_err());
        assert!(PathSegment::Literal(" users".to_string()).validate().is_err());
        assert!(PathSegment::Placeholder("a}b".to_string()).validate().is_err());
    }

    #[test]
    fn test_render_path_round_trips_text() {
        let route =
            RouteDefinition::new(HttpMethod::Get, "characters/{name}/hiscores", "fn", "Op").unwrap();
        assert_eq!(route.path(), "/characters/{name}/hiscores");
        assert_eq!(route.placeholders().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(render_path(&[]), "/");
    }

    #[test]
    fn test_default_extraction_rules() {
        let path = ParameterDefinition::path("userId");
        assert_eq!(
            path.effective_extraction_rule(),
            "$util.escapeJavaScript($input.params('userId'))"
        );

        let body = ParameterDefinition::body("email", SchemaType::String, true);
        assert_eq!(body.effective_extraction_rule(), "$input.json('$.email')");

        let custom = ParameterDefinition::path("id").with_extraction_rule("$input.params('id')");
        assert_eq!(custom.effective_extraction_rule(), "$input.params('id')");
    }

    #[test]
    fn test_parameter_definition_deserialize_defaults() {
        let yaml = "name: email\nsource: body\n";
        let def: ParameterDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.schema_type, SchemaType::String);
        assert!(def.required);
        assert_eq!(def.extraction_rule, None);

        let yaml = "name: userId\nsource: path\ntemplate: \"$input.params('userId')\"\n";
        let def: ParameterDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.extraction_rule.as_deref(), Some("$input.params('userId')"));
    }

    #[test]
    fn test_dictionary_keeps_multiple_definitions_per_key() {
        let params = ParameterDictionary::new()
            .with("CreateUser", ParameterDefinition::body("email", SchemaType::String, true))
            .with("CreateUser", ParameterDefinition::body("age", SchemaType::Integer, false));

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("CreateUser").len(), 2);
        assert!(params.get("Unknown").is_empty());
    }
}
