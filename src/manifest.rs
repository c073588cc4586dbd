//! On-disk route manifests.
//!
//! A manifest lists routes, parameter declarations and optional API settings in
//! YAML or JSON. Several manifests found under one directory are merged into a single
//! [`RouteManifest`] before composition.
//!
//! ```yaml
//! api:
//!   name: goal-tracker-api
//!   stage: v1
//!   cors: true
//! parameters:
//!   "{userId}": { name: userId, type: string, source: path }
//!   CreateUser:
//!     - { name: email, type: string, required: true, source: body }
//! routes:
//!   - method: POST
//!     path: users
//!     backend: create-user-function
//!     operation: CreateUser
//! ```

use crate::model::{HttpMethod, ParameterDefinition, ParameterDictionary, PathSegment, RouteDefinition};
use crate::scanner::ManifestScanner;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Serialization format of a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Format implied by the file extension, if recognized
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ManifestFormat::Yaml),
            "json" => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

/// API-wide settings carried through to the rendered document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Deployment stage the API is served under, e.g. `v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Answer CORS preflight requests on every bound path
    #[serde(default)]
    pub cors: bool,
}

/// A route path given either as text or as a list of segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoutePath {
    Text(String),
    Segments(Vec<String>),
}

impl RoutePath {
    fn parse(&self) -> crate::error::Result<Vec<PathSegment>> {
        match self {
            RoutePath::Text(path) => PathSegment::parse_path(path),
            RoutePath::Segments(segments) => segments.iter().map(|s| PathSegment::parse(s)).collect(),
        }
    }
}

/// One route as written in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(alias = "httpMethod")]
    pub method: HttpMethod,
    #[serde(alias = "resourcePath")]
    pub path: RoutePath,
    pub backend: String,
    #[serde(alias = "operationName")]
    pub operation: String,
}

/// One definition or a list of definitions under a dictionary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterEntry {
    One(ParameterDefinition),
    Many(Vec<ParameterDefinition>),
}

impl ParameterEntry {
    fn into_vec(self) -> Vec<ParameterDefinition> {
        match self {
            ParameterEntry::One(definition) => vec![definition],
            ParameterEntry::Many(definitions) => definitions,
        }
    }
}

/// Parsed contents of one or more manifest files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiSettings>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterEntry>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// Core inputs produced from a manifest
#[derive(Debug, Clone)]
pub struct CompositionInput {
    pub api: ApiSettings,
    pub routes: Vec<RouteDefinition>,
    pub parameters: ParameterDictionary,
}

impl RouteManifest {
    /// Parse manifest text in the given format
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self> {
        let manifest = match format {
            ManifestFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML route manifest")?
            }
            ManifestFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON route manifest")?
            }
        };
        Ok(manifest)
    }

    /// Read and parse a single manifest file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading manifest: {}", path.display());

        let format = ManifestFormat::from_path(path).with_context(|| {
            format!(
                "Unrecognized manifest extension (expected .yaml, .yml or .json): {}",
                path.display()
            )
        })?;
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        Self::parse(&content, format).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    /// Load a manifest file, or every manifest under a directory merged in path order.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_file() {
            return Self::from_file(path);
        }

        let scan = ManifestScanner::new(path.to_path_buf()).scan()?;
        for warning in &scan.warnings {
            warn!("{}", warning);
        }
        if scan.manifest_files.is_empty() {
            bail!("No route manifests found in {}", path.display());
        }

        let mut merged = RouteManifest::default();
        for file in &scan.manifest_files {
            let manifest = Self::from_file(file)?;
            merged
                .merge(manifest)
                .with_context(|| format!("Failed to merge manifest: {}", file.display()))?;
        }

        info!(
            "Loaded {} manifest file(s) with {} route(s)",
            scan.manifest_files.len(),
            merged.routes.len()
        );
        Ok(merged)
    }

    /// Append `other` to this manifest.
    ///
    /// Routes are concatenated, the first `api` section wins, and a parameter key
    /// declared by both manifests is an error.
    pub fn merge(&mut self, other: RouteManifest) -> Result<()> {
        for (key, entry) in other.parameters {
            if self.parameters.contains_key(&key) {
                bail!("Parameter key '{}' is declared in more than one manifest", key);
            }
            self.parameters.insert(key, entry);
        }

        self.routes.extend(other.routes);
        if self.api.is_none() {
            self.api = other.api;
        }
        Ok(())
    }

    /// Convert into the plain values [`compose`](crate::registry::compose) consumes
    pub fn into_input(self) -> Result<CompositionInput> {
        let mut parameters = ParameterDictionary::new();
        for (key, entry) in self.parameters {
            for definition in entry.into_vec() {
                parameters.insert(key.clone(), definition);
            }
        }

        let routes = self
            .routes
            .into_iter()
            .map(|entry| -> Result<RouteDefinition> {
                let segments = entry
                    .path
                    .parse()
                    .with_context(|| format!("Invalid path for operation {}", entry.operation))?;
                Ok(RouteDefinition::from_segments(
                    entry.method,
                    segments,
                    entry.backend,
                    entry.operation,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Converted {} route entries", routes.len());

        Ok(CompositionInput {
            api: self.api.unwrap_or_default(),
            routes,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParameterSource, SchemaType};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const USERS_YAML: &str = r#"
api:
  name: goal-tracker-api
  stage: v1
  cors: true
parameters:
  "{userId}":
    name: userId
    type: string
    required: true
    source: path
    template: "$util.escapeJavaScript($input.params('userId'))"
  CreateUser:
    - name: email
      type: string
      required: true
      source: body
routes:
  - method: POST
    path: users
    backend: create-user-function
    operation: CreateUser
  - httpMethod: GET
    resourcePath: [users, "{userId}"]
    backend: get-user-function
    operationName: GetUser
"#;

    #[test]
    fn test_parse_yaml_manifest() {
        let manifest = RouteManifest::parse(USERS_YAML, ManifestFormat::Yaml).unwrap();

        assert_eq!(manifest.routes.len(), 2);
        assert_eq!(manifest.routes[1].method, HttpMethod::Get);
        assert_eq!(
            manifest.routes[1].path,
            RoutePath::Segments(vec!["users".to_string(), "{userId}".to_string()])
        );
        assert!(matches!(manifest.parameters["{userId}"], ParameterEntry::One(_)));
        assert!(matches!(manifest.parameters["CreateUser"], ParameterEntry::Many(_)));

        let api = manifest.api.unwrap();
        assert_eq!(api.stage.as_deref(), Some("v1"));
        assert!(api.cors);
    }

    #[test]
    fn test_parse_json_manifest() {
        let json = r#"{
            "routes": [
                { "method": "get", "path": "/characters/{name}/hiscores",
                  "backend": "hiscores-fn", "operation": "GetCharacterHiscores" }
            ]
        }"#;
        let manifest = RouteManifest::parse(json, ManifestFormat::Json).unwrap();

        assert!(manifest.api.is_none());
        assert!(manifest.parameters.is_empty());
        assert_eq!(manifest.routes[0].operation, "GetCharacterHiscores");
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        let yaml = "routes:\n  - { method: TRACE, path: /x, backend: fn, operation: X }\n";
        assert!(RouteManifest::parse(yaml, ManifestFormat::Yaml).is_err());
    }

    #[test]
    fn test_into_input() {
        let input = RouteManifest::parse(USERS_YAML, ManifestFormat::Yaml)
            .unwrap()
            .into_input()
            .unwrap();

        assert_eq!(input.routes.len(), 2);
        assert_eq!(input.routes[1].path(), "/users/{userId}");
        assert_eq!(input.routes[0].backend.as_str(), "create-user-function");

        let body = input.parameters.get("CreateUser");
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].source, ParameterSource::Body);
        assert_eq!(body[0].schema_type, SchemaType::String);
        assert_eq!(input.api.name.as_deref(), Some("goal-tracker-api"));
    }

    #[test]
    fn test_into_input_rejects_malformed_path() {
        let yaml = "routes:\n  - { method: GET, path: \"users/{}\", backend: fn, operation: Bad }\n";
        let err = RouteManifest::parse(yaml, ManifestFormat::Yaml)
            .unwrap()
            .into_input()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid path for operation Bad"));
    }

    #[test]
    fn test_merge_rejects_parameter_collision() {
        let mut first = RouteManifest::parse(USERS_YAML, ManifestFormat::Yaml).unwrap();
        let second = RouteManifest::parse(
            "parameters:\n  \"{userId}\": { name: userId, source: path }\n",
            ManifestFormat::Yaml,
        )
        .unwrap();

        assert!(first.merge(second).is_err());
    }

    #[test]
    fn test_merge_keeps_first_api_section() {
        let mut first = RouteManifest::parse(USERS_YAML, ManifestFormat::Yaml).unwrap();
        let second = RouteManifest::parse(
            "api: { name: other }\nroutes:\n  - { method: GET, path: /health, backend: fn, operation: Health }\n",
            ManifestFormat::Yaml,
        )
        .unwrap();

        first.merge(second).unwrap();
        assert_eq!(first.routes.len(), 3);
        assert_eq!(first.api.unwrap().name.as_deref(), Some("goal-tracker-api"));
    }

    #[test]
    fn test_load_directory_merges_in_path_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join("b-users.yaml"),
            "routes:\n  - { method: GET, path: /users, backend: fn, operation: ListUsers }\n",
        )
        .unwrap();
        fs::write(
            root.join("a-health.json"),
            r#"{ "routes": [ { "method": "GET", "path": "/health", "backend": "fn", "operation": "Health" } ] }"#,
        )
        .unwrap();

        let manifest = RouteManifest::load(root).unwrap();
        let operations: Vec<_> = manifest.routes.iter().map(|r| r.operation.as_str()).collect();
        assert_eq!(operations, vec!["Health", "ListUsers"]);
    }

    #[test]
    fn test_load_empty_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(RouteManifest::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.toml");
        fs::write(&path, "").unwrap();
        assert!(RouteManifest::from_file(&path).is_err());
    }
}
