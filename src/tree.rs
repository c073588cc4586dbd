//! Shared resource tree that routes are composed into.
//!
//! Nodes are keyed by exact segment text, so routes that share a path prefix share
//! the node chain for that prefix. Each node carries at most one [`MethodBinding`]
//! per HTTP method.

use crate::error::{ComposeError, Result};
use crate::model::{render_path, BackendRef, HttpMethod, ParameterDefinition, PathSegment};
use crate::request_model::RequestModel;
use crate::template::IntegrationMapping;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything the provisioning layer needs to realize one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBinding {
    pub operation_name: String,
    pub backend: BackendRef,
    /// Names of the path parameters that make up the operation's input contract
    pub required_path_parameters: BTreeSet<String>,
    /// Resolved parameters, path parameters first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_model: Option<RequestModel>,
    pub integration: IntegrationMapping,
}

/// One path segment of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNode {
    segment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    methods: BTreeMap<HttpMethod, MethodBinding>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, ResourceNode>,
}

impl ResourceNode {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            methods: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Segment text, empty for the root
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn child(&self, segment: &str) -> Option<&ResourceNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = &ResourceNode> {
        self.children.values()
    }

    pub fn binding(&self, method: HttpMethod) -> Option<&MethodBinding> {
        self.methods.get(&method)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (HttpMethod, &MethodBinding)> {
        self.methods.iter().map(|(method, binding)| (*method, binding))
    }

    pub fn has_bindings(&self) -> bool {
        !self.methods.is_empty()
    }

    fn placeholder_child(&self) -> Option<&str> {
        self.children
            .keys()
            .map(String::as_str)
            .find(|text| text.starts_with('{'))
    }
}

/// The composed hierarchy of path segments, rooted at `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceTree {
    root: ResourceNode,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    pub fn new() -> Self {
        Self {
            root: ResourceNode::new(""),
        }
    }

    pub fn root(&self) -> &ResourceNode {
        &self.root
    }

    /// Inserts a binding for `method` at the node reached by `segments`, creating
    /// missing nodes along the way.
    ///
    /// The tree is left untouched when this fails.
    ///
    /// # Errors
    ///
    /// - [`ComposeError::DuplicateRoute`] if the node already has a binding for `method`
    /// - [`ComposeError::Configuration`] if a placeholder would become a sibling of a
    ///   differently named placeholder
    pub fn insert(
        &mut self,
        segments: &[PathSegment],
        method: HttpMethod,
        binding: MethodBinding,
    ) -> Result<()> {
        self.check_insert(segments, method)?;

        let mut node = &mut self.root;
        for segment in segments {
            let text = segment.segment_text();
            node = node.children.entry(text.clone()).or_insert_with(|| {
                debug!("Creating resource node {}", text);
                ResourceNode::new(text.clone())
            });
        }

        debug!(
            "Binding {} {} to {}",
            method,
            render_path(segments),
            binding.operation_name
        );
        node.methods.insert(method, binding);
        Ok(())
    }

    /// Read-only walk validating an insertion before any node is created
    fn check_insert(&self, segments: &[PathSegment], method: HttpMethod) -> Result<()> {
        let mut node = &self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let text = segment.segment_text();

            if segment.is_placeholder() {
                if let Some(existing) = node.placeholder_child() {
                    if existing != text {
                        return Err(ComposeError::configuration(format!(
                            "placeholder {} conflicts with sibling placeholder {} under {}",
                            text,
                            existing,
                            render_path(&segments[..depth])
                        )));
                    }
                }
            }

            match node.children.get(&text) {
                Some(child) => node = child,
                // The rest of the path is new, nothing left to collide with
                None => return Ok(()),
            }
        }

        if node.methods.contains_key(&method) {
            return Err(ComposeError::duplicate_route(method, render_path(segments)));
        }
        Ok(())
    }

    /// Look up a node by its `/`-separated segment text, e.g. `/users/{userId}`.
    pub fn find(&self, path: &str) -> Option<&ResourceNode> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(&self.root, |node, part| node.child(part))
    }

    /// Depth-first walk yielding `(full path, node)`, root first, children in
    /// segment text order.
    pub fn walk(&self) -> Vec<(String, &ResourceNode)> {
        let mut out = Vec::new();
        Self::walk_node(&self.root, String::new(), &mut out);
        out
    }

    fn walk_node<'a>(node: &'a ResourceNode, prefix: String, out: &mut Vec<(String, &'a ResourceNode)>) {
        let path = if prefix.is_empty() && node.segment.is_empty() {
            "/".to_string()
        } else {
            format!("{}/{}", prefix, node.segment)
        };

        let child_prefix = if path == "/" { String::new() } else { path.clone() };
        out.push((path, node));
        for child in node.children.values() {
            Self::walk_node(child, child_prefix.clone(), out);
        }
    }

    /// Number of nodes, including the root
    pub fn node_count(&self) -> usize {
        self.walk().len()
    }

    /// Number of bound operations across all nodes
    pub fn operation_count(&self) -> usize {
        self.walk().iter().map(|(_, node)| node.methods.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(operation: &str) -> MethodBinding {
        MethodBinding {
            operation_name: operation.to_string(),
            backend: BackendRef::new(format!("{}-fn", operation)),
            required_path_parameters: BTreeSet::new(),
            parameters: Vec::new(),
            request_model: None,
            integration: IntegrationMapping::Empty,
        }
    }

    fn segments(path: &str) -> Vec<PathSegment> {
        PathSegment::parse_path(path).unwrap()
    }

    #[test]
    fn test_new_tree_has_only_root() {
        let tree = ResourceTree::new();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.operation_count(), 0);
        assert_eq!(tree.root().segment(), "");
    }

    #[test]
    fn test_shared_prefix_is_shared() {
        let mut tree = ResourceTree::new();
        tree.insert(&segments("/a/b/c"), HttpMethod::Get, binding("C")).unwrap();
        tree.insert(&segments("/a/b/d"), HttpMethod::Get, binding("D")).unwrap();

        // root, a, b, c, d
        assert_eq!(tree.node_count(), 5);
        let b = tree.find("/a/b").unwrap();
        assert_eq!(b.children().count(), 2);
        assert!(tree.find("/a/b/c").unwrap().binding(HttpMethod::Get).is_some());
        assert!(tree.find("/a/b/d").unwrap().binding(HttpMethod::Get).is_some());
    }

    #[test]
    fn test_different_methods_share_a_node() {
        let mut tree = ResourceTree::new();
        tree.insert(&segments("/users"), HttpMethod::Get, binding("ListUsers")).unwrap();
        tree.insert(&segments("/users"), HttpMethod::Post, binding("CreateUser")).unwrap();

        let users = tree.find("/users").unwrap();
        assert_eq!(users.bindings().count(), 2);
        assert_eq!(tree.operation_count(), 2);
    }

    #[test]
    fn test_duplicate_binding_is_rejected() {
        let mut tree = ResourceTree::new();
        tree.insert(&segments("/users/{userId}"), HttpMethod::Get, binding("GetUser"))
            .unwrap();

        let err = tree
            .insert(&segments("/users/{userId}"), HttpMethod::Get, binding("GetUserAgain"))
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::duplicate_route(HttpMethod::Get, "/users/{userId}")
        );

        let node = tree.find("/users/{userId}").unwrap();
        assert_eq!(node.binding(HttpMethod::Get).unwrap().operation_name, "GetUser");
    }

    #[test]
    fn test_literal_and_placeholder_siblings_coexist() {
        let mut tree = ResourceTree::new();
        tree.insert(&segments("/users/{userId}"), HttpMethod::Get, binding("GetUser"))
            .unwrap();
        tree.insert(&segments("/users/me"), HttpMethod::Get, binding("GetMe")).unwrap();

        assert_eq!(tree.find("/users").unwrap().children().count(), 2);
    }

    #[test]
    fn test_conflicting_placeholder_siblings_are_rejected() {
        let mut tree = ResourceTree::new();
        tree.insert(&segments("/users/{userId}"), HttpMethod::Get, binding("GetUser"))
            .unwrap();

        let before = tree.clone();
        let err = tree
            .insert(&segments("/users/{id}/posts"), HttpMethod::Get, binding("GetPosts"))
            .unwrap_err();

        assert!(matches!(err, ComposeError::Configuration(_)));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_root_binding() {
        let mut tree = ResourceTree::new();
        tree.insert(&[], HttpMethod::Get, binding("Index")).unwrap();

        assert!(tree.find("/").unwrap().binding(HttpMethod::Get).is_some());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_walk_order_and_paths() {
        let mut tree = ResourceTree::new();
        tree.insert(&segments("/users/{userId}"), HttpMethod::Get, binding("GetUser"))
            .unwrap();
        tree.insert(&segments("/characters/{name}"), HttpMethod::Get, binding("GetChar"))
            .unwrap();

        let paths: Vec<String> = tree.walk().into_iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![
                "/",
                "/characters",
                "/characters/{name}",
                "/users",
                "/users/{userId}",
            ]
        );
    }

    #[test]
    fn test_find_missing_path() {
        let tree = ResourceTree::new();
        assert!(tree.find("/nope").is_none());
    }
}
