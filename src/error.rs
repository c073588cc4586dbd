use crate::model::HttpMethod;
use thiserror::Error;

/// Result type alias for route composition
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Error types raised while composing routes into a resource tree.
///
/// Both variants are fatal for the build: composition stops at the first one and
/// no partial tree is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// A route or parameter declaration cannot be resolved consistently.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A second route tried to bind the same method on the same path.
    #[error("duplicate route: {method} {path} is already registered")]
    DuplicateRoute { method: HttpMethod, path: String },
}

impl ComposeError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn duplicate_route(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::DuplicateRoute {
            method,
            path: path.into(),
        }
    }
}
