//! Core error types

use thiserror::Error;

/// Errors raised while turning a type string into a resource coordinate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("resource type '{resource_type}' not found in cluster")]
    NotFound { resource_type: String },

    #[error("API discovery failed: {message}")]
    CatalogUnavailable { message: String },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown scheduling field '{name}' (expected one of: {expected})")]
    UnknownField { name: String, expected: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
