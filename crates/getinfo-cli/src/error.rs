//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use getinfo_core::ResolveError;
use getinfo_kube::ClusterError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid arguments that clap could not catch
    #[error("{message}")]
    #[diagnostic(code(getinfo::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Resource type or object does not exist
    #[error("{message}")]
    #[diagnostic(code(getinfo::cli::not_found))]
    NotFound {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Cluster unreachable or request rejected
    #[error("{message}")]
    #[diagnostic(code(getinfo::cli::cluster))]
    Cluster { message: String },

    /// Output could not be encoded
    #[error("Error marshaling {format}: {message}")]
    #[diagnostic(code(getinfo::cli::serialization))]
    Serialization { format: &'static str, message: String },

    /// IO error (closed stdout, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(getinfo::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(getinfo::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Serialization { .. } | CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn json(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON",
            message: err.to_string(),
        }
    }

    pub fn yaml(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            format: "YAML",
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<ClusterError> for CliError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::Resolve(ResolveError::NotFound { resource_type }) => CliError::NotFound {
                message: ResolveError::NotFound { resource_type }.to_string(),
                help: Some(
                    "run 'kubectl api-resources' to list the resource types served by the cluster"
                        .to_string(),
                ),
            },
            err if err.is_not_found() => CliError::NotFound {
                message: err.to_string(),
                help: None,
            },
            err => CliError::Cluster {
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
