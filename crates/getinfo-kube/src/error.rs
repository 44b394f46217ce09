//! Error types for getinfo-kube

use getinfo_core::ResolveError;
use thiserror::Error;

/// Result type for getinfo-kube operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors that can occur while talking to the cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClusterError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// No usable kubeconfig or in-cluster configuration
    #[error("failed to load cluster configuration: {0}")]
    Config(#[from] kube::config::InferConfigError),

    /// The resource type could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Fetching a named object failed
    #[error("error getting {name}: {source}")]
    Get {
        name: String,
        #[source]
        source: Box<ClusterError>,
    },

    /// Listing objects failed
    #[error("error listing resources: {source}")]
    List {
        #[source]
        source: Box<ClusterError>,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClusterError {
    fn from(e: serde_json::Error) -> Self {
        ClusterError::Serialization(e.to_string())
    }
}

impl ClusterError {
    /// Check if this is (or wraps) a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        match self {
            ClusterError::Api(kube::Error::Api(resp)) => resp.code == 404,
            ClusterError::Get { source, .. } | ClusterError::List { source } => {
                source.is_not_found()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16) -> ClusterError {
        ClusterError::Api(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "pods \"web\" not found".to_string(),
            reason: "NotFound".to_string(),
            code,
        }))
    }

    #[test]
    fn test_is_not_found() {
        assert!(api_error(404).is_not_found());
        assert!(!api_error(500).is_not_found());

        let wrapped = ClusterError::Get {
            name: "web".to_string(),
            source: Box::new(api_error(404)),
        };
        assert!(wrapped.is_not_found());
        assert!(wrapped.to_string().starts_with("error getting web: "));
    }

    #[test]
    fn test_resolve_error_is_transparent() {
        let err: ClusterError = ResolveError::NotFound {
            resource_type: "widgets".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "resource type 'widgets' not found in cluster");
        assert!(!err.is_not_found());
    }
}
