//! Error types for polyref.
//!
//! All errors are strongly typed using thiserror so callers (usually an
//! object-mapping layer) can decide per variant whether to abort
//! deserialization of a record or substitute the declared base type.

use thiserror::Error;

/// Validation errors raised while building paths, catalogs and configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid type path '{path}': {reason}")]
    InvalidTypePath {
        path: String,
        reason: String,
    },

    #[error("Invalid namespace '{namespace}': {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: String,
    },

    #[error("Type '{path}' is declared more than once")]
    DuplicateDeclaration {
        path: String,
    },

    #[error("Invalid scan configuration: {reason}")]
    InvalidConfiguration {
        reason: String,
    },
}

/// Errors raised by a namespace scanner.
///
/// Scan failures are configuration errors, never transient faults.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("Scope '{scope}' cannot be scanned: {reason}")]
    Inaccessible {
        scope: String,
        reason: String,
    },

    #[error("Scanner backend error: {0}")]
    Backend(String),
}

/// Errors raised while resolving the concrete type behind a reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Malformed reference '{reference}': expected '<partition>/<key>'")]
    MalformedReference {
        reference: String,
    },

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error(
        "No scanned scope declares an entity for partition \"{partition}\"; add its namespace to the scopes worth scanning"
    )]
    UnscannedPackage {
        partition: String,
    },
}

/// Top-level error type for polyref.
#[derive(Debug, Error)]
pub enum PolyrefError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ScanError> for PolyrefError {
    fn from(err: ScanError) -> Self {
        Self::Resolve(ResolveError::Scan(err))
    }
}

impl PolyrefError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a resolution error.
    #[must_use]
    pub const fn is_resolve(&self) -> bool {
        matches!(self, Self::Resolve(_))
    }

    /// Returns true if an operator can fix this by extending the scan configuration.
    #[must_use]
    pub const fn is_configuration_gap(&self) -> bool {
        matches!(
            self,
            Self::Resolve(ResolveError::UnscannedPackage { .. } | ResolveError::Scan(_))
        )
    }

    /// Returns true if this error is retryable.
    ///
    /// Resolution is deterministic for a frozen registry, so nothing is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Result type alias for polyref operations.
pub type PolyrefResult<T> = Result<T, PolyrefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_type_path() {
        let err = ValidationError::InvalidTypePath {
            path: "app::".to_string(),
            reason: "empty segment".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("app::"));
        assert!(msg.contains("empty segment"));
    }

    #[test]
    fn test_unscanned_package_names_partition() {
        let err = ResolveError::UnscannedPackage {
            partition: "contractorSubclass".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("\"contractorSubclass\""));
        assert!(msg.contains("scopes worth scanning"));
    }

    #[test]
    fn test_malformed_reference_display() {
        let err = ResolveError::MalformedReference {
            reference: "employee".to_string(),
        };
        assert!(err.to_string().contains("'employee'"));
    }

    #[test]
    fn test_scan_error_converts_through_resolve() {
        let err: PolyrefError = ScanError::Backend("index unavailable".to_string()).into();
        assert!(err.is_resolve());
        assert!(err.is_configuration_gap());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("index unavailable"));
    }

    #[test]
    fn test_polyref_error_from_validation() {
        let err: PolyrefError = ValidationError::DuplicateDeclaration {
            path: "app::Employee".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_configuration_gap());
    }

    #[test]
    fn test_malformed_reference_is_not_configuration_gap() {
        let err: PolyrefError = ResolveError::MalformedReference {
            reference: "x".to_string(),
        }
        .into();
        assert!(err.is_resolve());
        assert!(!err.is_configuration_gap());
    }
}
