//! Scan configuration for the resolver.
//!
//! Configuration is plain data: it can be built in code or loaded from JSON.
//!
//! ```json
//! {
//!   "policy": "strict",
//!   "scopes_worth_scanning": ["app", "plugins::hr"],
//!   "cache_scan_results": true
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PolyrefResult, ValidationError};
use crate::path::Namespace;
use crate::registry::TypeCatalog;

/// What the resolver does when neither the mapping context nor the
/// neighbouring namespaces declare a matching entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Fail with `UnscannedPackage` so the operator extends the configuration.
    Strict,

    /// Scan every configured scope, then fall back to the declared base type.
    #[default]
    BestEffort,
}

impl ScanPolicy {
    /// Returns a short stable identifier suitable for logging/debugging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::BestEffort => "best_effort",
        }
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfiguration {
    /// Behaviour once the narrow scans miss.
    pub policy: ScanPolicy,

    /// Broad scopes scanned in order under `BestEffort`, first match wins.
    pub scopes_worth_scanning: Vec<Namespace>,

    /// Memoize scan results per `(scope, base type)`.
    pub cache_scan_results: bool,
}

impl ScanConfiguration {
    /// Strict configuration with no broad scopes.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            policy: ScanPolicy::Strict,
            ..Self::default()
        }
    }

    /// Sets the scan policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a scope worth scanning. Repeated scopes are ignored.
    #[must_use]
    pub fn with_scope(mut self, scope: Namespace) -> Self {
        if !self.scopes_worth_scanning.contains(&scope) {
            self.scopes_worth_scanning.push(scope);
        }
        self
    }

    /// Enables or disables the per-`(scope, base)` scan cache.
    #[must_use]
    pub fn with_scan_cache(mut self, enabled: bool) -> Self {
        self.cache_scan_results = enabled;
        self
    }

    /// Appends every top-level namespace of `catalog` not already listed.
    #[must_use]
    pub fn with_catalog_roots(self, catalog: &TypeCatalog) -> Self {
        catalog
            .root_namespaces()
            .into_iter()
            .fold(self, Self::with_scope)
    }

    /// Parses configuration from a JSON string.
    ///
    /// # Errors
    /// Fails on malformed JSON, unparsable scopes, or an invalid configuration.
    pub fn from_json(content: &str) -> PolyrefResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> PolyrefResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading scan configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Rejects duplicate scopes, which would only repeat a scan.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (idx, scope) in self.scopes_worth_scanning.iter().enumerate() {
            if self.scopes_worth_scanning[..idx].contains(scope) {
                return Err(ValidationError::InvalidConfiguration {
                    reason: format!("scope '{scope}' is listed more than once"),
                });
            }
        }
        Ok(())
    }
}
