//! Collaborator traits for type resolution.
//!
//! These traits define what the resolver needs from its host:
//! - which types are persistable entities and under which explicit name
//! - which entity types are already known to the mapping layer
//! - which entity types can be reached from a namespace

use std::sync::Arc;

use crate::entity::{EntityAnnotation, EntityType};
use crate::error::ScanError;
use crate::path::{Namespace, TypePath};

/// Reads entity annotations of declared types.
pub trait EntityAnnotationReader: Send + Sync {
    /// Returns the entity annotation of `ty`, or `None` if it is not a
    /// persistable entity (or is unknown).
    fn annotation(&self, ty: &TypePath) -> Option<EntityAnnotation>;
}

/// Reads the entity types already known to the mapping layer.
pub trait MappingContextReader: Send + Sync {
    /// All known entity types, in registration order.
    fn persistent_entities(&self) -> Vec<Arc<EntityType>>;
}

/// Enumerates entity types reachable from a namespace.
///
/// # Contract
/// - Results include every persistable entity declared in `scope` or any of
///   its sub-namespaces that is assignable to `base`.
/// - Results are in a deterministic order for a given registry.
/// - Failures are configuration errors and are not retried by callers.
pub trait NamespaceScanner: Send + Sync {
    /// Scans `scope` recursively for entities assignable to `base`.
    fn scan_for_entities(
        &self,
        scope: &Namespace,
        base: &TypePath,
    ) -> Result<Vec<Arc<EntityType>>, ScanError>;
}
