//! Known entity types of the mapping layer.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::entity::EntityType;
use crate::error::ScanError;
use crate::path::{Namespace, TypePath};
use crate::registry::traits::{MappingContextReader, NamespaceScanner};

/// Builder for a [`MappingContext`].
#[derive(Debug, Default)]
pub struct MappingContextBuilder {
    entities: Vec<Arc<EntityType>>,
    seen: HashSet<TypePath>,
}

impl MappingContextBuilder {
    /// Registers an entity type. Plain types and repeated paths are ignored.
    #[must_use]
    pub fn register(mut self, ty: Arc<EntityType>) -> Self {
        if ty.is_entity() && self.seen.insert(ty.path().clone()) {
            self.entities.push(ty);
        }
        self
    }

    /// Registers several entity types, keeping their order.
    #[must_use]
    pub fn register_all(self, types: impl IntoIterator<Item = Arc<EntityType>>) -> Self {
        types.into_iter().fold(self, Self::register)
    }

    /// Freezes the context.
    #[must_use]
    pub fn build(self) -> MappingContext {
        debug!(entities = self.entities.len(), "mapping context frozen");
        MappingContext {
            entities: self.entities,
        }
    }
}

/// Frozen list of the entity types the host application registered.
///
/// Populated once at startup and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct MappingContext {
    entities: Vec<Arc<EntityType>>,
}

impl MappingContext {
    /// Starts a new context.
    #[must_use]
    pub fn builder() -> MappingContextBuilder {
        MappingContextBuilder::default()
    }

    /// Pre-warms a context with every entity reachable from `base_scopes`.
    ///
    /// Warming the context lets most resolutions succeed without scanning.
    ///
    /// # Errors
    /// Propagates the first scan failure.
    pub fn from_scan(
        scanner: &dyn NamespaceScanner,
        base_scopes: &[Namespace],
        root_type: &TypePath,
    ) -> Result<Self, ScanError> {
        let mut builder = Self::builder();
        for scope in base_scopes {
            builder = builder.register_all(scanner.scan_for_entities(scope, root_type)?);
        }
        Ok(builder.build())
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over the registered entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.entities.iter()
    }
}

impl MappingContextReader for MappingContext {
    fn persistent_entities(&self) -> Vec<Arc<EntityType>> {
        self.entities.clone()
    }
}
