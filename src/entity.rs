//! Entity type descriptors and partition-name matching.
//!
//! Every concrete persistable type lives in its own partition. A stored
//! reference only carries the partition name, so recovering the runtime
//! type of a reference is a matter of finding the entity type whose
//! partition name equals the one in the reference.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::path::TypePath;

/// Marks a type as a persistable entity.
///
/// An absent or empty `name` means the partition name is derived from the
/// type's short name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl EntityAnnotation {
    /// Annotation without an explicit partition name.
    #[must_use]
    pub const fn implicit() -> Self {
        Self { name: None }
    }

    /// Annotation with an explicit partition name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: (!name.is_empty()).then_some(name),
        }
    }

    /// The explicit partition name, if one was declared.
    #[must_use]
    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Derives the default partition name for a short type name.
///
/// Only the first character is lower-cased: `DeveloperSubclass` becomes
/// `developerSubclass`, `URLRecord` becomes `uRLRecord`.
#[must_use]
pub fn default_partition_name(short_name: &str) -> String {
    let mut chars = short_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Descriptor of a declared type.
///
/// Descriptors are created once while the host registers its types and are
/// never mutated afterwards; they are shared behind `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    path: TypePath,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<EntityAnnotation>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    supertypes: BTreeSet<TypePath>,
}

impl EntityType {
    /// Declares a persistable entity with a derived partition name.
    #[must_use]
    pub fn entity(path: TypePath) -> Self {
        Self {
            path,
            annotation: Some(EntityAnnotation::implicit()),
            supertypes: BTreeSet::new(),
        }
    }

    /// Declares a persistable entity with an explicit partition name.
    #[must_use]
    pub fn named_entity(path: TypePath, partition: impl Into<String>) -> Self {
        Self {
            path,
            annotation: Some(EntityAnnotation::named(partition)),
            supertypes: BTreeSet::new(),
        }
    }

    /// Declares a plain (non-persistable) type, such as a trait-like base.
    #[must_use]
    pub fn plain(path: TypePath) -> Self {
        Self {
            path,
            annotation: None,
            supertypes: BTreeSet::new(),
        }
    }

    /// Parses `path` and declares an entity, optionally with an explicit name.
    ///
    /// # Errors
    /// Returns `InvalidTypePath` if `path` does not parse.
    pub fn parse_entity(path: &str, partition: Option<&str>) -> Result<Self, ValidationError> {
        let path = TypePath::parse(path)?;
        Ok(match partition {
            Some(name) => Self::named_entity(path, name),
            None => Self::entity(path),
        })
    }

    /// Adds a direct supertype.
    #[must_use]
    pub fn extends(mut self, supertype: TypePath) -> Self {
        if supertype != self.path {
            self.supertypes.insert(supertype);
        }
        self
    }

    /// Fully-qualified path of the type.
    #[must_use]
    pub const fn path(&self) -> &TypePath {
        &self.path
    }

    /// The entity annotation, if the type is persistable.
    #[must_use]
    pub const fn annotation(&self) -> Option<&EntityAnnotation> {
        self.annotation.as_ref()
    }

    /// Returns true if the type is a persistable entity.
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        self.annotation.is_some()
    }

    /// Known supertypes of this type.
    #[must_use]
    pub const fn supertypes(&self) -> &BTreeSet<TypePath> {
        &self.supertypes
    }

    /// Explicit partition name, if declared.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        self.annotation.as_ref().and_then(EntityAnnotation::explicit_name)
    }

    /// Partition name derived from the short type name.
    #[must_use]
    pub fn default_name(&self) -> String {
        default_partition_name(self.path.short_name())
    }

    /// The partition this type persists into, or `None` for plain types.
    #[must_use]
    pub fn partition_name(&self) -> Option<String> {
        let annotation = self.annotation.as_ref()?;
        Some(
            annotation
                .explicit_name()
                .map_or_else(|| self.default_name(), str::to_string),
        )
    }

    /// Returns true if a value of this type can be stored in a field of type `base`.
    #[must_use]
    pub fn is_assignable_to(&self, base: &TypePath) -> bool {
        self.path == *base || self.supertypes.contains(base)
    }

    pub(crate) fn with_supertypes(mut self, supertypes: BTreeSet<TypePath>) -> Self {
        self.supertypes = supertypes;
        self.supertypes.remove(&self.path);
        self
    }
}

/// Returns true if `annotation` on the type at `path` names `partition`.
///
/// The explicit name is compared first. Only when no explicit name is
/// declared is the derived default name compared. Comparison is exact and
/// case-sensitive.
#[must_use]
pub fn annotation_matches(path: &TypePath, annotation: &EntityAnnotation, partition: &str) -> bool {
    match annotation.explicit_name() {
        Some(explicit) => explicit == partition,
        None => default_partition_name(path.short_name()) == partition,
    }
}

/// Returns true if `candidate` is an entity persisted into `partition`.
#[must_use]
pub fn matches(candidate: &EntityType, partition: &str) -> bool {
    candidate
        .annotation
        .as_ref()
        .is_some_and(|annotation| annotation_matches(&candidate.path, annotation, partition))
}
