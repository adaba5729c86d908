//! Namespace-indexed catalog of declared types.
//!
//! The catalog replaces reflective package scanning: every type the host
//! wants to be discoverable is declared once through [`TypeCatalogBuilder`],
//! and the frozen [`TypeCatalog`] answers scans from a sorted index.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::entity::{EntityAnnotation, EntityType};
use crate::error::{ScanError, ValidationError};
use crate::path::{Namespace, TypePath};
use crate::registry::traits::{EntityAnnotationReader, NamespaceScanner};

/// Builder for a [`TypeCatalog`].
#[derive(Debug, Default)]
pub struct TypeCatalogBuilder {
    declared: Vec<EntityType>,
    restricted: Vec<Namespace>,
}

impl TypeCatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a type.
    #[must_use]
    pub fn declare(mut self, ty: EntityType) -> Self {
        self.declared.push(ty);
        self
    }

    /// Declares several types.
    #[must_use]
    pub fn declare_all(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.declared.extend(types);
        self
    }

    /// Marks a scope as not scannable.
    ///
    /// Scanning the scope itself (or anything inside it) fails; scanning a
    /// wider scope silently leaves its types out.
    #[must_use]
    pub fn restrict(mut self, scope: Namespace) -> Self {
        self.restricted.push(scope);
        self
    }

    /// Freezes the catalog.
    ///
    /// Supertype sets are closed transitively over the declared types, so a
    /// type is assignable to every ancestor reachable through declarations.
    ///
    /// # Errors
    /// Returns `DuplicateDeclaration` if a path is declared twice.
    pub fn build(self) -> Result<TypeCatalog, ValidationError> {
        let mut direct: HashMap<TypePath, EntityType> = HashMap::with_capacity(self.declared.len());
        for ty in self.declared {
            if direct.contains_key(ty.path()) {
                return Err(ValidationError::DuplicateDeclaration {
                    path: ty.path().to_string(),
                });
            }
            direct.insert(ty.path().clone(), ty);
        }

        let mut by_path: HashMap<TypePath, Arc<EntityType>> = HashMap::with_capacity(direct.len());
        let mut by_namespace: BTreeMap<Namespace, Vec<Arc<EntityType>>> = BTreeMap::new();

        for (path, ty) in &direct {
            let closed = Arc::new(ty.clone().with_supertypes(ancestors(&direct, ty)));
            by_namespace
                .entry(path.namespace())
                .or_default()
                .push(Arc::clone(&closed));
            by_path.insert(path.clone(), closed);
        }

        for types in by_namespace.values_mut() {
            types.sort_by(|a, b| a.path().cmp(b.path()));
        }

        debug!(
            types = by_path.len(),
            namespaces = by_namespace.len(),
            restricted = self.restricted.len(),
            "type catalog frozen"
        );

        Ok(TypeCatalog {
            by_path,
            by_namespace,
            restricted: self.restricted,
        })
    }
}

fn ancestors(direct: &HashMap<TypePath, EntityType>, ty: &EntityType) -> BTreeSet<TypePath> {
    let mut seen: BTreeSet<TypePath> = BTreeSet::new();
    let mut stack: Vec<&TypePath> = ty.supertypes().iter().collect();
    while let Some(next) = stack.pop() {
        if !seen.insert(next.clone()) {
            continue;
        }
        if let Some(parent) = direct.get(next) {
            stack.extend(parent.supertypes().iter());
        }
    }
    seen
}

/// Frozen, namespace-indexed registry of declared types.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    by_path: HashMap<TypePath, Arc<EntityType>>,
    by_namespace: BTreeMap<Namespace, Vec<Arc<EntityType>>>,
    restricted: Vec<Namespace>,
}

impl TypeCatalog {
    /// Starts a new catalog.
    #[must_use]
    pub fn builder() -> TypeCatalogBuilder {
        TypeCatalogBuilder::new()
    }

    /// Looks up a declared type.
    #[must_use]
    pub fn get(&self, path: &TypePath) -> Option<Arc<EntityType>> {
        self.by_path.get(path).cloned()
    }

    /// Number of declared types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns true if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Top-level namespaces that declare at least one entity.
    ///
    /// Entities declared directly in the root namespace are not represented;
    /// they are only reachable by scanning the root itself.
    #[must_use]
    pub fn root_namespaces(&self) -> BTreeSet<Namespace> {
        self.by_namespace
            .iter()
            .filter(|(_, types)| types.iter().any(|ty| ty.is_entity()))
            .filter_map(|(namespace, _)| namespace.top_level())
            .collect()
    }

    fn is_restricted(&self, scope: &Namespace) -> bool {
        self.restricted.iter().any(|r| r.contains(scope))
    }
}

impl EntityAnnotationReader for TypeCatalog {
    fn annotation(&self, ty: &TypePath) -> Option<EntityAnnotation> {
        self.by_path.get(ty)?.annotation().cloned()
    }
}

impl NamespaceScanner for TypeCatalog {
    fn scan_for_entities(
        &self,
        scope: &Namespace,
        base: &TypePath,
    ) -> Result<Vec<Arc<EntityType>>, ScanError> {
        if self.is_restricted(scope) {
            return Err(ScanError::Inaccessible {
                scope: scope.to_string(),
                reason: "scope is restricted".to_string(),
            });
        }

        // Namespaces beneath `scope` form a contiguous run starting at `scope`.
        let found: Vec<Arc<EntityType>> = self
            .by_namespace
            .range(scope.clone()..)
            .take_while(|(namespace, _)| scope.contains(namespace))
            .filter(|(namespace, _)| !self.is_restricted(namespace))
            .flat_map(|(_, types)| types.iter())
            .filter(|ty| ty.is_entity() && ty.is_assignable_to(base))
            .cloned()
            .collect();

        debug!(%scope, %base, found = found.len(), "catalog scan");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(raw: &str) -> TypePath {
        TypePath::parse(raw).unwrap()
    }

    fn ns(raw: &str) -> Namespace {
        Namespace::parse(raw).unwrap()
    }

    fn paths(found: &[Arc<EntityType>]) -> Vec<String> {
        found.iter().map(|t| t.path().to_string()).collect()
    }

    fn sample() -> TypeCatalog {
        let employee = ty("app::model::Employee");
        TypeCatalog::builder()
            .declare(EntityType::entity(employee.clone()))
            .declare(EntityType::entity(ty("app::model::Developer")).extends(employee.clone()))
            .declare(
                EntityType::entity(ty("app::model::hr::SeniorDeveloper"))
                    .extends(ty("app::model::Developer")),
            )
            .declare(EntityType::entity(ty("app::billing::Contractor")).extends(employee.clone()))
            .declare(EntityType::entity(ty("app::model::Invoice")))
            .declare(EntityType::plain(ty("app::model::Temp")).extends(employee))
            .declare(EntityType::entity(ty("vendor::Outsourced")).extends(ty("app::model::Employee")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let err = TypeCatalog::builder()
            .declare(EntityType::entity(ty("app::Employee")))
            .declare(EntityType::named_entity(ty("app::Employee"), "staff"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateDeclaration {
                path: "app::Employee".to_string()
            }
        );
    }

    #[test]
    fn test_supertypes_are_closed_transitively() {
        let catalog = sample();
        let senior = catalog.get(&ty("app::model::hr::SeniorDeveloper")).unwrap();
        assert!(senior.is_assignable_to(&ty("app::model::Developer")));
        assert!(senior.is_assignable_to(&ty("app::model::Employee")));
    }

    #[test]
    fn test_cyclic_supertypes_terminate() {
        let catalog = TypeCatalog::builder()
            .declare(EntityType::entity(ty("a::A")).extends(ty("a::B")))
            .declare(EntityType::entity(ty("a::B")).extends(ty("a::A")))
            .build()
            .unwrap();
        let a = catalog.get(&ty("a::A")).unwrap();
        assert!(a.is_assignable_to(&ty("a::B")));
        assert!(!a.supertypes().contains(&ty("a::A")));
    }

    #[test]
    fn test_scan_is_recursive_and_filters_assignable_entities() {
        let catalog = sample();
        let found = catalog
            .scan_for_entities(&ns("app::model"), &ty("app::model::Employee"))
            .unwrap();
        assert_eq!(
            paths(&found),
            vec![
                "app::model::Developer",
                "app::model::Employee",
                "app::model::hr::SeniorDeveloper",
            ]
        );
    }

    #[test]
    fn test_scan_does_not_leak_sibling_prefixes() {
        let catalog = TypeCatalog::builder()
            .declare(EntityType::entity(ty("app::model::Employee")))
            .declare(EntityType::entity(ty("app::models::Employee")))
            .build()
            .unwrap();
        let found = catalog
            .scan_for_entities(&ns("app::model"), &ty("app::model::Employee"))
            .unwrap();
        assert_eq!(paths(&found), vec!["app::model::Employee"]);
    }

    #[test]
    fn test_scan_root_reaches_everything() {
        let catalog = sample();
        let found = catalog
            .scan_for_entities(&Namespace::root(), &ty("app::model::Employee"))
            .unwrap();
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_scan_unknown_scope_is_empty() {
        let catalog = sample();
        let found = catalog
            .scan_for_entities(&ns("nowhere"), &ty("app::model::Employee"))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_restricted_scope() {
        let catalog = TypeCatalog::builder()
            .declare(EntityType::entity(ty("app::Employee")))
            .declare(EntityType::entity(ty("vendor::Outsourced")).extends(ty("app::Employee")))
            .restrict(ns("vendor"))
            .build()
            .unwrap();

        let err = catalog
            .scan_for_entities(&ns("vendor"), &ty("app::Employee"))
            .unwrap_err();
        assert!(matches!(err, ScanError::Inaccessible { .. }));

        let found = catalog
            .scan_for_entities(&Namespace::root(), &ty("app::Employee"))
            .unwrap();
        assert_eq!(paths(&found), vec!["app::Employee"]);
    }

    #[test]
    fn test_annotation_reader() {
        let catalog = sample();
        assert!(catalog.annotation(&ty("app::model::Employee")).is_some());
        assert!(catalog.annotation(&ty("app::model::Temp")).is_none());
        assert!(catalog.annotation(&ty("app::model::Missing")).is_none());
    }

    #[test]
    fn test_root_namespaces() {
        let catalog = sample();
        let roots: Vec<String> = catalog.root_namespaces().iter().map(ToString::to_string).collect();
        assert_eq!(roots, vec!["app", "vendor"]);
    }
}
