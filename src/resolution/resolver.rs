use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{ScanConfiguration, ScanPolicy};
use crate::entity::{annotation_matches, matches, EntityType};
use crate::error::ResolveError;
use crate::path::{Namespace, TypePath};
use crate::reference::decode_partition_identifier;
use crate::registry::{EntityAnnotationReader, MappingContextReader, NamespaceScanner};
use crate::resolution::scanner::{CandidateScanner, ScanCache};

/// Where a resolution found its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOrigin {
    /// The declared base type itself persists into the partition.
    Direct,
    /// A known entity of the mapping context matched.
    MappingContext,
    /// A namespace scan matched.
    Scan {
        /// The scope whose scan produced the match.
        scope: Namespace,
    },
    /// Nothing matched; the base type is returned as the closest known type.
    Fallback,
}

impl ResolutionOrigin {
    /// Returns a short stable identifier suitable for logging/debugging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::MappingContext => "mapping_context",
            Self::Scan { .. } => "scan",
            Self::Fallback => "fallback",
        }
    }
}

/// Outcome of resolving a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The most specific type found.
    pub resolved: TypePath,
    /// The decoded partition identifier.
    pub partition: String,
    /// Which resolution step produced `resolved`.
    pub origin: ResolutionOrigin,
}

impl Resolution {
    fn new(resolved: TypePath, partition: String, origin: ResolutionOrigin) -> Self {
        debug!(partition = %partition, resolved = %resolved, origin = origin.name(), "reference resolved");
        Self {
            resolved,
            partition,
            origin,
        }
    }

    /// Returns true if a subtype (rather than the base type) was found.
    #[must_use]
    pub fn is_subtype(&self) -> bool {
        matches!(
            self.origin,
            ResolutionOrigin::MappingContext | ResolutionOrigin::Scan { .. }
        )
    }
}

/// Resolves the concrete type behind a polymorphic reference.
///
/// The search runs from cheapest to most expensive, first match wins:
/// 1. the declared base type itself
/// 2. entities already known to the mapping context
/// 3. a scan of the base type's namespace
/// 4. a scan of its parent namespace (covers sibling namespaces)
/// 5. under [`ScanPolicy::BestEffort`], each configured scope in order
///
/// When several candidates share a partition name the first one in this
/// order is returned; that is an approximation, not a uniqueness guarantee.
///
/// # Example
/// ```rust,ignore
/// let resolver = TypeResolver::from_catalog(catalog, context, ScanConfiguration::default());
/// let resolution = resolver.resolve_concrete_type("developerSubclass/42", &employee)?;
/// assert_eq!(resolution.resolved, developer);
/// ```
#[derive(Clone)]
pub struct TypeResolver {
    annotations: Arc<dyn EntityAnnotationReader>,
    context: Arc<dyn MappingContextReader>,
    scanner: CandidateScanner,
    config: Arc<ScanConfiguration>,
}

impl TypeResolver {
    /// Creates a resolver from its collaborators.
    #[must_use]
    pub fn new(
        annotations: Arc<dyn EntityAnnotationReader>,
        context: Arc<dyn MappingContextReader>,
        scanner: Arc<dyn NamespaceScanner>,
        config: ScanConfiguration,
    ) -> Self {
        let cache = config.cache_scan_results.then(|| Arc::new(ScanCache::new()));
        Self {
            annotations,
            context,
            scanner: CandidateScanner::new(scanner, cache),
            config: Arc::new(config),
        }
    }

    /// Creates a resolver that reads annotations from and scans `catalog`.
    #[must_use]
    pub fn from_catalog<C>(
        catalog: Arc<C>,
        context: Arc<dyn MappingContextReader>,
        config: ScanConfiguration,
    ) -> Self
    where
        C: EntityAnnotationReader + NamespaceScanner + 'static,
    {
        let annotations: Arc<dyn EntityAnnotationReader> = catalog.clone();
        Self::new(annotations, context, catalog, config)
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    /// The scan cache, when `cache_scan_results` is enabled.
    #[must_use]
    pub fn scan_cache(&self) -> Option<&Arc<ScanCache>> {
        self.scanner.cache()
    }

    /// Returns true if the declared base type itself persists into `partition`.
    #[must_use]
    pub fn base_matches(&self, base: &TypePath, partition: &str) -> bool {
        self.annotations
            .annotation(base)
            .is_some_and(|annotation| annotation_matches(base, &annotation, partition))
    }

    /// Resolves the concrete type of `reference` for a field declared as `base`.
    ///
    /// # Errors
    /// - `MalformedReference` if the reference has no partition part
    /// - `Scan` if a namespace scan fails
    /// - `UnscannedPackage` under [`ScanPolicy::Strict`] when nothing matched
    pub fn resolve_concrete_type<R>(
        &self,
        reference: &R,
        base: &TypePath,
    ) -> Result<Resolution, ResolveError>
    where
        R: fmt::Display + ?Sized,
    {
        let partition = decode_partition_identifier(reference)?;

        if self.base_matches(base, &partition) {
            return Ok(Resolution::new(base.clone(), partition, ResolutionOrigin::Direct));
        }

        if let Some(known) = self.find_in_context(&partition, base) {
            return Ok(Resolution::new(
                known.path().clone(),
                partition,
                ResolutionOrigin::MappingContext,
            ));
        }

        let own = base.namespace();
        if let Some(found) = self.scan_scope(&own, &partition, base)? {
            return Ok(found);
        }

        if let Some(parent) = own.parent() {
            if let Some(found) = self.scan_scope(&parent, &partition, base)? {
                return Ok(found);
            }
        }

        match self.config.policy {
            ScanPolicy::Strict => {
                debug!(partition = %partition, %base, "no match under strict scan policy");
                Err(ResolveError::UnscannedPackage { partition })
            }
            ScanPolicy::BestEffort => {
                for scope in &self.config.scopes_worth_scanning {
                    if let Some(found) = self.scan_scope(scope, &partition, base)? {
                        return Ok(found);
                    }
                }
                Ok(Resolution::new(base.clone(), partition, ResolutionOrigin::Fallback))
            }
        }
    }

    /// Resolves every reference of a collection-valued association.
    ///
    /// # Errors
    /// Stops at the first reference that fails to resolve.
    pub fn resolve_many<'a, I, R>(
        &self,
        references: I,
        base: &TypePath,
    ) -> Result<Vec<Resolution>, ResolveError>
    where
        I: IntoIterator<Item = &'a R>,
        R: fmt::Display + ?Sized + 'a,
    {
        references
            .into_iter()
            .map(|reference| self.resolve_concrete_type(reference, base))
            .collect()
    }

    fn find_in_context(&self, partition: &str, base: &TypePath) -> Option<Arc<EntityType>> {
        trace!(partition, %base, "searching mapping context");
        self.context
            .persistent_entities()
            .into_iter()
            .find(|known| known.is_assignable_to(base) && matches(known, partition))
    }

    fn scan_scope(
        &self,
        scope: &Namespace,
        partition: &str,
        base: &TypePath,
    ) -> Result<Option<Resolution>, ResolveError> {
        trace!(%scope, partition, %base, "scanning scope");
        let found = self.scanner.find_match(scope, partition, base)?;

        Ok(found.map(|ty| {
            Resolution::new(
                ty.path().clone(),
                partition.to_string(),
                ResolutionOrigin::Scan {
                    scope: scope.clone(),
                },
            )
        }))
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("scanner", &self.scanner)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
