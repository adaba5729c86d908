//! # polyref - Inheritance-aware resolution of polymorphic references
//!
//! Each concrete entity type persists into its own partition, so a stored
//! reference only carries `"<partition>/<key>"` instead of a fully-qualified
//! type name. When a record is loaded, polyref recovers the most specific
//! type behind such a reference from the statically declared field type.
//!
//! ## Core Concepts
//!
//! - **TypePath / Namespace**: fully-qualified type names and the scopes that bound a scan
//! - **EntityType**: a declared type, its optional entity annotation and its supertypes
//! - **TypeCatalog**: namespace-indexed registry built once at startup
//! - **MappingContext**: entity types already known to the mapping layer
//! - **TypeResolver**: the layered search from base type to concrete subtype
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use polyref::{EntityType, MappingContext, ScanConfiguration, TypeCatalog, TypePath, TypeResolver};
//!
//! let employee = TypePath::parse("corp::hr::Employee")?;
//! let developer = TypePath::parse("corp::hr::DeveloperSubclass")?;
//!
//! let catalog = TypeCatalog::builder()
//!     .declare(EntityType::entity(employee.clone()))
//!     .declare(EntityType::named_entity(developer.clone(), "developerSubclass").extends(employee.clone()))
//!     .build()?;
//!
//! let resolver = TypeResolver::from_catalog(
//!     Arc::new(catalog),
//!     Arc::new(MappingContext::default()),
//!     ScanConfiguration::default(),
//! );
//! let resolution = resolver.resolve_concrete_type("developerSubclass/42", &employee)?;
//! assert_eq!(resolution.resolved, developer);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod entity;
pub mod error;
pub mod path;
pub mod reference;
pub mod registry;
pub mod resolution;

// Re-export primary types at crate root for convenience
pub use config::{ScanConfiguration, ScanPolicy};
pub use entity::{default_partition_name, matches, EntityAnnotation, EntityType};
pub use error::{PolyrefError, PolyrefResult, ResolveError, ScanError, ValidationError};
pub use path::{Namespace, TypePath};
pub use reference::{decode_partition_identifier, Reference};
pub use registry::{
    EntityAnnotationReader, MappingContext, MappingContextReader, NamespaceScanner, TypeCatalog,
};
pub use resolution::{Resolution, ResolutionOrigin, TypeResolver};
