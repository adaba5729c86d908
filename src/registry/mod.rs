//! Type registries consumed by the resolver.
//!
//! The traits define the narrow interfaces the resolver reads through. The
//! in-memory implementations are built once during a registration phase and
//! frozen afterwards, so any number of resolvers can read them concurrently.

mod catalog;
mod context;
mod traits;

pub use catalog::{TypeCatalog, TypeCatalogBuilder};
pub use context::{MappingContext, MappingContextBuilder};
pub use traits::{EntityAnnotationReader, MappingContextReader, NamespaceScanner};
