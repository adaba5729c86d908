//! Inheritance-aware type resolution.
//!
//! Records of a concrete type live in their own partition, so a stored
//! reference only names the partition. The resolver maps that name back to
//! the most specific type assignable to the declared field type.

mod resolver;
mod scanner;

pub use resolver::{Resolution, ResolutionOrigin, TypeResolver};
pub use scanner::{CandidateScanner, ScanCache, SCAN_CACHE_MAX};
