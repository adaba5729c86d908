//! Type paths and namespaces.
//!
//! A [`TypePath`] is the fully-qualified name of a declared type
//! (`app::model::Employee`) and stands in for a runtime type handle. A
//! [`Namespace`] is the scope a scan is bounded by; the empty namespace is
//! the root and contains every type.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "::";

static SEGMENT_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn is_identifier(segment: &str) -> bool {
    SEGMENT_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$"))
        .as_ref()
        .is_ok_and(|re| re.is_match(segment))
}

fn split_segments(raw: &str) -> Result<Vec<String>, String> {
    raw.split(PATH_SEPARATOR)
        .map(|segment| {
            if segment.is_empty() {
                Err("empty segment".to_string())
            } else if is_identifier(segment) {
                Ok(segment.to_string())
            } else {
                Err(format!("segment '{segment}' is not an identifier"))
            }
        })
        .collect()
}

/// A `::`-separated namespace. The empty namespace is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// Parses a namespace. An empty (or whitespace-only) string is the root.
    ///
    /// # Errors
    /// Returns `InvalidNamespace` if any segment is not an identifier.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::root());
        }
        let segments = split_segments(raw).map_err(|reason| ValidationError::InvalidNamespace {
            namespace: raw.to_string(),
            reason,
        })?;
        Ok(Self { segments })
    }

    /// The root namespace.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns true for the root namespace.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The enclosing namespace, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// The first segment of this namespace, as a namespace.
    #[must_use]
    pub fn top_level(&self) -> Option<Self> {
        self.segments.first().map(|first| Self {
            segments: vec![first.clone()],
        })
    }

    /// Returns true if `other` equals this namespace or lies beneath it.
    #[must_use]
    pub fn contains(&self, other: &Namespace) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Returns true if `ty` is declared in this namespace or beneath it.
    #[must_use]
    pub fn contains_type(&self, ty: &TypePath) -> bool {
        ty.segments[..ty.segments.len() - 1].starts_with(&self.segments)
    }

    /// Number of segments (zero for the root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.segments.join(PATH_SEPARATOR))
    }
}

impl FromStr for Namespace {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.segments.join(PATH_SEPARATOR))
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Namespace::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Fully-qualified path of a declared type.
///
/// Always has at least one segment; the last one is the short type name.
///
/// # Examples
///
/// ```
/// use polyref::TypePath;
///
/// let path = TypePath::parse("app::model::Employee").unwrap();
/// assert_eq!(path.short_name(), "Employee");
/// assert_eq!(path.namespace().to_string(), "app::model");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypePath {
    segments: Vec<String>,
}

impl TypePath {
    /// Parses a fully-qualified type path.
    ///
    /// # Errors
    /// Returns `InvalidTypePath` if the path is empty or a segment is not an
    /// identifier.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::InvalidTypePath {
                path: raw.to_string(),
                reason: "path is empty".to_string(),
            });
        }
        let segments = split_segments(raw).map_err(|reason| ValidationError::InvalidTypePath {
            path: raw.to_string(),
            reason,
        })?;
        Ok(Self { segments })
    }

    /// Short (unqualified) type name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Namespace the type is declared in.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        Namespace {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(PATH_SEPARATOR))
    }
}

impl FromStr for TypePath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TypePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TypePath::parse(&raw).map_err(serde::de::Error::custom)
    }
}
