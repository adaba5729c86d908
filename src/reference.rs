//! Stored references and partition-identifier decoding.
//!
//! A reference is persisted as `"<partition>/<key>"`. Only the partition
//! part matters for type resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ResolveError;

/// Separator between the partition identifier and the key.
pub const KEY_SEPARATOR: char = '/';

/// A reference to a record in a partition.
///
/// # Examples
///
/// ```
/// use polyref::Reference;
///
/// let reference: Reference = "developerSubclass/1234".parse().unwrap();
/// assert_eq!(reference.partition(), "developerSubclass");
/// assert_eq!(reference.key(), "1234");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    partition: String,
    key: String,
}

impl Reference {
    /// Creates a reference from its parts.
    ///
    /// # Errors
    /// Returns `MalformedReference` if `partition` is empty or contains `/`.
    pub fn new(partition: impl Into<String>, key: impl Into<String>) -> Result<Self, ResolveError> {
        let partition = partition.into();
        let key = key.into();
        if partition.is_empty() || partition.contains(KEY_SEPARATOR) {
            return Err(ResolveError::MalformedReference {
                reference: format!("{partition}{KEY_SEPARATOR}{key}"),
            });
        }
        Ok(Self { partition, key })
    }

    /// Creates a reference with a freshly generated key.
    ///
    /// # Errors
    /// Same as [`Reference::new`].
    pub fn generate(partition: impl Into<String>) -> Result<Self, ResolveError> {
        Self::new(partition, Uuid::new_v4().simple().to_string())
    }

    /// The partition identifier.
    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// The record key within the partition.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.partition, self.key)
    }
}

impl FromStr for Reference {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (partition, key) = split_reference(s)?;
        Ok(Self {
            partition: partition.to_string(),
            key: key.to_string(),
        })
    }
}

impl Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn split_reference(canonical: &str) -> Result<(&str, &str), ResolveError> {
    match canonical.split_once(KEY_SEPARATOR) {
        Some((partition, key)) if !partition.is_empty() => Ok((partition, key)),
        _ => Err(ResolveError::MalformedReference {
            reference: canonical.to_string(),
        }),
    }
}

/// Extracts the partition identifier from any value whose string form is a
/// canonical reference.
///
/// # Errors
/// Returns `MalformedReference` if the string form has no `/` or nothing
/// before it.
pub fn decode_partition_identifier<R>(reference: &R) -> Result<String, ResolveError>
where
    R: fmt::Display + ?Sized,
{
    let canonical = reference.to_string();
    let (partition, _) = split_reference(&canonical)?;
    Ok(partition.to_string())
}
