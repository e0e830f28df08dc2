// Key codec.
// Maps logical keys onto namespaced storage keys and splits attribute-path keys.

use crate::error::{Result, StoreError};

/// Prefix for cache entries inside the underlying storage.
pub const ENTRY_PREFIX: &str = "entry:";
/// Prefix for remembered request specs.
pub const REQUEST_PREFIX: &str = "request:";
/// Entry holding the time the next sweep becomes due.
pub const SWEEP_KEY: &str = "__next_sweep";
/// Entry holding the last recorded application version.
pub const VERSION_KEY: &str = "__app_version";

/// The two disjoint key spaces sharing one storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Entry,
    Request,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Entry => ENTRY_PREFIX,
            Namespace::Request => REQUEST_PREFIX,
        }
    }

    /// Storage key for a logical key in this namespace.
    pub fn wrap(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }

    /// Logical key for a storage key, if it belongs to this namespace.
    pub fn unwrap<'a>(&self, storage_key: &'a str) -> Option<&'a str> {
        storage_key.strip_prefix(self.prefix())
    }

    /// Namespace owning a storage key, if any.
    pub fn of(storage_key: &str) -> Option<Namespace> {
        [Namespace::Entry, Namespace::Request]
            .into_iter()
            .find(|ns| storage_key.starts_with(ns.prefix()))
    }
}

/// Storage key for a cache entry.
pub fn wrap(key: &str) -> String {
    Namespace::Entry.wrap(key)
}

/// Reject empty or whitespace-only keys.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

/// Split `key` into its parent key and attribute path when it contains `separator`.
///
/// Path segments are trimmed and empty ones dropped, so `"user."` yields the
/// parent `"user"` with an empty path.
pub fn split_attribute_path(key: &str, separator: &str) -> Option<(String, Vec<String>)> {
    if separator.is_empty() || !key.contains(separator) {
        return None;
    }

    let mut segments = key.split(separator);
    let parent = segments.next()?.trim().to_string();
    let path = segments
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    Some((parent, path))
}
