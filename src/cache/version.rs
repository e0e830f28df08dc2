// Version gate.
// Wipes the store when the application version changes.

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::storage::Partition;

use super::entry::CacheEntry;
use super::keys::{Namespace, VERSION_KEY};
use super::store::Stash;

impl Stash {
    /// The last application version recorded by [`Stash::apply_version`].
    pub fn app_version(&self) -> Option<String> {
        self.read_entry(Namespace::Entry, VERSION_KEY, Partition::Persistent)
            .and_then(|entry| entry.data.as_str().map(str::to_string))
    }

    /// Record `version`, clearing the whole store first if it differs from the
    /// stored one and `auto_clean` is on. Returns whether the store was cleared.
    pub fn apply_version(&self, version: &str) -> Result<bool> {
        if version.trim().is_empty() {
            return Err(StoreError::InvalidVersion);
        }

        let previous = self.app_version();
        let changed = previous.as_deref() != Some(version);
        let cleared = changed && self.defaults().auto_clean;
        if cleared {
            debug!(?previous, version, "App version changed, clearing store");
            self.clear()?;
        }

        let entry = CacheEntry::permanent(Value::String(version.to_string()));
        self.write_entry(Namespace::Entry, VERSION_KEY, Partition::Persistent, &entry)?;
        Ok(cleared)
    }
}
