// Sweep cleaner.
// Periodic full scan evicting expired entries, at most once per interval.

use serde_json::json;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::Partition;

use super::clock::days_from;
use super::entry::CacheEntry;
use super::keys::{Namespace, SWEEP_KEY};
use super::store::Stash;

/// Result of a call to [`Stash::clean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Caching is disabled.
    Disabled,
    /// The previous sweep is still recent.
    NotDue { next_sweep_at: i64 },
    /// A sweep ran.
    Swept { scanned: usize, evicted: usize },
}

impl Stash {
    /// Evict every expired entry if a sweep is due, then schedule the next one.
    pub fn clean(&self) -> Result<SweepOutcome> {
        if self.is_disabled() {
            return Ok(SweepOutcome::Disabled);
        }

        let now = self.now();
        let due = self
            .read_entry(Namespace::Entry, SWEEP_KEY, Partition::Persistent)
            .and_then(|entry| entry.data.as_i64());
        if let Some(next_sweep_at) = due {
            if next_sweep_at > now {
                return Ok(SweepOutcome::NotDue { next_sweep_at });
            }
        }

        let mut scanned = 0;
        let mut evicted = 0;
        for partition in [Partition::Persistent, Partition::Session] {
            let (partition_scanned, partition_evicted) = self.sweep_partition(partition, now);
            scanned += partition_scanned;
            evicted += partition_evicted;
        }

        let interval = self.defaults().clean_interval_days;
        let next_sweep_at = match days_from(now, interval) {
            Some(at) => at,
            None if interval > 0.0 => i64::MAX,
            None => {
                warn!(interval, "Clean interval is not a positive number of days");
                now
            }
        };
        let next = CacheEntry::permanent(json!(next_sweep_at));
        self.write_entry(Namespace::Entry, SWEEP_KEY, Partition::Persistent, &next)?;

        debug!(scanned, evicted, "Swept store");
        Ok(SweepOutcome::Swept { scanned, evicted })
    }

    /// Evict expired entries from one partition. Storage failures skip the
    /// affected key (or the whole partition when it cannot be listed).
    fn sweep_partition(&self, partition: Partition, now: i64) -> (usize, usize) {
        let storage = self.storage(partition);
        let keys = match storage.list_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(partition = partition.name(), error = %e, "Sweep could not list keys");
                return (0, 0);
            }
        };

        let mut scanned = 0;
        let mut evicted = 0;
        for storage_key in keys {
            if Namespace::Entry.unwrap(&storage_key).is_none() {
                continue;
            }
            scanned += 1;

            let raw = match storage.get_raw(&storage_key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %storage_key, error = %e, "Sweep read failed");
                    continue;
                }
            };
            match CacheEntry::decode(&raw) {
                Ok(entry) if entry.is_expired(now) => match storage.remove_raw(&storage_key) {
                    Ok(()) => evicted += 1,
                    Err(e) => warn!(key = %storage_key, error = %e, "Sweep eviction failed"),
                },
                Ok(_) => {}
                Err(e) if e.is_parse() => {
                    debug!(key = %storage_key, "Skipping unreadable entry during sweep");
                }
                Err(e) => warn!(key = %storage_key, error = %e, "Sweep decode failed"),
            }
        }
        (scanned, evicted)
    }
}
