// Entry store.
// Owns the storages, defaults and clock, and the create/read/update/delete
// lifecycle of individual entries including expiry, touch and attribute paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::http::HttpClient;
use crate::storage::{MemoryStorage, Partition, Storage};

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use super::keys::{Namespace, split_attribute_path, validate_key};
use super::lock::RecoveringLock;
use super::options::{Options, ResolvedOptions, StoreDefaults};
use super::path;

/// Startup configuration for [`Stash::init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Typed defaults to install.
    pub defaults: Option<StoreDefaults>,
    /// JSON settings merged strictly over the defaults.
    pub settings: Option<Value>,
    /// Current application version, checked against the stored one.
    pub app_version: Option<String>,
}

/// A cache over a persistent and a session storage, with a revalidating fetcher.
///
/// All configuration lives here; separate instances share nothing but the
/// storages handed to them.
pub struct Stash {
    persistent: Arc<dyn Storage>,
    session: Arc<dyn Storage>,
    pub(crate) http: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    defaults: RecoveringLock<StoreDefaults>,
    disabled: AtomicBool,
}

impl Stash {
    pub fn new(
        persistent: Arc<dyn Storage>,
        session: Arc<dyn Storage>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            persistent,
            session,
            http,
            clock: Arc::new(SystemClock),
            defaults: RecoveringLock::new("cache::store", StoreDefaults::default()),
            disabled: AtomicBool::new(false),
        }
    }

    /// A store whose partitions both live in memory.
    pub fn in_memory(http: Arc<dyn HttpClient>) -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
            http,
        )
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub(crate) fn storage(&self, partition: Partition) -> &dyn Storage {
        match partition {
            Partition::Persistent => self.persistent.as_ref(),
            Partition::Session => self.session.as_ref(),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Current defaults.
    pub fn defaults(&self) -> StoreDefaults {
        self.defaults.read("defaults").clone()
    }

    /// Replace the defaults.
    pub fn configure_defaults(&self, defaults: StoreDefaults) {
        *self.defaults.write("configure_defaults") = defaults;
    }

    /// Strictly merge JSON settings into the defaults; nothing changes on error.
    pub fn configure_defaults_json(&self, settings: &Value) -> Result<()> {
        let mut defaults = self.defaults.write("configure_defaults_json");
        let merged = defaults.merged_with_json(settings)?;
        *defaults = merged;
        Ok(())
    }

    /// Restore the built-in defaults.
    pub fn reset_defaults(&self) {
        self.configure_defaults(StoreDefaults::default());
    }

    pub fn resolve(&self, options: Options) -> ResolvedOptions {
        options.resolve(&self.defaults.read("resolve"))
    }

    /// Configure defaults, check the app version and sweep expired entries.
    pub fn init(&self, init: InitOptions) -> Result<()> {
        if let Some(defaults) = init.defaults {
            self.configure_defaults(defaults);
        }
        if let Some(settings) = &init.settings {
            self.configure_defaults_json(settings)?;
        }
        if let Some(version) = &init.app_version {
            self.apply_version(version)?;
        }
        if self.defaults().auto_clean {
            self.clean()?;
        }
        Ok(())
    }

    /// Turn caching off (`true`) or back on.
    pub fn disable(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Remove every entry and request spec from both partitions.
    pub fn clear(&self) -> Result<()> {
        for partition in [Partition::Persistent, Partition::Session] {
            let storage = self.storage(partition);
            let mut removed = 0usize;
            for storage_key in storage.list_keys()? {
                if Namespace::of(&storage_key).is_some() {
                    storage.remove_raw(&storage_key)?;
                    removed += 1;
                }
            }
            debug!(partition = partition.name(), removed, "Cleared store");
        }
        Ok(())
    }

    // ========================================================================
    // Entry operations
    // ========================================================================

    /// Store `value` under `key`. Returns false if the write was refused or failed.
    ///
    /// Without `overwrite` this only creates: an existing live entry makes it fail.
    pub fn save(&self, key: &str, value: Value, options: Options) -> bool {
        let options = self.resolve(options);
        self.save_resolved(Namespace::Entry, key, value, &options)
    }

    /// Store `value` under `key`, replacing any existing entry and keeping its lifetime.
    pub fn update(&self, key: &str, value: Value, options: Options) -> bool {
        self.save(key, value, options.overwrite(true))
    }

    /// Read the value under `key`, or the attribute it addresses.
    pub fn get(&self, key: &str, options: Options) -> Result<Option<Value>> {
        let options = self.resolve(options);
        self.get_resolved(key, &options)
    }

    /// Delete the entry under `key`.
    pub fn remove(&self, key: &str, options: Options) -> Result<()> {
        validate_key(key)?;
        let options = self.resolve(options);
        self.storage(options.partition)
            .remove_raw(&Namespace::Entry.wrap(key))
    }

    pub(crate) fn save_resolved(
        &self,
        namespace: Namespace,
        key: &str,
        value: Value,
        options: &ResolvedOptions,
    ) -> bool {
        match self.try_save(namespace, key, value, options) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Cache write rejected");
                false
            }
        }
    }

    fn try_save(
        &self,
        namespace: Namespace,
        key: &str,
        value: Value,
        options: &ResolvedOptions,
    ) -> Result<()> {
        if self.is_disabled() {
            return Err(StoreError::Disabled);
        }
        validate_key(key)?;

        if namespace == Namespace::Entry {
            if let Some((parent, attribute)) = split_attribute_path(key, &options.separator) {
                validate_key(&parent)?;
                if !options.overwrite {
                    return Err(StoreError::AttributeOnCreate(key.to_string()));
                }

                let existing = self
                    .read_entry(namespace, &parent, options.partition)
                    .ok_or_else(|| StoreError::PathNotFound(key.to_string()))?;
                let mut data = existing.data.clone();
                path::assign(&mut data, &attribute, value)?;
                return self.write_value(namespace, &parent, data, Some(&existing), options);
            }
        }

        let existing = self.read_entry(namespace, key, options.partition);
        if !options.overwrite && existing.is_some() {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }

        let previous = if options.overwrite {
            existing.as_ref()
        } else {
            None
        };
        self.write_value(namespace, key, value, previous, options)
    }

    /// Write `value`, carrying over the lifetime of `previous` unless the caller chose one.
    fn write_value(
        &self,
        namespace: Namespace,
        key: &str,
        value: Value,
        previous: Option<&CacheEntry>,
        options: &ResolvedOptions,
    ) -> Result<()> {
        let days = match previous {
            Some(previous) if !options.expiry_explicit => previous.days,
            _ => Some(options.expiry_days),
        };

        let entry = match days {
            Some(days) if options.expires() && days > 0.0 => {
                CacheEntry::expiring(value, days, self.now())?
            }
            _ => CacheEntry::permanent(value),
        };

        self.write_entry(namespace, key, options.partition, &entry)
    }

    pub(crate) fn write_entry(
        &self,
        namespace: Namespace,
        key: &str,
        partition: Partition,
        entry: &CacheEntry,
    ) -> Result<()> {
        let serialized = entry.encode()?;
        self.storage(partition)
            .set_raw(&namespace.wrap(key), &serialized)
    }

    /// Read the live entry under `key` without touching it.
    ///
    /// Unreadable records count as a miss and are left in place; expired ones
    /// are evicted.
    pub(crate) fn read_entry(
        &self,
        namespace: Namespace,
        key: &str,
        partition: Partition,
    ) -> Option<CacheEntry> {
        let storage_key = namespace.wrap(key);
        let storage = self.storage(partition);

        let raw = match storage.get_raw(&storage_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Storage read failed, treating as miss");
                return None;
            }
        };

        let entry = match CacheEntry::decode(&raw) {
            Ok(entry) => entry,
            Err(e) if e.is_parse() => {
                debug!(key, error = %e, "Unreadable entry, treating as miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Entry decode failed");
                return None;
            }
        };

        if entry.is_expired(self.now()) {
            debug!(key, partition = partition.name(), "Evicting expired entry");
            if let Err(e) = storage.remove_raw(&storage_key) {
                warn!(key, error = %e, "Failed to evict expired entry");
            }
            return None;
        }

        Some(entry)
    }

    /// Read the live entry under `key`, sliding its expiry forward unless told not to.
    pub(crate) fn load(
        &self,
        namespace: Namespace,
        key: &str,
        options: &ResolvedOptions,
    ) -> Option<CacheEntry> {
        let entry = self.read_entry(namespace, key, options.partition)?;
        if !options.skip_touch {
            if let Some(touched) = entry.touched(self.now()) {
                match self.write_entry(namespace, key, options.partition, &touched) {
                    Ok(()) => debug!(key, "Touched entry"),
                    Err(e) => warn!(key, error = %e, "Failed to touch entry"),
                }
            }
        }
        Some(entry)
    }

    pub(crate) fn get_resolved(
        &self,
        key: &str,
        options: &ResolvedOptions,
    ) -> Result<Option<Value>> {
        if self.is_disabled() {
            return Ok(None);
        }
        validate_key(key)?;

        if let Some((parent, attribute)) = split_attribute_path(key, &options.separator) {
            validate_key(&parent)?;
            let data = self.get_resolved(&parent, options)?;
            return Ok(data.and_then(|data| path::find(&data, &attribute).ok().cloned()));
        }

        Ok(self
            .load(Namespace::Entry, key, options)
            .map(|entry| entry.data))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::clock::{MILLIS_PER_DAY, ManualClock};
    use crate::error::Result as StoreResult;
    use crate::http::{HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use serde_json::json;

    pub(crate) struct OfflineClient;

    #[async_trait]
    impl HttpClient for OfflineClient {
        async fn execute(&self, _request: HttpRequest) -> StoreResult<HttpResponse> {
            Err(StoreError::TransportFailed("offline".to_string()))
        }
    }

    pub(crate) fn test_stash() -> (Stash, Arc<MemoryStorage>, Arc<ManualClock>) {
        let persistent = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let stash = Stash::new(
            persistent.clone(),
            Arc::new(MemoryStorage::new()),
            Arc::new(OfflineClient),
        )
        .with_clock(clock.clone());
        (stash, persistent, clock)
    }

    fn raw_entry(storage: &MemoryStorage, key: &str) -> Option<CacheEntry> {
        storage
            .get_raw(&Namespace::Entry.wrap(key))
            .unwrap()
            .map(|raw| CacheEntry::decode(&raw).unwrap())
    }

    #[test]
    fn test_save_then_get() {
        let (stash, _, _) = test_stash();

        assert!(stash.save("user", json!({"name": "ada"}), Options::new()));
        assert_eq!(
            stash.get("user", Options::new()).unwrap(),
            Some(json!({"name": "ada"}))
        );
    }

    #[test]
    fn test_save_twice_is_rejected_update_succeeds() {
        let (stash, _, _) = test_stash();

        assert!(stash.save("k", json!(1), Options::new()));
        assert!(!stash.save("k", json!(2), Options::new()));
        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!(1)));

        assert!(stash.update("k", json!(2), Options::new()));
        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_save_over_expired_entry_creates() {
        let (stash, _, clock) = test_stash();

        assert!(stash.save("k", json!(1), Options::new().expiry(1.0)));
        clock.advance(Duration::days(2));
        assert!(stash.save("k", json!(2), Options::new()));
        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_invalid_keys() {
        let (stash, _, _) = test_stash();

        assert!(!stash.save("", json!(1), Options::new()));
        assert!(matches!(
            stash.get(" ", Options::new()),
            Err(StoreError::InvalidKey)
        ));
        assert!(matches!(
            stash.remove("", Options::new()),
            Err(StoreError::InvalidKey)
        ));
        assert!(!stash.update(".attr", json!(1), Options::new()));
    }

    #[test]
    fn test_expiry_is_written() {
        let (stash, storage, clock) = test_stash();
        let now = clock.now_millis();

        stash.save("k", json!("v"), Options::new().expiry(2.0));
        let entry = raw_entry(&storage, "k").unwrap();
        assert_eq!(entry.days, Some(2.0));
        assert_eq!(entry.exp, Some(now + 2 * MILLIS_PER_DAY));

        stash.save("default", json!("v"), Options::new());
        let entry = raw_entry(&storage, "default").unwrap();
        assert_eq!(entry.days, Some(15.0));
    }

    #[test]
    fn test_get_touches_entry() {
        let (stash, storage, clock) = test_stash();

        stash.save("k", json!("v"), Options::new().expiry(2.0));
        clock.advance(Duration::days(1));
        let now = clock.now_millis();

        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!("v")));
        let entry = raw_entry(&storage, "k").unwrap();
        assert_eq!(entry.exp, Some(now + 2 * MILLIS_PER_DAY));
        assert_eq!(entry.days, Some(2.0));

        // Touching keeps the entry alive past its original expiry.
        clock.advance(Duration::days(1) + Duration::hours(12));
        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!("v")));
    }

    #[test]
    fn test_skip_touch_leaves_expiry() {
        let (stash, storage, clock) = test_stash();

        stash.save("k", json!("v"), Options::new().expiry(2.0));
        let before = raw_entry(&storage, "k").unwrap();
        clock.advance(Duration::days(1));

        stash.get("k", Options::new().skip_touch(true)).unwrap();
        assert_eq!(raw_entry(&storage, "k").unwrap(), before);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_get() {
        let (stash, storage, clock) = test_stash();

        stash.save("k", json!("v"), Options::new().expiry(1.0));
        clock.advance(Duration::days(1));

        assert_eq!(stash.get("k", Options::new()).unwrap(), None);
        assert!(storage.list_keys().unwrap().is_empty());
    }

    #[test]
    fn test_no_expiry_never_evicts() {
        let (stash, storage, clock) = test_stash();

        stash.save("k", json!("v"), Options::new().no_expiry(true));
        assert!(raw_entry(&storage, "k").unwrap().is_permanent());

        for _ in 0..5 {
            clock.advance(Duration::days(365));
            assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!("v")));
        }
        assert!(raw_entry(&storage, "k").unwrap().is_permanent());
    }

    #[test]
    fn test_auto_expiry_off_writes_permanent() {
        let (stash, storage, _) = test_stash();

        stash.save("k", json!(1), Options::new().auto_expiry(false));
        let entry = raw_entry(&storage, "k").unwrap();
        assert_eq!(entry.exp, None);
        assert_eq!(entry.days, None);
    }

    #[test]
    fn test_update_keeps_original_ttl() {
        let (stash, storage, clock) = test_stash();

        stash.save("k", json!(1), Options::new().expiry(3.0));
        clock.advance(Duration::hours(1));
        let now = clock.now_millis();

        stash.update("k", json!(2), Options::new());
        let entry = raw_entry(&storage, "k").unwrap();
        assert_eq!(entry.days, Some(3.0));
        assert_eq!(entry.exp, Some(now + 3 * MILLIS_PER_DAY));

        stash.update("k", json!(3), Options::new().expiry(7.0));
        assert_eq!(raw_entry(&storage, "k").unwrap().days, Some(7.0));
    }

    #[test]
    fn test_update_keeps_permanent_entries_permanent() {
        let (stash, storage, _) = test_stash();

        stash.save("k", json!(1), Options::new().no_expiry(true));
        stash.update("k", json!(2), Options::new());
        assert!(raw_entry(&storage, "k").unwrap().is_permanent());
    }

    #[test]
    fn test_update_with_no_expiry_false_keeps_ttl() {
        let (stash, storage, _) = test_stash();

        stash.save("k", json!(1), Options::new().expiry(3.0));
        stash.update("k", json!(2), Options::new().no_expiry(false));
        assert_eq!(raw_entry(&storage, "k").unwrap().days, Some(3.0));

        let from_json = Options::from_json(&json!({"no_expiry": false}));
        stash.update("k", json!(3), from_json);
        assert_eq!(raw_entry(&storage, "k").unwrap().days, Some(3.0));
    }

    #[test]
    fn test_unrepresentable_expiry_is_rejected() {
        let (stash, storage, _) = test_stash();

        assert!(!stash.save("huge", json!(1), Options::from_json(&json!({"expiry": 1e300}))));
        assert!(!stash.save("inf", json!(1), Options::new().expiry(f64::INFINITY)));
        assert!(raw_entry(&storage, "huge").is_none());
        assert!(raw_entry(&storage, "inf").is_none());

        assert!(stash.save("ok", json!(1), Options::new().expiry(1.0)));
        assert!(!stash.update("ok", json!(2), Options::new().expiry(1e300)));
        assert_eq!(raw_entry(&storage, "ok").unwrap().data, json!(1));
    }

    #[test]
    fn test_attribute_path_get_and_update() {
        let (stash, _, _) = test_stash();

        stash.save("k", json!({"a": {"b": 1}}), Options::new());
        assert_eq!(stash.get("k.b", Options::new()).unwrap(), Some(json!(1)));
        assert_eq!(stash.get("k.a.b", Options::new()).unwrap(), Some(json!(1)));
        assert_eq!(stash.get("k.a.missing", Options::new()).unwrap(), None);

        assert!(stash.update("k.b", json!(2), Options::new()));
        assert_eq!(
            stash.get("k", Options::new()).unwrap(),
            Some(json!({"a": {"b": 2}}))
        );
    }

    #[test]
    fn test_attribute_update_keeps_parent_ttl() {
        let (stash, storage, _) = test_stash();

        stash.save("k", json!({"a": 1}), Options::new().expiry(4.0));
        stash.update("k.a", json!(5), Options::new());
        let entry = raw_entry(&storage, "k").unwrap();
        assert_eq!(entry.days, Some(4.0));
        assert_eq!(entry.data, json!({"a": 5}));
    }

    #[test]
    fn test_attribute_path_rejected_on_create() {
        let (stash, storage, _) = test_stash();

        stash.save("k", json!({"a": 1}), Options::new());
        assert!(!stash.save("k.a", json!(2), Options::new()));
        assert_eq!(raw_entry(&storage, "k").unwrap().data, json!({"a": 1}));
    }

    #[test]
    fn test_attribute_update_without_parent_fails() {
        let (stash, storage, _) = test_stash();

        assert!(!stash.update("missing.a", json!(1), Options::new()));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_empty_attribute_path_replaces_value() {
        let (stash, _, _) = test_stash();

        stash.save("k", json!({"a": 1}), Options::new());
        assert!(stash.update("k.", json!("plain"), Options::new()));
        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!("plain")));
    }

    #[test]
    fn test_custom_separator() {
        let (stash, _, _) = test_stash();

        stash.save("site.com", json!({"a": 1}), Options::new().separator("/"));
        assert_eq!(
            stash.get("site.com/a", Options::new().separator("/")).unwrap(),
            Some(json!(1))
        );
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_left_alone() {
        let (stash, storage, _) = test_stash();

        storage.set_raw("entry:k", "{not json").unwrap();
        assert_eq!(stash.get("k", Options::new()).unwrap(), None);
        assert_eq!(
            storage.get_raw("entry:k").unwrap(),
            Some("{not json".to_string())
        );
    }

    #[test]
    fn test_session_partition() {
        let (stash, persistent, _) = test_stash();

        stash.save("k", json!(1), Options::new().session(true));
        assert!(persistent.is_empty());
        assert_eq!(stash.get("k", Options::new()).unwrap(), None);
        assert_eq!(
            stash.get("k", Options::new().session(true)).unwrap(),
            Some(json!(1))
        );

        stash.remove("k", Options::new().session(true)).unwrap();
        assert_eq!(stash.get("k", Options::new().session(true)).unwrap(), None);
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let (stash, _, _) = test_stash();

        stash.save("k", json!(1), Options::new());
        stash.remove("k", Options::new()).unwrap();
        stash.remove("k", Options::new()).unwrap();
        assert_eq!(stash.get("k", Options::new()).unwrap(), None);
    }

    #[test]
    fn test_disabled_store() {
        let (stash, _, _) = test_stash();

        stash.save("k", json!(1), Options::new());
        stash.disable(true);
        assert!(stash.is_disabled());
        assert!(!stash.save("other", json!(1), Options::new()));
        assert_eq!(stash.get("k", Options::new()).unwrap(), None);

        stash.disable(false);
        assert_eq!(stash.get("k", Options::new()).unwrap(), Some(json!(1)));
        assert_eq!(stash.get("other", Options::new()).unwrap(), None);
    }

    #[test]
    fn test_clear_removes_only_store_keys() {
        let (stash, storage, _) = test_stash();

        stash.save("a", json!(1), Options::new());
        stash.save("b", json!(2), Options::new().session(true));
        storage.set_raw("request:r", r#"{"data":{"url":"u"}}"#).unwrap();
        storage.set_raw("foreign", "x").unwrap();

        stash.clear().unwrap();
        assert_eq!(storage.list_keys().unwrap(), vec!["foreign".to_string()]);
        assert_eq!(stash.get("b", Options::new().session(true)).unwrap(), None);
    }

    #[test]
    fn test_configure_defaults_json() {
        let (stash, storage, _) = test_stash();

        stash
            .configure_defaults_json(&json!({"expiry": 2, "hash_prop": "etag"}))
            .unwrap();
        assert_eq!(stash.defaults().hash_prop, "etag");

        assert!(
            stash
                .configure_defaults_json(&json!({"expiry": "2"}))
                .is_err()
        );
        assert_eq!(stash.defaults().expiry_days, 2.0);

        stash.save("k", json!(1), Options::from_json(&json!({"expiry": "x"})));
        assert_eq!(raw_entry(&storage, "k").unwrap().days, Some(2.0));

        stash.reset_defaults();
        assert_eq!(stash.defaults().expiry_days, 15.0);
    }

    #[test]
    fn test_init_records_version_and_sweeps() {
        let (stash, storage, _) = test_stash();

        stash
            .init(InitOptions {
                settings: Some(json!({"clean_interval": 1})),
                app_version: Some("1.0".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(stash.defaults().clean_interval_days, 1.0);
        let keys = storage.list_keys().unwrap();
        assert!(keys.contains(&"entry:__app_version".to_string()));
        assert!(keys.contains(&"entry:__next_sweep".to_string()));
    }

    #[test]
    fn test_init_rejects_bad_settings() {
        let (stash, _, _) = test_stash();

        let result = stash.init(InitOptions {
            settings: Some(json!({"save_params": "no"})),
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::ConfigType { .. })));
    }
}
