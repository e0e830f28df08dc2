// Request registry.
// Remembers the url, extract spec and params a resource was fetched with,
// so a later bare fetch can replay them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::keys::validate_key;
use crate::cache::{CacheEntry, Namespace, Options, ResolvedOptions, Stash};
use crate::error::{Result, StoreError};
use crate::storage::Partition;

/// Remembered fetch parameters for a resource key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

impl RequestSpec {
    fn from_options(options: &ResolvedOptions) -> Result<Self> {
        let url = options
            .url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or(StoreError::MissingUrl)?;

        let extract = Some(options.extract.clone())
            .filter(|extract| options.save_params && !extract.is_empty());
        // The revalidation hash belongs to one request only.
        let mut params = options.params.clone();
        params.remove(&options.hash_prop);
        let params = Some(params).filter(|params| options.save_params && !params.is_empty());

        Ok(Self {
            url,
            extract,
            params,
        })
    }
}

impl Stash {
    /// Remember how to fetch `key`. Requires a url.
    pub fn register_request(&self, key: &str, options: Options) -> Result<()> {
        let options = self.resolve(options);
        self.register_resolved(key, &options)
    }

    /// Register several resources at once, stopping at the first failure.
    pub fn register_requests<I, K>(&self, requests: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Options)>,
        K: AsRef<str>,
    {
        for (key, options) in requests {
            self.register_request(key.as_ref(), options)?;
        }
        Ok(())
    }

    /// Forget how to fetch `key`. The cached value itself is kept.
    pub fn unregister_request(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.storage(Partition::Persistent)
            .remove_raw(&Namespace::Request.wrap(key))
    }

    pub fn unregister_requests<I, K>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.unregister_request(key.as_ref())?;
        }
        Ok(())
    }

    /// The request remembered for `key`, if any.
    pub fn request_spec(&self, key: &str) -> Option<RequestSpec> {
        if self.is_disabled() || validate_key(key).is_err() {
            return None;
        }

        let entry = self.read_entry(Namespace::Request, key, Partition::Persistent)?;
        match serde_json::from_value(entry.data) {
            Ok(spec) => Some(spec),
            Err(e) => {
                debug!(key, error = %e, "Unreadable request spec, ignoring");
                None
            }
        }
    }

    pub(crate) fn register_resolved(&self, key: &str, options: &ResolvedOptions) -> Result<()> {
        if self.is_disabled() {
            return Err(StoreError::Disabled);
        }
        validate_key(key)?;

        let spec = RequestSpec::from_options(options)?;
        let entry = CacheEntry::permanent(serde_json::to_value(&spec)?);
        self.write_entry(Namespace::Request, key, Partition::Persistent, &entry)?;
        debug!(key, url = %spec.url, "Registered request");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::tests::test_stash;
    use crate::storage::Storage;
    use chrono::Duration;

    #[test]
    fn test_register_and_read_spec() {
        let (stash, storage, clock) = test_stash();

        stash
            .register_request(
                "users",
                Options::new()
                    .url("https://api.example.com/users.json")
                    .extract("items")
                    .param("page", "2"),
            )
            .unwrap();

        clock.advance(Duration::days(3650));
        let spec = stash.request_spec("users").unwrap();
        assert_eq!(spec.url, "https://api.example.com/users.json");
        assert_eq!(spec.extract.as_deref(), Some("items"));
        assert_eq!(
            spec.params,
            Some(BTreeMap::from([("page".to_string(), "2".to_string())]))
        );
        assert!(storage.get_raw("request:users").unwrap().is_some());
        assert!(storage.get_raw("entry:users").unwrap().is_none());
    }

    #[test]
    fn test_register_without_save_params_keeps_only_url() {
        let (stash, _, _) = test_stash();

        stash
            .register_request(
                "users",
                Options::new()
                    .url("https://api.example.com/users")
                    .extract("items")
                    .param("page", "2")
                    .save_params(false),
            )
            .unwrap();

        let spec = stash.request_spec("users").unwrap();
        assert_eq!(spec.extract, None);
        assert_eq!(spec.params, None);
    }

    #[test]
    fn test_register_drops_hash_param() {
        let (stash, _, _) = test_stash();

        stash
            .register_request(
                "users",
                Options::new()
                    .url("https://api.example.com/users")
                    .param("hash", "h1"),
            )
            .unwrap();
        assert_eq!(stash.request_spec("users").unwrap().params, None);
    }

    #[test]
    fn test_register_requires_url() {
        let (stash, _, _) = test_stash();

        assert!(matches!(
            stash.register_request("users", Options::new()),
            Err(StoreError::MissingUrl)
        ));
        assert!(matches!(
            stash.register_request("", Options::new().url("u")),
            Err(StoreError::InvalidKey)
        ));
    }

    #[test]
    fn test_batch_register_and_unregister() {
        let (stash, storage, _) = test_stash();

        stash
            .register_requests([
                ("a", Options::new().url("https://example.com/a")),
                ("b", Options::new().url("https://example.com/b")),
            ])
            .unwrap();
        assert!(stash.request_spec("a").is_some());
        assert!(stash.request_spec("b").is_some());

        stash.unregister_requests(["a", "b"]).unwrap();
        assert!(stash.request_spec("a").is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_corrupt_spec_is_ignored() {
        let (stash, storage, _) = test_stash();

        storage
            .set_raw("request:users", r#"{"data":{"no_url":true}}"#)
            .unwrap();
        assert!(stash.request_spec("users").is_none());
    }
}
