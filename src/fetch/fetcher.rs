// Revalidating fetcher.
// Builds requests from resolved options, sends the cached hash upstream, and
// folds the response back into the store.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::keys::validate_key;
use crate::cache::{Namespace, Options, ResolvedOptions, Stash};
use crate::error::{Result, StoreError};
use crate::http::{HttpRequest, Method, is_json_resource};

use super::extract::{cached_hash, shape_payload};
use super::outcome::FetchOutcome;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

impl Stash {
    /// Fetch `key` from its url, revalidating against the cached copy.
    ///
    /// Options left unset are filled from the request registered for `key`.
    pub async fn fetch(&self, key: &str, options: Options) -> FetchOutcome {
        let mut options = self.resolve(options);
        let outcome = match self.prepare_fetch(key, &mut options) {
            Ok(cached) => self.execute(key, &options, cached).await,
            Err(e) => FetchOutcome::Error(e),
        };
        complete(&options, outcome)
    }

    /// Send a create, update or delete style request for `key`.
    pub async fn send(&self, key: &str, options: Options) -> FetchOutcome {
        let defaults = self.defaults();
        let fallback = defaults.send_method;
        let mut options = options.resolve_with_method(&defaults, fallback);

        let outcome = match validate_key(key) {
            Ok(()) => {
                if options.url.is_none() {
                    options.url = self.request_spec(key).map(|spec| spec.url);
                }
                let cached = self.cached_value(key, &options);
                self.execute(key, &options, cached).await
            }
            Err(e) => FetchOutcome::Error(e),
        };
        complete(&options, outcome)
    }

    fn cached_value(&self, key: &str, options: &ResolvedOptions) -> Option<Value> {
        let mut peek = options.clone();
        peek.skip_touch = true;
        self.get_resolved(key, &peek).ok().flatten()
    }

    /// Merge the registered request into `options` and attach the cached hash.
    fn prepare_fetch(&self, key: &str, options: &mut ResolvedOptions) -> Result<Option<Value>> {
        validate_key(key)?;

        if let Some(spec) = self.request_spec(key) {
            if options.url.is_none() {
                options.url = Some(spec.url);
            }
            if options.extract.is_empty() {
                if let Some(extract) = spec.extract {
                    options.extract = extract;
                }
            }
            if options.params.is_empty() {
                if let Some(params) = spec.params {
                    options.params = params;
                }
            }
        }

        if options.url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            return Err(StoreError::MissingUrl);
        }

        let cached = self.cached_value(key, options);
        if let Some(cached) = &cached {
            if let Some(hash) = cached_hash(cached, options)? {
                if !options.hash_prop.is_empty() {
                    options
                        .params
                        .entry(options.hash_prop.clone())
                        .or_insert(hash);
                }
            }
        }
        Ok(cached)
    }

    async fn execute(
        &self,
        key: &str,
        options: &ResolvedOptions,
        cached: Option<Value>,
    ) -> FetchOutcome {
        let request = match build_request(options) {
            Ok(request) => request,
            Err(e) => return FetchOutcome::Error(e),
        };
        let json = is_json_resource(&request.url);
        debug!(key, method = %request.method, url = %request.url, "Dispatching request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(key, error = %e, "Request failed");
                return FetchOutcome::Error(e);
            }
        };

        if response.status == options.not_modified_status {
            debug!(key, "Resource not modified");
            self.remember(key, options);
            return FetchOutcome::NotModified(cached);
        }

        if response.status != 200 {
            debug!(key, status = response.status, "Request unsuccessful");
            return FetchOutcome::Failed {
                status: response.status,
                body: response.body,
            };
        }

        if options.method == Method::Delete {
            self.forget(key, options);
        }

        let payload = if json && response.body.trim().is_empty() {
            Value::Null
        } else if json {
            match serde_json::from_str::<Value>(&response.body) {
                Ok(payload) => payload,
                Err(e) => return FetchOutcome::Error(e.into()),
            }
        } else {
            Value::String(response.body)
        };

        let value = match shape_payload(payload, options) {
            Ok(value) => value,
            Err(e) => return FetchOutcome::Error(e),
        };

        if options.method != Method::Delete {
            let mut write = options.clone();
            write.overwrite = true;
            self.save_resolved(Namespace::Entry, key, value.clone(), &write);
            self.remember(key, options);
        }

        FetchOutcome::Success(value)
    }

    /// Drop the cached entry and registered request of a deleted resource.
    fn forget(&self, key: &str, options: &ResolvedOptions) {
        if let Err(e) = self
            .storage(options.partition)
            .remove_raw(&Namespace::Entry.wrap(key))
        {
            warn!(key, error = %e, "Failed to remove deleted resource");
        }
        if let Err(e) = self.unregister_request(key) {
            warn!(key, error = %e, "Failed to unregister deleted resource");
        }
    }

    fn remember(&self, key: &str, options: &ResolvedOptions) {
        if let Err(e) = self.register_resolved(key, options) {
            warn!(key, error = %e, "Failed to register request");
        }
    }
}

fn complete(options: &ResolvedOptions, outcome: FetchOutcome) -> FetchOutcome {
    if let Some(callback) = &options.on_complete {
        callback(&outcome);
    }
    outcome
}

/// Build the outgoing request: query params for body-less methods, a body for writes.
fn build_request(options: &ResolvedOptions) -> Result<HttpRequest> {
    let url = options
        .url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or(StoreError::MissingUrl)?;
    let json = is_json_resource(url);

    let mut headers = options.headers.clone();
    let mut body = None;
    let url = if options.method.is_write() {
        let (data, query) = write_payload(options, json);
        if let Some(data) = data {
            if json {
                if !headers
                    .keys()
                    .any(|name| name.eq_ignore_ascii_case("content-type"))
                {
                    headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
                }
                body = Some(serde_json::to_string(&data)?);
            } else {
                body = Some(match data {
                    Value::String(text) => text,
                    other => other.to_string(),
                });
            }
        }
        with_query(url, &query)?
    } else {
        with_query(url, &options.params)?
    };

    Ok(HttpRequest {
        method: options.method,
        url,
        headers,
        body,
    })
}

/// Split a write request's params between the body and the query string.
///
/// Params (the revalidation hash included) are folded into a JSON object body,
/// or form one when there is no data. Any other body leaves them on the query.
fn write_payload(
    options: &ResolvedOptions,
    json: bool,
) -> (Option<Value>, BTreeMap<String, String>) {
    let params = &options.params;
    match &options.data {
        Some(Value::Object(data)) if json => {
            let mut merged = data.clone();
            for (name, value) in params {
                merged
                    .entry(name.clone())
                    .or_insert_with(|| Value::String(value.clone()));
            }
            (Some(Value::Object(merged)), BTreeMap::new())
        }
        None if json && !params.is_empty() => {
            let merged: Map<String, Value> = params
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            (Some(Value::Object(merged)), BTreeMap::new())
        }
        data => (data.clone(), params.clone()),
    }
}

fn with_query(url: &str, params: &BTreeMap<String, String>) -> Result<String> {
    if params.is_empty() {
        return Ok(url.to_string());
    }

    let mut parsed = reqwest::Url::parse(url)
        .map_err(|e| StoreError::TransportFailed(format!("invalid url {}: {}", url, e)))?;
    {
        let mut pairs = parsed.query_pairs_mut();
        for (name, value) in params {
            pairs.append_pair(name, value);
        }
    }
    Ok(parsed.to_string())
}
