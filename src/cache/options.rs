// Options resolver.
// Typed defaults owned by a store, per-call overrides, and the JSON merge paths:
// permissive at call sites, strict when configuring defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::fetch::FetchOutcome;
use crate::http::Method;
use crate::storage::Partition;

/// Default item lifetime in days.
pub const DEFAULT_EXPIRY_DAYS: f64 = 15.0;
/// Default interval between sweeps in days.
pub const DEFAULT_CLEAN_INTERVAL_DAYS: f64 = 15.0;
/// Status a server answers with when the cached copy is still current.
pub const DEFAULT_NOT_MODIFIED_STATUS: u16 = 304;
pub const DEFAULT_HASH_PROP: &str = "hash";
pub const DEFAULT_SEPARATOR: &str = ".";

/// Replaces a server payload before it is cached.
pub type TransformFn = Arc<dyn Fn(Value) -> std::result::Result<Value, String> + Send + Sync>;
/// Computes the revalidation hash of a cached value.
pub type HashResolverFn =
    Arc<dyn Fn(&Value) -> std::result::Result<Option<String>, String> + Send + Sync>;
/// Receives every fetch or send outcome.
pub type CompletionFn = Arc<dyn Fn(&FetchOutcome) + Send + Sync>;

/// Store-wide defaults every call falls back to.
#[derive(Clone)]
pub struct StoreDefaults {
    pub expiry_days: f64,
    pub auto_expiry: bool,
    /// Write entries without any expiry.
    pub no_expiry: bool,
    /// Sweep on init and wipe the store when the app version changes.
    pub auto_clean: bool,
    pub partition: Partition,
    pub clean_interval_days: f64,
    pub not_modified_status: u16,
    /// Method used by `fetch`.
    pub method: Method,
    /// Method used by `send`.
    pub send_method: Method,
    pub hash_prop: String,
    pub separator: String,
    pub extract: String,
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    /// Remember extract and params alongside the url of fetched resources.
    pub save_params: bool,
    pub transform: Option<TransformFn>,
    pub hash_resolver: Option<HashResolverFn>,
    pub on_complete: Option<CompletionFn>,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            expiry_days: DEFAULT_EXPIRY_DAYS,
            auto_expiry: true,
            no_expiry: false,
            auto_clean: true,
            partition: Partition::Persistent,
            clean_interval_days: DEFAULT_CLEAN_INTERVAL_DAYS,
            not_modified_status: DEFAULT_NOT_MODIFIED_STATUS,
            method: Method::Get,
            send_method: Method::Post,
            hash_prop: DEFAULT_HASH_PROP.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            extract: String::new(),
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            save_params: true,
            transform: None,
            hash_resolver: None,
            on_complete: None,
        }
    }
}

impl fmt::Debug for StoreDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDefaults")
            .field("expiry_days", &self.expiry_days)
            .field("auto_expiry", &self.auto_expiry)
            .field("no_expiry", &self.no_expiry)
            .field("auto_clean", &self.auto_clean)
            .field("partition", &self.partition)
            .field("clean_interval_days", &self.clean_interval_days)
            .field("not_modified_status", &self.not_modified_status)
            .field("method", &self.method)
            .field("send_method", &self.send_method)
            .field("hash_prop", &self.hash_prop)
            .field("separator", &self.separator)
            .field("extract", &self.extract)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("save_params", &self.save_params)
            .field("transform", &self.transform.is_some())
            .field("hash_resolver", &self.hash_resolver.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl StoreDefaults {
    /// Strictly merge a JSON object of settings into a copy of these defaults.
    ///
    /// Unknown names and `null` values are ignored; a value of the wrong type
    /// fails the whole merge.
    pub fn merged_with_json(&self, settings: &Value) -> Result<Self> {
        let map = settings.as_object().ok_or_else(|| StoreError::ConfigType {
            field: "<root>".to_string(),
            expected: "object",
        })?;

        let mut merged = self.clone();
        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            match Setting::parse(name, value) {
                Some(Ok(setting)) => merged.apply(setting),
                Some(Err(expected)) => {
                    return Err(StoreError::ConfigType {
                        field: name.clone(),
                        expected,
                    });
                }
                None => debug!(option = %name, "Ignoring unknown option"),
            }
        }
        Ok(merged)
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Expiry(days) => self.expiry_days = days,
            Setting::AutoExpiry(flag) => self.auto_expiry = flag,
            Setting::NoExpiry(flag) => self.no_expiry = flag,
            Setting::AutoClean(flag) => self.auto_clean = flag,
            Setting::Session(flag) => self.partition = partition_for(flag),
            Setting::CleanInterval(days) => self.clean_interval_days = days,
            Setting::NotModifiedStatus(status) => self.not_modified_status = status,
            Setting::Method(method) => self.method = method,
            Setting::SendMethod(method) => self.send_method = method,
            Setting::HashProp(prop) => self.hash_prop = prop,
            Setting::Separator(separator) => self.separator = separator,
            Setting::Extract(extract) => self.extract = extract,
            Setting::Params(params) => self.params = params,
            Setting::Headers(headers) => self.headers = headers,
            Setting::SaveParams(flag) => self.save_params = flag,
            // Per-call settings have no store-wide default.
            Setting::Url(_) | Setting::Data(_) | Setting::Overwrite(_) | Setting::SkipTouch(_) => {}
        }
    }
}

fn partition_for(session: bool) -> Partition {
    if session {
        Partition::Session
    } else {
        Partition::Persistent
    }
}

/// A single recognised option parsed out of JSON.
enum Setting {
    Expiry(f64),
    AutoExpiry(bool),
    NoExpiry(bool),
    AutoClean(bool),
    Session(bool),
    CleanInterval(f64),
    NotModifiedStatus(u16),
    Method(Method),
    SendMethod(Method),
    HashProp(String),
    Separator(String),
    Extract(String),
    Params(BTreeMap<String, String>),
    Headers(BTreeMap<String, String>),
    SaveParams(bool),
    Url(String),
    Data(Value),
    Overwrite(bool),
    SkipTouch(bool),
}

impl Setting {
    /// `None` for unknown names, `Some(Err(expected))` for a type mismatch.
    fn parse(name: &str, value: &Value) -> Option<std::result::Result<Setting, &'static str>> {
        let setting = match name {
            "expiry" => number(value).map(Setting::Expiry),
            "auto_expiry" => boolean(value).map(Setting::AutoExpiry),
            "no_expiry" => boolean(value).map(Setting::NoExpiry),
            "auto_clean" => boolean(value).map(Setting::AutoClean),
            "session" => boolean(value).map(Setting::Session),
            "clean_interval" => number(value).map(Setting::CleanInterval),
            "not_modified_status" => value
                .as_u64()
                .and_then(|status| u16::try_from(status).ok())
                .map(Setting::NotModifiedStatus)
                .ok_or("status code"),
            "method" => method(value).map(Setting::Method),
            "send_method" => method(value).map(Setting::SendMethod),
            "hash_prop" => string(value).map(Setting::HashProp),
            "separator" => string(value).map(Setting::Separator),
            "extract" => string(value).map(Setting::Extract),
            "params" => string_map(value).map(Setting::Params),
            "headers" => string_map(value).map(Setting::Headers),
            "save_params" => boolean(value).map(Setting::SaveParams),
            "url" => string(value).map(Setting::Url),
            "data" => Ok(Setting::Data(value.clone())),
            "overwrite" => boolean(value).map(Setting::Overwrite),
            "skip_touch" => boolean(value).map(Setting::SkipTouch),
            _ => return None,
        };
        Some(setting)
    }
}

fn number(value: &Value) -> std::result::Result<f64, &'static str> {
    value.as_f64().ok_or("number")
}

fn boolean(value: &Value) -> std::result::Result<bool, &'static str> {
    value.as_bool().ok_or("boolean")
}

fn string(value: &Value) -> std::result::Result<String, &'static str> {
    value.as_str().map(str::to_string).ok_or("string")
}

fn method(value: &Value) -> std::result::Result<Method, &'static str> {
    value
        .as_str()
        .and_then(|name| name.parse().ok())
        .ok_or("request method")
}

fn string_map(value: &Value) -> std::result::Result<BTreeMap<String, String>, &'static str> {
    const EXPECTED: &str = "object of scalar values";
    let map = value.as_object().ok_or(EXPECTED)?;
    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(EXPECTED),
            };
            Ok((key.clone(), text))
        })
        .collect()
}

/// Per-call options. Every unset field falls back to the store defaults.
#[derive(Clone, Default)]
pub struct Options {
    pub url: Option<String>,
    /// Request body for write-style sends.
    pub data: Option<Value>,
    pub expiry: Option<f64>,
    pub auto_expiry: Option<bool>,
    pub no_expiry: Option<bool>,
    /// Replace an existing entry instead of refusing to create over it.
    pub overwrite: Option<bool>,
    /// Read without sliding the entry's expiry forward.
    pub skip_touch: Option<bool>,
    pub partition: Option<Partition>,
    pub not_modified_status: Option<u16>,
    pub method: Option<Method>,
    pub hash_prop: Option<String>,
    pub separator: Option<String>,
    pub extract: Option<String>,
    pub params: Option<BTreeMap<String, String>>,
    pub headers: Option<BTreeMap<String, String>>,
    pub save_params: Option<bool>,
    pub transform: Option<TransformFn>,
    pub hash_resolver: Option<HashResolverFn>,
    pub on_complete: Option<CompletionFn>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("url", &self.url)
            .field("expiry", &self.expiry)
            .field("overwrite", &self.overwrite)
            .field("partition", &self.partition)
            .field("method", &self.method)
            .field("extract", &self.extract)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON object, dropping any field of the wrong type
    /// so that it resolves to the store default.
    pub fn from_json(settings: &Value) -> Self {
        let mut options = Self::default();
        let Some(map) = settings.as_object() else {
            return options;
        };

        for (name, value) in map {
            match Setting::parse(name, value) {
                Some(Ok(setting)) => options.apply(setting),
                Some(Err(expected)) => {
                    debug!(option = %name, expected, "Option has wrong type, using default");
                }
                None => {}
            }
        }
        options
    }

    fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Expiry(days) => self.expiry = Some(days),
            Setting::AutoExpiry(flag) => self.auto_expiry = Some(flag),
            Setting::NoExpiry(flag) => self.no_expiry = Some(flag),
            Setting::Session(flag) => self.partition = Some(partition_for(flag)),
            Setting::NotModifiedStatus(status) => self.not_modified_status = Some(status),
            Setting::Method(method) => self.method = Some(method),
            Setting::HashProp(prop) => self.hash_prop = Some(prop),
            Setting::Separator(separator) => self.separator = Some(separator),
            Setting::Extract(extract) => self.extract = Some(extract),
            Setting::Params(params) => self.params = Some(params),
            Setting::Headers(headers) => self.headers = Some(headers),
            Setting::SaveParams(flag) => self.save_params = Some(flag),
            Setting::Url(url) => self.url = Some(url),
            Setting::Data(data) => self.data = Some(data),
            Setting::Overwrite(flag) => self.overwrite = Some(flag),
            Setting::SkipTouch(flag) => self.skip_touch = Some(flag),
            // Store-wide only.
            Setting::AutoClean(_) | Setting::CleanInterval(_) | Setting::SendMethod(_) => {}
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn expiry(mut self, days: f64) -> Self {
        self.expiry = Some(days);
        self
    }

    pub fn auto_expiry(mut self, flag: bool) -> Self {
        self.auto_expiry = Some(flag);
        self
    }

    pub fn no_expiry(mut self, flag: bool) -> Self {
        self.no_expiry = Some(flag);
        self
    }

    pub fn overwrite(mut self, flag: bool) -> Self {
        self.overwrite = Some(flag);
        self
    }

    pub fn skip_touch(mut self, flag: bool) -> Self {
        self.skip_touch = Some(flag);
        self
    }

    pub fn session(mut self, flag: bool) -> Self {
        self.partition = Some(partition_for(flag));
        self
    }

    pub fn not_modified_status(mut self, status: u16) -> Self {
        self.not_modified_status = Some(status);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn hash_prop(mut self, prop: impl Into<String>) -> Self {
        self.hash_prop = Some(prop.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn extract(mut self, extract: impl Into<String>) -> Self {
        self.extract = Some(extract.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn save_params(mut self, flag: bool) -> Self {
        self.save_params = Some(flag);
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn hash_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Option<String>, String> + Send + Sync + 'static,
    {
        self.hash_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FetchOutcome) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    /// Fill every unset field from `defaults`.
    pub fn resolve(self, defaults: &StoreDefaults) -> ResolvedOptions {
        let fallback = defaults.method;
        self.resolve_with_method(defaults, fallback)
    }

    /// Like `resolve`, with a different default request method.
    pub fn resolve_with_method(self, defaults: &StoreDefaults, fallback: Method) -> ResolvedOptions {
        ResolvedOptions {
            url: self.url,
            data: self.data,
            expiry_explicit: self.expiry.is_some() || self.no_expiry == Some(true),
            expiry_days: self.expiry.unwrap_or(defaults.expiry_days),
            auto_expiry: self.auto_expiry.unwrap_or(defaults.auto_expiry),
            no_expiry: self.no_expiry.unwrap_or(defaults.no_expiry),
            overwrite: self.overwrite.unwrap_or(false),
            skip_touch: self.skip_touch.unwrap_or(false),
            partition: self.partition.unwrap_or(defaults.partition),
            not_modified_status: self
                .not_modified_status
                .unwrap_or(defaults.not_modified_status),
            method: self.method.unwrap_or(fallback),
            hash_prop: self.hash_prop.unwrap_or_else(|| defaults.hash_prop.clone()),
            separator: self.separator.unwrap_or_else(|| defaults.separator.clone()),
            extract: self.extract.unwrap_or_else(|| defaults.extract.clone()),
            params: self.params.unwrap_or_else(|| defaults.params.clone()),
            headers: self.headers.unwrap_or_else(|| defaults.headers.clone()),
            save_params: self.save_params.unwrap_or(defaults.save_params),
            transform: self.transform.or_else(|| defaults.transform.clone()),
            hash_resolver: self.hash_resolver.or_else(|| defaults.hash_resolver.clone()),
            on_complete: self.on_complete.or_else(|| defaults.on_complete.clone()),
        }
    }
}

/// Fully populated options, ready to pass between internal calls.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub url: Option<String>,
    pub data: Option<Value>,
    /// Whether the caller chose the expiry rather than inheriting it.
    pub expiry_explicit: bool,
    pub expiry_days: f64,
    pub auto_expiry: bool,
    pub no_expiry: bool,
    pub overwrite: bool,
    pub skip_touch: bool,
    pub partition: Partition,
    pub not_modified_status: u16,
    pub method: Method,
    pub hash_prop: String,
    pub separator: String,
    pub extract: String,
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub save_params: bool,
    pub transform: Option<TransformFn>,
    pub hash_resolver: Option<HashResolverFn>,
    pub on_complete: Option<CompletionFn>,
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("url", &self.url)
            .field("expiry_days", &self.expiry_days)
            .field("expiry_explicit", &self.expiry_explicit)
            .field("overwrite", &self.overwrite)
            .field("partition", &self.partition)
            .field("method", &self.method)
            .field("extract", &self.extract)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl ResolvedOptions {
    /// Whether writes made with these options should carry an expiry.
    pub fn expires(&self) -> bool {
        self.auto_expiry && !self.no_expiry
    }
}
