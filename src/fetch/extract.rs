// Payload shaping.
// Transform/extract server payloads and derive revalidation hashes from cached values.

use serde_json::{Map, Value};

use crate::cache::ResolvedOptions;
use crate::error::{Result, StoreError};

/// Segment separator inside extract paths. Independent of the key separator.
const EXTRACT_PATH_SEPARATOR: char = '.';

fn split_fields(extract: &str) -> impl Iterator<Item = &str> {
    extract
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
}

/// Pick the fields named by `extract` out of `payload`.
///
/// Each comma-separated field is a dotted path; the result maps the last
/// segment of each path to the value found there. Missing and null values are
/// left out.
pub fn extract_fields(payload: &Value, extract: &str) -> Value {
    let mut result = Map::new();
    for field in split_fields(extract) {
        let segments: Vec<&str> = field
            .split(EXTRACT_PATH_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some(name) = segments.last() else {
            continue;
        };

        let found = segments
            .iter()
            .try_fold(payload, |node, segment| match node {
                Value::Object(map) => map.get(*segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            });

        if let Some(value) = found.filter(|value| !value.is_null()) {
            result.insert(name.to_string(), value.clone());
        }
    }
    Value::Object(result)
}

/// Shape a decoded payload for caching: a transform wins over extraction.
pub fn shape_payload(payload: Value, options: &ResolvedOptions) -> Result<Value> {
    if let Some(transform) = &options.transform {
        return transform(payload).map_err(StoreError::Callback);
    }

    if !options.extract.trim().is_empty() && (payload.is_object() || payload.is_array()) {
        return Ok(extract_fields(&payload, &options.extract));
    }

    Ok(payload)
}

fn hash_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Hash of a cached value to send for revalidation.
///
/// A hash resolver wins. Otherwise, for a single top-level extract field the
/// hash is read from inside that field; in every other case it is read from
/// the top of the cached value.
pub fn cached_hash(cached: &Value, options: &ResolvedOptions) -> Result<Option<String>> {
    if let Some(resolver) = &options.hash_resolver {
        return resolver(cached).map_err(StoreError::Callback);
    }

    if options.hash_prop.is_empty() {
        return Ok(None);
    }

    let extract = options.extract.trim();
    let single_field =
        !extract.is_empty() && !extract.contains(',') && !extract.contains(EXTRACT_PATH_SEPARATOR);

    let holder = if single_field {
        cached.get(extract)
    } else {
        Some(cached)
    };

    Ok(holder
        .and_then(|holder| holder.get(&options.hash_prop))
        .and_then(hash_text))
}
