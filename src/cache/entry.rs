// Stored cache entry.
// The `{data, exp?, days?}` record every key in the store serializes to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};

use super::clock::days_from;

/// Wrapper for stored data with expiry metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value.
    pub data: Value,
    /// Absolute expiry in Unix milliseconds; absent for permanent entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Lifetime in days that produced `exp`, reused when the entry is touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<f64>,
}

impl CacheEntry {
    /// Create an entry that never expires.
    pub fn permanent(data: Value) -> Self {
        Self {
            data,
            exp: None,
            days: None,
        }
    }

    /// Create an entry expiring `days` after `now`.
    pub fn expiring(data: Value, days: f64, now: i64) -> Result<Self> {
        let exp = days_from(now, days).ok_or(StoreError::InvalidExpiry(days))?;
        Ok(Self {
            data,
            exp: Some(exp),
            days: Some(days),
        })
    }

    /// Parse a stored record.
    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize for storage.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check if this entry has expired at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }

    pub fn is_permanent(&self) -> bool {
        self.exp.is_none()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(DateTime::from_timestamp_millis)
    }

    /// The same entry with its expiry slid forward from `now`, if it expires at all.
    pub fn touched(&self, now: i64) -> Option<Self> {
        let days = self.days?;
        self.exp?;
        Self::expiring(self.data.clone(), days, now).ok()
    }
}
