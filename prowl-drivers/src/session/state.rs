//! Serializable capture of an authenticated browsing context.
//!
//! The on-disk shape is the storage-state snapshot produced by common
//! browser-automation tools: `{ "cookies": [...], "origins": [...] }`.
//! Unknown cookie keys are preserved on round-trip.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Expiry in epoch seconds; `-1` or absent marks a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl StoredCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_cookie_path(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
            extra: Map::new(),
        }
    }

    pub fn expiring_at(mut self, epoch_seconds: f64) -> Self {
        self.expires = Some(epoch_seconds);
        self
    }

    /// True iff the cookie has an expiry strictly after `now`.
    pub fn outlives(&self, now: f64) -> bool {
        self.expires.is_some_and(|expires| expires > now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginState {
    pub origin: String,
    #[serde(default)]
    pub local_storage: Vec<StorageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

impl StorageState {
    /// Valid iff at least one cookie expires strictly after `now` (epoch seconds).
    pub fn is_valid_at(&self, now: f64) -> bool {
        self.cookies.iter().any(|cookie| cookie.outlives(now))
    }

    /// [`is_valid_at`](Self::is_valid_at) evaluated against the wall clock.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_epoch_seconds())
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.origins.is_empty()
    }

    pub fn origin(&self, origin: &str) -> Option<&OriginState> {
        self.origins.iter().find(|o| o.origin == origin)
    }
}

pub fn now_epoch_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
