//! HTTP cache control module
//!
//! Provides validation token generation (`Last-Modified` + `ETag`),
//! expiry headers and conditional request evaluation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cache validators derived from a resource's stat data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationToken {
    /// Modification time as an HTTP-date
    pub last_modified: String,
    /// Base64 MD5 digest over `"{mtime_ms}{size}"`
    pub etag: String,
}

impl ValidationToken {
    /// Compute validators from modification time and size.
    ///
    /// Deterministic: the same (mtime, size) pair always yields the same token.
    pub fn new(modified: SystemTime, size: u64) -> Self {
        let mtime_ms = modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let digest = md5::compute(format!("{mtime_ms}{size}"));

        Self {
            last_modified: httpdate::fmt_http_date(modified),
            etag: STANDARD.encode(digest.0),
        }
    }

    /// Check the request's conditional headers against this token
    ///
    /// A hit requires both `If-Modified-Since` and `If-None-Match` to be
    /// present and each to equal the freshly computed value exactly.
    /// A missing header or any single mismatch is a miss.
    pub fn is_fresh(&self, if_modified_since: Option<&str>, if_none_match: Option<&str>) -> bool {
        match (if_modified_since, if_none_match) {
            (Some(since), Some(tag)) => since == self.last_modified && tag == self.etag,
            _ => false,
        }
    }
}

/// Cache control policy for resources matching the cacheable pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Lifetime in seconds
    pub max_age: u64,
}

impl CachePolicy {
    pub const fn new(max_age: u64) -> Self {
        Self { max_age }
    }

    /// Convert to Cache-Control header value
    pub fn cache_control(self) -> String {
        format!("max-age={}", self.max_age)
    }

    /// `Expires` header value counted from `now`
    pub fn expires(self, now: SystemTime) -> String {
        httpdate::fmt_http_date(now + Duration::from_secs(self.max_age))
    }
}
