//! Content-encoding negotiation
//!
//! Picks an on-the-fly compression scheme from the client's `Accept-Encoding`.

use regex::Regex;
use std::sync::LazyLock;

static GZIP_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgzip\b").expect("gzip token regex should be valid"));
static DEFLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdeflate\b").expect("deflate token regex should be valid"));

/// Supported response encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    /// zlib-wrapped deflate, as HTTP's `deflate` coding specifies
    Deflate,
}

impl Encoding {
    /// Get the content-encoding header value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    /// Select an encoding from an `Accept-Encoding` value
    ///
    /// `gzip` wins whenever it appears as a whole word, otherwise `deflate`.
    /// Quality values are not interpreted.
    pub fn negotiate(accept_encoding: Option<&str>) -> Option<Self> {
        let accept = accept_encoding?;
        if GZIP_TOKEN.is_match(accept) {
            Some(Self::Gzip)
        } else if DEFLATE_TOKEN.is_match(accept) {
            Some(Self::Deflate)
        } else {
            None
        }
    }
}
