//! HTTP Range request parsing module
//!
//! Single-range parsing of `<start>-<end>` values against a known resource size.

/// Inclusive byte window into a resource, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position
    pub start: u64,
    /// Last byte position (inclusive)
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A `ByteRange` always covers at least one byte
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Value for the `Content-Range` header
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{size}", self.start, self.end)
    }
}

/// Parse a Range header value (single range only)
///
/// Supported formats, with or without a leading `bytes=` unit:
/// - `start-end` - Specific range
/// - `start-` - From start to end of resource
/// - `-suffix` - Last `suffix` bytes
///
/// Returns `None` when the range cannot be satisfied; the caller answers 416.
/// Only `end` is bounds-checked against `size`; `start` is validated solely
/// through `start <= end`.
///
/// # Examples
/// ```
/// use static_server::http::range::{parse_range, ByteRange};
///
/// assert_eq!(parse_range("0-4", 10), Some(ByteRange { start: 0, end: 4 }));
/// assert_eq!(parse_range("bytes=-3", 10), Some(ByteRange { start: 7, end: 9 }));
/// assert_eq!(parse_range("100-200", 10), None);
/// ```
pub fn parse_range(value: &str, size: u64) -> Option<ByteRange> {
    let value = value.trim();
    let value = value.strip_prefix("bytes=").unwrap_or(value);

    let mut parts = value.split('-');
    let start = parts.next().and_then(parse_bound);
    let end = parts.next().and_then(parse_bound);

    let (start, end) = match (start, end) {
        // Suffix range: "-500" means last 500 bytes
        (None, Some(suffix)) => (size.checked_sub(suffix), size.checked_sub(1)),
        // Open-ended range: "500-" runs to the last byte
        (Some(start), None) => (Some(start), size.checked_sub(1)),
        (start, end) => (start, end),
    };

    let (Some(start), Some(end)) = (start, end) else {
        return suffix_beyond_size(value, size);
    };

    if start > end || end >= size {
        return None;
    }

    Some(ByteRange { start, end })
}

/// A suffix longer than the resource selects the whole resource.
fn suffix_beyond_size(value: &str, size: u64) -> Option<ByteRange> {
    let suffix = value.strip_prefix('-').and_then(parse_bound)?;
    (suffix > size && size > 0).then(|| ByteRange {
        start: 0,
        end: size - 1,
    })
}

/// Read the leading run of digits; trailing text (`"1,5"`) is ignored
fn parse_bound(raw: &str) -> Option<u64> {
    let raw = raw.trim_start();
    let digits = raw
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw, |idx| &raw[..idx]);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
