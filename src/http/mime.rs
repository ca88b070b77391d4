//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

/// Content type used when the extension is unknown or absent
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Get MIME Content-Type based on a lowercase file extension (no dot)
///
/// # Examples
/// ```
/// use static_server::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html");
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(None), "text/plain");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain",
        Some("xml") => "text/xml",
        Some("csv") => "text/csv",

        // JavaScript/WASM
        Some("js" | "mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("tif" | "tiff") => "image/tiff",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/x-wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("wma") => "audio/x-ms-wma",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        // Documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("swf") => "application/x-shockwave-flash",

        // Default
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), "text/html");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("js")), "text/javascript");
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("png")), "image/png");
        assert_eq!(get_content_type(Some("mp4")), "video/mp4");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "text/plain");
        assert_eq!(get_content_type(None), "text/plain");
    }
}
