// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
///
/// Built once at startup, read-only afterwards.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub cache: CacheConfig,
    pub compress: CompressConfig,
    pub logging: LoggingConfig,
}

/// Listening socket configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Preferred port; the next free one is used when taken
    pub port: u16,
    /// Upper bound on ports tried upward from `port`
    pub max_port_attempts: u16,
    pub workers: Option<usize>,
}

/// What is served and how directories behave
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Root directory every request path is resolved under
    pub workspace: String,
    /// Index file served for a directory when listing is off
    pub default_page: String,
    /// List directory contents instead of serving `default_page`
    pub view_dir: bool,
}

/// Conditional caching and expiry
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Regex tested against the file extension to attach `Expires`/`Cache-Control`
    pub file_match: String,
    /// Lifetime in seconds for matching files
    pub max_age: u64,
}

/// On-the-fly compression
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompressConfig {
    pub enabled: bool,
    /// Regex tested against the file extension to allow gzip/deflate
    pub file_match: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Values supplied by the caller on top of file and environment sources
///
/// `None` leaves the underlying value untouched.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub workspace: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub default_page: Option<String>,
    pub view_dir: Option<bool>,
    pub use_cache: Option<bool>,
    pub use_compress: Option<bool>,
}
