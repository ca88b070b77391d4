// Application state module
// Immutable per-process state shared by every request handler

use regex::{Regex, RegexBuilder};
use std::path::PathBuf;

use super::types::Config;
use crate::http::CachePolicy;

/// Application state
///
/// Constructed once at startup and shared behind an `Arc`; nothing in here
/// changes while the server runs.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Root directory requests are resolved under
    pub root: PathBuf,
    /// Extensions that receive `Expires`/`Cache-Control`
    pub cacheable: Regex,
    /// Extensions eligible for gzip/deflate
    pub compressible: Regex,
}

impl AppState {
    /// Compile the extension matchers and capture the root directory
    pub fn new(config: Config) -> Result<Self, regex::Error> {
        let cacheable = extension_matcher(&config.cache.file_match)?;
        let compressible = extension_matcher(&config.compress.file_match)?;

        Ok(Self {
            root: PathBuf::from(&config.site.workspace),
            config,
            cacheable,
            compressible,
        })
    }

    /// Expiry policy applied to cacheable extensions
    pub const fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.config.cache.max_age)
    }

    pub fn is_cacheable(&self, extension: &str) -> bool {
        self.cacheable.is_match(extension)
    }

    pub fn is_compressible(&self, extension: &str) -> bool {
        self.compressible.is_match(extension)
    }
}

fn extension_matcher(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}
