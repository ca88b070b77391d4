// Configuration module entry point
// Loads layered configuration and exposes the immutable runtime state

mod state;
mod types;

// Re-export public types
pub use state::AppState;
pub use types::{
    CacheConfig, CompressConfig, Config, ConfigOverrides, LoggingConfig, ServerConfig, SiteConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, config file,
    /// `SERVER_*` environment variables, caller overrides.
    pub fn load_from(
        config_path: &str,
        overrides: &ConfigOverrides,
    ) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("site.workspace", overrides.workspace.clone())?
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("site.default_page", overrides.default_page.clone())?
            .set_override_option("site.view_dir", overrides.view_dir)?
            .set_override_option("cache.enabled", overrides.use_cache)?
            .set_override_option("compress.enabled", overrides.use_compress)?
            .build()?;

        settings.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_port_attempts", 100)?
            .set_default("site.workspace", "assets")?
            .set_default("site.default_page", "page.html")?
            .set_default("site.view_dir", false)?
            .set_default("cache.enabled", true)?
            .set_default("cache.file_match", "^(gif|png|jpg|js|css)$")?
            .set_default("cache.max_age", 60 * 60 * 24 * 365)?
            .set_default("compress.enabled", true)?
            .set_default("compress.file_match", "^(css|js|html)$")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")
    }
}
