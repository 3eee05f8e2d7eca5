use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub jwt_secret: String,
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            per_source_limit: default_per_source_limit(),
        }
    }
}

fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }
fn default_photo_bucket() -> String { "dog-photos".to_string() }
fn default_per_source_limit() -> usize { crate::services::feed::DEFAULT_PER_SOURCE_LIMIT }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with SNIFF__)
    /// 4. Well-known Supabase variables (SUPABASE_URL, SUPABASE_ANON_KEY, SUPABASE_JWT_SECRET)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            .add_source(sniff_env())
            .build()?;

        settings = apply_supabase_env(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(sniff_env())
            .build()?;

        settings.try_deserialize()
    }
}

/// `SNIFF__SERVER__PORT` maps to `server.port`
fn sniff_env() -> Environment {
    Environment::with_prefix("SNIFF")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override Supabase keys from the variables the Supabase tooling exports
fn apply_supabase_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("supabase.url", "SUPABASE_URL"),
        ("supabase.anon_key", "SUPABASE_ANON_KEY"),
        ("supabase.jwt_secret", "SUPABASE_JWT_SECRET"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, var) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
