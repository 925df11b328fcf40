//! Gateway configuration loading
//!
//! Every setting resolves through the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. `MOODIFY_*` environment variable
//! 3. TOML config file (`moodify/config.toml` under the platform config dir)
//! 4. Compiled default (fallback)

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Resolved gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the Catalog Store (song records + signed URLs)
    pub catalog_url: String,
    /// Base URL of the Library Store (per-user memberships)
    pub library_url: String,
    /// Base URL of the Collection Store (playlists + playlist-song joins)
    pub collection_url: String,
    /// Base URL of the Identity Store (sessions)
    pub identity_url: String,
    /// Address the gateway binds to
    pub bind_addr: String,
    /// HTTP timeout for calls to the backing stores, in seconds
    pub http_timeout_secs: u64,
    /// Concurrency cap for the per-playlist hydration fan-out
    pub hydration_concurrency: usize,
    /// Service credential attached to store calls (bearer token)
    pub service_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            catalog_url: "http://127.0.0.1:5002".to_string(),
            library_url: "http://127.0.0.1:5003".to_string(),
            collection_url: "http://127.0.0.1:5001".to_string(),
            identity_url: "http://127.0.0.1:5000".to_string(),
            bind_addr: "127.0.0.1:5080".to_string(),
            http_timeout_secs: 10,
            hydration_concurrency: 4,
            service_token: None,
        }
    }
}

/// Per-field command-line overrides (filled from clap in the gateway binary)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_url: Option<String>,
    pub library_url: Option<String>,
    pub collection_url: Option<String>,
    pub identity_url: Option<String>,
    pub bind_addr: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub hydration_concurrency: Option<usize>,
    pub service_token: Option<String>,
}

/// Shape of the optional TOML config file (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub catalog_url: Option<String>,
    pub library_url: Option<String>,
    pub collection_url: Option<String>,
    pub identity_url: Option<String>,
    pub bind_addr: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub hydration_concurrency: Option<usize>,
    pub service_token: Option<String>,
}

impl FileConfig {
    pub fn parse(toml_text: &str) -> Result<Self> {
        toml::from_str(toml_text).map_err(|e| Error::Config(format!("invalid config file: {}", e)))
    }
}

impl GatewayConfig {
    /// Resolve configuration from CLI overrides, the process environment,
    /// and the platform config file.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let file = load_config_file().unwrap_or_default();
        Self::merge(overrides, |name| std::env::var(name).ok(), file)
    }

    fn merge(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> Self {
        let defaults = Self::default();

        let pick = |cli: Option<String>, env_name: &str, file_val: Option<String>, dflt: String| {
            cli.or_else(|| env(env_name)).or(file_val).unwrap_or(dflt)
        };

        let http_timeout_secs = overrides
            .http_timeout_secs
            .or_else(|| env("MOODIFY_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()))
            .or(file.http_timeout_secs)
            .unwrap_or(defaults.http_timeout_secs);

        let hydration_concurrency = overrides
            .hydration_concurrency
            .or_else(|| env("MOODIFY_HYDRATION_CONCURRENCY").and_then(|v| v.parse().ok()))
            .or(file.hydration_concurrency)
            .unwrap_or(defaults.hydration_concurrency)
            .max(1);

        let service_token = overrides
            .service_token
            .or_else(|| env("MOODIFY_SERVICE_TOKEN"))
            .or(file.service_token);

        Self {
            catalog_url: pick(
                overrides.catalog_url,
                "MOODIFY_CATALOG_URL",
                file.catalog_url,
                defaults.catalog_url,
            ),
            library_url: pick(
                overrides.library_url,
                "MOODIFY_LIBRARY_URL",
                file.library_url,
                defaults.library_url,
            ),
            collection_url: pick(
                overrides.collection_url,
                "MOODIFY_COLLECTION_URL",
                file.collection_url,
                defaults.collection_url,
            ),
            identity_url: pick(
                overrides.identity_url,
                "MOODIFY_IDENTITY_URL",
                file.identity_url,
                defaults.identity_url,
            ),
            bind_addr: pick(
                overrides.bind_addr,
                "MOODIFY_BIND_ADDR",
                file.bind_addr,
                defaults.bind_addr,
            ),
            http_timeout_secs,
            hydration_concurrency,
            service_token,
        }
    }
}

/// Read the platform config file if present
fn load_config_file() -> Option<FileConfig> {
    let path = config_file_path()?;
    let text = std::fs::read_to_string(&path).ok()?;
    match FileConfig::parse(&text) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!("Ignoring unreadable config file {:?}: {}", path, e);
            None
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("moodify").join("config.toml");
    path.exists().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = GatewayConfig::merge(ConfigOverrides::default(), no_env, FileConfig::default());
        assert_eq!(cfg.bind_addr, "127.0.0.1:5080");
        assert_eq!(cfg.http_timeout_secs, 10);
        assert_eq!(cfg.hydration_concurrency, 4);
        assert!(cfg.service_token.is_none());
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let file = FileConfig::parse(
            r#"
            catalog_url = "http://catalog.internal:8080"
            hydration_concurrency = 8
            "#,
        )
        .unwrap();
        assert_eq!(
            file.catalog_url.as_deref(),
            Some("http://catalog.internal:8080")
        );
        assert_eq!(file.hydration_concurrency, Some(8));
        assert!(file.library_url.is_none());
    }

    #[test]
    fn file_config_rejects_malformed_toml() {
        assert!(FileConfig::parse("catalog_url = [").is_err());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let overrides = ConfigOverrides {
            catalog_url: Some("http://cli:1".to_string()),
            ..Default::default()
        };
        let env = |name: &str| match name {
            "MOODIFY_CATALOG_URL" => Some("http://env:2".to_string()),
            "MOODIFY_LIBRARY_URL" => Some("http://env:3".to_string()),
            _ => None,
        };
        let file = FileConfig {
            catalog_url: Some("http://file:4".to_string()),
            library_url: Some("http://file:5".to_string()),
            collection_url: Some("http://file:6".to_string()),
            ..Default::default()
        };

        let cfg = GatewayConfig::merge(overrides, env, file);
        assert_eq!(cfg.catalog_url, "http://cli:1");
        assert_eq!(cfg.library_url, "http://env:3");
        assert_eq!(cfg.collection_url, "http://file:6");
    }

    #[test]
    fn hydration_concurrency_is_at_least_one() {
        let overrides = ConfigOverrides {
            hydration_concurrency: Some(0),
            ..Default::default()
        };
        let cfg = GatewayConfig::merge(overrides, no_env, FileConfig::default());
        assert_eq!(cfg.hydration_concurrency, 1);
    }
}
