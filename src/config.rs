use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::Coordinate;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub tips: TipsConfig,
    #[serde(default)]
    pub location: Option<LocationConfig>,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_dir")]
    pub dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: default_history_dir(),
        }
    }
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TipsConfig {
    /// Artificial latency before tips resolve, in milliseconds.
    #[serde(default)]
    pub simulated_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LocationConfig {
    pub lat: f64,
    pub lng: f64,
}

impl LocationConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_provider")]
    pub provider: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            provider: default_directory_provider(),
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_directory_provider() -> String {
    "mock".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// Defaults used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            history: HistoryConfig::default(),
            tips: TipsConfig::default(),
            location: None,
            directory: DirectoryConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        match self.directory.provider.as_str() {
            "mock" => {}
            "http" => {
                if self.directory.url.as_deref().map_or(true, str::is_empty) {
                    anyhow::bail!("directory.url must be set when provider is 'http'");
                }
            }
            other => anyhow::bail!(
                "Unknown directory provider: '{}'. Must be mock or http.",
                other
            ),
        }

        if self.directory.timeout_secs == 0 {
            anyhow::bail!("directory.timeout_secs must be > 0");
        }

        if let Some(loc) = &self.location {
            if !loc.coordinate().is_valid() {
                anyhow::bail!(
                    "location must have lat in [-90, 90] and lng in [-180, 180], got ({}, {})",
                    loc.lat,
                    loc.lng
                );
            }
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        Ok(Config::minimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.history.dir, PathBuf::from("./data"));
        assert_eq!(cfg.tips.simulated_delay_ms, 0);
        assert!(cfg.location.is_none());
        assert_eq!(cfg.directory.provider, "mock");
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
[history]
dir = "/tmp/buddy"

[tips]
simulated_delay_ms = 1500

[location]
lat = 40.7128
lng = -74.006

[directory]
provider = "http"
url = "http://localhost:9000/facilities"
timeout_secs = 3

[server]
bind = "0.0.0.0:8080"
"#,
        )
        .unwrap();
        assert_eq!(cfg.tips.simulated_delay_ms, 1500);
        assert_eq!(cfg.location.unwrap().coordinate(), Coordinate::new(40.7128, -74.006));
        assert_eq!(cfg.directory.timeout_secs, 3);
    }

    #[test]
    fn test_http_provider_requires_url() {
        let err = parse_config("[directory]\nprovider = \"http\"\n").unwrap_err();
        assert!(err.to_string().contains("directory.url"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(parse_config("[directory]\nprovider = \"yelp\"\n").is_err());
    }

    #[test]
    fn test_out_of_range_location_rejected() {
        assert!(parse_config("[location]\nlat = 95.0\nlng = 0.0\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse_config("[directory]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.directory.provider, "mock");
    }
}
