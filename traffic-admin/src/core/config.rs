/*!
Configuration management for the admin tool
*/

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use traffic_database::ConnectionOptions;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Where the traffic database lives and how to open it
    pub database: ConnectionOptions,
    /// Output rendering settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Indent JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl AdminConfig {
    /// `<config dir>/traffic-admin/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("traffic-admin").join("config.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load an explicit config file, else the default file if it exists, else defaults.
    pub async fn load(
        explicit: Option<&Path>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
                _ => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
        let config = Self::from_toml(&content)
            .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AdminConfig::from_toml("").unwrap(), AdminConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = AdminConfig::from_toml(
            r#"
            [database]
            path = "/var/lib/traffic/traffic.db"
            read_only = true

            [output]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/traffic/traffic.db"));
        assert!(config.database.read_only);
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(AdminConfig::from_toml("[output]\nformat = \"xml\"").is_err());
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    }

    #[tokio::test]
    async fn loads_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nbusy_timeout_ms = 250").unwrap();
        let config = AdminConfig::load(Some(file.path())).await.unwrap();
        assert_eq!(config.database.busy_timeout_ms, 250);
    }

    #[tokio::test]
    async fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AdminConfig::load(Some(&dir.path().join("nope.toml"))).await.is_err());
    }
}
