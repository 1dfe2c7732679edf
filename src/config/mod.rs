use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application, read from `LEDGER_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding one JSON document per day
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory exports are written into
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Remote database URL; the mirror is off unless this and `remote_key` are set
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Password used for the remote database
    #[serde(default)]
    pub remote_key: Option<String>,
    /// tracing filter directive, e.g. `info` or `clinic_ledger=debug`
    #[serde(default = "default_log")]
    pub log: String,
}

/// Both halves of the remote configuration, present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub url: String,
    pub key: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ledger-data")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("./exports")
}

fn default_log() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize `LEDGER_*` environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed("LEDGER_").from_env::<Config>()?;

        Ok(config)
    }

    /// The remote mirror settings, or `None` for local-only mode.
    pub fn remote(&self) -> Option<RemoteConfig> {
        let url = self.remote_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.remote_key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

        Some(RemoteConfig {
            url: url.to_string(),
            key: key.to_string(),
        })
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("clinic-ledger.log")
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    let config = Config::load()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()));
        envy::prefixed("LEDGER_").from_iter(vars).unwrap()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = from_pairs(&[]);
        assert_eq!(config.data_dir, PathBuf::from("./ledger-data"));
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
        assert_eq!(config.log, "info");
        assert_eq!(config.remote(), None);
    }

    #[test]
    fn remote_needs_both_values() {
        let only_url = from_pairs(&[("LEDGER_REMOTE_URL", "postgres://clinic@db/ledger")]);
        assert_eq!(only_url.remote(), None);

        let blank_key = from_pairs(&[
            ("LEDGER_REMOTE_URL", "postgres://clinic@db/ledger"),
            ("LEDGER_REMOTE_KEY", "  "),
        ]);
        assert_eq!(blank_key.remote(), None);

        let both = from_pairs(&[
            ("LEDGER_REMOTE_URL", "postgres://clinic@db/ledger"),
            ("LEDGER_REMOTE_KEY", "s3cret"),
            ("LEDGER_DATA_DIR", "/var/lib/clinic"),
        ]);
        assert_eq!(
            both.remote(),
            Some(RemoteConfig {
                url: "postgres://clinic@db/ledger".to_string(),
                key: "s3cret".to_string(),
            })
        );
        assert_eq!(both.log_file(), PathBuf::from("/var/lib/clinic/clinic-ledger.log"));
    }
}
