//! Configuration management for the server.

use formsync_engine::{repository::validate_key, SyncConfig};
use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory the default save point is resolved under
    pub base_dir: PathBuf,
    /// Explicit save point, replacing `<base_dir>/gravity-forms-json`
    pub save_point: Option<PathBuf>,
    /// Key prefix override
    pub key_prefix: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let base_dir = lookup("BASE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let save_point = lookup("SAVE_POINT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let key_prefix = match lookup("KEY_PREFIX") {
            Some(prefix) if prefix.trim().is_empty() => return Err(ConfigError::EmptyKeyPrefix),
            // every generated key starts with the prefix, so it must pass as a key itself
            Some(prefix) if validate_key(&prefix).is_err() => {
                return Err(ConfigError::InvalidKeyPrefix(prefix))
            }
            other => other,
        };

        Ok(Self {
            host,
            port,
            base_dir,
            save_point,
            key_prefix,
        })
    }

    /// Engine configuration for this server.
    pub fn sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::for_base_dir(&self.base_dir);
        if let Some(save_point) = &self.save_point {
            config = config.with_save_point(save_point);
        }
        if let Some(prefix) = &self.key_prefix {
            config = config.with_key_prefix(prefix);
        }
        config
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("KEY_PREFIX must not be empty")]
    EmptyKeyPrefix,

    #[error("KEY_PREFIX '{0}' cannot start a file name")]
    InvalidKeyPrefix(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);

        let sync = config.sync_config();
        assert_eq!(sync.save_point, Path::new("./gravity-forms-json"));
        assert_eq!(sync.key_prefix, "local_gf_");
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("BASE_DIR", "/srv/theme"),
            ("KEY_PREFIX", "acme_"),
        ])
        .unwrap();
        let sync = config.sync_config();
        assert_eq!(config.port, 8080);
        assert_eq!(sync.save_point, Path::new("/srv/theme/gravity-forms-json"));
        assert_eq!(sync.key_prefix, "acme_");

        let config = load(&[("BASE_DIR", "/srv/theme"), ("SAVE_POINT", "/data/forms")]).unwrap();
        assert_eq!(config.sync_config().save_point, Path::new("/data/forms"));
    }

    #[test]
    fn invalid_values() {
        assert_eq!(load(&[("PORT", "http")]).unwrap_err(), ConfigError::InvalidPort);
        assert_eq!(
            load(&[("KEY_PREFIX", " ")]).unwrap_err(),
            ConfigError::EmptyKeyPrefix
        );
        for prefix in ["forms/", ".hidden_", "a..b", "win\\dir"] {
            assert_eq!(
                load(&[("KEY_PREFIX", prefix)]).unwrap_err(),
                ConfigError::InvalidKeyPrefix(prefix.to_string())
            );
        }
        assert!(load(&[("KEY_PREFIX", "acme.forms_")]).is_ok());
    }
}
