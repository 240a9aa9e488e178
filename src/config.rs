use crate::reading::{ServiceSettings, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://readings.db?mode=rwc";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub log_file: Option<PathBuf>,
    pub service: ServiceSettings,
}

impl AppConfig {
    /// Reads the process environment; call `dotenv::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = ServiceSettings::default();

        let recent_limit: u64 = parse_var(&var, "RECENT_LIMIT")?.unwrap_or(DEFAULT_RECENT_LIMIT);
        if recent_limit == 0 || recent_limit > MAX_RECENT_LIMIT {
            return Err(ConfigError::Invalid {
                key: "RECENT_LIMIT",
                value: recent_limit.to_string(),
            });
        }
        let store_timeout = parse_var::<u64>(&var, "STORE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.store_timeout);
        let max_concurrent_inserts: usize = parse_var(&var, "MAX_CONCURRENT_INSERTS")?
            .unwrap_or(defaults.max_concurrent_inserts);
        if max_concurrent_inserts == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_CONCURRENT_INSERTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            log_file: var("LOG_FILE").map(PathBuf::from),
            service: ServiceSettings {
                recent_limit,
                store_timeout,
                max_concurrent_inserts,
            },
        })
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match var(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.service.recent_limit, 30);
        assert_eq!(cfg.service.store_timeout, Duration::from_secs(8));
        assert_eq!(cfg.service.max_concurrent_inserts, 8);
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("RECENT_LIMIT", "5"),
            ("STORE_TIMEOUT_SECS", " 2 "),
            ("MAX_CONCURRENT_INSERTS", "1"),
            ("LOG_FILE", "logs/readings.log"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.service.recent_limit, 5);
        assert_eq!(cfg.service.store_timeout, Duration::from_secs(2));
        assert_eq!(cfg.service.max_concurrent_inserts, 1);
        assert_eq!(cfg.log_file, Some(PathBuf::from("logs/readings.log")));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert_eq!(
            load(&[("RECENT_LIMIT", "trinta")]).unwrap_err(),
            ConfigError::Invalid {
                key: "RECENT_LIMIT",
                value: "trinta".to_string()
            }
        );
        assert!(load(&[("RECENT_LIMIT", "0")]).is_err());
        assert!(load(&[("MAX_CONCURRENT_INSERTS", "0")]).is_err());
        assert!(load(&[("STORE_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn recent_limit_must_fit_a_sql_limit() {
        assert_eq!(
            load(&[("RECENT_LIMIT", "18446744073709551615")]).unwrap_err(),
            ConfigError::Invalid {
                key: "RECENT_LIMIT",
                value: "18446744073709551615".to_string()
            }
        );
        let cfg = load(&[("RECENT_LIMIT", "9223372036854775807")]).unwrap();
        assert_eq!(cfg.service.recent_limit, i64::MAX as u64);
    }
}
