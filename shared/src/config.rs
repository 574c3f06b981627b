use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Which key-value engine backs the paste store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Sled,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "moka" => Ok(BackendKind::Memory),
            "sled" | "disk" => Ok(BackendKind::Sled),
            other => Err(Error::Config(format!(
                "unknown backend '{}', expected 'memory' or 'sled'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub backend: BackendKind,
    pub data_dir: String,
    pub max_entries: Option<u64>,
    pub default_lifetime_secs: i64,
    pub sweep_interval: Option<Duration>,
    pub request_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 3000;
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_LIFETIME_SECS: i64 = 86_400; // 1 day
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3_600;
    const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("PASTE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendKind::Memory,
        };

        let sweep_secs = parse_or(
            &lookup,
            "PASTE_SWEEP_INTERVAL_SECS",
            Self::DEFAULT_SWEEP_INTERVAL_SECS,
        );

        Ok(Self {
            host: lookup("PASTE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: parse_or(&lookup, "PASTE_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            backend,
            data_dir: lookup("PASTE_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            max_entries: lookup("PASTE_MAX_ENTRIES").and_then(|raw| match raw.parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("PASTE_MAX_ENTRIES='{}' is not a number, running unbounded", raw);
                    None
                }
            }),
            default_lifetime_secs: positive_or(
                &lookup,
                "PASTE_DEFAULT_LIFETIME_SECS",
                Self::DEFAULT_LIFETIME_SECS,
            ),
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            request_timeout: Duration::from_millis(positive_or(
                &lookup,
                "PASTE_REQUEST_TIMEOUT_MS",
                Self::DEFAULT_REQUEST_TIMEOUT_MS,
            )),
            allowed_origins: lookup("PASTE_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{}='{}' is invalid, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// Like `parse_or`, but zero and negative values also fall back to the default.
fn positive_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + Default + PartialOrd + std::fmt::Display,
{
    let value = parse_or(lookup, key, default);
    if value > T::default() {
        return value;
    }
    warn!("{}={} must be positive, using default {}", key, value, default);
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.default_lifetime_secs, 86_400);
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
        assert!(config.max_entries.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PASTE_HOST", "127.0.0.1"),
            ("PASTE_HTTP_PORT", "8081"),
            ("PASTE_BACKEND", "sled"),
            ("PASTE_DATA_DIR", "/tmp/pastes"),
            ("PASTE_MAX_ENTRIES", "1000"),
            ("PASTE_SWEEP_INTERVAL_SECS", "0"),
            ("PASTE_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.backend, BackendKind::Sled);
        assert_eq!(config.data_dir, "/tmp/pastes");
        assert_eq!(config.max_entries, Some(1000));
        assert!(config.sweep_interval.is_none());
        assert_eq!(
            config.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_invalid_number_falls_back_to_default() {
        let config = Config::from_lookup(lookup_from(&[("PASTE_HTTP_PORT", "not-a-port")])).unwrap();
        assert_eq!(config.http_port, 3000);
    }

    #[test]
    fn test_non_positive_lifetime_and_timeout_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("PASTE_DEFAULT_LIFETIME_SECS", "-1"),
            ("PASTE_REQUEST_TIMEOUT_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.default_lifetime_secs, 86_400);
        assert_eq!(config.request_timeout, Duration::from_millis(5000));

        let config = Config::from_lookup(lookup_from(&[
            ("PASTE_DEFAULT_LIFETIME_SECS", "60"),
            ("PASTE_REQUEST_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.default_lifetime_secs, 60);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("PASTE_BACKEND", "redis")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
