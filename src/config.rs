//! Configuration for studymap-ra
//!
//! Two-tier resolution with ENV over TOML: values come from the config file
//! (`studymap-ra.toml` or `$STUDYMAP_RA_CONFIG`), then individual
//! `STUDYMAP_RA_*` environment variables override them. A key set in both
//! places is a potential misconfiguration and is warned about. Missing file
//! and missing keys fall back to defaults; a malformed file is reported and
//! ignored rather than fatal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

/// Which lookup backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupBackend {
    /// Per-source helper executables (default)
    Script,
    /// Direct public search APIs
    Http,
}

impl FromStr for LookupBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "script" => Ok(LookupBackend::Script),
            "http" => Ok(LookupBackend::Http),
            other => Err(format!("unknown lookup backend: {}", other)),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP bind host
    pub host: String,
    /// HTTP bind port
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Lookup backend selection
    pub lookup_backend: LookupBackend,
    /// Directory holding the fetch_* helper executables (script backend)
    pub script_dir: PathBuf,
    /// Hard per-lookup deadline for the background pipeline, seconds
    pub fetch_timeout_secs: u64,
    /// Per-lookup deadline for the synchronous read path, seconds
    pub immediate_fetch_timeout_secs: u64,
    /// Concurrent (day, source) units per aggregation pass
    pub unit_parallelism: usize,
    /// Immediate-resources cache lifetime, seconds
    pub immediate_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5746,
            database_path: PathBuf::from("studymap.db"),
            lookup_backend: LookupBackend::Script,
            script_dir: PathBuf::from("helpers"),
            fetch_timeout_secs: 15,
            immediate_fetch_timeout_secs: 8,
            unit_parallelism: 4,
            immediate_cache_ttl_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Self {
        let path = std::env::var("STUDYMAP_RA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("studymap-ra.toml"));

        let (mut config, file_keys) = Self::from_file(&path);
        config.apply_env_overrides(&file_keys);
        config
    }

    /// Parse the config file, also reporting which keys it actually set so
    /// environment overrides of the same keys can be flagged.
    fn from_file(path: &Path) -> (Self, HashSet<String>) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                return (Self::default(), HashSet::new());
            }
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                info!("Configuration loaded from {}", path.display());
                let file_keys = content
                    .parse::<toml::Table>()
                    .map(|table| table.keys().cloned().collect())
                    .unwrap_or_default();
                (config, file_keys)
            }
            Err(e) => {
                warn!(
                    "Failed to parse {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                (Self::default(), HashSet::new())
            }
        }
    }

    fn apply_env_overrides(&mut self, file_keys: &HashSet<String>) {
        override_from_env("STUDYMAP_RA_HOST", "host", file_keys, &mut self.host);
        override_from_env("STUDYMAP_RA_PORT", "port", file_keys, &mut self.port);
        if let Ok(value) = std::env::var("STUDYMAP_RA_DATABASE") {
            note_override("STUDYMAP_RA_DATABASE", "database_path", file_keys);
            self.database_path = PathBuf::from(value);
        }
        override_from_env(
            "STUDYMAP_RA_LOOKUP_BACKEND",
            "lookup_backend",
            file_keys,
            &mut self.lookup_backend,
        );
        if let Ok(value) = std::env::var("STUDYMAP_RA_SCRIPT_DIR") {
            note_override("STUDYMAP_RA_SCRIPT_DIR", "script_dir", file_keys);
            self.script_dir = PathBuf::from(value);
        }
        override_from_env(
            "STUDYMAP_RA_FETCH_TIMEOUT_SECS",
            "fetch_timeout_secs",
            file_keys,
            &mut self.fetch_timeout_secs,
        );
        override_from_env(
            "STUDYMAP_RA_IMMEDIATE_FETCH_TIMEOUT_SECS",
            "immediate_fetch_timeout_secs",
            file_keys,
            &mut self.immediate_fetch_timeout_secs,
        );
        override_from_env(
            "STUDYMAP_RA_UNIT_PARALLELISM",
            "unit_parallelism",
            file_keys,
            &mut self.unit_parallelism,
        );
        override_from_env(
            "STUDYMAP_RA_IMMEDIATE_CACHE_TTL_SECS",
            "immediate_cache_ttl_secs",
            file_keys,
            &mut self.immediate_cache_ttl_secs,
        );
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn immediate_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.immediate_fetch_timeout_secs)
    }

    pub fn immediate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.immediate_cache_ttl_secs)
    }
}

fn note_override(env_key: &str, field_name: &str, file_keys: &HashSet<String>) {
    if file_keys.contains(field_name) {
        warn!(
            "{} found in config file and {}. Using environment (highest priority).",
            field_name, env_key
        );
    } else {
        info!("{} loaded from {}", field_name, env_key);
    }
}

fn override_from_env<T>(env_key: &str, field_name: &str, file_keys: &HashSet<String>, field: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(env_key) {
        match value.parse() {
            Ok(parsed) => {
                note_override(env_key, field_name, file_keys);
                *field = parsed;
            }
            Err(e) => {
                warn!("Ignoring invalid {}: {}", env_key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.port, 5746);
        assert_eq!(config.lookup_backend, LookupBackend::Script);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.immediate_fetch_timeout(), Duration::from_secs(8));
        assert_eq!(config.bind_addr(), "127.0.0.1:5746");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config: Config = toml::from_str(
            r#"
            port = 8080
            lookup_backend = "http"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.lookup_backend, LookupBackend::Http);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.fetch_timeout_secs, 15);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("script".parse::<LookupBackend>().unwrap(), LookupBackend::Script);
        assert_eq!("HTTP".parse::<LookupBackend>().unwrap(), LookupBackend::Http);
        assert!("carrier-pigeon".parse::<LookupBackend>().is_err());
    }

    #[test]
    #[serial]
    fn env_overrides_win_over_defaults() {
        std::env::set_var("STUDYMAP_RA_PORT", "9999");
        std::env::set_var("STUDYMAP_RA_LOOKUP_BACKEND", "http");

        let mut config = Config::default();
        config.apply_env_overrides(&HashSet::new());

        assert_eq!(config.port, 9999);
        assert_eq!(config.lookup_backend, LookupBackend::Http);

        std::env::remove_var("STUDYMAP_RA_PORT");
        std::env::remove_var("STUDYMAP_RA_LOOKUP_BACKEND");
    }

    #[test]
    #[serial]
    fn env_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\nhost = \"0.0.0.0\"").unwrap();

        std::env::set_var("STUDYMAP_RA_CONFIG", file.path());
        std::env::set_var("STUDYMAP_RA_PORT", "9999");

        let config = Config::load();

        // File provides the host, environment wins on the port.
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9999);

        std::env::remove_var("STUDYMAP_RA_CONFIG");
        std::env::remove_var("STUDYMAP_RA_PORT");
    }

    #[test]
    #[serial]
    fn invalid_env_value_is_ignored() {
        std::env::set_var("STUDYMAP_RA_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides(&HashSet::new());

        assert_eq!(config.port, 5746);

        std::env::remove_var("STUDYMAP_RA_PORT");
    }
}
