//! Server configuration resolution.
//!
//! Each field is resolved independently with the precedence
//! command flag > config-file value > built-in default, then validated.
//! A config file that exists but cannot be parsed is ignored with a
//! warning; a missing one is silently fine. Validation failures are fatal
//! at startup, before anything binds.

use std::net::SocketAddr;
use std::path::Path;

use serde_json::Value;

use endbug_protocol::constants::DEFAULT_PORT;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "endbug.config.json";

const DEFAULT_MAX_BODY_KB: f64 = 5.0;
const MIN_MAX_BODY_KB: f64 = 0.1;
const MIN_PORT: u16 = 1024;

/// Resolved, validated server configuration. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Bind `0.0.0.0` instead of loopback-only.
    pub remote_enabled: bool,
    /// Hard cap on request body size, floor of the configured KB value.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Resolves the configuration from CLI overrides and a config file.
    pub fn resolve(overrides: &Overrides, file: &FileConfig) -> Result<Self, ConfigError> {
        let port = match (overrides.port, file.port) {
            (Some(raw), _) => validate_flag_port(raw)?,
            (None, Some(raw)) => validate_file_port(raw)?,
            (None, None) => DEFAULT_PORT,
        };

        let remote_enabled = overrides.remote || file.allow_remote == Some(true);

        let max_body_kb = match overrides.max_body_kb.or(file.max_body_kb) {
            Some(raw) => validate_max_body(raw)?,
            None => DEFAULT_MAX_BODY_KB,
        };

        Ok(Self {
            port,
            remote_enabled,
            max_body_bytes: (max_body_kb * 1024.0).floor() as usize,
        })
    }

    /// Address to bind: all interfaces when remote access is enabled,
    /// loopback otherwise.
    pub fn bind_addr(&self) -> SocketAddr {
        if self.remote_enabled {
            SocketAddr::from(([0, 0, 0, 0], self.port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], self.port))
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Raw port value; validated here, not by the CLI parser, so the
    /// out-of-range message names the actual constraint.
    pub port: Option<i64>,
    pub remote: bool,
    pub max_body_kb: Option<f64>,
}

/// Values read from `endbug.config.json`.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// JSON numbers are floats; integrality is validated on resolve.
    pub port: Option<f64>,
    pub allow_remote: Option<bool>,
    pub max_body_kb: Option<f64>,
}

impl FileConfig {
    /// Extracts each known field independently, keeping only values of
    /// the expected JSON type. A wrong-typed field falls through to the
    /// default instead of discarding the rest of the file.
    fn from_value(value: &Value) -> Self {
        Self {
            port: value.get("port").and_then(Value::as_f64),
            allow_remote: value.get("allowRemote").and_then(Value::as_bool),
            max_body_kb: value.get("maxBodyKb").and_then(Value::as_f64),
        }
    }
}

/// Configuration fault. All variants abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid port {value}: must be an integer between 1024 and 65535")]
    InvalidPort { value: String },

    #[error("invalid max body size {value}: must be at least 0.1 KB")]
    InvalidMaxBody { value: String },
}

/// Loads the config file, falling back to defaults when it is missing or
/// unreadable. A present-but-broken file only warns, matching the
/// behavior scripts rely on when the file is hand-edited.
pub fn load_file(path: &Path) -> FileConfig {
    if !path.exists() {
        return FileConfig::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
            return FileConfig::default();
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => FileConfig::from_value(&value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse config file");
            FileConfig::default()
        }
    }
}

fn validate_flag_port(raw: i64) -> Result<u16, ConfigError> {
    if (i64::from(MIN_PORT)..=i64::from(u16::MAX)).contains(&raw) {
        Ok(raw as u16)
    } else {
        Err(ConfigError::InvalidPort {
            value: raw.to_string(),
        })
    }
}

fn validate_file_port(raw: f64) -> Result<u16, ConfigError> {
    let in_range = raw.is_finite()
        && raw.fract() == 0.0
        && raw >= f64::from(MIN_PORT)
        && raw <= f64::from(u16::MAX);
    if in_range {
        Ok(raw as u16)
    } else {
        Err(ConfigError::InvalidPort {
            value: raw.to_string(),
        })
    }
}

fn validate_max_body(raw: f64) -> Result<f64, ConfigError> {
    if raw.is_finite() && raw >= MIN_MAX_BODY_KB {
        Ok(raw)
    } else {
        Err(ConfigError::InvalidMaxBody {
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::resolve(&Overrides::default(), &FileConfig::default()).unwrap();
        assert_eq!(config.port, 3000);
        assert!(!config.remote_enabled);
        assert_eq!(config.max_body_bytes, 5120);
    }

    #[test]
    fn flag_beats_file_per_field() {
        let overrides = Overrides {
            port: Some(8080),
            remote: false,
            max_body_kb: None,
        };
        let file = FileConfig {
            port: Some(4000.0),
            allow_remote: Some(true),
            max_body_kb: Some(10.0),
        };
        let config = ServerConfig::resolve(&overrides, &file).unwrap();
        // Port from the flag, remote and max-body fall through to the file.
        assert_eq!(config.port, 8080);
        assert!(config.remote_enabled);
        assert_eq!(config.max_body_bytes, 10240);
    }

    #[test]
    fn file_beats_default() {
        let file = FileConfig {
            port: Some(4000.0),
            allow_remote: None,
            max_body_kb: None,
        };
        let config = ServerConfig::resolve(&Overrides::default(), &file).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.max_body_bytes, 5120);
    }

    #[test]
    fn port_out_of_range_is_rejected() {
        for raw in [80000, 1023, 0, -1] {
            let overrides = Overrides {
                port: Some(raw),
                ..Default::default()
            };
            let err = ServerConfig::resolve(&overrides, &FileConfig::default()).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort { .. }), "port {raw}");
        }
    }

    #[test]
    fn file_port_must_be_integral() {
        let file = FileConfig {
            port: Some(3000.5),
            ..Default::default()
        };
        let err = ServerConfig::resolve(&Overrides::default(), &file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn max_body_floor_and_minimum() {
        let overrides = Overrides {
            max_body_kb: Some(0.1),
            ..Default::default()
        };
        let config = ServerConfig::resolve(&overrides, &FileConfig::default()).unwrap();
        assert_eq!(config.max_body_bytes, 102);

        let too_small = Overrides {
            max_body_kb: Some(0.05),
            ..Default::default()
        };
        let err = ServerConfig::resolve(&too_small, &FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxBody { .. }));

        let nan = Overrides {
            max_body_kb: Some(f64::NAN),
            ..Default::default()
        };
        assert!(ServerConfig::resolve(&nan, &FileConfig::default()).is_err());
    }

    #[test]
    fn bind_addr_follows_remote_flag() {
        let local = ServerConfig {
            port: 3000,
            remote_enabled: false,
            max_body_bytes: 5120,
        };
        assert_eq!(local.bind_addr().to_string(), "127.0.0.1:3000");

        let remote = ServerConfig {
            remote_enabled: true,
            ..local
        };
        assert_eq!(remote.bind_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn load_file_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_file(&dir.path().join("endbug.config.json"));
        assert!(config.port.is_none());
        assert!(config.allow_remote.is_none());
    }

    #[test]
    fn load_file_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endbug.config.json");
        std::fs::write(&path, r#"{"port": 4100, "allowRemote": true, "maxBodyKb": 2.5}"#).unwrap();
        let config = load_file(&path);
        assert_eq!(config.port, Some(4100.0));
        assert_eq!(config.allow_remote, Some(true));
        assert_eq!(config.max_body_kb, Some(2.5));
    }

    #[test]
    fn load_file_keeps_valid_fields_next_to_wrong_typed_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endbug.config.json");
        std::fs::write(
            &path,
            r#"{"port": "4000", "allowRemote": true, "maxBodyKb": "lots"}"#,
        )
        .unwrap();
        let config = load_file(&path);
        // Wrong-typed fields are dropped individually, not the whole file.
        assert_eq!(config.port, None);
        assert_eq!(config.allow_remote, Some(true));
        assert_eq!(config.max_body_kb, None);

        let resolved = ServerConfig::resolve(&Overrides::default(), &config).unwrap();
        assert_eq!(resolved.port, 3000);
        assert!(resolved.remote_enabled);
    }

    #[test]
    fn load_file_non_object_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endbug.config.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let config = load_file(&path);
        assert!(config.port.is_none());
        assert!(config.allow_remote.is_none());
        assert!(config.max_body_kb.is_none());
    }

    #[test]
    fn load_file_broken_json_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endbug.config.json");
        std::fs::write(&path, "{not json").unwrap();
        let config = load_file(&path);
        assert!(config.port.is_none());
    }
}
