//! # Configuration
//!
//! Override hierarchy: defaults → config file → CLI flags.
//!
//! Nothing is read from disk unless `--config <path>` is given, and
//! environment variables are never consulted. A missing file named on the
//! command line is an error rather than something to generate.

use log::{debug, info};
use serde::Deserialize;
use simplelog::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::key::is_control;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TildeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    pub quit_key: Option<char>,
    pub row_marker: Option<String>,
    pub read_timeout_ds: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// What the loop shows between key reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Repaint the viewport before every read.
    #[default]
    Viewport,
    /// Print one line per decoded key instead of repainting.
    Keys,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_QUIT_KEY: char = 'q';
pub const DEFAULT_ROW_MARKER: &str = "~";
/// VTIME, in deciseconds.
pub const DEFAULT_READ_TIMEOUT_DS: u8 = 1;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// ASCII letter; the quit command is this letter with Ctrl held.
    pub quit_key: u8,
    pub row_marker: String,
    pub read_timeout_ds: u8,
    pub mode: Mode,
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            quit_key: DEFAULT_QUIT_KEY as u8,
            row_marker: DEFAULT_ROW_MARKER.to_string(),
            read_timeout_ds: DEFAULT_READ_TIMEOUT_DS,
            mode: Mode::default(),
            log_file: None,
            log_level: LogLevel::default(),
        }
    }
}

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub quit_key: Option<char>,
    pub read_timeout_ds: Option<u8>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub keys: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

// ============================================================================
// Loading
// ============================================================================

/// Load config from an explicitly named TOML file.
pub fn load_config(path: &Path) -> Result<TildeConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: TildeConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse defaults → config file → CLI into concrete values, validating
/// each one.
pub fn resolve(config: &TildeConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    let quit_key = cli
        .quit_key
        .or(config.general.quit_key)
        .unwrap_or(DEFAULT_QUIT_KEY);
    if !quit_key.is_ascii_alphabetic() {
        return Err(ConfigError::Invalid {
            field: "quit_key",
            reason: format!("{quit_key:?} is not an ASCII letter"),
        });
    }

    let read_timeout_ds = cli
        .read_timeout_ds
        .or(config.general.read_timeout_ds)
        .unwrap_or(DEFAULT_READ_TIMEOUT_DS);
    // VTIME = 0 with VMIN = 0 turns every read into a busy poll.
    if read_timeout_ds == 0 {
        return Err(ConfigError::Invalid {
            field: "read_timeout_ds",
            reason: "must be at least 1 decisecond".to_string(),
        });
    }

    let row_marker = config
        .general
        .row_marker
        .clone()
        .unwrap_or_else(|| DEFAULT_ROW_MARKER.to_string());
    if row_marker.is_empty() || row_marker.bytes().any(is_control) {
        return Err(ConfigError::Invalid {
            field: "row_marker",
            reason: format!("{row_marker:?} must be non-empty and free of control bytes"),
        });
    }

    Ok(ResolvedConfig {
        quit_key: quit_key.to_ascii_lowercase() as u8,
        row_marker,
        read_timeout_ds,
        mode: if cli.keys { Mode::Keys } else { Mode::Viewport },
        log_file: cli.log_file.clone().or_else(|| config.log.file.clone()),
        log_level: cli.log_level.or(config.log.level).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&TildeConfig::default(), &CliOverrides::default()).unwrap();
        assert_eq!(resolved.quit_key, b'q');
        assert_eq!(resolved.row_marker, "~");
        assert_eq!(resolved.read_timeout_ds, 1);
        assert_eq!(resolved.mode, Mode::Viewport);
        assert!(resolved.log_file.is_none());
        assert_eq!(resolved.log_level, LogLevel::Info);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = TildeConfig {
            general: GeneralConfig {
                quit_key: Some('x'),
                row_marker: Some(">".to_string()),
                read_timeout_ds: Some(3),
            },
            log: LogConfig {
                file: Some(PathBuf::from("tilde.log")),
                level: Some(LogLevel::Debug),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default()).unwrap();
        assert_eq!(resolved.quit_key, b'x');
        assert_eq!(resolved.row_marker, ">");
        assert_eq!(resolved.read_timeout_ds, 3);
        assert_eq!(resolved.log_file, Some(PathBuf::from("tilde.log")));
        assert_eq!(resolved.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = TildeConfig {
            general: GeneralConfig {
                quit_key: Some('x'),
                read_timeout_ds: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            quit_key: Some('W'),
            read_timeout_ds: Some(5),
            keys: true,
            ..Default::default()
        };
        let resolved = resolve(&config, &cli).unwrap();
        assert_eq!(resolved.quit_key, b'w');
        assert_eq!(resolved.read_timeout_ds, 5);
        assert_eq!(resolved.mode, Mode::Keys);
    }

    #[test]
    fn test_rejects_non_letter_quit_key() {
        let cli = CliOverrides {
            quit_key: Some('1'),
            ..Default::default()
        };
        let err = resolve(&TildeConfig::default(), &cli).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "quit_key", .. }));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let cli = CliOverrides {
            read_timeout_ds: Some(0),
            ..Default::default()
        };
        let err = resolve(&TildeConfig::default(), &cli).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "read_timeout_ds", .. }));
    }

    #[test]
    fn test_rejects_control_bytes_in_row_marker() {
        let config = TildeConfig {
            general: GeneralConfig {
                row_marker: Some("\x1b[31m~".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(resolve(&config, &CliOverrides::default()).is_err());
    }

    #[test]
    fn test_toml_parses() {
        let toml_str = r#"
[general]
quit_key = "x"
row_marker = "·"
read_timeout_ds = 2

[log]
file = "/tmp/tilde.log"
level = "trace"
"#;
        let config: TildeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.quit_key, Some('x'));
        assert_eq!(config.general.row_marker.as_deref(), Some("·"));
        assert_eq!(config.general.read_timeout_ds, Some(2));
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/tilde.log")));
        assert_eq!(config.log.level, Some(LogLevel::Trace));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[log]
level = "warn"
"#;
        let config: TildeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log.level, Some(LogLevel::Warn));
        assert!(config.general.quit_key.is_none());
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = toml::from_str::<TildeConfig>("[general]\nread_timeout_ds = \"soon\"")
            .map_err(ConfigError::from)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/tilde/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Off.filter(), LevelFilter::Off);
        assert_eq!(LogLevel::Trace.filter(), LevelFilter::Trace);
    }
}
