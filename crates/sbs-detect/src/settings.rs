use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::cli::{CliArgs, DisplayBackend};
use sbs_detect_core::detector::{DEFAULT_CORRELATION_THRESHOLD, DEFAULT_TARGET_WIDTH};

/// Raw TOML configuration file shape. Every field is optional; CLI flags
/// take precedence over file values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    backend: Option<String>,
    input: Option<String>,
    target_size: Option<u32>,
    threshold: Option<f32>,
    json_output: Option<String>,
    max_frames: Option<u64>,
    display: Option<String>,
}

#[derive(Debug)]
pub struct EffectiveSettings {
    pub backend: Option<String>,
    pub input: Option<PathBuf>,
    pub target_size: u32,
    pub threshold: f32,
    pub json_output: Option<PathBuf>,
    pub max_frames: Option<u64>,
    pub display: DisplayBackend,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { field, value } => {
                write!(f, "invalid value '{}' for '{}'", value, field)
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Merges the configuration file (when present) with CLI flags into the
/// settings the pipeline runs with.
pub fn resolve(args: &CliArgs) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_file_config(args.config.as_deref())?;

    let target_size = args
        .target_size
        .or(file.target_size)
        .unwrap_or(DEFAULT_TARGET_WIDTH as u32);
    if target_size == 0 {
        return Err(ConfigError::InvalidValue {
            field: "target_size",
            value: target_size.to_string(),
        });
    }

    let threshold = args
        .threshold
        .or(file.threshold)
        .unwrap_or(DEFAULT_CORRELATION_THRESHOLD);
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ConfigError::InvalidValue {
            field: "threshold",
            value: threshold.to_string(),
        });
    }

    let display = match args.display {
        Some(display) => display,
        None => parse_display(file.display.as_deref())?,
    };

    Ok(EffectiveSettings {
        backend: args.backend.clone().or(file.backend),
        input: args.input.clone().or(file.input.map(PathBuf::from)),
        target_size,
        threshold,
        json_output: args
            .json_output
            .clone()
            .or(file.json_output.map(PathBuf::from)),
        max_frames: args.max_frames.or(file.max_frames),
        display,
        config_path,
    })
}

fn parse_display(value: Option<&str>) -> Result<DisplayBackend, ConfigError> {
    match value {
        None => Ok(DisplayBackend::Noop),
        Some("noop") => Ok(DisplayBackend::Noop),
        Some("off") => Ok(DisplayBackend::Off),
        Some(other) => Err(ConfigError::InvalidValue {
            field: "display",
            value: other.to_string(),
        }),
    }
}

fn load_file_config(explicit: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Some(path.to_path_buf())
        }
        None => default_config_path().filter(|path| path.exists()),
    };
    let Some(path) = path else {
        return Ok((FileConfig::default(), None));
    };
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok((parsed, Some(path)))
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sbs-detect").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> CliArgs {
        CliArgs {
            backend: None,
            input: None,
            config: None,
            list_backends: false,
            target_size: None,
            threshold: None,
            json_output: None,
            max_frames: None,
            display: None,
        }
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let settings = resolve(&bare_args()).unwrap();
        assert_eq!(settings.target_size, DEFAULT_TARGET_WIDTH as u32);
        assert_eq!(settings.threshold, DEFAULT_CORRELATION_THRESHOLD);
        assert_eq!(settings.display, DisplayBackend::Noop);
    }

    #[test]
    fn file_values_fill_in_unset_flags() {
        let (_dir, path) = write_config(
            "backend = \"mock\"\ntarget_size = 32\nthreshold = 0.9\ndisplay = \"off\"\n",
        );
        let mut args = bare_args();
        args.config = Some(path);
        let settings = resolve(&args).unwrap();
        assert_eq!(settings.backend.as_deref(), Some("mock"));
        assert_eq!(settings.target_size, 32);
        assert_eq!(settings.threshold, 0.9);
        assert_eq!(settings.display, DisplayBackend::Off);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let (_dir, path) = write_config("target_size = 32\nthreshold = 0.9\n");
        let mut args = bare_args();
        args.config = Some(path);
        args.target_size = Some(128);
        args.threshold = Some(0.5);
        let settings = resolve(&args).unwrap();
        assert_eq!(settings.target_size, 128);
        assert_eq!(settings.threshold, 0.5);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let mut args = bare_args();
        args.threshold = Some(1.5);
        assert!(matches!(
            resolve(&args),
            Err(ConfigError::InvalidValue {
                field: "threshold",
                ..
            })
        ));
    }

    #[test]
    fn unknown_display_value_is_rejected() {
        let (_dir, path) = write_config("display = \"lenticular\"\n");
        let mut args = bare_args();
        args.config = Some(path);
        assert!(matches!(
            resolve(&args),
            Err(ConfigError::InvalidValue { field: "display", .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let (_dir, path) = write_config("target_size = \"wide\"\n");
        let mut args = bare_args();
        args.config = Some(path);
        assert!(matches!(resolve(&args), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_explicit_config_is_reported() {
        let mut args = bare_args();
        args.config = Some(PathBuf::from("/nonexistent/sbs-detect.toml"));
        assert!(matches!(resolve(&args), Err(ConfigError::NotFound { .. })));
    }
}
