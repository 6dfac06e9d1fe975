//! Supported/default runtime inventory
//!
//! The packaging environment fixes one set of supported runtime releases
//! and one default release. They come from an INI-style defaults file,
//! with environment variables taking precedence. The loaded value is
//! passed explicitly into the resolvers; nothing here is a process-wide
//! singleton, the caller loads it once per run.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::version::{RangeError, Version, VersionSet};

/// Default location of the defaults file.
pub const DEFAULTS_PATH: &str = "/usr/share/python/debian_defaults";

/// Environment override for the supported set, e.g. `"2.6, 2.7"`.
pub const SUPPORTED_ENV: &str = "PYDIST_SUPPORTED";

/// Environment override for the default version, e.g. `"2.7"`.
pub const DEFAULT_ENV: &str = "PYDIST_DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing `{key}' in {path}")]
    MissingKey { key: &'static str, path: PathBuf },

    #[error(transparent)]
    Version(#[from] RangeError),
}

/// The runtime inventory of the packaging environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub supported: VersionSet,
    pub default: Version,
}

impl RuntimeConfig {
    /// Loads the inventory from the system defaults file, honoring the
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(
            Path::new(DEFAULTS_PATH),
            env::var(SUPPORTED_ENV).ok(),
            env::var(DEFAULT_ENV).ok(),
        )
    }

    fn load_with(
        path: &Path,
        supported_override: Option<String>,
        default_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut supported_raw = supported_override;
        let mut default_raw = default_override;

        if supported_raw.is_none() || default_raw.is_none() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let defaults = parse_defaults(&content);
            if supported_raw.is_none() {
                supported_raw = defaults.supported;
            }
            if default_raw.is_none() {
                default_raw = defaults.default;
            }
        }

        let supported_raw = supported_raw.ok_or(ConfigError::MissingKey {
            key: "supported-versions",
            path: path.to_path_buf(),
        })?;
        let default_raw = default_raw.ok_or(ConfigError::MissingKey {
            key: "default-version",
            path: path.to_path_buf(),
        })?;

        let supported = supported_raw
            .split(',')
            .map(parse_versioned_name)
            .collect::<Result<VersionSet, _>>()?;
        let default = parse_versioned_name(&default_raw)?;
        debug!(?supported, %default, "loaded runtime inventory");

        Ok(Self { supported, default })
    }

    /// The subset of supported versions whose interpreter binary exists on
    /// this host.
    pub fn installed(&self) -> VersionSet {
        self.installed_under(Path::new("/usr/bin"))
    }

    fn installed_under(&self, bindir: &Path) -> VersionSet {
        self.supported
            .iter()
            .filter(|v| bindir.join(v.package_name()).exists())
            .collect()
    }
}

#[derive(Debug, Default)]
struct RawDefaults {
    supported: Option<String>,
    default: Option<String>,
}

/// Pulls `default-version` and `supported-versions` out of the `[DEFAULT]`
/// section. The file is a two-key INI; a full INI parser buys nothing here.
fn parse_defaults(content: &str) -> RawDefaults {
    let mut raw = RawDefaults::default();
    let mut in_default = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_default = section == "DEFAULT";
            continue;
        }
        if !in_default {
            continue;
        }
        let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
            continue;
        };
        match key.trim() {
            "default-version" => raw.default = Some(value.trim().to_string()),
            "supported-versions" => raw.supported = Some(value.trim().to_string()),
            _ => {}
        }
    }
    raw
}

/// Accepts both `python2.7` and bare `2.7` spellings.
fn parse_versioned_name(value: &str) -> Result<Version, RangeError> {
    let value = value.trim();
    value.strip_prefix("python").unwrap_or(value).parse()
}
