//! Version-range extraction from source control files
//!
//! A control file declares the requested runtime versions for the whole
//! source in an `XS-Python-Version` field, and per-package
//! `XB-Python-Version` fields in the binary sections. This module only
//! extracts the raw expression strings; parsing them is the version
//! module's job. A missing attribute can fall back to a single-line
//! `pyversions` file holding a bare range expression.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Source-level version attribute.
pub const SOURCE_ATTRIBUTE: &str = "XS-Python-Version";

/// Binary-package-level version attribute.
pub const BINARY_ATTRIBUTE: &str = "XB-Python-Version";

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{path}: not a control file")]
    NotAControlFile { path: PathBuf },

    #[error("missing {attribute} in {path}")]
    MissingAttribute { attribute: String, path: PathBuf },

    #[error("attribute {SOURCE_ATTRIBUTE} not in Source section")]
    MisplacedAttribute,

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extracts the version-range expression for `package` from a control file.
///
/// `"Source"` asks for the source-level attribute; any other name asks for
/// that binary package's attribute.
pub fn extract_version_attribute(path: &Path, package: &str) -> Result<String, ControlError> {
    let content = fs::read_to_string(path).map_err(|source| ControlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_from(&content, package).map_err(|kind| match kind {
        Extract::NotAControlFile => ControlError::NotAControlFile {
            path: path.to_path_buf(),
        },
        Extract::Missing(attribute) => ControlError::MissingAttribute {
            attribute,
            path: path.to_path_buf(),
        },
        Extract::Misplaced => ControlError::MisplacedAttribute,
    })
}

/// Reads the fallback file: one line holding a bare range expression.
pub fn read_fallback_range(path: &Path) -> Result<String, ControlError> {
    let content = fs::read_to_string(path).map_err(|source| ControlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().next().unwrap_or_default().trim().to_string())
}

#[derive(Debug)]
enum Extract {
    NotAControlFile,
    Missing(String),
    Misplaced,
}

fn extract_from(content: &str, package: &str) -> Result<String, Extract> {
    let mut section: Option<String> = None;
    let mut seen_section = false;
    let mut source_version = None;
    let mut binary_version = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            if package == "Source" {
                break;
            }
            section = None;
        } else if line.starts_with("Source:") {
            section = Some("Source".to_string());
            seen_section = true;
        } else if let Some(name) = line.strip_prefix("Package:") {
            section = Some(name.trim().to_string());
            seen_section = true;
        } else if let Some(value) = line.strip_prefix(&format!("{SOURCE_ATTRIBUTE}:")) {
            if section.as_deref() != Some("Source") {
                return Err(Extract::Misplaced);
            }
            source_version = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(&format!("{BINARY_ATTRIBUTE}:")) {
            if section.as_deref() == Some(package) {
                binary_version = Some(value.trim().to_string());
            }
        }
    }

    if !seen_section {
        return Err(Extract::NotAControlFile);
    }
    if package == "Source" {
        return source_version.ok_or_else(|| Extract::Missing(SOURCE_ATTRIBUTE.to_string()));
    }
    binary_version
        .ok_or_else(|| Extract::Missing(format!("{BINARY_ATTRIBUTE} for package `{package}'")))
}
