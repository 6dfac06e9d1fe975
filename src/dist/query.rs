//! Package-database query port
//!
//! Resolution falls back to asking the system package database which
//! package ships a distribution's egg-info marker. The query is a narrow
//! synchronous port so tests can substitute it; the real implementation
//! shells out to `dpkg -S` and filters the output in-process.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Command;

#[cfg(test)]
use mockall::automock;

use regex::Regex;
use tracing::debug;

use crate::dist::error::QueryError;
use crate::version::Version;

/// A package-database search: a file-name glob plus a path filter applied
/// to the matching file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    pub glob: String,
    pub path_filter: String,
}

impl SearchPattern {
    /// The search locating a distribution's egg-info marker, restricted to
    /// the given interpreter version's module directories (or to any
    /// versioned directory when no context is given).
    pub fn for_distribution(name: &str, context: Option<Version>) -> Self {
        let glob = format!("{name}-?*.egg-info");
        let path_filter = match context {
            Some(version) => format!("/python{version}/|/pyshared/"),
            None => r"/python\d+\.\d+/|/pyshared/".to_string(),
        };
        Self { glob, path_filter }
    }
}

/// Port to the system package database.
#[cfg_attr(test, automock)]
pub trait PackageQuery {
    /// Returns the names of packages shipping a file that matches the
    /// pattern. An empty set means no package matched; only a failure to
    /// run the query at all is an error.
    fn packages_providing(&self, pattern: &SearchPattern) -> Result<BTreeSet<String>, QueryError>;
}

impl<Q: PackageQuery> PackageQuery for &Q {
    fn packages_providing(&self, pattern: &SearchPattern) -> Result<BTreeSet<String>, QueryError> {
        (**self).packages_providing(pattern)
    }
}

/// `dpkg -S`-backed implementation.
#[derive(Debug, Clone)]
pub struct DpkgQuery {
    program: PathBuf,
}

impl DpkgQuery {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("/usr/bin/dpkg"),
        }
    }
}

impl Default for DpkgQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageQuery for DpkgQuery {
    fn packages_providing(&self, pattern: &SearchPattern) -> Result<BTreeSet<String>, QueryError> {
        debug!(glob = %pattern.glob, filter = %pattern.path_filter, "querying package database");

        let output = Command::new(&self.program)
            .arg("-S")
            .arg(&pattern.glob)
            .output()
            .map_err(|source| QueryError::Spawn {
                command: format!("{} -S {}", self.program.display(), pattern.glob),
                source,
            })?;

        // dpkg -S exits non-zero when nothing matches; that is a result,
        // not a failure
        if !output.status.success() {
            debug!(status = ?output.status, "package database query matched nothing");
            return Ok(BTreeSet::new());
        }

        let filter = Regex::new(&pattern.path_filter)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut packages = BTreeSet::new();
        for line in stdout.lines() {
            let Some((package, path)) = line.split_once(':') else {
                continue;
            };
            if filter.is_match(path) {
                packages.insert(package.trim().to_string());
            }
        }
        Ok(packages)
    }
}
