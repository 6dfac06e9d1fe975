//! Override catalog
//!
//! Administrator-supplied records mapping an upstream distribution name
//! (plus version range) to the system package that provides it. Records
//! live in a per-source override file and in a directory of fragments
//! shipped by other packages; the override file is consulted first at
//! lookup time.
//!
//! Record grammar, one record per line (`#` and blank lines ignored):
//!
//! ```text
//! <name> <vrange> <dependency expression> [; [PEP386] [s/…/…/; …]]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{error, warn};

use crate::dist::error::CatalogError;
use crate::version::range::{VersionRange, parse_range};
use crate::version::types::Version;

/// Default directory of override fragments.
pub const FRAGMENT_DIR: &str = "/usr/share/python/dist";

/// Default per-source override file.
pub const OVERRIDES_FILE: &str = "debian/pydist-overrides";

static RECORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        (?P<name>[A-Za-z][A-Za-z0-9_.-]*)            # distribution name
        \s+
        (?P<vrange>(?:-?\d+\.\d+(?:-(?:\d+\.\d+)?)?)?) # version range
        \s*
        (?P<dependency>[a-z][^;]*)                   # dependency expression
        (?: # optional upstream-version translator
            ;\s*
            (?P<standard>PEP386)?
            \s*
            (?P<rules>s/.*)?
        )?
        $",
    )
    .unwrap()
});

static PRE_RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-._]?(?:a|alpha|b|beta|c|rc|dev|pre|preview)\d*$").unwrap());

/// One `s/pattern/replacement/` substitution rule.
#[derive(Debug, Clone)]
pub struct SubstRule {
    pattern: Regex,
    replacement: String,
}

impl SubstRule {
    fn parse(rule: &str) -> Option<Self> {
        let body = rule.trim().strip_prefix("s/")?;
        let (pattern, rest) = body.split_once('/')?;
        let replacement = rest.strip_suffix('/').unwrap_or(rest);
        Some(Self {
            pattern: Regex::new(pattern).ok()?,
            replacement: replacement.to_string(),
        })
    }

    fn apply(&self, version: &str) -> String {
        self.pattern
            .replace_all(version, self.replacement.as_str())
            .into_owned()
    }
}

/// Upstream-version to system-version translation attached to a record.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Normalize pre-release markers (`1.0rc1` becomes `1.0~rc1`) after
    /// the substitution rules ran.
    pub pep386: bool,
    pub rules: Vec<SubstRule>,
}

impl Translation {
    /// Rewrites an upstream version string into the system version scheme.
    pub fn translate(&self, upstream: &str) -> String {
        let mut version = upstream.to_string();
        for rule in &self.rules {
            version = rule.apply(&version);
        }
        if self.pep386
            && let Some(m) = PRE_RELEASE_RE.find(&version)
        {
            let marker = m.as_str().trim_start_matches(['-', '.', '_']);
            let normalized = format!("{}~{marker}", &version[..m.start()]);
            version = normalized;
        }
        version
    }
}

/// One override record.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    /// Lowercased distribution name.
    pub name: String,
    pub range: VersionRange,
    /// System dependency expression, e.g. `python-mako` or
    /// `python-foo (>= 0.2)`.
    pub dependency: String,
    pub translation: Option<Translation>,
}

/// Indexed override records from one load.
///
/// Built once per run and read-only afterwards; reloading means loading a
/// fresh catalog from scratch.
#[derive(Debug, Default)]
pub struct DependencyCatalog {
    overrides: IndexMap<String, Vec<CatalogRecord>>,
    fragments: IndexMap<String, Vec<CatalogRecord>>,
}

impl DependencyCatalog {
    /// Loads from the default override file and fragment directory.
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::load(Path::new(OVERRIDES_FILE), Path::new(FRAGMENT_DIR))
    }

    /// Loads the catalog. A missing override file or fragment directory is
    /// simply an empty layer; a record failing the grammar aborts the load.
    ///
    /// Within the fragment layer a name redefined by a later fragment
    /// replaces the earlier definition; every such duplicate is logged so
    /// the packaging maintainer notices.
    pub fn load(overrides_file: &Path, fragment_dir: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        if overrides_file.is_file() {
            let mut origins = HashMap::new();
            load_file(overrides_file, &mut catalog.overrides, &mut origins)?;
        }

        if fragment_dir.is_dir() {
            let mut fragments: Vec<PathBuf> = fs::read_dir(fragment_dir)
                .map_err(|source| CatalogError::Io {
                    path: fragment_dir.to_path_buf(),
                    source,
                })?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            fragments.sort();

            let mut origins = HashMap::new();
            for fragment in fragments {
                load_file(&fragment, &mut catalog.fragments, &mut origins)?;
            }
        }

        Ok(catalog)
    }

    /// Finds the record for a distribution, override layer first.
    ///
    /// With a version context the first record whose range contains it
    /// wins; without one only an unconditioned (unbounded-range) record
    /// matches.
    pub fn lookup(&self, name: &str, context: Option<Version>) -> Option<&CatalogRecord> {
        let key = name.to_lowercase();
        find_in(&self.overrides, &key, context).or_else(|| find_in(&self.fragments, &key, context))
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.fragments.is_empty()
    }
}

fn find_in<'a>(
    map: &'a IndexMap<String, Vec<CatalogRecord>>,
    key: &str,
    context: Option<Version>,
) -> Option<&'a CatalogRecord> {
    map.get(key)?.iter().find(|record| match context {
        Some(version) => record.range.contains(version),
        None => record.range.is_unbounded(),
    })
}

fn load_file(
    path: &Path,
    map: &mut IndexMap<String, Vec<CatalogRecord>>,
    origins: &mut HashMap<String, PathBuf>,
) -> Result<(), CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = parse_record(line).ok_or_else(|| CatalogError::InvalidRecord {
            path: path.to_path_buf(),
            line: index + 1,
            text: line.to_string(),
        })?;

        match origins.get(&record.name) {
            Some(previous) if previous != path => {
                warn!(
                    name = %record.name,
                    previous = %previous.display(),
                    current = %path.display(),
                    "duplicate distribution name, keeping the later definition"
                );
                map.insert(record.name.clone(), vec![record.clone()]);
            }
            _ => {
                map.entry(record.name.clone()).or_default().push(record.clone());
            }
        }
        origins.insert(record.name, path.to_path_buf());
    }
    Ok(())
}

/// Parses one record line. Ranges are parsed eagerly so malformed ones
/// surface at load time, not at lookup time.
fn parse_record(line: &str) -> Option<CatalogRecord> {
    let caps = RECORD_RE.captures(line)?;
    let range = parse_range(&caps["vrange"]).ok()?;
    let pep386 = caps.name("standard").is_some();
    let rules = match caps.name("rules") {
        Some(m) => m
            .as_str()
            .split(';')
            .map(SubstRule::parse)
            .collect::<Option<Vec<_>>>()?,
        None => Vec::new(),
    };
    let translation = if pep386 || !rules.is_empty() {
        Some(Translation { pep386, rules })
    } else {
        None
    };
    Some(CatalogRecord {
        name: caps["name"].to_lowercase(),
        range,
        dependency: caps["dependency"].trim().to_string(),
        translation,
    })
}

/// Lints an override file without building a catalog: every offending line
/// is reported, not just the first one.
pub fn validate(path: &Path) -> Result<bool, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut ok = true;
    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if parse_record(line).is_none() {
            error!(
                path = %path.display(),
                line = index + 1,
                text = %line,
                "invalid override record"
            );
            ok = false;
        }
    }
    Ok(ok)
}
