//! Dependency resolution
//!
//! Maps one upstream requirement (a distribution name with an optional
//! version qualifier) to the system package that provides it: catalog
//! lookup first, then a package-database query. Zero or multiple query
//! candidates fail loudly; a wrong guess here would corrupt the generated
//! package dependencies.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error, info};

use crate::dist::catalog::{CatalogRecord, DependencyCatalog};
use crate::dist::error::DependencyError;
use crate::dist::query::{PackageQuery, SearchPattern};
use crate::version::Version;

static REQUIRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        (?P<name>[A-Za-z][A-Za-z0-9_.-]*)
        \s*
        (?: # optional version qualifier; extra qualifiers are ignored
            (?P<operator><=?|>=?|==|!=)
            \s*
            (?P<version>[\w.-]+)
        )?",
    )
    .unwrap()
});

static PUBLIC_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/usr/lib/python(\d+\.\d+)/(?:site|dist)-packages").unwrap());

/// A parsed requirement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraint: Option<Constraint>,
}

/// The leading version qualifier of a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub operator: String,
    pub version: String,
}

impl Requirement {
    /// Parses a requirement with the permissive upstream grammar: a bare
    /// name, optionally followed by one relational operator and a
    /// version-like token. Trailing qualifiers beyond the first are
    /// ignored rather than rejected.
    pub fn parse(requirement: &str) -> Result<Self, DependencyError> {
        let caps = REQUIRES_RE
            .captures(requirement.trim())
            .ok_or_else(|| DependencyError::InvalidRequirement(requirement.to_string()))?;
        let constraint = match (caps.name("operator"), caps.name("version")) {
            (Some(op), Some(version)) => Some(Constraint {
                operator: op.as_str().to_string(),
                version: version.as_str().to_string(),
            }),
            _ => None,
        };
        Ok(Self {
            name: caps["name"].to_string(),
            constraint,
        })
    }
}

/// Maps an upstream relational operator to the system dependency relation.
/// `!=` has no counterpart and yields no versioned relation at all.
fn system_relation(operator: &str) -> Option<&'static str> {
    match operator {
        "==" => Some("="),
        ">=" => Some(">="),
        "<=" => Some("<="),
        ">" => Some(">>"),
        "<" => Some("<<"),
        _ => None,
    }
}

/// Resolves requirements against a catalog, with a package-database query
/// as fallback.
///
/// The catalog and query are fixed for the resolver's lifetime; resolving
/// the same requirement twice yields the same answer.
#[derive(Debug)]
pub struct DependencyResolver<Q> {
    catalog: DependencyCatalog,
    query: Q,
}

impl<Q: PackageQuery> DependencyResolver<Q> {
    pub fn new(catalog: DependencyCatalog, query: Q) -> Self {
        Self { catalog, query }
    }

    /// Resolves one requirement to a system dependency expression.
    ///
    /// `context` is the interpreter version the dependency is needed for;
    /// without it only unconditioned catalog records and version-independent
    /// query paths are considered.
    pub fn resolve(
        &self,
        requirement: &str,
        context: Option<Version>,
    ) -> Result<String, DependencyError> {
        debug!(requirement, ?context, "resolving dependency");
        let requirement = Requirement::parse(requirement)?;

        if let Some(record) = self.catalog.lookup(&requirement.name, context) {
            return Ok(render_dependency(record, &requirement));
        }

        let pattern =
            SearchPattern::for_distribution(&requirement.name.to_lowercase(), context);
        let candidates = self.query.packages_providing(&pattern)?;

        let mut candidates = candidates.into_iter();
        match (candidates.next(), candidates.next()) {
            (None, _) => {
                error!(name = %requirement.name, "no package provides the distribution");
                info!(
                    "hint: `apt-file search -x '(packages|pyshared)/{}' -l` might help",
                    requirement.name
                );
                Err(DependencyError::Unresolved {
                    name: requirement.name,
                })
            }
            (Some(package), None) => Ok(package),
            (Some(first), Some(second)) => {
                let all: Vec<String> = [first, second].into_iter().chain(candidates).collect();
                error!(name = %requirement.name, candidates = ?all, "ambiguous distribution");
                Err(DependencyError::Ambiguous {
                    name: requirement.name,
                    candidates: all,
                })
            }
        }
    }

    /// Resolves every requirement in an egg-info requires file.
    ///
    /// Optional sections (`[extra]` headers and beyond) are skipped. When
    /// the file lives under a versioned public module directory, that
    /// version becomes the resolution context.
    pub fn resolve_requires_file(&self, path: &Path) -> Result<Vec<String>, DependencyError> {
        let context = PUBLIC_DIR_RE
            .captures(&path.to_string_lossy())
            .and_then(|caps| caps[1].parse().ok());

        let content = fs::read_to_string(path).map_err(|source| DependencyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut dependencies = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                break;
            }
            if line.is_empty() {
                continue;
            }
            dependencies.push(self.resolve(line, context)?);
        }
        Ok(dependencies)
    }
}

/// Renders the dependency expression for a matched record. A version
/// hard-coded in the record wins; otherwise a versioned requirement is
/// rendered through the record's translation.
fn render_dependency(record: &CatalogRecord, requirement: &Requirement) -> String {
    if record.dependency.ends_with(')') {
        return record.dependency.clone();
    }
    if let (Some(constraint), Some(translation)) = (&requirement.constraint, &record.translation)
        && let Some(relation) = system_relation(&constraint.operator)
    {
        let version = translation.translate(&constraint.version);
        return format!("{} ({relation} {version})", record.dependency);
    }
    record.dependency.clone()
}
