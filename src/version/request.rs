//! Qualifier-dialect request parsing and resolution
//!
//! A request expression is a comma-separated list of fields, each one of:
//!
//! - `all` — every supported version
//! - `current` (or `current_ext`) — the default version only
//! - `[op] X.Y` with `op` one of `=`, `>=`, `<=`, `<<` (no operator means
//!   `=`)
//!
//! Exact-match fields accumulate into a union; relational fields narrow a
//! working set that starts as the full supported set. `all` and `current`
//! are mutually exclusive with each other and with version fields.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::version::error::{RangeError, RequestError};
use crate::version::range::VersionRange;
use crate::version::types::{Version, VersionSet};

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(>=|<=|<<|=)? *(\d+\.\d+)$").unwrap());

/// Relational operator of a qualifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Ge,
    Le,
    Lt,
}

impl RelOp {
    fn matches(self, candidate: Version, bound: Version) -> bool {
        match self {
            RelOp::Ge => candidate >= bound,
            RelOp::Le => candidate <= bound,
            RelOp::Lt => candidate < bound,
        }
    }
}

/// One relational qualifier, e.g. `>= 2.6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub op: RelOp,
    pub version: Version,
}

/// Explicit version qualifiers: a union of exact versions plus relational
/// filters over the supported set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub exact: VersionSet,
    pub filters: Vec<Filter>,
}

/// Parsed form of a version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSpec {
    /// Every supported version.
    All,
    /// The default version only.
    Current,
    /// An explicit set of versions and/or relational filters.
    Explicit(Qualifiers),
}

impl From<VersionRange> for RequestSpec {
    /// An interval range is a request too: unbounded means `All`, an exact
    /// interval means that one version, anything else becomes a pair of
    /// relational filters.
    fn from(range: VersionRange) -> Self {
        match (range.min, range.max) {
            (None, None) => RequestSpec::All,
            (Some(min), Some(max)) if min == max => RequestSpec::Explicit(Qualifiers {
                exact: [min].into_iter().collect(),
                filters: Vec::new(),
            }),
            (min, max) => {
                let mut filters = Vec::new();
                if let Some(min) = min {
                    filters.push(Filter {
                        op: RelOp::Ge,
                        version: min,
                    });
                }
                if let Some(max) = max {
                    filters.push(Filter {
                        op: RelOp::Lt,
                        version: max,
                    });
                }
                RequestSpec::Explicit(Qualifiers {
                    exact: VersionSet::new(),
                    filters,
                })
            }
        }
    }
}

/// Parses a qualifier-dialect request expression.
///
/// An empty expression requests all supported versions. Mixing `all`,
/// `current` or version fields with one another is rejected here, not at
/// resolution time.
pub fn parse_request(expression: &str) -> Result<RequestSpec, RequestError> {
    if expression.trim().is_empty() {
        return Ok(RequestSpec::All);
    }

    let mut all = false;
    let mut current = false;
    let mut qualifiers = Qualifiers::default();

    for field in expression.split(',') {
        let field = field.trim();
        match field {
            "all" => all = true,
            "current" | "current_ext" => current = true,
            _ => {
                let caps = FIELD_RE
                    .captures(field)
                    .ok_or_else(|| RangeError::Malformed(field.to_string()))?;
                let version: Version = caps[2].parse()?;
                match caps.get(1).map(|m| m.as_str()) {
                    None | Some("=") => {
                        qualifiers.exact.insert(version);
                    }
                    Some(">=") => qualifiers.filters.push(Filter {
                        op: RelOp::Ge,
                        version,
                    }),
                    Some("<=") => qualifiers.filters.push(Filter {
                        op: RelOp::Le,
                        version,
                    }),
                    Some("<<") => qualifiers.filters.push(Filter {
                        op: RelOp::Lt,
                        version,
                    }),
                    Some(op) => {
                        return Err(RangeError::Malformed(op.to_string()).into());
                    }
                }
            }
        }
    }

    let has_versions = !qualifiers.exact.is_empty() || !qualifiers.filters.is_empty();
    if all && current {
        return Err(RequestError::Conflict(
            "both `current' and `all' in version string".to_string(),
        ));
    }
    if (all || current) && has_versions {
        return Err(RequestError::Conflict(
            "explicit versions mixed with `all'/`current'".to_string(),
        ));
    }

    if all {
        Ok(RequestSpec::All)
    } else if current {
        Ok(RequestSpec::Current)
    } else {
        Ok(RequestSpec::Explicit(qualifiers))
    }
}

/// Resolves a request against the supported set.
///
/// `installed` further restricts the result when the caller only wants
/// versions present on the build host. The result is never empty; a
/// constraint matching nothing is an error.
pub fn resolve_request(
    spec: &RequestSpec,
    supported: &VersionSet,
    installed: Option<&VersionSet>,
    default: Version,
) -> Result<VersionSet, RequestError> {
    debug!(?spec, %default, "resolving version request");

    let versions = match spec {
        RequestSpec::All => supported.clone(),
        RequestSpec::Current => {
            if !supported.contains(default) {
                return Err(RequestError::Conflict(format!(
                    "`current' version {default} not in supported versions"
                )));
            }
            [default].into_iter().collect()
        }
        RequestSpec::Explicit(qualifiers) => {
            let mut pool = supported.clone();
            for filter in &qualifiers.filters {
                pool.retain(|v| filter.op.matches(*v, filter.version));
            }
            let exact = qualifiers.exact.intersection(supported);
            if qualifiers.filters.is_empty() {
                exact
            } else {
                exact.union(&pool)
            }
        }
    };

    let versions = match installed {
        Some(installed) => versions.intersection(installed),
        None => versions,
    };

    if versions.is_empty() {
        return Err(RequestError::EmptyResult);
    }
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::range::parse_range;
    use rstest::rstest;

    fn v(major: u32, minor: u32) -> Version {
        Version::new(major, minor)
    }

    fn set(versions: &[(u32, u32)]) -> VersionSet {
        versions.iter().map(|&(a, b)| v(a, b)).collect()
    }

    fn resolve(expression: &str, supported: &[(u32, u32)]) -> Result<Vec<Version>, RequestError> {
        let spec = parse_request(expression)?;
        let resolved = resolve_request(&spec, &set(supported), None, v(2, 7))?;
        Ok(resolved.into_iter().collect())
    }

    const SUPPORTED: &[(u32, u32)] = &[(2, 6), (2, 7), (3, 0), (3, 1)];

    #[test]
    fn empty_expression_requests_all_supported() {
        assert_eq!(parse_request("").unwrap(), RequestSpec::All);
        assert_eq!(parse_request("  ").unwrap(), RequestSpec::All);
        assert_eq!(
            resolve("", SUPPORTED).unwrap(),
            [v(2, 6), v(2, 7), v(3, 0), v(3, 1)]
        );
    }

    #[rstest]
    #[case("all", &[(2, 6), (2, 7), (3, 0), (3, 1)])]
    #[case("current", &[(2, 7)])]
    #[case("current_ext", &[(2, 7)])]
    #[case("2.7", &[(2, 7)])]
    #[case("= 2.7", &[(2, 7)])]
    #[case(">= 3.0", &[(3, 0), (3, 1)])]
    #[case("<= 2.7", &[(2, 6), (2, 7)])]
    #[case("<< 2.7", &[(2, 6)])]
    #[case("2.6, 3.1", &[(2, 6), (3, 1)])]
    fn single_field_expressions(#[case] expression: &str, #[case] expected: &[(u32, u32)]) {
        let expected: Vec<Version> = expected.iter().map(|&(a, b)| v(a, b)).collect();
        assert_eq!(resolve(expression, SUPPORTED).unwrap(), expected);
    }

    #[test]
    fn exact_fields_union_with_the_relationally_filtered_pool() {
        assert_eq!(
            resolve("2.7,>=3.0", SUPPORTED).unwrap(),
            [v(2, 7), v(3, 0), v(3, 1)]
        );
    }

    #[test]
    fn relational_fields_intersect_each_other() {
        assert_eq!(
            resolve(">= 2.7, << 3.1", SUPPORTED).unwrap(),
            [v(2, 7), v(3, 0)]
        );
    }

    #[test]
    fn all_and_current_conflict_at_parse_time() {
        assert!(matches!(
            parse_request("all,current"),
            Err(RequestError::Conflict(_))
        ));
        // parse-time regardless of supported-set contents, so no resolution
        // step is involved at all
        assert!(matches!(
            parse_request("current,all"),
            Err(RequestError::Conflict(_))
        ));
    }

    #[rstest]
    #[case("all,2.7")]
    #[case("current,>=2.6")]
    fn qualifiers_mixed_with_versions_conflict(#[case] expression: &str) {
        assert!(matches!(
            parse_request(expression),
            Err(RequestError::Conflict(_))
        ));
    }

    #[rstest]
    #[case("2.x")]
    #[case(">>2.6")]
    #[case("==2.6")]
    #[case("banana")]
    fn unknown_fields_are_malformed(#[case] expression: &str) {
        assert!(matches!(
            parse_request(expression),
            Err(RequestError::Range(RangeError::Malformed(_)))
        ));
    }

    #[test]
    fn exact_version_absent_from_supported_is_empty() {
        assert_eq!(resolve("2.5", SUPPORTED), Err(RequestError::EmptyResult));
    }

    #[test]
    fn current_outside_supported_set_is_a_conflict() {
        let spec = parse_request("current").unwrap();
        let result = resolve_request(&spec, &set(&[(3, 0), (3, 1)]), None, v(2, 7));
        assert!(matches!(result, Err(RequestError::Conflict(_))));
    }

    #[test]
    fn installed_filter_restricts_the_result() {
        let spec = parse_request("all").unwrap();
        let installed = set(&[(2, 7), (3, 1)]);
        let resolved =
            resolve_request(&spec, &set(SUPPORTED), Some(&installed), v(2, 7)).unwrap();
        let resolved: Vec<Version> = resolved.into_iter().collect();
        assert_eq!(resolved, [v(2, 7), v(3, 1)]);
    }

    #[test]
    fn installed_filter_can_empty_the_result() {
        let spec = parse_request("2.6").unwrap();
        let installed = set(&[(3, 0)]);
        assert_eq!(
            resolve_request(&spec, &set(SUPPORTED), Some(&installed), v(2, 7)),
            Err(RequestError::EmptyResult)
        );
    }

    #[rstest]
    #[case("", &[(2, 6), (2, 7), (3, 0), (3, 1)])]
    #[case("-", &[(2, 6), (2, 7), (3, 0), (3, 1)])]
    #[case("2.6-3.0", &[(2, 6), (2, 7)])]
    #[case("2.7-", &[(2, 7), (3, 0), (3, 1)])]
    #[case("-2.7", &[(2, 6)])]
    #[case("2.7", &[(2, 7)])]
    fn interval_ranges_resolve_through_the_same_path(
        #[case] expression: &str,
        #[case] expected: &[(u32, u32)],
    ) {
        let spec = RequestSpec::from(parse_range(expression).unwrap());
        let resolved = resolve_request(&spec, &set(SUPPORTED), None, v(2, 7)).unwrap();
        let resolved: Vec<Version> = resolved.into_iter().collect();
        let expected: Vec<Version> = expected.iter().map(|&(a, b)| v(a, b)).collect();
        assert_eq!(resolved, expected);
    }
}
