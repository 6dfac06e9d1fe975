//! Interval-dialect version ranges
//!
//! The grammar used by override records and `pyversions`-style fallback
//! files:
//!
//! - `""` or `"-"` — unbounded, matches every supported version
//! - `"2.4-"` — minimum bound only
//! - `"-2.7"` — maximum bound only
//! - `"2.4-2.6"` — half-open interval `[2.4, 2.6)`
//! - `"2.5"` — exactly one version

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::version::error::RangeError;
use crate::version::types::{Version, VersionSet};

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-)?(\d+\.\d+)(?:(-)(\d+\.\d+)?)?$").unwrap());

/// Half-open interval over runtime versions, with optional bounds.
///
/// An interval whose bounds are present and equal denotes exactly that one
/// version rather than the empty interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionRange {
    pub min: Option<Version>,
    pub max: Option<Version>,
}

impl VersionRange {
    /// The range matching every version.
    pub const UNBOUNDED: Self = Self {
        min: None,
        max: None,
    };

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, version: Version) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => version == min,
            (min, max) => {
                min.is_none_or(|m| m <= version) && max.is_none_or(|m| version < m)
            }
        }
    }

    /// The subset of `supported` this range covers.
    pub fn matching(&self, supported: &VersionSet) -> VersionSet {
        supported.iter().filter(|v| self.contains(*v)).collect()
    }
}

/// Parses an interval-dialect range expression.
///
/// Whitespace around the expression is ignored. Fails when the expression
/// does not match the grammar or when an explicit minimum exceeds an
/// explicit maximum.
pub fn parse_range(expression: &str) -> Result<VersionRange, RangeError> {
    let expression = expression.trim();
    if expression.is_empty() || expression == "-" {
        return Ok(VersionRange::UNBOUNDED);
    }

    let malformed = || RangeError::Malformed(expression.to_string());
    let caps = RANGE_RE.captures(expression).ok_or_else(malformed)?;

    let leading_dash = caps.get(1).is_some();
    let first: Version = caps[2].parse()?;
    let trailing_dash = caps.get(3).is_some();
    let second: Option<Version> = match caps.get(4) {
        Some(m) => Some(m.as_str().parse()?),
        None => None,
    };

    let (min, max) = if leading_dash {
        // "-2.7": a maximum bound may not carry a second version
        if trailing_dash || second.is_some() {
            return Err(malformed());
        }
        (None, Some(first))
    } else if trailing_dash {
        (Some(first), second)
    } else {
        (Some(first), Some(first))
    };

    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(malformed());
    }

    Ok(VersionRange { min, max })
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s)
    }
}
