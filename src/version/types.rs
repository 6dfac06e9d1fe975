//! Runtime version value types

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::version::error::RangeError;

/// One runtime release, identified by a `(major, minor)` pair.
///
/// Ordering is lexicographic on `(major, minor)`, which is exactly the
/// order the packaging tools expect (`2.7 < 3.0 < 3.10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Interpreter package name for this release, e.g. `python2.7`.
    pub fn package_name(&self) -> String {
        format!("python{self}")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = RangeError;

    /// Parses `"2.7"` into `(2, 7)`. Micro components are ignored, so
    /// `"2.6.4"` parses as `(2, 6)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeError::InvalidVersion(s.to_string());
        let mut parts = s.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self { major, minor })
    }
}

/// Sorted set of runtime releases.
///
/// Iteration order is always ascending, so every textual rendering is
/// deterministic without extra sorting at the call sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet(BTreeSet<Version>);

impl VersionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: Version) -> bool {
        self.0.insert(version)
    }

    pub fn contains(&self, version: Version) -> bool {
        self.0.contains(&version)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ascending iteration.
    pub fn iter(&self) -> impl Iterator<Item = Version> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &VersionSet) -> VersionSet {
        VersionSet(self.0.union(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &VersionSet) -> VersionSet {
        VersionSet(self.0.intersection(&other.0).copied().collect())
    }

    pub fn retain(&mut self, f: impl FnMut(&Version) -> bool) {
        self.0.retain(f)
    }

    /// Dependency-list ordering: the default version first (when newer
    /// versions are present it still leads), then versions newer than the
    /// default in ascending order, then older versions in descending order.
    ///
    /// A generated dependency list should offer the most-preferred runtime
    /// first while still naming every alternative.
    pub fn debsorted(&self, default: Version) -> Vec<Version> {
        let (newer, older): (Vec<_>, Vec<_>) = self.iter().partition(|v| *v >= default);
        newer.into_iter().chain(older.into_iter().rev()).collect()
    }
}

impl FromIterator<Version> for VersionSet {
    fn from_iter<T: IntoIterator<Item = Version>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VersionSet {
    type Item = Version;
    type IntoIter = std::collections::btree_set::IntoIter<Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
