//! Runtime version algebra and dependency resolution for packaging several
//! parallel interpreter releases.
//!
//! Two questions come up while building a package: which of the supported
//! runtime releases does a declared version constraint select, and which
//! system package satisfies an upstream library requirement. The [`version`]
//! module answers the first (range/qualifier parsing plus resolution
//! against the supported set), the [`dist`] module the second (override
//! catalog with a package-database fallback). [`config`] loads the
//! supported/default inventory and [`control`] extracts range expressions
//! from source control files.

pub mod config;
pub mod control;
pub mod dist;
pub mod version;

pub use config::RuntimeConfig;
pub use dist::{DependencyCatalog, DependencyResolver, DpkgQuery, validate};
pub use version::{
    RequestSpec, Version, VersionRange, VersionSet, parse_range, parse_request, resolve_request,
};
