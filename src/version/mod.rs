//! Version algebra for the supported runtime releases
//!
//! - [`types`]: `Version` and `VersionSet` value types, `debsorted` ordering
//! - [`range`]: interval-dialect ranges (`2.4-2.6`, `-2.7`, …)
//! - [`request`]: qualifier-dialect requests (`all`, `current`, `>= 2.6`, …)
//!   and resolution against the supported set
//! - [`error`]: range and request error types

pub mod error;
pub mod range;
pub mod request;
pub mod types;

pub use error::{RangeError, RequestError};
pub use range::{VersionRange, parse_range};
pub use request::{RequestSpec, parse_request, resolve_request};
pub use types::{Version, VersionSet};
