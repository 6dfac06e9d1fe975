//! Distribution-to-package resolution layer
//!
//! - [`catalog`]: override records, catalog loading and linting
//! - [`resolver`]: requirement parsing and the resolution state machine
//! - [`query`]: package-database port (`dpkg -S` behind a trait)
//! - [`error`]: catalog, query and resolution error types

pub mod catalog;
pub mod error;
pub mod query;
pub mod resolver;

pub use catalog::{CatalogRecord, DependencyCatalog, Translation, validate};
pub use error::{CatalogError, DependencyError, QueryError};
pub use query::{DpkgQuery, PackageQuery, SearchPattern};
pub use resolver::{DependencyResolver, Requirement};
