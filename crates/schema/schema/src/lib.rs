//! # Event Gateway Schema
//!
//! Schema tooling for the event gateway:
//! - Registry clients resolving a subject to its latest schema document
//! - Compiled validators with structured, path-addressed errors
//! - A TTL cache holding one compiled validator per subject
//!
//! ## Example
//!
//! ```rust,ignore
//! use event_gateway_schema::{SchemaCache, StaticSchemaRegistry};
//!
//! let registry = Arc::new(StaticSchemaRegistry::new());
//! let cache = SchemaCache::new(registry, Duration::from_secs(300));
//!
//! let validator = cache.resolve("orders").await?;
//! let report = validator.validate(&payload);
//! if !report.is_valid() {
//!     for err in &report.errors {
//!         println!("{}: {}", err.path, err.message);
//!     }
//! }
//! ```

mod cache;
mod error;
mod registry;
mod validator;

pub use cache::SchemaCache;
pub use error::{SchemaError, SchemaResult};
#[cfg(feature = "http-client")]
pub use registry::HttpSchemaRegistry;
pub use registry::{SchemaRegistry, StaticSchemaRegistry};
pub use validator::{CompiledSchema, ValidationError, ValidationReport};
