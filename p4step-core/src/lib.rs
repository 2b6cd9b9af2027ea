//! p4step core library — step configuration, validation, deferred values.
//!
//! - [`types`] — declared and validated step configuration
//! - [`validate`] — [`StepConfig::new`], the construction-time gate
//! - [`resolve`] — execution-time substitution of deferred values
//! - [`properties`] — the build-property store boundary
//! - [`config`] — YAML step files
//! - [`error`] — [`ConfigError`], [`ConfigErrors`], [`LoadError`], [`ResolveError`]

pub mod config;
pub mod error;
pub mod properties;
pub mod resolve;
pub mod types;
pub mod validate;

pub use error::{ConfigError, ConfigErrors, LoadError, ResolveError};
pub use properties::{Properties, Property, PropertyStore, BUILDDIR_PROPERTY, GOT_REVISION_PROPERTY};
pub use resolve::{ResolvedMapping, ResolvedPair, ResolvedStep};
pub use types::{
    ConfigValue, Deferred, ListInput, MappingStrategy, RawStepConfig, StepConfig, SyncMode,
    ViewPair,
};
