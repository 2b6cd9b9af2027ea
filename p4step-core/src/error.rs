//! Error types for p4step-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single configuration violation found while validating a step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `view_spec` was a bare string instead of a list of pairs.
    #[error("view_spec must be a list of (depot, client) pairs")]
    ViewSpecNotList,

    /// `extra_views` was a bare string instead of a list of pairs.
    #[error("extra_views must be a list of (depot, client) pairs")]
    ExtraViewsNotList,

    /// `view_spec` combined with `base`, `branch` or `extra_views`.
    #[error("view_spec cannot be combined with base, branch or extra_views")]
    MultipleStrategies,

    /// A literal path field ends with `/`.
    #[error("{field} must not end with a trailing slash")]
    TrailingSlash { field: &'static str },

    #[error("branch requires base to be set")]
    BranchWithoutBase,

    #[error("extra_views requires base to be set")]
    ExtraViewsWithoutBase,

    /// `mode` was not one of the recognised sync modes.
    #[error("mode '{mode}' is not one of: full, incremental")]
    InvalidMode { mode: String },

    #[error("client name is required")]
    MissingClient,

    #[error("p4bin must not be empty")]
    EmptyP4Bin,

    /// `workdir` must name a directory below the build directory.
    #[error("workdir '{workdir}' must be a non-empty relative path without '..'")]
    InvalidWorkdir { workdir: String },
}

/// Every violation found in one configuration, in detection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    pub fn contains(&self, err: &ConfigError) -> bool {
        self.0.contains(err)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step configuration: ")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Errors from reading a step configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with file path and serde_yaml's line context.
    #[error("failed to parse step config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("step config not found at {path}")]
    NotFound { path: PathBuf },

    /// The file parsed but failed validation.
    #[error("{path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigErrors,
    },
}

/// Errors from substituting deferred values at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A deferred value names a property that is not set and has no default.
    #[error("property '{key}' is not set")]
    MissingProperty { key: String },

    /// `%(...)s` placeholder the interpolator does not understand.
    #[error("unsupported placeholder '{placeholder}' in '{template}'")]
    BadPlaceholder {
        template: String,
        placeholder: String,
    },
}
