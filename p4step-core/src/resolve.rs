//! Execution-time substitution of deferred values.
//!
//! [`StepConfig::resolve`] turns every [`ConfigValue`] into a plain string
//! using the current build properties, producing a [`ResolvedStep`] that the
//! renderer and planner work from.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ResolveError;
use crate::properties::{PropertyStore, BUILDDIR_PROPERTY};
use crate::types::{ConfigValue, Deferred, MappingStrategy, StepConfig, SyncMode, ViewPair};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\(([^)]*)\)s").expect("placeholder pattern is valid")
});

impl ConfigValue {
    /// Resolve against `props`. Literals are returned unchanged.
    pub fn resolve(&self, props: &dyn PropertyStore) -> Result<String, ResolveError> {
        match self {
            ConfigValue::Literal(s) => Ok(s.clone()),
            ConfigValue::Deferred(d) => d.resolve(props),
        }
    }
}

impl Deferred {
    pub fn resolve(&self, props: &dyn PropertyStore) -> Result<String, ResolveError> {
        match self {
            Deferred::Property { key, default } => lookup(props, key, default.as_deref()),
            Deferred::Interpolate { template } => interpolate(template, props),
        }
    }
}

fn lookup(
    props: &dyn PropertyStore,
    key: &str,
    default: Option<&str>,
) -> Result<String, ResolveError> {
    props
        .get(key)
        .or(default)
        .map(str::to_string)
        .ok_or_else(|| ResolveError::MissingProperty {
            key: key.to_string(),
        })
}

/// Expand `%(prop:<key>)s` and `%(prop:<key>:-<default>)s` placeholders.
pub fn interpolate(template: &str, props: &dyn PropertyStore) -> Result<String, ResolveError> {
    let mut failure = None;
    let out = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let inner = &caps[1];
        let result = match inner.strip_prefix("prop:") {
            Some(rest) => match rest.split_once(":-") {
                Some((key, default)) => lookup(props, key, Some(default)),
                None => lookup(props, rest, None),
            },
            None => Err(ResolveError::BadPlaceholder {
                template: template.to_string(),
                placeholder: caps[0].to_string(),
            }),
        };
        match result {
            Ok(value) => value,
            Err(err) => {
                failure.get_or_insert(err);
                String::new()
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(out.into_owned()),
    }
}

// ---------------------------------------------------------------------------
// Resolved step
// ---------------------------------------------------------------------------

/// A `(depot, client)` pair with all values substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPair {
    pub depot: String,
    pub client: String,
}

/// [`MappingStrategy`] with all values substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedMapping {
    BaseBranch {
        base: String,
        branch: Option<String>,
        extra_views: Vec<ResolvedPair>,
    },
    ViewSpec(Vec<ResolvedPair>),
    Default,
}

impl ResolvedMapping {
    /// The base path, when the mapping has one.
    pub fn base(&self) -> Option<&str> {
        match self {
            ResolvedMapping::BaseBranch { base, .. } => Some(base),
            _ => None,
        }
    }
}

/// Everything the renderer and planner need, as plain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    pub name: String,
    pub p4bin: String,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub client: String,
    pub mode: SyncMode,
    pub mapping: ResolvedMapping,
    pub workdir: String,
    /// `<builddir>/<workdir>`; the client spec's `Root:`.
    pub workspace_root: PathBuf,
}

impl StepConfig {
    /// Substitute every deferred value from `props`.
    ///
    /// Fails if a referenced property is missing or `builddir` is not set.
    pub fn resolve(&self, props: &dyn PropertyStore) -> Result<ResolvedStep, ResolveError> {
        let opt = |v: Option<&ConfigValue>| v.map(|v| v.resolve(props)).transpose();

        let mapping = match &self.mapping {
            MappingStrategy::BaseBranch {
                base,
                branch,
                extra_views,
            } => ResolvedMapping::BaseBranch {
                base: base.resolve(props)?,
                branch: opt(branch.as_ref())?,
                extra_views: resolve_pairs(extra_views, props)?,
            },
            MappingStrategy::ViewSpec(pairs) => {
                ResolvedMapping::ViewSpec(resolve_pairs(pairs, props)?)
            }
            MappingStrategy::Default => ResolvedMapping::Default,
        };

        let builddir = lookup(props, BUILDDIR_PROPERTY, None)?;

        Ok(ResolvedStep {
            name: self.name.clone(),
            p4bin: self.p4bin.resolve(props)?,
            port: opt(self.port.as_ref())?,
            user: opt(self.user.as_ref())?,
            password: opt(self.password.as_ref())?,
            client: self.client.resolve(props)?,
            mode: self.mode,
            mapping,
            workdir: self.workdir.clone(),
            workspace_root: PathBuf::from(builddir).join(&self.workdir),
        })
    }
}

fn resolve_pairs(
    pairs: &[ViewPair],
    props: &dyn PropertyStore,
) -> Result<Vec<ResolvedPair>, ResolveError> {
    pairs
        .iter()
        .map(|p| {
            Ok(ResolvedPair {
                depot: p.depot.resolve(props)?,
                client: p.client.resolve(props)?,
            })
        })
        .collect()
}
