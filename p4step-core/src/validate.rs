//! Construction-time validation: [`RawStepConfig`] → [`StepConfig`].
//!
//! Every rule runs and all violations are reported together. Shape checks
//! (trailing slashes) only look at literal values; a deferred value cannot be
//! inspected until it is resolved, so a malformed one surfaces later as a
//! failing p4 command instead. Presence rules (branch needs base, and so on)
//! apply to deferred values too, since presence is known up front.

use std::path::{Component, Path};

use crate::error::{ConfigError, ConfigErrors};
use crate::types::{
    ConfigValue, ListInput, MappingStrategy, RawStepConfig, StepConfig, SyncMode, ViewPair,
    DEFAULT_P4BIN, DEFAULT_STEP_NAME, DEFAULT_WORKDIR,
};

impl StepConfig {
    /// Validate `raw` and build the immutable step configuration.
    pub fn new(raw: RawStepConfig) -> Result<Self, ConfigErrors> {
        validate(raw)
    }
}

/// Validate a declared configuration.
pub fn validate(raw: RawStepConfig) -> Result<StepConfig, ConfigErrors> {
    let mut errors = Vec::new();

    let view_spec = list_field(raw.view_spec, ConfigError::ViewSpecNotList, &mut errors);
    let extra_views = list_field(raw.extra_views, ConfigError::ExtraViewsNotList, &mut errors);

    if view_spec.is_some() && (raw.base.is_some() || raw.branch.is_some() || extra_views.is_some())
    {
        errors.push(ConfigError::MultipleStrategies);
    }

    if ends_with_slash(raw.base.as_ref()) {
        errors.push(ConfigError::TrailingSlash { field: "base" });
    }
    if ends_with_slash(raw.branch.as_ref()) {
        errors.push(ConfigError::TrailingSlash { field: "branch" });
    }
    if raw.branch.is_some() && raw.base.is_none() {
        errors.push(ConfigError::BranchWithoutBase);
    }
    if extra_views.is_some() && raw.base.is_none() {
        errors.push(ConfigError::ExtraViewsWithoutBase);
    }

    let mode = match raw.mode.as_deref() {
        None => SyncMode::default(),
        Some(s) => s.parse().unwrap_or_else(|e| {
            errors.push(e);
            SyncMode::default()
        }),
    };

    if raw.client.is_none() {
        errors.push(ConfigError::MissingClient);
    }
    if raw.p4bin.as_ref().and_then(ConfigValue::as_literal) == Some("") {
        errors.push(ConfigError::EmptyP4Bin);
    }

    let workdir = raw.workdir.unwrap_or_else(|| DEFAULT_WORKDIR.to_string());
    if !is_plain_relative(&workdir) {
        errors.push(ConfigError::InvalidWorkdir {
            workdir: workdir.clone(),
        });
    }

    let client = match raw.client {
        Some(client) if errors.is_empty() => client,
        _ => return Err(ConfigErrors(errors)),
    };

    let mapping = match (raw.base, view_spec) {
        (Some(base), _) => MappingStrategy::BaseBranch {
            base,
            branch: raw.branch,
            extra_views: extra_views.unwrap_or_default(),
        },
        (None, Some(pairs)) => MappingStrategy::ViewSpec(pairs),
        (None, None) => MappingStrategy::Default,
    };

    Ok(StepConfig {
        name: raw.name.unwrap_or_else(|| DEFAULT_STEP_NAME.to_string()),
        p4bin: raw.p4bin.unwrap_or_else(|| ConfigValue::literal(DEFAULT_P4BIN)),
        port: raw.port,
        user: raw.user,
        password: raw.password,
        client,
        mode,
        mapping,
        workdir,
    })
}

/// Unwrap a list-valued field. An empty list counts as not set.
fn list_field(
    input: Option<ListInput<ViewPair>>,
    bare_error: ConfigError,
    errors: &mut Vec<ConfigError>,
) -> Option<Vec<ViewPair>> {
    match input? {
        ListInput::List(items) if items.is_empty() => None,
        ListInput::List(items) => Some(items),
        ListInput::Bare(_) => {
            errors.push(bare_error);
            // Still counts as present for the combination rules.
            Some(Vec::new())
        }
    }
}

/// A non-empty relative path made only of normal components. The full sync
/// removes `<builddir>/<workdir>`, so it must stay below the build directory.
fn is_plain_relative(workdir: &str) -> bool {
    let path = Path::new(workdir);
    !workdir.is_empty()
        && !workdir.starts_with(['/', '\\'])
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn ends_with_slash(value: Option<&ConfigValue>) -> bool {
    value
        .and_then(ConfigValue::as_literal)
        .is_some_and(|s| s.ends_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RawStepConfig {
        RawStepConfig {
            client: Some("p4_client1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_applied() {
        let cfg = StepConfig::new(base_config()).expect("valid");
        assert_eq!(cfg.name(), "P4");
        assert_eq!(cfg.p4bin(), &ConfigValue::literal("p4"));
        assert_eq!(cfg.workdir(), "build");
        assert_eq!(cfg.mode(), SyncMode::Incremental);
        assert_eq!(cfg.mapping(), &MappingStrategy::Default);
    }

    #[test]
    fn all_violations_are_collected() {
        let raw = RawStepConfig {
            base: Some("//depot/".into()),
            branch: Some("blah/".into()),
            mode: Some("invalid".to_string()),
            ..Default::default()
        };
        let errs = StepConfig::new(raw).unwrap_err();
        assert!(errs.contains(&ConfigError::TrailingSlash { field: "base" }));
        assert!(errs.contains(&ConfigError::TrailingSlash { field: "branch" }));
        assert!(errs.contains(&ConfigError::InvalidMode {
            mode: "invalid".to_string()
        }));
        assert!(errs.contains(&ConfigError::MissingClient));
        assert_eq!(errs.0.len(), 4);
    }

    #[test]
    fn empty_view_spec_list_falls_back_to_default() {
        let raw = RawStepConfig {
            view_spec: Some(ListInput::List(vec![])),
            ..base_config()
        };
        let cfg = StepConfig::new(raw).expect("valid");
        assert_eq!(cfg.mapping(), &MappingStrategy::Default);
    }

    #[test]
    fn empty_p4bin_rejected() {
        let raw = RawStepConfig {
            p4bin: Some("".into()),
            ..base_config()
        };
        let errs = StepConfig::new(raw).unwrap_err();
        assert_eq!(errs.0, vec![ConfigError::EmptyP4Bin]);
    }

    #[test]
    fn display_joins_messages() {
        let errs = ConfigErrors(vec![
            ConfigError::BranchWithoutBase,
            ConfigError::MissingClient,
        ]);
        assert_eq!(
            errs.to_string(),
            "invalid step configuration: branch requires base to be set; client name is required"
        );
    }
}
