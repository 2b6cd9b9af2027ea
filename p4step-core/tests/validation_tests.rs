//! Construction-time validation of step configurations.
//!
//! Each `#[case]` builds a fresh `RawStepConfig`.

use p4step_core::{
    ConfigError, ConfigValue, ListInput, MappingStrategy, RawStepConfig, StepConfig, SyncMode,
    ViewPair,
};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn client() -> Option<ConfigValue> {
    Some("p4_client1".into())
}

fn lit(s: &str) -> Option<ConfigValue> {
    Some(ConfigValue::literal(s))
}

fn pairs(items: &[(&str, &str)]) -> Option<ListInput<ViewPair>> {
    Some(ListInput::List(
        items.iter().map(|(d, c)| ViewPair::new(*d, *c)).collect(),
    ))
}

fn errors_of(raw: RawStepConfig) -> Vec<ConfigError> {
    StepConfig::new(raw).expect_err("config should be rejected").0
}

// ---------------------------------------------------------------------------
// 1. Rejections
// ---------------------------------------------------------------------------

#[test]
fn empty_config_is_rejected() {
    assert_eq!(errors_of(RawStepConfig::default()), vec![ConfigError::MissingClient]);
}

#[test]
fn view_spec_combined_with_base_is_rejected() {
    let raw = RawStepConfig {
        client: client(),
        view_spec: pairs(&[("//depot/trunk", "")]),
        base: lit("//depot"),
        branch: lit("trunk"),
        extra_views: pairs(&[("src", "src"), ("doc", "doc")]),
        ..Default::default()
    };
    assert!(errors_of(raw).contains(&ConfigError::MultipleStrategies));
}

#[test]
fn bare_string_view_spec_is_rejected() {
    let raw = RawStepConfig {
        client: client(),
        view_spec: Some(ListInput::Bare("a_bad_idea".to_string())),
        ..Default::default()
    };
    assert_eq!(errors_of(raw), vec![ConfigError::ViewSpecNotList]);
}

#[rstest]
#[case("//depot/", None, ConfigError::TrailingSlash { field: "base" })]
#[case("//depot", Some("blah/"), ConfigError::TrailingSlash { field: "branch" })]
fn literal_trailing_slash_is_rejected(
    #[case] base: &str,
    #[case] branch: Option<&str>,
    #[case] expected: ConfigError,
) {
    let raw = RawStepConfig {
        client: client(),
        base: lit(base),
        branch: branch.map(ConfigValue::literal),
        ..Default::default()
    };
    assert_eq!(errors_of(raw), vec![expected]);
}

#[test]
fn branch_without_base_is_rejected() {
    let raw = RawStepConfig {
        client: client(),
        branch: lit("blah"),
        ..Default::default()
    };
    assert_eq!(errors_of(raw), vec![ConfigError::BranchWithoutBase]);
}

#[test]
fn extra_views_without_base_is_rejected() {
    let raw = RawStepConfig {
        client: client(),
        extra_views: Some(ListInput::Bare("blah".to_string())),
        ..Default::default()
    };
    let errs = errors_of(raw);
    assert!(errs.contains(&ConfigError::ExtraViewsWithoutBase), "got: {errs:?}");
    assert!(errs.contains(&ConfigError::ExtraViewsNotList), "got: {errs:?}");
}

#[test]
fn unknown_mode_is_rejected() {
    let raw = RawStepConfig {
        client: client(),
        base: lit("//depot"),
        mode: Some("invalid".to_string()),
        ..Default::default()
    };
    assert_eq!(
        errors_of(raw),
        vec![ConfigError::InvalidMode {
            mode: "invalid".to_string()
        }]
    );
}

#[rstest]
#[case::empty("")]
#[case::root("/")]
#[case::absolute("/tmp/wkdir")]
#[case::parent("..")]
#[case::grandparent("../..")]
#[case::escapes_midway("wkdir/../../elsewhere")]
#[case::current_dir(".")]
fn workdir_outside_build_directory_is_rejected(#[case] workdir: &str) {
    let raw = RawStepConfig {
        client: client(),
        mode: Some("full".to_string()),
        workdir: Some(workdir.to_string()),
        ..Default::default()
    };
    assert_eq!(
        errors_of(raw),
        vec![ConfigError::InvalidWorkdir {
            workdir: workdir.to_string()
        }]
    );
}

#[rstest]
#[case::name("wkdir")]
#[case::nested("builds/linux64")]
fn workdir_below_build_directory_is_accepted(#[case] workdir: &str) {
    let raw = RawStepConfig {
        client: client(),
        workdir: Some(workdir.to_string()),
        ..Default::default()
    };
    assert_eq!(StepConfig::new(raw).expect("valid").workdir(), workdir);
}

// ---------------------------------------------------------------------------
// 2. Deferred values skip shape checks
// ---------------------------------------------------------------------------

#[rstest]
#[case::property(ConfigValue::property("base"))]
#[case::interpolate(ConfigValue::interpolate("%(prop:base)s/"))]
fn deferred_base_skips_trailing_slash_check(#[case] base: ConfigValue) {
    let raw = RawStepConfig {
        client: client(),
        base: Some(base.clone()),
        ..Default::default()
    };
    let cfg = StepConfig::new(raw).expect("deferred base accepted");
    assert!(matches!(
        cfg.mapping(),
        MappingStrategy::BaseBranch { base: b, .. } if *b == base
    ));
}

#[test]
fn deferred_branch_still_requires_base() {
    let raw = RawStepConfig {
        client: client(),
        branch: Some(ConfigValue::property("branch")),
        ..Default::default()
    };
    assert_eq!(errors_of(raw), vec![ConfigError::BranchWithoutBase]);
}

// ---------------------------------------------------------------------------
// 3. Strategy selection
// ---------------------------------------------------------------------------

#[test]
fn base_branch_strategy_keeps_extra_view_order() {
    let raw = RawStepConfig {
        client: client(),
        mode: Some("full".to_string()),
        base: lit("//depot"),
        branch: lit("trunk"),
        extra_views: pairs(&[("-//depot/trunk/test", "test"), ("-//depot/trunk/doc", "doc")]),
        ..Default::default()
    };
    let cfg = StepConfig::new(raw).expect("valid");
    assert_eq!(cfg.mode(), SyncMode::Full);
    match cfg.mapping() {
        MappingStrategy::BaseBranch { extra_views, .. } => {
            let depots: Vec<_> = extra_views
                .iter()
                .map(|p| p.depot.as_literal().unwrap())
                .collect();
            assert_eq!(depots, ["-//depot/trunk/test", "-//depot/trunk/doc"]);
        }
        other => panic!("expected BaseBranch, got {other:?}"),
    }
}

#[test]
fn view_spec_strategy_selected() {
    let raw = RawStepConfig {
        client: client(),
        view_spec: pairs(&[("//depot/main/", "")]),
        ..Default::default()
    };
    let cfg = StepConfig::new(raw).expect("valid");
    assert_eq!(
        cfg.mapping(),
        &MappingStrategy::ViewSpec(vec![ViewPair::new("//depot/main/", "")])
    );
}

#[test]
fn nothing_declared_selects_default_strategy() {
    let raw = RawStepConfig {
        client: client(),
        ..Default::default()
    };
    assert_eq!(StepConfig::new(raw).unwrap().mapping(), &MappingStrategy::Default);
}
