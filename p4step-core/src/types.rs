//! Domain types for a p4 sync step.
//!
//! [`RawStepConfig`] is the as-declared shape (what a YAML step file holds).
//! [`StepConfig`] is the validated form produced by
//! [`StepConfig::new`](crate::validate); it can only be built through the
//! validator, so its mapping strategy is always unambiguous.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_STEP_NAME: &str = "P4";
pub const DEFAULT_P4BIN: &str = "p4";
pub const DEFAULT_WORKDIR: &str = "build";

// ---------------------------------------------------------------------------
// Config values
// ---------------------------------------------------------------------------

/// A configuration field: either known now, or resolved from build
/// properties when the step executes.
///
/// In YAML any scalar is a literal; a mapping is deferred:
///
/// ```yaml
/// base: //depot
/// branch: { property: branch, default: trunk }
/// client: { interpolate: "build_%(prop:workername)s" }
/// ```
///
/// Unquoted numbers and booleans (`branch: 2024`) are kept as their YAML
/// text. Quote a value whose exact spelling matters, such as `"1.10"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Literal(String),
    Deferred(Deferred),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigValueRepr {
    Text(String),
    Flag(bool),
    Number(serde_yaml::Number),
    Deferred(Deferred),
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match ConfigValueRepr::deserialize(deserializer)? {
            ConfigValueRepr::Text(s) => Self::Literal(s),
            ConfigValueRepr::Flag(b) => Self::Literal(b.to_string()),
            ConfigValueRepr::Number(n) => Self::Literal(n.to_string()),
            ConfigValueRepr::Deferred(d) => Self::Deferred(d),
        })
    }
}

/// A value only known at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deferred {
    /// The whole value is a single build property.
    Property {
        #[serde(rename = "property")]
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// A string with `%(prop:<key>)s` placeholders.
    Interpolate {
        #[serde(rename = "interpolate")]
        template: String,
    },
}

impl ConfigValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn property(key: impl Into<String>) -> Self {
        Self::Deferred(Deferred::Property {
            key: key.into(),
            default: None,
        })
    }

    pub fn interpolate(template: impl Into<String>) -> Self {
        Self::Deferred(Deferred::Interpolate {
            template: template.into(),
        })
    }

    /// The literal text, or `None` for a deferred value.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            Self::Deferred(_) => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::literal(s)
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => s.fmt(f),
            Self::Deferred(Deferred::Property { key, .. }) => write!(f, "<property {key}>"),
            Self::Deferred(Deferred::Interpolate { template }) => {
                write!(f, "<interpolate {template}>")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// View pairs
// ---------------------------------------------------------------------------

/// A `(depot, client)` pair, used for both `view_spec` entries and
/// `extra_views` entries.
///
/// Accepts either a two-element sequence or a `{ depot, client }` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ViewPairRepr", into = "ViewPairRepr")]
pub struct ViewPair {
    pub depot: ConfigValue,
    pub client: ConfigValue,
}

impl ViewPair {
    pub fn new(depot: impl Into<ConfigValue>, client: impl Into<ConfigValue>) -> Self {
        Self {
            depot: depot.into(),
            client: client.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ViewPairRepr {
    Tuple(ConfigValue, ConfigValue),
    Map { depot: ConfigValue, client: ConfigValue },
}

impl From<ViewPairRepr> for ViewPair {
    fn from(repr: ViewPairRepr) -> Self {
        match repr {
            ViewPairRepr::Tuple(depot, client) | ViewPairRepr::Map { depot, client } => {
                ViewPair { depot, client }
            }
        }
    }
}

impl From<ViewPair> for ViewPairRepr {
    fn from(pair: ViewPair) -> Self {
        ViewPairRepr::Tuple(pair.depot, pair.client)
    }
}

/// A list-valued field as declared. `Bare` only exists so the validator can
/// reject a plain string with a configuration error rather than a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput<T> {
    List(Vec<T>),
    Bare(String),
}

impl<T> From<Vec<T>> for ListInput<T> {
    fn from(items: Vec<T>) -> Self {
        Self::List(items)
    }
}

// ---------------------------------------------------------------------------
// Sync mode
// ---------------------------------------------------------------------------

/// How the workspace is brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Detach the workspace, wipe it, and pull everything again.
    Full,
    /// Let p4 transfer only what changed.
    #[default]
    Incremental,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => write!(f, "full"),
            SyncMode::Incremental => write!(f, "incremental"),
        }
    }
}

impl FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(SyncMode::Full),
            "incremental" => Ok(SyncMode::Incremental),
            other => Err(ConfigError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw (declared) config
// ---------------------------------------------------------------------------

/// A step configuration exactly as declared, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStepConfig {
    /// Step identity; scopes the published revision property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p4bin: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_views: Option<ListInput<ViewPair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_spec: Option<ListInput<ViewPair>>,
    /// Directory name under the build directory that holds the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

/// Which of the three view mapping shapes a step uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingStrategy {
    /// `<base>[/<branch>]/...` plus optional extra view lines.
    BaseBranch {
        base: ConfigValue,
        branch: Option<ConfigValue>,
        extra_views: Vec<ViewPair>,
    },
    /// Explicit `(depot prefix, client suffix)` pairs.
    ViewSpec(Vec<ViewPair>),
    /// Map the client's own namespace onto itself.
    Default,
}

/// A validated, immutable step configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    pub(crate) name: String,
    pub(crate) p4bin: ConfigValue,
    pub(crate) port: Option<ConfigValue>,
    pub(crate) user: Option<ConfigValue>,
    pub(crate) password: Option<ConfigValue>,
    pub(crate) client: ConfigValue,
    pub(crate) mode: SyncMode,
    pub(crate) mapping: MappingStrategy,
    pub(crate) workdir: String,
}

impl StepConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn p4bin(&self) -> &ConfigValue {
        &self.p4bin
    }

    pub fn port(&self) -> Option<&ConfigValue> {
        self.port.as_ref()
    }

    pub fn user(&self) -> Option<&ConfigValue> {
        self.user.as_ref()
    }

    pub fn password(&self) -> Option<&ConfigValue> {
        self.password.as_ref()
    }

    pub fn client(&self) -> &ConfigValue {
        &self.client
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn mapping(&self) -> &MappingStrategy {
        &self.mapping
    }

    pub fn workdir(&self) -> &str {
        &self.workdir
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_string_is_literal() {
        let v: ConfigValue = serde_yaml::from_str("//depot").expect("parse");
        assert_eq!(v, ConfigValue::literal("//depot"));
        assert_eq!(v.as_literal(), Some("//depot"));
    }

    #[test]
    fn yaml_numbers_and_booleans_are_literals() {
        let cases = [("2024", "2024"), ("1.0", "1.0"), ("123", "123"), ("true", "true")];
        for (yaml, expected) in cases {
            let v: ConfigValue = serde_yaml::from_str(yaml).expect("parse");
            assert_eq!(v, ConfigValue::literal(expected), "yaml: {yaml}");
        }
    }

    #[test]
    fn property_mapping_is_deferred() {
        let v: ConfigValue =
            serde_yaml::from_str("{ property: branch, default: trunk }").expect("parse");
        assert_eq!(
            v,
            ConfigValue::Deferred(Deferred::Property {
                key: "branch".to_string(),
                default: Some("trunk".to_string()),
            })
        );
        assert!(v.as_literal().is_none());
    }

    #[test]
    fn interpolate_mapping_is_deferred() {
        let v: ConfigValue =
            serde_yaml::from_str(r#"{ interpolate: "//depot/%(prop:branch)s" }"#).expect("parse");
        assert_eq!(v, ConfigValue::interpolate("//depot/%(prop:branch)s"));
    }

    #[test]
    fn view_pair_accepts_sequence_and_mapping() {
        let seq: ViewPair = serde_yaml::from_str(r#"["-//depot/trunk/test", "test"]"#).unwrap();
        let map: ViewPair =
            serde_yaml::from_str(r#"{ depot: "-//depot/trunk/test", client: test }"#).unwrap();
        assert_eq!(seq, map);
        assert_eq!(seq, ViewPair::new("-//depot/trunk/test", "test"));
    }

    #[test]
    fn bare_string_list_input() {
        let v: ListInput<ViewPair> = serde_yaml::from_str("a_bad_idea").unwrap();
        assert_eq!(v, ListInput::Bare("a_bad_idea".to_string()));
    }

    #[test]
    fn sync_mode_parse_and_display() {
        assert_eq!("full".parse::<SyncMode>().unwrap(), SyncMode::Full);
        assert_eq!(SyncMode::Incremental.to_string(), "incremental");
        assert!(matches!(
            "invalid".parse::<SyncMode>(),
            Err(ConfigError::InvalidMode { .. })
        ));
    }

    #[test]
    fn raw_config_rejects_unknown_keys() {
        let err = serde_yaml::from_str::<RawStepConfig>("p4base: //depot\n");
        assert!(err.is_err());
    }
}
