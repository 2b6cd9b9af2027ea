//! View mapping — ordered depot → client lines for the client spec.
//!
//! | Strategy    | Lines                                                            |
//! |-------------|------------------------------------------------------------------|
//! | BaseBranch  | `<base>[/<branch>]/... //<client>/...`, then per extra view `<depot>/... //<client>/<name>/...` |
//! | ViewSpec    | `<depot_prefix>... //<client>/<client_suffix>...`                |
//! | Default     | `//<client>/... //<client>/...`                                  |
//!
//! Order matters to p4: later lines (typically `-` exclusions) override
//! earlier ones, so entries are emitted exactly in declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use p4step_core::{ResolvedMapping, ResolvedPair};

/// One line of a client view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEntry {
    pub depot: String,
    pub client: String,
}

impl fmt::Display for ViewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.depot, self.client)
    }
}

/// An ordered client view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewMapping(pub Vec<ViewEntry>);

impl ViewMapping {
    pub fn entries(&self) -> &[ViewEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, depot: String, client: String) {
        self.0.push(ViewEntry { depot, client });
    }
}

/// Build the view for `client` from an already-resolved mapping.
pub fn build_view(mapping: &ResolvedMapping, client: &str) -> ViewMapping {
    let mut view = ViewMapping::default();
    match mapping {
        ResolvedMapping::BaseBranch {
            base,
            branch,
            extra_views,
        } => {
            let root = match branch {
                Some(branch) => format!("{base}/{branch}"),
                None => base.clone(),
            };
            view.push(format!("{root}/..."), format!("//{client}/..."));
            for ResolvedPair { depot, client: name } in extra_views {
                view.push(format!("{depot}/..."), format!("//{client}/{name}/..."));
            }
        }
        ResolvedMapping::ViewSpec(pairs) => {
            for ResolvedPair { depot, client: suffix } in pairs {
                view.push(format!("{depot}..."), format!("//{client}/{suffix}..."));
            }
        }
        ResolvedMapping::Default => {
            view.push(format!("//{client}/..."), format!("//{client}/..."));
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(depot: &str, client: &str) -> ResolvedPair {
        ResolvedPair {
            depot: depot.to_string(),
            client: client.to_string(),
        }
    }

    fn lines(view: &ViewMapping) -> Vec<String> {
        view.entries().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn base_and_branch() {
        let mapping = ResolvedMapping::BaseBranch {
            base: "//depot".to_string(),
            branch: Some("trunk".to_string()),
            extra_views: vec![],
        };
        assert_eq!(
            lines(&build_view(&mapping, "p4_client1")),
            ["//depot/trunk/... //p4_client1/..."]
        );
    }

    #[test]
    fn base_without_branch() {
        let mapping = ResolvedMapping::BaseBranch {
            base: "//depot".to_string(),
            branch: None,
            extra_views: vec![],
        };
        assert_eq!(
            lines(&build_view(&mapping, "c")),
            ["//depot/... //c/..."]
        );
    }

    #[test]
    fn extra_views_keep_order_and_prefix() {
        let mapping = ResolvedMapping::BaseBranch {
            base: "//depot".to_string(),
            branch: Some("trunk".to_string()),
            extra_views: vec![
                pair("-//depot/trunk/test", "test"),
                pair("-//depot/trunk/doc", "doc"),
                pair("+//depot/shared/doc", "doc"),
            ],
        };
        assert_eq!(
            lines(&build_view(&mapping, "p4_client1")),
            [
                "//depot/trunk/... //p4_client1/...",
                "-//depot/trunk/test/... //p4_client1/test/...",
                "-//depot/trunk/doc/... //p4_client1/doc/...",
                "+//depot/shared/doc/... //p4_client1/doc/...",
            ]
        );
    }

    #[test]
    fn view_spec_empty_suffix_has_no_double_slash() {
        let mapping = ResolvedMapping::ViewSpec(vec![pair("//depot/main/", "")]);
        assert_eq!(
            lines(&build_view(&mapping, "p4_client1")),
            ["//depot/main/... //p4_client1/..."]
        );
    }

    #[test]
    fn view_spec_with_suffixes() {
        let mapping = ResolvedMapping::ViewSpec(vec![
            pair("//depot/main/", ""),
            pair("//depot/tools/", "tools/"),
            pair("-//depot/main/big/", "big/"),
        ]);
        assert_eq!(
            lines(&build_view(&mapping, "ws")),
            [
                "//depot/main/... //ws/...",
                "//depot/tools/... //ws/tools/...",
                "-//depot/main/big/... //ws/big/...",
            ]
        );
    }

    #[test]
    fn default_maps_client_onto_itself() {
        assert_eq!(
            lines(&build_view(&ResolvedMapping::Default, "ws")),
            ["//ws/... //ws/..."]
        );
    }

    #[test]
    fn build_is_deterministic() {
        let mapping = ResolvedMapping::ViewSpec(vec![pair("//a/", ""), pair("//b/", "b/")]);
        assert_eq!(build_view(&mapping, "c"), build_view(&mapping, "c"));
    }
}
