//! Client spec context — the serializable payload the template renders.

use serde::{Deserialize, Serialize};

use p4step_core::ResolvedStep;

use crate::error::RenderError;
use crate::view::{build_view, ViewMapping};

/// `Options:` for every client this step registers.
pub const CLIENT_OPTIONS: &str = "allwrite rmdir";

/// `LineEnd:` for every client this step registers.
pub const CLIENT_LINE_END: &str = "local";

/// A p4 client specification, before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSpec {
    pub client: String,
    pub owner: String,
    pub description: String,
    /// Absolute workspace root, already formatted for the spec.
    pub root: String,
    pub options: String,
    pub line_end: String,
    pub view: ViewMapping,
}

impl ClientSpec {
    /// Build the spec for a resolved step. The view is derived from the
    /// step's mapping; the owner is the connecting user.
    pub fn from_step(step: &ResolvedStep) -> Self {
        let view = build_view(&step.mapping, &step.client);
        Self::new(
            &step.client,
            step.user.as_deref().unwrap_or_default(),
            step.workspace_root.display().to_string(),
            view,
        )
    }

    pub fn new(client: &str, owner: &str, root: String, view: ViewMapping) -> Self {
        ClientSpec {
            client: client.to_string(),
            owner: owner.to_string(),
            description: format!("Created by {owner}"),
            root,
            options: CLIENT_OPTIONS.to_string(),
            line_end: CLIENT_LINE_END.to_string(),
            view,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p4step_core::{ResolvedMapping, SyncMode};
    use std::path::PathBuf;

    fn make_step(user: Option<&str>) -> ResolvedStep {
        ResolvedStep {
            name: "P4".to_string(),
            p4bin: "p4".to_string(),
            port: None,
            user: user.map(str::to_string),
            password: None,
            client: "p4_client1".to_string(),
            mode: SyncMode::Incremental,
            mapping: ResolvedMapping::Default,
            workdir: "wkdir".to_string(),
            workspace_root: PathBuf::from("/home/user/workspace/wkdir"),
        }
    }

    #[test]
    fn spec_fields_populated() {
        let spec = ClientSpec::from_step(&make_step(Some("different_user")));
        assert_eq!(spec.client, "p4_client1");
        assert_eq!(spec.owner, "different_user");
        assert_eq!(spec.description, "Created by different_user");
        assert_eq!(spec.root, "/home/user/workspace/wkdir");
        assert_eq!(spec.options, "allwrite rmdir");
        assert_eq!(spec.line_end, "local");
        assert_eq!(spec.view.len(), 1);
    }

    #[test]
    fn missing_user_leaves_owner_empty() {
        let spec = ClientSpec::from_step(&make_step(None));
        assert_eq!(spec.owner, "");
    }

    #[test]
    fn to_tera_context_succeeds() {
        let spec = ClientSpec::from_step(&make_step(Some("user")));
        let tera_ctx = spec.to_tera_context().expect("context conversion");
        assert!(tera_ctx.contains_key("view"));
    }
}
