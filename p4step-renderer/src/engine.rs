//! Tera rendering engine for p4 client specs.
//!
//! The output is fed to `p4 client -i`, whose parser expects exactly this
//! layout: `Field:` headers separated by one blank line, tab between a header
//! and its inline value, and every view line indented by a single tab.
//!
//! ```text
//! Client: p4_client1
//!
//! Owner: user
//!
//! Description:
//! <TAB>Created by user
//!
//! Root:<TAB>/home/user/workspace/wkdir
//!
//! Options:<TAB>allwrite rmdir
//!
//! LineEnd:<TAB>local
//!
//! View:
//! <TAB>//depot/trunk/... //p4_client1/...
//! ```

use tera::Tera;

use p4step_core::ResolvedStep;

use crate::context::ClientSpec;
use crate::error::RenderError;

const CLIENT_SPEC_TEMPLATE_NAME: &str = "client_spec";

// Tabs and the absence of a trailing newline after the loop are significant.
const CLIENT_SPEC_TEMPLATE: &str = "Client: {{ client }}\n\
\n\
Owner: {{ owner }}\n\
\n\
Description:\n\
\t{{ description }}\n\
\n\
Root:\t{{ root }}\n\
\n\
Options:\t{{ options }}\n\
\n\
LineEnd:\t{{ line_end }}\n\
\n\
View:\n\
{% for entry in view %}\t{{ entry.depot }} {{ entry.client }}\n{% endfor %}";

/// Renders [`ClientSpec`]s. Create once with [`ClientSpecRenderer::new`] and reuse.
pub struct ClientSpecRenderer {
    tera: Tera,
}

impl ClientSpecRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(CLIENT_SPEC_TEMPLATE_NAME, CLIENT_SPEC_TEMPLATE)?;
        Ok(ClientSpecRenderer { tera })
    }

    /// Render `spec` into the text `p4 client -i` reads on stdin.
    pub fn render(&self, spec: &ClientSpec) -> Result<String, RenderError> {
        let ctx = spec.to_tera_context()?;
        Ok(self.tera.render(CLIENT_SPEC_TEMPLATE_NAME, &ctx)?)
    }

    /// Build the spec for `step` and render it.
    pub fn render_step(&self, step: &ResolvedStep) -> Result<String, RenderError> {
        self.render(&ClientSpec::from_step(step))
    }
}
