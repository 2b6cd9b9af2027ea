//! # p4step-renderer
//!
//! Builds the client view for a resolved step and renders the p4 client spec
//! document with an embedded tera template.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use p4step_core::{Properties, StepConfig};
//! use p4step_renderer::ClientSpecRenderer;
//!
//! fn preview(config: &StepConfig, props: &Properties) {
//!     let Ok(step) = config.resolve(props) else { return };
//!     if let Ok(renderer) = ClientSpecRenderer::new() {
//!         if let Ok(text) = renderer.render_step(&step) {
//!             print!("{text}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod view;

pub use context::{ClientSpec, CLIENT_LINE_END, CLIENT_OPTIONS};
pub use engine::ClientSpecRenderer;
pub use error::RenderError;
pub use view::{build_view, ViewEntry, ViewMapping};
