//! Error types for p4step-renderer.

use thiserror::Error;

/// All errors that can arise while rendering a client spec.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),
}
