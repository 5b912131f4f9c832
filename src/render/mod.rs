//! Artifact rendering: PDF documents and ZIP bundles.
//!
//! Rendering never re-validates encoding; callers hand it text that the
//! sanitizer has already normalized to the renderer's character set.

pub mod bundle;
pub mod pdf;

pub use bundle::render_bundle;
pub use pdf::render_pdf;

/// Errors from artifact rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// PDF assembly or serialization failed.
    #[error("pdf generation failed: {0}")]
    Pdf(#[from] lopdf::Error),
    /// ZIP packaging failed.
    #[error("bundle packaging failed: {0}")]
    Bundle(#[from] zip::result::ZipError),
    /// Writing artifact bytes failed.
    #[error("artifact write failed: {0}")]
    Io(#[from] std::io::Error),
}
