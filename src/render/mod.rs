//! Rendering backends for the three output document models.

mod capability;
mod docx;
mod ooxml;
mod pdf;
mod pptx;

pub use capability::{BlockKind, Capabilities, Support};
pub use docx::render_docx;
pub use pdf::render_pdf;
pub use pptx::render_pptx;

use std::path::Path;

use crate::diagram::MermaidRenderer;
use crate::error::Result;
use crate::model::Document;
use crate::style::StyleConfig;

/// Output document model to render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// Paginated flow document.
    Pdf,
    /// Flow document (WordprocessingML).
    Docx,
    /// Slide deck (PresentationML).
    Pptx,
}

impl RenderTarget {
    /// File extension for this target, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            RenderTarget::Pdf => "pdf",
            RenderTarget::Docx => "docx",
            RenderTarget::Pptx => "pptx",
        }
    }
}

impl std::fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render a document tree to `out_path` in the chosen target format.
///
/// `base_dir` is the directory of the source Markdown file; relative
/// image paths are resolved against it.
pub fn render_document(
    doc: &Document,
    target: RenderTarget,
    style: &StyleConfig,
    base_dir: &Path,
    mermaid: &MermaidRenderer,
    out_path: &Path,
) -> Result<()> {
    match target {
        RenderTarget::Pdf => render_pdf(doc, style, base_dir, mermaid, out_path),
        RenderTarget::Docx => render_docx(doc, style, base_dir, mermaid, out_path),
        RenderTarget::Pptx => render_pptx(doc, style, base_dir, mermaid, out_path),
    }
}

/// Whether a diagram artifact is usable as a raster image. The diagram
/// pipeline hands back SVG when no SVG-to-PNG converter was found;
/// backends must reject those and fall back to text.
pub(crate) fn is_raster_artifact(path: &Path) -> bool {
    !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Resolve an image source against the document's base directory.
/// Absolute paths are used as-is.
pub(crate) fn resolve_image_path(src: &str, base_dir: &Path) -> std::path::PathBuf {
    let path = Path::new(src);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_extension() {
        assert_eq!(RenderTarget::Pdf.extension(), "pdf");
        assert_eq!(RenderTarget::Docx.extension(), "docx");
        assert_eq!(RenderTarget::Pptx.extension(), "pptx");
    }

    #[test]
    fn test_raster_artifact_detection() {
        assert!(is_raster_artifact(Path::new("d.png")));
        assert!(!is_raster_artifact(Path::new("d.SVG")));
    }

    #[test]
    fn test_resolve_image_path() {
        let base = Path::new("/docs");
        assert_eq!(
            resolve_image_path("img.png", base),
            Path::new("/docs/img.png")
        );
        #[cfg(unix)]
        assert_eq!(
            resolve_image_path("/abs/img.png", base),
            Path::new("/abs/img.png")
        );
    }
}
