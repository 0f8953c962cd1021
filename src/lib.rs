//! # mdexport
//!
//! Markdown to PDF, DOCX, and PPTX document exporter.
//!
//! The input Markdown is parsed into a block tree, which each backend
//! renders into its native document model: a paginated PDF flow, a
//! WordprocessingML flow document, or a PresentationML slide deck.
//! Mermaid code fences are rendered to images through a side pipeline
//! when the `mmdc` CLI is available, and degrade to text otherwise.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdexport::{Exporter, RenderTarget};
//!
//! fn main() -> mdexport::Result<()> {
//!     let out = Exporter::new(RenderTarget::Pdf)
//!         .with_font_size(12)
//!         .export_file("notes.md")?;
//!     println!("wrote {}", out.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Three backends**: PDF (printpdf), DOCX and PPTX (hand-built OOXML)
//! - **Per-backend capability matrix**: unsupported constructs degrade
//!   or are skipped explicitly, never silently mangled
//! - **Mermaid diagrams**: rendered via `mmdc` with an SVG-to-PNG
//!   fallback chain, plain code-block fallback when unavailable
//! - **Style control**: font family, size, line height, page size,
//!   optional TTF embedding for PDF

pub mod diagram;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod style;

pub use diagram::MermaidRenderer;
pub use error::{Error, Result};
pub use model::{Block, Document, ImageRef, ListItem, ListKind};
pub use parser::parse_markdown;
pub use render::{render_document, BlockKind, Capabilities, RenderTarget, Support};
pub use style::{PageSize, StyleConfig};

use std::path::{Path, PathBuf};

use log::info;

/// Configurable export pipeline: parse, render, write.
///
/// Builder methods mirror the style knobs in [`StyleConfig`]; call
/// [`Exporter::export_file`] (or a sibling) to run the pipeline.
#[derive(Debug, Clone)]
pub struct Exporter {
    target: RenderTarget,
    style: StyleConfig,
    mermaid_png: bool,
}

impl Exporter {
    /// Create an exporter for the given output format with default styling.
    pub fn new(target: RenderTarget) -> Self {
        Self {
            target,
            style: StyleConfig::default(),
            mermaid_png: false,
        }
    }

    /// Body font family name.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.style = self.style.with_font_family(family);
        self
    }

    /// Base body font size in points.
    pub fn with_font_size(mut self, size_pt: u32) -> Self {
        self.style = self.style.with_font_size(size_pt);
        self
    }

    /// Line height multiplier for body text.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.style = self.style.with_line_height(line_height);
        self
    }

    /// Page size for the PDF backend.
    pub fn with_page_size(mut self, page: PageSize) -> Self {
        self.style = self.style.with_page_size(page);
        self
    }

    /// TTF font file to embed in PDF output. Falls back to a built-in
    /// font when the file cannot be loaded.
    pub fn with_ttf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.style = self.style.with_ttf_path(path);
        self
    }

    /// Ask the diagram pipeline for PNG output directly instead of SVG
    /// with conversion.
    pub fn with_mermaid_png(mut self, png: bool) -> Self {
        self.mermaid_png = png;
        self
    }

    /// Export a Markdown file, deriving the output path from the input
    /// by swapping the extension. Returns the output path.
    pub fn export_file<P: AsRef<Path>>(&self, input: P) -> Result<PathBuf> {
        let input = input.as_ref();
        let out_path = input.with_extension(self.target.extension());
        self.export_file_to(input, &out_path)?;
        Ok(out_path)
    }

    /// Export a Markdown file to an explicit output path.
    pub fn export_file_to<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<()> {
        let input = input.as_ref();
        if !input.is_file() {
            return Err(Error::MissingInput(input.to_path_buf()));
        }
        let markdown = std::fs::read_to_string(input)?;
        let base_dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.export_str(&markdown, &base_dir, output.as_ref())
    }

    /// Export a Markdown string. Relative image paths are resolved
    /// against `base_dir`.
    pub fn export_str(&self, markdown: &str, base_dir: &Path, output: &Path) -> Result<()> {
        let doc = parse_markdown(markdown);
        info!(
            "exporting {} blocks to {} ({})",
            doc.blocks.len(),
            output.display(),
            self.target
        );
        let workdir = tempfile::tempdir()?;
        let mermaid = MermaidRenderer::new(
            workdir.path().join("diagrams"),
            !self.mermaid_png,
        )?;
        render_document(&doc, self.target, &self.style, base_dir, &mermaid, output)
    }

    /// The configured output format.
    pub fn target(&self) -> RenderTarget {
        self.target
    }

    /// The effective style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Export a Markdown file with default styling, deriving the output path
/// from the input. Returns the output path.
///
/// # Example
///
/// ```no_run
/// use mdexport::{export_file, RenderTarget};
///
/// let out = export_file("notes.md", RenderTarget::Docx).unwrap();
/// println!("wrote {}", out.display());
/// ```
pub fn export_file<P: AsRef<Path>>(input: P, target: RenderTarget) -> Result<PathBuf> {
    Exporter::new(target).export_file(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_style() {
        let exporter = Exporter::new(RenderTarget::Docx)
            .with_font_family("Arial")
            .with_font_size(14)
            .with_line_height(1.6)
            .with_page_size(PageSize::Letter);
        assert_eq!(exporter.target(), RenderTarget::Docx);
        assert_eq!(exporter.style().font_family, "Arial");
        assert_eq!(exporter.style().font_size_pt, 14);
        assert_eq!(exporter.style().page, PageSize::Letter);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let err = Exporter::new(RenderTarget::Pdf)
            .export_file("definitely_not_here.md")
            .unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[test]
    fn test_output_path_swaps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "# Hi\n").unwrap();
        let out = Exporter::new(RenderTarget::Docx).export_file(&input).unwrap();
        assert_eq!(out, dir.path().join("doc.docx"));
        assert!(out.is_file());
    }
}
