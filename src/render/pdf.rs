//! Paginated PDF backend.
//!
//! Keeps the story/cursor approach of a flow layout: blocks are placed
//! top-down on the current page and a new page is started whenever the
//! next line or image no longer fits. Word wrapping uses an
//! average-advance estimate; exact glyph shaping is out of scope.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::GenericImageView;
use log::{debug, warn};
use printpdf::{
    BuiltinFont, Image as PdfImage, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};

use super::resolve_image_path;
use crate::diagram::MermaidRenderer;
use crate::error::Result;
use crate::model::{Block, Document, ListItem, ListKind};
use crate::style::StyleConfig;

const MARGIN_LEFT_MM: f32 = 20.0;
const MARGIN_RIGHT_MM: f32 = 20.0;
const MARGIN_TOP_MM: f32 = 18.0;
const MARGIN_BOTTOM_MM: f32 = 18.0;
const MAX_IMAGE_WIDTH_MM: f32 = 160.0;
const LIST_INDENT_MM: f32 = 6.0;
const PT_TO_MM: f32 = 0.352_778;
/// Pixel density assumed for images without physical size metadata.
const IMAGE_DPI: f32 = 96.0;

/// Heading spacing in points, levels 1..=6.
const HEADING_SPACE_BEFORE_PT: [f32; 6] = [12.0, 10.0, 8.0, 6.0, 6.0, 6.0];
const HEADING_SPACE_AFTER_PT: [f32; 6] = [8.0, 6.0, 4.0, 4.0, 4.0, 4.0];

/// Render a document tree to a PDF file.
pub fn render_pdf(
    doc: &Document,
    style: &StyleConfig,
    base_dir: &Path,
    mermaid: &MermaidRenderer,
    out_path: &Path,
) -> Result<()> {
    let (page_w, page_h) = style.page.dimensions_mm();
    let (pdf, page, layer) = PdfDocument::new("mdexport", Mm(page_w), Mm(page_h), "content");
    let body_font = register_body_font(&pdf, style)?;
    let mono_font = pdf.add_builtin_font(BuiltinFont::Courier)?;

    {
        let mut renderer = PdfRenderer {
            pdf: &pdf,
            layer: pdf.get_page(page).get_layer(layer),
            y: page_h - MARGIN_TOP_MM,
            page_w,
            page_h,
            style,
            base_dir,
            mermaid,
            body_font,
            mono_font,
            fence_count: 0,
        };
        renderer.render_blocks(&doc.blocks, 0.0);
    }

    let file = File::create(out_path)?;
    pdf.save(&mut BufWriter::new(file))?;
    Ok(())
}

struct PdfRenderer<'a> {
    pdf: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    /// Cursor in mm from the bottom edge of the page.
    y: f32,
    page_w: f32,
    page_h: f32,
    style: &'a StyleConfig,
    base_dir: &'a Path,
    mermaid: &'a MermaidRenderer,
    body_font: IndirectFontRef,
    mono_font: IndirectFontRef,
    fence_count: u32,
}

impl PdfRenderer<'_> {
    fn render_blocks(&mut self, blocks: &[Block], indent: f32) {
        for block in blocks {
            self.render_block(block, indent);
        }
    }

    fn render_block(&mut self, block: &Block, indent: f32) {
        match block {
            Block::Heading { level, text } => self.render_heading(*level, text, indent),
            Block::Paragraph { text, images } => {
                let size = self.style.font_size_pt as f32;
                let leading = (size + 2.0).max(size * self.style.line_height);
                self.draw_wrapped(text, size, leading, false, indent, 2.0);
                for image in images {
                    let path = resolve_image_path(&image.src, self.base_dir);
                    self.draw_image(&path);
                }
            }
            Block::CodeFence { language, code } => {
                self.render_fence(language.as_deref(), code, indent)
            }
            Block::List { kind, items } => self.render_list(*kind, items, indent),
            Block::Image(image) => {
                let path = resolve_image_path(&image.src, self.base_dir);
                self.draw_image(&path);
            }
            // A thematic break is a manual page break in this exporter.
            Block::Rule => self.new_page(),
        }
    }

    fn render_heading(&mut self, level: u8, text: &str, indent: f32) {
        let idx = (level.clamp(1, 6) - 1) as usize;
        let size = self.style.heading_size_pt(level) as f32;
        self.y -= HEADING_SPACE_BEFORE_PT[idx] * PT_TO_MM;
        self.draw_wrapped(
            text,
            size,
            size * 1.2,
            false,
            indent,
            HEADING_SPACE_AFTER_PT[idx],
        );
    }

    fn render_fence(&mut self, language: Option<&str>, code: &str, indent: f32) {
        if language.is_some_and(|l| l.eq_ignore_ascii_case("mermaid")) {
            self.fence_count += 1;
            let hint = format!("mermaid_{}", self.fence_count);
            if let Some(path) = self.mermaid.render(code, &hint) {
                if super::is_raster_artifact(&path) {
                    self.draw_image(&path);
                    return;
                }
                debug!("diagram artifact is SVG; rendering source as text");
            }
        }
        self.draw_preformatted(code, indent);
    }

    fn render_list(&mut self, kind: ListKind, items: &[ListItem], indent: f32) {
        let size = self.style.font_size_pt as f32;
        let leading = (size + 2.0).max(size * self.style.line_height);
        for (i, item) in items.iter().enumerate() {
            let marker = match kind {
                ListKind::Bullet => "\u{2022}".to_string(),
                ListKind::Ordered => format!("{}.", i + 1),
            };
            let mut rest = item.blocks.as_slice();
            match rest.split_first() {
                Some((Block::Paragraph { text, images }, tail)) => {
                    let first_line = format!("{marker} {text}");
                    self.draw_wrapped(&first_line, size, leading, false, indent, 1.5);
                    for image in images {
                        let path = resolve_image_path(&image.src, self.base_dir);
                        self.draw_image(&path);
                    }
                    rest = tail;
                }
                _ => self.draw_wrapped(&marker, size, leading, false, indent, 1.5),
            }
            // Nested block content is rendered one indent level deeper.
            self.render_blocks(rest, indent + LIST_INDENT_MM);
        }
        self.y -= 1.5;
    }

    fn draw_preformatted(&mut self, code: &str, indent: f32) {
        let size = self.style.code_size_pdf_pt() as f32;
        let leading = 10.0_f32.max(size * 1.2);
        let max_chars = self.max_chars(size, true, indent);
        let leading_mm = leading * PT_TO_MM;
        for line in code.lines() {
            // Hard-wrap overlong lines instead of clipping them.
            let mut chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                chars.push(' ');
            }
            for chunk in chars.chunks(max_chars) {
                let segment: String = chunk.iter().collect();
                self.ensure_space(leading_mm);
                self.y -= leading_mm;
                self.layer.use_text(
                    segment,
                    size,
                    Mm(MARGIN_LEFT_MM + indent),
                    Mm(self.y),
                    &self.mono_font,
                );
            }
        }
        self.y -= 4.0 * PT_TO_MM;
    }

    /// Draw a word-wrapped text block and advance the cursor.
    fn draw_wrapped(
        &mut self,
        text: &str,
        size_pt: f32,
        leading_pt: f32,
        mono: bool,
        indent: f32,
        space_after_pt: f32,
    ) {
        if text.is_empty() {
            return;
        }
        let max_chars = self.max_chars(size_pt, mono, indent);
        let leading_mm = leading_pt * PT_TO_MM;
        for line in wrap_text(text, max_chars) {
            self.ensure_space(leading_mm);
            self.y -= leading_mm;
            let font = if mono { &self.mono_font } else { &self.body_font };
            self.layer
                .use_text(line, size_pt, Mm(MARGIN_LEFT_MM + indent), Mm(self.y), font);
        }
        self.y -= space_after_pt * PT_TO_MM;
    }

    /// Estimated character budget for one line at the given size.
    fn max_chars(&self, size_pt: f32, mono: bool, indent: f32) -> usize {
        let advance = if mono { 0.6 } else { 0.5 };
        let content_w = self.page_w - MARGIN_LEFT_MM - MARGIN_RIGHT_MM - indent;
        let char_w_mm = size_pt * PT_TO_MM * advance;
        ((content_w / char_w_mm) as usize).max(1)
    }

    fn draw_image(&mut self, path: &Path) {
        if !path.exists() {
            debug!("image not found, skipping: {}", path.display());
            return;
        }
        let decoded = match image::open(path) {
            Ok(img) => img,
            Err(err) => {
                warn!("failed to decode image {}: {err}", path.display());
                return;
            }
        };
        let (w_px, h_px) = decoded.dimensions();
        if w_px == 0 || h_px == 0 {
            return;
        }
        let native_w_mm = w_px as f32 * 25.4 / IMAGE_DPI;
        let native_h_mm = h_px as f32 * 25.4 / IMAGE_DPI;
        let mut scale = (MAX_IMAGE_WIDTH_MM / native_w_mm).min(1.0);
        let max_h_mm = self.page_h - MARGIN_TOP_MM - MARGIN_BOTTOM_MM;
        if native_h_mm * scale > max_h_mm {
            scale = max_h_mm / native_h_mm;
        }
        let h_mm = native_h_mm * scale;

        self.ensure_space(h_mm + 2.0);
        self.y -= h_mm;

        // Flatten alpha; transparent PNGs otherwise render incorrectly.
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let pdf_image = PdfImage::from_dynamic_image(&rgb);
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_LEFT_MM)),
                translate_y: Some(Mm(self.y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        self.y -= 2.0;
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y - needed_mm < MARGIN_BOTTOM_MM {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .pdf
            .add_page(Mm(self.page_w), Mm(self.page_h), "content");
        self.layer = self.pdf.get_page(page).get_layer(layer);
        self.y = self.page_h - MARGIN_TOP_MM;
    }
}

/// Embed the configured TTF if possible, otherwise fall back to a
/// built-in face resolved from the family name.
fn register_body_font(
    pdf: &PdfDocumentReference,
    style: &StyleConfig,
) -> Result<IndirectFontRef> {
    if let Some(path) = &style.ttf_path {
        if path.exists() {
            match File::open(path) {
                Ok(file) => match pdf.add_external_font(file) {
                    Ok(font) => {
                        debug!("embedded font {}", path.display());
                        return Ok(font);
                    }
                    Err(err) => {
                        warn!("failed to register font {}: {err}", path.display())
                    }
                },
                Err(err) => warn!("failed to open font {}: {err}", path.display()),
            }
        } else {
            warn!("font file not found: {}", path.display());
        }
    }
    Ok(pdf.add_builtin_font(builtin_for_family(&style.font_family))?)
}

fn builtin_for_family(family: &str) -> BuiltinFont {
    let family = family.to_ascii_lowercase();
    if family.contains("courier") || family.contains("mono") {
        BuiltinFont::Courier
    } else if family.contains("times") {
        BuiltinFont::TimesRoman
    } else {
        BuiltinFont::Helvetica
    }
}

/// Greedy word wrap with a fixed per-line character budget. Words longer
/// than the budget are chopped.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if !current.is_empty() && current.chars().count() + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
