//! Flow-document DOCX backend.
//!
//! Writes a minimal WordprocessingML package directly: document part,
//! styles part with the document defaults from [`StyleConfig`], media
//! files, and the relationship parts that tie them together.
//!
//! Per the capability matrix, lists are degraded through the plain
//! paragraph path and rules are skipped; only headings, paragraphs,
//! code fences and images get dedicated layout.

use std::fs;
use std::path::Path;

use log::debug;

use super::capability::{BlockKind, Capabilities, Support};
use super::ooxml::{
    content_types, emu_from_inches, media_extension, Package, Relationships, XmlPart,
    REL_TYPE_IMAGE, REL_TYPE_OFFICE_DOCUMENT,
};
use super::{resolve_image_path, RenderTarget};
use crate::diagram::MermaidRenderer;
use crate::error::Result;
use crate::model::{Block, Document};
use crate::style::StyleConfig;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Inline image width in the flow document.
const IMAGE_WIDTH_IN: f64 = 6.0;

/// Render a document tree to a DOCX file.
pub fn render_docx(
    doc: &Document,
    style: &StyleConfig,
    base_dir: &Path,
    mermaid: &MermaidRenderer,
    out_path: &Path,
) -> Result<()> {
    let mut writer = DocxWriter::new(style, base_dir, mermaid)?;
    writer.render_blocks(&doc.blocks)?;
    writer.save(out_path)
}

struct DocxWriter<'a> {
    style: &'a StyleConfig,
    base_dir: &'a Path,
    mermaid: &'a MermaidRenderer,
    body: XmlPart,
    rels: Relationships,
    /// (file name under word/media, bytes)
    media: Vec<(String, Vec<u8>)>,
    image_count: u32,
    fence_count: u32,
}

impl<'a> DocxWriter<'a> {
    fn new(
        style: &'a StyleConfig,
        base_dir: &'a Path,
        mermaid: &'a MermaidRenderer,
    ) -> Result<Self> {
        let mut body = XmlPart::new()?;
        body.open(
            "w:document",
            &[
                ("xmlns:w", NS_W),
                ("xmlns:r", NS_R),
                ("xmlns:wp", NS_WP),
                ("xmlns:a", NS_A),
                ("xmlns:pic", NS_PIC),
            ],
        )?;
        body.open("w:body", &[])?;
        let mut rels = Relationships::new();
        rels.add(REL_TYPE_STYLES, "styles.xml");
        Ok(Self {
            style,
            base_dir,
            mermaid,
            body,
            rels,
            media: Vec::new(),
            image_count: 0,
            fence_count: 0,
        })
    }

    fn render_blocks(&mut self, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            self.render_block(block)?;
        }
        Ok(())
    }

    fn render_block(&mut self, block: &Block) -> Result<()> {
        match Capabilities::of(RenderTarget::Docx, BlockKind::of(block)) {
            Support::Skip => return Ok(()),
            Support::Degrade => {
                if let Block::List { items, .. } = block {
                    for item in items {
                        self.render_blocks(&item.blocks)?;
                    }
                }
                return Ok(());
            }
            Support::Native => {}
        }

        match block {
            Block::Heading { level, text } => self.heading(*level, text)?,
            Block::Paragraph { text, images } => {
                if !text.trim().is_empty() {
                    self.paragraph(text)?;
                }
                for image in images {
                    let path = resolve_image_path(&image.src, self.base_dir);
                    self.image(&path)?;
                }
            }
            Block::CodeFence { language, code } => {
                self.fence(language.as_deref(), code)?
            }
            Block::Image(image) => {
                let path = resolve_image_path(&image.src, self.base_dir);
                self.image(&path)?;
            }
            Block::List { .. } | Block::Rule => unreachable!("handled by capability matrix"),
        }
        Ok(())
    }

    fn paragraph(&mut self, text: &str) -> Result<()> {
        self.body.open("w:p", &[])?;
        self.body.open("w:r", &[])?;
        self.body
            .text_element("w:t", &[("xml:space", "preserve")], text)?;
        self.body.close("w:r")?;
        self.body.close("w:p")
    }

    fn heading(&mut self, level: u8, text: &str) -> Result<()> {
        let bump = match level {
            1 => 8,
            2 => 4,
            3 => 2,
            _ => 1,
        };
        let half_points = ((self.style.font_size_pt + bump) * 2).to_string();
        self.body.open("w:p", &[])?;
        self.body.open("w:r", &[])?;
        self.body.open("w:rPr", &[])?;
        self.body.empty("w:b", &[])?;
        self.body.empty("w:sz", &[("w:val", &half_points)])?;
        self.body.empty("w:szCs", &[("w:val", &half_points)])?;
        self.body.close("w:rPr")?;
        self.body
            .text_element("w:t", &[("xml:space", "preserve")], text)?;
        self.body.close("w:r")?;
        self.body.close("w:p")
    }

    fn fence(&mut self, language: Option<&str>, code: &str) -> Result<()> {
        if language.is_some_and(|l| l.eq_ignore_ascii_case("mermaid")) {
            self.fence_count += 1;
            let hint = format!("mermaid_{}", self.fence_count);
            if let Some(path) = self.mermaid.render(code, &hint) {
                if super::is_raster_artifact(&path) && path.exists() {
                    return self.image(&path);
                }
            }
        }
        self.code_block(code)
    }

    /// Monospaced paragraph: one run, one `w:t` per source line with
    /// `w:br` separators.
    fn code_block(&mut self, code: &str) -> Result<()> {
        let half_points = (self.style.code_size_docx_pt() * 2).to_string();
        self.body.open("w:p", &[])?;
        self.body.open("w:r", &[])?;
        self.body.open("w:rPr", &[])?;
        self.body.empty(
            "w:rFonts",
            &[("w:ascii", "Consolas"), ("w:hAnsi", "Consolas")],
        )?;
        self.body.empty("w:sz", &[("w:val", &half_points)])?;
        self.body.empty("w:szCs", &[("w:val", &half_points)])?;
        self.body.close("w:rPr")?;
        let mut first = true;
        for line in code.lines() {
            if !first {
                self.body.empty("w:br", &[])?;
            }
            self.body
                .text_element("w:t", &[("xml:space", "preserve")], line)?;
            first = false;
        }
        self.body.close("w:r")?;
        self.body.close("w:p")
    }

    /// Insert an image at a fixed 6-inch width, preserving aspect ratio.
    /// Missing or undecodable files are skipped without error.
    fn image(&mut self, path: &Path) -> Result<()> {
        let (w_px, h_px) = match image::image_dimensions(path) {
            Ok(dims) if dims.0 > 0 && dims.1 > 0 => dims,
            Ok(_) => return Ok(()),
            Err(err) => {
                debug!("skipping image {}: {err}", path.display());
                return Ok(());
            }
        };
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("skipping image {}: {err}", path.display());
                return Ok(());
            }
        };

        self.image_count += 1;
        let (ext, _) = media_extension(path);
        let name = format!("image{}.{ext}", self.image_count);
        let rel_id = self.rels.add(REL_TYPE_IMAGE, &format!("media/{name}"));
        self.media.push((name, bytes));

        let cx = emu_from_inches(IMAGE_WIDTH_IN);
        let cy = (cx as f64 * h_px as f64 / w_px as f64).round() as i64;
        let cx = cx.to_string();
        let cy = cy.to_string();
        let id = self.image_count.to_string();
        let pic_name = format!("Picture {}", self.image_count);

        self.body.open("w:p", &[])?;
        self.body.open("w:r", &[])?;
        self.body.open("w:drawing", &[])?;
        self.body.open(
            "wp:inline",
            &[
                ("distT", "0"),
                ("distB", "0"),
                ("distL", "0"),
                ("distR", "0"),
            ],
        )?;
        self.body
            .empty("wp:extent", &[("cx", &cx), ("cy", &cy)])?;
        self.body
            .empty("wp:docPr", &[("id", &id), ("name", &pic_name)])?;
        self.body.open("a:graphic", &[])?;
        self.body.open("a:graphicData", &[("uri", NS_PIC)])?;
        self.body.open("pic:pic", &[])?;
        self.body.open("pic:nvPicPr", &[])?;
        self.body
            .empty("pic:cNvPr", &[("id", &id), ("name", &pic_name)])?;
        self.body.empty("pic:cNvPicPr", &[])?;
        self.body.close("pic:nvPicPr")?;
        self.body.open("pic:blipFill", &[])?;
        self.body.empty("a:blip", &[("r:embed", &rel_id)])?;
        self.body.open("a:stretch", &[])?;
        self.body.empty("a:fillRect", &[])?;
        self.body.close("a:stretch")?;
        self.body.close("pic:blipFill")?;
        self.body.open("pic:spPr", &[])?;
        self.body.open("a:xfrm", &[])?;
        self.body.empty("a:off", &[("x", "0"), ("y", "0")])?;
        self.body.empty("a:ext", &[("cx", &cx), ("cy", &cy)])?;
        self.body.close("a:xfrm")?;
        self.body.open("a:prstGeom", &[("prst", "rect")])?;
        self.body.empty("a:avLst", &[])?;
        self.body.close("a:prstGeom")?;
        self.body.close("pic:spPr")?;
        self.body.close("pic:pic")?;
        self.body.close("a:graphicData")?;
        self.body.close("a:graphic")?;
        self.body.close("wp:inline")?;
        self.body.close("w:drawing")?;
        self.body.close("w:r")?;
        self.body.close("w:p")
    }

    fn styles_part(&self) -> Result<Vec<u8>> {
        let half_points = (self.style.font_size_pt * 2).to_string();
        let family = self.style.font_family.as_str();
        let mut part = XmlPart::new()?;
        part.open("w:styles", &[("xmlns:w", NS_W)])?;
        part.open("w:docDefaults", &[])?;
        part.open("w:rPrDefault", &[])?;
        part.open("w:rPr", &[])?;
        part.empty(
            "w:rFonts",
            &[
                ("w:ascii", family),
                ("w:hAnsi", family),
                ("w:eastAsia", family),
                ("w:cs", family),
            ],
        )?;
        part.empty("w:sz", &[("w:val", &half_points)])?;
        part.empty("w:szCs", &[("w:val", &half_points)])?;
        part.close("w:rPr")?;
        part.close("w:rPrDefault")?;
        part.close("w:docDefaults")?;
        part.close("w:styles")?;
        Ok(part.into_bytes())
    }

    fn save(mut self, out_path: &Path) -> Result<()> {
        self.body.empty("w:sectPr", &[])?;
        self.body.close("w:body")?;
        self.body.close("w:document")?;

        let mut package_rels = Relationships::new();
        package_rels.add(REL_TYPE_OFFICE_DOCUMENT, "word/document.xml");

        let types = content_types(
            &[
                (
                    "rels",
                    "application/vnd.openxmlformats-package.relationships+xml",
                ),
                ("xml", "application/xml"),
                ("png", "image/png"),
                ("jpeg", "image/jpeg"),
                ("gif", "image/gif"),
                ("bmp", "image/bmp"),
            ],
            &[
                (
                    "/word/document.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
                ),
                (
                    "/word/styles.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
                ),
            ],
        )?;

        let styles = self.styles_part()?;
        let mut package = Package::create(out_path)?;
        package.part("[Content_Types].xml", &types)?;
        package.part("_rels/.rels", &package_rels.to_xml()?)?;
        package.part("word/document.xml", &self.body.into_bytes())?;
        package.part("word/styles.xml", &styles)?;
        package.part("word/_rels/document.xml.rels", &self.rels.to_xml()?)?;
        for (name, bytes) in &self.media {
            package.part(&format!("word/media/{name}"), bytes)?;
        }
        package.finish()
    }
}
