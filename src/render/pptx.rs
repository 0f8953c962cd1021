//! Slide-deck PPTX backend.
//!
//! Rendering happens in two stages: the document tree is first folded
//! into a flat slide list (content slides carrying title + bullets,
//! dedicated image slides), then the deck is serialized as a minimal
//! PresentationML package with one master, one layout, and one theme.
//!
//! Deck semantics: a level-1 heading starts a new slide; deeper headings
//! and paragraphs become bullets; images, successful diagrams and
//! standalone pictures get their own slide. Lists degrade through the
//! bullet path (capability matrix), keeping their nesting depth as the
//! bullet level.

use std::fs;
use std::path::Path;

use log::debug;

use super::capability::{BlockKind, Capabilities, Support};
use super::ooxml::{
    content_types, emu_from_inches, media_extension, Package, Relationships, XmlPart,
    REL_TYPE_IMAGE, REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_SLIDE, REL_TYPE_SLIDE_LAYOUT,
    REL_TYPE_SLIDE_MASTER, REL_TYPE_THEME,
};
use super::{resolve_image_path, RenderTarget};
use crate::diagram::MermaidRenderer;
use crate::error::Result;
use crate::model::{Block, Document};
use crate::style::StyleConfig;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// 10 x 7.5 inch slide, 4:3.
const SLIDE_W_EMU: i64 = 9_144_000;
const SLIDE_H_EMU: i64 = 6_858_000;

/// Picture slide geometry: 1 in left, 1.2 in top, 8 in wide.
const PICTURE_LEFT_IN: f64 = 1.0;
const PICTURE_TOP_IN: f64 = 1.2;
const PICTURE_WIDTH_IN: f64 = 8.0;

const MAX_BULLET_LEVEL: u8 = 4;

/// Title used when content appears before any heading.
const FALLBACK_TITLE: &str = "Contenido";
/// Title for diagram slides.
const DIAGRAM_TITLE: &str = "Diagrama";
/// Bullet placeholder when the diagram tool is unavailable.
const DIAGRAM_UNAVAILABLE: &str = "[Mermaid no disponible]";

/// Render a document tree to a PPTX file.
pub fn render_pptx(
    doc: &Document,
    style: &StyleConfig,
    base_dir: &Path,
    mermaid: &MermaidRenderer,
    out_path: &Path,
) -> Result<()> {
    let slides = build_deck(doc, base_dir, mermaid);
    write_package(&slides, style, out_path)
}

enum Slide {
    Content {
        title: String,
        /// (text, bullet level 0..=4)
        bullets: Vec<(String, u8)>,
    },
    Picture {
        title: String,
        data: Vec<u8>,
        ext: &'static str,
        w_px: u32,
        h_px: u32,
    },
}

struct DeckBuilder<'a> {
    slides: Vec<Slide>,
    /// Index of the content slide currently receiving bullets.
    current: Option<usize>,
    fence_count: u32,
    base_dir: &'a Path,
    mermaid: &'a MermaidRenderer,
}

impl DeckBuilder<'_> {
    /// `list_depth` counts enclosing lists; degraded list-item bullets
    /// use it (minus one) as their level.
    fn walk(&mut self, blocks: &[Block], list_depth: u8) {
        for block in blocks {
            match Capabilities::of(RenderTarget::Pptx, BlockKind::of(block)) {
                Support::Skip => continue,
                Support::Degrade => {
                    if let Block::List { items, .. } = block {
                        for item in items {
                            self.walk(&item.blocks, list_depth.saturating_add(1));
                        }
                    }
                    continue;
                }
                Support::Native => {}
            }
            self.block(block, list_depth);
        }
    }

    fn block(&mut self, block: &Block, list_depth: u8) {
        match block {
            Block::Heading { level, text } => {
                if *level == 1 || self.current.is_none() {
                    let title = if text.is_empty() { "Slide" } else { text };
                    self.new_content_slide(title);
                } else {
                    self.bullet(text, level - 1);
                }
            }
            Block::Paragraph { text, images } => {
                if images.is_empty() {
                    if !text.trim().is_empty() {
                        let level = list_depth.saturating_sub(1);
                        self.bullet(text.trim(), level);
                    }
                } else {
                    // A paragraph with images becomes one slide per image;
                    // its text is not carried over.
                    for image in images {
                        let path = resolve_image_path(&image.src, self.base_dir);
                        self.picture_slide(&image.alt, &path);
                    }
                }
            }
            Block::CodeFence { language, code } => self.fence(language.as_deref(), code),
            Block::Image(image) => {
                let path = resolve_image_path(&image.src, self.base_dir);
                self.picture_slide(&image.alt, &path);
            }
            Block::List { .. } | Block::Rule => {
                unreachable!("handled by capability matrix")
            }
        }
    }

    fn fence(&mut self, language: Option<&str>, code: &str) {
        if language.is_some_and(|l| l.eq_ignore_ascii_case("mermaid")) {
            self.fence_count += 1;
            let hint = format!("mermaid_{}", self.fence_count);
            if let Some(path) = self.mermaid.render(code, &hint) {
                if super::is_raster_artifact(&path) && self.picture_from(&path, DIAGRAM_TITLE)
                {
                    return;
                }
            }
            // Placeholder plus the source itself, so the diagram text is
            // never lost from the deck.
            self.bullet(DIAGRAM_UNAVAILABLE, 0);
            for line in code.trim_end_matches('\n').lines() {
                self.bullet(line, 1);
            }
        } else {
            let lang = language.unwrap_or("");
            self.bullet(&format!("```{lang}```"), 0);
            for line in code.trim_end_matches('\n').lines() {
                self.bullet(line, 1);
            }
        }
    }

    fn new_content_slide(&mut self, title: &str) {
        self.slides.push(Slide::Content {
            title: title.to_string(),
            bullets: Vec::new(),
        });
        self.current = Some(self.slides.len() - 1);
    }

    fn bullet(&mut self, text: &str, level: u8) {
        if self.current.is_none() {
            self.new_content_slide(FALLBACK_TITLE);
        }
        if let Some(idx) = self.current {
            if let Slide::Content { bullets, .. } = &mut self.slides[idx] {
                bullets.push((text.to_string(), level.min(MAX_BULLET_LEVEL)));
            }
        }
    }

    fn picture_slide(&mut self, title: &str, path: &Path) {
        self.picture_from(path, title);
    }

    /// Load an image into a dedicated slide. Missing or undecodable
    /// files are skipped; returns whether a slide was added.
    fn picture_from(&mut self, path: &Path, title: &str) -> bool {
        let (w_px, h_px) = match image::image_dimensions(path) {
            Ok(dims) if dims.0 > 0 && dims.1 > 0 => dims,
            Ok(_) => return false,
            Err(err) => {
                debug!("skipping image {}: {err}", path.display());
                return false;
            }
        };
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                debug!("skipping image {}: {err}", path.display());
                return false;
            }
        };
        let (ext, _) = media_extension(path);
        self.slides.push(Slide::Picture {
            title: title.to_string(),
            data,
            ext,
            w_px,
            h_px,
        });
        true
    }
}

// ---- package serialization ----

fn write_package(slides: &[Slide], style: &StyleConfig, out_path: &Path) -> Result<()> {
    let mut package = Package::create(out_path)?;

    let mut overrides: Vec<(String, String)> = vec![
        (
            "/ppt/presentation.xml".into(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"
                .into(),
        ),
        (
            "/ppt/slideMasters/slideMaster1.xml".into(),
            "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml".into(),
        ),
        (
            "/ppt/slideLayouts/slideLayout1.xml".into(),
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml".into(),
        ),
        (
            "/ppt/theme/theme1.xml".into(),
            "application/vnd.openxmlformats-officedocument.theme+xml".into(),
        ),
    ];
    for n in 1..=slides.len() {
        overrides.push((
            format!("/ppt/slides/slide{n}.xml"),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml".into(),
        ));
    }
    let override_refs: Vec<(&str, &str)> = overrides
        .iter()
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect();
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
        &override_refs,
    )?;
    package.part("[Content_Types].xml", &types)?;

    let mut root_rels = Relationships::new();
    root_rels.add(REL_TYPE_OFFICE_DOCUMENT, "ppt/presentation.xml");
    package.part("_rels/.rels", &root_rels.to_xml()?)?;

    package.part("ppt/presentation.xml", &presentation_part(slides.len())?)?;
    let mut pres_rels = Relationships::new();
    pres_rels.add(REL_TYPE_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    for n in 1..=slides.len() {
        pres_rels.add(REL_TYPE_SLIDE, &format!("slides/slide{n}.xml"));
    }
    package.part("ppt/_rels/presentation.xml.rels", &pres_rels.to_xml()?)?;

    package.part("ppt/slideMasters/slideMaster1.xml", &master_part()?)?;
    let mut master_rels = Relationships::new();
    master_rels.add(REL_TYPE_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    master_rels.add(REL_TYPE_THEME, "../theme/theme1.xml");
    package.part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &master_rels.to_xml()?,
    )?;

    package.part("ppt/slideLayouts/slideLayout1.xml", &layout_part()?)?;
    let mut layout_rels = Relationships::new();
    layout_rels.add(REL_TYPE_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    package.part(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &layout_rels.to_xml()?,
    )?;

    package.part("ppt/theme/theme1.xml", &theme_part()?)?;

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        let mut rels = Relationships::new();
        rels.add(REL_TYPE_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        let image_rel = match slide {
            Slide::Picture { data, ext, .. } => {
                let name = format!("image{n}.{ext}");
                let rel_id = rels.add(REL_TYPE_IMAGE, &format!("../media/{name}"));
                package.part(&format!("ppt/media/{name}"), data)?;
                Some(rel_id)
            }
            Slide::Content { .. } => None,
        };
        package.part(
            &format!("ppt/slides/slide{n}.xml"),
            &slide_part(slide, style, image_rel.as_deref())?,
        )?;
        package.part(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            &rels.to_xml()?,
        )?;
    }

    package.finish()
}

fn presentation_part(slide_count: usize) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.open(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
    )?;
    part.open("p:sldMasterIdLst", &[])?;
    part.empty(
        "p:sldMasterId",
        &[("id", "2147483648"), ("r:id", "rId1")],
    )?;
    part.close("p:sldMasterIdLst")?;
    if slide_count > 0 {
        part.open("p:sldIdLst", &[])?;
        for n in 0..slide_count {
            let id = (256 + n).to_string();
            let rid = format!("rId{}", n + 2);
            part.empty("p:sldId", &[("id", &id), ("r:id", &rid)])?;
        }
        part.close("p:sldIdLst")?;
    }
    let w = SLIDE_W_EMU.to_string();
    let h = SLIDE_H_EMU.to_string();
    part.empty("p:sldSz", &[("cx", &w), ("cy", &h)])?;
    part.empty("p:notesSz", &[("cx", &h), ("cy", &w)])?;
    part.close("p:presentation")?;
    Ok(part.into_bytes())
}

/// Empty shape tree shared by master, layout and slides.
fn sp_tree_header(part: &mut XmlPart) -> Result<()> {
    part.open("p:nvGrpSpPr", &[])?;
    part.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    part.empty("p:cNvGrpSpPr", &[])?;
    part.empty("p:nvPr", &[])?;
    part.close("p:nvGrpSpPr")?;
    part.empty("p:grpSpPr", &[])
}

fn master_part() -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.open(
        "p:sldMaster",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
    )?;
    part.open("p:cSld", &[])?;
    part.open("p:spTree", &[])?;
    sp_tree_header(&mut part)?;
    part.close("p:spTree")?;
    part.close("p:cSld")?;
    part.empty(
        "p:clrMap",
        &[
            ("bg1", "lt1"),
            ("tx1", "dk1"),
            ("bg2", "lt2"),
            ("tx2", "dk2"),
            ("accent1", "accent1"),
            ("accent2", "accent2"),
            ("accent3", "accent3"),
            ("accent4", "accent4"),
            ("accent5", "accent5"),
            ("accent6", "accent6"),
            ("hlink", "hlink"),
            ("folHlink", "folHlink"),
        ],
    )?;
    part.open("p:sldLayoutIdLst", &[])?;
    part.empty(
        "p:sldLayoutId",
        &[("id", "2147483649"), ("r:id", "rId1")],
    )?;
    part.close("p:sldLayoutIdLst")?;
    part.close("p:sldMaster")?;
    Ok(part.into_bytes())
}

fn layout_part() -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.open(
        "p:sldLayout",
        &[
            ("xmlns:a", NS_A),
            ("xmlns:r", NS_R),
            ("xmlns:p", NS_P),
            ("type", "blank"),
        ],
    )?;
    part.open("p:cSld", &[])?;
    part.open("p:spTree", &[])?;
    sp_tree_header(&mut part)?;
    part.close("p:spTree")?;
    part.close("p:cSld")?;
    part.open("p:clrMapOvr", &[])?;
    part.empty("a:masterClrMapping", &[])?;
    part.close("p:clrMapOvr")?;
    part.close("p:sldLayout")?;
    Ok(part.into_bytes())
}

fn theme_part() -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.open("a:theme", &[("xmlns:a", NS_A), ("name", "Office")])?;
    part.open("a:themeElements", &[])?;

    part.open("a:clrScheme", &[("name", "Office")])?;
    for (name, sys, val) in [
        ("a:dk1", true, "windowText"),
        ("a:lt1", true, "window"),
        ("a:dk2", false, "44546A"),
        ("a:lt2", false, "E7E6E6"),
        ("a:accent1", false, "4472C4"),
        ("a:accent2", false, "ED7D31"),
        ("a:accent3", false, "A5A5A5"),
        ("a:accent4", false, "FFC000"),
        ("a:accent5", false, "5B9BD5"),
        ("a:accent6", false, "70AD47"),
        ("a:hlink", false, "0563C1"),
        ("a:folHlink", false, "954F72"),
    ] {
        part.open(name, &[])?;
        if sys {
            let last_clr = if val == "windowText" { "000000" } else { "FFFFFF" };
            part.empty("a:sysClr", &[("val", val), ("lastClr", last_clr)])?;
        } else {
            part.empty("a:srgbClr", &[("val", val)])?;
        }
        part.close(name)?;
    }
    part.close("a:clrScheme")?;

    part.open("a:fontScheme", &[("name", "Office")])?;
    for font in ["a:majorFont", "a:minorFont"] {
        part.open(font, &[])?;
        part.empty("a:latin", &[("typeface", "Calibri")])?;
        part.empty("a:ea", &[("typeface", "")])?;
        part.empty("a:cs", &[("typeface", "")])?;
        part.close(font)?;
    }
    part.close("a:fontScheme")?;

    part.open("a:fmtScheme", &[("name", "Office")])?;
    part.open("a:fillStyleLst", &[])?;
    for _ in 0..3 {
        part.open("a:solidFill", &[])?;
        part.empty("a:schemeClr", &[("val", "phClr")])?;
        part.close("a:solidFill")?;
    }
    part.close("a:fillStyleLst")?;
    part.open("a:lnStyleLst", &[])?;
    for width in ["6350", "12700", "19050"] {
        part.open("a:ln", &[("w", width)])?;
        part.open("a:solidFill", &[])?;
        part.empty("a:schemeClr", &[("val", "phClr")])?;
        part.close("a:solidFill")?;
        part.close("a:ln")?;
    }
    part.close("a:lnStyleLst")?;
    part.open("a:effectStyleLst", &[])?;
    for _ in 0..3 {
        part.open("a:effectStyle", &[])?;
        part.empty("a:effectLst", &[])?;
        part.close("a:effectStyle")?;
    }
    part.close("a:effectStyleLst")?;
    part.open("a:bgFillStyleLst", &[])?;
    for _ in 0..3 {
        part.open("a:solidFill", &[])?;
        part.empty("a:schemeClr", &[("val", "phClr")])?;
        part.close("a:solidFill")?;
    }
    part.close("a:bgFillStyleLst")?;
    part.close("a:fmtScheme")?;

    part.close("a:themeElements")?;
    part.close("a:theme")?;
    Ok(part.into_bytes())
}

fn slide_part(slide: &Slide, style: &StyleConfig, image_rel: Option<&str>) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.open(
        "p:sld",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
    )?;
    part.open("p:cSld", &[])?;
    part.open("p:spTree", &[])?;
    sp_tree_header(&mut part)?;

    match slide {
        Slide::Content { title, bullets } => {
            title_shape(&mut part, title, style)?;
            body_shape(&mut part, bullets, style)?;
        }
        Slide::Picture {
            title, w_px, h_px, ..
        } => {
            if !title.is_empty() {
                title_shape(&mut part, title, style)?;
            }
            let rel_id = image_rel.unwrap_or("rId2");
            picture_shape(&mut part, rel_id, *w_px, *h_px)?;
        }
    }

    part.close("p:spTree")?;
    part.close("p:cSld")?;
    part.open("p:clrMapOvr", &[])?;
    part.empty("a:masterClrMapping", &[])?;
    part.close("p:clrMapOvr")?;
    part.close("p:sld")?;
    Ok(part.into_bytes())
}

fn title_shape(part: &mut XmlPart, title: &str, style: &StyleConfig) -> Result<()> {
    part.open("p:sp", &[])?;
    part.open("p:nvSpPr", &[])?;
    part.empty("p:cNvPr", &[("id", "2"), ("name", "Title 1")])?;
    part.open("p:cNvSpPr", &[])?;
    part.empty("a:spLocks", &[("noGrp", "1")])?;
    part.close("p:cNvSpPr")?;
    part.open("p:nvPr", &[])?;
    part.empty("p:ph", &[("type", "title")])?;
    part.close("p:nvPr")?;
    part.close("p:nvSpPr")?;
    part.open("p:spPr", &[])?;
    part.open("a:xfrm", &[])?;
    part.empty("a:off", &[("x", "457200"), ("y", "274638")])?;
    part.empty("a:ext", &[("cx", "8229600"), ("cy", "1143000")])?;
    part.close("a:xfrm")?;
    part.open("a:prstGeom", &[("prst", "rect")])?;
    part.empty("a:avLst", &[])?;
    part.close("a:prstGeom")?;
    part.close("p:spPr")?;
    part.open("p:txBody", &[])?;
    part.empty("a:bodyPr", &[])?;
    part.empty("a:lstStyle", &[])?;
    part.open("a:p", &[])?;
    run(part, title, (style.font_size_pt + 8) * 100, style)?;
    part.close("a:p")?;
    part.close("p:txBody")?;
    part.close("p:sp")
}

fn body_shape(part: &mut XmlPart, bullets: &[(String, u8)], style: &StyleConfig) -> Result<()> {
    part.open("p:sp", &[])?;
    part.open("p:nvSpPr", &[])?;
    part.empty("p:cNvPr", &[("id", "3"), ("name", "Content 2")])?;
    part.open("p:cNvSpPr", &[])?;
    part.empty("a:spLocks", &[("noGrp", "1")])?;
    part.close("p:cNvSpPr")?;
    part.open("p:nvPr", &[])?;
    part.empty("p:ph", &[("type", "body"), ("idx", "1")])?;
    part.close("p:nvPr")?;
    part.close("p:nvSpPr")?;
    part.open("p:spPr", &[])?;
    part.open("a:xfrm", &[])?;
    part.empty("a:off", &[("x", "457200"), ("y", "1600200")])?;
    part.empty("a:ext", &[("cx", "8229600"), ("cy", "4525963")])?;
    part.close("a:xfrm")?;
    part.open("a:prstGeom", &[("prst", "rect")])?;
    part.empty("a:avLst", &[])?;
    part.close("a:prstGeom")?;
    part.close("p:spPr")?;
    part.open("p:txBody", &[])?;
    part.empty("a:bodyPr", &[])?;
    part.empty("a:lstStyle", &[])?;
    if bullets.is_empty() {
        // txBody requires at least one paragraph.
        part.open("a:p", &[])?;
        part.close("a:p")?;
    }
    for (text, level) in bullets {
        part.open("a:p", &[])?;
        if *level > 0 {
            let lvl = level.to_string();
            part.empty("a:pPr", &[("lvl", &lvl)])?;
        }
        run(part, text, style.font_size_pt * 100, style)?;
        part.close("a:p")?;
    }
    part.close("p:txBody")?;
    part.close("p:sp")
}

fn run(part: &mut XmlPart, text: &str, size_centi_pt: u32, style: &StyleConfig) -> Result<()> {
    part.open("a:r", &[])?;
    let sz = size_centi_pt.to_string();
    part.open("a:rPr", &[("lang", "en-US"), ("sz", &sz)])?;
    part.empty("a:latin", &[("typeface", &style.font_family)])?;
    part.close("a:rPr")?;
    part.text_element("a:t", &[], text)?;
    part.close("a:r")
}

fn build_deck<'a>(
    doc: &Document,
    base_dir: &'a Path,
    mermaid: &'a MermaidRenderer,
) -> Vec<Slide> {
    let mut builder = DeckBuilder {
        slides: Vec::new(),
        current: None,
        fence_count: 0,
        base_dir,
        mermaid,
    };
    builder.walk(&doc.blocks, 0);
    builder.slides
}

fn picture_shape(part: &mut XmlPart, rel_id: &str, w_px: u32, h_px: u32) -> Result<()> {
    let cx = emu_from_inches(PICTURE_WIDTH_IN);
    let cy = (cx as f64 * h_px as f64 / w_px as f64).round() as i64;
    let x = emu_from_inches(PICTURE_LEFT_IN).to_string();
    let y = emu_from_inches(PICTURE_TOP_IN).to_string();
    let cx = cx.to_string();
    let cy = cy.to_string();

    part.open("p:pic", &[])?;
    part.open("p:nvPicPr", &[])?;
    part.empty("p:cNvPr", &[("id", "4"), ("name", "Picture 3")])?;
    part.open("p:cNvPicPr", &[])?;
    part.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    part.close("p:cNvPicPr")?;
    part.empty("p:nvPr", &[])?;
    part.close("p:nvPicPr")?;
    part.open("p:blipFill", &[])?;
    part.empty("a:blip", &[("r:embed", rel_id)])?;
    part.open("a:stretch", &[])?;
    part.empty("a:fillRect", &[])?;
    part.close("a:stretch")?;
    part.close("p:blipFill")?;
    part.open("p:spPr", &[])?;
    part.open("a:xfrm", &[])?;
    part.empty("a:off", &[("x", &x), ("y", &y)])?;
    part.empty("a:ext", &[("cx", &cx), ("cy", &cy)])?;
    part.close("a:xfrm")?;
    part.open("a:prstGeom", &[("prst", "rect")])?;
    part.empty("a:avLst", &[])?;
    part.close("a:prstGeom")?;
    part.close("p:spPr")?;
    part.close("p:pic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markdown;

    fn deck(markdown: &str) -> Vec<Slide> {
        let dir = tempfile::tempdir().unwrap();
        let mermaid = MermaidRenderer::disabled(dir.path().to_path_buf());
        build_deck(&parse_markdown(markdown), dir.path(), &mermaid)
    }

    fn content(slide: &Slide) -> (&str, &[(String, u8)]) {
        match slide {
            Slide::Content { title, bullets } => (title, bullets),
            Slide::Picture { .. } => panic!("expected content slide"),
        }
    }

    #[test]
    fn test_heading_starts_slide() {
        let slides = deck("# Title\n\nHello world\n");
        assert_eq!(slides.len(), 1);
        let (title, bullets) = content(&slides[0]);
        assert_eq!(title, "Title");
        assert_eq!(bullets, &[("Hello world".to_string(), 0)]);
    }

    #[test]
    fn test_content_before_heading_gets_fallback_slide() {
        let slides = deck("Some intro text\n");
        let (title, bullets) = content(&slides[0]);
        assert_eq!(title, FALLBACK_TITLE);
        assert_eq!(bullets.len(), 1);
    }

    #[test]
    fn test_subheadings_become_bullets() {
        let slides = deck("# One\n\n## Sub\n\n### Deeper\n");
        assert_eq!(slides.len(), 1);
        let (_, bullets) = content(&slides[0]);
        assert_eq!(bullets, &[("Sub".to_string(), 1), ("Deeper".to_string(), 2)]);
    }

    #[test]
    fn test_second_h1_starts_new_slide() {
        let slides = deck("# One\n\na\n\n# Two\n\nb\n");
        assert_eq!(slides.len(), 2);
        assert_eq!(content(&slides[1]).0, "Two");
    }

    #[test]
    fn test_mermaid_unavailable_keeps_source() {
        let slides = deck("# D\n\n```mermaid\ngraph TD; A-->B;\n```\n");
        let (_, bullets) = content(&slides[0]);
        assert_eq!(
            bullets,
            &[
                (DIAGRAM_UNAVAILABLE.to_string(), 0),
                ("graph TD; A-->B;".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_code_fence_bullets() {
        let slides = deck("# C\n\n```python\nx = 1\ny = 2\n```\n");
        let (_, bullets) = content(&slides[0]);
        assert_eq!(bullets[0], ("```python```".to_string(), 0));
        assert_eq!(bullets[1], ("x = 1".to_string(), 1));
        assert_eq!(bullets[2], ("y = 2".to_string(), 1));
    }

    #[test]
    fn test_list_items_keep_depth() {
        let slides = deck("# L\n\n- top\n  - nested\n");
        let (_, bullets) = content(&slides[0]);
        assert_eq!(bullets, &[("top".to_string(), 0), ("nested".to_string(), 1)]);
    }

    #[test]
    fn test_missing_image_skipped() {
        let slides = deck("# I\n\n![alt](no_such_file.png)\n");
        assert_eq!(slides.len(), 1);
        let (_, bullets) = content(&slides[0]);
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_rule_skipped() {
        let slides = deck("# R\n\na\n\n---\n\nb\n");
        let (_, bullets) = content(&slides[0]);
        assert_eq!(bullets.len(), 2);
    }
}
