//! End-to-end export tests: write Markdown, export, and inspect the
//! produced document packages.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use mdexport::{
    parse_markdown, render_document, Exporter, MermaidRenderer, RenderTarget, StyleConfig,
};

/// Read one part out of an OOXML package.
fn read_part(package: &Path, name: &str) -> String {
    let file = File::open(package).expect("package exists");
    let mut archive = zip::ZipArchive::new(file).expect("valid zip");
    let mut part = archive.by_name(name).expect("part present");
    let mut content = String::new();
    part.read_to_string(&mut content).expect("utf-8 part");
    content
}

fn has_part(package: &Path, name: &str) -> bool {
    let file = File::open(package).expect("package exists");
    let mut archive = zip::ZipArchive::new(file).expect("valid zip");
    let present = archive.by_name(name).is_ok();
    present
}

/// Export a Markdown string with the Mermaid pipeline disabled.
fn export_disabled_mermaid(markdown: &str, target: RenderTarget, out: &Path) {
    let dir = tempfile::tempdir().unwrap();
    let mermaid = MermaidRenderer::disabled(dir.path());
    let doc = parse_markdown(markdown);
    render_document(
        &doc,
        target,
        &StyleConfig::default(),
        dir.path(),
        &mermaid,
        out,
    )
    .expect("export succeeds");
}

#[test]
fn test_docx_paragraph_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "Hello world\n").unwrap();

    let out = Exporter::new(RenderTarget::Docx).export_file(&input).unwrap();
    assert_eq!(out.extension().unwrap(), "docx");

    let body = read_part(&out, "word/document.xml");
    assert!(body.contains("<w:document"));
    assert!(body.contains(">Hello world<"));
    // Exactly one paragraph comes back out.
    assert_eq!(body.matches("<w:p>").count(), 1);
    assert!(has_part(&out, "word/styles.xml"));
    assert!(has_part(&out, "[Content_Types].xml"));
}

#[test]
fn test_docx_heading_is_bold_and_bumped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "# Title\n").unwrap();

    let out = Exporter::new(RenderTarget::Docx).export_file(&input).unwrap();
    let body = read_part(&out, "word/document.xml");
    assert!(body.contains(">Title<"));
    assert!(body.contains("<w:b/>"));
    // (12 + 8) pt in half-points.
    assert!(body.contains("w:val=\"40\""));
}

#[test]
fn test_docx_code_fence_uses_consolas() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "```python\nprint('hi')\n```\n").unwrap();

    let out = Exporter::new(RenderTarget::Docx).export_file(&input).unwrap();
    let body = read_part(&out, "word/document.xml");
    assert!(body.contains("Consolas"));
    // max(9, 12 * 0.85) = 10 pt in half-points.
    assert!(body.contains("w:val=\"20\""));
}

#[test]
fn test_docx_embeds_image() {
    let dir = tempfile::tempdir().unwrap();
    image::RgbImage::new(4, 4)
        .save(dir.path().join("img.png"))
        .unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "![pic](img.png)\n").unwrap();

    let out = Exporter::new(RenderTarget::Docx).export_file(&input).unwrap();
    let body = read_part(&out, "word/document.xml");
    assert!(body.contains("<w:drawing>"));
    assert!(has_part(&out, "word/media/image1.png"));
}

#[test]
fn test_docx_missing_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "before\n\n![gone](nope.png)\n\nafter\n").unwrap();

    let out = Exporter::new(RenderTarget::Docx).export_file(&input).unwrap();
    let body = read_part(&out, "word/document.xml");
    assert!(!body.contains("<w:drawing>"));
    assert!(body.contains(">before<"));
    assert!(body.contains(">after<"));
}

#[test]
fn test_pptx_heading_and_bullet() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.md");
    std::fs::write(&input, "# Title\n\nHello world\n").unwrap();

    let out = Exporter::new(RenderTarget::Pptx).export_file(&input).unwrap();
    let slide = read_part(&out, "ppt/slides/slide1.xml");
    assert!(slide.contains(">Title<"));
    assert!(slide.contains(">Hello world<"));
    assert!(!has_part(&out, "ppt/slides/slide2.xml"));

    let presentation = read_part(&out, "ppt/presentation.xml");
    assert!(presentation.contains("<p:sldIdLst>"));
    assert!(has_part(&out, "ppt/slideMasters/slideMaster1.xml"));
    assert!(has_part(&out, "ppt/theme/theme1.xml"));
}

#[test]
fn test_pptx_image_gets_own_slide() {
    let dir = tempfile::tempdir().unwrap();
    image::RgbImage::new(8, 4)
        .save(dir.path().join("img.png"))
        .unwrap();
    let input = dir.path().join("deck.md");
    std::fs::write(&input, "# Pics\n\n![figure](img.png)\n").unwrap();

    let out = Exporter::new(RenderTarget::Pptx).export_file(&input).unwrap();
    let slide = read_part(&out, "ppt/slides/slide2.xml");
    assert!(slide.contains("<p:pic>"));
    assert!(slide.contains(">figure<"));
    assert!(has_part(&out, "ppt/media/image2.png"));
}

#[test]
fn test_pdf_horizontal_rule_breaks_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "page one\n\n---\n\npage two\n").unwrap();

    let out = Exporter::new(RenderTarget::Pdf).export_file(&input).unwrap();
    let pdf = lopdf::Document::load(&out).expect("valid pdf");
    assert_eq!(pdf.get_pages().len(), 2);
}

#[test]
fn test_pdf_single_page_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "# Heading\n\nsome text\n\n- a\n- b\n").unwrap();

    let out = Exporter::new(RenderTarget::Pdf).export_file(&input).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let pdf = lopdf::Document::load(&out).expect("valid pdf");
    assert_eq!(pdf.get_pages().len(), 1);
}

#[test]
fn test_pdf_missing_image_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "before\n\n![gone](nope.png)\n\nafter\n").unwrap();

    let out = Exporter::new(RenderTarget::Pdf).export_file(&input).unwrap();
    // The rest of the document still renders.
    let pdf = lopdf::Document::load(&out).expect("valid pdf");
    assert_eq!(pdf.get_pages().len(), 1);
}

#[test]
fn test_mermaid_fallback_docx() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.docx");
    export_disabled_mermaid(
        "```mermaid\ngraph TD; A-->B;\n```\n",
        RenderTarget::Docx,
        &out,
    );
    // Without the diagram tool the source is kept as a code block.
    let body = read_part(&out, "word/document.xml");
    assert!(body.contains("graph TD"));
    assert!(!body.contains("<w:drawing>"));
}

#[test]
fn test_mermaid_fallback_pptx() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pptx");
    export_disabled_mermaid(
        "# Diagrams\n\n```mermaid\ngraph TD; A-->B;\n```\n",
        RenderTarget::Pptx,
        &out,
    );
    let slide = read_part(&out, "ppt/slides/slide1.xml");
    assert!(slide.contains("[Mermaid no disponible]"));
    // The diagram source stays in the deck as text.
    assert!(slide.contains("graph TD"));
    assert!(!slide.contains("<p:pic>"));
}

#[test]
fn test_mermaid_fallback_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");
    export_disabled_mermaid(
        "```mermaid\ngraph TD; A-->B;\n```\n",
        RenderTarget::Pdf,
        &out,
    );
    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_explicit_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.md");
    let output = dir.path().join("renamed.docx");
    std::fs::write(&input, "text\n").unwrap();

    Exporter::new(RenderTarget::Docx)
        .export_file_to(&input, &output)
        .unwrap();
    assert!(output.is_file());
}
