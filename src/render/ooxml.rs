//! Shared OOXML plumbing for the DOCX and PPTX backends.
//!
//! Both formats are ZIP packages of XML parts tied together with
//! relationship files. The helpers here cover part serialization
//! (quick-xml), relationship bookkeeping, content types, and EMU
//! conversions; the backends supply the format-specific markup.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// English Metric Units per inch, the OOXML length unit.
pub const EMU_PER_INCH: i64 = 914_400;

/// Convert inches to EMU.
pub fn emu_from_inches(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

pub const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_TYPE_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_TYPE_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

/// One XML part under construction.
pub struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    /// Start a part with the standard XML declaration.
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;
        Ok(Self { writer })
    }

    /// Open an element with attributes.
    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    /// Close an element.
    pub fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// Write escaped character data.
    pub fn text(&mut self, content: &str) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new(content)))?;
        Ok(())
    }

    /// Write `<name attrs>content</name>`.
    pub fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        content: &str,
    ) -> Result<()> {
        self.open(name, attrs)?;
        self.text(content)?;
        self.close(name)
    }

    /// Finish the part and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Relationship part builder. Ids are assigned sequentially as `rId1`...
#[derive(Default)]
pub struct Relationships {
    entries: Vec<(String, String, String)>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relationship and return its id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries
            .push((id.clone(), rel_type.to_string(), target.to_string()));
        id
    }

    /// Serialize as a `.rels` part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut part = XmlPart::new()?;
        part.open("Relationships", &[("xmlns", REL_NS)])?;
        for (id, rel_type, target) in &self.entries {
            part.empty(
                "Relationship",
                &[
                    ("Id", id.as_str()),
                    ("Type", rel_type.as_str()),
                    ("Target", target.as_str()),
                ],
            )?;
        }
        part.close("Relationships")?;
        Ok(part.into_bytes())
    }
}

/// Build a `[Content_Types].xml` part from extension defaults and
/// part-name overrides.
pub fn content_types(
    defaults: &[(&str, &str)],
    overrides: &[(&str, &str)],
) -> Result<Vec<u8>> {
    let mut part = XmlPart::new()?;
    part.open(
        "Types",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/package/2006/content-types",
        )],
    )?;
    for (extension, content_type) in defaults {
        part.empty(
            "Default",
            &[("Extension", *extension), ("ContentType", *content_type)],
        )?;
    }
    for (part_name, content_type) in overrides {
        part.empty(
            "Override",
            &[("PartName", *part_name), ("ContentType", *content_type)],
        )?;
    }
    part.close("Types")?;
    Ok(part.into_bytes())
}

/// ZIP package writer for one output document.
pub struct Package {
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
}

impl Package {
    /// Create the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            zip: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        })
    }

    /// Add one part to the package.
    pub fn part(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    /// Finalize the archive.
    pub fn finish(mut self) -> Result<()> {
        self.zip.finish()?;
        Ok(())
    }
}

/// Media file extension and content type from an image path.
/// Unknown extensions are stored as PNG; callers have already verified
/// the file decodes.
pub fn media_extension(path: &Path) -> (&'static str, &'static str) {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => ("jpeg", "image/jpeg"),
        Some("gif") => ("gif", "image/gif"),
        Some("bmp") => ("bmp", "image/bmp"),
        _ => ("png", "image/png"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_conversion() {
        assert_eq!(emu_from_inches(1.0), 914_400);
        assert_eq!(emu_from_inches(6.0), 5_486_400);
    }

    #[test]
    fn test_relationship_ids_sequential() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(REL_TYPE_IMAGE, "media/image1.png"), "rId1");
        assert_eq!(rels.add(REL_TYPE_IMAGE, "media/image2.png"), "rId2");
        let xml = String::from_utf8(rels.to_xml().unwrap()).unwrap();
        assert!(xml.contains("rId2"));
        assert!(xml.contains("media/image1.png"));
    }

    #[test]
    fn test_xml_part_escapes_text() {
        let mut part = XmlPart::new().unwrap();
        part.open("t", &[]).unwrap();
        part.text("a < b & c").unwrap();
        part.close("t").unwrap();
        let xml = String::from_utf8(part.into_bytes()).unwrap();
        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_media_extension() {
        assert_eq!(media_extension(Path::new("x.JPG")).0, "jpeg");
        assert_eq!(media_extension(Path::new("x.png")).1, "image/png");
        assert_eq!(media_extension(Path::new("x.webp")).0, "png");
    }
}
