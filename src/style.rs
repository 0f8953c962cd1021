//! Style configuration threaded through every render backend.

use std::path::PathBuf;

/// Page size for the PDF backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// 210 x 297 mm.
    #[default]
    A4,
    /// 215.9 x 279.4 mm.
    Letter,
}

impl PageSize {
    /// Page dimensions in millimeters (width, height).
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

/// Typography and page options for one export invocation.
///
/// Created once from CLI or dialog input and read-only thereafter.
/// `line_height` and `page` only affect the PDF backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Logical font family name.
    pub font_family: String,

    /// Base font size in points.
    pub font_size_pt: u32,

    /// Line height multiplier (PDF only).
    pub line_height: f32,

    /// Page size (PDF only).
    pub page: PageSize,

    /// Optional TTF file to embed in the PDF.
    pub ttf_path: Option<PathBuf>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "DejaVu Sans".to_string(),
            font_size_pt: 12,
            line_height: 1.4,
            page: PageSize::A4,
            ttf_path: None,
        }
    }
}

impl StyleConfig {
    /// Create a style configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the base font size in points.
    pub fn with_font_size(mut self, size_pt: u32) -> Self {
        self.font_size_pt = size_pt.max(1);
        self
    }

    /// Set the line height multiplier.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Set the PDF page size.
    pub fn with_page_size(mut self, page: PageSize) -> Self {
        self.page = page;
        self
    }

    /// Set the path to a TTF font to embed in the PDF.
    pub fn with_ttf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ttf_path = Some(path.into());
        self
    }

    /// Heading font size in points for levels 1..=6.
    ///
    /// Size bumps are +8/+4/+2/+1/+0/+0 over the base size, so the size
    /// is monotonically non-increasing with depth.
    pub fn heading_size_pt(&self, level: u8) -> u32 {
        let bump = match level {
            1 => 8,
            2 => 4,
            3 => 2,
            4 => 1,
            _ => 0,
        };
        self.font_size_pt + bump
    }

    /// Monospace font size for code blocks in DOCX output.
    pub fn code_size_docx_pt(&self) -> u32 {
        ((self.font_size_pt as f32 * 0.85) as u32).max(9)
    }

    /// Monospace font size for code blocks in PDF output.
    pub fn code_size_pdf_pt(&self) -> u32 {
        ((self.font_size_pt as f32 * 0.9) as u32).max(9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let style = StyleConfig::new()
            .with_font_family("Arial")
            .with_font_size(14)
            .with_page_size(PageSize::Letter);
        assert_eq!(style.font_family, "Arial");
        assert_eq!(style.font_size_pt, 14);
        assert_eq!(style.page, PageSize::Letter);
    }

    #[test]
    fn test_heading_sizes_monotonic() {
        let style = StyleConfig::default();
        let sizes: Vec<u32> = (1..=6).map(|l| style.heading_size_pt(l)).collect();
        for pair in sizes.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert!(style.heading_size_pt(1) > style.heading_size_pt(6));
    }

    #[test]
    fn test_code_size_floor() {
        let style = StyleConfig::new().with_font_size(8);
        assert_eq!(style.code_size_docx_pt(), 9);
        let style = StyleConfig::new().with_font_size(12);
        assert_eq!(style.code_size_docx_pt(), 10);
    }

    #[test]
    fn test_page_dimensions() {
        assert_eq!(PageSize::A4.dimensions_mm(), (210.0, 297.0));
        assert_eq!(PageSize::Letter.dimensions_mm(), (215.9, 279.4));
    }
}
