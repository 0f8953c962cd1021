//! Document tree produced by the Markdown parser.
//!
//! The parser builds a genuine nested tree instead of a flat token
//! sequence: list items own their block content, so renderers perform a
//! single recursive walk and never re-derive open/close pairing.

/// A parsed Markdown document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.blocks, &mut out);
        out.trim_end().to_string()
    }
}

fn collect_text(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { text, .. } | Block::Paragraph { text, .. } => {
                if !text.is_empty() {
                    out.push_str(text);
                    out.push('\n');
                }
            }
            Block::CodeFence { code, .. } => {
                out.push_str(code);
                if !code.ends_with('\n') {
                    out.push('\n');
                }
            }
            Block::List { items, .. } => {
                for item in items {
                    collect_text(&item.blocks, out);
                }
            }
            Block::Image(_) | Block::Rule => {}
        }
    }
}

/// One structural unit of parsed Markdown.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading with level 1..=6 and its inline text.
    Heading { level: u8, text: String },

    /// Paragraph text plus any images embedded in its inline span.
    Paragraph { text: String, images: Vec<ImageRef> },

    /// Fenced or indented code block. `language` is the first word of the
    /// fence info string, if any.
    CodeFence {
        language: Option<String>,
        code: String,
    },

    /// Ordered or bullet list with nested item content.
    List { kind: ListKind, items: Vec<ListItem> },

    /// An image that stood alone in its paragraph.
    Image(ImageRef),

    /// Thematic break (`---`). The PDF backend treats it as a page break.
    Rule,
}

impl Block {
    /// Paragraph constructor for plain text without images.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            text: text.into(),
            images: Vec::new(),
        }
    }

    /// Heading constructor; the level is clamped to 1..=6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }
}

/// List flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Unordered (`-` / `*`) list.
    Bullet,
    /// Ordered (`1.`) list.
    Ordered,
}

/// One list item, owning its block content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

impl ListItem {
    /// First piece of paragraph or heading text inside the item, if any.
    pub fn first_text(&self) -> Option<&str> {
        for block in &self.blocks {
            match block {
                Block::Paragraph { text, .. } | Block::Heading { text, .. } => {
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Reference to an image in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRef {
    /// Alternative text, possibly empty.
    pub alt: String,
    /// Source path or URL as written in the Markdown.
    pub src: String,
}

impl ImageRef {
    pub fn new(alt: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            alt: alt.into(),
            src: src.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_walks_lists() {
        let doc = Document {
            blocks: vec![
                Block::heading(1, "Title"),
                Block::List {
                    kind: ListKind::Bullet,
                    items: vec![ListItem {
                        blocks: vec![Block::paragraph("item one")],
                    }],
                },
            ],
        };
        let text = doc.plain_text();
        assert!(text.contains("Title"));
        assert!(text.contains("item one"));
    }

    #[test]
    fn test_heading_level_clamped() {
        match Block::heading(9, "deep") {
            Block::Heading { level, .. } => assert_eq!(level, 6),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_first_text_skips_leading_fence() {
        let item = ListItem {
            blocks: vec![
                Block::CodeFence {
                    language: None,
                    code: "x".into(),
                },
                Block::paragraph("visible"),
            ],
        };
        assert_eq!(item.first_text(), Some("visible"));
    }
}
