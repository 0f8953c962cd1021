//! Per-backend block support matrix.
//!
//! The three backends deliberately differ in fidelity. Instead of each
//! backend silently omitting what it cannot render, the policy lives
//! here: a block kind is rendered natively, degraded through a generic
//! path, or skipped.

use super::RenderTarget;
use crate::model::Block;

/// Block categories the matrix is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
    CodeFence,
    List,
    Image,
    Rule,
}

impl BlockKind {
    /// Category of a model block.
    pub fn of(block: &Block) -> Self {
        match block {
            Block::Heading { .. } => BlockKind::Heading,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::CodeFence { .. } => BlockKind::CodeFence,
            Block::List { .. } => BlockKind::List,
            Block::Image(_) => BlockKind::Image,
            Block::Rule => BlockKind::Rule,
        }
    }
}

/// How a backend treats a block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// Rendered with a dedicated layout primitive.
    Native,
    /// Flattened through the backend's generic paragraph/bullet path.
    Degrade,
    /// Absent from the output; a known fidelity gap, not an error.
    Skip,
}

/// Capability lookup for the render backends.
pub struct Capabilities;

impl Capabilities {
    /// Support level of `kind` in `target`.
    pub fn of(target: RenderTarget, kind: BlockKind) -> Support {
        use BlockKind::*;
        match (target, kind) {
            (RenderTarget::Pdf, _) => Support::Native,
            (_, List) => Support::Degrade,
            (_, Rule) => Support::Skip,
            _ => Support::Native,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_supports_everything() {
        for kind in [
            BlockKind::Heading,
            BlockKind::Paragraph,
            BlockKind::CodeFence,
            BlockKind::List,
            BlockKind::Image,
            BlockKind::Rule,
        ] {
            assert_eq!(Capabilities::of(RenderTarget::Pdf, kind), Support::Native);
        }
    }

    #[test]
    fn test_ooxml_backends_degrade_lists_and_skip_rules() {
        for target in [RenderTarget::Docx, RenderTarget::Pptx] {
            assert_eq!(Capabilities::of(target, BlockKind::List), Support::Degrade);
            assert_eq!(Capabilities::of(target, BlockKind::Rule), Support::Skip);
            assert_eq!(
                Capabilities::of(target, BlockKind::Heading),
                Support::Native
            );
        }
    }
}
