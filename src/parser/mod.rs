//! Markdown parsing into the document tree.

mod markdown;

pub use markdown::parse_markdown;
