//! Markdown event stream to document tree conversion.
//!
//! pulldown-cmark emits a flat, balanced event stream. The builder keeps
//! a container stack (lists and list items) plus an inline accumulator,
//! so the resulting [`Document`] is a real tree: list items own their
//! block content and no renderer has to re-match open/close events.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::model::{Block, Document, ImageRef, ListItem, ListKind};

/// Parse Markdown text into a document tree. Never fails.
pub fn parse_markdown(text: &str) -> Document {
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(text, Options::empty()) {
        builder.handle(event);
    }
    builder.finish()
}

enum Container {
    List {
        kind: ListKind,
        items: Vec<ListItem>,
    },
    Item {
        blocks: Vec<Block>,
    },
}

#[derive(Default)]
struct InlineAcc {
    text: String,
    images: Vec<ImageRef>,
    /// Image span currently being collected; inline text becomes alt text.
    current_image: Option<ImageRef>,
}

impl InlineAcc {
    fn push_text(&mut self, s: &str) {
        match &mut self.current_image {
            Some(img) => img.alt.push_str(s),
            None => self.text.push_str(s),
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    blocks: Vec<Block>,
    stack: Vec<Container>,
    inline: Option<InlineAcc>,
    code: Option<(Option<String>, String)>,
}

impl TreeBuilder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => {
                if let Some((_, code)) = &mut self.code {
                    code.push_str(&t);
                } else {
                    self.inline_mut().push_text(&t);
                }
            }
            // Inline code spans flow through as plain text.
            Event::Code(t) => self.inline_mut().push_text(&t),
            Event::SoftBreak => self.inline_mut().push_text(" "),
            Event::HardBreak => self.inline_mut().push_text("\n"),
            Event::Rule => {
                self.flush_inline();
                self.push_block(Block::Rule);
            }
            // Raw HTML, footnotes, task markers: not part of the model.
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } | Tag::Paragraph => {
                self.flush_inline();
                self.inline = Some(InlineAcc::default());
            }
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                self.flush_inline();
                let kind = if start.is_some() {
                    ListKind::Ordered
                } else {
                    ListKind::Bullet
                };
                self.stack.push(Container::List {
                    kind,
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.flush_inline();
                self.stack.push(Container::Item { blocks: Vec::new() });
            }
            Tag::Image { dest_url, .. } => {
                self.inline_mut().current_image =
                    Some(ImageRef::new("", dest_url.to_string()));
            }
            // Emphasis, links, block quotes and the rest are transparent:
            // their text content flows into the surrounding accumulator.
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(level) => {
                if let Some(acc) = self.inline.take() {
                    // Images inside headings are dropped.
                    let block = Block::heading(level as u8, acc.text.trim());
                    self.push_block(block);
                }
            }
            TagEnd::Paragraph => self.flush_inline(),
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.push_block(Block::CodeFence { language, code });
                }
            }
            TagEnd::Item => {
                self.flush_inline();
                if let Some(Container::Item { blocks }) = self.stack.pop() {
                    match self.stack.last_mut() {
                        Some(Container::List { items, .. }) => {
                            items.push(ListItem { blocks })
                        }
                        // Item without an enclosing list cannot be
                        // produced by the parser; recover anyway.
                        _ => self.blocks.extend(blocks),
                    }
                }
            }
            TagEnd::List(_) => {
                self.flush_inline();
                if let Some(Container::List { kind, items }) = self.stack.pop() {
                    self.push_block(Block::List { kind, items });
                }
            }
            TagEnd::Image => {
                if let Some(acc) = &mut self.inline {
                    if let Some(img) = acc.current_image.take() {
                        acc.images.push(img);
                    }
                }
            }
            _ => {}
        }
    }

    /// Accumulator for inline content, opened implicitly when text
    /// arrives outside an explicit paragraph (tight list items).
    fn inline_mut(&mut self) -> &mut InlineAcc {
        self.inline.get_or_insert_with(InlineAcc::default)
    }

    fn flush_inline(&mut self) {
        if let Some(acc) = self.inline.take() {
            let text = acc.text.trim().to_string();
            if text.is_empty() {
                // A paragraph that held only images is normalised to
                // standalone image blocks.
                for img in acc.images {
                    self.push_block(Block::Image(img));
                }
            } else {
                self.push_block(Block::Paragraph {
                    text,
                    images: acc.images,
                });
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Container::Item { blocks }) => blocks.push(block),
            _ => self.blocks.push(block),
        }
    }

    fn finish(mut self) -> Document {
        self.flush_inline();
        // The event stream is balanced, but close anything left open so a
        // truncated stream still yields every block.
        while let Some(container) = self.stack.pop() {
            match container {
                Container::Item { blocks } => match self.stack.last_mut() {
                    Some(Container::List { items, .. }) => {
                        items.push(ListItem { blocks })
                    }
                    _ => self.blocks.extend(blocks),
                },
                Container::List { kind, items } => {
                    self.blocks.push(Block::List { kind, items })
                }
            }
        }
        Document {
            blocks: self.blocks,
        }
    }
}
