//! Table-of-contents extraction from rich-text content.

use serde::Serialize;

use crate::domain::{
    portable_text::{BlockStyle, PortableBlock, TextBlock},
    slug::anchor_for,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    /// In-page anchor of the heading, see [`heading_anchor`].
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Anchor id for the heading at `index` in its content.
///
/// The block key is used when present; keyless headings fall back to an id
/// derived from their text and position, so the renderer and the TOC agree.
pub fn heading_anchor(block: &TextBlock, index: usize) -> String {
    if block.key.is_empty() {
        anchor_for(&block.plain_text(), "heading", index)
    } else {
        block.key.clone()
    }
}

/// Collect `h1`..`h6` text blocks in document order.
///
/// Blocks of any other kind or style are skipped.
pub fn extract_toc(blocks: &[PortableBlock]) -> Vec<TocItem> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| match block {
            PortableBlock::Text(text) => match text.block_style() {
                BlockStyle::Heading(level) => Some(TocItem {
                    id: heading_anchor(text, index),
                    text: text.plain_text(),
                    level,
                }),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blocks(value: serde_json::Value) -> Vec<PortableBlock> {
        serde_json::from_value(value).expect("blocks decode")
    }

    #[test]
    fn extracts_headings_in_order() {
        let content = blocks(json!([
            {"_type": "block", "_key": "a", "style": "h2", "children": [{"text": "Intro"}]},
            {"_type": "block", "_key": "b", "style": "normal", "children": [{"text": "text"}]},
            {"_type": "block", "_key": "c", "style": "h3", "children": [{"text": "Deep"}, {"text": "Dive"}]}
        ]));

        assert_eq!(
            extract_toc(&content),
            vec![
                TocItem {
                    id: "a".into(),
                    text: "Intro".into(),
                    level: 2
                },
                TocItem {
                    id: "c".into(),
                    text: "Deep Dive".into(),
                    level: 3
                },
            ]
        );
    }

    #[test]
    fn ignores_non_heading_blocks() {
        let content = blocks(json!([
            {"_type": "code", "_key": "x", "code": "let a = 1;"},
            {"_type": "block", "_key": "q", "style": "blockquote", "children": [{"text": "Quote"}]}
        ]));

        assert!(extract_toc(&content).is_empty());
    }

    #[test]
    fn keeps_headings_without_keys() {
        let content = blocks(json!([
            {"_type": "block", "style": "h1", "children": [{"text": "A"}]},
            {"_type": "block", "style": "normal", "children": [{"text": "B"}]},
            {"_type": "block", "style": "h2", "children": [{"text": "C"}]}
        ]));

        let toc = extract_toc(&content);
        let outline: Vec<(&str, u8)> = toc
            .iter()
            .map(|item| (item.text.as_str(), item.level))
            .collect();
        assert_eq!(outline, vec![("A", 1), ("C", 2)]);
        assert_eq!(toc[0].id, "heading-0-a");
        assert_eq!(toc[1].id, "heading-2-c");
    }

    #[test]
    fn empty_content_yields_empty_toc() {
        assert!(extract_toc(&[]).is_empty());
    }
}
