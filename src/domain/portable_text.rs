//! Rich-text content as stored by the content store.
//!
//! Each node carries a `_type` discriminator; the set of kinds this site
//! understands is closed and anything else lands in [`PortableBlock::Unknown`].
//! Arrays are decoded leniently: entries that fail to decode are dropped
//! instead of failing the whole document.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::domain::assets::{AssetRef, FileRef, ImageRef};
use crate::domain::entities::null_as_default;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "_type")]
pub enum PortableBlock {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "code")]
    Code(CodeBlock),
    #[serde(rename = "video")]
    Video(VideoBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "keyMoments")]
    KeyMoments(KeyMomentBlock),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub mark_defs: Vec<MarkDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MarkDef {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(rename = "_type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CodeBlock {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VideoBlock {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default)]
    pub file: Option<FileRef>,
    #[serde(default)]
    pub poster: Option<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageBlock {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KeyMomentBlock {
    #[serde(rename = "_key", default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// Named style of a text block (`normal`, `h1`..`h6`, `blockquote`, `hr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Normal,
    Heading(u8),
    Blockquote,
    Divider,
}

impl TextBlock {
    pub fn block_style(&self) -> BlockStyle {
        match self.style.as_deref() {
            Some("blockquote") => BlockStyle::Blockquote,
            Some("hr") => BlockStyle::Divider,
            Some(style) => match heading_level(style) {
                Some(level) => BlockStyle::Heading(level),
                None => BlockStyle::Normal,
            },
            None => BlockStyle::Normal,
        }
    }

    /// Concatenated child text, spans joined by a single space.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .map(|span| span.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

/// Heading level for the `h1`..`h6` styles; any other style is not a heading.
pub fn heading_level(style: &str) -> Option<u8> {
    let suffix = style.strip_prefix('h')?;
    match suffix.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}

/// Decode an array of nodes, silently dropping entries that do not decode.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_block_kinds() {
        let blocks: Vec<PortableBlock> = serde_json::from_value(json!([
            {"_type": "block", "_key": "a", "style": "h2", "children": [{"_type": "span", "text": "Intro"}]},
            {"_type": "code", "_key": "b", "code": "fn main() {}", "language": "rust"},
            {"_type": "video", "_key": "c", "file": {"asset": {"url": "https://cdn/v.mp4"}}},
            {"_type": "keyMoments", "_key": "d", "title": "Dawn", "description": null},
            {"_type": "mystery", "_key": "e"}
        ]))
        .expect("blocks decode");

        assert!(matches!(&blocks[0], PortableBlock::Text(block) if block.block_style() == BlockStyle::Heading(2)));
        assert!(matches!(&blocks[1], PortableBlock::Code(code) if code.language.as_deref() == Some("rust")));
        assert!(matches!(&blocks[2], PortableBlock::Video(_)));
        assert!(matches!(&blocks[3], PortableBlock::KeyMoments(moment) if moment.description.is_empty()));
        assert_eq!(blocks[4], PortableBlock::Unknown);
    }

    #[test]
    fn heading_level_parses_suffix() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h"), None);
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("normal"), None);
    }

    #[test]
    fn malformed_children_are_skipped() {
        let block: TextBlock = serde_json::from_value(json!({
            "_key": "k",
            "children": [{"text": "kept"}, 42, {"text": "also"}],
            "markDefs": null
        }))
        .expect("block decodes");

        assert_eq!(block.plain_text(), "kept also");
        assert!(block.mark_defs.is_empty());
    }
}
