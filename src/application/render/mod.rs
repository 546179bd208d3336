//! Rich-text rendering.
//!
//! The renderer is pure: it takes decoded blocks and produces HTML plus a few
//! facts the page needs (whether code styles or the player script are
//! required, and the key moments to show in the gallery). Unknown blocks are
//! skipped and every piece of author text is escaped.

mod highlight;

use std::{fmt::Write as _, sync::Arc};

use askama::Template;
use tracing::warn;

pub use highlight::stylesheet;

use crate::{
    application::player::{DetachedMedia, VideoWidget},
    domain::{
        assets::AssetResolver,
        portable_text::{
            BlockStyle, CodeBlock, ImageBlock, KeyMomentBlock, PortableBlock, TextBlock,
            VideoBlock,
        },
        toc::heading_anchor,
    },
    presentation::views::{VideoPlayerTemplate, VideoPlayerView},
};

pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedContent {
    pub html: String,
    pub has_code: bool,
    pub has_video: bool,
    pub key_moments: Vec<KeyMomentBlock>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentRenderer {
    assets: AssetResolver,
}

impl ContentRenderer {
    pub fn new(assets: AssetResolver) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    pub fn render(&self, blocks: &[PortableBlock]) -> RenderedContent {
        let mut rendered = RenderedContent::default();
        let mut lists = ListStack::default();

        for (index, block) in blocks.iter().enumerate() {
            if let PortableBlock::Text(text) = block
                && let Some(kind) = text.list_item.as_deref()
            {
                lists.push_item(&mut rendered.html, ListKind::from_token(kind), text);
                continue;
            }
            lists.close_all(&mut rendered.html);

            match block {
                PortableBlock::Text(text) => render_text_block(&mut rendered.html, text, index),
                PortableBlock::Code(code) => {
                    rendered.has_code = true;
                    render_code_block(&mut rendered.html, code);
                }
                PortableBlock::Video(video) => {
                    if self.render_video_block(&mut rendered.html, video) {
                        rendered.has_video = true;
                    }
                }
                PortableBlock::Image(image) => self.render_image_block(&mut rendered.html, image),
                PortableBlock::KeyMoments(moment) => rendered.key_moments.push(moment.clone()),
                PortableBlock::Unknown => {}
            }
        }
        lists.close_all(&mut rendered.html);

        rendered
    }

    fn render_video_block(&self, out: &mut String, video: &VideoBlock) -> bool {
        let Some(src) = video.file.as_ref().and_then(|file| self.assets.file_url(file)) else {
            return false;
        };
        let poster = video
            .poster
            .as_ref()
            .and_then(|poster| self.assets.image_url(poster));
        let widget = VideoWidget::mount(
            src,
            poster,
            Arc::new(DetachedMedia),
            Arc::new(DetachedMedia),
        );
        let view = VideoPlayerView::from_widget(&video.key, &widget);
        widget.unmount();

        match (VideoPlayerTemplate { view }).render() {
            Ok(html) => {
                out.push_str(&html);
                true
            }
            Err(err) => {
                warn!(
                    target = "vgwritings::render",
                    block = %video.key,
                    error = %err,
                    "failed to render video player"
                );
                false
            }
        }
    }

    fn render_image_block(&self, out: &mut String, image: &ImageBlock) {
        let Some(src) = image
            .asset
            .as_ref()
            .and_then(|asset| self.assets.asset_url(asset))
        else {
            return;
        };
        let alt = image.alt.as_deref().unwrap_or_default();

        let _ = write!(
            out,
            "<figure class=\"content-image\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            escape_attribute(&src),
            escape_attribute(alt)
        );
        if let Some(attribution) = image
            .attribution
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            let _ = write!(
                out,
                "<figcaption class=\"content-image__attribution\">{}</figcaption>",
                ammonia::clean_text(attribution)
            );
        }
        out.push_str("</figure>");
    }
}

fn render_text_block(out: &mut String, block: &TextBlock, index: usize) {
    match block.block_style() {
        BlockStyle::Heading(level) => {
            let id = heading_anchor(block, index);
            let _ = write!(
                out,
                "<h{level} id=\"{}\" class=\"content-heading\">",
                escape_attribute(&id)
            );
            render_inline(out, block);
            let _ = write!(out, "</h{level}>");
        }
        BlockStyle::Blockquote => {
            out.push_str("<blockquote class=\"content-quote\">");
            render_inline(out, block);
            out.push_str("</blockquote>");
        }
        BlockStyle::Divider => out.push_str("<hr class=\"content-divider\">"),
        BlockStyle::Normal => {
            out.push_str("<p>");
            render_inline(out, block);
            out.push_str("</p>");
        }
    }
}

fn render_inline(out: &mut String, block: &TextBlock) {
    for span in &block.children {
        let mut closers: Vec<&'static str> = Vec::with_capacity(span.marks.len());
        for mark in &span.marks {
            match mark.as_str() {
                "strong" => {
                    out.push_str("<strong>");
                    closers.push("</strong>");
                }
                "em" => {
                    out.push_str("<em>");
                    closers.push("</em>");
                }
                "code" => {
                    out.push_str("<code class=\"inline-code\">");
                    closers.push("</code>");
                }
                "underline" => {
                    out.push_str("<u>");
                    closers.push("</u>");
                }
                "strike-through" => {
                    out.push_str("<s>");
                    closers.push("</s>");
                }
                key => {
                    let Some(def) = block.mark_def(key).filter(|def| def.kind == "link") else {
                        continue;
                    };
                    let href = link_href(def.href.as_deref());
                    let external = if href.starts_with("http") {
                        " target=\"_blank\" rel=\"noopener noreferrer\""
                    } else {
                        ""
                    };
                    let _ = write!(
                        out,
                        "<a href=\"{}\"{external} class=\"content-link\">",
                        escape_attribute(href)
                    );
                    closers.push("</a>");
                }
            }
        }
        out.push_str(&ammonia::clean_text(&span.text));
        for closer in closers.iter().rev() {
            out.push_str(closer);
        }
    }
}

/// Link target for an annotation; missing or script hrefs collapse to `#`.
fn link_href(href: Option<&str>) -> &str {
    let Some(href) = href.map(str::trim).filter(|href| !href.is_empty()) else {
        return "#";
    };
    let lowercase = href.to_ascii_lowercase();
    let allowed = lowercase.starts_with("http://")
        || lowercase.starts_with("https://")
        || lowercase.starts_with("mailto:")
        || href.starts_with('/')
        || href.starts_with('#');
    if allowed { href } else { "#" }
}

fn render_code_block(out: &mut String, block: &CodeBlock) {
    let language = block
        .language
        .as_deref()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(DEFAULT_CODE_LANGUAGE);

    out.push_str("<figure class=\"code-block\" data-code-block>");
    out.push_str("<figcaption class=\"code-block__header\">");
    if let Some(filename) = block
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        let _ = write!(
            out,
            "<span class=\"code-block__filename\">{}</span>",
            ammonia::clean_text(filename)
        );
    }
    let _ = write!(
        out,
        "<span class=\"code-block__language\">{}</span><button type=\"button\" class=\"code-block__copy\" data-copy-code aria-label=\"Copy code\">Copy</button></figcaption>",
        ammonia::clean_text(language)
    );

    match highlight::highlight_code(language, &block.code) {
        Ok(html) => out.push_str(&html),
        Err(err) => {
            warn!(
                target = "vgwritings::render",
                block = %block.key,
                error = %err,
                "falling back to unhighlighted code"
            );
            let _ = write!(
                out,
                "<pre class=\"syntax-highlight\"><code>{}</code></pre>",
                ammonia::clean_text(&block.code)
            );
        }
    }
    out.push_str("</figure>");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
    Square,
    Circle,
    Alpha,
    Roman,
}

impl ListKind {
    fn from_token(token: &str) -> Self {
        match token {
            "number" => ListKind::Number,
            "square" => ListKind::Square,
            "circle" => ListKind::Circle,
            "alpha" | "lower-alpha" => ListKind::Alpha,
            "roman" | "lower-roman" => ListKind::Roman,
            _ => ListKind::Bullet,
        }
    }

    fn open_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "<ul class=\"content-list content-list--bullet\">",
            ListKind::Square => "<ul class=\"content-list content-list--square\">",
            ListKind::Circle => "<ul class=\"content-list content-list--circle\">",
            ListKind::Number => "<ol class=\"content-list content-list--number\">",
            ListKind::Alpha => "<ol type=\"a\" class=\"content-list content-list--alpha\">",
            ListKind::Roman => "<ol type=\"i\" class=\"content-list content-list--roman\">",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            ListKind::Bullet | ListKind::Square | ListKind::Circle => "</ul>",
            ListKind::Number | ListKind::Alpha | ListKind::Roman => "</ol>",
        }
    }

    fn item_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "<li class=\"content-list__item content-list__item--check\">",
            _ => "<li class=\"content-list__item\">",
        }
    }
}

/// Open lists, innermost last, each with whether its current item is open.
#[derive(Default)]
struct ListStack {
    open: Vec<(ListKind, bool)>,
}

impl ListStack {
    fn push_item(&mut self, out: &mut String, kind: ListKind, block: &TextBlock) {
        let depth = usize::from(block.level.unwrap_or(1).max(1));

        while self.open.len() > depth {
            self.close_innermost(out);
        }
        if self.open.len() == depth
            && let Some((current, _)) = self.open.last()
            && *current != kind
        {
            self.close_innermost(out);
        }
        while self.open.len() < depth {
            if let Some((parent, item_open)) = self.open.last_mut()
                && !*item_open
            {
                out.push_str(parent.item_tag());
                *item_open = true;
            }
            out.push_str(kind.open_tag());
            self.open.push((kind, false));
        }

        if let Some((current, item_open)) = self.open.last_mut() {
            if *item_open {
                out.push_str("</li>");
            }
            out.push_str(current.item_tag());
            *item_open = true;
        }
        render_inline(out, block);
    }

    fn close_innermost(&mut self, out: &mut String) {
        if let Some((kind, item_open)) = self.open.pop() {
            if item_open {
                out.push_str("</li>");
            }
            out.push_str(kind.close_tag());
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.open.is_empty() {
            self.close_innermost(out);
        }
    }
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}
