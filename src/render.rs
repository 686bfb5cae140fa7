//! Content block rendering.
//!
//! [`BlockRenderer::render`] maps a document's blocks to markup in order,
//! one fragment per block. Rich text goes through [`crate::rich_text`], code
//! through [`crate::highlight`]; nothing from a record reaches the output
//! unescaped.
//!
//! Media with an empty URL renders a placeholder right away. Media whose URL
//! fails to load in the browser is swapped for the same placeholder by the
//! shell script, which finds it through the `data-media` attribute.

use crate::config::CodeConfig;
use crate::content::{ContentBlock, HeadingLevel, MediaKind};
use crate::highlight::{HighlightError, HighlightedCode, Highlighter};
use crate::rich_text::RichText;
use maud::{Markup, PreEscaped, html};
use regex::Regex;
use std::sync::LazyLock;

pub const MEDIA_UNAVAILABLE: &str = "Media unavailable";
pub const VIDEO_UNSUPPORTED: &str = "Your browser does not support the video tag.";

static CSS_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,5}(\.\d{1,3})?)(px|%|em|rem|vw|ch)$").expect("length pattern compiles")
});

/// `hint` if it is a plain CSS length such as `60%` or `480px`.
pub fn valid_width(hint: &str) -> Option<&str> {
    let hint = hint.trim();
    if CSS_LENGTH.is_match(hint) {
        Some(hint)
    } else {
        log::debug!("ignoring width hint '{hint}'");
        None
    }
}

pub struct BlockRenderer {
    highlighter: Highlighter,
}

impl BlockRenderer {
    pub fn new(config: &CodeConfig) -> Result<Self, HighlightError> {
        Ok(Self {
            highlighter: Highlighter::new(&config.theme, &config.default_language)?,
        })
    }

    /// Render `blocks` in order inside the document body container.
    ///
    /// The container is where in-document anchor clicks are intercepted.
    pub fn render(&self, blocks: &[ContentBlock]) -> Markup {
        html! {
            div.blocks data-anchor-scope {
                @for block in blocks {
                    (self.render_block(block))
                }
            }
        }
    }

    pub fn render_block(&self, block: &ContentBlock) -> Markup {
        match block {
            ContentBlock::Heading { level, id, text } => render_heading(*level, id.as_deref(), text),
            ContentBlock::Paragraph { text } => html! { p.paragraph { (text) } },
            ContentBlock::Quote { text, author } => html! {
                blockquote.quote {
                    p { (text) }
                    @if let Some(author) = author {
                        footer.quote-author { "— " (author) }
                    }
                }
            },
            ContentBlock::Media {
                kind,
                url,
                caption,
                width_hint,
            } => render_media(*kind, url, caption.as_deref(), width_hint.as_deref()),
            ContentBlock::Code { source, language } => {
                render_code(&self.highlighter.highlight(source, language))
            }
        }
    }
}

fn render_heading(level: HeadingLevel, id: Option<&str>, text: &RichText) -> Markup {
    match level {
        HeadingLevel::H2 => html! { h2.heading id=[id] { (text) } },
        HeadingLevel::H3 => html! { h3.heading id=[id] { (text) } },
        HeadingLevel::H4 => html! { h4.heading id=[id] { (text) } },
    }
}

pub fn media_placeholder() -> Markup {
    html! {
        div.media-placeholder role="img" aria-label=(MEDIA_UNAVAILABLE) {
            span { (MEDIA_UNAVAILABLE) }
        }
    }
}

fn render_media(
    kind: MediaKind,
    url: &str,
    caption: Option<&str>,
    width_hint: Option<&str>,
) -> Markup {
    let style = width_hint
        .and_then(valid_width)
        .map(|w| format!("width: {w}; margin: 0 auto"));
    let kind_class = match kind {
        MediaKind::Image => "media-image",
        MediaKind::Gif => "media-gif",
        MediaKind::Video => "media-video",
    };
    html! {
        figure class={ "media " (kind_class) } style=[style] {
            @if url.is_empty() {
                (media_placeholder())
            } @else {
                @match kind {
                    MediaKind::Image | MediaKind::Gif => {
                        img src=(url) alt=(caption.unwrap_or("Blog image")) loading="lazy" data-media;
                    }
                    MediaKind::Video => {
                        video src=(url) controls preload="metadata" data-media {
                            (VIDEO_UNSUPPORTED)
                        }
                    }
                }
            }
            @if let Some(caption) = caption {
                figcaption { (caption) }
            }
        }
    }
}

fn render_code(code: &HighlightedCode) -> Markup {
    let style = code.background.as_ref().map(|bg| format!("background: {bg}"));
    html! {
        div.code-block {
            div.code-label { (code.label) }
            pre.code style=[style] data-syntax=(code.syntax) {
                code {
                    @for (index, line) in code.lines.iter().enumerate() {
                        @if index > 0 { "\n" }
                        span.line {
                            span.line-number aria-hidden="true" { (index + 1) }
                            span.line-content { (PreEscaped(line)) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer() -> BlockRenderer {
        BlockRenderer::new(&CodeConfig::default()).unwrap()
    }

    fn render_json(values: Vec<serde_json::Value>) -> String {
        let blocks = crate::content::decode_blocks(values, "test");
        renderer().render(&blocks).into_string()
    }

    // =========================================================================
    // Ordering and headings
    // =========================================================================

    #[test]
    fn blocks_render_in_input_order() {
        let html = render_json(vec![
            json!({"type": "paragraph", "text": "first"}),
            json!({"type": "heading", "id": "mid", "text": "second"}),
            json!({"type": "quote", "text": "third"}),
            json!({"type": "code", "source": "fourth"}),
        ]);
        let positions: Vec<usize> = ["first", "second", "third", "fourth"]
            .iter()
            .map(|needle| html.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn heading_tiers_and_anchor_ids() {
        let html = render_json(vec![
            json!({"type": "heading", "level": 2, "id": "a", "text": "A"}),
            json!({"type": "subheading", "id": "b", "content": "B"}),
            json!({"type": "heading3", "content": "C"}),
        ]);
        assert!(html.contains(r#"<h2 class="heading" id="a">A</h2>"#));
        assert!(html.contains(r#"<h3 class="heading" id="b">B</h3>"#));
        assert!(html.contains(r#"<h4 class="heading">C</h4>"#));
    }

    #[test]
    fn quote_with_author_footer() {
        let html = render_json(vec![json!({"type": "quote", "text": "q", "author": "Ada"})]);
        assert!(html.contains("<blockquote"));
        assert!(html.contains("— Ada"));
    }

    #[test]
    fn quote_without_author_has_no_footer() {
        let html = render_json(vec![json!({"type": "quote", "text": "q"})]);
        assert!(!html.contains("quote-author"));
    }

    #[test]
    fn rich_text_is_sanitized() {
        let html = render_json(vec![json!({
            "type": "paragraph",
            "text": "<script>alert(1)</script>safe <a href=\"javascript:alert(1)\">x</a>"
        })]);
        assert!(!html.contains("<script"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("safe"));
    }

    // =========================================================================
    // Media
    // =========================================================================

    #[test]
    fn image_with_caption_and_width() {
        let html = render_json(vec![json!({
            "type": "image", "content": "/a.png", "alt": "Lab", "width": "60%"
        })]);
        assert!(html.contains(r#"style="width: 60%; margin: 0 auto""#));
        assert!(html.contains(r#"src="/a.png""#));
        assert!(html.contains("<figcaption>Lab</figcaption>"));
    }

    #[test]
    fn invalid_width_hint_is_dropped() {
        let html = render_json(vec![json!({
            "type": "image", "content": "/a.png", "width": "100%;background:red"
        })]);
        assert!(!html.contains("style="));
    }

    #[test]
    fn gif_shares_figure_treatment() {
        let html = render_json(vec![json!({"type": "gif", "content": "/a.gif"})]);
        assert!(html.contains("media-gif"));
        assert!(html.contains("<img"));
    }

    #[test]
    fn video_has_controls_and_fallback_text() {
        let html = render_json(vec![json!({"type": "video", "content": "/demo.mp4"})]);
        assert!(html.contains("<video"));
        assert!(html.contains("controls"));
        assert!(html.contains(VIDEO_UNSUPPORTED));
    }

    #[test]
    fn empty_url_renders_placeholder() {
        let html = render_json(vec![json!({"type": "image", "content": "", "alt": "gone"})]);
        assert!(html.contains(MEDIA_UNAVAILABLE));
        assert!(!html.contains("<img"));
        assert!(html.contains("gone"));
    }

    #[test]
    fn valid_widths() {
        assert_eq!(valid_width("60%"), Some("60%"));
        assert_eq!(valid_width(" 480px "), Some("480px"));
        assert_eq!(valid_width("2.5rem"), Some("2.5rem"));
        assert_eq!(valid_width("wide"), None);
        assert_eq!(valid_width("calc(100% - 1px)"), None);
    }

    // =========================================================================
    // Code
    // =========================================================================

    #[test]
    fn code_block_has_label_and_numbered_lines() {
        let html = render_json(vec![json!({
            "type": "code", "language": "rust", "source": "fn main() {}\nlet x = 1;\n"
        })]);
        assert!(html.contains(r#"<div class="code-label">rust</div>"#));
        assert!(html.contains(r#"<span class="line-number" aria-hidden="true">1</span>"#));
        assert!(html.contains(r#"<span class="line-number" aria-hidden="true">2</span>"#));
        assert!(!html.contains(r#"aria-hidden="true">3</span>"#));
    }

    #[test]
    fn code_without_language_is_plain_and_labelled_code() {
        let html = render_json(vec![json!({"type": "code", "source": "  a < b\n\n\tc"})]);
        assert!(html.contains(r#"<div class="code-label">code</div>"#));
        assert!(html.contains("  a &lt; b"));
        assert!(html.contains("\tc"));
        assert!(html.contains(r#"aria-hidden="true">3</span>"#));
    }

    #[test]
    fn unknown_language_still_renders() {
        let html = render_json(vec![json!({
            "type": "code", "language": "brainfudge", "source": "+++"
        })]);
        assert!(html.contains("brainfudge"));
        assert!(html.contains("+++"));
    }
}
