//! Content entities and their typed blocks.
//!
//! Blog posts and projects arrive as JSON records (one per file, see
//! [`crate::scan`]). Each record carries an ordered list of blocks. Blocks are
//! decoded one at a time into the closed [`ContentBlock`] union: a block with
//! an unknown `type`, or one missing what its type needs, is skipped with a
//! warning and the rest of the document still loads. New block kinds added by
//! the content tooling therefore degrade to "not shown" instead of breaking
//! the build, and every kind the renderer does know is matched exhaustively.
//!
//! ## Block wire format
//!
//! ```json
//! {"type": "heading", "level": 2, "id": "intro", "text": "Introduction"}
//! {"type": "paragraph", "text": "Some <strong>rich</strong> text"}
//! {"type": "quote", "text": "…", "author": "Donald Knuth"}
//! {"type": "media", "kind": "image", "url": "/a.png", "caption": "…", "width": "60%"}
//! {"type": "code", "language": "rust", "source": "fn main() {}"}
//! ```
//!
//! The names emitted by the older content generator are accepted too:
//! `subheading` (level 3), `heading3` (level 4), and `image` / `gif` /
//! `video` with the URL in `content` and the caption in `alt`. Text-bearing
//! blocks may use `content` or `richText` in place of `text`.

use crate::rich_text::RichText;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Heading tier. Level 1 is reserved for the page title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

/// One unit of a document body.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading {
        level: HeadingLevel,
        id: Option<String>,
        text: RichText,
    },
    Paragraph {
        text: RichText,
    },
    Quote {
        text: RichText,
        author: Option<String>,
    },
    Media {
        kind: MediaKind,
        url: String,
        caption: Option<String>,
        width_hint: Option<String>,
    },
    Code {
        source: String,
        language: String,
    },
}

/// Why a block was left out of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnknownKind(String),
    Missing {
        kind: String,
        field: &'static str,
    },
    BadHeadingLevel(u8),
    BadMediaKind(String),
    NotAnObject(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(kind) => write!(f, "unknown block type '{kind}'"),
            Self::Missing { kind, field } => write!(f, "'{kind}' block without '{field}'"),
            Self::BadHeadingLevel(level) => write!(f, "heading level {level} outside 2..=4"),
            Self::BadMediaKind(kind) => write!(f, "unknown media kind '{kind}'"),
            Self::NotAnObject(err) => write!(f, "malformed block: {err}"),
        }
    }
}

/// Loose shape shared by every block kind, old and new names alike.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(rename = "type")]
    block_type: String,
    level: Option<u8>,
    id: Option<String>,
    text: Option<String>,
    rich_text: Option<String>,
    content: Option<String>,
    author: Option<String>,
    kind: Option<String>,
    url: Option<String>,
    caption: Option<String>,
    alt: Option<String>,
    #[serde(alias = "widthHint")]
    width: Option<WidthValue>,
    source: Option<String>,
    language: Option<String>,
}

/// Width hints show up both as strings (`"60%"`) and bare numbers (`480`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WidthValue {
    Text(String),
    Pixels(u32),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawBlock {
    fn text(&mut self) -> Option<String> {
        self.text
            .take()
            .or_else(|| self.rich_text.take())
            .or_else(|| self.content.take())
    }

    fn into_block(mut self) -> Result<ContentBlock, SkipReason> {
        let missing = |kind: &str, field| SkipReason::Missing {
            kind: kind.to_string(),
            field,
        };
        match self.block_type.as_str() {
            "heading" | "subheading" | "heading3" => {
                let default_level = match self.block_type.as_str() {
                    "subheading" => 3,
                    "heading3" => 4,
                    _ => 2,
                };
                let number = self.level.unwrap_or(default_level);
                let level =
                    HeadingLevel::from_number(number).ok_or(SkipReason::BadHeadingLevel(number))?;
                let text = self.text().ok_or_else(|| missing(&self.block_type, "text"))?;
                Ok(ContentBlock::Heading {
                    level,
                    id: non_empty(self.id),
                    text: RichText::parse(&text),
                })
            }
            "paragraph" => {
                let text = self.text().ok_or_else(|| missing("paragraph", "text"))?;
                Ok(ContentBlock::Paragraph {
                    text: RichText::parse(&text),
                })
            }
            "quote" => {
                let text = self.text().ok_or_else(|| missing("quote", "text"))?;
                Ok(ContentBlock::Quote {
                    text: RichText::parse(&text),
                    author: non_empty(self.author),
                })
            }
            "media" | "image" | "gif" | "video" => {
                let kind_name = match self.block_type.as_str() {
                    "media" => self
                        .kind
                        .take()
                        .ok_or_else(|| missing("media", "kind"))?,
                    other => other.to_string(),
                };
                let kind = match kind_name.as_str() {
                    "image" => MediaKind::Image,
                    "gif" => MediaKind::Gif,
                    "video" => MediaKind::Video,
                    _ => return Err(SkipReason::BadMediaKind(kind_name)),
                };
                // A present-but-empty URL is kept so the renderer can show
                // the missing-media placeholder in its place.
                let url = self
                    .url
                    .take()
                    .or_else(|| self.content.take())
                    .ok_or_else(|| missing(&self.block_type, "url"))?;
                Ok(ContentBlock::Media {
                    kind,
                    url: url.trim().to_string(),
                    caption: non_empty(self.caption.take().or_else(|| self.alt.take())),
                    width_hint: match self.width.take() {
                        Some(WidthValue::Text(t)) => non_empty(Some(t)),
                        Some(WidthValue::Pixels(px)) => Some(format!("{px}px")),
                        None => None,
                    },
                })
            }
            "code" => {
                let source = self
                    .source
                    .take()
                    .or_else(|| self.content.take())
                    .ok_or_else(|| missing("code", "source"))?;
                Ok(ContentBlock::Code {
                    source,
                    language: self.language.unwrap_or_default(),
                })
            }
            other => Err(SkipReason::UnknownKind(other.to_string())),
        }
    }
}

/// Decode one block value.
pub fn decode_block(value: serde_json::Value) -> Result<ContentBlock, SkipReason> {
    let raw: RawBlock =
        serde_json::from_value(value).map_err(|e| SkipReason::NotAnObject(e.to_string()))?;
    raw.into_block()
}

/// Decode a block list, logging and dropping the blocks that do not decode.
///
/// `origin` names the document in log records.
pub fn decode_blocks(values: Vec<serde_json::Value>, origin: &str) -> Vec<ContentBlock> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match decode_block(value) {
            Ok(block) => Some(block),
            Err(reason) => {
                log::warn!("{origin}: skipping block {index}: {reason}");
                None
            }
        })
        .collect()
}

// ============================================================================
// Entities
// ============================================================================

/// Which registry an entity belongs to. Slugs are only unique within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Blog,
    Project,
}

impl EntityKind {
    /// Directory under the content root holding this kind's records.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Project => "projects",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Project => "Projects",
        }
    }
}

/// A blog post or project: metadata plus its document body.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentEntity {
    pub slug: String,
    pub title: String,
    pub category: String,
    pub date: String,
    pub tags: Vec<String>,
    pub hero_image: Option<String>,
    /// When set, cards link here instead of to the detail view.
    pub external_link: Option<String>,
    pub display_order: Option<i64>,
    pub featured_on_home: bool,
    /// Featured on its own index page (blog or projects).
    pub featured_on_index: bool,
    /// Inactive entities are left out of listings but still resolve by slug.
    pub active: bool,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    pub github: Option<String>,
    pub demo: Option<String>,
    pub technologies: Vec<String>,
    pub duration: Option<String>,
    pub year: Option<String>,
    pub blocks: Vec<ContentBlock>,
    /// File the record was read from, relative to the content root.
    pub source: Option<PathBuf>,
}

/// Record as stored on disk. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntity {
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub hero_image: Option<String>,
    #[serde(alias = "externalUrl")]
    pub external_link: Option<String>,
    pub display_order: Option<i64>,
    #[serde(default)]
    pub featured_on_home: bool,
    #[serde(default, alias = "featuredOnBlog", alias = "featuredOnProjects")]
    pub featured_on_index: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    pub github: Option<String>,
    pub demo: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub duration: Option<String>,
    pub year: Option<String>,
    #[serde(default)]
    pub blocks: Vec<serde_json::Value>,
}

fn default_active() -> bool {
    true
}

impl RawEntity {
    /// Finish decoding; `fallback_slug` comes from the file name.
    pub(crate) fn into_entity(self, fallback_slug: &str, source: PathBuf) -> ContentEntity {
        let slug = non_empty(self.slug).unwrap_or_else(|| fallback_slug.to_string());
        let blocks = decode_blocks(self.blocks, &source.display().to_string());
        ContentEntity {
            slug,
            title: self.title,
            category: self.category,
            date: self.date,
            tags: self.tags,
            hero_image: non_empty(self.hero_image),
            external_link: non_empty(self.external_link),
            display_order: self.display_order,
            featured_on_home: self.featured_on_home,
            featured_on_index: self.featured_on_index,
            active: self.active,
            excerpt: non_empty(self.excerpt),
            read_time: non_empty(self.read_time),
            author: non_empty(self.author),
            author_avatar: non_empty(self.author_avatar),
            github: non_empty(self.github),
            demo: non_empty(self.demo),
            technologies: self.technologies,
            duration: non_empty(self.duration),
            year: non_empty(self.year),
            blocks,
            source: Some(source),
        }
    }
}

impl ContentEntity {
    /// Short teaser for cards: the explicit excerpt, else the first paragraph.
    pub fn summary(&self) -> Option<String> {
        self.excerpt.clone().or_else(|| {
            self.blocks.iter().find_map(|block| match block {
                ContentBlock::Paragraph { text } => Some(text.plain_text()),
                _ => None,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_new_heading() {
        let block =
            decode_block(json!({"type": "heading", "level": 3, "id": "x", "text": "Hi"})).unwrap();
        assert_eq!(
            block,
            ContentBlock::Heading {
                level: HeadingLevel::H3,
                id: Some("x".to_string()),
                text: RichText::parse("Hi"),
            }
        );
    }

    #[test]
    fn decode_legacy_heading_tiers() {
        let level = |t: &str| match decode_block(json!({"type": t, "content": "T"})).unwrap() {
            ContentBlock::Heading { level, .. } => level,
            other => panic!("expected heading, got {other:?}"),
        };
        assert_eq!(level("heading"), HeadingLevel::H2);
        assert_eq!(level("subheading"), HeadingLevel::H3);
        assert_eq!(level("heading3"), HeadingLevel::H4);
    }

    #[test]
    fn heading_without_id_and_blank_id_are_equivalent() {
        let a = decode_block(json!({"type": "heading", "text": "T"})).unwrap();
        let b = decode_block(json!({"type": "heading", "text": "T", "id": " "})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn heading_level_out_of_range_is_skipped() {
        let err = decode_block(json!({"type": "heading", "level": 1, "text": "T"})).unwrap_err();
        assert_eq!(err, SkipReason::BadHeadingLevel(1));
    }

    #[test]
    fn decode_legacy_image() {
        let block = decode_block(json!({
            "type": "image",
            "content": "/blogs/lab.png",
            "alt": "Typical Lab Structure",
            "width": 480
        }))
        .unwrap();
        assert_eq!(
            block,
            ContentBlock::Media {
                kind: MediaKind::Image,
                url: "/blogs/lab.png".to_string(),
                caption: Some("Typical Lab Structure".to_string()),
                width_hint: Some("480px".to_string()),
            }
        );
    }

    #[test]
    fn decode_media_with_kind() {
        let block = decode_block(json!({
            "type": "media", "kind": "video", "url": "/demo.mp4", "widthHint": "60%"
        }))
        .unwrap();
        assert!(matches!(
            block,
            ContentBlock::Media { kind: MediaKind::Video, width_hint: Some(ref w), .. } if w == "60%"
        ));
    }

    #[test]
    fn media_with_unknown_kind_is_skipped() {
        let err = decode_block(json!({"type": "media", "kind": "hologram", "url": "x"})).unwrap_err();
        assert_eq!(err, SkipReason::BadMediaKind("hologram".to_string()));
    }

    #[test]
    fn empty_media_url_is_kept_for_placeholder() {
        let block = decode_block(json!({"type": "image", "content": ""})).unwrap();
        assert!(matches!(block, ContentBlock::Media { ref url, .. } if url.is_empty()));
    }

    #[test]
    fn code_keeps_source_verbatim() {
        let source = "  indented\n\n\tline\n";
        let block = decode_block(json!({"type": "code", "content": source})).unwrap();
        assert_eq!(
            block,
            ContentBlock::Code {
                source: source.to_string(),
                language: String::new(),
            }
        );
    }

    #[test]
    fn quote_with_null_author() {
        let block = decode_block(json!({"type": "quote", "content": "q", "author": null})).unwrap();
        assert!(matches!(block, ContentBlock::Quote { author: None, .. }));
    }

    #[test]
    fn unknown_kind_is_skipped_not_fatal() {
        let blocks = decode_blocks(
            vec![
                json!({"type": "paragraph", "content": "one"}),
                json!({"type": "carousel", "items": []}),
                json!(42),
                json!({"type": "paragraph"}),
                json!({"type": "paragraph", "content": "two"}),
            ],
            "test.json",
        );
        let texts: Vec<String> = blocks
            .iter()
            .map(|b| match b {
                ContentBlock::Paragraph { text } => text.plain_text(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn raw_entity_defaults() {
        let raw: RawEntity = serde_json::from_value(json!({"title": "T"})).unwrap();
        let entity = raw.into_entity("from-file", PathBuf::from("blog/010-from-file.json"));
        assert_eq!(entity.slug, "from-file");
        assert!(entity.active);
        assert!(!entity.featured_on_index);
        assert_eq!(entity.display_order, None);
    }

    #[test]
    fn raw_entity_aliases() {
        let raw: RawEntity = serde_json::from_value(json!({
            "title": "T",
            "slug": "explicit",
            "featuredOnBlog": true,
            "externalUrl": "https://medium.com/x",
            "active": false,
            "displayOrder": 2,
            "unknownField": "ignored"
        }))
        .unwrap();
        let entity = raw.into_entity("ignored", PathBuf::from("blog/x.json"));
        assert_eq!(entity.slug, "explicit");
        assert!(entity.featured_on_index);
        assert!(!entity.active);
        assert_eq!(entity.display_order, Some(2));
        assert_eq!(entity.external_link.as_deref(), Some("https://medium.com/x"));
    }

    #[test]
    fn summary_prefers_excerpt_then_first_paragraph() {
        let mut entity = ContentEntity {
            blocks: vec![
                ContentBlock::Heading {
                    level: HeadingLevel::H2,
                    id: None,
                    text: RichText::parse("H"),
                },
                ContentBlock::Paragraph {
                    text: RichText::parse("first <strong>para</strong>"),
                },
            ],
            ..Default::default()
        };
        assert_eq!(entity.summary().as_deref(), Some("first para"));
        entity.excerpt = Some("teaser".to_string());
        assert_eq!(entity.summary().as_deref(), Some("teaser"));
    }
}
