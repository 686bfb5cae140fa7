//! Sanitized inline markup for paragraphs, quotes and headings.
//!
//! Content records carry short HTML-ish strings such as
//! `Understanding <span style='color: #ff6b3d;'>performance</span> is **key**`.
//! They are parsed once at load time into a small tree of allow-listed
//! constructs and rendered back through maud, so nothing from the record is
//! ever emitted verbatim.
//!
//! ## Allow-list
//!
//! | Input | Node |
//! |-------|------|
//! | `<strong>`, `<b>`, `**text**` | [`Inline::Strong`] |
//! | `<em>`, `<i>` | [`Inline::Emphasis`] |
//! | `<u>` | [`Inline::Underline`] |
//! | `<code>` | [`Inline::Code`] |
//! | `<a href>` with http, https, mailto, relative or `#` target | [`Inline::Link`] |
//! | `<span style="color: …">` | [`Inline::Color`] |
//! | `<span class="… font-mono …">` or `class="comment"` | [`Inline::Comment`] |
//! | `<br>` | [`Inline::LineBreak`] |
//!
//! Any other tag is dropped and its text kept. `script`, `style` and the other
//! raw-text containers are dropped together with their content. Attributes
//! other than `href`, a validated `color` and the comment class never
//! survive, so event handlers cannot be smuggled through.

use maud::{Markup, Render, html};
use regex::Regex;
use std::sync::LazyLock;

static CSS_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(#[0-9a-fA-F]{3,8}|[a-zA-Z]{3,20}|rgba?\(\s*\d{1,3}%?\s*,\s*\d{1,3}%?\s*,\s*\d{1,3}%?\s*(,\s*(0|1|0?\.\d+)\s*)?\))$",
    )
    .expect("color pattern compiles")
});

/// Elements whose content is never text worth keeping.
const DROPPED_CONTAINERS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title",
    "svg", "math",
];

/// One node of parsed rich text.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Underline(Vec<Inline>),
    Code(Vec<Inline>),
    Link {
        href: String,
        color: Option<String>,
        children: Vec<Inline>,
    },
    Color {
        color: String,
        children: Vec<Inline>,
    },
    /// Muted monospace aside, e.g. `// note`.
    Comment(Vec<Inline>),
    LineBreak,
}

/// Parsed, sanitized rich text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichText(Vec<Inline>);

impl RichText {
    pub fn parse(raw: &str) -> Self {
        Parser::default().run(raw)
    }

    pub fn nodes(&self) -> &[Inline] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text content only, with line breaks as spaces.
    pub fn plain_text(&self) -> String {
        fn collect(nodes: &[Inline], out: &mut String) {
            for node in nodes {
                match node {
                    Inline::Text(t) => out.push_str(t),
                    Inline::LineBreak => out.push(' '),
                    Inline::Strong(c)
                    | Inline::Emphasis(c)
                    | Inline::Underline(c)
                    | Inline::Code(c)
                    | Inline::Comment(c)
                    | Inline::Link { children: c, .. }
                    | Inline::Color { children: c, .. } => collect(c, out),
                }
            }
        }
        let mut out = String::new();
        collect(&self.0, &mut out);
        out
    }
}

impl From<&str> for RichText {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Render for RichText {
    fn render(&self) -> Markup {
        render_nodes(&self.0)
    }
}

fn render_nodes(nodes: &[Inline]) -> Markup {
    html! {
        @for node in nodes {
            (render_node(node))
        }
    }
}

fn render_node(node: &Inline) -> Markup {
    match node {
        Inline::Text(t) => html! { (t) },
        Inline::Strong(c) => html! { strong { (render_nodes(c)) } },
        Inline::Emphasis(c) => html! { em { (render_nodes(c)) } },
        Inline::Underline(c) => html! { u { (render_nodes(c)) } },
        Inline::Code(c) => html! { code.inline-code { (render_nodes(c)) } },
        Inline::Link {
            href,
            color,
            children,
        } => {
            let external = is_external(href);
            let style = color.as_ref().map(|c| format!("color: {c}"));
            html! {
                a.rich-link href=(href) style=[style]
                    target=[external.then_some("_blank")]
                    rel=[external.then_some("noopener noreferrer")] {
                    (render_nodes(children))
                }
            }
        }
        Inline::Color { color, children } => html! {
            span.rich-color style={ "color: " (color) } { (render_nodes(children)) }
        },
        Inline::Comment(c) => html! { span.rich-comment { (render_nodes(c)) } },
        Inline::LineBreak => html! { br; },
    }
}

fn is_external(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Keep `href` only when it cannot execute anything.
pub(crate) fn safe_href(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.find([':', '/', '?', '#']) {
        Some(i) if cleaned.as_bytes()[i] == b':' => {
            let scheme = cleaned[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto").then_some(cleaned)
        }
        _ => Some(cleaned),
    }
}

/// Extract a validated `color` declaration from an inline style.
fn style_color(style: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        if !prop.trim().eq_ignore_ascii_case("color") {
            return None;
        }
        let value = value.trim();
        CSS_COLOR.is_match(value).then(|| value.to_string())
    })
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, PartialEq)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    HtmlComment,
}

/// Parse one tag at the start of `s` (which begins with `<`).
///
/// Returns the token and the number of bytes consumed, or `None` when the
/// `<` does not start a well-formed tag and should be kept as text.
fn parse_tag(s: &str) -> Option<(Token, usize)> {
    if let Some(body) = s.strip_prefix("<!--") {
        let end = body.find("-->").map(|i| i + 3).unwrap_or(body.len());
        return Some((Token::HtmlComment, 4 + end));
    }

    let bytes = s.as_bytes();
    let mut pos = 1;
    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }
    let name_start = pos;
    if !bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    while bytes.get(pos).is_some_and(u8::is_ascii_alphanumeric) {
        pos += 1;
    }
    let name = s[name_start..pos].to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        match bytes.get(pos)? {
            b'>' => {
                pos += 1;
                break;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                pos += 2;
                let token = if closing {
                    Token::Close(name)
                } else {
                    Token::Open {
                        name,
                        attrs,
                        self_closing: true,
                    }
                };
                return Some((token, pos));
            }
            b'/' => pos += 1,
            _ => {
                let attr_start = pos;
                while bytes
                    .get(pos)
                    .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
                {
                    pos += 1;
                }
                let attr_name = s[attr_start..pos].to_ascii_lowercase();
                while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
                    pos += 1;
                }
                let mut value = String::new();
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
                        pos += 1;
                    }
                    match bytes.get(pos)? {
                        quote @ (b'"' | b'\'') => {
                            let quote = *quote as char;
                            let rest = &s[pos + 1..];
                            let len = rest.find(quote)?;
                            value = html_escape::decode_html_entities(&rest[..len]).into_owned();
                            pos += len + 2;
                        }
                        _ => {
                            let start = pos;
                            while bytes
                                .get(pos)
                                .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>')
                            {
                                pos += 1;
                            }
                            value = html_escape::decode_html_entities(&s[start..pos]).into_owned();
                        }
                    }
                }
                if !attr_name.is_empty() {
                    attrs.push((attr_name, value));
                }
            }
        }
    }

    let token = if closing {
        Token::Close(name)
    } else {
        Token::Open {
            name,
            attrs,
            self_closing: false,
        }
    };
    Some((token, pos))
}

// ============================================================================
// Tree builder
// ============================================================================

#[derive(Debug)]
enum Frame {
    Root,
    Strong,
    Emphasis,
    Underline,
    Code,
    Link { href: String, color: Option<String> },
    Color(String),
    Comment,
    /// A tag that closes normally but leaves no node behind.
    Transparent,
}

#[derive(Debug)]
struct Open {
    /// Tag name that closes this frame; `**` for markdown-style bold.
    tag: String,
    frame: Frame,
    children: Vec<Inline>,
}

struct Parser {
    stack: Vec<Open>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            stack: vec![Open {
                tag: String::new(),
                frame: Frame::Root,
                children: Vec::new(),
            }],
        }
    }
}

impl Parser {
    fn run(mut self, raw: &str) -> RichText {
        let mut rest = raw;
        while !rest.is_empty() {
            if rest.starts_with('<') {
                match parse_tag(rest) {
                    Some((token, consumed)) => {
                        rest = &rest[consumed..];
                        rest = self.handle(token, rest);
                    }
                    None => {
                        self.push_text("<");
                        rest = &rest[1..];
                    }
                }
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                self.handle_text(&rest[..end]);
                rest = &rest[end..];
            }
        }
        self.finish()
    }

    /// Apply a token; returns the input left to parse.
    fn handle<'a>(&mut self, token: Token, rest: &'a str) -> &'a str {
        match token {
            Token::HtmlComment => rest,
            Token::Close(name) => {
                self.close(&name);
                rest
            }
            Token::Open { name, .. } if DROPPED_CONTAINERS.contains(&name.as_str()) => {
                skip_container(&name, rest)
            }
            Token::Open { name, .. } if name == "br" => {
                self.top().children.push(Inline::LineBreak);
                rest
            }
            Token::Open {
                self_closing: true, ..
            } => rest,
            Token::Open { name, attrs, .. } => {
                let attr = |key: &str| {
                    attrs
                        .iter()
                        .find(|(k, _)| k == key)
                        .map(|(_, v)| v.as_str())
                };
                let frame = match name.as_str() {
                    "strong" | "b" => Some(Frame::Strong),
                    "em" | "i" => Some(Frame::Emphasis),
                    "u" => Some(Frame::Underline),
                    "code" => Some(Frame::Code),
                    "a" => Some(match attr("href").and_then(safe_href) {
                        Some(href) => Frame::Link {
                            href,
                            color: attr("style").and_then(style_color),
                        },
                        None => Frame::Transparent,
                    }),
                    "span" => {
                        let is_comment = attr("class").is_some_and(|class| {
                            class
                                .split_whitespace()
                                .any(|c| c == "font-mono" || c == "comment")
                        });
                        Some(match attr("style").and_then(style_color) {
                            Some(color) => Frame::Color(color),
                            None if is_comment => Frame::Comment,
                            None => Frame::Transparent,
                        })
                    }
                    _ => None,
                };
                if let Some(frame) = frame {
                    self.stack.push(Open {
                        tag: name,
                        frame,
                        children: Vec::new(),
                    });
                }
                rest
            }
        }
    }

    fn handle_text(&mut self, text: &str) {
        let mut pieces = text.split("**");
        if let Some(first) = pieces.next() {
            self.push_text(&html_escape::decode_html_entities(first));
        }
        for piece in pieces {
            if matches!(self.top().frame, Frame::Code) {
                self.push_text("**");
            } else if self.stack.iter().any(|o| o.tag == "**") {
                self.close("**");
            } else {
                self.stack.push(Open {
                    tag: "**".to_string(),
                    frame: Frame::Strong,
                    children: Vec::new(),
                });
            }
            self.push_text(&html_escape::decode_html_entities(piece));
        }
    }

    fn top(&mut self) -> &mut Open {
        self.stack
            .last_mut()
            .expect("root frame is never popped")
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = &mut self.top().children;
        if let Some(Inline::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(Inline::Text(text.to_string()));
        }
    }

    /// Close the innermost open frame named `tag`, closing anything opened inside it.
    fn close(&mut self, tag: &str) {
        let Some(index) = self.stack.iter().skip(1).rposition(|o| o.tag == tag) else {
            return;
        };
        let index = index + 1;
        while self.stack.len() > index {
            self.fold_top(false);
        }
    }

    /// Pop the top frame into its parent. Unterminated `**` becomes literal.
    fn fold_top(&mut self, unterminated: bool) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        if matches!(open.frame, Frame::Root) {
            self.stack.push(open);
            return;
        }
        let Open {
            tag,
            frame,
            children,
        } = open;
        let wrapped = match frame {
            Frame::Strong if unterminated && tag == "**" => {
                self.push_text("**");
                Err(children)
            }
            Frame::Strong => Ok(Inline::Strong(children)),
            Frame::Emphasis => Ok(Inline::Emphasis(children)),
            Frame::Underline => Ok(Inline::Underline(children)),
            Frame::Code => Ok(Inline::Code(children)),
            Frame::Comment => Ok(Inline::Comment(children)),
            Frame::Link { href, color } => Ok(Inline::Link {
                href,
                color,
                children,
            }),
            Frame::Color(color) => Ok(Inline::Color { color, children }),
            Frame::Transparent | Frame::Root => Err(children),
        };
        match wrapped {
            Ok(node) => self.top().children.push(node),
            Err(children) => {
                for child in children {
                    match child {
                        Inline::Text(t) => self.push_text(&t),
                        other => self.top().children.push(other),
                    }
                }
            }
        }
    }

    fn finish(mut self) -> RichText {
        while self.stack.len() > 1 {
            self.fold_top(true);
        }
        let root = self.stack.pop().map(|o| o.children).unwrap_or_default();
        RichText(root)
    }
}

/// Skip past the closing tag of a dropped container, or to the end of input.
fn skip_container<'a>(name: &str, rest: &'a str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let needle = format!("</{name}");
    match lower.find(&needle) {
        Some(start) => match rest[start..].find('>') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        },
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn render(raw: &str) -> String {
        RichText::parse(raw).render().into_string()
    }

    #[test]
    fn plain_text_is_single_node() {
        assert_eq!(RichText::parse("hello world").nodes(), &[text("hello world")]);
    }

    #[test]
    fn strong_and_emphasis() {
        let rt = RichText::parse("a <strong>b</strong> <em>c</em>");
        assert_eq!(
            rt.nodes(),
            &[
                text("a "),
                Inline::Strong(vec![text("b")]),
                text(" "),
                Inline::Emphasis(vec![text("c")]),
            ]
        );
    }

    #[test]
    fn markdown_bold_pairs() {
        let rt = RichText::parse("**Note**: drafts");
        assert_eq!(
            rt.nodes(),
            &[Inline::Strong(vec![text("Note")]), text(": drafts")]
        );
    }

    #[test]
    fn unbalanced_markdown_bold_stays_literal() {
        let rt = RichText::parse("2 ** 3");
        assert_eq!(rt.plain_text(), "2 ** 3");
        assert!(!render("2 ** 3").contains("<strong>"));
    }

    #[test]
    fn color_span() {
        let rt = RichText::parse("<span style='color: #ff6b3d;'>perf</span>");
        assert_eq!(
            rt.nodes(),
            &[Inline::Color {
                color: "#ff6b3d".to_string(),
                children: vec![text("perf")],
            }]
        );
    }

    #[test]
    fn color_with_injection_is_dropped() {
        let rt = RichText::parse("<span style=\"color: red; background: url(javascript:x)\">x</span>");
        assert!(matches!(&rt.nodes()[0], Inline::Color { color, .. } if color == "red"));
        let rt = RichText::parse("<span style=\"color: expression(alert(1))\">x</span>");
        assert_eq!(rt.nodes(), &[text("x")]);
    }

    #[test]
    fn comment_span_from_class() {
        let rt = RichText::parse(
            "<span class='font-mono text-muted-foreground text-sm'>// aside</span>",
        );
        assert_eq!(rt.nodes(), &[Inline::Comment(vec![text("// aside")])]);
    }

    #[test]
    fn styled_external_link() {
        let raw = "<a href='https://example.com/x' target='_blank' style='color: #ff6b3d; text-decoration: underline;'><u>Sahdev</u></a>";
        let rt = RichText::parse(raw);
        assert_eq!(
            rt.nodes(),
            &[Inline::Link {
                href: "https://example.com/x".to_string(),
                color: Some("#ff6b3d".to_string()),
                children: vec![Inline::Underline(vec![text("Sahdev")])],
            }]
        );
        let html = render(raw);
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn anchor_link_is_not_external() {
        let html = render("<a href=\"#section-2\">jump</a>");
        assert!(html.contains(r##"href="#section-2""##));
        assert!(!html.contains("target"));
    }

    #[test]
    fn javascript_href_keeps_text_only() {
        for href in ["javascript:alert(1)", "JaVa\tScRiPt:alert(1)", " data:text/html,x"] {
            let raw = format!("<a href=\"{href}\">click</a>");
            let rt = RichText::parse(&raw);
            assert_eq!(rt.nodes(), &[text("click")], "href {href:?}");
        }
    }

    #[test]
    fn script_and_content_dropped() {
        let rt = RichText::parse("a<script>alert('x')</script>b<STYLE>*{}</style>c");
        assert_eq!(rt.nodes(), &[text("abc")]);
    }

    #[test]
    fn unclosed_script_drops_rest() {
        assert_eq!(RichText::parse("safe<script>evil").nodes(), &[text("safe")]);
    }

    #[test]
    fn event_handler_attributes_never_render() {
        let html = render("<strong onclick=\"steal()\">x</strong><img src=x onerror=alert(1)>");
        assert_eq!(html, "<strong>x</strong>");
    }

    #[test]
    fn unknown_tags_keep_text() {
        let rt = RichText::parse("<div class='x'>inside <blink>me</blink></div>");
        assert_eq!(rt.nodes(), &[text("inside me")]);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let rt = RichText::parse("a < b and 3<4");
        assert_eq!(rt.plain_text(), "a < b and 3<4");
        assert!(render("a < b").contains("a &lt; b"));
    }

    #[test]
    fn entities_decode_then_escape() {
        let rt = RichText::parse("Tom &amp; Jerry &lt;3");
        assert_eq!(rt.plain_text(), "Tom & Jerry <3");
        assert_eq!(render("Tom &amp; Jerry &lt;3"), "Tom &amp; Jerry &lt;3");
    }

    #[test]
    fn misnested_close_closes_inner_frames() {
        let rt = RichText::parse("<strong><em>x</strong>y</em>");
        assert_eq!(
            rt.nodes(),
            &[Inline::Strong(vec![Inline::Emphasis(vec![text("x")])]), text("y")]
        );
    }

    #[test]
    fn unclosed_frames_close_at_end() {
        let rt = RichText::parse("<strong>bold to the end");
        assert_eq!(rt.nodes(), &[Inline::Strong(vec![text("bold to the end")])]);
    }

    #[test]
    fn transparent_span_does_not_close_outer_span() {
        let rt = RichText::parse("<span style='color: red'>a<span>b</span>c</span>");
        assert_eq!(
            rt.nodes(),
            &[Inline::Color {
                color: "red".to_string(),
                children: vec![text("abc")],
            }]
        );
    }

    #[test]
    fn line_break_and_code() {
        let rt = RichText::parse("run <code>a**b</code><br/>done");
        assert_eq!(
            rt.nodes(),
            &[
                text("run "),
                Inline::Code(vec![text("a**b")]),
                Inline::LineBreak,
                text("done"),
            ]
        );
        assert_eq!(rt.plain_text(), "run a**b done");
    }

    #[test]
    fn html_comment_dropped() {
        assert_eq!(RichText::parse("a<!-- hidden -->b").nodes(), &[text("ab")]);
    }
}
