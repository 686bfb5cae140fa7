//! Syntax highlighting for code blocks.
//!
//! Highlighting runs at build time with the bundled syntect syntax and theme
//! sets, producing one HTML fragment per source line so the renderer can put
//! a line number in front of each. Lookup never fails: a language syntect
//! does not know falls back to a close relative, then to plain text.

use std::sync::LazyLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use thiserror::Error;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("unknown highlighting theme '{0}'")]
    UnknownTheme(String),
}

pub fn theme_exists(name: &str) -> bool {
    THEME_SET.themes.contains_key(name)
}

pub fn theme_names() -> Vec<&'static str> {
    THEME_SET.themes.keys().map(String::as_str).collect()
}

/// A highlighted code block, one HTML fragment per line.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedCode {
    /// Label shown above the block: the language as written, or `"code"`.
    pub label: String,
    /// Name of the syntax actually used (e.g. `"Rust"`, `"Plain Text"`).
    pub syntax: String,
    /// Escaped, styled HTML for each line, without line terminators.
    pub lines: Vec<String>,
    /// Theme background as a CSS color, when the theme defines one.
    pub background: Option<String>,
}

pub struct Highlighter {
    theme: &'static Theme,
    default_language: String,
}

impl Highlighter {
    pub fn new(theme: &str, default_language: &str) -> Result<Self, HighlightError> {
        let theme = THEME_SET
            .themes
            .get(theme)
            .ok_or_else(|| HighlightError::UnknownTheme(theme.to_string()))?;
        Ok(Self {
            theme,
            default_language: default_language.to_string(),
        })
    }

    /// Highlight `source` as `language`.
    ///
    /// Whitespace is kept byte for byte; only a single trailing line
    /// terminator is dropped so it does not produce an empty numbered line.
    pub fn highlight(&self, source: &str, language: &str) -> HighlightedCode {
        let language = language.trim();
        let label = if language.is_empty() {
            "code".to_string()
        } else {
            language.to_string()
        };
        let lookup = if language.is_empty() {
            self.default_language.as_str()
        } else {
            language
        };
        let syntax = find_syntax(lookup).unwrap_or_else(|| {
            log::debug!("no syntax for language '{lookup}', using plain text");
            SYNTAX_SET.find_syntax_plain_text()
        });

        let source = strip_final_newline(source);
        let lines = match highlight_lines(source, syntax, self.theme) {
            Ok(lines) => lines,
            Err(e) => {
                log::warn!("highlighting {} block failed, emitting plain text: {e}", syntax.name);
                plain_lines(source)
            }
        };

        HighlightedCode {
            label,
            syntax: syntax.name.clone(),
            lines,
            background: self
                .theme
                .settings
                .background
                .map(|c| format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)),
        }
    }
}

/// Resolve a language token, with fallbacks for languages the bundled set lacks.
fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let token = language.to_ascii_lowercase();
    SYNTAX_SET.find_syntax_by_token(&token).or_else(|| {
        let fallback = match token.as_str() {
            "ts" | "typescript" | "tsx" | "jsx" | "nix" => "JavaScript",
            "toml" => "YAML",
            "shell" | "zsh" | "console" => "Bourne Again Shell (bash)",
            _ => return None,
        };
        SYNTAX_SET.find_syntax_by_name(fallback)
    })
}

fn strip_final_newline(source: &str) -> &str {
    source
        .strip_suffix("\r\n")
        .or_else(|| source.strip_suffix('\n'))
        .unwrap_or(source)
}

/// Source lines without their terminators. Blank lines, trailing ones
/// included, are kept; a `\r` is only dropped as part of `\r\n`.
fn source_lines(source: &str) -> Vec<&str> {
    if source.is_empty() {
        return Vec::new();
    }
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn highlight_lines(
    source: &str,
    syntax: &SyntaxReference,
    theme: &Theme,
) -> Result<Vec<String>, syntect::Error> {
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in source_lines(source) {
        // The newline syntax set expects terminated lines.
        let terminated = format!("{line}\n");
        let ranges = highlighter.highlight_line(&terminated, &SYNTAX_SET)?;
        let html = styled_line_to_highlighted_html(&ranges[..], IncludeBackground::No)?;
        lines.push(html.replace('\n', ""));
    }
    Ok(lines)
}

fn plain_lines(source: &str) -> Vec<String> {
    source_lines(source)
        .into_iter()
        .map(|line| html_escape::encode_text(line).into_owned())
        .collect()
}
