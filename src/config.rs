//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives at
//! the content root and is layered over stock defaults, so it only needs the
//! keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! author = ""
//! tagline = ""
//! base_url = ""             # Absolute origin used by share links
//! # author_avatar = "/assets/me.jpg"
//!
//! [listing]
//! page_size = 6             # Cards per page on blog/project indexes
//!
//! [toc]
//! scroll_offset = 100       # Pixels kept above a heading after scrolling to it
//! band_bottom_ratio = 0.8   # Lower part of the viewport ignored by the observer
//!
//! [code]
//! theme = "base16-ocean.dark"
//! default_language = "txt"
//!
//! [comments]
//! enabled = false
//! repo = ""
//! repo_id = ""
//! category = ""
//! category_id = ""
//! theme = "preferred_color_scheme"
//! lang = "en"
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//! accent = "#ff6b3d"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//! accent = "#ff6b3d"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::highlight;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity shown in the header, footer and document title.
    pub site: SiteInfo,
    /// Blog and project index settings.
    pub listing: ListingConfig,
    /// Table-of-contents observation band.
    pub toc: TocConfig,
    /// Code block highlighting.
    pub code: CodeConfig,
    /// Discussion widget attached below blog posts.
    pub comments: CommentsConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.page_size == 0 {
            return Err(ConfigError::Validation(
                "listing.page_size must be at least 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.toc.band_bottom_ratio) {
            return Err(ConfigError::Validation(
                "toc.band_bottom_ratio must be in [0, 1)".into(),
            ));
        }
        if !highlight::theme_exists(&self.code.theme) {
            return Err(ConfigError::Validation(format!(
                "code.theme '{}' is not a known theme (available: {})",
                self.code.theme,
                highlight::theme_names().join(", ")
            )));
        }
        if self.comments.enabled {
            let c = &self.comments;
            for (key, value) in [
                ("repo", &c.repo),
                ("repo_id", &c.repo_id),
                ("category", &c.category),
                ("category_id", &c.category_id),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "comments.{key} is required when comments are enabled"
                    )));
                }
            }
        }
        if !self.site.base_url.is_empty() && url::Url::parse(&self.site.base_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "site.base_url '{}' is not an absolute URL",
                self.site.base_url
            )));
        }
        Ok(())
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub author: String,
    pub tagline: String,
    /// Absolute origin (e.g. `https://me.dev/`) prepended to locations when
    /// sharing. Empty means share links use the bare location.
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),
            tagline: String::new(),
            base_url: String::new(),
            author_avatar: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Cards per page on the blog and project indexes.
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { page_size: 6 }
    }
}

/// Observation band for the active-section tracker.
///
/// A heading is "in view" when it sits between `scroll_offset` pixels below
/// the viewport top and `band_bottom_ratio` of the viewport height above the
/// bottom edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub scroll_offset: u32,
    pub band_bottom_ratio: f64,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            scroll_offset: 100,
            band_bottom_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeConfig {
    /// Highlighting theme name from the bundled theme set.
    pub theme: String,
    /// Language used when a code block names none.
    pub default_language: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            default_language: "txt".to_string(),
        }
    }
}

/// giscus-compatible discussion widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommentsConfig {
    pub enabled: bool,
    pub repo: String,
    pub repo_id: String,
    pub category: String,
    pub category_id: String,
    /// Theme hint handed to the widget.
    pub theme: String,
    pub lang: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repo: String::new(),
            repo_id: String::new(),
            category: String::new(),
            category_id: String::new(),
            theme: "preferred_color_scheme".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, read times, captions and the TOC.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Highlight color for categories, active TOC entries and buttons.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
            accent: "#ff6b3d".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
            accent: "#ff6b3d".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Remove any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "Portfolio"
author = ""
tagline = ""

# Absolute origin prepended to locations for "copy link" and share buttons.
# Leave empty to share bare locations such as "#/blog/my-post".
base_url = ""

# Small avatar shown next to the author name on blog posts.
# author_avatar = "/assets/avatar.jpg"

# ---------------------------------------------------------------------------
# Blog and project indexes
# ---------------------------------------------------------------------------
[listing]
# Cards per page. Must be at least 1.
page_size = 6

# ---------------------------------------------------------------------------
# Table of contents
# ---------------------------------------------------------------------------
[toc]
# Pixels kept between the viewport top and a heading scrolled into place.
# Also the top inset of the band in which a heading counts as active.
scroll_offset = 100

# Fraction of the viewport height, measured from the bottom, that never
# activates a heading. Must be in [0, 1).
band_bottom_ratio = 0.8

# ---------------------------------------------------------------------------
# Code blocks
# ---------------------------------------------------------------------------
[code]
# One of: base16-ocean.dark, base16-eighties.dark, base16-mocha.dark,
# base16-ocean.light, InspiredGitHub, Solarized (dark), Solarized (light)
theme = "base16-ocean.dark"

# Language assumed when a code block names none ("txt" = no highlighting).
default_language = "txt"

# ---------------------------------------------------------------------------
# Comments (giscus)
# ---------------------------------------------------------------------------
[comments]
enabled = false
repo = ""
repo_id = ""
category = ""
category_id = ""
theme = "preferred_color_scheme"
lang = "en"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Dates, captions, table of contents
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"
accent = "#ff6b3d"        # Categories, active TOC entry, buttons

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
accent = "#ff6b3d"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    fn scheme_vars(scheme: &ColorScheme, indent: &str) -> String {
        [
            ("bg", &scheme.background),
            ("text", &scheme.text),
            ("text-muted", &scheme.text_muted),
            ("border", &scheme.border),
            ("link", &scheme.link),
            ("link-hover", &scheme.link_hover),
            ("accent", &scheme.accent),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
    }

    format!(
        ":root {{\n{light}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{dark}\n    }}\n}}",
        light = scheme_vars(&colors.light, "    "),
        dark = scheme_vars(&colors.dark, "        "),
    )
}
