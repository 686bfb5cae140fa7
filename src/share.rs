//! Share actions for blog posts.
//!
//! "Copy link" writes the absolute location of the post to the clipboard;
//! "share to X/LinkedIn" opens an intent URL in a new window. Both side
//! effects sit behind small traits so the browser, a CLI or a test can
//! provide them. A failing side effect never propagates: it is turned into a
//! [`Notification`] for the toast area, the same way everywhere.

use thiserror::Error;
use url::{Url, form_urlencoded};

const X_INTENT: &str = "https://twitter.com/intent/tweet";
const LINKEDIN_INTENT: &str = "https://www.linkedin.com/sharing/share-offsite/";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShareError {
    #[error("Could not copy link: {0}")]
    Clipboard(String),
    #[error("Could not open share window: {0}")]
    Window(String),
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

pub trait WindowOpener {
    fn open(&mut self, url: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    X,
    LinkedIn,
}

impl ShareTarget {
    pub fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::LinkedIn => "LinkedIn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A short message for the toast area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

impl From<ShareError> for Notification {
    fn from(err: ShareError) -> Self {
        Notification::error(err.to_string())
    }
}

/// `location` (a `#/...` fragment) made absolute against `base_url`.
///
/// An empty or unparsable base leaves the location as is.
pub fn absolute_location(base_url: &str, location: &str) -> String {
    if base_url.is_empty() {
        return location.to_string();
    }
    match Url::parse(base_url) {
        Ok(mut url) => {
            url.set_fragment(Some(location.trim_start_matches('#')));
            url.to_string()
        }
        Err(err) => {
            log::warn!("base_url '{base_url}' does not parse ({err}); sharing bare location");
            location.to_string()
        }
    }
}

/// Intent URL that shares `href` (and `title`, where supported) on `target`.
pub fn intent_url(target: ShareTarget, title: &str, href: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    match target {
        ShareTarget::X => {
            query.append_pair("text", title);
            query.append_pair("url", href);
            format!("{X_INTENT}?{}", query.finish())
        }
        ShareTarget::LinkedIn => {
            query.append_pair("url", href);
            format!("{LINKEDIN_INTENT}?{}", query.finish())
        }
    }
}

pub fn try_copy_link(
    clipboard: &mut impl Clipboard,
    base_url: &str,
    location: &str,
) -> Result<String, ShareError> {
    let href = absolute_location(base_url, location);
    clipboard.write_text(&href).map_err(ShareError::Clipboard)?;
    Ok(href)
}

/// Copy the post's absolute location and report the outcome.
pub fn copy_link(clipboard: &mut impl Clipboard, base_url: &str, location: &str) -> Notification {
    match try_copy_link(clipboard, base_url, location) {
        Ok(_) => Notification::info("Link copied to clipboard!"),
        Err(err) => {
            log::warn!("{err}");
            err.into()
        }
    }
}

pub fn try_share(
    opener: &mut impl WindowOpener,
    target: ShareTarget,
    title: &str,
    base_url: &str,
    location: &str,
) -> Result<String, ShareError> {
    let intent = intent_url(target, title, &absolute_location(base_url, location));
    opener.open(&intent).map_err(ShareError::Window)?;
    Ok(intent)
}

/// Open the share intent for `target`. Only a failure produces a
/// notification.
pub fn share(
    opener: &mut impl WindowOpener,
    target: ShareTarget,
    title: &str,
    base_url: &str,
    location: &str,
) -> Option<Notification> {
    match try_share(opener, target, title, base_url, location) {
        Ok(_) => None,
        Err(err) => {
            log::warn!("{err}");
            Some(err.into())
        }
    }
}
