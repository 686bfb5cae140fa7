//! Discussion widget attached below blog posts.
//!
//! The widget is a giscus-compatible embed. Each post maps to one thread,
//! keyed by the post's canonical location, so the thread stays the same no
//! matter how the reader got to the post. [`CommentMount`] tracks which
//! thread is attached and decides whether navigation needs a fresh widget,
//! so re-rendering the same post never stacks a second copy.

use crate::config::CommentsConfig;
use maud::{Markup, html};

pub const CLIENT_SCRIPT: &str = "https://giscus.app/client.js";

/// Identity of one comment thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThread {
    /// Stable key: the canonical location of the post.
    pub identifier: String,
}

impl CommentThread {
    pub fn for_location(location: &str) -> Self {
        Self {
            identifier: location.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountAction {
    /// Nothing was attached; load the widget.
    Attach,
    /// A different thread is attached; clear it and load the new one.
    Reattach,
    /// The requested thread is already attached.
    Keep,
}

/// Which thread, if any, the widget container currently shows.
#[derive(Debug, Default)]
pub struct CommentMount {
    current: Option<CommentThread>,
}

impl CommentMount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CommentThread> {
        self.current.as_ref()
    }

    /// Bring the container in line with `thread`.
    pub fn sync(&mut self, thread: &CommentThread) -> MountAction {
        let action = match &self.current {
            None => MountAction::Attach,
            Some(current) if current == thread => MountAction::Keep,
            Some(_) => MountAction::Reattach,
        };
        if action != MountAction::Keep {
            log::debug!("comments: {action:?} for {}", thread.identifier);
            self.current = Some(thread.clone());
        }
        action
    }

    /// The post was left; the next `sync` attaches from scratch.
    pub fn detach(&mut self) {
        self.current = None;
    }
}

/// Container for the widget. The shell script injects the client script
/// into it using these attributes. Empty when comments are disabled.
pub fn render_container(config: &CommentsConfig, thread: &CommentThread) -> Markup {
    if !config.enabled {
        return html! {};
    }
    html! {
        section.comments
            data-repo=(config.repo)
            data-repo-id=(config.repo_id)
            data-category=(config.category)
            data-category-id=(config.category_id)
            data-mapping="specific"
            data-term=(thread.identifier)
            data-strict="1"
            data-reactions-enabled="1"
            data-emit-metadata="0"
            data-input-position="top"
            data-theme=(config.theme)
            data-lang=(config.lang)
            data-client=(CLIENT_SCRIPT) {
            p.section-label { "// COMMENTS" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> CommentsConfig {
        CommentsConfig {
            enabled: true,
            repo: "me/site".to_string(),
            repo_id: "R_1".to_string(),
            category: "Announcements".to_string(),
            category_id: "DIC_1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn first_sync_attaches() {
        let mut mount = CommentMount::new();
        let thread = CommentThread::for_location("#/blog/a");
        assert_eq!(mount.sync(&thread), MountAction::Attach);
        assert_eq!(mount.current(), Some(&thread));
    }

    #[test]
    fn same_thread_is_kept() {
        let mut mount = CommentMount::new();
        let thread = CommentThread::for_location("#/blog/a");
        mount.sync(&thread);
        assert_eq!(mount.sync(&thread), MountAction::Keep);
    }

    #[test]
    fn other_thread_reattaches() {
        let mut mount = CommentMount::new();
        mount.sync(&CommentThread::for_location("#/blog/a"));
        let b = CommentThread::for_location("#/blog/b");
        assert_eq!(mount.sync(&b), MountAction::Reattach);
        assert_eq!(mount.current(), Some(&b));
    }

    #[test]
    fn detach_then_sync_attaches() {
        let mut mount = CommentMount::new();
        let thread = CommentThread::for_location("#/blog/a");
        mount.sync(&thread);
        mount.detach();
        assert_eq!(mount.sync(&thread), MountAction::Attach);
    }

    #[test]
    fn container_carries_thread_and_config() {
        let html = render_container(&enabled(), &CommentThread::for_location("#/blog/a"))
            .into_string();
        assert!(html.contains(r##"data-term="#/blog/a""##));
        assert!(html.contains(r#"data-mapping="specific""#));
        assert!(html.contains(r#"data-repo="me/site""#));
        assert!(html.contains(r#"data-theme="preferred_color_scheme""#));
    }

    #[test]
    fn disabled_renders_nothing() {
        let html = render_container(
            &CommentsConfig::default(),
            &CommentThread::for_location("#/blog/a"),
        )
        .into_string();
        assert!(html.is_empty());
    }
}
