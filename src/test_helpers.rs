//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup plus small builders and lookups for content
//! entities and registries.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = scan(tmp.path()).unwrap();
//!
//! let post = find_entity(&site.blogs, "react-performance");
//! assert!(post.active);
//!
//! let blogs = registry(EntityKind::Blog, vec![entity("a"), entity("b")]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::content::{ContentEntity, EntityKind};
use crate::naming::display_title;
use crate::scan::Registry;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Builders
// =========================================================================

/// An active entity with no blocks, titled after its slug.
pub fn entity(slug: &str) -> ContentEntity {
    ContentEntity {
        slug: slug.to_string(),
        title: display_title(slug),
        active: true,
        ..Default::default()
    }
}

/// A registry of `entities`. Panics if they do not form a valid registry.
pub fn registry(kind: EntityKind, entities: Vec<ContentEntity>) -> Registry {
    Registry::new(kind, entities).unwrap()
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find an entity by slug. Panics with the available slugs if not found.
pub fn find_entity<'a>(registry: &'a Registry, slug: &str) -> &'a ContentEntity {
    registry.get(slug).unwrap_or_else(|| {
        let available: Vec<&str> = registry.entities().iter().map(|e| e.slug.as_str()).collect();
        panic!(
            "{} entity '{}' not found. Available: {:?}",
            registry.kind().label(),
            slug,
            available
        )
    })
}
