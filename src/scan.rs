//! Content loading and entity registries.
//!
//! Reads a content directory into a [`Site`]: the merged configuration, the
//! blog and project registries, and the optional resume body.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                          # Content root
//! ├── config.toml                   # Site configuration (optional)
//! ├── resume.md                     # Resume page body (optional)
//! ├── assets/                       # Copied verbatim to the output root
//! ├── blog/
//! │   ├── 010-react-performance.json
//! │   └── 020-pytorch-course.json
//! └── projects/
//!     ├── 010-folio.json
//!     └── old-tool.json
//! ```
//!
//! ## Naming Conventions
//!
//! - One entity per `.json` file; other files are ignored.
//! - Registry order is file name order, so `NNN-` prefixes control it.
//! - The slug is the record's own `slug` field, else the file stem without
//!   its numeric prefix.
//!
//! ## Validation
//!
//! - Slugs must be URL-safe and unique within their registry.
//! - Heading ids must be unique within each document and must not shadow an
//!   element id the shell uses (`app`, `toast`, `route-table`, `view-*`).
//! - A file that is not a valid entity record fails the load; a single bad
//!   block inside a valid record only drops that block.

use crate::config::{self, SiteConfig};
use crate::content::{ContentEntity, EntityKind, RawEntity};
use crate::naming;
use crate::toc::{self, TocError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid entity record {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Duplicate {kind} slug '{slug}'")]
    DuplicateSlug { kind: &'static str, slug: String },
    #[error("Slug '{0}' is not URL-safe (use letters, digits, '-' and '_')")]
    InvalidSlug(String),
    #[error("In '{slug}': {source}")]
    Toc { slug: String, source: TocError },
}

/// The entities of one kind, in registry order. Immutable once built.
#[derive(Debug, Clone)]
pub struct Registry {
    kind: EntityKind,
    entities: Vec<ContentEntity>,
}

impl Registry {
    /// Validate and wrap `entities`.
    pub fn new(kind: EntityKind, entities: Vec<ContentEntity>) -> Result<Self, ScanError> {
        let mut seen = HashSet::new();
        for entity in &entities {
            if !naming::is_url_safe(&entity.slug) {
                return Err(ScanError::InvalidSlug(entity.slug.clone()));
            }
            if !seen.insert(entity.slug.as_str()) {
                return Err(ScanError::DuplicateSlug {
                    kind: kind.label(),
                    slug: entity.slug.clone(),
                });
            }
            toc::derive_toc(&entity.blocks).map_err(|source| ScanError::Toc {
                slug: entity.slug.clone(),
                source,
            })?;
        }
        Ok(Self { kind, entities })
    }

    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            entities: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, slug: &str) -> Option<&ContentEntity> {
        self.entities.iter().find(|e| e.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// Every entity, inactive ones included.
    pub fn entities(&self) -> &[ContentEntity] {
        &self.entities
    }

    /// Entities shown in listings.
    pub fn listed(&self) -> Vec<&ContentEntity> {
        self.entities.iter().filter(|e| e.active).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Everything loaded from a content directory.
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    pub blogs: Registry,
    pub projects: Registry,
    /// Raw markdown of `resume.md`.
    pub resume: Option<String>,
    /// `assets/` directory, when present.
    pub assets_dir: Option<PathBuf>,
}

impl Site {
    pub fn registry(&self, kind: EntityKind) -> &Registry {
        match kind {
            EntityKind::Blog => &self.blogs,
            EntityKind::Project => &self.projects,
        }
    }
}

pub fn scan(root: &Path) -> Result<Site, ScanError> {
    // Load site config (uses defaults if config.toml doesn't exist)
    let config = config::load_config(root)?;

    let blogs = load_registry(root, EntityKind::Blog)?;
    let projects = load_registry(root, EntityKind::Project)?;

    let resume_path = root.join("resume.md");
    let resume = if resume_path.is_file() {
        Some(fs::read_to_string(&resume_path)?)
    } else {
        None
    };

    let assets = root.join("assets");
    let assets_dir = assets.is_dir().then_some(assets);

    log::debug!(
        "scanned {}: {} blog posts, {} projects",
        root.display(),
        blogs.len(),
        projects.len()
    );

    Ok(Site {
        config,
        blogs,
        projects,
        resume,
        assets_dir,
    })
}

/// Load every record under `<root>/<kind dir>/`. A missing directory is an
/// empty registry.
pub fn load_registry(root: &Path, kind: EntityKind) -> Result<Registry, ScanError> {
    let dir = root.join(kind.dir_name());
    if !dir.is_dir() {
        log::debug!("no {} directory at {}", kind.dir_name(), dir.display());
        return Ok(Registry::empty(kind));
    }

    let mut entities = Vec::new();
    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_record(path) {
            continue;
        }
        entities.push(load_entity(root, path)?);
    }
    Registry::new(kind, entities)
}

fn is_record(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden
        && path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
}

fn load_entity(root: &Path, path: &Path) -> Result<ContentEntity, ScanError> {
    let text = fs::read_to_string(path)?;
    let raw: RawEntity = serde_json::from_str(&text).map_err(|source| ScanError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = naming::parse_stem(&stem);
    let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    Ok(raw.into_entity(&parsed.slug, relative))
}
