//! # Folio
//!
//! A generator for single-page portfolio and blog sites. Blog posts and
//! projects are JSON records whose document bodies are lists of typed blocks;
//! the build turns them into one `index.html` that picks its view from the
//! location fragment (`#/blog/<slug>`, `#/project/<slug>`, ...).
//!
//! # Architecture
//!
//! ```text
//! 1. Scan      content/  →  Site        (records → registries + config)
//! 2. Generate  Site      →  dist/       (shell, one template per view)
//! ```
//!
//! The in-page behaviour (routing, active-section tracking, category filters,
//! pagination, share buttons, comments) is modelled in Rust by [`session`] and
//! mirrored by the embedded shell script. Every decision the script makes has a
//! pure Rust counterpart here that the test suite exercises.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Content block model: typed blocks, entities, tolerant decoding |
//! | [`rich_text`] | Inline markup subset with sanitizing parser |
//! | [`highlight`] | Code highlighting with syntect |
//! | [`render`] | Block renderer: blocks to markup |
//! | [`toc`] | Table of contents, observation band, section navigator |
//! | [`observer`] | Intersection subscriptions owned by a mounted document |
//! | [`route`] | Location fragment to route resolution |
//! | [`listing`] | Ordering, featured selection, category filter and pagination |
//! | [`share`] | Share intents and copy-link, behind clipboard/window traits |
//! | [`comments`] | Discussion widget container and mount tracking |
//! | [`views`] | Page templates, one per route |
//! | [`session`] | One reader's navigation state across route changes |
//! | [`scan`] | Loads records, resume and assets from the content directory |
//! | [`generate`] | Writes the single-page shell |
//! | [`config`] | `config.toml` loading, validation, merging and CSS generation |
//! | [`naming`] | `NNN-slug` file name convention |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Closed Block Union
//!
//! Blocks decode into a closed enum. Unknown or incomplete blocks are dropped
//! one at a time with a warning, so content written for a newer renderer
//! still loads. Inside the crate every block kind is matched exhaustively.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Template variables are Rust expressions and all interpolation
//! is auto-escaped; the only unescaped fragments are the sanitized rich text,
//! the highlighter output and the resume markdown with raw HTML removed.
//!
//! ## One Document, Many Templates
//!
//! Every view is rendered at build time into a `<template>`. The shell script
//! only chooses which template to show and fills the few slots that depend on
//! the location. The output works on any static file server.

pub mod comments;
pub mod config;
pub mod content;
pub mod generate;
pub mod highlight;
pub mod listing;
pub mod naming;
pub mod observer;
pub mod output;
pub mod render;
pub mod rich_text;
pub mod route;
pub mod scan;
pub mod session;
pub mod share;
pub mod toc;
pub mod views;

#[cfg(test)]
pub(crate) mod test_helpers;
