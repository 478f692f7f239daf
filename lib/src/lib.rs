#![doc = svgbobdoc::transform!(
//! A library for building portfolio and résumé sites.
//!
//! # Overview
//!
//! Vitae reads a site's structured data (identity, projects, packages, work
//! history, résumé artifacts) and emits Markdown and HTML pages from a theme's
//! templates alongside a static, paginated, read-only JSON API.
//!
//! A build runs as follows:
//!
//! ```svgbob
//!  +----------+    +----------+    +-----------+
//!  | data/*   |--->| CMSConfig|--->| featured  |
//!  | .toml    |    +----+-----+    | flags     |
//!  +----------+         |          +-----+-----+
//!                       |                |
//!                       v                v
//!               +-------+------+   +-----+-------+
//!               | SkillIndex   |   | StaticApi   |---> docs/apis/
//!               | skill<->item |   | _links/_rels|
//!               +-------+------+   +-------------+
//!                       |
//!                       v
//!               +-------+------+
//!               | templates    |---> docs/, docs/md/, docs/skills/,
//!               | (minijinja)  |     README.md
//!               +--------------+
//! ```
//!
//!   * **Configuration** is loaded once from `readme_cms.toml` and `data/`
//!     into a [`CMSConfig`](model::CMSConfig). Ungrouped projects are given a
//!     group inferred from their most common tags.
//!
//!   * **Featured flags** are assigned from the identity's per-mode name
//!     lists. Every flag is set on every build, so switching modes never
//!     leaves stale flags behind.
//!
//!   * The **skill index** maps every skill to the projects and packages
//!     whose tags, primary language or explicit `related_skills` name it, and
//!     every skill name and alias to the skill's page slug.
//!
//!   * The **static API** writes a detail document per entity, fixed-size
//!     pages of reference stubs, and an index per collection. Relationships
//!     are references, never embedded copies.
//!
//!   * **Pages** are rendered from the theme's templates with the whole model
//!     in scope.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod url;
pub mod format;
pub mod model;
pub mod config;
pub mod grouping;
pub mod featured;
pub mod relations;
pub mod api;
pub mod templating;
pub mod builder;
pub mod audit;
pub mod skills;

pub use error::{Error, Result};
pub use builder::{Builder, BuildOptions, BuildReport};

#[doc(hidden)]
pub use {serde_json, tracing};
