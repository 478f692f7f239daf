pub mod minijinja;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// What an engine is initialized with.
#[derive(Debug, Clone)]
pub struct EngineSetup<'a, G> {
    /// The theme's template directory; template names are relative to it.
    pub templates: &'a Path,
    /// The directory `include_content()` reads from.
    pub content: PathBuf,
    /// Lowercased skill term → skill page slug, for the `skill_link` filter.
    pub skill_links: BTreeMap<String, String>,
    /// Values visible to every template. Must serialize as a map; each key
    /// becomes a global.
    pub globals: &'a G,
}

pub trait EngineInit {
    type Engine: Engine + 'static;

    fn init<G: Serialize>(setup: EngineSetup<'_, G>) -> Self::Engine;
}

pub trait Engine: Send + Sync + Debug {
    /// Renders the template `name` with only the globals in scope.
    fn render(&self, name: &str) -> Result<String>;

    /// Renders the template `name` with `context` layered over the globals.
    fn render_with(&self, name: &str, context: &serde_json::Value) -> Result<String>;
}
