use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::Collection;

/// Media type of every generated document.
pub const JSON: &str = "application/json";

/// Media type of the schema description.
pub const YAML: &str = "text/yaml";

/// The href root documents are linked under by default.
pub const DEFAULT_BASE: &str = "/apis";

/// A navigation link: `{rel, href, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: &'static str,
    pub href: String,
    #[serde(rename = "type")]
    pub media_type: &'static str,
}

impl Link {
    pub fn new(rel: &'static str, href: String) -> Link {
        Link { rel, href, media_type: JSON }
    }
}

/// A reference stub: `{ref, rel}` plus a few optional hint fields so a
/// client can render a listing without fetching every detail document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    #[serde(rename = "ref")]
    pub href: String,
    pub rel: &'static str,
    #[serde(flatten)]
    pub hints: Map<String, Value>,
}

impl Reference {
    pub fn new(rel: &'static str, href: String) -> Reference {
        Reference { href, rel, hints: Map::new() }
    }
}

/// Builds every href in the API from one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hrefs {
    base: String,
}

impl Default for Hrefs {
    fn default() -> Self {
        Hrefs::new(DEFAULT_BASE)
    }
}

impl Hrefs {
    pub fn new(base: &str) -> Hrefs {
        Hrefs { base: base.trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn identity(&self) -> String {
        format!("{}/identity.json", self.base)
    }

    pub fn config(&self) -> String {
        format!("{}/config.json", self.base)
    }

    pub fn index(&self, collection: Collection) -> String {
        format!("{}/{}/index.json", self.base, collection.name())
    }

    pub fn page(&self, collection: Collection, page: usize) -> String {
        format!("{}/{}/pages/{page}.json", self.base, collection.name())
    }

    pub fn detail(&self, collection: Collection, key: &str) -> String {
        format!("{}/{}/{}/{key}.json", self.base, collection.name(), collection.keyed_by())
    }

    /// The `describedby` link every document carries.
    pub fn schema(&self) -> Link {
        Link {
            rel: "describedby",
            href: format!("{}/openapi.yaml", self.base),
            media_type: YAML,
        }
    }
}

/// The number of pages `count` items fill: never fewer than one.
pub fn page_count(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_share_a_root() {
        let hrefs = Hrefs::new("/apis/");
        assert_eq!(hrefs.identity(), "/apis/identity.json");
        assert_eq!(hrefs.index(Collection::Projects), "/apis/projects/index.json");
        assert_eq!(hrefs.page(Collection::Pypi, 3), "/apis/pypi/pages/3.json");
        assert_eq!(hrefs.detail(Collection::Pypi, "pkg"), "/apis/pypi/by-name/pkg.json");
        assert_eq!(hrefs.detail(Collection::Experience, "acme"), "/apis/experience/by-id/acme.json");
        assert_eq!(hrefs.schema().href, "/apis/openapi.yaml");
        assert_eq!(hrefs.schema().media_type, "text/yaml");
    }

    #[test]
    fn page_counts() {
        assert_eq!(page_count(0, 50), 1);
        assert_eq!(page_count(1, 50), 1);
        assert_eq!(page_count(50, 50), 1);
        assert_eq!(page_count(51, 50), 2);
        assert_eq!(page_count(101, 50), 3);
    }

    #[test]
    fn references_flatten_hints() {
        let mut reference = Reference::new("item", "/apis/projects/by-slug/x.json".into());
        reference.hints.insert("name".into(), "X".into());

        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json, serde_json::json!({
            "ref": "/apis/projects/by-slug/x.json",
            "rel": "item",
            "name": "X",
        }));
    }
}
