//! The static, file-based JSON API.
//!
//! Every collection gets one detail document per entity, a series of page
//! documents holding reference stubs, and an index document. Singletons
//! (`identity.json`, `config.json`) carry only `_links`. Relationships are
//! expressed as references in `_rels`, never as embedded copies.
//!
//! ```text
//! identity.json
//! config.json
//! projects/   by-slug/{slug}.json          pages/{n}.json  index.json
//! pypi/       by-name/{package_name}.json  pages/{n}.json  index.json
//! experience/ by-id/{id}.json              pages/{n}.json  index.json
//! resumes/    by-id/{id}.json              pages/{n}.json  index.json
//! ```

mod links;
mod collection;
mod repo;

use std::path::{Path, PathBuf};

pub use links::*;
pub use collection::*;
pub use repo::*;

use crate::error::{Chainable, Result};
use crate::format::{Json, write_file};
use crate::model::CMSConfig;

/// The number of references on every page.
pub const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct StaticApi {
    hrefs: Hrefs,
    page_size: usize,
}

impl Default for StaticApi {
    fn default() -> Self {
        StaticApi { hrefs: Hrefs::default(), page_size: PAGE_SIZE }
    }
}

/// Everything the API consists of, serialized, in write order.
#[derive(Debug, Clone)]
pub struct RenderedApi {
    pub singletons: Vec<Document>,
    pub collections: Vec<RenderedCollection>,
}

impl RenderedApi {
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.singletons.iter()
            .chain(self.collections.iter().flat_map(|c| c.documents.iter()))
    }

    pub fn collection(&self, collection: Collection) -> Option<&RenderedCollection> {
        self.collections.iter().find(|c| c.collection == collection)
    }
}

impl StaticApi {
    pub fn new(base: &str) -> StaticApi {
        StaticApi { hrefs: Hrefs::new(base), ..StaticApi::default() }
    }

    pub fn hrefs(&self) -> &Hrefs {
        &self.hrefs
    }

    /// Serializes every document without writing anything.
    pub fn render(&self, config: &CMSConfig) -> Result<RenderedApi> {
        let hrefs = &self.hrefs;

        let identity = Detail {
            body: &config.identity,
            links: vec![Link::new("self", hrefs.identity()), hrefs.schema()],
            rels: None,
        };

        let modes = Detail {
            body: &config.modes,
            links: vec![Link::new("self", hrefs.config()), hrefs.schema()],
            rels: None,
        };

        let singletons = vec![
            Document {
                path: PathBuf::from("identity.json"),
                bytes: Json::to_vec(&identity).chain(error!("failed to serialize identity document"))?,
            },
            Document {
                path: PathBuf::from("config.json"),
                bytes: Json::to_vec(&modes).chain(error!("failed to serialize config document"))?,
            },
        ];

        let projects = sort_projects(&config.projects);
        let packages = sort_packages(&config.pypi_packages);
        let experience = sort_experience(&config.work_experience);
        let resumes = sort_resumes(&config.resumes);
        let repos = RepoLinks::build(&projects, &packages);

        let collections = vec![
            render_collection(hrefs, self.page_size, &projects, |project| {
                let refs = repos.packages_of(project).iter()
                    .map(|p| Reference::new("related", hrefs.detail(Collection::Pypi, &p.package_name)))
                    .collect();

                Rels::from([("pypi_packages", refs)])
            })?,
            render_collection(hrefs, self.page_size, &packages, |package| {
                let refs = repos.project_of(package).into_iter()
                    .map(|p| Reference::new("related", hrefs.detail(Collection::Projects, &p.slug)))
                    .collect();

                Rels::from([("github_project", refs)])
            })?,
            render_collection(hrefs, self.page_size, &experience, |_| Rels::new())?,
            render_collection(hrefs, self.page_size, &resumes, |_| Rels::new())?,
        ];

        Ok(RenderedApi { singletons, collections })
    }

    /// Renders the API and writes it under `out`.
    ///
    /// Nothing is written unless every document serializes. Within each
    /// collection, detail documents are written before pages and pages
    /// before the index, so an interrupted write never leaves an index
    /// pointing at documents that don't exist.
    pub fn write(&self, config: &CMSConfig, out: &Path) -> Result<RenderedApi> {
        let api = self.render(config)?;
        for document in &api.singletons {
            write_file(&out.join(&document.path), &document.bytes)?;
        }

        for rendered in &api.collections {
            let name = rendered.collection.name();
            for document in &rendered.documents {
                write_file(&out.join(&document.path), &document.bytes).chain_with(|| error! {
                    "failed to write API document",
                    "collection" => name,
                    "document" => document.path.display(),
                })?;
            }

            tracing::info!(collection = name, count = rendered.count, pages = rendered.pages,
                "wrote API collection");
        }

        Ok(api)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::model::*;
    use crate::url::HttpUrl;

    fn read(dir: &Path, path: &str) -> Value {
        serde_json::from_slice(&std::fs::read(dir.join(path)).unwrap()).unwrap()
    }

    fn config() -> CMSConfig {
        let mut config = CMSConfig::new(Identity::new("Ada", "Engineer"));
        config.projects = vec![
            Project {
                repository_url: Some(HttpUrl::parse("https://github.com/ada/engine").unwrap()),
                ..Project::new("engine", "Engine")
            },
            Project::new("Archive", "Archive"),
        ];

        config.pypi_packages = vec![
            PyPIPackage { github_repo: Some("Ada/Engine".into()), ..PyPIPackage::new("engine-py") },
            PyPIPackage::new("standalone"),
        ];

        config.work_experience = vec![WorkExperienceEntry::new("acme", "Acme", "Engineer", "2021-02")];
        config
    }

    #[test]
    fn writes_the_full_tree() {
        let dir = tempfile::tempdir().unwrap();
        let api = StaticApi::default().write(&config(), dir.path()).unwrap();
        let out = dir.path();

        for path in [
            "identity.json", "config.json",
            "projects/by-slug/engine.json", "projects/by-slug/Archive.json",
            "projects/pages/1.json", "projects/index.json",
            "pypi/by-name/engine-py.json", "pypi/by-name/standalone.json",
            "pypi/pages/1.json", "pypi/index.json",
            "experience/by-id/acme.json", "experience/pages/1.json", "experience/index.json",
            "resumes/pages/1.json", "resumes/index.json",
        ] {
            assert!(out.join(path).is_file(), "missing {path}");
        }

        assert_eq!(api.documents().count(), 15);

        let identity = read(out, "identity.json");
        assert_eq!(identity["name"], "Ada");
        assert!(identity.get("_rels").is_none());
        assert_eq!(identity["_links"][0]["href"], "/apis/identity.json");

        let modes = read(out, "config.json");
        assert_eq!(modes["current"], "project_promotion");
        assert_eq!(modes["_links"][1]["rel"], "describedby");
    }

    #[test]
    fn projects_and_packages_reference_each_other() {
        let dir = tempfile::tempdir().unwrap();
        StaticApi::default().write(&config(), dir.path()).unwrap();

        let engine = read(dir.path(), "projects/by-slug/engine.json");
        assert_eq!(engine["_rels"], json!({
            "pypi_packages": [{"ref": "/apis/pypi/by-name/engine-py.json", "rel": "related"}]
        }));

        let archive = read(dir.path(), "projects/by-slug/Archive.json");
        assert_eq!(archive["_rels"], json!({ "pypi_packages": [] }));

        let package = read(dir.path(), "pypi/by-name/engine-py.json");
        assert_eq!(package["_rels"], json!({
            "github_project": [{"ref": "/apis/projects/by-slug/engine.json", "rel": "related"}]
        }));

        let standalone = read(dir.path(), "pypi/by-name/standalone.json");
        assert_eq!(standalone["_rels"]["github_project"], json!([]));
    }

    #[test]
    fn indexes_follow_sort_order() {
        let dir = tempfile::tempdir().unwrap();
        StaticApi::default().write(&config(), dir.path()).unwrap();

        let index = read(dir.path(), "projects/index.json");
        let refs: Vec<_> = index["refs"].as_array().unwrap().iter()
            .map(|r| r["ref"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(refs, ["/apis/projects/by-slug/Archive.json", "/apis/projects/by-slug/engine.json"]);
    }

    #[test]
    fn every_collection_satisfies_the_page_invariant() {
        let mut config = config();
        config.projects = (0..101).map(|i| Project::new(format!("p{i}"), "P")).collect();

        let api = StaticApi::default().render(&config).unwrap();
        for rendered in &api.collections {
            let pages: Vec<Value> = rendered.documents.iter()
                .filter(|d| d.path.parent().map_or(false, |p| p.ends_with("pages")))
                .map(|d| serde_json::from_slice(&d.bytes).unwrap())
                .collect();

            let index: Value = serde_json::from_slice(&rendered.documents.last().unwrap().bytes).unwrap();
            let count = index["meta"]["count"].as_u64().unwrap() as usize;
            let refs: usize = pages.iter().map(|p| p["refs"].as_array().unwrap().len()).sum();

            assert_eq!(refs, count);
            assert_eq!(pages.len(), page_count(count, PAGE_SIZE));
        }

        assert_eq!(api.collection(Collection::Projects).unwrap().pages, 3);
        assert_eq!(api.collection(Collection::Resumes).unwrap().count, 0);
    }

    #[test]
    fn custom_base() {
        let api = StaticApi::new("/v1/").render(&config()).unwrap();
        let identity: Value = serde_json::from_slice(&api.singletons[0].bytes).unwrap();
        assert_eq!(identity["_links"][1]["href"], "/v1/openapi.yaml");
    }
}
