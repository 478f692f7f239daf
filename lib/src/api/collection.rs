use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::{Hrefs, Link, Reference, page_count};
use crate::error::{Chainable, Result};
use crate::format::Json;
use crate::model::*;
use crate::util::hints;

/// The paginated collections of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Projects,
    Pypi,
    Experience,
    Resumes,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Projects,
        Collection::Pypi,
        Collection::Experience,
        Collection::Resumes,
    ];

    /// The collection's directory and its `meta.type`.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Pypi => "pypi",
            Collection::Experience => "experience",
            Collection::Resumes => "resumes",
        }
    }

    /// The directory detail documents live in, named for their key.
    pub fn keyed_by(self) -> &'static str {
        match self {
            Collection::Projects => "by-slug",
            Collection::Pypi => "by-name",
            Collection::Experience | Collection::Resumes => "by-id",
        }
    }
}

/// Relationship name → references to the related documents.
pub type Rels = BTreeMap<&'static str, Vec<Reference>>;

/// An entity with its own detail document.
pub trait Resource: Serialize {
    const COLLECTION: Collection;

    /// The natural identifier the detail document is keyed by.
    fn key(&self) -> &str;

    /// Fields copied into the entity's reference stub.
    fn hints(&self) -> Map<String, Value>;
}

impl Resource for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn key(&self) -> &str {
        &self.slug
    }

    fn hints(&self) -> Map<String, Value> {
        hints!("name" => &self.name, "status" => self.status)
    }
}

impl Resource for PyPIPackage {
    const COLLECTION: Collection = Collection::Pypi;

    fn key(&self) -> &str {
        &self.package_name
    }

    fn hints(&self) -> Map<String, Value> {
        hints!("package_name" => &self.package_name, "version" => &self.version)
    }
}

impl Resource for WorkExperienceEntry {
    const COLLECTION: Collection = Collection::Experience;

    fn key(&self) -> &str {
        &self.id
    }

    fn hints(&self) -> Map<String, Value> {
        hints! {
            "organization" => &self.organization,
            "title" => &self.title,
            "end_date" => &self.end_date,
        }
    }
}

impl Resource for ResumeArtifact {
    const COLLECTION: Collection = Collection::Resumes;

    fn key(&self) -> &str {
        &self.id
    }

    fn hints(&self) -> Map<String, Value> {
        hints!("label" => &self.label, "status" => self.status, "format" => self.format)
    }
}

/// Projects by slug, case-insensitively.
pub fn sort_projects(projects: &[Project]) -> Vec<&Project> {
    let mut sorted: Vec<_> = projects.iter().collect();
    sorted.sort_by_cached_key(|p| p.slug.to_lowercase());
    sorted
}

/// Packages by name, case-insensitively.
pub fn sort_packages(packages: &[PyPIPackage]) -> Vec<&PyPIPackage> {
    let mut sorted: Vec<_> = packages.iter().collect();
    sorted.sort_by_cached_key(|p| p.package_name.to_lowercase());
    sorted
}

/// Experience by `(start_date, id)`, descending. Dates compare as strings.
pub fn sort_experience(entries: &[WorkExperienceEntry]) -> Vec<&WorkExperienceEntry> {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| (&b.start_date, &b.id).cmp(&(&a.start_date, &a.id)));
    sorted
}

/// Active résumés first, then by `valid_from` and `id`, both descending.
pub fn sort_resumes(resumes: &[ResumeArtifact]) -> Vec<&ResumeArtifact> {
    let mut sorted: Vec<_> = resumes.iter().collect();
    sorted.sort_by(|a, b| {
        let inactive = |r: &ResumeArtifact| r.status != ResumeStatus::Active;
        inactive(a).cmp(&inactive(b))
            .then_with(|| b.valid_from.cmp(&a.valid_from))
            .then_with(|| b.id.cmp(&a.id))
    });

    sorted
}

/// A serialized document and its path relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// An entity's fields followed by its `_links` and, for collection
/// members, its `_rels`.
#[derive(Serialize)]
pub(crate) struct Detail<'a, T: Serialize> {
    #[serde(flatten)]
    pub body: &'a T,
    #[serde(rename = "_links")]
    pub links: Vec<Link>,
    #[serde(rename = "_rels", skip_serializing_if = "Option::is_none")]
    pub rels: Option<Rels>,
}

#[derive(Serialize)]
struct IndexMeta {
    #[serde(rename = "type")]
    kind: &'static str,
    count: usize,
    page_size: usize,
    pages: usize,
}

#[derive(Serialize)]
struct PageMeta {
    #[serde(rename = "type")]
    kind: &'static str,
    page: usize,
    page_size: usize,
    pages: usize,
    total: usize,
}

#[derive(Serialize)]
struct Listing<'a, M> {
    refs: &'a [Reference],
    meta: M,
    #[serde(rename = "_links")]
    links: Vec<Link>,
}

/// Every document of one collection, in the order they should be written:
/// detail documents, then pages, then the index.
#[derive(Debug, Clone)]
pub struct RenderedCollection {
    pub collection: Collection,
    pub count: usize,
    pub pages: usize,
    pub documents: Vec<Document>,
}

/// Renders the detail, page and index documents of `items`, which must
/// already be in the collection's sort order. `rels` yields each item's
/// `_rels`.
///
/// Nothing is written here, so a failure to serialize any one document
/// fails the whole collection before anything reaches the disk.
pub fn render_collection<T, F>(
    hrefs: &Hrefs,
    page_size: usize,
    items: &[&T],
    rels: F,
) -> Result<RenderedCollection>
    where T: Resource, F: Fn(&T) -> Rels
{
    let collection = T::COLLECTION;
    let name = collection.name();
    let page_size = page_size.max(1);
    let pages = page_count(items.len(), page_size);
    let mut documents = Vec::with_capacity(items.len() + pages + 1);

    let mut refs = Vec::with_capacity(items.len());
    for item in items {
        let key = item.key();
        let detail = Detail {
            body: *item,
            links: vec![
                Link::new("self", hrefs.detail(collection, key)),
                Link::new("collection", hrefs.index(collection)),
                Link::new("first", hrefs.page(collection, 1)),
                hrefs.schema(),
            ],
            rels: Some(rels(*item)),
        };

        let bytes = Json::to_vec(&detail).chain_with(|| error! {
            "failed to serialize detail document",
            "collection" => name,
            "id" => key,
        })?;

        let path = PathBuf::from(name).join(collection.keyed_by()).join(format!("{key}.json"));
        documents.push(Document { path, bytes });

        let mut reference = Reference::new("item", hrefs.detail(collection, key));
        reference.hints = item.hints();
        refs.push(reference);
    }

    for page in 1..=pages {
        let start = ((page - 1) * page_size).min(refs.len());
        let end = (start + page_size).min(refs.len());

        let mut links = vec![
            Link::new("self", hrefs.page(collection, page)),
            Link::new("collection", hrefs.index(collection)),
            Link::new("first", hrefs.page(collection, 1)),
            Link::new("last", hrefs.page(collection, pages)),
        ];

        if page > 1 {
            links.push(Link::new("prev", hrefs.page(collection, page - 1)));
        }

        if page < pages {
            links.push(Link::new("next", hrefs.page(collection, page + 1)));
        }

        links.push(hrefs.schema());
        let listing = Listing {
            refs: &refs[start..end],
            meta: PageMeta { kind: name, page, page_size, pages, total: refs.len() },
            links,
        };

        let bytes = Json::to_vec(&listing).chain_with(|| error! {
            "failed to serialize page document",
            "collection" => name,
            "page" => page,
        })?;

        let path = PathBuf::from(name).join("pages").join(format!("{page}.json"));
        documents.push(Document { path, bytes });
    }

    let index = Listing {
        refs: &refs,
        meta: IndexMeta { kind: name, count: refs.len(), page_size, pages },
        links: vec![
            Link::new("self", hrefs.index(collection)),
            Link::new("first", hrefs.page(collection, 1)),
            Link::new("last", hrefs.page(collection, pages)),
            hrefs.schema(),
        ],
    };

    let bytes = Json::to_vec(&index).chain_with(|| error! {
        "failed to serialize index document",
        "collection" => name,
    })?;

    documents.push(Document { path: PathBuf::from(name).join("index.json"), bytes });
    Ok(RenderedCollection { collection, count: items.len(), pages, documents })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn url(s: &str) -> crate::url::HttpUrl {
        crate::url::HttpUrl::parse(s).unwrap()
    }

    fn parse(document: &Document) -> Value {
        serde_json::from_slice(&document.bytes).unwrap()
    }

    fn find<'a>(rendered: &'a RenderedCollection, path: &str) -> &'a Document {
        rendered.documents.iter().find(|d| d.path == PathBuf::from(path)).unwrap()
    }

    #[test]
    fn sort_orders() {
        let projects = vec![Project::new("beta", "B"), Project::new("Alpha", "A"), Project::new("gamma", "G")];
        let slugs: Vec<_> = sort_projects(&projects).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["Alpha", "beta", "gamma"]);

        let packages = vec![PyPIPackage::new("zeta"), PyPIPackage::new("Eta")];
        let names: Vec<_> = sort_packages(&packages).iter().map(|p| p.package_name.as_str()).collect();
        assert_eq!(names, ["Eta", "zeta"]);

        let experience = vec![
            WorkExperienceEntry::new("a", "A", "T", "2019-05"),
            WorkExperienceEntry::new("b", "B", "T", "2021"),
            WorkExperienceEntry::new("c", "C", "T", "2021"),
        ];

        let ids: Vec<_> = sort_experience(&experience).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn active_resumes_first() {
        let artifact = |id: &str, status, from: Option<&str>| ResumeArtifact {
            status,
            valid_from: from.map(Into::into),
            ..ResumeArtifact::new(id, id, url("https://example.com/cv.pdf"))
        };

        let resumes = vec![
            artifact("old", ResumeStatus::Active, Some("2020-01")),
            artifact("draft", ResumeStatus::Draft, Some("2025-01")),
            artifact("new", ResumeStatus::Active, Some("2024-06")),
            artifact("undated", ResumeStatus::Active, None),
            artifact("expired", ResumeStatus::Expired, Some("2019-01")),
        ];

        let ids: Vec<_> = sort_resumes(&resumes).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["new", "old", "undated", "draft", "expired"]);
    }

    #[test]
    fn empty_collection_has_one_page() {
        let rendered = render_collection::<Project, _>(&Hrefs::default(), 50, &[], |_| Rels::new()).unwrap();
        assert_eq!(rendered.count, 0);
        assert_eq!(rendered.pages, 1);
        assert_eq!(rendered.documents.len(), 2);

        let page = parse(find(&rendered, "projects/pages/1.json"));
        assert_eq!(page["refs"], json!([]));
        assert_eq!(page["meta"], json!({"type": "projects", "page": 1, "page_size": 50, "pages": 1, "total": 0}));

        let index = parse(find(&rendered, "projects/index.json"));
        assert_eq!(index["meta"]["count"], 0);
        assert_eq!(index["_links"][2]["href"], "/apis/projects/pages/1.json");
    }

    #[test]
    fn pages_partition_the_index() {
        let packages: Vec<_> = (0..120).map(|i| PyPIPackage::new(format!("pkg{i:03}"))).collect();
        let sorted = sort_packages(&packages);
        let rendered = render_collection(&Hrefs::default(), 50, &sorted, |_| Rels::new()).unwrap();
        assert_eq!(rendered.pages, 3);

        let index = parse(rendered.documents.last().unwrap());
        assert_eq!(index["meta"], json!({"type": "pypi", "count": 120, "page_size": 50, "pages": 3}));

        let mut total = 0;
        let mut refs = vec![];
        for page in 1..=3 {
            let doc = parse(find(&rendered, &format!("pypi/pages/{page}.json")));
            let page_refs = doc["refs"].as_array().unwrap();
            total += page_refs.len();
            refs.extend(page_refs.iter().cloned());

            let rels: Vec<_> = doc["_links"].as_array().unwrap().iter()
                .map(|l| l["rel"].as_str().unwrap().to_string())
                .collect();

            match page {
                1 => assert_eq!(rels, ["self", "collection", "first", "last", "next", "describedby"]),
                2 => assert_eq!(rels, ["self", "collection", "first", "last", "prev", "next", "describedby"]),
                _ => assert_eq!(rels, ["self", "collection", "first", "last", "prev", "describedby"]),
            }
        }

        assert_eq!(total, 120);
        assert_eq!(&refs, index["refs"].as_array().unwrap());
    }

    #[test]
    fn details_carry_fields_links_and_rels() {
        let mut project = Project::new("demo", "Demo");
        project.tags = vec!["cli".into()];
        let rendered = render_collection(&Hrefs::default(), 50, &[&project], |p| {
            let mut rels = Rels::new();
            let href = format!("/apis/pypi/by-name/{}.json", p.slug);
            rels.insert("pypi_packages", vec![Reference::new("related", href)]);
            rels
        }).unwrap();

        let detail = parse(find(&rendered, "projects/by-slug/demo.json"));
        assert_eq!(detail["slug"], "demo");
        assert_eq!(detail["tags"], json!(["cli"]));
        assert_eq!(detail["status"], "active");
        assert_eq!(detail["_links"], json!([
            {"rel": "self", "href": "/apis/projects/by-slug/demo.json", "type": "application/json"},
            {"rel": "collection", "href": "/apis/projects/index.json", "type": "application/json"},
            {"rel": "first", "href": "/apis/projects/pages/1.json", "type": "application/json"},
            {"rel": "describedby", "href": "/apis/openapi.yaml", "type": "text/yaml"},
        ]));

        assert_eq!(detail["_rels"], json!({
            "pypi_packages": [{"ref": "/apis/pypi/by-name/demo.json", "rel": "related"}]
        }));

        let index = parse(find(&rendered, "projects/index.json"));
        assert_eq!(index["refs"], json!([{
            "ref": "/apis/projects/by-slug/demo.json",
            "rel": "item",
            "name": "Demo",
            "status": "active",
        }]));
    }

    #[test]
    fn documents_are_ordered_details_pages_index() {
        let entries = vec![WorkExperienceEntry::new("acme", "Acme", "Dev", "2020")];
        let sorted = sort_experience(&entries);
        let rendered = render_collection(&Hrefs::default(), 50, &sorted, |_| Rels::new()).unwrap();

        let paths: Vec<_> = rendered.documents.iter().map(|d| d.path.clone()).collect();
        assert_eq!(paths, [
            PathBuf::from("experience/by-id/acme.json"),
            PathBuf::from("experience/pages/1.json"),
            PathBuf::from("experience/index.json"),
        ]);

        let detail = parse(&rendered.documents[0]);
        assert_eq!(detail["_rels"], json!({}));
    }
}
