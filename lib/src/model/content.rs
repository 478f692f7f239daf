use std::ptr;

use serde::{Deserialize, Serialize};

use crate::url::HttpUrl;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Maintenance,
    Gone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub url: Option<HttpUrl>,
    #[serde(default)]
    pub repository_url: Option<HttpUrl>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub primary_language: Option<String>,
    /// Skill names this project is linked to regardless of its tags. Matched
    /// against skill names exactly, case included.
    #[serde(default)]
    pub related_skills: Vec<String>,
}

impl Project {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Project {
            slug: slug.into(),
            name: name.into(),
            description: String::new(),
            url: None,
            repository_url: None,
            tags: vec![],
            featured: false,
            status: ProjectStatus::Active,
            group: None,
            primary_language: None,
            related_skills: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyPIPackage {
    pub package_name: String,
    /// `owner/repo`, or empty when the package has no known repository.
    #[serde(default)]
    pub github_repo: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub downloads_monthly: u64,
    #[serde(default)]
    pub docs_url: Option<HttpUrl>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

impl PyPIPackage {
    pub fn new(package_name: impl Into<String>) -> Self {
        PyPIPackage {
            package_name: package_name.into(),
            github_repo: None,
            version: None,
            summary: None,
            downloads_monthly: 0,
            docs_url: None,
            last_updated: None,
            tags: vec![],
            featured: false,
        }
    }

    /// The normalized `owner/repo` key: trimmed and lowercased, `None` if
    /// there's no repository.
    pub fn repo_key(&self) -> Option<String> {
        let repo = self.github_repo.as_deref()?.trim();
        (!repo.is_empty()).then(|| repo.to_lowercase())
    }
}

/// The capability set every content item exposes to the skill linker. A
/// missing field is simply an empty set.
pub trait Linkable {
    fn tags(&self) -> &[String];

    fn primary_language(&self) -> Option<&str> {
        None
    }

    fn related_skills(&self) -> &[String] {
        &[]
    }

    /// Tags the item carries without declaring them.
    fn implicit_tags(&self) -> &'static [&'static str] {
        &[]
    }
}

impl Linkable for Project {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn primary_language(&self) -> Option<&str> {
        self.primary_language.as_deref()
    }

    fn related_skills(&self) -> &[String] {
        &self.related_skills
    }
}

impl Linkable for PyPIPackage {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn implicit_tags(&self) -> &'static [&'static str] {
        &["python"]
    }
}

/// A borrowed project or package.
///
/// Two items are equal only if they're the _same_ item: equality is by
/// identity, so two distinct projects with identical fields are different
/// items.
#[derive(Debug, Clone, Copy)]
pub enum ContentItem<'a> {
    Project(&'a Project),
    Package(&'a PyPIPackage),
}

impl<'a> ContentItem<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ContentItem::Project(p) => &p.name,
            ContentItem::Package(p) => &p.package_name,
        }
    }

    pub fn linkable(&self) -> &'a dyn Linkable {
        match *self {
            ContentItem::Project(p) => p as &'a dyn Linkable,
            ContentItem::Package(p) => p,
        }
    }
}

impl PartialEq for ContentItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ContentItem::Project(a), ContentItem::Project(b)) => ptr::eq(*a, *b),
            (ContentItem::Package(a), ContentItem::Package(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for ContentItem<'_> { }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_items_compare_by_identity() {
        let a = Project::new("same", "Same");
        let b = a.clone();

        assert_eq!(ContentItem::Project(&a), ContentItem::Project(&a));
        assert_ne!(ContentItem::Project(&a), ContentItem::Project(&b));
    }

    #[test]
    fn packages_are_implicitly_python() {
        let package = PyPIPackage::new("pkg");
        assert_eq!(package.implicit_tags(), &["python"]);
        assert!(Linkable::related_skills(&package).is_empty());
        assert_eq!(Linkable::primary_language(&package), None);
    }

    #[test]
    fn repo_keys_are_normalized() {
        let mut package = PyPIPackage::new("pkg");
        assert_eq!(package.repo_key(), None);

        package.github_repo = Some("   ".into());
        assert_eq!(package.repo_key(), None);

        package.github_repo = Some(" Owner/Repo ".into());
        assert_eq!(package.repo_key().as_deref(), Some("owner/repo"));
    }

    #[test]
    fn projects_deserialize_with_defaults() {
        let project: Project = toml::from_str(r#"
            slug = "demo"
            name = "Demo"
            description = "A demo."
            repository_url = "https://github.com/me/demo"
        "#).unwrap();

        assert_eq!(project.status, ProjectStatus::Active);
        assert!(!project.featured);
        assert!(project.tags.is_empty() && project.related_skills.is_empty());
        assert_eq!(project.repository_url.unwrap().host(), "github.com");
    }
}
