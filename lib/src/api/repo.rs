use memchr::memmem;
use rustc_hash::FxHashMap;

use crate::model::{Project, PyPIPackage};

const GITHUB: &[u8] = b"github.com/";

/// Extracts `owner/repo`, lowercased, from anything containing
/// `github.com/owner/repo`. Trailing segments are ignored. Returns `None`
/// instead of failing on anything it can't make sense of.
pub fn parse_owner_repo(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let start = memmem::find(lower.as_bytes(), GITHUB)? + GITHUB.len();

    let mut segments = lower[start..].split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    Some(format!("{owner}/{repo}"))
}

/// The project ↔ package relationship, inferred by matching a package's
/// `github_repo` against the `owner/repo` of a project's repository URL.
#[derive(Debug, Default)]
pub struct RepoLinks<'a> {
    packages: FxHashMap<String, Vec<&'a PyPIPackage>>,
    projects: FxHashMap<String, &'a Project>,
}

impl<'a> RepoLinks<'a> {
    /// Both slices must be in their collection's sort order: a project's
    /// packages are listed in package order, and if several projects share a
    /// repository, the first project wins.
    pub fn build(projects: &[&'a Project], packages: &[&'a PyPIPackage]) -> RepoLinks<'a> {
        let mut links = RepoLinks::default();
        for package in packages {
            if let Some(key) = package.repo_key() {
                links.packages.entry(key).or_default().push(*package);
            }
        }

        for project in projects {
            let Some(key) = project_repo(project) else { continue };
            match links.projects.get(&key) {
                Some(first) => tracing::warn!(
                    repo = %key, kept = %first.slug, ignored = %project.slug,
                    "repository claimed by more than one project"
                ),
                None => { links.projects.insert(key, *project); }
            }
        }

        links
    }

    /// The packages published from `project`'s repository.
    pub fn packages_of(&self, project: &Project) -> &[&'a PyPIPackage] {
        project_repo(project)
            .and_then(|key| self.packages.get(&key))
            .map(|packages| packages.as_slice())
            .unwrap_or(&[])
    }

    /// The project whose repository `package` is published from.
    pub fn project_of(&self, package: &PyPIPackage) -> Option<&'a Project> {
        self.projects.get(&package.repo_key()?).copied()
    }
}

fn project_repo(project: &Project) -> Option<String> {
    parse_owner_repo(project.repository_url.as_ref()?.as_str())
}
