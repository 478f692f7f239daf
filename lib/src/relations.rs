//! The skill ↔ content relationship index.
//!
//! An item is linked to a skill when either
//!
//!   1. one of the skill's terms (its name or an alias) equals,
//!      case-insensitively, one of the item's tags, its primary language, or
//!      one of its implicit tags (every package is implicitly `python`), or
//!   2. the item lists the skill's exact name in its `related_skills`.
//!
//! Skills that link to nothing aren't in the index. The index borrows the
//! configuration and never mutates it: skill page slugs live in a side table.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{CMSConfig, ContentItem, Skill};
use crate::util::slugify;

/// The slug of a skill whose name has no sluggable characters.
const FALLBACK_SLUG: &str = "skill";

#[derive(Debug, Clone, PartialEq)]
pub struct SkillIndex<'a> {
    /// Skills with at least one item, in declaration order, each with its
    /// items in discovery order: projects first, then packages.
    projects_by_skill: Vec<(&'a Skill, Vec<ContentItem<'a>>)>,
    /// Lowercased skill name or alias → page slug.
    skill_lookup_map: BTreeMap<String, String>,
    /// Skill name → page slug, for every declared skill.
    slugs: FxHashMap<&'a str, String>,
}

impl<'a> SkillIndex<'a> {
    /// Builds the index from scratch. Building twice from the same
    /// configuration yields equal indices.
    pub fn build(config: &'a CMSConfig) -> SkillIndex<'a> {
        let skills: Vec<&'a Skill> = config.identity.all_skills().collect();
        let slugs = assign_slugs(&skills);
        let skill_lookup_map = build_lookup_map(&skills, &slugs);

        let items: Vec<ContentItem<'a>> = config.projects.iter().map(ContentItem::Project)
            .chain(config.pypi_packages.iter().map(ContentItem::Package))
            .collect();

        let item_terms: Vec<FxHashSet<String>> = items.iter()
            .map(|item| match_terms(*item))
            .collect();

        let mut projects_by_skill = vec![];
        for &skill in &skills {
            let terms: Vec<String> = skill.terms().map(|t| t.trim().to_lowercase()).collect();

            let mut linked: Vec<ContentItem<'a>> = vec![];
            for (item, item_terms) in items.iter().zip(&item_terms) {
                let by_tag = terms.iter().any(|t| item_terms.contains(t));
                let by_override = item.linkable().related_skills().iter().any(|s| *s == skill.name);
                if (by_tag || by_override) && !linked.contains(item) {
                    linked.push(*item);
                }
            }

            if !linked.is_empty() {
                projects_by_skill.push((skill, linked));
            }
        }

        tracing::debug!(
            skills = skills.len(),
            linked = projects_by_skill.len(),
            terms = skill_lookup_map.len(),
            "built skill index"
        );

        SkillIndex { projects_by_skill, skill_lookup_map, slugs }
    }

    /// The linked skills and their items, in skill declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Skill, &[ContentItem<'a>])> + '_ {
        self.projects_by_skill.iter().map(|(skill, items)| (*skill, items.as_slice()))
    }

    /// The items linked to the skill named `name`; empty if there are none.
    pub fn items(&self, name: &str) -> &[ContentItem<'a>] {
        self.projects_by_skill.iter()
            .find(|(skill, _)| skill.name == name)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    /// The skills `item` is linked to, in declaration order.
    pub fn skills_of(&self, item: ContentItem<'a>) -> impl Iterator<Item = &'a Skill> + '_ {
        self.projects_by_skill.iter()
            .filter(move |(_, items)| items.contains(&item))
            .map(|(skill, _)| *skill)
    }

    pub fn len(&self) -> usize {
        self.projects_by_skill.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects_by_skill.is_empty()
    }

    /// Every skill term, lowercased, mapped to its skill's page slug.
    pub fn lookup_map(&self) -> &BTreeMap<String, String> {
        &self.skill_lookup_map
    }

    /// The page slug of the declared skill named `name`.
    pub fn slug_of(&self, name: &str) -> Option<&str> {
        self.slugs.get(name).map(|s| s.as_str())
    }

    /// Resolves free text, say a technology on a résumé, to a skill page
    /// slug by matching it case-insensitively against skill names and
    /// aliases.
    pub fn link(&self, term: &str) -> Option<&str> {
        self.skill_lookup_map.get(&term.trim().to_lowercase()).map(|s| s.as_str())
    }
}

/// The lowercased terms an item can be matched by through its tags, primary
/// language, and implicit tags.
fn match_terms(item: ContentItem<'_>) -> FxHashSet<String> {
    let linkable = item.linkable();
    linkable.tags().iter()
        .map(|t| t.as_str())
        .chain(linkable.primary_language())
        .chain(linkable.implicit_tags().iter().copied())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Gives every skill a unique slug, in declaration order. A skill whose slug
/// is taken gets the first free `-2`, `-3`, ... suffix.
fn assign_slugs<'a>(skills: &[&'a Skill]) -> FxHashMap<&'a str, String> {
    let mut taken = FxHashSet::default();
    let mut slugs = FxHashMap::default();
    for skill in skills {
        if slugs.contains_key(skill.name.as_str()) {
            continue;
        }

        let base = match slugify(&skill.name) {
            slug if slug.is_empty() => FALLBACK_SLUG.to_string(),
            slug => slug,
        };

        let mut slug = base.clone();
        let mut n = 2;
        while taken.contains(&slug) {
            slug = format!("{base}-{n}");
            n += 1;
        }

        taken.insert(slug.clone());
        slugs.insert(skill.name.as_str(), slug);
    }

    slugs
}

/// Maps every lowercased term to its skill's slug. When two skills claim the
/// same term, the skill with the lexicographically smallest name wins.
fn build_lookup_map(skills: &[&Skill], slugs: &FxHashMap<&str, String>) -> BTreeMap<String, String> {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    for skill in skills {
        for term in skill.terms() {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                continue;
            }

            match owners.get(&term) {
                Some(&owner) if owner == skill.name => {}
                Some(&owner) => {
                    let winner = owner.min(skill.name.as_str());
                    tracing::warn!(%term, first = owner, second = %skill.name, winner,
                        "skill term claimed by two skills");

                    owners.insert(term, winner);
                }
                None => {
                    owners.insert(term, &skill.name);
                }
            }
        }
    }

    owners.into_iter()
        .filter_map(|(term, owner)| Some((term, slugs.get(owner)?.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Identity, Project, PyPIPackage, SkillGroup};

    fn skill(name: &str, aliases: &[&str]) -> Skill {
        Skill {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..Skill::new(name)
        }
    }

    fn config(skills: Vec<Skill>) -> CMSConfig {
        let mut identity = Identity::new("Me", "Hi");
        identity.skills = vec![SkillGroup { category: "All".into(), skills }];
        CMSConfig::new(identity)
    }

    fn tagged(slug: &str, tags: &[&str]) -> Project {
        let mut project = Project::new(slug, slug);
        project.tags = tags.iter().map(|t| t.to_string()).collect();
        project
    }

    fn names<'a>(index: &SkillIndex<'a>, skill: &str) -> Vec<&'a str> {
        index.items(skill).iter().map(|item| item.name()).collect()
    }

    #[test]
    fn aliases_link_items_and_terms() {
        let mut config = config(vec![skill("Python", &["py"])]);
        config.projects.push(tagged("demo", &["py"]));

        let index = SkillIndex::build(&config);
        assert_eq!(names(&index, "Python"), ["demo"]);
        assert_eq!(index.lookup_map().get("py").map(|s| s.as_str()), Some("python"));
        assert_eq!(index.lookup_map().get("python").map(|s| s.as_str()), Some("python"));
        assert_eq!(index.link("  PY "), Some("python"));
        assert_eq!(index.link("perl"), None);
    }

    #[test]
    fn related_skills_link_by_exact_name() {
        let mut config = config(vec![skill("Rust", &[])]);
        let mut project = Project::new("engine", "Engine");
        project.related_skills = vec!["Rust".into()];
        config.projects.push(project);

        let index = SkillIndex::build(&config);
        assert_eq!(index.len(), 1);
        let (skill, items) = index.iter().next().unwrap();
        assert_eq!(skill.name, "Rust");
        assert_eq!(items, [ContentItem::Project(&config.projects[0])]);

        let mut cleared = config.clone();
        cleared.projects[0].related_skills.clear();
        assert!(SkillIndex::build(&cleared).is_empty());

        let mut lowercase = config.clone();
        lowercase.projects[0].related_skills = vec!["rust".into()];
        assert!(SkillIndex::build(&lowercase).is_empty());
    }

    #[test]
    fn tags_and_languages_match_case_insensitively() {
        let mut config = config(vec![skill("Go", &[]), skill("Docker", &["containers"])]);
        let mut service = tagged("svc", &["CONTAINERS"]);
        service.primary_language = Some("go".into());
        config.projects.push(service);
        config.projects.push(tagged("other", &["docker"]));

        let index = SkillIndex::build(&config);
        assert_eq!(names(&index, "Go"), ["svc"]);
        assert_eq!(names(&index, "Docker"), ["svc", "other"]);
    }

    #[test]
    fn packages_are_python_and_follow_projects() {
        let mut config = config(vec![skill("Python", &[]), skill("Unused", &[])]);
        config.pypi_packages.push(PyPIPackage::new("pkg"));
        config.projects.push(tagged("tool", &["python"]));

        let index = SkillIndex::build(&config);
        assert_eq!(names(&index, "Python"), ["tool", "pkg"]);
        assert!(index.items("Unused").is_empty());
        assert_eq!(index.len(), 1);
        assert_eq!(index.slug_of("Unused"), Some("unused"));
    }

    #[test]
    fn items_are_added_once_per_skill() {
        let mut config = config(vec![skill("Rust", &["rs"])]);
        let mut project = tagged("both", &["rust", "rs", "RUST"]);
        project.primary_language = Some("Rust".into());
        project.related_skills = vec!["Rust".into()];
        config.projects.push(project);

        let index = SkillIndex::build(&config);
        assert_eq!(names(&index, "Rust"), ["both"]);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let mut config = config(vec![skill("Python", &["py"]), skill("Rust", &[])]);
        config.projects.push(tagged("a", &["py", "rust"]));
        config.pypi_packages.push(PyPIPackage::new("b"));

        let first = SkillIndex::build(&config);
        let second = SkillIndex::build(&config);
        assert_eq!(first, second);
        assert_eq!(format!("{:?}", first.lookup_map()), format!("{:?}", second.lookup_map()));
    }

    #[test]
    fn colliding_slugs_are_suffixed() {
        let config = config(vec![skill("C++", &[]), skill("C#", &[]), skill("???", &[])]);
        let index = SkillIndex::build(&config);

        assert_eq!(index.slug_of("C++"), Some("c"));
        assert_eq!(index.slug_of("C#"), Some("c-2"));
        assert_eq!(index.slug_of("???"), Some("skill"));
        assert_eq!(index.link("c#"), Some("c-2"));
    }

    #[test]
    fn colliding_aliases_go_to_smallest_name() {
        let config = config(vec![skill("Kubernetes", &["k8s", "orchestration"]), skill("Helm", &["k8s"])]);
        let index = SkillIndex::build(&config);

        assert_eq!(index.link("k8s"), Some("helm"));
        assert_eq!(index.link("orchestration"), Some("kubernetes"));
    }

    #[test]
    fn skills_of_items() {
        let mut config = config(vec![skill("Python", &[]), skill("Web", &[])]);
        config.projects.push(tagged("site", &["web", "python"]));

        let index = SkillIndex::build(&config);
        let item = ContentItem::Project(&config.projects[0]);
        let skills: Vec<_> = index.skills_of(item).map(|s| s.name.as_str()).collect();
        assert_eq!(skills, ["Python", "Web"]);
    }
}
