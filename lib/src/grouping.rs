use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::Project;
use crate::util::title_case;

/// How many of the most frequent tags are eligible to become groups.
pub const TOP_TAGS: usize = 50;

/// The group of a project with no eligible tag and no primary language.
pub const DEFAULT_GROUP: &str = "other";

/// Assigns a group to every project that doesn't have one.
///
/// Tags are ranked across all projects by descending frequency, ties broken by
/// ascending tag. Tags that equal (case-insensitively) any project's primary
/// language are never ranked. An ungrouped project gets its best-ranked tag
/// among the top [`TOP_TAGS`], title-cased; failing that, its title-cased
/// primary language; failing that, the title-cased [`DEFAULT_GROUP`].
///
/// Projects that already have a group are never touched, so running this
/// twice is the same as running it once.
pub fn assign_groups(projects: &mut [Project]) {
    let ranks = rank_tags(projects);

    for project in projects.iter_mut() {
        if project.group.as_deref().map_or(false, |g| !g.trim().is_empty()) {
            continue;
        }

        let best_tag = project.tags.iter()
            .filter_map(|tag| ranks.get(tag.as_str()).map(|rank| (*rank, tag)))
            .min()
            .map(|(_, tag)| tag.as_str());

        let language = project.primary_language.as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let group = best_tag.or(language).unwrap_or(DEFAULT_GROUP);
        project.group = Some(title_case(group));
    }
}

/// Maps each of the top [`TOP_TAGS`] non-language tags to its rank, `0` being
/// the best.
fn rank_tags(projects: &[Project]) -> FxHashMap<String, usize> {
    let languages: FxHashSet<String> = projects.iter()
        .filter_map(|p| p.primary_language.as_deref())
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for tag in projects.iter().flat_map(|p| p.tags.iter()) {
        if !languages.contains(&tag.trim().to_lowercase()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a_tag, a_count), (b_tag, b_count)| {
        b_count.cmp(a_count).then_with(|| a_tag.cmp(b_tag))
    });

    ranked.into_iter()
        .take(TOP_TAGS)
        .enumerate()
        .map(|(rank, (tag, _))| (tag.to_string(), rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(slug: &str, tags: &[&str], language: Option<&str>) -> Project {
        let mut project = Project::new(slug, slug);
        project.tags = tags.iter().map(|t| t.to_string()).collect();
        project.primary_language = language.map(Into::into);
        project
    }

    fn groups(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.group.as_deref().unwrap_or("")).collect()
    }

    #[test]
    fn tag_then_language_then_default() {
        let mut projects = vec![
            project("a", &["cli", "tools"], None),
            project("b", &[], Some("Go")),
            project("c", &[], None),
        ];

        assign_groups(&mut projects);
        assert_eq!(groups(&projects), ["Cli", "Go", "Other"]);
    }

    #[test]
    fn frequency_beats_alphabet() {
        let mut projects = vec![
            project("a", &["apple", "zebra"], None),
            project("b", &["zebra"], None),
        ];

        assign_groups(&mut projects);
        assert_eq!(groups(&projects), ["Zebra", "Zebra"]);
    }

    #[test]
    fn language_tags_never_become_groups() {
        let mut projects = vec![
            project("a", &["python", "web"], Some("Python")),
            project("b", &["python"], None),
            project("c", &["Rust"], None),
            project("d", &[], Some("rust")),
        ];

        assign_groups(&mut projects);
        assert_eq!(groups(&projects), ["Web", "Other", "Other", "Rust"]);
    }

    #[test]
    fn explicit_groups_are_kept_and_reruns_are_stable() {
        let mut projects = vec![
            project("a", &["cli"], None),
            project("b", &["cli"], None),
        ];

        projects[0].group = Some("Favorites".into());
        assign_groups(&mut projects);
        assert_eq!(groups(&projects), ["Favorites", "Cli"]);

        let before = projects.clone();
        assign_groups(&mut projects);
        assert_eq!(projects, before);
    }

    #[test]
    fn only_top_tags_are_eligible() {
        let mut projects: Vec<Project> = (0..TOP_TAGS)
            .map(|i| {
                let tag = format!("t{i:02}");
                project(&tag, &[tag.as_str(), tag.as_str()], None)
            })
            .collect();

        projects.push(project("rare", &["zzz"], Some("Lua")));
        assign_groups(&mut projects);
        assert_eq!(projects.last().unwrap().group.as_deref(), Some("Lua"));
        assert_eq!(projects[0].group.as_deref(), Some("T00"));
    }
}
