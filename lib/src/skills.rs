//! Regenerates the skill taxonomy from the data that mentions skills.
//!
//! The declared groups are kept as they are. Work-experience technologies
//! and project primary languages that no skill name or alias covers are
//! collected into inbox groups for sorting by hand, and the result is
//! written next to `skills.toml` rather than over it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::{SkillsFile, DATA_DIR};
use crate::error::{Chainable, Result};
use crate::format::write_file;
use crate::model::{CMSConfig, Linkable, Skill, SkillGroup};

/// Where the regenerated taxonomy is written, relative to the site root.
pub const OUTPUT_FILE: &str = "skills.new.toml";

pub const RESUME_INBOX: &str = "Inbox - From Resume";
pub const GITHUB_INBOX: &str = "Inbox - From GitHub";

/// The level given to every skill found in the inbox.
pub const INBOX_LEVEL: &str = "Competent";

/// Primary language placeholder for repositories without one.
const NO_LANGUAGE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct SkillsMigration {
    /// Every group: the declared ones first, then the non-empty inboxes.
    pub groups: Vec<SkillGroup>,
    pub from_resume: usize,
    pub from_github: usize,
    /// Lowercased project and package tags no skill covers, sorted. Tags are
    /// reported, never added: most aren't skills.
    pub orphan_tags: Vec<String>,
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Appends `skill` to the group named `category`, creating it if needed.
fn push(groups: &mut Vec<SkillGroup>, category: &str, skill: Skill) {
    match groups.iter_mut().find(|g| g.category == category) {
        Some(group) => group.skills.push(skill),
        None => groups.push(SkillGroup { category: category.into(), skills: vec![skill] }),
    }
}

pub fn migrate(config: &CMSConfig) -> SkillsMigration {
    let mut known: FxHashSet<String> = FxHashSet::default();
    let mut groups: Vec<SkillGroup> = vec![];
    for group in &config.identity.skills {
        for skill in &group.skills {
            known.extend(skill.terms().map(normalize));
            push(&mut groups, &group.category, skill.clone());
        }
    }

    let mut from_resume = 0;
    let technologies = config.work_experience.iter().flat_map(|e| e.technologies.iter());
    for tech in technologies {
        let tech = tech.trim();
        if tech.is_empty() || !known.insert(normalize(tech)) {
            continue;
        }

        tracing::info!(skill = tech, "found new skill in work experience");
        let skill = Skill {
            level: Some(INBOX_LEVEL.into()),
            featured: true,
            ..Skill::new(tech)
        };

        push(&mut groups, RESUME_INBOX, skill);
        from_resume += 1;
    }

    let mut from_github = 0;
    let languages = config.projects.iter().filter_map(|p| p.primary_language.as_deref());
    for language in languages {
        let language = language.trim();
        if language.is_empty() || language == NO_LANGUAGE || !known.insert(normalize(language)) {
            continue;
        }

        tracing::info!(skill = language, "found new skill in project languages");
        let skill = Skill {
            level: Some(INBOX_LEVEL.into()),
            icon: Some("💻".into()),
            featured: true,
            ..Skill::new(language)
        };

        push(&mut groups, GITHUB_INBOX, skill);
        from_github += 1;
    }

    let orphan_tags: BTreeSet<String> = config.projects.iter().map(|p| p as &dyn Linkable)
        .chain(config.pypi_packages.iter().map(|p| p as &dyn Linkable))
        .flat_map(|item| item.tags().iter())
        .map(|tag| normalize(tag))
        .filter(|tag| !tag.is_empty() && !known.contains(tag))
        .collect();

    SkillsMigration {
        groups,
        from_resume,
        from_github,
        orphan_tags: orphan_tags.into_iter().collect(),
    }
}

impl SkillsMigration {
    /// Serializes the groups in the layout of `skills.toml`.
    pub fn to_toml(&self) -> Result<String> {
        let file = SkillsFile { skills: self.groups.clone() };
        toml::to_string(&file).chain(error!("failed to serialize skill taxonomy"))
    }

    /// Writes the taxonomy to `data/skills.new.toml` under `root` and
    /// returns the path written.
    pub fn write(&self, root: &Path) -> Result<PathBuf> {
        let path = root.join(DATA_DIR).join(OUTPUT_FILE);
        write_file(&path, self.to_toml()?)?;
        tracing::info!(
            path = %path.display(),
            from_resume = self.from_resume,
            from_github = self.from_github,
            orphan_tags = self.orphan_tags.len(),
            "wrote skill taxonomy"
        );

        Ok(path)
    }
}
