use std::collections::BTreeSet;
use std::fmt;

use crate::model::{CMSConfig, Linkable};
use crate::relations::SkillIndex;

/// Terms that don't resolve to a skill, and skills that nothing links to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Lowercased tags and primary languages of projects and packages that
    /// match no skill name or alias.
    pub orphan_tags: Vec<String>,
    /// Names of declared skills with no linked item.
    pub ghost_skills: Vec<String>,
    /// Lowercased work-experience technologies that match no skill.
    pub unlinked_technologies: Vec<String>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_tags.is_empty()
            && self.ghost_skills.is_empty()
            && self.unlinked_technologies.is_empty()
    }
}

pub fn audit(config: &CMSConfig, index: &SkillIndex<'_>) -> AuditReport {
    let unlinked = |term: &&str| index.link(term).is_none();

    let linkables = config.projects.iter().map(|p| p as &dyn Linkable)
        .chain(config.pypi_packages.iter().map(|p| p as &dyn Linkable));

    let orphan_tags: BTreeSet<String> = linkables
        .flat_map(|item| item.tags().iter().map(|t| t.as_str()).chain(item.primary_language()))
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .filter(unlinked)
        .map(str::to_lowercase)
        .collect();

    let ghost_skills: BTreeSet<String> = config.identity.all_skills()
        .filter(|skill| index.items(&skill.name).is_empty())
        .map(|skill| skill.name.clone())
        .collect();

    let unlinked_technologies: BTreeSet<String> = config.work_experience.iter()
        .flat_map(|entry| entry.technologies.iter())
        .map(|t| t.trim())
        .filter(|term| !term.is_empty())
        .filter(unlinked)
        .map(str::to_lowercase)
        .collect();

    let report = AuditReport {
        orphan_tags: orphan_tags.into_iter().collect(),
        ghost_skills: ghost_skills.into_iter().collect(),
        unlinked_technologies: unlinked_technologies.into_iter().collect(),
    };

    tracing::debug!(
        orphan_tags = report.orphan_tags.len(),
        ghost_skills = report.ghost_skills.len(),
        unlinked_technologies = report.unlinked_technologies.len(),
        "audited skill links"
    );

    report
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("orphan tags", &self.orphan_tags),
            ("ghost skills", &self.ghost_skills),
            ("unlinked technologies", &self.unlinked_technologies),
        ];

        for (i, (title, terms)) in sections.into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            writeln!(f, "{title} ({}):", terms.len())?;
            if terms.is_empty() {
                writeln!(f, "  none")?;
            }

            for term in terms {
                writeln!(f, "  {term}")?;
            }
        }

        Ok(())
    }
}
