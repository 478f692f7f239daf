use std::fmt;

use serde::{Deserialize, Serialize};

use crate::url::HttpUrl;
use crate::model::*;

/// The site's active presentation mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteMode {
    JobHunting,
    #[default]
    ProjectPromotion,
    SelfPromotion,
}

impl SiteMode {
    pub const ALL: [SiteMode; 3] = [
        SiteMode::JobHunting,
        SiteMode::ProjectPromotion,
        SiteMode::SelfPromotion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteMode::JobHunting => "job_hunting",
            SiteMode::ProjectPromotion => "project_promotion",
            SiteMode::SelfPromotion => "self_promotion",
        }
    }

    /// Parses a mode name. Anything unrecognized is project promotion.
    pub fn from_name_lossy(name: &str) -> SiteMode {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        match SiteMode::ALL.into_iter().find(|mode| mode.as_str() == name) {
            Some(mode) => mode,
            None => {
                tracing::warn!(mode = %name, "unrecognized mode; using project_promotion");
                SiteMode::ProjectPromotion
            }
        }
    }
}

impl fmt::Display for SiteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobHuntingSettings {
    pub show_resume: bool,
    pub show_contact: bool,
    pub highlight_skills: bool,
    pub hide_archived: bool,
}

impl Default for JobHuntingSettings {
    fn default() -> Self {
        JobHuntingSettings {
            show_resume: true,
            show_contact: true,
            highlight_skills: true,
            hide_archived: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPromotionSettings {
    pub show_stars: bool,
    pub show_downloads: bool,
    pub show_badges: bool,
    pub hide_archived: bool,
}

impl Default for ProjectPromotionSettings {
    fn default() -> Self {
        ProjectPromotionSettings {
            show_stars: true,
            show_downloads: true,
            show_badges: true,
            hide_archived: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPromotionSettings {
    pub show_talks: bool,
    pub show_identity_graph: bool,
    pub hide_archived: bool,
}

impl Default for SelfPromotionSettings {
    fn default() -> Self {
        SelfPromotionSettings {
            show_talks: true,
            show_identity_graph: true,
            hide_archived: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub current: SiteMode,
    pub job_hunting: JobHuntingSettings,
    pub project_promotion: ProjectPromotionSettings,
    pub self_promotion: SelfPromotionSettings,
}

/// The settings table of the active mode.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum ModeSettings<'a> {
    JobHunting(&'a JobHuntingSettings),
    ProjectPromotion(&'a ProjectPromotionSettings),
    SelfPromotion(&'a SelfPromotionSettings),
}

impl ModeSettings<'_> {
    pub fn hide_archived(&self) -> bool {
        match self {
            ModeSettings::JobHunting(s) => s.hide_archived,
            ModeSettings::ProjectPromotion(s) => s.hide_archived,
            ModeSettings::SelfPromotion(s) => s.hide_archived,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub default: String,
    pub supported: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        LanguageConfig { default: "en".into(), supported: vec!["en".into()] }
    }
}

/// The theme used when the settings file doesn't name one.
pub const DEFAULT_THEME: &str = "default";

fn default_theme() -> String {
    DEFAULT_THEME.into()
}

/// The aggregate root: everything a build consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CMSConfig {
    pub identity: Identity,
    #[serde(default)]
    pub modes: ModeConfig,
    #[serde(default)]
    pub languages: LanguageConfig,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub pypi_packages: Vec<PyPIPackage>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub work_experience: Vec<WorkExperienceEntry>,
    #[serde(default)]
    pub resumes: Vec<ResumeArtifact>,
}

impl CMSConfig {
    pub fn new(identity: Identity) -> Self {
        CMSConfig {
            identity,
            modes: ModeConfig::default(),
            languages: LanguageConfig::default(),
            projects: vec![],
            pypi_packages: vec![],
            theme: default_theme(),
            work_experience: vec![],
            resumes: vec![],
        }
    }

    pub fn current_mode_settings(&self) -> ModeSettings<'_> {
        match self.modes.current {
            SiteMode::JobHunting => ModeSettings::JobHunting(&self.modes.job_hunting),
            SiteMode::ProjectPromotion => ModeSettings::ProjectPromotion(&self.modes.project_promotion),
            SiteMode::SelfPromotion => ModeSettings::SelfPromotion(&self.modes.self_promotion),
        }
    }

    /// The URL of the first active résumé artifact, if any.
    pub fn featured_resume_url(&self) -> Option<&HttpUrl> {
        self.resumes.iter()
            .find(|r| r.status == ResumeStatus::Active)
            .map(|r| &r.url)
    }

    /// Checks that every identifier is present and unique within its
    /// collection. Detail documents are keyed by these identifiers, so a
    /// duplicate would silently overwrite another entity's document, and an
    /// identifier that names a path (`a/b`, `..`) would be written outside
    /// its collection's directory. Skill names only key slugs and may hold
    /// any character.
    pub fn validate(&self) -> crate::Result<()> {
        fn check<'a, I>(collection: &str, field: &str, file_names: bool, ids: I) -> crate::Result<()>
            where I: Iterator<Item = &'a str>
        {
            let mut seen = rustc_hash::FxHashSet::default();
            for (i, id) in ids.enumerate() {
                if id.trim().is_empty() {
                    return err!("missing required identifier",
                        "collection" => collection, "field" => field, "position" => i);
                }

                if file_names && (id.contains(['/', '\\']) || id == "." || id == "..") {
                    return err!("identifier is not a valid file name",
                        "collection" => collection, "field" => field, "id" => id);
                }

                if !seen.insert(id.to_lowercase()) {
                    return err!("duplicate identifier",
                        "collection" => collection, "field" => field, "id" => id);
                }
            }

            Ok(())
        }

        check("skills", "name", false, self.identity.all_skills().map(|s| s.name.as_str()))?;
        check("projects", "slug", true, self.projects.iter().map(|p| p.slug.as_str()))?;
        check("pypi", "package_name", true, self.pypi_packages.iter().map(|p| p.package_name.as_str()))?;
        check("experience", "id", true, self.work_experience.iter().map(|e| e.id.as_str()))?;
        check("resumes", "id", true, self.resumes.iter().map(|r| r.id.as_str()))?;
        Ok(())
    }
}
