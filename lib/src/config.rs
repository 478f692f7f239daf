use std::path::Path;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{Chainable, Result};
use crate::format::{Format, Toml};
use crate::model::*;

/// The site settings file, relative to the site root.
pub const CONFIG_FILE: &str = "readme_cms.toml";

/// The directory holding the site's data files, relative to the site root.
pub const DATA_DIR: &str = "data";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    mode: ModeConfig,
    languages: LanguageConfig,
    theme: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    identities: Vec<SocialProfile>,
}

/// The layout of `skills.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct SkillsFile {
    #[serde(default)]
    pub(crate) skills: Vec<SkillGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectsFile {
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Debug, Default, Deserialize)]
struct PackagesFile {
    #[serde(default)]
    packages: Vec<PyPIPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct ExperienceFile {
    #[serde(default)]
    experience: Vec<WorkExperienceEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ResumesFile {
    #[serde(default)]
    resumes: Vec<ResumeArtifact>,
}

/// Reads an optional file, logging and defaulting when it doesn't exist.
fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match Toml::read_optional(path)? {
        Some(value) => Ok(value),
        None => {
            tracing::warn!(path = %path.display(), "data file not found; treating as empty");
            Ok(T::default())
        }
    }
}

/// Loads the site configuration rooted at `root`.
///
/// `identity.toml` is the only required data file; every other file may be
/// missing and is then empty. The skills in `skills.toml` and the profiles in
/// `identity_graph.toml` replace those declared inline in `identity.toml`.
/// Once loaded, ungrouped projects are assigned groups and identifiers are
/// checked for presence and uniqueness.
pub fn load(root: &Path) -> Result<CMSConfig> {
    let settings: Settings = read_or_default(&root.join(CONFIG_FILE))?;

    let data = root.join(DATA_DIR);
    let identity_path = data.join("identity.toml");
    let mut identity: Identity = Toml::read(&identity_path)
        .chain(error!("failed to load identity", "path" => identity_path.display()))?;

    if let Some(graph) = Toml::read_optional::<ProfilesFile>(&data.join("identity_graph.toml"))? {
        identity.profiles = graph.identities;
    }

    if let Some(file) = Toml::read_optional::<SkillsFile>(&data.join("skills.toml"))? {
        identity.skills = file.skills;
    }

    let projects: ProjectsFile = read_or_default(&data.join("projects.toml"))?;
    let packages: PackagesFile = read_or_default(&data.join("pypi_projects.toml"))?;
    let experience: ExperienceFile = read_or_default(&data.join("work_experience.toml"))?;
    let resumes: ResumesFile = read_or_default(&data.join("resumes.toml"))?;

    let mut resumes = resumes.resumes;
    if resumes.is_empty() && !identity.resumes.is_empty() {
        tracing::info!(count = identity.resumes.len(), "converting legacy résumé entries");
        resumes = convert_legacy_resumes(&identity.resumes);
    }

    let mut config = CMSConfig {
        identity,
        modes: settings.mode,
        languages: settings.languages,
        projects: projects.projects,
        pypi_packages: packages.packages,
        theme: settings.theme.unwrap_or_else(|| DEFAULT_THEME.into()),
        work_experience: experience.experience,
        resumes,
    };

    crate::grouping::assign_groups(&mut config.projects);
    config.validate()?;

    tracing::debug!(
        projects = config.projects.len(),
        packages = config.pypi_packages.len(),
        experience = config.work_experience.len(),
        resumes = config.resumes.len(),
        mode = %config.modes.current,
        "loaded configuration"
    );

    Ok(config)
}

/// Converts the `[[resumes]]` links in `identity.toml` into artifacts.
pub fn convert_legacy_resumes(entries: &[ResumeEntry]) -> Vec<ResumeArtifact> {
    entries.iter()
        .enumerate()
        .map(|(i, entry)| ResumeArtifact {
            format: ResumeFormat::Other,
            status: ResumeStatus::Active,
            description: entry.description.clone(),
            icon: Some(entry.icon.clone()),
            ..ResumeArtifact::new(&format!("legacy-{i}"), &entry.label, entry.url.clone())
        })
        .collect()
}
