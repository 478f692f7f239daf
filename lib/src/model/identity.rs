use serde::{Deserialize, Serialize};

use crate::url::HttpUrl;

/// Domains no social profile may reference.
pub const FORBIDDEN_DOMAINS: &[&str] = &["twitter.com", "x.com"];

/// Service names that refer to a forbidden network without naming its domain.
const FORBIDDEN_SERVICES: &[&str] = &["twitter", "x"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Skill {
    pub fn new(name: impl Into<String>) -> Self {
        Skill { name: name.into(), level: None, icon: None, aliases: vec![], featured: false }
    }

    /// `"{icon} {name} - {level}"`, leaving out whatever is absent.
    pub fn display(&self) -> String {
        let mut parts = vec![];
        parts.extend(self.icon.as_deref());
        parts.push(self.name.as_str());
        let level = self.level.as_ref().map(|level| format!("- {level}"));
        parts.extend(level.as_deref());
        parts.join(" ")
    }

    /// The skill's name followed by its aliases.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(|a| a.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeEntry {
    pub label: String,
    pub url: HttpUrl,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_resume_icon")]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkEntry {
    pub title: String,
    pub url: HttpUrl,
    #[serde(default = "default_talk_icon")]
    pub icon: String,
}

fn default_resume_icon() -> String { "📄".into() }
fn default_talk_icon() -> String { "▶️".into() }
fn default_profile_group() -> String { "social".into() }

/// A node in the identity graph: one account on one service.
///
/// Deserialization fails if the service or any of the profile's URLs refers
/// to one of the [`FORBIDDEN_DOMAINS`]; such a profile can't be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileFields")]
pub struct SocialProfile {
    pub service: String,
    pub handle: String,
    pub url: HttpUrl,
    pub group: String,
    pub same_as: Vec<HttpUrl>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
struct ProfileFields {
    service: String,
    handle: String,
    url: HttpUrl,
    #[serde(default = "default_profile_group")]
    group: String,
    #[serde(default)]
    same_as: Vec<HttpUrl>,
    #[serde(default)]
    icon: Option<String>,
}

impl SocialProfile {
    pub fn new(service: &str, handle: &str, url: &str) -> Result<Self, String> {
        SocialProfile::try_from(ProfileFields {
            service: service.into(),
            handle: handle.into(),
            url: HttpUrl::parse(url)?,
            group: default_profile_group(),
            same_as: vec![],
            icon: None,
        })
    }
}

fn is_forbidden_host(host: &str) -> bool {
    let host = host.split(':').next().unwrap_or(host).trim_end_matches('.');
    FORBIDDEN_DOMAINS.iter().any(|domain| {
        host == *domain || host.strip_suffix(domain).map_or(false, |h| h.ends_with('.'))
    })
}

fn is_forbidden_service(service: &str) -> bool {
    let service = service.trim().to_lowercase();
    FORBIDDEN_SERVICES.contains(&service.as_str())
        || service
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '-'))
            .any(is_forbidden_host)
}

impl TryFrom<ProfileFields> for SocialProfile {
    type Error = String;

    fn try_from(fields: ProfileFields) -> Result<Self, Self::Error> {
        if is_forbidden_service(&fields.service) {
            return Err(format!("Twitter/X profiles are forbidden: service {:?}", fields.service));
        }

        let urls = std::iter::once(&fields.url).chain(fields.same_as.iter());
        for url in urls {
            if is_forbidden_host(&url.host()) {
                return Err(format!("Twitter/X links are forbidden: {url}"));
            }
        }

        Ok(SocialProfile {
            service: fields.service,
            handle: fields.handle,
            url: fields.url,
            group: fields.group,
            same_as: fields.same_as,
            icon: fields.icon,
        })
    }
}

/// Personal information and the identity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub tagline: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profiles: Vec<SocialProfile>,
    /// Legacy résumé links; superseded by `ResumeArtifact`s.
    #[serde(default)]
    pub resumes: Vec<ResumeEntry>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub talks: Vec<TalkEntry>,
    /// Names of projects featured in job-hunting mode.
    #[serde(default)]
    pub job_hunting_projects: Vec<String>,
    /// Names of projects featured in project-promotion mode.
    #[serde(default)]
    pub project_promotion: Vec<String>,
    /// Names of projects featured in self-promotion mode.
    #[serde(default)]
    pub identity_projects: Vec<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>, tagline: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            tagline: tagline.into(),
            location: None,
            email: None,
            profiles: vec![],
            resumes: vec![],
            skills: vec![],
            talks: vec![],
            job_hunting_projects: vec![],
            project_promotion: vec![],
            identity_projects: vec![],
        }
    }

    /// Every skill in every group, in declaration order.
    pub fn all_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().flat_map(|group| group.skills.iter())
    }

    /// The skill groups as table rows: each group is a column, each row holds
    /// the `n`th skill of every group or `""` where a group is shorter.
    pub fn skill_rows(&self) -> Vec<Vec<String>> {
        let columns = self.skills.iter()
            .map(|g| g.skills.iter().collect::<Vec<_>>())
            .collect::<Vec<_>>();

        transpose(&columns, Skill::display)
    }

    /// Like [`Identity::skill_rows()`] but only featured skills, and groups
    /// with no featured skills are left out entirely.
    pub fn featured_skill_rows(&self) -> Vec<Vec<String>> {
        let columns = self.skills.iter()
            .map(|g| g.skills.iter().filter(|s| s.featured).collect::<Vec<_>>())
            .filter(|column| !column.is_empty())
            .collect::<Vec<_>>();

        transpose(&columns, |skill| skill.name.clone())
    }
}

fn transpose(columns: &[Vec<&Skill>], cell: impl Fn(&Skill) -> String) -> Vec<Vec<String>> {
    let height = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    (0..height)
        .map(|row| columns.iter()
            .map(|column| column.get(row).map_or_else(String::new, |s| cell(s)))
            .collect())
        .collect()
}
