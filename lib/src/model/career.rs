use serde::{Deserialize, Serialize};

use crate::url::HttpUrl;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    Contract,
    Freelance,
    Volunteer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledLink {
    pub label: String,
    pub url: HttpUrl,
}

/// One position in the work history.
///
/// Dates are kept as written: `YYYY-MM`, `YYYY`, or one of the sentinels
/// `current` and `present` for an ongoing position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceEntry {
    pub id: String,
    pub organization: String,
    pub title: String,
    #[serde(default)]
    pub employment_type: EmploymentType,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub links: Vec<LabeledLink>,
}

impl WorkExperienceEntry {
    pub fn new(id: &str, organization: &str, title: &str, start_date: &str) -> Self {
        WorkExperienceEntry {
            id: id.into(),
            organization: organization.into(),
            title: title.into(),
            employment_type: EmploymentType::FullTime,
            start_date: start_date.into(),
            end_date: None,
            location: None,
            summary: None,
            responsibilities: vec![],
            technologies: vec![],
            links: vec![],
        }
    }

    pub fn is_current(&self) -> bool {
        match self.end_date.as_deref().map(str::trim) {
            Some(end) => end.eq_ignore_ascii_case("current") || end.eq_ignore_ascii_case("present"),
            None => false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeFormat {
    #[default]
    Pdf,
    Docx,
    Html,
    Md,
    Other,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    #[default]
    Active,
    Expired,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeArtifact {
    pub id: String,
    pub label: String,
    pub url: HttpUrl,
    #[serde(default)]
    pub format: ResumeFormat,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub status: ResumeStatus,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_icon")]
    pub icon: Option<String>,
}

fn default_icon() -> Option<String> {
    Some("📄".into())
}

impl ResumeArtifact {
    pub fn new(id: &str, label: &str, url: HttpUrl) -> Self {
        ResumeArtifact {
            id: id.into(),
            label: label.into(),
            url,
            format: ResumeFormat::Pdf,
            audience: None,
            status: ResumeStatus::Active,
            valid_from: None,
            valid_until: None,
            description: None,
            icon: default_icon(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_positions() {
        let mut entry = WorkExperienceEntry::new("acme", "Acme", "Engineer", "2020-01");
        assert!(!entry.is_current());

        entry.end_date = Some("Present".into());
        assert!(entry.is_current());

        entry.end_date = Some("2023-04".into());
        assert!(!entry.is_current());
    }

    #[test]
    fn artifacts_deserialize_with_defaults() {
        let artifact: ResumeArtifact = toml::from_str(r#"
            id = "cv"
            label = "CV"
            url = "https://example.com/cv.pdf"
            status = "draft"
        "#).unwrap();

        assert_eq!(artifact.format, ResumeFormat::Pdf);
        assert_eq!(artifact.status, ResumeStatus::Draft);
        assert_eq!(artifact.icon.as_deref(), Some("📄"));
    }

    #[test]
    fn employment_types_are_snake_case() {
        let entry: WorkExperienceEntry = toml::from_str(r#"
            id = "x"
            organization = "Org"
            title = "Dev"
            start_date = "2019"
            employment_type = "full_time"
        "#).unwrap();

        assert_eq!(entry.employment_type, EmploymentType::FullTime);
        assert_eq!(serde_json::to_value(EmploymentType::Volunteer).unwrap(), "volunteer");
    }
}
