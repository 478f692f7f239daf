use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::api::{Collection, Hrefs, StaticApi, sort_experience, sort_resumes};
use crate::error::{Chainable, Result};
use crate::featured::assign_featured;
use crate::format::write_file;
use crate::model::*;
use crate::relations::SkillIndex;
use crate::templating::minijinja::MiniJinjaEngine;
use crate::templating::{Engine, EngineInit, EngineSetup};
use crate::url::HttpUrl;
use crate::util::timed;

/// The Markdown page rendered to the repository-root `README.md` instead of
/// `docs/md/`.
pub const ROOT_README: &str = "ROOT_README.md";

/// Template rendered once per linked skill, if the theme has it.
pub const SKILL_TEMPLATE: &str = "skill.html.j2";

/// Where a site's inputs and outputs live, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Layout {
        Layout { root: root.into() }
    }

    pub fn docs(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn markdown(&self) -> PathBuf {
        self.docs().join("md")
    }

    pub fn api(&self) -> PathBuf {
        self.docs().join("apis")
    }

    pub fn skills(&self) -> PathBuf {
        self.docs().join("skills")
    }

    pub fn readme(&self) -> PathBuf {
        self.root.join("README.md")
    }

    pub fn content(&self) -> PathBuf {
        self.root.join("content")
    }

    pub fn templates(&self, theme: &str) -> PathBuf {
        self.root.join("templates").join(theme)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Only write the JSON API; skip every page.
    pub api_only: bool,
    /// Overrides the configured mode.
    pub mode: Option<SiteMode>,
    /// The href root of the API; `/apis` if unset.
    pub api_base: Option<String>,
}

/// What a build wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub api_documents: usize,
    pub markdown_pages: usize,
    pub html_pages: usize,
    pub skill_pages: usize,
}

#[derive(Debug)]
pub struct Builder {
    layout: Layout,
    config: CMSConfig,
    options: BuildOptions,
}

impl Builder {
    /// Loads the site rooted at `root`.
    pub fn new(root: &Path) -> Result<Builder> {
        let config = timed!("load", crate::config::load(root)?);
        Ok(Builder::from_config(root, config))
    }

    pub fn from_config(root: &Path, config: CMSConfig) -> Builder {
        Builder { layout: Layout::new(root), config, options: BuildOptions::default() }
    }

    pub fn options(mut self, options: BuildOptions) -> Builder {
        self.options = options;
        self
    }

    pub fn config(&self) -> &CMSConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Runs the full build with the default template engine.
    pub fn build(&mut self) -> Result<BuildReport> {
        self.build_with::<MiniJinjaEngine>()
    }

    /// Cleans the output directories, assigns featured flags, maps skills to
    /// content, writes the API and then, unless only the API was requested,
    /// renders every page with the engine `E`.
    pub fn build_with<E: EngineInit>(&mut self) -> Result<BuildReport> {
        if let Some(mode) = self.options.mode {
            self.config.modes.current = mode;
        }

        tracing::info!(mode = %self.config.modes.current, theme = %self.config.theme, "building site");
        timed!("clean", self.clean()?);
        timed!("featured", assign_featured(&mut self.config));

        let config = &self.config;
        let index = timed!("relations", SkillIndex::build(config));

        let api = match &self.options.api_base {
            Some(base) => StaticApi::new(base),
            None => StaticApi::default(),
        };

        let rendered = timed!("api", api.write(config, &self.layout.api())?);
        let mut report = BuildReport {
            api_documents: rendered.documents().count(),
            ..BuildReport::default()
        };

        if !self.options.api_only {
            let pages = Pages::new(&self.layout, config, &index, api.hrefs());
            timed!("pages", pages.render::<E>(&mut report)?);
        }

        tracing::info!(
            api = report.api_documents,
            markdown = report.markdown_pages,
            html = report.html_pages,
            skills = report.skill_pages,
            "build complete"
        );

        Ok(report)
    }

    /// Removes and recreates the generated Markdown, API and skill page
    /// directories.
    pub fn clean(&self) -> Result<()> {
        for dir in [self.layout.markdown(), self.layout.api(), self.layout.skills()] {
            if dir.exists() {
                fs::remove_dir_all(&dir).chain_with(|| error! {
                    "failed to remove output directory",
                    "directory" => dir.display(),
                })?;
            }

            fs::create_dir_all(&dir).chain_with(|| error! {
                "failed to create output directory",
                "directory" => dir.display(),
            })?;
        }

        Ok(())
    }
}

/// A content item as templates see it in skill listings.
#[derive(Debug, Clone, Serialize)]
pub struct ItemStub<'a> {
    pub kind: &'static str,
    pub name: &'a str,
    pub key: &'a str,
    pub url: Option<&'a HttpUrl>,
    pub featured: bool,
    /// The item's detail document in the API.
    pub href: String,
}

impl<'a> ItemStub<'a> {
    pub fn new(item: ContentItem<'a>, hrefs: &Hrefs) -> ItemStub<'a> {
        match item {
            ContentItem::Project(p) => ItemStub {
                kind: "project",
                name: &p.name,
                key: &p.slug,
                url: p.url.as_ref().or(p.repository_url.as_ref()),
                featured: p.featured,
                href: hrefs.detail(Collection::Projects, &p.slug),
            },
            ContentItem::Package(p) => ItemStub {
                kind: "package",
                name: &p.package_name,
                key: &p.package_name,
                url: p.docs_url.as_ref(),
                featured: p.featured,
                href: hrefs.detail(Collection::Pypi, &p.package_name),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Generation {
    generated_at: String,
}

/// Everything every template can see.
#[derive(Debug, Serialize)]
struct Globals<'a> {
    config: &'a CMSConfig,
    identity: &'a Identity,
    mode: ModeSettings<'a>,
    mode_name: SiteMode,
    projects: Vec<&'a Project>,
    featured_projects: Vec<&'a Project>,
    projects_by_group: BTreeMap<&'a str, Vec<&'a Project>>,
    pypi: &'a [PyPIPackage],
    work_experience: Vec<&'a WorkExperienceEntry>,
    resumes: Vec<&'a ResumeArtifact>,
    featured_resume_url: Option<&'a HttpUrl>,
    skill_rows: Vec<Vec<String>>,
    featured_skill_rows: Vec<Vec<String>>,
    projects_by_skill: BTreeMap<&'a str, Vec<ItemStub<'a>>>,
    skill_pages: BTreeMap<&'a str, &'a str>,
    generation: Generation,
}

impl<'a> Globals<'a> {
    fn new(config: &'a CMSConfig, index: &'a SkillIndex<'a>, hrefs: &Hrefs) -> Globals<'a> {
        let mode = config.current_mode_settings();
        let mut projects: Vec<&Project> = config.projects.iter()
            .filter(|p| !(mode.hide_archived() && p.status == ProjectStatus::Archived))
            .collect();

        projects.sort_by_cached_key(|p| (!p.featured, p.name.to_lowercase()));

        let featured_projects = projects.iter().copied().filter(|p| p.featured).collect();
        let mut projects_by_group: BTreeMap<&str, Vec<&Project>> = BTreeMap::new();
        for &project in &projects {
            let group = project.group.as_deref().unwrap_or("Other");
            projects_by_group.entry(group).or_default().push(project);
        }

        let projects_by_skill = index.iter()
            .map(|(skill, items)| {
                let stubs = items.iter().map(|item| ItemStub::new(*item, hrefs)).collect();
                (skill.name.as_str(), stubs)
            })
            .collect();

        let skill_pages = index.iter()
            .filter_map(|(skill, _)| Some((skill.name.as_str(), index.slug_of(&skill.name)?)))
            .collect();

        Globals {
            config,
            identity: &config.identity,
            mode,
            mode_name: config.modes.current,
            projects,
            featured_projects,
            projects_by_group,
            pypi: &config.pypi_packages,
            work_experience: sort_experience(&config.work_experience),
            resumes: sort_resumes(&config.resumes),
            featured_resume_url: config.featured_resume_url(),
            skill_rows: config.identity.skill_rows(),
            featured_skill_rows: config.identity.featured_skill_rows(),
            projects_by_skill,
            skill_pages,
            generation: Generation { generated_at: chrono::Utc::now().to_rfc3339() },
        }
    }
}

/// Renders the theme's pages.
struct Pages<'a> {
    layout: &'a Layout,
    config: &'a CMSConfig,
    index: &'a SkillIndex<'a>,
    hrefs: &'a Hrefs,
}

/// The page templates of a theme, as template names relative to the theme.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageTemplates {
    pub markdown: Vec<String>,
    pub html: Vec<String>,
}

/// Finds `pages/*.md.j2` and `pages/*.html.j2` in the theme directory.
pub fn discover_pages(theme_dir: &Path) -> Result<PageTemplates> {
    let pages_dir = theme_dir.join("pages");
    let mut templates = PageTemplates::default();
    if !pages_dir.is_dir() {
        return Ok(templates);
    }

    let walker = jwalk::WalkDir::new(&pages_dir)
        .max_depth(1)
        .sort(true)
        .follow_links(true);

    for entry in walker {
        let entry = entry.map_err(|e| error!("failed to read page templates",
            "directory" => pages_dir.display(), e))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if file_name.ends_with(".md.j2") {
            templates.markdown.push(format!("pages/{file_name}"));
        } else if file_name.ends_with(".html.j2") {
            templates.html.push(format!("pages/{file_name}"));
        }
    }

    Ok(templates)
}

/// The output file name of the page template `name`: `pages/about.md.j2`
/// becomes `about.md`.
fn page_file_name(name: &str) -> &str {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    file_name.strip_suffix(".j2").unwrap_or(file_name)
}

impl<'a> Pages<'a> {
    fn new(layout: &'a Layout, config: &'a CMSConfig, index: &'a SkillIndex<'a>, hrefs: &'a Hrefs) -> Self {
        Pages { layout, config, index, hrefs }
    }

    fn render<E: EngineInit>(&self, report: &mut BuildReport) -> Result<()> {
        let theme = &self.config.theme;
        let theme_dir = self.layout.templates(theme);
        let templates = discover_pages(&theme_dir)?;

        if templates.markdown.is_empty() {
            return err!("theme has no Markdown page templates",
                "theme" => theme, "directory" => theme_dir.join("pages").display());
        }

        if templates.html.is_empty() {
            return err!("theme has no HTML page templates",
                "theme" => theme, "directory" => theme_dir.join("pages").display());
        }

        let globals = Globals::new(self.config, self.index, self.hrefs);
        let engine = E::init(EngineSetup {
            templates: &theme_dir,
            content: self.layout.content(),
            skill_links: self.index.lookup_map().clone(),
            globals: &globals,
        });

        for name in &templates.markdown {
            let target = match page_file_name(name) {
                ROOT_README => self.layout.readme(),
                file_name => self.layout.markdown().join(file_name),
            };

            render_page(&engine, name, &target)?;
            report.markdown_pages += 1;
        }

        for name in &templates.html {
            render_page(&engine, name, &self.layout.docs().join(page_file_name(name)))?;
            report.html_pages += 1;
        }

        if theme_dir.join(SKILL_TEMPLATE).is_file() {
            report.skill_pages = self.render_skill_pages(&engine)?;
        }

        Ok(())
    }

    fn render_skill_pages(&self, engine: &impl Engine) -> Result<usize> {
        let mut count = 0;
        for (skill, items) in self.index.iter() {
            let Some(slug) = self.index.slug_of(&skill.name) else { continue };
            let items: Vec<ItemStub<'_>> = items.iter()
                .map(|item| ItemStub::new(*item, self.hrefs))
                .collect();

            let context = serde_json::json!({ "skill": skill, "slug": slug, "items": items });
            let html = engine.render_with(SKILL_TEMPLATE, &context)
                .chain_with(|| error!("failed to render skill page", "skill" => &skill.name))?;

            write_file(&self.layout.skills().join(format!("{slug}.html")), html)?;
            count += 1;
        }

        Ok(count)
    }
}

fn render_page(engine: &impl Engine, name: &str, target: &Path) -> Result<()> {
    let output = engine.render(name)
        .chain_with(|| error!("failed to render page", "template" => name))?;

    write_file(target, output)?;
    tracing::debug!(template = name, target = %target.display(), "rendered page");
    Ok(())
}
