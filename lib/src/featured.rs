use rustc_hash::FxHashSet;

use crate::model::{CMSConfig, Identity, SiteMode};
use crate::util::name_key;

/// The normalized names of the projects and packages featured in one mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeaturedSet {
    mode: SiteMode,
    keys: FxHashSet<String>,
}

impl FeaturedSet {
    /// Resolves the featured names for `mode` from the identity's per-mode
    /// lists.
    pub fn resolve(identity: &Identity, mode: SiteMode) -> FeaturedSet {
        let names = match mode {
            SiteMode::JobHunting => &identity.job_hunting_projects,
            SiteMode::ProjectPromotion => &identity.project_promotion,
            SiteMode::SelfPromotion => &identity.identity_projects,
        };

        let keys = names.iter()
            .map(|name| name_key(name))
            .filter(|key| !key.is_empty())
            .collect();

        FeaturedSet { mode, keys }
    }

    pub fn mode(&self) -> SiteMode {
        self.mode
    }

    /// Whether `name` is featured. Case, `-` and `_` are ignored.
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&name_key(name))
    }

    /// Sets the `featured` flag of every project and package in `config`,
    /// clearing it on everything not in this set. Projects match by slug or
    /// by name; packages by package name.
    pub fn apply(&self, config: &mut CMSConfig) {
        let mut count = 0;
        for project in &mut config.projects {
            project.featured = self.contains(&project.slug) || self.contains(&project.name);
            count += project.featured as usize;
        }

        for package in &mut config.pypi_packages {
            package.featured = self.contains(&package.package_name);
            count += package.featured as usize;
        }

        tracing::debug!(mode = %self.mode, featured = count, "assigned featured flags");
    }
}

/// Resolves the featured set for the configured mode and applies it.
pub fn assign_featured(config: &mut CMSConfig) -> FeaturedSet {
    let set = FeaturedSet::resolve(&config.identity, config.modes.current);
    set.apply(config);
    set
}
