use std::path::Path;
use std::process::ExitCode;

use vitae::{Builder, BuildOptions, Result};
use vitae::model::SiteMode;
use vitae::relations::SkillIndex;

mod flags;
mod log;

fn build(root: &Path, cmd: flags::Build) -> Result<()> {
    let options = BuildOptions {
        api_only: cmd.api_only,
        mode: cmd.mode.as_deref().map(SiteMode::from_name_lossy),
        api_base: cmd.api_base,
    };

    let mut builder = Builder::new(root)?.options(options);
    let report = vitae::timed!("build", builder.build()?);
    println!("wrote {} API documents, {} Markdown pages, {} HTML pages and {} skill pages",
        report.api_documents, report.markdown_pages, report.html_pages, report.skill_pages);

    Ok(())
}

fn audit(root: &Path) -> Result<()> {
    let config = vitae::config::load(root)?;
    let index = SkillIndex::build(&config);
    print!("{}", vitae::audit::audit(&config, &index));
    Ok(())
}

fn skills(root: &Path) -> Result<()> {
    let config = vitae::config::load(root)?;
    let migration = vitae::skills::migrate(&config);
    let path = migration.write(root)?;

    println!("added {} skills from work experience and {} from project languages",
        migration.from_resume, migration.from_github);

    if !migration.orphan_tags.is_empty() {
        println!("tags that map to no skill ({}):", migration.orphan_tags.len());
        for tag in &migration.orphan_tags {
            println!("  {tag}");
        }
    }

    println!("wrote {}; sort the inbox groups, then rename it to skills.toml", path.display());
    Ok(())
}

fn main() -> ExitCode {
    let flags = flags::Folio::from_env_or_exit();
    log::init(flags.verbose);

    let root = flags.root.as_deref().unwrap_or(Path::new("."));
    let result = match flags.subcommand {
        flags::FolioCmd::Build(cmd) => build(root, cmd),
        flags::FolioCmd::Audit(_) => audit(root),
        flags::FolioCmd::Skills(_) => skills(root),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
