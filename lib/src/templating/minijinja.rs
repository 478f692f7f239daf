use minijinja::{Environment, path_loader};
use minijinja::value::Value;
use serde::Serialize;

use crate::error::Result;
use crate::templating::{Engine, EngineInit, EngineSetup};

#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Result<Environment<'static>>,
}

fn try_init<G: Serialize>(setup: EngineSetup<'_, G>) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_loader(path_loader(setup.templates));

    match serde_json::to_value(setup.globals)? {
        serde_json::Value::Object(globals) => {
            for (name, value) in globals {
                env.add_global(name, Value::from_serializable(&value));
            }
        }
        serde_json::Value::Null => {}
        other => return err!("template globals must be a map", "found" => other),
    }

    let content = setup.content;
    env.add_function("include_content", move |path: &str| ext::include_content(&content, path));

    let links = setup.skill_links;
    env.add_filter("skill_link", move |term: &str| ext::skill_link(&links, term));

    env.add_function("now", ext::now);
    env.add_filter("markdown", ext::markdown);
    env.add_filter("deslug", ext::deslug);
    env.add_filter("date", ext::date);
    env.add_filter("split", ext::split);
    Ok(env)
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init<G: Serialize>(setup: EngineSetup<'_, G>) -> Self::Engine {
        MiniJinjaEngine { env: try_init(setup) }
    }
}

impl Engine for MiniJinjaEngine {
    fn render(&self, name: &str) -> Result<String> {
        let env = self.env.as_ref().map_err(|e| e.clone())?;
        let template = env.get_template(name)?;
        Ok(template.render(())?)
    }

    fn render_with(&self, name: &str, context: &serde_json::Value) -> Result<String> {
        let env = self.env.as_ref().map_err(|e| e.clone())?;
        let template = env.get_template(name)?;
        Ok(template.render(Value::from_serializable(context))?)
    }
}

mod ext {
    use std::collections::BTreeMap;
    use std::path::{Component, Path};

    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use minijinja::{value::{intern, Value}, Error, ErrorKind};
    use pulldown_cmark::{html, Options, Parser};

    /// Reads `path` from the content directory, or `""` if there's no such
    /// file. Paths may not leave the content directory.
    pub fn include_content(root: &Path, path: &str) -> Result<String, Error> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("include_content path {path:?} must be relative to the content directory")
            ));
        }

        match std::fs::read_to_string(root.join(relative)) {
            Ok(string) => Ok(string),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to read content {path:?}: {e}")
            )),
        }
    }

    pub fn skill_link(links: &BTreeMap<String, String>, term: &str) -> Value {
        links.get(&term.trim().to_lowercase())
            .map(|slug| Value::from(slug.as_str()))
            .unwrap_or_else(|| Value::from(()))
    }

    pub fn markdown(value: &str) -> Value {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES;

        let mut output = String::with_capacity(value.len() * 3 / 2);
        html::push_html(&mut output, Parser::new_ext(value, options));
        Value::from_safe_string(output)
    }

    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    /// Formats a timestamp or a date string with the `strftime`-style `fmt`.
    /// Month (`2021-03`) and year (`2021`) precision dates are read as the
    /// first day of the period; `current` and `present` become `Present`.
    pub fn date(value: Value, fmt: &str) -> Result<Value, Error> {
        if let Ok(ts) = value.clone().try_into() {
            let datetime = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| Error::new(
                    ErrorKind::InvalidOperation,
                    "invalid timestamp provided to `date`"
                ))?;

            return Ok(datetime.format(fmt).to_string().into());
        }

        let kind = value.kind();
        let string = value.as_str()
            .map(str::trim)
            .ok_or_else(|| Error::new(
                ErrorKind::InvalidOperation,
                format!("`date` must be applied to a string or integer, found {kind}")
            ))?;

        if string.eq_ignore_ascii_case("current") || string.eq_ignore_ascii_case("present") {
            return Ok(Value::from("Present"));
        }

        let datetime = string.parse::<NaiveDate>().map(|d| d.format(fmt))
            .or_else(|_| NaiveDate::parse_from_str(&format!("{string}-01"), "%Y-%m-%d").map(|d| d.format(fmt)))
            .or_else(|_| NaiveDate::parse_from_str(&format!("{string}-01-01"), "%Y-%m-%d").map(|d| d.format(fmt)))
            .or_else(|_| string.parse::<NaiveDateTime>().map(|dt| dt.format(fmt)))
            .or_else(|_| string.parse::<DateTime<Utc>>().map(|dt| dt.format(fmt)))
            .map_err(|e| Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to parse {string}: {e}")
            ))?;

        Ok(datetime.to_string().into())
    }

    pub fn split(value: &str, pat: &str, n: Option<usize>) -> Result<Value, Error> {
        match n {
            Some(n) => Ok(value.split(pat).nth(n).map(Value::from).unwrap_or(Value::UNDEFINED)),
            None => Ok(value.split(pat).map(intern).collect()),
        }
    }

    pub fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use super::*;

    fn engine(dir: &std::path::Path, templates: &[(&str, &str)]) -> MiniJinjaEngine {
        for (name, contents) in templates {
            let path = dir.join("templates").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        let globals = serde_json::json!({ "identity": { "name": "Ada" } });
        MiniJinjaEngine::init(EngineSetup {
            templates: &dir.join("templates"),
            content: dir.join("content"),
            skill_links: BTreeMap::from([("py".to_string(), "python".to_string())]),
            globals: &globals,
        })
    }

    #[test]
    fn renders_globals_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path(), &[
            ("hello.md.j2", "{{ identity.name }}|{{ 'py' | skill_link }}|{{ 'perl' | skill_link is none }}"),
            ("md.html.j2", "{{ '*hi*' | markdown }}|{{ 'a-b-c' | deslug }}"),
        ]);

        assert_eq!(engine.render("hello.md.j2").unwrap(), "Ada|python|true");
        assert_eq!(engine.render("md.html.j2").unwrap(), "<p><em>hi</em></p>\n|a b c");
    }

    #[test]
    fn includes_content_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/about.md"), "About me.").unwrap();

        let engine = engine(dir.path(), &[
            ("a.j2", "[{{ include_content('about.md') }}][{{ include_content('missing.md') }}]"),
            ("b.j2", "{{ include_content('../secrets') }}"),
        ]);

        assert_eq!(engine.render("a.j2").unwrap(), "[About me.][]");
        assert!(engine.render("b.j2").is_err());
    }

    #[test]
    fn formats_partial_dates() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path(), &[
            ("d.j2", "{{ d | date('%b %Y') }}"),
        ]);

        let render = |d: &str| engine.render_with("d.j2", &serde_json::json!({ "d": d })).unwrap();
        assert_eq!(render("2021-03"), "Mar 2021");
        assert_eq!(render("2019"), "Jan 2019");
        assert_eq!(render("2020-07-04"), "Jul 2020");
        assert_eq!(render("present"), "Present");
    }

    #[test]
    fn missing_templates_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path(), &[]);
        assert!(engine.render("nope.j2").is_err());
    }
}
