//! Content check command.
//!
//! The site serves whatever the content files say; a `next` link to a doc
//! that does not exist only shows up when a viewer opens the page. `check`
//! finds those problems up front.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use walkdir::WalkDir;

use lectern_content::MarkdownData;
use lectern_forms::home_schema;
use lectern_server::loaders::reference_path;
use lectern_server::{DOCS_TOC_PATH, HOME_PATH};

use super::load_config;

/// Run the check command.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    tracing::info!("Checking {}", config.site.root.join("content").display());

    let problems = check_site(&config.site.root)?;

    if problems.is_empty() {
        tracing::info!("No problems found");
        return Ok(());
    }

    for problem in &problems {
        tracing::warn!("{}", problem);
    }

    anyhow::bail!("{} problem(s) found", problems.len())
}

/// A problem in one content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// File path relative to the site root
    pub path: String,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Check every content file under `root`.
pub fn check_site(root: &Path) -> Result<Vec<Problem>> {
    let mut problems = Vec::new();

    check_home(root, &mut problems);
    check_toc(root, &mut problems);

    let docs_dir = root.join("content").join("docs");
    if docs_dir.exists() {
        for entry in WalkDir::new(&docs_dir).sort_by_file_name() {
            let entry = entry.context("Failed to walk docs directory")?;
            let path = entry.path();

            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "md") {
                check_doc(root, path, &mut problems);
            }
        }
    }

    Ok(problems)
}

fn problem(path: impl Into<String>, message: impl Into<String>) -> Problem {
    Problem {
        path: path.into(),
        message: message.into(),
    }
}

fn read_json(root: &Path, relative: &str, problems: &mut Vec<Problem>) -> Option<Value> {
    let contents = match fs::read_to_string(root.join(relative)) {
        Ok(contents) => contents,
        Err(e) => {
            problems.push(problem(relative, format!("cannot be read: {}", e)));
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            problems.push(problem(relative, format!("invalid JSON: {}", e)));
            None
        }
    }
}

fn check_home(root: &Path, problems: &mut Vec<Problem>) {
    let Some(home) = read_json(root, HOME_PATH, problems) else {
        return;
    };

    if let Err(violations) = home_schema().validate(&home) {
        for violation in violations {
            problems.push(problem(HOME_PATH, violation.to_string()));
        }
    }
}

fn check_toc(root: &Path, problems: &mut Vec<Problem>) {
    let Some(toc) = read_json(root, DOCS_TOC_PATH, problems) else {
        return;
    };

    let Some(sections) = toc.as_array() else {
        problems.push(problem(DOCS_TOC_PATH, "expected a list of sections"));
        return;
    };

    let slugs = sections
        .iter()
        .filter_map(|section| section.get("items").and_then(Value::as_array))
        .flatten()
        .filter_map(|item| item.get("slug").and_then(Value::as_str));

    for slug in slugs {
        if !root.join(reference_path(slug)).exists() {
            problems.push(problem(
                DOCS_TOC_PATH,
                format!("links to {}, which does not exist", slug),
            ));
        }
    }
}

fn check_doc(root: &Path, path: &Path, problems: &mut Vec<Problem>) {
    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            problems.push(problem(relative, format!("cannot be read: {}", e)));
            return;
        }
    };

    let doc = match MarkdownData::parse(&source) {
        Ok(doc) => doc,
        Err(e) => {
            problems.push(problem(relative, e.to_string()));
            return;
        }
    };

    let references = [
        ("next", doc.frontmatter.next.as_deref()),
        ("prev", doc.frontmatter.prev.as_deref()),
    ];

    for (key, reference) in references {
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            continue;
        };
        if !root.join(reference_path(reference)).exists() {
            problems.push(problem(
                relative.clone(),
                format!("{} points to {}, which does not exist", key, reference),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn valid_site(root: &Path) {
        write(root, HOME_PATH, r#"{ "headline": "Hi" }"#);
        write(
            root,
            DOCS_TOC_PATH,
            r#"[{ "title": "Docs", "items": [{ "title": "Intro", "slug": "/docs/intro" }] }]"#,
        );
        write(root, "content/docs/intro.md", "---\ntitle: Intro\n---\nHello\n");
    }

    #[test]
    fn valid_site_has_no_problems() {
        let dir = tempfile::tempdir().unwrap();
        valid_site(dir.path());

        assert_eq!(check_site(dir.path()).unwrap(), vec![]);
    }

    #[test]
    fn reports_broken_neighbour_references() {
        let dir = tempfile::tempdir().unwrap();
        valid_site(dir.path());
        write(
            dir.path(),
            "content/docs/guide.md",
            "---\ntitle: Guide\nnext: /docs/missing\nprev: /docs/intro\n---\n",
        );

        let problems = check_site(dir.path()).unwrap();

        assert_eq!(
            problems,
            vec![problem(
                "content/docs/guide.md",
                "next points to /docs/missing, which does not exist"
            )]
        );
    }

    #[test]
    fn numeric_reference_is_checked_as_a_path() {
        let dir = tempfile::tempdir().unwrap();
        valid_site(dir.path());
        write(dir.path(), "content/docs/guide.md", "---\ntitle: Guide\nnext: 3\n---\n");

        let problems = check_site(dir.path()).unwrap();

        assert_eq!(
            problems,
            vec![problem(
                "content/docs/guide.md",
                "next points to 3, which does not exist"
            )]
        );
    }

    #[test]
    fn reports_home_values_that_do_not_match_the_form() {
        let dir = tempfile::tempdir().unwrap();
        valid_site(dir.path());
        write(dir.path(), HOME_PATH, r#"{ "headline": 3, "three_points": {} }"#);

        let problems = check_site(dir.path()).unwrap();

        assert_eq!(problems.len(), 2);
        assert!(problems.iter().all(|p| p.path == HOME_PATH));
        assert!(problems[0].message.starts_with("headline"));
    }

    #[test]
    fn reports_missing_files_and_bad_frontmatter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/docs/broken.md", "---\ntitle: [unclosed\n---\n");

        let problems = check_site(dir.path()).unwrap();

        let paths: Vec<&str> = problems.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec![HOME_PATH, DOCS_TOC_PATH, "content/docs/broken.md"]);
    }

    #[test]
    fn reports_dangling_toc_links() {
        let dir = tempfile::tempdir().unwrap();
        valid_site(dir.path());
        write(
            dir.path(),
            DOCS_TOC_PATH,
            r#"[{ "title": "Docs", "items": [{ "title": "Gone", "slug": "/docs/gone" }] }]"#,
        );

        let problems = check_site(dir.path()).unwrap();

        assert_eq!(
            problems,
            vec![problem(DOCS_TOC_PATH, "links to /docs/gone, which does not exist")]
        );
    }
}
