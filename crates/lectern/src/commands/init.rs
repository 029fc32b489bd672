//! Scaffold a site in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lectern_server::{generate_secret, DOCS_TOC_PATH, HOME_PATH};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing lectern...");

    scaffold(Path::new("."), config_path, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'lectern serve' to start the site.");

    Ok(())
}

/// Files written by `init`, relative to the site root.
const FILES: [(&str, &str); 4] = [
    (HOME_PATH, DEFAULT_HOME),
    (DOCS_TOC_PATH, DEFAULT_TOC),
    (
        "content/docs/getting-started/introduction.md",
        DEFAULT_INTRODUCTION,
    ),
    ("content/docs/getting-started/editing.md", DEFAULT_EDITING),
];

fn scaffold(root: &Path, config_path: &Path, yes: bool) -> Result<()> {
    let content_dir = root.join("content");

    if content_dir.exists() && !yes {
        tracing::warn!("content/ directory already exists. Use --yes to overwrite.");
        return Ok(());
    }

    if !config_path.exists() || yes {
        let config = DEFAULT_CONFIG.replace("{preview_secret}", &generate_secret());
        fs::write(config_path, config)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    for (relative, contents) in FILES {
        let path = root.join(relative);
        if path.exists() && !yes {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Lectern Configuration

[site]
# Site title
title = "My Site"

# Directory containing content/
root = "."

# Directory served under /static
# static_dir = "static"

[server]
host = "127.0.0.1"
port = 3000

# Signs the preview cookie. Keep it out of public repositories.
preview_secret = "{preview_secret}"

[github]
# Where the authentication flow for editors starts
auth_url = "/api/auth/github"
"#;

const DEFAULT_HOME: &str = r#"{
  "title": "My Site",
  "headline": "Edit your site where it lives",
  "description": "Content is plain JSON and Markdown in your repository. Editors change it in place.",
  "three_points": [
    {
      "main": "Inline editing",
      "supporting": "Click a headline and start typing.",
      "_template": "selling_point"
    },
    {
      "main": "Your repository",
      "supporting": "Every save is a commit on your branch.",
      "_template": "selling_point"
    },
    {
      "main": "No database",
      "supporting": "Pages are read straight from content files.",
      "_template": "selling_point"
    }
  ],
  "setup": {
    "headline": "Get set up",
    "steps": [
      { "step": "Run lectern init", "_template": "setup_point" },
      { "step": "Run lectern serve", "_template": "setup_point" },
      { "step": "Open the site with ?autoAuth to start editing", "_template": "setup_point" }
    ]
  }
}
"#;

const DEFAULT_TOC: &str = r#"[
  {
    "title": "Getting Started",
    "items": [
      { "title": "Introduction", "slug": "/docs/getting-started/introduction" },
      { "title": "Editing", "slug": "/docs/getting-started/editing" }
    ]
  }
]
"#;

const DEFAULT_INTRODUCTION: &str = r#"---
title: Introduction
next: /docs/getting-started/editing
---
Welcome to your site.

## Content layout

- `content/pages/home.json` holds the home page.
- `content/docs/` holds one Markdown file per doc.
- `content/toc-doc.json` holds the docs navigation.
"#;

const DEFAULT_EDITING: &str = r#"---
title: Editing
prev: /docs/getting-started/introduction
---
Open any page with `?autoAuth` to sign in and edit it in place.

## Saving

Saved edits are committed to the branch you are previewing.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::check::check_site;
    use lectern_forms::home_schema;

    #[test]
    fn scaffolds_a_site_that_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("site.toml");

        scaffold(dir.path(), &config, false).unwrap();

        assert!(config.exists());
        assert!(dir.path().join(HOME_PATH).exists());
        let written = crate::commands::load_config(&config).unwrap();
        let secret = written.server.preview_secret.unwrap();
        assert_eq!(secret.len(), 64);
        assert!(!secret.contains('{'));
        assert!(check_site(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn default_home_matches_the_home_form() {
        let home: serde_json::Value = serde_json::from_str(DEFAULT_HOME).unwrap();

        assert!(home_schema().validate(&home).is_ok());
    }

    #[test]
    fn keeps_existing_content_without_yes() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("site.toml");
        let home = dir.path().join(HOME_PATH);
        fs::create_dir_all(home.parent().unwrap()).unwrap();
        fs::write(&home, "{}").unwrap();

        scaffold(dir.path(), &config, false).unwrap();

        assert_eq!(fs::read_to_string(&home).unwrap(), "{}");
        assert!(!config.exists());
    }
}
