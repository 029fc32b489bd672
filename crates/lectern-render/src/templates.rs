//! Template engine for rendering site pages.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::views::{DocView, ErrorView, HomeView};

/// Errors that can occur when rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render {template}: {source}")]
    Template {
        template: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Content documents are schema-less; missing nested keys render empty
        env.set_undefined_behavior(UndefinedBehavior::Chainable);

        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .expect("built-in templates are valid");
        }

        Self { env }
    }

    fn render<S: Serialize>(&self, template: &'static str, view: &S) -> Result<String, RenderError> {
        self.env
            .get_template(template)
            .and_then(|tmpl| tmpl.render(view))
            .map_err(|source| RenderError::Template { template, source })
    }

    pub fn render_home(&self, view: &HomeView) -> Result<String, RenderError> {
        self.render("home.html", view)
    }

    pub fn render_doc(&self, view: &DocView) -> Result<String, RenderError> {
        self.render("doc.html", view)
    }

    pub fn render_error(&self, view: &ErrorView) -> Result<String, RenderError> {
        self.render("error.html", view)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", BASE_TEMPLATE),
    ("modals.html", MODALS_TEMPLATE),
    ("nav.html", NAV_TEMPLATE),
    ("home.html", HOME_TEMPLATE),
    ("doc.html", DOC_TEMPLATE),
    ("error.html", ERROR_TEMPLATE),
];

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ chrome.title }} | {{ chrome.site_title }}</title>
  <link rel="stylesheet" href="/assets/site.css">
</head>
<body data-edit-mode="{{ chrome.edit_mode }}" data-form-active="{{ chrome.form_active }}" data-submit-url="{{ chrome.submit_url }}">
  {% include "modals.html" %}
  <div class="inline-controls">
    {% if chrome.edit_mode %}<button type="button" class="edit-toggle" data-control="toggle">{% if chrome.form_active %}Stop editing{% else %}Edit this page{% endif %}</button>
    <button type="button" class="save" data-control="save">Save</button>{% endif %}
    <button type="button" class="discard" data-control="discard" hidden>Discard changes</button>
  </div>
  <header class="site-header">
    <a href="/" class="site-logo">{{ chrome.site_title }}</a>
    <a href="/docs/getting-started/introduction" class="site-link">Docs</a>
  </header>
  {% block content %}{% endblock %}
  <script type="application/json" id="lectern-form">{{ chrome.form_json | safe }}</script>
  <script src="/assets/site.js"></script>
</body>
</html>"##;

const MODALS_TEMPLATE: &str = r##"{% for modal in chrome.modals %}
<div class="modal-overlay" role="dialog" aria-modal="true" aria-labelledby="modal-title-{{ loop.index }}">
  <div class="modal">
    <h2 id="modal-title-{{ loop.index }}">{{ modal.title }}</h2>
    <p>{{ modal.message }}</p>
    <div class="modal-actions">
      {% for action in modal.actions %}
      <button type="button" data-kind="{{ action.kind }}" data-href="{{ action.href }}"{% if action.fetch %} data-fetch="{{ action.fetch }}"{% endif %}>{{ action.name }}</button>
      {% endfor %}
    </div>
  </div>
</div>
{% endfor %}"##;

const NAV_TEMPLATE: &str = r##"<ul class="docs-nav">
{% for section in docs_nav %}
  <li class="docs-nav-section">
    <span class="docs-nav-title">{{ section.title }}</span>
    {% if section.items %}
    <ul>
      {% for item in section.items %}
      <li><a href="{{ item.slug }}">{{ item.title }}</a></li>
      {% endfor %}
    </ul>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const HOME_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<main class="home">
  <section class="hero">
    <h1 data-field="headline">{{ home.headline }}</h1>
    {% if home.hero_video %}<video class="hero-video" src="{{ home.hero_video }}" autoplay muted loop playsinline></video>{% endif %}
  </section>
  <section class="intro">
    <h2><em data-field="description">{{ home.description }}</em></h2>
    <a class="button primary" href="/docs/getting-started/introduction">Get Started</a>
  </section>
  <section class="points">
    {% for point in home.three_points %}
    <div class="point">
      <h3><em data-field="three_points.{{ loop.index0 }}.main">{{ point.main }}</em></h3>
      <p data-field="three_points.{{ loop.index0 }}.supporting">{{ point.supporting }}</p>
    </div>
    {% endfor %}
  </section>
  <section class="setup">
    <h2 class="h1" data-field="setup.headline">{{ home.setup.headline }}</h2>
    <hr>
    <ol class="arrow-list">
      {% for item in home.setup.steps %}
      <li data-field="setup.steps.{{ loop.index0 }}.step">{{ item.step }}</li>
      {% endfor %}
    </ol>
    <a class="button primary" href="/docs/getting-started/introduction">Get Started</a>
  </section>
</main>
{% endblock %}"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<div class="docs-layout">
  <nav class="docs-sidebar">
    {% include "nav.html" %}
  </nav>
  <article class="doc">
    <h1 data-field="frontmatter.title">{{ chrome.title }}</h1>
    <div class="content" data-field="markdownBody" data-format="markdown">
      {{ body_html | safe }}
    </div>
    <footer class="doc-pager">
      {% if prev_page %}<a class="prev" href="{{ prev_page.href }}">{{ prev_page.title }}</a>{% endif %}
      {% if next_page %}<a class="next" href="{{ next_page.href }}">{{ next_page.title }}</a>{% endif %}
    </footer>
  </article>
  {% if headings %}
  <aside class="toc">
    <h2>On this page</h2>
    <ul>
    {% for entry in headings %}
      <li class="toc-level-{{ entry.level }}">
        <a href="#{{ entry.id }}">{{ entry.title }}</a>
      </li>
    {% endfor %}
    </ul>
  </aside>
  {% endif %}
</div>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<main class="error-page">
  <h1>{{ status }}</h1>
  <p>This page could not be loaded.</p>
</main>
{% endblock %}"##;
