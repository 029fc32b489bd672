//! Built-in stylesheet and client script.

/// Stylesheet served at `/assets/site.css`.
pub const SITE_CSS: &str = r#":root {
  --color-primary: #ec4815;
  --color-seafoam: #e6faf8;
  --color-ink: #241748;
  --content-max-width: 800px;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  color: var(--color-ink);
  line-height: 1.6;
}

.site-header {
  display: flex;
  gap: 1.5rem;
  align-items: center;
  padding: 1rem 2rem;
}

.site-logo {
  font-weight: 700;
  color: var(--color-primary);
  text-decoration: none;
}

.hero {
  text-align: center;
  padding: 4rem 2rem 2rem;
}

.hero-video {
  display: block;
  max-width: 960px;
  width: 100%;
  margin: 2rem auto 0;
  border-radius: 1rem;
}

.intro {
  max-width: 35rem;
  margin: 0 auto;
  padding: 0 0 3rem;
  text-align: center;
}

.points {
  display: grid;
  gap: 2rem;
  max-width: 1100px;
  margin: 0 auto;
  padding: 0 2rem 4rem;
}

@media (min-width: 800px) {
  .points {
    grid-template-columns: repeat(3, 1fr);
  }
}

.setup {
  background: var(--color-seafoam);
  padding: 4rem 2rem;
}

.button.primary {
  display: inline-block;
  padding: 0.75rem 1.5rem;
  border-radius: 2rem;
  background: var(--color-primary);
  color: white;
  text-decoration: none;
}

.docs-layout {
  display: grid;
  grid-template-columns: 260px minmax(0, var(--content-max-width)) 200px;
  gap: 2rem;
  padding: 2rem;
}

.docs-nav,
.docs-nav ul,
.toc ul {
  list-style: none;
  padding-left: 0.75rem;
}

.docs-nav-title {
  font-weight: 600;
}

.doc-pager {
  display: flex;
  justify-content: space-between;
  margin-top: 3rem;
}

.doc-pager .next {
  margin-left: auto;
}

.inline-controls {
  position: fixed;
  right: 1rem;
  bottom: 1rem;
  display: flex;
  gap: 0.5rem;
  z-index: 10;
}

body[data-form-active="true"] [data-field] {
  outline: 1px dashed var(--color-primary);
}

.modal-overlay {
  position: fixed;
  inset: 0;
  display: flex;
  align-items: center;
  justify-content: center;
  background: rgba(36, 23, 72, 0.5);
  z-index: 20;
}

.modal {
  max-width: 28rem;
  padding: 2rem;
  border-radius: 1rem;
  background: white;
}

.modal-actions {
  display: flex;
  justify-content: flex-end;
  gap: 0.5rem;
}
"#;

/// Client script served at `/assets/site.js`.
///
/// Runs modal actions and the inline editor. Field elements carry a
/// `data-field` path; edits are collected into the values embedded in the
/// `lectern-form` script tag and posted as a whole to the submit URL,
/// together with the sha they were loaded at.
pub const SITE_JS: &str = r#"(function() {
  'use strict';

  var body = document.body;
  var formTag = document.getElementById('lectern-form');
  var form = formTag ? JSON.parse(formTag.textContent) : {};
  var original = JSON.stringify(form.values || {});
  var discardButton = document.querySelector('[data-control="discard"]');

  function setPath(target, path, value) {
    var parts = path.split('.');
    var current = target;
    for (var i = 0; i < parts.length - 1; i++) {
      if (current[parts[i]] === undefined || current[parts[i]] === null) {
        current[parts[i]] = {};
      }
      current = current[parts[i]];
    }
    current[parts[parts.length - 1]] = value;
  }

  function isDirty() {
    return JSON.stringify(form.values || {}) !== original;
  }

  function setActive(active) {
    body.setAttribute('data-form-active', active ? 'true' : 'false');
    document.querySelectorAll('[data-field]').forEach(function(el) {
      if (el.getAttribute('data-format') !== 'markdown') {
        el.contentEditable = active ? 'true' : 'false';
      }
    });
  }

  document.querySelectorAll('[data-field]').forEach(function(el) {
    el.addEventListener('input', function() {
      setPath(form.values, el.getAttribute('data-field'), el.innerText);
      if (discardButton) {
        discardButton.hidden = !isDirty();
      }
    });
  });

  document.querySelectorAll('.modal-actions button').forEach(function(button) {
    button.addEventListener('click', function() {
      var kind = button.getAttribute('data-kind');
      var href = button.getAttribute('data-href');

      if (kind === 'navigate') {
        window.location.href = href;
      } else if (kind === 'replace_url') {
        window.history.replaceState({}, document.title, href);
        var overlay = button.closest('.modal-overlay');
        if (overlay) {
          overlay.remove();
        }
      } else if (kind === 'fetch_then_navigate') {
        fetch(button.getAttribute('data-fetch')).then(function() {
          window.location.href = href;
        });
      }
    });
  });

  document.querySelectorAll('[data-control]').forEach(function(button) {
    button.addEventListener('click', function() {
      var control = button.getAttribute('data-control');

      if (control === 'toggle') {
        setActive(body.getAttribute('data-form-active') !== 'true');
      } else if (control === 'discard') {
        window.location.reload();
      } else if (control === 'save') {
        fetch(body.getAttribute('data-submit-url'), {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ values: form.values || {}, sha: form.sha || null })
        }).then(function(response) {
          if (!response.ok) {
            return response.text().then(function(text) {
              window.alert('Save failed: ' + text);
            });
          }
          window.location.reload();
        });
      }
    });
  });

  setActive(body.getAttribute('data-form-active') === 'true');
})();
"#;
