//! Binds loaded props to inline drafts and builds the views pages render from.

use serde_json::{json, Map, Value};

use lectern_content::{headings, MarkdownData};
use lectern_forms::{doc_schema, home_schema, DraftError, FieldDescriptor, InlineDraft};
use lectern_render::{embed_json, render_markdown, Chrome, DocView, ErrorView, HomeView, PageLink};

use crate::loaders::{DocProps, HomeProps, NavLink, HOME_PATH};
use crate::session::EditSession;

/// Site-wide settings a view needs.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub site_title: &'a str,
    /// Path and query of the current page
    pub url: &'a str,
}

/// Bind the home props to a draft of the home form.
pub fn home_draft(props: &HomeProps) -> InlineDraft {
    let connection = props.source_provider_connection.clone();
    match &props.home {
        Some(file) => InlineDraft::from_json(file, home_schema(), connection, props.edit_mode),
        None => InlineDraft::empty_json(HOME_PATH, home_schema(), connection, props.edit_mode),
    }
}

/// Bind the doc props to a draft of the doc form.
pub fn doc_draft(props: &DocProps) -> Result<InlineDraft, DraftError> {
    InlineDraft::from_markdown(
        &props.markdown_file,
        doc_schema(),
        props.source_provider_connection.clone(),
        props.edit_mode,
    )
}

/// The form the client script edits: schema, values, group item labels and
/// the sha the values were loaded at, which the script posts back on save.
fn form_json(draft: &InlineDraft) -> Result<String, DraftError> {
    let mut labels = Map::new();
    for field in &draft.schema().fields {
        if let FieldDescriptor::GroupList(group) = field {
            labels.insert(group.name.clone(), json!(draft.item_labels(&group.name)?));
        }
    }

    Ok(embed_json(&json!({
        "schema": draft.schema(),
        "values": draft.values(),
        "labels": labels,
        "status": draft.status(),
        "sha": draft.sha(),
    })))
}

fn chrome(
    ctx: &PageContext<'_>,
    title: String,
    session: &EditSession,
    draft: Option<&InlineDraft>,
    submit_url: String,
) -> Result<Chrome, DraftError> {
    Ok(Chrome {
        title,
        site_title: ctx.site_title.to_string(),
        edit_mode: session.is_editing(),
        form_active: draft.is_some_and(|d| d.is_active()),
        modals: session.modals(ctx.url),
        form_json: match draft {
            Some(draft) => form_json(draft)?,
            None => "{}".to_string(),
        },
        submit_url,
    })
}

/// Build the home view.
pub fn home_view(
    ctx: &PageContext<'_>,
    props: &HomeProps,
    session: &EditSession,
) -> Result<HomeView, DraftError> {
    let draft = home_draft(props);
    let title = draft
        .value("headline")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("Home")
        .to_string();

    Ok(HomeView {
        chrome: chrome(ctx, title, session, Some(&draft), "/api/submit/home".to_string())?,
        home: draft.values().clone(),
    })
}

/// Build a doc view.
pub fn doc_view(
    ctx: &PageContext<'_>,
    slug: &str,
    props: &DocProps,
    session: &EditSession,
) -> Result<DocView, DraftError> {
    let draft = doc_draft(props)?;
    let data: &MarkdownData = &props.markdown_file.data;
    let title = data
        .frontmatter
        .title
        .clone()
        .unwrap_or_else(|| slug.rsplit('/').next().unwrap_or(slug).to_string());

    Ok(DocView {
        chrome: chrome(
            ctx,
            title,
            session,
            Some(&draft),
            format!("/api/submit/docs/{}", slug),
        )?,
        body_html: render_markdown(&data.markdown_body),
        headings: headings(&data.markdown_body),
        docs_nav: props.docs_nav.clone(),
        next_page: page_link(&props.next_page),
        prev_page: page_link(&props.prev_page),
    })
}

fn page_link(link: &NavLink) -> Option<PageLink> {
    let href = link.slug.clone()?;
    Some(PageLink {
        title: link.title.clone().unwrap_or_else(|| href.clone()),
        href,
    })
}

/// Build the view for a page that failed to load.
pub fn error_view(ctx: &PageContext<'_>, status: u16, session: &EditSession) -> ErrorView {
    let title = if status == 404 { "Not found" } else { "Error" };
    ErrorView {
        chrome: Chrome {
            title: title.to_string(),
            site_title: ctx.site_title.to_string(),
            edit_mode: session.is_editing(),
            form_active: false,
            modals: session.modals(ctx.url),
            form_json: "{}".to_string(),
            submit_url: String::new(),
        },
        status,
    }
}
