//! Site server implementation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, StatusCode, Uri,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use lectern_content::{
    ContentError, ContentFetcher, DefaultSourceProvider, LocalSource, PreviewData,
    SourceConnection, DEFAULT_API_BASE,
};
use lectern_forms::{DraftError, InlineDraft, PageKind};
use lectern_render::{RenderError, TemplateEngine, SITE_CSS, SITE_JS};

use crate::config::SiteConfig;
use crate::loaders::{
    doc_path, is_valid_slug, load_doc, load_home, DocProps, HomeProps, LoaderError, PageRequest,
    HOME_PATH,
};
use crate::page::{doc_view, error_view, home_view, PageContext};
use crate::preview::{clear_preview_cookie, preview_cookie, read_preview, PreviewKey};
use crate::session::{EditSession, RESET_PREVIEW_PATH};

/// Configuration for the site server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Site title
    pub site_title: String,

    /// Directory containing `content/`
    pub content_root: PathBuf,

    /// Directory served under `/static`
    pub static_dir: Option<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Base URL of the GitHub API
    pub api_base: String,

    /// Where the authentication flow starts
    pub auth_url: String,

    /// Mark the preview cookie `Secure`
    pub secure_cookies: bool,

    /// Secret the preview cookie is signed with
    pub preview_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

impl From<&SiteConfig> for ServerConfig {
    fn from(config: &SiteConfig) -> Self {
        Self {
            site_title: config.site.title.clone(),
            content_root: config.site.root.clone(),
            static_dir: config.site.static_dir.clone(),
            port: config.server.port,
            host: config.server.host.clone(),
            open: true,
            api_base: config.github.api_base.clone(),
            auth_url: config.github.auth_url.clone(),
            secure_cookies: config.server.secure_cookies,
            preview_secret: config.server.preview_secret.clone(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Editing requires preview mode")]
    PreviewRequired,

    #[error("Invalid preview data: {0}")]
    InvalidPreview(String),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ServerError {
    /// HTTP status a handler responds with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PreviewRequired => StatusCode::FORBIDDEN,
            Self::InvalidPreview(_) => StatusCode::BAD_REQUEST,
            Self::Loader(LoaderError::InvalidSlug(_)) => StatusCode::NOT_FOUND,
            Self::Loader(LoaderError::Content(e)) | Self::Content(e) => content_status(e),
            Self::Draft(DraftError::Inactive | DraftError::NotEditable) => StatusCode::FORBIDDEN,
            Self::Draft(DraftError::Serialize { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Draft(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BindError(..) | Self::InvalidAddress(_) | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn content_status(error: &ContentError) -> StatusCode {
    match error {
        ContentError::NotFound { .. } => StatusCode::NOT_FOUND,
        ContentError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        ContentError::Api { status: 409, .. } => StatusCode::CONFLICT,
        ContentError::Api { .. } | ContentError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}: {}", status, self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Shared server state.
pub struct AppState {
    config: ServerConfig,
    fetcher: ContentFetcher,
    templates: TemplateEngine,
    preview_key: PreviewKey,
}

impl AppState {
    pub fn new(config: ServerConfig, fetcher: ContentFetcher) -> Self {
        let preview_key = match config.preview_secret.as_deref() {
            Some(secret) if !secret.is_empty() => PreviewKey::from_secret(secret),
            _ => {
                tracing::warn!(
                    "No [server] preview_secret configured; preview sessions end when the server restarts"
                );
                PreviewKey::generate()
            }
        };

        Self {
            config,
            fetcher,
            templates: TemplateEngine::new(),
            preview_key,
        }
    }

    fn page_request(&self, headers: &HeaderMap, query: HashMap<String, String>) -> PageRequest {
        let mut request = PageRequest::with_preview(read_preview(headers, &self.preview_key));
        request.query = query;
        request
    }

    /// The request's preview context, if it may write to a fork.
    fn require_preview(&self, headers: &HeaderMap) -> Result<PageRequest, ServerError> {
        let request = self.page_request(headers, HashMap::new());
        if request.preview && request.connection().is_remote() {
            Ok(request)
        } else {
            Err(ServerError::PreviewRequired)
        }
    }

    fn session(&self, request: &PageRequest, url: &str) -> EditSession {
        let mut session = EditSession::start(request.preview, self.config.auth_url.as_str());
        session.arrive(url, request.preview);
        session
    }

    fn page_context<'a>(&'a self, url: &'a str) -> PageContext<'a> {
        PageContext {
            site_title: &self.config.site_title,
            url,
        }
    }
}

/// Site server.
pub struct SiteServer {
    config: ServerConfig,
}

impl SiteServer {
    /// Create a new site server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Start serving.
    pub async fn start(self) -> Result<(), ServerError> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| ServerError::InvalidAddress(address.clone()))?;

        let api_base = if self.config.api_base.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            self.config.api_base.clone()
        };
        let local = LocalSource::new(self.config.content_root.clone());
        let fetcher = ContentFetcher::new(DefaultSourceProvider::new(local, api_base));

        let state = Arc::new(AppState::new(self.config.clone(), fetcher));
        let app = router(state);

        tracing::info!(
            "Serving {} at http://{}",
            self.config.content_root.display(),
            addr
        );

        // Open browser if configured
        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Could not open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the site router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get(home_page))
        .route("/docs/{*slug}", get(doc_page))
        .route("/api/props/home", get(home_props))
        .route("/api/props/docs/{*slug}", get(doc_props))
        .route(RESET_PREVIEW_PATH, get(reset_preview))
        .route("/api/preview", post(enter_preview))
        .route("/api/submit/home", post(submit_home))
        .route("/api/submit/docs/{*slug}", post(submit_doc))
        .route("/assets/site.css", get(stylesheet))
        .route("/assets/site.js", get(script));

    if let Some(dir) = &state.config.static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.with_state(state)
}

/// Handler for the home page.
async fn home_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let request = state.page_request(&headers, query);
    let url = uri.to_string();
    let mut session = state.session(&request, &url);

    let props = load_home(&state.fetcher, &request).await?;
    if let Some(message) = &props.preview_error {
        session.content_failed(message.as_str());
    }

    let view = home_view(&state.page_context(&url), &props, &session)?;
    Ok(Html(state.templates.render_home(&view)?).into_response())
}

/// Handler for doc pages.
///
/// A missing doc, or a neighbour reference outside the content root, renders
/// a 404 page with the same Error modal the home page shows for missing
/// content.
async fn doc_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let request = state.page_request(&headers, query);
    let url = uri.to_string();
    let mut session = state.session(&request, &url);
    let ctx = state.page_context(&url);

    match load_doc(&state.fetcher, &request, &slug).await {
        Ok(props) => {
            let view = doc_view(&ctx, &slug, &props, &session)?;
            Ok(Html(state.templates.render_doc(&view)?).into_response())
        }
        Err(e) if e.is_not_found() || e.is_invalid_path() => {
            tracing::warn!("{}", e);
            session.content_failed(e.to_string());
            let html = state.templates.render_error(&error_view(&ctx, 404, &session))?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(LoaderError::InvalidSlug(slug)) => {
            tracing::debug!("Rejected doc slug '{}'", slug);
            let html = state.templates.render_error(&error_view(&ctx, 404, &session))?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Handler for the home page props.
async fn home_props(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HomeProps>, ServerError> {
    let request = state.page_request(&headers, HashMap::new());
    Ok(Json(load_home(&state.fetcher, &request).await?))
}

/// Handler for doc page props.
async fn doc_props(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DocProps>, ServerError> {
    let request = state.page_request(&headers, HashMap::new());
    Ok(Json(load_doc(&state.fetcher, &request, &slug).await?))
}

/// Handler that leaves preview mode.
async fn reset_preview() -> impl IntoResponse {
    tracing::debug!("Clearing preview data");
    ([(SET_COOKIE, clear_preview_cookie())], Json(json!({})))
}

/// Handler that enters preview mode with the posted preview data.
async fn enter_preview(
    State(state): State<Arc<AppState>>,
    Json(data): Json<PreviewData>,
) -> Result<Response, ServerError> {
    if data.fork_full_name.trim().is_empty() {
        return Err(ServerError::InvalidPreview(
            "fork_full_name is required".to_string(),
        ));
    }

    let cookie = preview_cookie(&data, &state.preview_key, state.config.secure_cookies)
        .map_err(|e| ServerError::InvalidPreview(e.to_string()))?;

    tracing::info!(
        "Entering preview of {}",
        SourceConnection::from_preview(Some(&data))
    );

    Ok(([(SET_COOKIE, cookie)], StatusCode::NO_CONTENT).into_response())
}

/// Body of a submit request.
#[derive(Debug, Deserialize)]
struct Submit {
    /// The whole form
    values: Value,
    /// Sha the values were loaded at; absent for a document that did not exist
    #[serde(default)]
    sha: Option<String>,
}

/// Handler that saves the home page.
async fn submit_home(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(submit): Json<Submit>,
) -> Result<Json<Value>, ServerError> {
    let request = state.require_preview(&headers)?;
    let connection = request.connection();

    let fetched = state.fetcher.fetch_json(HOME_PATH, &connection).await;
    let draft = match fetched {
        Ok(file) => InlineDraft::from_json(&file, PageKind::Home.schema(), connection, true),
        Err(e) if e.is_not_found() => {
            InlineDraft::empty_json(HOME_PATH, PageKind::Home.schema(), connection, true)
        }
        Err(e) => return Err(e.into()),
    };

    save(&state, draft, submit).await
}

/// Handler that saves a doc page.
async fn submit_doc(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(submit): Json<Submit>,
) -> Result<Json<Value>, ServerError> {
    let request = state.require_preview(&headers)?;
    if !is_valid_slug(&slug) {
        return Err(LoaderError::InvalidSlug(slug).into());
    }
    let connection = request.connection();

    let file = state
        .fetcher
        .fetch_markdown(&doc_path(&slug), &connection)
        .await?;
    let draft = InlineDraft::from_markdown(&file, PageKind::Doc.schema(), connection, true)?;

    save(&state, draft, submit).await
}

/// Write the posted values against the sha the editor loaded. A newer commit
/// on the branch makes the write conflict.
async fn save(
    state: &AppState,
    mut draft: InlineDraft,
    submit: Submit,
) -> Result<Json<Value>, ServerError> {
    draft.set_base_sha(submit.sha);
    draft.replace(submit.values)?;
    let submission = draft.submit()?;

    let receipt = state
        .fetcher
        .save(&submission.request, &submission.connection)
        .await?;
    draft.mark_saved(&receipt);

    tracing::info!("Saved {} to {}", draft.path(), draft.connection());

    Ok(Json(json!({ "path": draft.path(), "sha": draft.sha() })))
}

async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], SITE_CSS)
}

async fn script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript")], SITE_JS)
}
