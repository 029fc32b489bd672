//! Edit-mode and authentication prompt state for one page view.

use lectern_render::{ActionKind, Modal, ModalAction};

/// Query parameter asking the site to start authentication on arrival.
pub const AUTO_AUTH_MARKER: &str = "autoAuth";

/// Endpoint that clears the preview cookie.
pub const RESET_PREVIEW_PATH: &str = "/api/reset-preview";

/// Where the error recovery lands after resetting preview.
const RECOVERY_URL: &str = "/?autoAuth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    NotEditing,
    Editing,
    AwaitingAuth,
}

/// Per-view session driving the Authentication and Error modals.
///
/// `Editing` and `NotEditing` are fixed by the request's preview flag.
/// `AwaitingAuth` is entered at most once per view and left by cancelling or
/// by leaving the page for the authentication flow.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: EditState,
    prior: EditState,
    auth_url: String,
    error: Option<String>,
}

impl EditSession {
    pub fn start(edit_mode: bool, auth_url: impl Into<String>) -> Self {
        let state = if edit_mode {
            EditState::Editing
        } else {
            EditState::NotEditing
        };

        Self {
            state,
            prior: state,
            auth_url: auth_url.into(),
            error: None,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    /// Record arrival at `url`. Returns true if this arrival raised the prompt.
    pub fn arrive(&mut self, url: &str, authenticated: bool) -> bool {
        if authenticated || self.state == EditState::AwaitingAuth || !has_marker(url) {
            return false;
        }

        tracing::debug!("Arrived with {}, prompting for authentication", AUTO_AUTH_MARKER);
        self.prior = self.state;
        self.state = EditState::AwaitingAuth;
        true
    }

    /// URL that starts the authentication flow, if the prompt is showing.
    pub fn continue_auth(&self) -> Option<&str> {
        (self.state == EditState::AwaitingAuth).then_some(self.auth_url.as_str())
    }

    /// Dismiss the prompt. Returns `url` with the marker removed.
    pub fn cancel_auth(&mut self, url: &str) -> String {
        if self.state == EditState::AwaitingAuth {
            self.state = self.prior;
        }
        strip_marker(url)
    }

    /// Show the Error modal with `message`.
    pub fn content_failed(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Modals to render for `url`, bottom first.
    pub fn modals(&self, url: &str) -> Vec<Modal> {
        let mut modals = Vec::new();

        if self.state == EditState::AwaitingAuth {
            modals.push(Modal {
                title: "Authentication".to_string(),
                message: "To edit this site, you first need to be authenticated.".to_string(),
                actions: vec![
                    ModalAction {
                        name: "Cancel".to_string(),
                        kind: ActionKind::ReplaceUrl,
                        href: strip_marker(url),
                        fetch: None,
                    },
                    ModalAction {
                        name: "Continue".to_string(),
                        kind: ActionKind::Navigate,
                        href: self.auth_url.clone(),
                        fetch: None,
                    },
                ],
            });
        }

        if let Some(message) = &self.error {
            modals.push(Modal {
                title: "Error".to_string(),
                message: message.clone(),
                actions: vec![ModalAction {
                    name: "Continue".to_string(),
                    kind: ActionKind::FetchThenNavigate,
                    href: RECOVERY_URL.to_string(),
                    fetch: Some(RESET_PREVIEW_PATH.to_string()),
                }],
            });
        }

        modals
    }
}

fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

fn is_marker(param: &str) -> bool {
    param.split('=').next() == Some(AUTO_AUTH_MARKER)
}

/// Whether `url` carries the `autoAuth` query parameter.
pub fn has_marker(url: &str) -> bool {
    let (_, query, _) = split_url(url);
    query.is_some_and(|q| q.split('&').any(is_marker))
}

/// Remove the `autoAuth` parameter from `url`, keeping everything else.
pub fn strip_marker(url: &str) -> String {
    let (path, query, fragment) = split_url(url);

    let mut stripped = path.to_string();
    if let Some(query) = query {
        let kept: Vec<&str> = query
            .split('&')
            .filter(|param| !param.is_empty() && !is_marker(param))
            .collect();
        if !kept.is_empty() {
            stripped.push('?');
            stripped.push_str(&kept.join("&"));
        }
    }
    if let Some(fragment) = fragment {
        stripped.push('#');
        stripped.push_str(fragment);
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AUTH_URL: &str = "/api/auth/github";

    fn titles(session: &EditSession, url: &str) -> Vec<String> {
        session.modals(url).into_iter().map(|m| m.title).collect()
    }

    #[test]
    fn starts_from_edit_mode() {
        assert_eq!(EditSession::start(true, AUTH_URL).state(), EditState::Editing);
        assert_eq!(EditSession::start(false, AUTH_URL).state(), EditState::NotEditing);
    }

    #[test]
    fn prompt_is_shown_once() {
        let mut session = EditSession::start(false, AUTH_URL);

        assert!(session.arrive("/?autoAuth", false));
        assert!(!session.arrive("/?autoAuth", false));

        assert_eq!(session.state(), EditState::AwaitingAuth);
        assert_eq!(titles(&session, "/?autoAuth"), vec!["Authentication"]);
    }

    #[test]
    fn no_prompt_without_marker_or_when_authenticated() {
        let mut session = EditSession::start(false, AUTH_URL);
        assert!(!session.arrive("/docs/intro?autoAuthx=1", false));
        assert!(!session.arrive("/", false));

        let mut authed = EditSession::start(true, AUTH_URL);
        assert!(!authed.arrive("/?autoAuth", true));
        assert!(authed.modals("/?autoAuth").is_empty());
    }

    #[test]
    fn continue_leads_to_auth_flow() {
        let mut session = EditSession::start(false, AUTH_URL);
        assert_eq!(session.continue_auth(), None);

        session.arrive("/?autoAuth", false);

        assert_eq!(session.continue_auth(), Some(AUTH_URL));
    }

    #[test]
    fn cancel_strips_only_the_marker() {
        let mut session = EditSession::start(false, AUTH_URL);
        session.arrive("/docs/intro?lang=en&autoAuth&tab=2#install", false);

        let url = session.cancel_auth("/docs/intro?lang=en&autoAuth&tab=2#install");

        assert_eq!(url, "/docs/intro?lang=en&tab=2#install");
        assert_eq!(session.state(), EditState::NotEditing);
        assert!(session.modals(&url).is_empty());
    }

    #[test]
    fn cancel_action_targets_stripped_url() {
        let mut session = EditSession::start(false, AUTH_URL);
        session.arrive("/?autoAuth=true", false);

        let modal = &session.modals("/?autoAuth=true")[0];

        assert_eq!(modal.actions[0].name, "Cancel");
        assert_eq!(modal.actions[0].kind, ActionKind::ReplaceUrl);
        assert_eq!(modal.actions[0].href, "/");
        assert_eq!(modal.actions[1].href, AUTH_URL);
    }

    #[test]
    fn content_failure_overlays_error_modal() {
        let mut session = EditSession::start(true, AUTH_URL);
        session.content_failed("Content not found");

        let modals = session.modals("/");

        assert_eq!(modals.len(), 1);
        assert_eq!(modals[0].title, "Error");
        assert_eq!(modals[0].actions.len(), 1);
        let action = &modals[0].actions[0];
        assert_eq!(action.kind, ActionKind::FetchThenNavigate);
        assert_eq!(action.fetch.as_deref(), Some(RESET_PREVIEW_PATH));
        assert_eq!(action.href, "/?autoAuth");
        assert!(session.is_editing());
    }

    #[test]
    fn strip_marker_edge_cases() {
        assert_eq!(strip_marker("/?autoAuth"), "/");
        assert_eq!(strip_marker("/"), "/");
        assert_eq!(strip_marker("/?a=1"), "/?a=1");
        assert_eq!(strip_marker("/?autoAuth=1&autoAuth"), "/");
        assert!(has_marker("/x?a=1&autoAuth=yes"));
        assert!(!has_marker("/x#autoAuth"));
    }
}
