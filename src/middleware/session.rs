use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::Mutex;

use crate::{
    api::AppState,
    db::{Flash, FlashLevel, SessionData, SessionId},
    models::SearchSnapshot,
};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "watchlist_session";

struct SessionState {
    data: SessionData,
    modified: bool,
}

/// Per-session value object handed to handlers through request extensions
///
/// Mutations are buffered and written back to the session store once the
/// handler has produced its response.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    is_new: bool,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(id: SessionId, data: SessionData, is_new: bool) -> Self {
        Self {
            id,
            is_new,
            state: Arc::new(Mutex::new(SessionState {
                data,
                modified: false,
            })),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub async fn user_id(&self) -> Option<i32> {
        self.state.lock().await.data.user_id
    }

    pub async fn log_in(&self, user_id: i32) {
        let mut state = self.state.lock().await;
        state.data.user_id = Some(user_id);
        state.modified = true;
    }

    /// Forgets the user and anything cached on their behalf
    pub async fn log_out(&self) {
        let mut state = self.state.lock().await;
        state.data.user_id = None;
        state.data.last_search = None;
        state.modified = true;
    }

    pub async fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.data.flashes.push(Flash {
            level,
            message: message.into(),
        });
        state.modified = true;
    }

    /// Drains pending flashes for rendering
    pub async fn take_flashes(&self) -> Vec<Flash> {
        let mut state = self.state.lock().await;
        if state.data.flashes.is_empty() {
            return Vec::new();
        }
        state.modified = true;
        std::mem::take(&mut state.data.flashes)
    }

    pub async fn last_search(&self) -> Option<SearchSnapshot> {
        self.state.lock().await.data.last_search.clone()
    }

    /// Replaces the cached search wholesale
    pub async fn replace_search(&self, snapshot: SearchSnapshot) {
        let mut state = self.state.lock().await;
        state.data.last_search = Some(snapshot);
        state.modified = true;
    }

    pub async fn clear_search(&self) {
        let mut state = self.state.lock().await;
        if state.data.last_search.take().is_some() {
            state.modified = true;
        }
    }

    /// Returns the data to persist if anything changed
    async fn pending_write(&self) -> Option<SessionData> {
        let state = self.state.lock().await;
        state.modified.then(|| state.data.clone())
    }
}

/// Reads the session id from the request cookies
pub fn session_id_from_jar(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::parse(cookie.value()))
}

fn session_cookie(id: &SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Loads the session before the handler runs and saves it afterwards
///
/// A missing, malformed or expired cookie starts a fresh session. The fresh
/// session is only persisted, and its cookie only issued, once something is
/// written to it.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let existing = match session_id_from_jar(&jar) {
        Some(id) => match state.sessions.load(&id).await {
            Ok(Some(data)) => Some((id, data)),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session");
                None
            }
        },
        None => None,
    };

    let session = match existing {
        Some((id, data)) => Session::new(id, data, false),
        None => Session::new(SessionId::generate(), SessionData::default(), true),
    };

    request.extensions_mut().insert(session.clone());
    let response = next.run(request).await;

    if let Some(data) = session.pending_write().await {
        if let Err(e) = state.sessions.save(session.id(), &data).await {
            tracing::error!(error = %e, "Failed to save session");
            return response;
        }

        if session.is_new {
            let jar = CookieJar::new().add(session_cookie(session.id()));
            return (jar, response).into_response();
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar_with(cookie_header: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_session_id_from_cookies() {
        let id = SessionId::generate();
        let jar = jar_with(&format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id));
        assert_eq!(session_id_from_jar(&jar), Some(id));
    }

    #[test]
    fn test_session_id_ignores_malformed_cookie() {
        assert_eq!(session_id_from_jar(&jar_with("watchlist_session=not-a-uuid")), None);
        assert_eq!(session_id_from_jar(&CookieJar::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let id = SessionId::generate();
        let cookie = session_cookie(&id);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[tokio::test]
    async fn test_untouched_session_has_nothing_to_write() {
        let session = Session::new(SessionId::generate(), SessionData::default(), true);
        assert!(session.take_flashes().await.is_empty());
        session.clear_search().await;
        assert!(session.pending_write().await.is_none());
    }

    #[tokio::test]
    async fn test_flashes_are_drained_once() {
        let session = Session::new(SessionId::generate(), SessionData::default(), true);
        session.flash(FlashLevel::Info, "Come back soon!").await;

        let flashes = session.take_flashes().await;
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].message, "Come back soon!");
        assert!(session.take_flashes().await.is_empty());
        assert!(session.pending_write().await.is_some());
    }

    #[tokio::test]
    async fn test_log_out_clears_identity_and_search() {
        let data = SessionData {
            user_id: Some(1),
            last_search: Some(SearchSnapshot::default()),
            flashes: Vec::new(),
        };
        let session = Session::new(SessionId::generate(), data, false);

        session.log_out().await;
        assert_eq!(session.user_id().await, None);
        assert!(session.last_search().await.is_none());
    }
}
