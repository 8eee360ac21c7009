//! Extractor resolving the signed-in dashboard user from the session cookie.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
};

/// Find the session cookie and verify it.
///
/// Returns:
/// - None: no session cookie present
/// - Some(Ok(user)): valid token
/// - Some(Err(error)): header unreadable, or every session cookie failed verification
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    let mut last_error = None;
    for (name, value) in cookie_str.split(';').filter_map(|c| c.trim().split_once('=')) {
        if name != cookie_name {
            continue;
        }
        // Browsers can send stale duplicates; any valid one wins
        match session::verify_session_token(value, config) {
            Ok(user) => return Some(Ok(user)),
            Err(e) => last_error = Some(e),
        }
    }
    last_error.map(Err)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                trace!(user_id = %user.id, "session authenticated");
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("session authentication failed: {:?}", e);
                Err(Error::Unauthenticated {
                    message: Some("Session is invalid or has expired".to_string()),
                })
            }
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

/// Endpoints that behave differently for anonymous callers (e.g. logout) take
/// `Option<CurrentUser>`; an invalid session counts as anonymous there.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        Ok(try_jwt_session_auth(parts, &state.config).and_then(|result| result.ok()))
    }
}
