//! Session authentication endpoints.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::Stream;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{debug, info};

use crate::{
    AppState,
    api::models::{
        auth::{AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, SessionResponse},
        users::CurrentUser,
    },
    auth::{events::SessionEventKind, password, session},
    errors::{Error, Result},
};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    }
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful, session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse> {
    let user = state.store.get_user_by_email(&request.email).await?;

    // Unknown emails and passwordless users pay the same Argon2 cost as a wrong password
    let Some((user, password_hash)) = user.and_then(|u| u.password_hash.clone().map(|hash| (u, hash))) else {
        password::verify_against_nothing(request.password, state.config.auth.password.argon2_params()).await?;
        return Err(invalid_credentials());
    };
    if !password::verify_password_blocking(request.password, password_hash).await? {
        return Err(invalid_credentials());
    }

    let current_user = CurrentUser::try_from(user).map_err(|e| Error::Internal {
        operation: format!("load user role: {e}"),
    })?;
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = session::session_cookie(&token, &state.config);

    info!(user_id = %current_user.id, "user signed in");
    state.session_events.publish(SessionEventKind::SignedIn, current_user.id);

    Ok(LoginResponse {
        session: SessionResponse { user: current_user },
        cookie,
    })
}

/// Sign out (clear the session cookie)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, current_user: Option<CurrentUser>) -> Result<LogoutResponse> {
    if let Some(user) = current_user {
        state.session_events.publish(SessionEventKind::SignedOut, user.id);
    }

    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie: session::cleared_session_cookie(&state.config),
    })
}

/// The current session's user, reloaded from the store
#[utoipa::path(
    get,
    path = "/authentication/session",
    tag = "authentication",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No valid session"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_session(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<SessionResponse>> {
    // The token can outlive the account
    let user = state.store.get_user(current_user.id).await?.ok_or(Error::Unauthenticated {
        message: Some("Session user no longer exists".to_string()),
    })?;
    let user = CurrentUser::try_from(user).map_err(|e| Error::Internal {
        operation: format!("load user role: {e}"),
    })?;

    Ok(Json(SessionResponse { user }))
}

/// Stream of sign-in/sign-out events for the current user
#[utoipa::path(
    get,
    path = "/authentication/session/events",
    tag = "authentication",
    responses(
        (status = 200, description = "Server-sent events; each `data` is a SessionEvent", content_type = "text/event-stream"),
        (status = 401, description = "No valid session"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn session_events(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let user_id = current_user.id;
    let stream = BroadcastStream::new(state.session_events.subscribe()).filter_map(move |result| match result {
        Ok(event) if event.user_id == user_id => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            let name = match event.kind {
                SessionEventKind::SignedIn => "signed_in",
                SessionEventKind::SignedOut => "signed_out",
            };
            Some(Ok(Event::default().event(name).data(data)))
        }
        Ok(_) => None,
        Err(e) => {
            debug!("session event stream lagged: {e}");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::auth::SessionResponse,
        auth::password::{Argon2Params, hash_password},
        db::models::users::UserCreateDBRequest,
        db::store::Store,
        test_utils::*,
        types::Role,
    };
    use axum::http::{StatusCode, header::SET_COOKIE};
    use serde_json::json;

    async fn user_with_password(app: &TestApp, email: &str, password: &str) {
        let params = Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        app.store
            .create_user(&UserCreateDBRequest {
                email: email.to_string(),
                display_name: Some("Nomsa".to_string()),
                password_hash: Some(hash_password(password, params).unwrap()),
                role: Role::Staff,
                creche_id: None,
            })
            .await
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_login_sets_cookie_and_session_works() {
        let app = create_test_app();
        user_with_password(&app, "nomsa@example.org", "correct horse").await;

        let response = app
            .server
            .post("/authentication/login")
            .json(&json!({"email": "nomsa@example.org", "password": "correct horse"}))
            .await;
        response.assert_status_ok();

        let cookie = response.header(SET_COOKIE).to_str().unwrap().to_string();
        assert!(cookie.starts_with("crechectl_session="));
        assert!(cookie.contains("HttpOnly"));
        let body: SessionResponse = response.json();
        assert_eq!(body.user.role, Role::Staff);

        let token_pair = cookie.split(';').next().unwrap().to_string();
        let session = app.server.get("/authentication/session").add_header("cookie", token_pair).await;
        session.assert_status_ok();
        let session: SessionResponse = session.json();
        assert_eq!(session.user.email, "nomsa@example.org");
        assert_eq!(session.user.display_name.as_deref(), Some("Nomsa"));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_user() {
        let app = create_test_app();
        user_with_password(&app, "nomsa@example.org", "correct horse").await;

        for (email, password) in [("nomsa@example.org", "wrong"), ("nobody@example.org", "correct horse")] {
            let response = app
                .server
                .post("/authentication/login")
                .json(&json!({"email": email, "password": password}))
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(response.text(), "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn test_unknown_and_passwordless_users_run_the_hasher() {
        let mut config = create_test_config();
        config.auth.password.argon2_memory_kib = 1024;
        config.auth.password.argon2_iterations = 1;
        let app = create_test_app_with_config(config.clone());
        let passwordless = create_test_user(&app.store, Role::Staff, None).await.email;

        for email in ["nobody@example.org", passwordless.as_str()] {
            let response = app
                .server
                .post("/authentication/login")
                .json(&json!({"email": email, "password": "correct horse"}))
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(response.text(), "Invalid email or password");
        }

        // Unusable hashing parameters surface on the unknown-account path too
        config.auth.password.argon2_iterations = 0;
        let app = create_test_app_with_config(config);
        app.server
            .post("/authentication/login")
            .json(&json!({"email": "nobody@example.org", "password": "correct horse"}))
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_session_requires_cookie() {
        let app = create_test_app();
        app.server.get("/authentication/session").await.assert_status(StatusCode::UNAUTHORIZED);

        let response = app
            .server
            .get("/authentication/session")
            .add_header("cookie", "crechectl_session=not-a-jwt")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "Session is invalid or has expired");
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_and_publishes() {
        let app = create_test_app();
        let user = create_test_user(&app.store, Role::Admin, None).await;
        let mut events = app.session_events.subscribe();

        let (name, value) = app.auth_header(&user);
        let response = app.server.post("/authentication/logout").add_header(name, value).await;
        response.assert_status_ok();
        assert!(response.header(SET_COOKIE).to_str().unwrap().contains("Max-Age=0"));

        let event = events.recv().await.unwrap();
        assert_eq!(event.user_id, user.id);
        assert_eq!(event.kind, crate::auth::events::SessionEventKind::SignedOut);

        // Anonymous logout still succeeds
        app.server.post("/authentication/logout").await.assert_status_ok();
    }
}
