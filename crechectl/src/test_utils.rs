//! Test utilities for integration testing (available with `test-utils` feature).

use std::sync::Arc;

use axum_test::TestServer;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{events::SessionEvents, session},
    config::{Config, DatabaseConfig},
    db::{
        InMemoryStore,
        models::{
            creches::{Creche, CrecheCreateDBRequest},
            users::UserCreateDBRequest,
        },
        store::Store,
    },
    types::{CrecheId, Role},
};

/// A router over a fresh in-memory store, plus handles to poke at its state.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub config: Config,
    pub session_events: SessionEvents,
}

impl TestApp {
    /// A `Cookie` header carrying a valid session for `user`.
    pub fn auth_header(&self, user: &CurrentUser) -> (String, String) {
        let token = session::create_session_token(user, &self.config).expect("Failed to create session token");
        (
            "cookie".to_string(),
            format!("{}={token}", self.config.auth.session.cookie_name),
        )
    }
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        admin_email: "admin@test.com".to_string(),
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        // The Prometheus recorder is process-global; tests build many routers
        enable_metrics: false,
        ..Default::default()
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let session_events = SessionEvents::new();
    let state = AppState::builder()
        .store(store.clone())
        .config(config.clone())
        .session_events(session_events.clone())
        .build();

    let router = crate::build_router(state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        store,
        config,
        session_events,
    }
}

pub async fn create_test_creche(store: &InMemoryStore, name: &str, province: Option<&str>) -> Creche {
    store
        .create_creche(&CrecheCreateDBRequest {
            name: name.to_string(),
            province: province.map(str::to_string),
            capacity: Some(20),
            registered: true,
            ..Default::default()
        })
        .await
        .expect("Failed to create test creche")
}

/// A user without a password; authenticate with [`TestApp::auth_header`].
pub async fn create_test_user(store: &InMemoryStore, role: Role, creche_id: Option<CrecheId>) -> CurrentUser {
    let id = Uuid::new_v4();
    let user = store
        .create_user(&UserCreateDBRequest {
            email: format!("testuser_{}@example.com", id.simple()),
            display_name: Some("Test User".to_string()),
            password_hash: None,
            role,
            creche_id,
        })
        .await
        .expect("Failed to create test user");

    CurrentUser::try_from(user).expect("Test user has a known role")
}
