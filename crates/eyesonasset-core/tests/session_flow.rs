mod common;

use chrono::Duration;

use common::{dead_base_url, BackendState, FakeBackend, Harness, ISSUED_TOKEN};
use eyesonasset_core::auth::{AuthGateway, Clock, Credentials, LoginEncoding, LoginError, SessionStore};
use eyesonasset_core::auth::gateway::LOGIN_FALLBACK_MESSAGE;
use eyesonasset_core::routing::{GuardDecision, NavigationLog};
use eyesonasset_core::Config;

// -------------------------------------------------------------------------
// Login
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_login_then_protected_navigation_allowed() {
    let backend = FakeBackend::start().await;
    let h = Harness::new(&backend.config());

    let record = h
        .gateway
        .sign_in(&Credentials::new("eyesonasset", "secret"), h.store.as_ref())
        .await
        .unwrap();

    assert_eq!(record.token(), ISSUED_TOKEN);
    assert_eq!(record.time_until_expiry(h.clock.now()), Duration::seconds(3600));

    let mut nav = NavigationLog::new();
    assert_eq!(h.guard.navigate("/app/owner", &mut nav), GuardDecision::ProtectedAllowed);
    assert_eq!(nav.location(), Some("/app/owner"));

    h.clock.advance(Duration::seconds(3599));
    assert!(h.evaluator.is_valid());

    h.clock.advance(Duration::seconds(1));
    assert_eq!(h.guard.evaluate("/app/owner"), GuardDecision::RedirectToLogin);
    assert!(h.store.read().is_none());
}

#[tokio::test]
async fn test_login_page_redirects_home_once_signed_in() {
    let backend = FakeBackend::start().await;
    let h = Harness::new(&backend.config());

    assert_eq!(h.guard.evaluate("/auth/login"), GuardDecision::PublicAllowed);

    h.gateway
        .sign_in(&Credentials::new("eyesonasset", "secret"), h.store.as_ref())
        .await
        .unwrap();

    assert_eq!(h.guard.evaluate("/auth/login"), GuardDecision::RedirectToHome);
}

#[tokio::test]
async fn test_missing_expires_in_uses_fallback() {
    let backend = FakeBackend::start_with(BackendState {
        expires_in: None,
        ..BackendState::default()
    })
    .await;
    let h = Harness::new(&backend.config());

    let record = h
        .gateway
        .sign_in(&Credentials::new("eyesonasset", "secret"), h.store.as_ref())
        .await
        .unwrap();

    assert_eq!(record.time_until_expiry(h.clock.now()), Duration::hours(24));
}

#[tokio::test]
async fn test_rejected_login_surfaces_detail_and_stores_nothing() {
    let backend = FakeBackend::start().await;
    let h = Harness::new(&backend.config());

    let err = h
        .gateway
        .sign_in(&Credentials::new("eyesonasset", "wrong"), h.store.as_ref())
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Rejected { status: 401, .. }));
    assert_eq!(err.user_message(), "Credenciais inválidas");
    assert!(h.store.read().is_none());
    // No retry
    assert_eq!(backend.with_state(|s| s.login_calls), 1);
}

#[tokio::test]
async fn test_unreachable_backend_gives_generic_message() {
    let config = Config {
        api_base_url: dead_base_url().await,
        request_timeout_secs: 2,
        ..Config::default()
    };
    let gateway = AuthGateway::new(&config).unwrap();

    let err = gateway
        .login(&Credentials::new("eyesonasset", "secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Unreachable(_)));
    assert_eq!(err.user_message(), LOGIN_FALLBACK_MESSAGE);
}

#[tokio::test]
async fn test_form_encoded_login() {
    let backend = FakeBackend::start().await;
    let config = Config {
        login_encoding: LoginEncoding::Form,
        ..backend.config()
    };
    let gateway = AuthGateway::new(&config).unwrap();

    let login = gateway
        .login(&Credentials::new("eyesonasset", "secret"))
        .await
        .unwrap();

    assert_eq!(login.access_token, ISSUED_TOKEN);
    let content_type = backend.with_state(|s| s.last_login_content_type.clone()).unwrap();
    assert!(content_type.starts_with("application/x-www-form-urlencoded"));
}

// -------------------------------------------------------------------------
// Registration
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_register_new_account() {
    let backend = FakeBackend::start().await;
    let gateway = AuthGateway::new(&backend.config()).unwrap();

    let user = gateway
        .register(&Credentials::new("new-user", "pw"))
        .await
        .unwrap();

    assert_eq!(user.login, "new-user");
    assert!(user.is_active);
}

#[tokio::test]
async fn test_register_duplicate_login() {
    let backend = FakeBackend::start().await;
    let gateway = AuthGateway::new(&backend.config()).unwrap();

    let err = gateway
        .register(&Credentials::new("taken", "pw"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Login já registrado");
}

// -------------------------------------------------------------------------
// Logout
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_logout_after_login() {
    let backend = FakeBackend::start().await;
    let config = backend.config();
    let h = Harness::new(&config);
    h.gateway
        .sign_in(&Credentials::new("eyesonasset", "secret"), h.store.as_ref())
        .await
        .unwrap();

    let logout = eyesonasset_core::auth::LogoutAction::new(h.store.clone(), &config.routes.login_path);
    let mut nav = NavigationLog::new();
    logout.logout(&mut nav);
    logout.logout(&mut nav);

    assert!(!h.evaluator.is_valid());
    assert_eq!(nav.location(), Some("/auth/login"));
    assert_eq!(h.guard.evaluate("/app/owner"), GuardDecision::RedirectToLogin);
}
