mod common;

use axum::http::Method;
use calebe_core::auth::{CredentialStore, FileCredentialStore};
use calebe_core::forms::Credentials;
use calebe_core::models::Role;
use calebe_core::{ApiError, SessionError};

use common::{manager, spawn_api, LogoutReply, STAFF_TOKEN};

const SESSION_FILE: &str = "session.json";

#[tokio::test]
async fn leader_login_authorizes_later_requests() {
    let (addr, api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session = manager(addr, &dir.path().join(SESSION_FILE));
    let mut changes = session.subscribe();

    let user = session
        .login(&Credentials::new("a@b.com", "x"))
        .await
        .expect("login");
    assert_eq!(user.role, Role::Leader);
    assert!(session.is_signed());
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow_and_update().signed());

    let login = api.last(Method::POST, "/login");
    assert_eq!(login.authorization, None);
    assert_eq!(login.body, serde_json::json!({"email": "a@b.com", "password": "x"}));

    let challenges = session.api().list_challenges().await.expect("challenges");
    assert_eq!(challenges.len(), 1);
    assert_eq!(
        api.last(Method::GET, "/desafio").authorization.as_deref(),
        Some(format!("Bearer {}", STAFF_TOKEN).as_str())
    );

    let persisted = FileCredentialStore::new(dir.path().join(SESSION_FILE))
        .load()
        .expect("load")
        .expect("record persisted");
    assert_eq!(persisted.token, STAFF_TOKEN);
    assert_eq!(persisted.user.id, 1);
}

#[tokio::test]
async fn member_login_is_refused_and_nothing_persisted() {
    let (addr, _api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE);
    let session = manager(addr, &path);

    let err = session
        .login(&Credentials::new("membro@igreja.org", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::AccessNotPermitted { role: Role::Member }));
    assert!(!session.is_signed());
    assert!(session.api().authorization_header().is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn rejected_credentials_keep_field_errors() {
    let (addr, _api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session = manager(addr, &dir.path().join(SESSION_FILE));

    let err = session
        .login(&Credentials::new("a@b.com", "wrong"))
        .await
        .unwrap_err();
    match err {
        SessionError::Api(ApiError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "password");
            assert_eq!(errors[0].rule.as_deref(), Some("exists"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!session.is_signed());
}

#[tokio::test]
async fn persisted_session_is_restored_at_startup() {
    let (addr, api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE);
    std::fs::write(
        &path,
        r#"{"token":"t1","user":{"id":1,"nome":"Ana","perfil":"admin"}}"#,
    )
    .unwrap();

    let session = manager(addr, &path);
    assert!(!session.is_signed());
    let restored = session.initialize();
    assert!(restored.signed());
    assert_eq!(session.api().authorization_header().as_deref(), Some("Bearer t1"));

    session.api().list_challenges().await.expect("challenges");
    assert_eq!(api.last(Method::GET, "/desafio").authorization.as_deref(), Some("Bearer t1"));
}

#[tokio::test]
async fn partial_persisted_record_starts_signed_out() {
    let (addr, _api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE);
    std::fs::write(&path, r#"{"token":"t1"}"#).unwrap();

    let session = manager(addr, &path);
    assert!(!session.initialize().signed());
    assert!(session.api().authorization_header().is_none());
}

#[tokio::test]
async fn unauthorized_response_clears_the_session() {
    let (addr, _api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE);
    let session = manager(addr, &path);
    session.login(&Credentials::new("a@b.com", "x")).await.expect("login");
    assert!(path.exists());

    let mut changes = session.subscribe();
    let err = session.api().list_teams().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!session.is_signed());
    assert!(!path.exists());
    assert!(changes.has_changed().unwrap());
    assert!(!changes.borrow_and_update().signed());
}

#[tokio::test]
async fn requests_without_session_are_unauthorized() {
    let (addr, api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session = manager(addr, &dir.path().join(SESSION_FILE));

    let err = session.api().list_challenges().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "E_UNAUTHORIZED_ACCESS"));
    assert_eq!(api.last(Method::GET, "/desafio").authorization, None);
}

#[tokio::test]
async fn logout_clears_state_whatever_the_server_answers() {
    for reply in [LogoutReply::Empty, LogoutReply::Malformed, LogoutReply::ServerError] {
        let (addr, api) = spawn_api().await;
        api.set_logout_reply(reply);
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE);
        let session = manager(addr, &path);
        session.login(&Credentials::new("a@b.com", "x")).await.expect("login");

        session.logout().await.expect("logout");
        assert!(!session.is_signed(), "{:?}", reply);
        assert!(!path.exists(), "{:?}", reply);
        assert_eq!(
            api.last(Method::POST, "/logout").authorization.as_deref(),
            Some("Bearer t1")
        );
    }
}

#[tokio::test]
async fn logout_clears_state_when_server_is_unreachable() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE);
    std::fs::write(
        &path,
        r#"{"token":"t1","user":{"id":1,"nome":"Ana","perfil":"lider"}}"#,
    )
    .unwrap();

    let session = manager(addr, &path);
    assert!(session.initialize().signed());

    session.logout().await.expect("logout");
    assert!(!session.is_signed());
    assert!(!path.exists());
    assert!(session.api().authorization_header().is_none());
}

#[tokio::test]
async fn password_reset_uses_link_token_and_signs_out() {
    let (addr, api) = spawn_api().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE);
    let session = manager(addr, &path);
    session.login(&Credentials::new("a@b.com", "x")).await.expect("login");

    let payload = calebe_core::forms::PasswordResetForm {
        password: "nova".to_string(),
        confirm_password: "nova".to_string(),
    }
    .into_payload()
    .unwrap();
    session
        .complete_password_reset("link-token", 5, &payload)
        .await
        .expect("reset");

    let seen = api.last(Method::PUT, "/usuario/5");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer link-token"));
    assert_eq!(seen.body, serde_json::json!({"password": "nova"}));
    assert!(!session.is_signed());
    assert!(!path.exists());
}
