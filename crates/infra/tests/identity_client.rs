//! Wiremock tests for the identity-provider client.

mod support;

use support::{backend_for, token_json};
use trestle_core::SessionStore;
use trestle_domain::{SessionEvent, TrestleError};
use trestle_infra::IdentityClient;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sign_in_stores_session_and_emits_event() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_partial_json(serde_json::json!({ "email": "wm@example.org" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_json(user_id, "jwt-1", "ref-1", 3600)),
        )
        .mount(&server)
        .await;

    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();
    let mut events = client.subscribe();

    let session = client.sign_in("wm@example.org", "hunter22").await.unwrap();
    assert_eq!(session.identity.user_id, user_id);
    assert!(session.identity.email_verified);

    match events.recv().await.unwrap() {
        SessionEvent::SignedIn(s) => assert_eq!(s.access_token, "jwt-1"),
        other => panic!("expected SignedIn, got {other:?}"),
    }

    let current = client.current_session().await.unwrap();
    assert_eq!(current.map(|s| s.access_token), Some("jwt-1".to_string()));
}

#[tokio::test]
async fn rejected_credentials_surface_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials",
        })))
        .mount(&server)
        .await;

    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();
    let err = client.sign_in("wm@example.org", "wrong").await.unwrap_err();

    match err {
        TrestleError::Auth(message) => assert_eq!(message, "Invalid login credentials"),
        other => panic!("expected Auth, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_up_creates_session() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_json(user_id, "jwt-new", "ref-new", 3600)),
        )
        .mount(&server)
        .await;

    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();
    let session = client.sign_up("new@example.org", "hunter22").await.unwrap();
    assert_eq!(session.identity.user_id, user_id);
}

#[tokio::test]
async fn sign_out_clears_session_and_emits_event() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_json(user_id, "jwt-1", "ref-1", 3600)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();
    let mut events = client.subscribe();

    client.sign_in("wm@example.org", "hunter22").await.unwrap();
    client.sign_out().await.unwrap();

    assert!(client.current_session().await.unwrap().is_none());

    assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn(_)));
    assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedOut));
}

#[tokio::test]
async fn sign_out_without_session_is_a_no_op() {
    let server = MockServer::start().await;
    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();
    // No request leaves the client
    client.sign_out().await.unwrap();
}

#[tokio::test]
async fn update_password_requires_active_session() {
    let server = MockServer::start().await;
    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();

    let err = client.update_password("n3w-passw0rd").await.unwrap_err();
    assert!(matches!(err, TrestleError::Auth(_)));
}

#[tokio::test]
async fn expired_session_is_refreshed_on_read() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    // Initial grant expires immediately (inside the refresh threshold)
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_json(user_id, "jwt-old", "ref-old", 1)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_partial_json(serde_json::json!({ "refresh_token": "ref-old" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_json(user_id, "jwt-new", "ref-new", 3600)),
        )
        .mount(&server)
        .await;

    let client = IdentityClient::new(&backend_for(&server.uri())).unwrap();
    let mut events = client.subscribe();
    client.sign_in("wm@example.org", "hunter22").await.unwrap();

    let current = client.current_session().await.unwrap();
    assert_eq!(current.map(|s| s.access_token), Some("jwt-new".to_string()));

    assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn(_)));
    assert!(matches!(events.recv().await.unwrap(), SessionEvent::TokenRefreshed(_)));
}
