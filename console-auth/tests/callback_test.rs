//! SSO callback reconciliation: the event and polling completion paths race,
//! the first confirmed session wins, and exhaustion of the wait budget is a
//! user-visible timeout.

mod common;

use common::{build_stack, tokens_for, MockProvider};
use console_auth::flow::{AuthEvent, CallbackOutcome, CallbackReconciler, PENDING_TENANT_KEY};
use console_auth::provider::TransientStore;
use console_auth::AuthErrorKind;
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn federated_tokens() -> console_auth::provider::ProviderTokens {
    tokens_for(
        "user-1",
        "OKTA-acme_jane@corp.example",
        &json!({
            "sub": "user-1",
            "email": "jane@corp.example",
            "identities": [{"userId": "jane@corp.example", "providerName": "OKTA-acme"}]
        }),
    )
}

/// Backend surface touched by finalization: JIT provisioning + hydration.
async fn mount_callback_backend(server: &MockServer, expected_tenant: &str) {
    Mock::given(method("POST"))
        .and(path("/auth-service/api/v1/auth/sso-complete"))
        .and(body_partial_json(json!({
            "tenantId": expected_tenant,
            "email": "jane@corp.example",
            "cognitoUserId": "user-1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "jane@corp.example", "role": "member", "userId": "user-1"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/platform/api/v1/tenants/{}", expected_tenant)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tenantType": "ORGANIZATION"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn event_path_completes_first() {
    let server = MockServer::start().await;
    mount_callback_backend(&server, "acme").await;

    let provider = MockProvider::new().with_steady_session(federated_tokens());
    let stack = build_stack(provider, &server.uri());
    // Pending marker left by the authenticator before the redirect.
    stack.pending.put(PENDING_TENANT_KEY, "acme");

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );

    let (tx, rx) = mpsc::channel(4);
    tx.send(AuthEvent::SignInComplete).await.unwrap();

    let outcome = reconciler.run(rx).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::SessionFound);

    // Marker consumed exactly once.
    assert!(stack.pending.peek(PENDING_TENANT_KEY).is_none());
    assert!(stack.store.is_authenticated().await);
    let session = stack.store.current().await.unwrap();
    assert_eq!(session.tenant_id, "acme");
}

#[tokio::test]
async fn polling_path_completes_when_no_event_arrives() {
    let server = MockServer::start().await;
    mount_callback_backend(&server, "acme").await;

    let provider = MockProvider::new().with_steady_session(federated_tokens());
    // First poll sees no session yet; the second succeeds.
    provider.push_session_answer(Ok(None));
    let stack = build_stack(provider, &server.uri());
    stack.pending.put(PENDING_TENANT_KEY, "acme");

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );

    // Sender kept alive but silent: only the poller can resolve.
    let (_tx, rx) = mpsc::channel::<AuthEvent>(4);

    let outcome = reconciler.run(rx).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::SessionFound);
    assert!(stack.store.is_authenticated().await);
}

#[tokio::test]
async fn tenant_context_recovers_from_provider_name_when_no_marker() {
    let server = MockServer::start().await;
    mount_callback_backend(&server, "acme").await;

    let provider = MockProvider::new().with_steady_session(federated_tokens());
    let stack = build_stack(provider, &server.uri());
    // No pending marker and no tenant claim: the OKTA-acme provider name
    // resolves the tenant.

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );

    let (tx, rx) = mpsc::channel(4);
    tx.send(AuthEvent::SignInComplete).await.unwrap();

    let outcome = reconciler.run(rx).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::SessionFound);

    // The recovered tenant must also be the session's active tenant, not
    // the token-claim fallback.
    let session = stack.store.current().await.unwrap();
    assert_eq!(session.tenant_id, "acme");
}

#[tokio::test(start_paused = true)]
async fn wait_budget_exhaustion_is_session_timeout() {
    // Provider never establishes a session; no HTTP is reached.
    let provider = MockProvider::new();
    let stack = build_stack(provider, "http://127.0.0.1:1");
    stack.pending.put(PENDING_TENANT_KEY, "acme");

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );

    let (_tx, rx) = mpsc::channel::<AuthEvent>(4);

    let err = reconciler.run(rx).await.unwrap_err();
    assert_eq!(err.kind, AuthErrorKind::SessionTimeout);

    // The final attempt forced a token refresh.
    let flags = stack.provider.refresh_flags.lock().unwrap().clone();
    assert_eq!(flags, vec![false, false, true]);

    // Stale marker discarded so a fresh login starts clean.
    assert!(stack.pending.peek(PENDING_TENANT_KEY).is_none());
    assert!(!stack.store.is_authenticated().await);
}

#[tokio::test]
async fn failed_sign_in_event_leaves_resolution_to_poller() {
    let server = MockServer::start().await;
    mount_callback_backend(&server, "acme").await;

    let provider = MockProvider::new().with_steady_session(federated_tokens());
    let stack = build_stack(provider, &server.uri());
    stack.pending.put(PENDING_TENANT_KEY, "acme");

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );

    let (tx, rx) = mpsc::channel(4);
    tx.send(AuthEvent::SignInFailed("hub error".to_string()))
        .await
        .unwrap();
    // A later completion event still wins.
    tx.send(AuthEvent::SignInComplete).await.unwrap();

    let outcome = reconciler.run(rx).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::SessionFound);
}

#[tokio::test]
async fn teardown_cancels_both_paths() {
    let provider = MockProvider::new();
    let stack = build_stack(provider, "http://127.0.0.1:1");

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );
    let cancel = reconciler.cancellation_token();

    let (_tx, rx) = mpsc::channel::<AuthEvent>(4);
    cancel.cancel();

    let outcome = reconciler.run(rx).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::Cancelled);
    // No session mutation on teardown.
    assert!(!stack.store.is_authenticated().await);
}

#[tokio::test]
async fn provisioning_conflict_is_still_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth-service/api/v1/auth/sso-complete"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "jane@corp.example", "role": "member", "userId": "user-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/platform/api/v1/tenants/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tenantType": "ORGANIZATION"
        })))
        .mount(&server)
        .await;

    let provider = MockProvider::new().with_steady_session(federated_tokens());
    let stack = build_stack(provider, &server.uri());
    stack.pending.put(PENDING_TENANT_KEY, "acme");

    let reconciler = CallbackReconciler::new(
        stack.provider.clone(),
        stack.auth_api.clone(),
        stack.hydrator.clone(),
        stack.pending.clone(),
    );

    let (tx, rx) = mpsc::channel(4);
    tx.send(AuthEvent::SignInComplete).await.unwrap();

    let outcome = reconciler.run(rx).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::SessionFound);
    assert!(stack.store.is_authenticated().await);
}
