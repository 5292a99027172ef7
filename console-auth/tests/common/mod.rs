//! Test harness for the auth-core flow tests.
//!
//! Provides a scriptable identity-provider double and builders wiring the
//! full stack (clients, hydrator, authenticator, flow) against a wiremock
//! backend.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use console_auth::config::{ApiSettings, IdentitySettings};
use console_auth::flow::{Authenticator, SessionHydrator};
use console_auth::provider::{
    IdentityProvider, MemoryRedirectSink, MemoryTransientStore, ProviderError, ProviderTokens,
    SignInOutcome,
};
use console_auth::services::{AuthApiClient, PlatformApiClient};
use console_auth::SessionStore;
use secrecy::Secret;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Build an unsigned JWT with the given payload, mirroring what the provider
/// SDK hands back after validation.
pub fn unsigned_jwt(payload: &serde_json::Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{}.{}.signature", header, body)
}

pub fn tokens_for(user_id: &str, username: &str, id_claims: &serde_json::Value) -> ProviderTokens {
    ProviderTokens {
        access_token: unsigned_jwt(&serde_json::json!({ "sub": user_id })),
        id_token: unsigned_jwt(id_claims),
        user_id: user_id.to_string(),
        username: username.to_string(),
    }
}

/// Scriptable identity-provider double.
///
/// `current_session` answers are consumed from a queue; once the queue is
/// empty the `steady_session` answer repeats. Calls and their arguments are
/// recorded for assertions.
pub struct MockProvider {
    pub sign_in_response: Mutex<Result<SignInOutcome, ProviderError>>,
    pub federated_response: Mutex<Result<(), ProviderError>>,
    pub session_queue: Mutex<VecDeque<Result<Option<ProviderTokens>, ProviderError>>>,
    pub steady_session: Mutex<Result<Option<ProviderTokens>, ProviderError>>,
    pub confirm_response: Mutex<Result<(), ProviderError>>,
    pub sign_in_metadata: Mutex<Vec<HashMap<String, String>>>,
    pub federated_calls: Mutex<Vec<String>>,
    pub resend_calls: Mutex<Vec<String>>,
    pub confirm_calls: Mutex<Vec<(String, String)>>,
    pub refresh_flags: Mutex<Vec<bool>>,
    pub signed_out: Mutex<bool>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            sign_in_response: Mutex::new(Ok(SignInOutcome {
                signed_in: true,
                next_step: None,
            })),
            federated_response: Mutex::new(Ok(())),
            session_queue: Mutex::new(VecDeque::new()),
            steady_session: Mutex::new(Ok(None)),
            confirm_response: Mutex::new(Ok(())),
            sign_in_metadata: Mutex::new(Vec::new()),
            federated_calls: Mutex::new(Vec::new()),
            resend_calls: Mutex::new(Vec::new()),
            confirm_calls: Mutex::new(Vec::new()),
            refresh_flags: Mutex::new(Vec::new()),
            signed_out: Mutex::new(false),
        }
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steady_session(self, tokens: ProviderTokens) -> Self {
        *self.steady_session.lock().unwrap() = Ok(Some(tokens));
        self
    }

    pub fn with_sign_in_error(self, code: &str) -> Self {
        *self.sign_in_response.lock().unwrap() =
            Err(ProviderError::new(code, "provider rejected sign-in"));
        self
    }

    pub fn with_confirm_error(self, code: &str) -> Self {
        *self.confirm_response.lock().unwrap() =
            Err(ProviderError::new(code, "provider rejected confirmation"));
        self
    }

    pub fn push_session_answer(&self, answer: Result<Option<ProviderTokens>, ProviderError>) {
        self.session_queue.lock().unwrap().push_back(answer);
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn sign_in(
        &self,
        _email: &str,
        _password: &Secret<String>,
        client_metadata: HashMap<String, String>,
    ) -> Result<SignInOutcome, ProviderError> {
        self.sign_in_metadata.lock().unwrap().push(client_metadata);
        self.sign_in_response.lock().unwrap().clone()
    }

    async fn current_session(
        &self,
        force_refresh: bool,
    ) -> Result<Option<ProviderTokens>, ProviderError> {
        self.refresh_flags.lock().unwrap().push(force_refresh);
        if let Some(answer) = self.session_queue.lock().unwrap().pop_front() {
            return answer;
        }
        self.steady_session.lock().unwrap().clone()
    }

    async fn federated_sign_in(&self, provider_name: &str) -> Result<(), ProviderError> {
        self.federated_calls
            .lock()
            .unwrap()
            .push(provider_name.to_string());
        self.federated_response.lock().unwrap().clone()
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        *self.signed_out.lock().unwrap() = true;
        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), ProviderError> {
        self.resend_calls.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderError> {
        self.confirm_calls
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        self.confirm_response.lock().unwrap().clone()
    }
}

pub fn api_settings(base_url: &str) -> ApiSettings {
    ApiSettings {
        auth_url: base_url.to_string(),
        platform_url: base_url.to_string(),
    }
}

pub fn identity_settings() -> IdentitySettings {
    IdentitySettings {
        domain: "https://auth.example.com".to_string(),
        client_id: "client-123".to_string(),
        redirect_uri: "https://console.example.com/auth/callback".to_string(),
        scopes: vec!["openid".to_string(), "email".to_string()],
    }
}

/// The fully wired stack under test.
pub struct TestStack {
    pub provider: Arc<MockProvider>,
    pub auth_api: Arc<AuthApiClient>,
    pub platform_api: Arc<PlatformApiClient>,
    pub store: SessionStore,
    pub hydrator: Arc<SessionHydrator>,
    pub authenticator: Arc<Authenticator>,
    pub pending: Arc<MemoryTransientStore>,
    pub redirect: Arc<MemoryRedirectSink>,
}

pub fn build_stack(provider: MockProvider, backend_url: &str) -> TestStack {
    let provider = Arc::new(provider);
    let settings = api_settings(backend_url);
    let auth_api = Arc::new(AuthApiClient::new(&settings));
    let platform_api = Arc::new(PlatformApiClient::new(&settings));
    let store = SessionStore::new();
    let hydrator = Arc::new(SessionHydrator::new(
        provider.clone(),
        auth_api.clone(),
        platform_api.clone(),
        store.clone(),
    ));
    let pending = Arc::new(MemoryTransientStore::new());
    let redirect = Arc::new(MemoryRedirectSink::new());
    let authenticator = Arc::new(Authenticator::new(
        provider.clone(),
        auth_api.clone(),
        hydrator.clone(),
        pending.clone(),
        redirect.clone(),
        identity_settings(),
    ));

    TestStack {
        provider,
        auth_api,
        platform_api,
        store,
        hydrator,
        authenticator,
        pending,
        redirect,
    }
}
