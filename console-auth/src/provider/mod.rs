//! Seams to the identity provider SDK and the browser environment.
//!
//! The hosted login, token issuance and redirect machinery are external
//! collaborators; the flow code depends on these traits so tests can run
//! against in-memory doubles.

pub mod tokens;

use async_trait::async_trait;
use secrecy::Secret;
use std::collections::HashMap;
use std::sync::Mutex;

pub use tokens::{IdTokenClaims, ProviderTokens};

/// Error shape reported by the identity provider SDK.
///
/// `code` is the provider's stable error identifier and is the only field
/// classification looks at.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub signed_in: bool,
    /// Next challenge hint when not signed in (e.g. confirmation pending).
    pub next_step: Option<String>,
}

/// The identity provider SDK surface the auth core depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Standard credential sign-in. `client_metadata` is passed through to
    /// the provider's pre-token-generation pipeline out of band.
    async fn sign_in(
        &self,
        email: &str,
        password: &Secret<String>,
        client_metadata: HashMap<String, String>,
    ) -> Result<SignInOutcome, ProviderError>;

    /// Current validated session tokens, if any. `force_refresh` requests a
    /// token refresh instead of a cache read.
    async fn current_session(
        &self,
        force_refresh: bool,
    ) -> Result<Option<ProviderTokens>, ProviderError>;

    /// Start the managed federated redirect for the named provider.
    async fn federated_sign_in(&self, provider_name: &str) -> Result<(), ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), ProviderError>;

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderError>;
}

/// Transient storage that survives a full page navigation (the redirect
/// round trip) but not the browser session. Used only for the pending-tenant
/// marker.
pub trait TransientStore: Send + Sync {
    fn put(&self, key: &str, value: &str);
    /// Read and clear: the marker is consumed exactly once.
    fn take(&self, key: &str) -> Option<String>;
    fn peek(&self, key: &str) -> Option<String>;
}

/// Receives the browser navigation when the manual authorize-URL fallback is
/// used instead of the managed redirect.
pub trait RedirectSink: Send + Sync {
    fn navigate(&self, url: &str);
}

/// In-memory `TransientStore` for tests and non-browser embeddings.
#[derive(Default)]
pub struct MemoryTransientStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransientStore for MemoryTransientStore {
    fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("transient store poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn take(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .expect("transient store poisoned")
            .remove(key)
    }

    fn peek(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .expect("transient store poisoned")
            .get(key)
            .cloned()
    }
}

/// Captures navigations issued through the fallback path.
#[derive(Default)]
pub struct MemoryRedirectSink {
    urls: Mutex<Vec<String>>,
}

impl MemoryRedirectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.urls
            .lock()
            .expect("redirect sink poisoned")
            .last()
            .cloned()
    }
}

impl RedirectSink for MemoryRedirectSink {
    fn navigate(&self, url: &str) {
        self.urls
            .lock()
            .expect("redirect sink poisoned")
            .push(url.to_string());
    }
}
