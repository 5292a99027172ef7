use crate::config::IdentitySettings;
use crate::error::{classify_provider_error, AuthError, AuthErrorKind};
use crate::flow::hydrator::SessionHydrator;
use crate::flow::PENDING_TENANT_KEY;
use crate::models::tenant::TenantInfo;
use crate::provider::{IdentityProvider, RedirectSink, TransientStore};
use crate::services::AuthApiClient;
use secrecy::Secret;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct LoginWithTenantInput {
    pub email: String,
    pub password: Secret<String>,
    pub selected_tenant_id: String,
}

/// Resolves a (tenant, email, password) triple or a federated redirect into
/// a validated session.
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
    auth_api: Arc<AuthApiClient>,
    hydrator: Arc<SessionHydrator>,
    pending: Arc<dyn TransientStore>,
    redirect: Arc<dyn RedirectSink>,
    identity: IdentitySettings,
}

impl Authenticator {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        auth_api: Arc<AuthApiClient>,
        hydrator: Arc<SessionHydrator>,
        pending: Arc<dyn TransientStore>,
        redirect: Arc<dyn RedirectSink>,
        identity: IdentitySettings,
    ) -> Self {
        Self {
            provider,
            auth_api,
            hydrator,
            pending,
            redirect,
            identity,
        }
    }

    /// Direct sign-in with the selected tenant stamped into the auth request
    /// as client metadata, where the pre-token-generation hook picks it up.
    ///
    /// On success the session is hydrated and the last-accessed timestamp is
    /// updated fire-and-forget. Failures are classified into exactly one
    /// [`AuthErrorKind`]; there is no automatic retry.
    pub async fn login_with_tenant(&self, input: LoginWithTenantInput) -> Result<(), AuthError> {
        let mut metadata = HashMap::new();
        metadata.insert(
            "selectedTenantId".to_string(),
            input.selected_tenant_id.clone(),
        );

        let outcome = self
            .provider
            .sign_in(&input.email, &input.password, metadata)
            .await
            .map_err(|e| {
                let kind = classify_provider_error(&e.code);
                tracing::warn!(email = %input.email, code = %e.code, ?kind, "login failed");
                AuthError::with_source(kind, e)
            })?;

        if !outcome.signed_in {
            // The provider accepted the credentials but wants another step;
            // the only step this flow handles is signup confirmation.
            let kind = match outcome.next_step.as_deref() {
                Some("CONFIRM_SIGN_UP") => AuthErrorKind::UserNotConfirmed,
                _ => AuthErrorKind::NetworkOrUnknown,
            };
            return Err(AuthError::new(kind));
        }

        self.hydrator.check_auth().await;

        let auth_api = Arc::clone(&self.auth_api);
        let email = input.email.clone();
        let tenant_id = input.selected_tenant_id.clone();
        tokio::spawn(async move {
            auth_api.update_last_accessed(&email, &tenant_id).await;
        });

        Ok(())
    }

    /// Resend the signup confirmation code for an unconfirmed account
    /// (the verify-email step after an `UserNotConfirmed` sign-in).
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        self.provider
            .resend_confirmation_code(email)
            .await
            .map_err(|e| {
                let kind = classify_provider_error(&e.code);
                tracing::warn!(email, error = %e, "resending confirmation code failed");
                AuthError::with_source(kind, e)
            })
    }

    /// Confirm signup with the emailed code. On success the user can retry
    /// the password step.
    pub async fn confirm_signup(&self, email: &str, code: &str) -> Result<(), AuthError> {
        self.provider
            .confirm_sign_up(email, code)
            .await
            .map_err(|e| {
                let kind = classify_provider_error(&e.code);
                tracing::warn!(email, error = %e, "signup confirmation failed");
                AuthError::with_source(kind, e)
            })
    }

    /// Exit the in-app login flow and hand control to the hosted identity
    /// provider for federated SSO.
    ///
    /// The target tenant id is persisted in the transient store so the
    /// callback handler can recover tenant context after the redirect round
    /// trip. If the managed redirect fails, the authorization URL is built
    /// manually with identical parameters.
    pub async fn login_with_sso(&self, tenant: &TenantInfo) -> Result<(), AuthError> {
        let provider_name = tenant.provider_name();

        self.pending.put(PENDING_TENANT_KEY, &tenant.tenant_id);

        if let Err(e) = self.provider.federated_sign_in(&provider_name).await {
            tracing::warn!(
                provider = %provider_name,
                error = %e,
                "managed federated redirect failed, falling back to manual authorize url"
            );
            let url = build_authorize_url(&self.identity, &provider_name);
            self.redirect.navigate(&url);
        }

        Ok(())
    }
}

/// Manual construction of the hosted authorize endpoint URL. Must stay
/// semantically identical to the managed redirect: same provider, client id,
/// callback URL and scopes.
fn build_authorize_url(identity: &IdentitySettings, provider_name: &str) -> String {
    let scopes = identity.scopes.join(" ");
    format!(
        "{}/oauth2/authorize?identity_provider={}&client_id={}&redirect_uri={}&response_type=code&scope={}",
        identity.domain,
        urlencoding::encode(provider_name),
        urlencoding::encode(&identity.client_id),
        urlencoding::encode(&identity.redirect_uri),
        urlencoding::encode(&scopes),
    )
}
