use crate::models::session::{Role, Session, SessionStore};
use crate::provider::{IdentityProvider, IdTokenClaims};
use crate::services::{AuthApiClient, PlatformApiClient};
use std::sync::Arc;

/// Resolves the active credential into a fully populated [`Session`].
///
/// The only writer of the session store. Token claims are a starting point;
/// the backend is authoritative for role and canonical email, and the tenant
/// directory for the tenant type.
pub struct SessionHydrator {
    provider: Arc<dyn IdentityProvider>,
    auth_api: Arc<AuthApiClient>,
    platform_api: Arc<PlatformApiClient>,
    store: SessionStore,
}

impl SessionHydrator {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        auth_api: Arc<AuthApiClient>,
        platform_api: Arc<PlatformApiClient>,
        store: SessionStore,
    ) -> Self {
        Self {
            provider,
            auth_api,
            platform_api,
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Check the current authentication state and (re)load the session.
    ///
    /// Never errors: an absent or invalid provider session clears the store
    /// and returns false. Lookup failures on the authoritative sources
    /// degrade to safe defaults (`Personal`, `Viewer`) rather than blocking
    /// sign-in. The resolved session is written in a single atomic replace.
    pub async fn check_auth(&self) -> bool {
        self.hydrate(None).await
    }

    /// Like [`check_auth`], with an already reconciled tenant id taking
    /// precedence over the token claim. Used after the SSO callback, where
    /// the federated token may carry no tenant claim and the tenant was
    /// recovered from the pending marker or the provider name instead.
    ///
    /// [`check_auth`]: Self::check_auth
    pub async fn check_auth_with_tenant(&self, tenant_id: &str) -> bool {
        self.hydrate(Some(tenant_id)).await
    }

    async fn hydrate(&self, tenant_override: Option<&str>) -> bool {
        let tokens = match self.provider.current_session(false).await {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                self.store.clear().await;
                return false;
            }
            Err(e) => {
                tracing::debug!(error = %e, "no valid session");
                self.store.clear().await;
                return false;
            }
        };

        let claims = match IdTokenClaims::decode(&tokens.id_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable id token, clearing session");
                self.store.clear().await;
                return false;
            }
        };

        // The pre-token hook stamps a tenant claim on every issuance and
        // falls back to "default" itself, so mirror that here.
        let tenant_id = tenant_override
            .or_else(|| claims.tenant_claim())
            .map(str::to_string)
            .unwrap_or_else(|| "default".to_string());

        let tenant_type = self.platform_api.tenant_type(&tenant_id).await;

        let (role, email) = match self.auth_api.me(&tokens.access_token).await {
            Ok(me) => (Role::parse(&me.role), me.email),
            Err(e) => {
                tracing::warn!(error = %e, "identity endpoint unavailable, defaulting role to viewer");
                let email = claims.email.clone().unwrap_or_else(|| tokens.username.clone());
                (Role::Viewer, email)
            }
        };

        self.store
            .replace(Session {
                user_id: tokens.user_id,
                email,
                tenant_id,
                role,
                tenant_type,
                email_verified: claims.email_verified.unwrap_or(false),
            })
            .await;

        true
    }

    /// Sign out of the provider and destroy local session state. Provider
    /// failures are logged; the local state is cleared regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "provider sign-out failed");
        }
        self.store.clear().await;
    }
}
