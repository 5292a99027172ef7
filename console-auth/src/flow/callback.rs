//! SSO callback reconciliation.
//!
//! After the provider redirects back, two completion paths race: the SDK's
//! asynchronous sign-in notification, and an independent escalating poll for
//! an established session (the notification is not always delivered). The
//! first path to confirm a session wins and the other becomes a no-op.

use crate::error::{AuthError, AuthErrorKind};
use crate::flow::hydrator::SessionHydrator;
use crate::flow::PENDING_TENANT_KEY;
use crate::provider::{IdTokenClaims, IdentityProvider, ProviderTokens, TransientStore};
use crate::services::{AuthApiClient, SsoCompleteRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Escalating wait windows for the polling path. The final attempt forces a
/// token refresh.
const POLL_SCHEDULE: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Sign-in notifications from the identity SDK.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignInComplete,
    SignInFailed(String),
}

/// Outcome of the reconciliation. Terminal failure is an [`AuthError`] with
/// kind `SessionTimeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    SessionFound,
    /// Torn down before completion (navigation away).
    Cancelled,
}

pub struct CallbackReconciler {
    provider: Arc<dyn IdentityProvider>,
    auth_api: Arc<AuthApiClient>,
    hydrator: Arc<SessionHydrator>,
    pending: Arc<dyn TransientStore>,
    cancel: CancellationToken,
}

impl CallbackReconciler {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        auth_api: Arc<AuthApiClient>,
        hydrator: Arc<SessionHydrator>,
        pending: Arc<dyn TransientStore>,
    ) -> Self {
        Self {
            provider,
            auth_api,
            hydrator,
            pending,
            cancel: CancellationToken::new(),
        }
    }

    /// Token for detaching the reconciler on view teardown. Cancelling it
    /// stops both completion paths without mutating session state.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the reconciliation to completion.
    ///
    /// `events` carries the SDK's sign-in notifications. Whichever of the
    /// two paths confirms a session first wins; completion is one-shot
    /// because the losing branch is dropped by the select.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<AuthEvent>,
    ) -> Result<CallbackOutcome, AuthError> {
        let tokens = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(CallbackOutcome::Cancelled),
            tokens = self.wait_for_event(&mut events) => tokens,
            tokens = self.poll_for_session() => tokens,
        };

        let Some(tokens) = tokens else {
            // Wait budget exhausted on the polling path and no usable event.
            self.pending.take(PENDING_TENANT_KEY);
            return Err(AuthError::new(AuthErrorKind::SessionTimeout));
        };

        self.finalize(tokens).await?;
        Ok(CallbackOutcome::SessionFound)
    }

    /// Event-driven completion path. Never resolves with `None` on its own:
    /// a failed or missing notification leaves resolution to the poller.
    async fn wait_for_event(
        &self,
        events: &mut mpsc::Receiver<AuthEvent>,
    ) -> Option<ProviderTokens> {
        loop {
            match events.recv().await {
                Some(AuthEvent::SignInComplete) => {
                    match self.provider.current_session(false).await {
                        Ok(Some(tokens)) => return Some(tokens),
                        Ok(None) => {
                            tracing::debug!("sign-in event fired but no session yet");
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "session fetch after sign-in event failed");
                        }
                    }
                }
                Some(AuthEvent::SignInFailed(reason)) => {
                    tracing::warn!(reason, "provider reported sign-in failure");
                }
                // Channel closed: park forever and let the poller decide.
                None => futures::future::pending::<()>().await,
            }
        }
    }

    /// Polling completion path: escalating waits, forced refresh on the
    /// final attempt. Resolves `None` when the budget is exhausted.
    async fn poll_for_session(&self) -> Option<ProviderTokens> {
        let last = POLL_SCHEDULE.len() - 1;
        for (attempt, wait) in POLL_SCHEDULE.iter().enumerate() {
            tokio::time::sleep(*wait).await;

            let force_refresh = attempt == last;
            match self.provider.current_session(force_refresh).await {
                Ok(Some(tokens)) => return Some(tokens),
                Ok(None) => {
                    tracing::debug!(attempt, force_refresh, "no session yet");
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "session poll failed");
                }
            }
        }
        None
    }

    /// Session confirmed: recover tenant context, provision just-in-time,
    /// hydrate.
    async fn finalize(&self, tokens: ProviderTokens) -> Result<(), AuthError> {
        let claims = IdTokenClaims::decode(&tokens.id_token)
            .map_err(|e| AuthError::with_source(AuthErrorKind::NetworkOrUnknown, e))?;

        let pending = self.pending.take(PENDING_TENANT_KEY);
        let provider_name = federation_provider_name(&claims, &tokens.username);
        let tenant_id = derive_tenant_id(
            pending.as_deref(),
            claims.tenant_claim(),
            provider_name.as_deref(),
        );
        let email = derive_email(&claims, &tokens.username);

        if let (Some(tenant_id), Some(email)) = (tenant_id.as_deref(), email) {
            if !tokens.user_id.is_empty() {
                let request = SsoCompleteRequest {
                    tenant_id: tenant_id.to_string(),
                    email,
                    cognito_user_id: tokens.user_id.clone(),
                    source: federation_source(provider_name.as_deref()),
                    default_role: "member".to_string(),
                    groups: Vec::new(),
                };
                // Idempotent: a conflict means an earlier call provisioned
                // this membership. Other failures are non-blocking; the
                // hydrator falls back to viewer if /me cannot resolve.
                if let Err(e) = self.auth_api.sso_complete(&request).await {
                    tracing::warn!(error = %e, "jit provisioning failed");
                }
            }
        } else {
            tracing::warn!("could not resolve tenant context from callback, skipping provisioning");
        }

        // The reconciled tenant id drives hydration too: the federated token
        // often carries no tenant claim, which is exactly why the marker and
        // provider-name recovery exist.
        let hydrated = match tenant_id.as_deref() {
            Some(id) => self.hydrator.check_auth_with_tenant(id).await,
            None => self.hydrator.check_auth().await,
        };

        if hydrated {
            Ok(())
        } else {
            Err(AuthError::new(AuthErrorKind::NetworkOrUnknown))
        }
    }
}

/// Tenant id recovery after the redirect round trip.
///
/// Precedence: the pending marker left before the redirect, then the tenant
/// claim stamped into the token, then the `PROVIDER-suffix` federation
/// provider-name pattern (the suffix is the tenant id).
pub fn derive_tenant_id(
    pending: Option<&str>,
    token_claim: Option<&str>,
    provider_name: Option<&str>,
) -> Option<String> {
    if let Some(id) = pending.filter(|s| !s.is_empty()) {
        return Some(id.to_string());
    }
    if let Some(id) = token_claim.filter(|s| !s.is_empty()) {
        return Some(id.to_string());
    }
    provider_name
        .and_then(|name| name.split_once('-'))
        .map(|(_, suffix)| suffix.to_string())
        .filter(|s| !s.is_empty())
}

/// Email recovery: token email claim, then the federated identity record,
/// then the provider-prefixed username (`PROVIDER-tenant_user@host`).
pub fn derive_email(claims: &IdTokenClaims, username: &str) -> Option<String> {
    if let Some(email) = claims.email.as_deref().filter(|s| !s.is_empty()) {
        return Some(email.to_string());
    }

    if let Some(email) = claims
        .identities
        .iter()
        .filter_map(|i| i.user_id.as_deref())
        .find(|id| id.contains('@'))
    {
        return Some(email.to_string());
    }

    // Federated usernames embed the email after the first underscore.
    username
        .split_once('_')
        .map(|(_, rest)| rest)
        .filter(|rest| rest.contains('@'))
        .map(str::to_string)
}

fn federation_provider_name(claims: &IdTokenClaims, username: &str) -> Option<String> {
    if let Some(name) = claims
        .identities
        .iter()
        .filter_map(|i| i.provider_name.as_deref())
        .next()
    {
        return Some(name.to_string());
    }
    // Provider-prefixed username: the prefix before the underscore is the
    // federation provider name.
    username
        .split_once('_')
        .map(|(prefix, _)| prefix.to_string())
        .filter(|p| !p.is_empty())
}

fn federation_source(provider_name: Option<&str>) -> String {
    match provider_name {
        Some(name) if name.to_ascii_uppercase().starts_with("GOOGLE") => "GOOGLE".to_string(),
        Some(name) if name.to_ascii_uppercase().starts_with("SAML") => "SAML".to_string(),
        _ => "OIDC".to_string(),
    }
}
