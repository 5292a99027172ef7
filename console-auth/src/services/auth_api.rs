use crate::config::ApiSettings;
use crate::models::tenant::TenantLookupResult;
use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Typed client for the auth backend.
pub struct AuthApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoCompleteRequest {
    pub tenant_id: String,
    pub email: String,
    pub cognito_user_id: String,
    /// Federation source: GOOGLE, SAML or OIDC.
    pub source: String,
    pub default_role: String,
    pub groups: Vec<String>,
}

/// Outcome of the idempotent JIT-provisioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Provisioned,
    /// The backend reported a conflict: an earlier call already provisioned
    /// this membership. Treated as success.
    AlreadyProvisioned,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetails {
    pub tenant_id: String,
    pub tenant_name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub expired: bool,
}

impl AuthApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.auth_url.clone(),
        }
    }

    /// Look up which tenants a principal belongs to.
    ///
    /// Never fails: any transport or server error degrades to an empty
    /// result so the login flow can surface "no account found" instead of
    /// crashing.
    pub async fn lookup_tenants(&self, email: &str) -> TenantLookupResult {
        let url = format!("{}/auth/api/v1/auth/lookup", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<TenantLookupResult>().await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(email, error = %e, "tenant lookup returned malformed body");
                        TenantLookupResult::empty(email.to_string())
                    }
                }
            }
            Ok(resp) => {
                tracing::warn!(email, status = %resp.status(), "tenant lookup failed");
                TenantLookupResult::empty(email.to_string())
            }
            Err(e) => {
                tracing::warn!(email, error = %e, "tenant lookup unreachable");
                TenantLookupResult::empty(email.to_string())
            }
        }
    }

    /// Stamp the last-accessed timestamp for a membership. Fire-and-forget:
    /// failures are logged, never surfaced, never retried.
    pub async fn update_last_accessed(&self, email: &str, tenant_id: &str) {
        let url = format!("{}/auth/api/v1/auth/last-accessed", self.base_url);

        let result = self
            .client
            .patch(&url)
            .query(&[("email", email), ("tenantId", tenant_id)])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(email, tenant_id, status = %resp.status(), "failed to update last accessed");
            }
            Err(e) => {
                tracing::warn!(email, tenant_id, error = %e, "failed to update last accessed");
            }
        }
    }

    /// Authoritative identity for the bearer token: canonical email, role,
    /// user id.
    pub async fn me(&self, access_token: &str) -> Result<MeResponse> {
        let url = format!("{}/auth/api/v1/auth/me", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Idempotent JIT provisioning after a federated login. A conflict means
    /// a previous call already succeeded.
    pub async fn sso_complete(&self, req: &SsoCompleteRequest) -> Result<ProvisionOutcome> {
        let url = format!("{}/auth-service/api/v1/auth/sso-complete", self.base_url);

        let response = self.client.post(&url).json(req).send().await?;

        match response.status() {
            s if s.is_success() => Ok(ProvisionOutcome::Provisioned),
            StatusCode::CONFLICT => {
                tracing::info!(
                    tenant_id = %req.tenant_id,
                    email = %req.email,
                    "membership already provisioned"
                );
                Ok(ProvisionOutcome::AlreadyProvisioned)
            }
            s => Err(anyhow::anyhow!("sso-complete failed with status {}", s)),
        }
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let url = format!("{}/auth/api/v1/auth/forgot-password", self.base_url);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let url = format!("{}/auth/api/v1/auth/reset-password", self.base_url);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "token": token, "newPassword": new_password }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Validate an organization invitation token before showing the join
    /// form.
    pub async fn validate_invitation(&self, token: &str) -> Result<InvitationDetails> {
        let url = format!("{}/auth/api/v1/invitations/validate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn accept_invitation(&self, token: &str, password: Option<&str>) -> Result<()> {
        let url = format!("{}/auth/api/v1/invitations/accept", self.base_url);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "token": token, "password": password }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Self-service account deletion.
    pub async fn delete_account(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/auth/api/v1/auth/me", self.base_url);
        self.client
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
