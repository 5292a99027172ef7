use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

/// Validated session tokens handed back by the identity provider SDK.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    pub access_token: String,
    pub id_token: String,
    /// Provider user id (`sub`).
    pub user_id: String,
    /// Provider username; federated users carry a provider-prefixed form
    /// like `OKTA-acme_jane@example.com`.
    pub username: String,
}

/// One federated identity record from the token's `identities` claim.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedIdentity {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
}

/// ID token payload claims the auth core reads.
///
/// Decoded without signature validation: the token comes from the provider
/// SDK which has already validated it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(rename = "custom:tenantId", default)]
    pub custom_tenant_id: Option<String>,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
    #[serde(rename = "custom:role", default)]
    pub custom_role: Option<String>,
    #[serde(rename = "cognito:username", default)]
    pub username: Option<String>,
    #[serde(default)]
    pub identities: Vec<FederatedIdentity>,
}

impl IdTokenClaims {
    /// Decode the payload segment of a JWT. Malformed tokens are an error;
    /// absent claims are `None`.
    pub fn decode(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split('.').collect();

        if parts.len() != 3 {
            return Err(anyhow::anyhow!("Invalid JWT format"));
        }

        let payload = general_purpose::URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

        let claims: IdTokenClaims = serde_json::from_slice(&payload)
            .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

        Ok(claims)
    }

    /// Tenant id claim, custom attribute form first.
    pub fn tenant_claim(&self) -> Option<&str> {
        self.custom_tenant_id
            .as_deref()
            .or(self.tenant_id.as_deref())
    }
}

#[cfg(test)]
pub(crate) fn encode_unsigned(payload: &serde_json::Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{}.{}.signature", header, body)
}
