//! Typed trigger event contracts.
//!
//! Shapes follow the provider's post-confirmation and pre-token-generation
//! (V2) trigger payloads. Unknown fields are preserved through `extra` maps
//! so handlers can return the event unmodified.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute key carrying the tenant id on the user record.
pub const TENANT_ID_ATTRIBUTE: &str = "custom:tenantId";

/// Tenant id used when the user record carries no tenant attribute.
pub const DEFAULT_TENANT_ID: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostConfirmationRequest {
    #[serde(default)]
    pub user_attributes: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Post-confirmation trigger event. Returned unmodified in all cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostConfirmationEvent {
    #[serde(default)]
    pub user_name: Option<String>,
    pub request: PostConfirmationRequest,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl PostConfirmationEvent {
    pub fn tenant_id(&self) -> &str {
        self.request
            .user_attributes
            .get(TENANT_ID_ATTRIBUTE)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TENANT_ID)
    }

    pub fn email(&self) -> Option<&str> {
        self.request
            .user_attributes
            .get("email")
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenGenerationRequest {
    #[serde(default)]
    pub user_attributes: HashMap<String, String>,
    #[serde(default)]
    pub client_metadata: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsToAddOrOverride {
    #[serde(default)]
    pub claims_to_add_or_override: HashMap<String, String>,
}

/// V2 response override block: separate claim sets for the access and ID
/// tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsAndScopeOverrideDetails {
    #[serde(default)]
    pub access_token_generation: ClaimsToAddOrOverride,
    #[serde(default)]
    pub id_token_generation: ClaimsToAddOrOverride,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenGenerationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_and_scope_override_details: Option<ClaimsAndScopeOverrideDetails>,
}

/// Pre-token-generation trigger event (V2, required for access-token
/// customization).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenGenerationEvent {
    pub request: PreTokenGenerationRequest,
    #[serde(default)]
    pub response: PreTokenGenerationResponse,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl PreTokenGenerationEvent {
    /// Tenant id for claim injection: selection metadata from the sign-in
    /// call wins over the stored user attribute.
    pub fn tenant_id(&self) -> &str {
        self.request
            .client_metadata
            .as_ref()
            .and_then(|m| m.get("selectedTenantId"))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.request
                    .user_attributes
                    .get(TENANT_ID_ATTRIBUTE)
                    .map(String::as_str)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or(DEFAULT_TENANT_ID)
    }
}
