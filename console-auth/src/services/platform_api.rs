use crate::config::ApiSettings;
use crate::models::tenant::TenantType;
use reqwest::Client;
use serde::Deserialize;

/// Typed client for the platform/tenant-directory service.
pub struct PlatformApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantResponse {
    #[serde(default)]
    tenant_type: TenantType,
}

impl PlatformApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.platform_url.clone(),
        }
    }

    /// Resolve the type of a tenant by id.
    ///
    /// Fails open to `Personal` (the least-privileged classification) on any
    /// lookup failure.
    pub async fn tenant_type(&self, tenant_id: &str) -> TenantType {
        let url = format!("{}/platform/api/v1/tenants/{}", self.base_url, tenant_id);

        let response = self.client.get(&url).send().await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<TenantResponse>().await {
                Ok(tenant) => tenant.tenant_type,
                Err(e) => {
                    tracing::warn!(tenant_id, error = %e, "malformed tenant response, defaulting to personal");
                    TenantType::Personal
                }
            },
            Ok(resp) => {
                tracing::warn!(tenant_id, status = %resp.status(), "tenant lookup failed, defaulting to personal");
                TenantType::Personal
            }
            Err(e) => {
                tracing::warn!(tenant_id, error = %e, "tenant directory unreachable, defaulting to personal");
                TenantType::Personal
            }
        }
    }
}
