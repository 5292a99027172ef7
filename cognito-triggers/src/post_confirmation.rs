use crate::events::PostConfirmationEvent;
use reqwest::{Client, StatusCode};
use serde_json::json;

/// Configuration for the provisioning call, read from the environment in
/// deployment.
#[derive(Debug, Clone)]
pub struct PostConfirmationConfig {
    pub platform_service_url: String,
}

impl PostConfirmationConfig {
    pub fn from_env() -> Self {
        Self {
            platform_service_url: std::env::var("PLATFORM_SERVICE_URL")
                .unwrap_or_else(|_| "http://platform-service:8083/platform".to_string()),
        }
    }
}

/// Post-confirmation hook: provision a tenant record for the confirmed
/// principal.
///
/// Idempotent against the tenant directory: a conflict means the tenant was
/// provisioned earlier and is success. Any other failure is logged and
/// swallowed; signup completion must never be blocked, so the event is
/// always returned unmodified.
pub async fn handle_post_confirmation(
    config: &PostConfirmationConfig,
    client: &Client,
    event: PostConfirmationEvent,
) -> PostConfirmationEvent {
    let tenant_id = event.tenant_id().to_string();
    let email = event.email().unwrap_or_default().to_string();

    tracing::info!(%tenant_id, %email, "provisioning tenant after signup confirmation");

    let url = format!("{}/api/tenants", config.platform_service_url);
    let body = json!({
        "id": tenant_id,
        "name": format!("Tenant {}", tenant_id),
        "storageMode": "DATABASE",
        "slaTier": "STANDARD",
    });

    match client.post(&url).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!(%tenant_id, "tenant provisioned");
        }
        Ok(resp) if resp.status() == StatusCode::CONFLICT => {
            tracing::info!(%tenant_id, "tenant already exists");
        }
        Ok(resp) => {
            tracing::error!(%tenant_id, status = %resp.status(), "tenant provisioning failed");
        }
        Err(e) => {
            tracing::error!(%tenant_id, error = %e, "tenant directory unreachable");
        }
    }

    event
}
