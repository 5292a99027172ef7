use crate::events::{
    ClaimsAndScopeOverrideDetails, PreTokenGenerationEvent, TENANT_ID_ATTRIBUTE,
};

/// Pre-token-generation hook (V2): stamp the tenant id into both tokens.
///
/// The access token additionally carries the `custom:tenantId` form for
/// consumers that read the raw attribute name. Degrades gracefully: the
/// event always comes back issuable.
pub fn handle_pre_token_generation(mut event: PreTokenGenerationEvent) -> PreTokenGenerationEvent {
    let tenant_id = event.tenant_id().to_string();

    tracing::info!(%tenant_id, "injecting tenant claim");

    let mut overrides = ClaimsAndScopeOverrideDetails::default();
    overrides
        .access_token_generation
        .claims_to_add_or_override
        .insert("tenantId".to_string(), tenant_id.clone());
    overrides
        .access_token_generation
        .claims_to_add_or_override
        .insert(TENANT_ID_ATTRIBUTE.to_string(), tenant_id.clone());
    overrides
        .id_token_generation
        .claims_to_add_or_override
        .insert("tenantId".to_string(), tenant_id);

    event.response.claims_and_scope_override_details = Some(overrides);
    event
}
