//! Identity-provider lifecycle hooks.
//!
//! Two handlers that run inside the provider's authentication pipeline:
//! post-confirmation tenant provisioning and pre-token-generation claim
//! injection. Both must never fail the pipeline: every code path returns the
//! event to let the provider proceed.
pub mod events;
pub mod post_confirmation;
pub mod pre_token_generation;

pub use events::{PostConfirmationEvent, PreTokenGenerationEvent};
pub use post_confirmation::{handle_post_confirmation, PostConfirmationConfig};
pub use pre_token_generation::handle_pre_token_generation;
