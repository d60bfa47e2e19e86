use std::sync::Arc;

mod model;
mod provider;
mod readiness;
mod rig_adapter;

pub use model::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, resolve_model_id};
pub use provider::{
    ChatClient, ChatError, ChatErrorKind, ChatReply, ChatRequest, ChatResult, ClientConfig,
    ProviderMessage, Role,
};
pub use readiness::{
    DEFAULT_POLL_INTERVAL, DEFAULT_READINESS_TIMEOUT, ReadinessGate, ReadinessState,
};
pub use rig_adapter::{RIG_OPENAI_PROVIDER_ID, RigChatClient};

pub fn create_client(mut config: ClientConfig) -> ChatResult<Arc<dyn ChatClient>> {
    if config.provider_id.trim().is_empty() {
        config.provider_id = RIG_OPENAI_PROVIDER_ID.to_string();
    }

    match config.provider_id.as_str() {
        "openai" | "rig-openai" => {
            config.provider_id = RIG_OPENAI_PROVIDER_ID.to_string();
            Ok(Arc::new(RigChatClient::new(config)?))
        }
        _ => Err(ChatError::UnsupportedProvider {
            stage: "create-client",
            provider_id: config.provider_id,
        }),
    }
}
