use futures::FutureExt;
use futures::future::BoxFuture;
use rig::completion::{CompletionError, CompletionModel, Message as RigMessage};
use rig::http_client::{self, HttpClientExt, NoBody};
use rig::message::AssistantContent;
use rig::prelude::CompletionClient;
use rig::providers::openai;
use snafu::{ResultExt, ensure};

use super::provider::{
    ChatClient, ChatError, ChatReply, ChatRequest, ChatResult, ClientConfig,
    EmptyMessageSetSnafu, HttpClientSnafu, MalformedResponseSnafu, MissingApiKeySnafu,
    ProbeStatusSnafu, ProviderMessage, Role,
};

pub const RIG_OPENAI_PROVIDER_ID: &str = "openai";

pub struct RigChatClient {
    config: ClientConfig,
}

impl RigChatClient {
    pub fn new(config: ClientConfig) -> ChatResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-client-new",
                provider_id: config.provider_id.clone(),
            }
        );

        Ok(Self { config })
    }

    fn build_client(config: &ClientConfig) -> ChatResult<openai::Client> {
        let mut builder = openai::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    async fn probe_models_endpoint(config: &ClientConfig) -> ChatResult<()> {
        let client = Self::build_client(config)?;
        let request = client
            .get("/models")
            .context(HttpClientSnafu {
                stage: "build-probe-request",
            })?
            .body(NoBody)
            .map_err(|source| ChatError::BuildHttpRequestBody {
                stage: "build-probe-request-body",
                message: source.to_string(),
            })?;

        let response = client.send(request).await.context(HttpClientSnafu {
            stage: "send-probe-request",
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = http_client::text(response).await.context(HttpClientSnafu {
            stage: "read-probe-response",
        })?;
        ProbeStatusSnafu {
            stage: "probe-http-status",
            status: status.as_u16(),
            body,
        }
        .fail()
    }

    fn to_rig_message(message: &ProviderMessage) -> Option<RigMessage> {
        match message.role {
            Role::System => None,
            Role::User => Some(RigMessage::user(message.content.clone())),
            Role::Assistant => Some(RigMessage::assistant(message.content.clone())),
        }
    }

    fn merged_preamble(request: &ChatRequest) -> Option<String> {
        // Rig exposes a single preamble field, so system-role messages are folded into it
        // while user/assistant turns still go out as chat history.
        let preamble_parts = request
            .messages
            .iter()
            .filter(|message| matches!(message.role, Role::System))
            .map(|message| message.content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>();

        if preamble_parts.is_empty() {
            None
        } else {
            Some(preamble_parts.join("\n\n"))
        }
    }

    /// Splits the context into prior history and the final prompt turn.
    fn split_prompt(request: &ChatRequest) -> ChatResult<(Vec<RigMessage>, RigMessage)> {
        let mut messages = request
            .messages
            .iter()
            .filter_map(Self::to_rig_message)
            .collect::<Vec<_>>();

        let Some(prompt) = messages.pop() else {
            tracing::warn!(
                model_id = %request.model_id,
                total_message_count = request.messages.len(),
                "cannot send completion because no user/assistant messages remain after filtering"
            );
            return EmptyMessageSetSnafu {
                stage: "split-prompt",
                model_id: request.model_id.clone(),
            }
            .fail();
        };

        Ok((messages, prompt))
    }

    fn reply_text<'a>(parts: impl IntoIterator<Item = &'a AssistantContent>) -> String {
        parts
            .into_iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn classify_completion_error(stage: &'static str, source: CompletionError) -> ChatError {
        match source {
            CompletionError::JsonError(_) | CompletionError::ResponseError(_) => {
                ChatError::MalformedResponse {
                    stage,
                    details: source.to_string(),
                }
            }
            CompletionError::ProviderError(_) => ChatError::Provider { stage, source },
            _ => ChatError::Network { stage, source },
        }
    }

    /// Sends one completion. Unlike a raw passthrough of the message content, an empty
    /// reply fails with `MalformedResponse` (see [`Self::into_reply`]).
    async fn complete(config: &ClientConfig, request: ChatRequest) -> ChatResult<ChatReply> {
        let client = Self::build_client(config)?;
        let model = client.completion_model(request.model_id.clone());
        let (history, prompt) = Self::split_prompt(&request)?;

        let mut builder = model.completion_request(prompt).messages(history);

        if let Some(preamble) = Self::merged_preamble(&request) {
            builder = builder.preamble(preamble);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| Self::classify_completion_error("send-completion", source))?;

        Self::into_reply(Self::reply_text(response.choice.iter()))
    }

    /// Blank text is not passed through as an empty reply; callers get
    /// `MalformedResponse` and the conversation shows its fallback instead.
    fn into_reply(content: String) -> ChatResult<ChatReply> {
        ensure!(
            !content.trim().is_empty(),
            MalformedResponseSnafu {
                stage: "extract-reply-text",
                details: "completion choice carried no text content".to_string(),
            }
        );

        Ok(ChatReply::new(content))
    }
}

impl ChatClient for RigChatClient {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn name(&self) -> &str {
        "Rig OpenAI"
    }

    fn is_available(&self) -> BoxFuture<'_, bool> {
        async move {
            match Self::probe_models_endpoint(&self.config).await {
                Ok(()) => true,
                Err(error) => {
                    tracing::debug!(
                        provider_id = %self.config.provider_id,
                        stage = error.stage(),
                        error = %error,
                        "chat client probe failed"
                    );
                    false
                }
            }
        }
        .boxed()
    }

    fn chat(&self, request: ChatRequest) -> BoxFuture<'_, ChatResult<ChatReply>> {
        async move {
            let model_id = request.model_id.clone();
            let message_count = request.messages.len();
            tracing::debug!(
                provider_id = %self.config.provider_id,
                model_id = %model_id,
                message_count,
                "sending chat completion"
            );

            let result = Self::complete(&self.config, request).await;
            if let Err(error) = &result {
                tracing::warn!(
                    provider_id = %self.config.provider_id,
                    model_id = %model_id,
                    stage = error.stage(),
                    error = %error,
                    "chat completion failed"
                );
            }
            result
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_OPENAI_MODEL;
    use crate::provider::ChatErrorKind;

    fn request(messages: Vec<ProviderMessage>) -> ChatRequest {
        ChatRequest::new(DEFAULT_OPENAI_MODEL, messages)
    }

    #[test]
    fn new_rejects_missing_api_key() {
        let result = RigChatClient::new(ClientConfig::new("openai", "  ", ""));
        assert!(matches!(result, Err(ChatError::MissingApiKey { .. })));
    }

    #[test]
    fn system_messages_fold_into_preamble() {
        let request = request(vec![
            ProviderMessage::system("Be Socrates."),
            ProviderMessage::user("Why?"),
            ProviderMessage::system("   "),
            ProviderMessage::system("Stay brief."),
        ]);

        assert_eq!(
            RigChatClient::merged_preamble(&request).as_deref(),
            Some("Be Socrates.\n\nStay brief.")
        );
    }

    #[test]
    fn preamble_is_absent_without_system_messages() {
        let request = request(vec![ProviderMessage::user("Why?")]);
        assert_eq!(RigChatClient::merged_preamble(&request), None);
    }

    #[test]
    fn split_prompt_keeps_last_turn_as_prompt() {
        let request = request(vec![
            ProviderMessage::system("Be Socrates."),
            ProviderMessage::user("first"),
            ProviderMessage::assistant("why first?"),
            ProviderMessage::user("second"),
        ]);

        let (history, prompt) = match RigChatClient::split_prompt(&request) {
            Ok(split) => split,
            Err(error) => panic!("split failed: {error}"),
        };
        assert_eq!(history.len(), 2);
        assert_eq!(prompt, RigMessage::user("second"));
    }

    #[test]
    fn split_prompt_rejects_system_only_context() {
        let request = request(vec![ProviderMessage::system("Be Socrates.")]);
        let error = RigChatClient::split_prompt(&request).err();
        assert!(matches!(error, Some(ChatError::EmptyMessageSet { .. })));
    }

    #[test]
    fn reply_text_joins_text_parts_only() {
        let parts = [
            AssistantContent::text("Have you "),
            AssistantContent::text("asked why?"),
        ];
        assert_eq!(RigChatClient::reply_text(parts.iter()), "Have you asked why?");
    }

    #[test]
    fn blank_reply_text_is_malformed() {
        for blank in ["", "  \n\t"] {
            match RigChatClient::into_reply(blank.to_string()) {
                Ok(reply) => panic!("blank reply accepted: {reply:?}"),
                Err(error) => {
                    assert_eq!(error.kind(), ChatErrorKind::MalformedResponse);
                    assert_eq!(error.stage(), "extract-reply-text");
                }
            }
        }
    }

    #[test]
    fn non_blank_reply_text_is_kept_verbatim() {
        match RigChatClient::into_reply(" Are you sure? ".to_string()) {
            Ok(reply) => assert_eq!(reply.content, " Are you sure? "),
            Err(error) => panic!("reply rejected: {error}"),
        }
    }

    #[test]
    fn completion_errors_classify_by_cause() {
        let malformed = RigChatClient::classify_completion_error(
            "send-completion",
            CompletionError::ResponseError("unexpected payload".to_string()),
        );
        let provider = RigChatClient::classify_completion_error(
            "send-completion",
            CompletionError::ProviderError("invalid key".to_string()),
        );

        assert_eq!(malformed.kind(), ChatErrorKind::MalformedResponse);
        assert!(matches!(provider, ChatError::Provider { .. }));
        assert_eq!(provider.kind(), ChatErrorKind::Network);
    }
}
