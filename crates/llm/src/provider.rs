use futures::future::BoxFuture;
use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub provider_id: String,
    pub api_key: String,
    pub endpoint: String,
}

impl ClientConfig {
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
        }
    }
}

/// Wire role understood by chat-completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One non-streaming completion call: the model id plus the full ordered context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub model_id: String,
    pub messages: Vec<ProviderMessage>,
}

impl ChatRequest {
    pub fn new(model_id: impl Into<String>, messages: Vec<ProviderMessage>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
}

impl ChatReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChatError {
    #[snafu(display("missing API key for provider '{provider_id}'"))]
    MissingApiKey {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("provider '{provider_id}' is not supported"))]
    UnsupportedProvider {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("chat request for model '{model_id}' has no user or assistant messages"))]
    EmptyMessageSet {
        stage: &'static str,
        model_id: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("failed to finalize HTTP request body: {message}"))]
    BuildHttpRequestBody {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("provider probe returned status {status}: {body}"))]
    ProbeStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("network failure on `{stage}`, {source}"))]
    Network {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
    #[snafu(display("malformed completion response on `{stage}`: {details}"))]
    MalformedResponse {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("provider rejected the request on `{stage}`, {source}"))]
    Provider {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
    #[snafu(display("chat client '{provider_id}' is not available"))]
    Unavailable {
        stage: &'static str,
        provider_id: String,
    },
}

/// Coarse failure category surfaced to callers that only need to branch on cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatErrorKind {
    Network,
    MalformedResponse,
    LibraryUnavailable,
}

impl ChatError {
    pub fn kind(&self) -> ChatErrorKind {
        match self {
            Self::HttpClient { .. } | Self::Network { .. } | Self::Provider { .. } => {
                ChatErrorKind::Network
            }
            Self::MalformedResponse { .. } => ChatErrorKind::MalformedResponse,
            Self::MissingApiKey { .. }
            | Self::UnsupportedProvider { .. }
            | Self::EmptyMessageSet { .. }
            | Self::BuildHttpRequestBody { .. }
            | Self::ProbeStatus { .. }
            | Self::Unavailable { .. } => ChatErrorKind::LibraryUnavailable,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingApiKey { stage, .. }
            | Self::UnsupportedProvider { stage, .. }
            | Self::EmptyMessageSet { stage, .. }
            | Self::HttpClient { stage, .. }
            | Self::BuildHttpRequestBody { stage, .. }
            | Self::ProbeStatus { stage, .. }
            | Self::Network { stage, .. }
            | Self::MalformedResponse { stage, .. }
            | Self::Provider { stage, .. }
            | Self::Unavailable { stage, .. } => stage,
        }
    }
}

/// Injected chat-completion capability.
///
/// `is_available` is the capability check the readiness gate polls; `chat` performs one
/// request/response exchange. Implementations must be cheap to share behind an `Arc`.
pub trait ChatClient: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn is_available(&self) -> BoxFuture<'_, bool>;
    fn chat(&self, request: ChatRequest) -> BoxFuture<'_, ChatResult<ChatReply>>;
}
