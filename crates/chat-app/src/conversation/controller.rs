use socrates_llm::{
    ChatClient, ChatErrorKind, ChatReply, ChatRequest, ChatResult, DEFAULT_OPENAI_MODEL,
    ProviderMessage, Role as ProviderRole,
};

use crate::conversation::message::{ChatMessage, Role, Transcript};
use crate::conversation::persona::{FALLBACK_MESSAGE, SYSTEM_PROMPT};

/// One-way session phase: the welcome panel is shown until the first accepted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Welcome,
    Active,
}

/// Why a submission was ignored. None of these touch the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    NotReady,
    EmptyInput,
    Busy,
}

/// An accepted submission waiting for its reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTurn {
    pub user_content: String,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replied,
    FellBack(ChatErrorKind),
}

/// Owns the transcript and the ready/busy flags.
///
/// A submission runs in two phases so callers never hold the controller across an
/// await: [`begin_submit`](Self::begin_submit) validates and builds the outbound context,
/// [`complete_submit`](Self::complete_submit) appends the user entry and the reply (or
/// the fallback) together and clears the busy flag.
#[derive(Debug, Clone)]
pub struct ConversationController {
    transcript: Transcript,
    ready: bool,
    busy: bool,
    phase: SessionPhase,
    system_prompt: String,
    model_id: String,
}

impl ConversationController {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(),
            ready: false,
            busy: false,
            phase: SessionPhase::Welcome,
            system_prompt: SYSTEM_PROMPT.to_string(),
            model_id: model_id.into(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Leaves the welcome phase without submitting anything.
    pub fn begin(&mut self) {
        self.phase = SessionPhase::Active;
    }

    /// Builds `[system] + transcript + [user]` for one call.
    pub fn outbound_context(&self, user_content: &str) -> Vec<ProviderMessage> {
        let mut messages = Vec::with_capacity(self.transcript.len() + 2);
        messages.push(ProviderMessage::system(self.system_prompt.clone()));
        messages.extend(self.transcript.iter().map(|message| {
            ProviderMessage::new(chat_role_to_provider(message.role), message.content.clone())
        }));
        messages.push(ProviderMessage::user(user_content));
        messages
    }

    pub fn begin_submit(&mut self, raw_input: &str) -> Result<PendingTurn, SubmitRejected> {
        if !self.ready {
            tracing::debug!("submit ignored: chat client is not ready");
            return Err(SubmitRejected::NotReady);
        }

        let user_content = raw_input.trim();
        if user_content.is_empty() {
            tracing::debug!("submit ignored: input is empty");
            return Err(SubmitRejected::EmptyInput);
        }

        if self.busy {
            tracing::debug!("submit ignored: a reply is still pending");
            return Err(SubmitRejected::Busy);
        }

        self.busy = true;
        self.phase = SessionPhase::Active;

        let request = ChatRequest::new(self.model_id.clone(), self.outbound_context(user_content));
        tracing::debug!(
            model_id = %self.model_id,
            context_len = request.messages.len(),
            "submit accepted"
        );

        Ok(PendingTurn {
            user_content: user_content.to_string(),
            request,
        })
    }

    pub fn complete_submit(
        &mut self,
        turn: PendingTurn,
        result: ChatResult<ChatReply>,
    ) -> SubmitOutcome {
        let (reply, outcome) = match result {
            Ok(reply) => (reply.content, SubmitOutcome::Replied),
            Err(error) => {
                tracing::warn!(
                    stage = error.stage(),
                    kind = ?error.kind(),
                    error = %error,
                    "chat call failed; appending fallback reply"
                );
                (
                    FALLBACK_MESSAGE.to_string(),
                    SubmitOutcome::FellBack(error.kind()),
                )
            }
        };

        self.transcript.push(ChatMessage::now(Role::User, turn.user_content));
        self.transcript.push(ChatMessage::now(Role::Socrates, reply));
        self.busy = false;
        outcome
    }

    /// Runs both phases around one call to `client`.
    pub async fn submit(
        &mut self,
        client: &dyn ChatClient,
        raw_input: &str,
    ) -> Result<SubmitOutcome, SubmitRejected> {
        let turn = self.begin_submit(raw_input)?;
        let result = client.chat(turn.request.clone()).await;
        Ok(self.complete_submit(turn, result))
    }
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new(DEFAULT_OPENAI_MODEL)
    }
}

fn chat_role_to_provider(role: Role) -> ProviderRole {
    match role {
        Role::User => ProviderRole::User,
        Role::Socrates => ProviderRole::Assistant,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use socrates_llm::ChatError;

    use super::*;

    enum Script {
        Reply(&'static str),
        Fail(fn() -> ChatError),
    }

    struct ScriptedClient {
        script: Script,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl ScriptedClient {
        fn replying(reply: &'static str) -> Self {
            Self::new(Script::Reply(reply))
        }

        fn failing(error: fn() -> ChatError) -> Self {
            Self::new(Script::Fail(error))
        }

        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Option<ChatRequest> {
            self.last_request
                .lock()
                .ok()
                .and_then(|request| request.clone())
        }
    }

    impl ChatClient for ScriptedClient {
        fn id(&self) -> &str {
            "scripted"
        }

        fn name(&self) -> &str {
            "Scripted"
        }

        fn is_available(&self) -> BoxFuture<'_, bool> {
            async { true }.boxed()
        }

        fn chat(&self, request: ChatRequest) -> BoxFuture<'_, ChatResult<ChatReply>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last_request) = self.last_request.lock() {
                *last_request = Some(request);
            }
            let result = match &self.script {
                Script::Reply(reply) => Ok(ChatReply::new(*reply)),
                Script::Fail(error) => Err(error()),
            };
            async move { result }.boxed()
        }
    }

    fn malformed() -> ChatError {
        ChatError::MalformedResponse {
            stage: "extract-reply-text",
            details: "empty choice".to_string(),
        }
    }

    fn unavailable() -> ChatError {
        ChatError::Unavailable {
            stage: "send-completion",
            provider_id: "scripted".to_string(),
        }
    }

    fn ready_controller() -> ConversationController {
        let mut controller = ConversationController::new("test-model");
        controller.set_ready(true);
        controller
    }

    fn roles_and_contents(controller: &ConversationController) -> Vec<(Role, String)> {
        controller
            .transcript()
            .iter()
            .map(|message| (message.role, message.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn accepted_submit_appends_user_then_reply() {
        let client = ScriptedClient::replying("Who is asking?");
        let mut controller = ready_controller();

        let outcome = controller.submit(&client, "Why do I exist?").await;

        assert_eq!(outcome, Ok(SubmitOutcome::Replied));
        assert_eq!(
            roles_and_contents(&controller),
            vec![
                (Role::User, "Why do I exist?".to_string()),
                (Role::Socrates, "Who is asking?".to_string()),
            ]
        );
        assert!(!controller.is_busy());
        assert_eq!(controller.phase(), SessionPhase::Active);
    }

    #[tokio::test]
    async fn input_is_trimmed_before_dispatch() {
        let client = ScriptedClient::replying("Hmm?");
        let mut controller = ready_controller();

        let _ = controller.submit(&client, "  what is virtue?\n").await;

        assert_eq!(
            controller.transcript().messages()[0].content,
            "what is virtue?"
        );
        let last_message = client
            .last_request()
            .and_then(|request| request.messages.last().cloned());
        assert_eq!(last_message, Some(ProviderMessage::user("what is virtue?")));
    }

    #[tokio::test]
    async fn whitespace_input_is_ignored() {
        let client = ScriptedClient::replying("unused");
        let mut controller = ready_controller();

        assert_eq!(
            controller.submit(&client, "   ").await,
            Err(SubmitRejected::EmptyInput)
        );
        assert!(controller.transcript().is_empty());
        assert!(!controller.is_busy());
        assert_eq!(controller.phase(), SessionPhase::Welcome);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn not_ready_skips_external_call() {
        let client = ScriptedClient::replying("unused");
        let mut controller = ConversationController::new("test-model");

        assert_eq!(
            controller.submit(&client, "Hello").await,
            Err(SubmitRejected::NotReady)
        );
        assert!(controller.transcript().is_empty());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn failure_appends_fallback_verbatim() {
        let client = ScriptedClient::failing(unavailable);
        let mut controller = ready_controller();

        let outcome = controller.submit(&client, "Is justice real?").await;

        assert_eq!(outcome, Ok(SubmitOutcome::FellBack(ChatErrorKind::LibraryUnavailable)));
        assert_eq!(
            roles_and_contents(&controller),
            vec![
                (Role::User, "Is justice real?".to_string()),
                (Role::Socrates, FALLBACK_MESSAGE.to_string()),
            ]
        );
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn failure_kind_is_surfaced() {
        let client = ScriptedClient::failing(malformed);
        let mut controller = ready_controller();

        let outcome = controller.submit(&client, "Define courage.").await;

        assert_eq!(
            outcome,
            Ok(SubmitOutcome::FellBack(ChatErrorKind::MalformedResponse))
        );
    }

    #[test]
    fn busy_rejects_second_submission() {
        let mut controller = ready_controller();

        let first = controller.begin_submit("first");
        assert!(first.is_ok());
        assert!(controller.is_busy());
        assert_eq!(
            controller.begin_submit("second"),
            Err(SubmitRejected::Busy)
        );
        assert!(controller.transcript().is_empty());

        if let Ok(turn) = first {
            controller.complete_submit(turn, Ok(ChatReply::new("why first?")));
        }
        assert!(!controller.is_busy());
        assert!(controller.begin_submit("second").is_ok());
    }

    #[tokio::test]
    async fn outbound_context_wraps_prior_transcript() {
        let client = ScriptedClient::replying("And why is that?");
        let mut controller = ready_controller();
        let _ = controller.submit(&client, "I am happy.").await;

        let context = controller.outbound_context("Because I chose it.");

        assert_eq!(
            context,
            vec![
                ProviderMessage::system(SYSTEM_PROMPT),
                ProviderMessage::user("I am happy."),
                ProviderMessage::assistant("And why is that?"),
                ProviderMessage::user("Because I chose it."),
            ]
        );
    }

    #[tokio::test]
    async fn request_carries_model_and_full_context() {
        let client = ScriptedClient::replying("second reply");
        let mut controller = ready_controller();
        let _ = controller.submit(&client, "one").await;
        let _ = controller.submit(&client, "two").await;

        let Some(request) = client.last_request() else {
            panic!("no request recorded");
        };
        assert_eq!(request.model_id, "test-model");
        let roles = request
            .messages
            .iter()
            .map(|message| message.role)
            .collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![
                ProviderRole::System,
                ProviderRole::User,
                ProviderRole::Assistant,
                ProviderRole::User,
            ]
        );
        assert_eq!(controller.transcript().len(), 4);
    }

    #[test]
    fn begin_leaves_welcome_without_touching_transcript() {
        let mut controller = ConversationController::default();
        assert_eq!(controller.phase(), SessionPhase::Welcome);

        controller.begin();

        assert_eq!(controller.phase(), SessionPhase::Active);
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.model_id(), DEFAULT_OPENAI_MODEL);
    }
}
