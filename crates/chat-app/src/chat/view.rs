use std::sync::Arc;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex};
use gpui_tokio_bridge::Tokio;
use socrates_llm::{
    ChatClient, ChatError, ChatResult, ChatReply, ReadinessGate, ReadinessState, create_client,
};

use crate::app::{INPUT_AREA_HEIGHT, compute_scroll_region_height, measured_or};
use crate::chat::events::{BeginClicked, Submit};
use crate::chat::{MessageInput, MessageList, WelcomePanel};
use crate::conversation::{ConversationController, PendingTurn, SessionPhase};
use crate::settings::ChatSettings;

pub const CONNECTING_TEXT: &str = "Connecting to the oracle...";

/// Text for the status line above the conversation, or `None` once chat is usable.
pub fn status_message(readiness: &ReadinessState, client_error: Option<&str>) -> Option<String> {
    if let Some(error) = client_error {
        return Some(format!("Chat is not configured: {error}"));
    }

    match readiness {
        ReadinessState::Pending => Some(CONNECTING_TEXT.to_string()),
        ReadinessState::Ready => None,
        ReadinessState::Failed(reason) => Some(format!("The oracle is unreachable: {reason}")),
    }
}

/// Coordinator between the controller, the injected chat client and the child views.
pub struct ChatView {
    controller: ConversationController,
    client: Option<Arc<dyn ChatClient>>,
    client_error: Option<String>,
    readiness_gate: Arc<ReadinessGate>,
    readiness: ReadinessState,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    welcome_panel: Entity<WelcomePanel>,
    /// Viewport and header heights last reported by the shell.
    frame_metrics: Option<(f32, f32)>,
    status_handle: ScrollHandle,
    input_handle: ScrollHandle,
    input_area_height: f32,
    readiness_task: Option<Task<()>>,
    chat_task: Option<Task<()>>,
}

impl ChatView {
    pub fn new(settings: &ChatSettings, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));
        let welcome_panel = cx.new(WelcomePanel::new);
        let (client, client_error) = Self::initialize_client(settings);

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &Submit, window, cx| {
                this.handle_submit(event, window, cx);
            },
        )
        .detach();

        cx.subscribe(&welcome_panel, |this, _, _event: &BeginClicked, cx| {
            this.handle_begin(cx);
        })
        .detach();

        let mut this = Self {
            controller: ConversationController::new(settings.model.clone()),
            client,
            client_error,
            readiness_gate: Arc::new(settings.readiness_gate()),
            readiness: ReadinessState::Pending,
            message_list,
            message_input,
            welcome_panel,
            frame_metrics: None,
            status_handle: ScrollHandle::new(),
            input_handle: ScrollHandle::new(),
            input_area_height: INPUT_AREA_HEIGHT,
            readiness_task: None,
            chat_task: None,
        };

        this.start_readiness_gate(cx);
        this
    }

    pub fn set_frame_metrics(
        &mut self,
        viewport_height: f32,
        header_height: f32,
        cx: &mut Context<Self>,
    ) {
        let metrics = Some((viewport_height, header_height));
        if self.frame_metrics == metrics {
            return;
        }
        self.frame_metrics = metrics;
        cx.notify();
    }

    /// Laid-out height of the status line and the input row from the last frame.
    fn measure_input_area(&self, status_visible: bool) -> f32 {
        let input = self.input_handle.bounds().size.height;
        if input <= Pixels::ZERO {
            return INPUT_AREA_HEIGHT;
        }

        let status = if status_visible {
            measured_or(self.status_handle.bounds().size.height, 0.0)
        } else {
            0.0
        };
        f32::from(input) + status
    }

    fn scroll_region_height(&self) -> Option<Pixels> {
        let (viewport_height, header_height) = self.frame_metrics?;
        Some(px(compute_scroll_region_height(
            viewport_height,
            header_height,
            self.input_area_height,
        )))
    }

    fn initialize_client(settings: &ChatSettings) -> (Option<Arc<dyn ChatClient>>, Option<String>) {
        let Some(config) = settings.to_client_config() else {
            tracing::warn!("no API key configured; chat stays disabled");
            return (
                None,
                Some("set api_key in settings.json or OPENAI_API_KEY".to_string()),
            );
        };

        match create_client(config) {
            Ok(client) => {
                tracing::info!(
                    provider_id = %client.id(),
                    client = %client.name(),
                    model_id = %settings.model,
                    "initialized chat client"
                );
                (Some(client), None)
            }
            Err(error) => {
                tracing::error!("failed to initialize chat client: {error}");
                (None, Some(error.to_string()))
            }
        }
    }

    fn start_readiness_gate(&mut self, cx: &mut Context<Self>) {
        let Some(client) = self.client.clone() else {
            return;
        };

        let gate = self.readiness_gate.clone();
        let probe = Tokio::spawn(cx, async move { gate.open(client.as_ref()).await });

        self.readiness_task = Some(cx.spawn(async move |this, cx| {
            let state = match probe.await {
                Ok(state) => state,
                Err(error) => ReadinessState::Failed(format!("readiness check aborted: {error}")),
            };

            let _ = this.update(cx, |this, cx| {
                this.handle_readiness(state, cx);
            });
        }));
    }

    fn handle_readiness(&mut self, state: ReadinessState, cx: &mut Context<Self>) {
        let ready = state.is_ready();
        self.controller.set_ready(ready);
        self.readiness = state;
        self.readiness_task = None;

        self.message_input.update(cx, |input, cx| {
            input.set_ready(ready, cx);
        });
        cx.notify();
    }

    fn handle_begin(&mut self, cx: &mut Context<Self>) {
        self.controller.begin();
        self.sync_message_list(cx);
        cx.notify();
    }

    fn handle_submit(&mut self, event: &Submit, window: &mut Window, cx: &mut Context<Self>) {
        let Ok(turn) = self.controller.begin_submit(&event.content) else {
            return;
        };

        self.message_input.update(cx, |input, cx| {
            input.clear(window, cx);
            input.set_busy(true, cx);
        });
        self.sync_message_list(cx);
        cx.notify();

        let Some(client) = self.client.clone() else {
            // Readiness is only reached with a client, so this is a wiring bug.
            tracing::error!("submit accepted without a chat client");
            let result = Err(ChatError::Unavailable {
                stage: "submit-without-client",
                provider_id: String::new(),
            });
            self.finish_submit(turn, result, cx);
            return;
        };

        let provider_id = client.id().to_string();
        let request = turn.request.clone();
        let call = Tokio::spawn(cx, async move { client.chat(request).await });

        self.chat_task = Some(cx.spawn(async move |this, cx| {
            let result = match call.await {
                Ok(result) => result,
                Err(error) => {
                    tracing::error!(provider_id = %provider_id, "chat task aborted: {error}");
                    Err(ChatError::Unavailable {
                        stage: "join-chat-task",
                        provider_id,
                    })
                }
            };

            let _ = this.update(cx, |this, cx| {
                this.finish_submit(turn, result, cx);
            });
        }));
    }

    fn finish_submit(
        &mut self,
        turn: PendingTurn,
        result: ChatResult<ChatReply>,
        cx: &mut Context<Self>,
    ) {
        let outcome = self.controller.complete_submit(turn, result);
        tracing::info!(
            ?outcome,
            transcript_len = self.controller.transcript().len(),
            "turn completed"
        );

        self.chat_task = None;
        self.message_input.update(cx, |input, cx| {
            input.set_busy(false, cx);
        });
        self.sync_message_list(cx);
        cx.notify();
    }

    fn sync_message_list(&mut self, cx: &mut Context<Self>) {
        let busy = self.controller.is_busy();
        let transcript = self.controller.transcript();
        self.message_list.update(cx, |list, cx| {
            list.set_transcript(transcript, busy, cx);
        });
    }

    fn render_status(&self, cx: &Context<Self>) -> Option<impl IntoElement> {
        let theme = cx.theme();
        let text = status_message(&self.readiness, self.client_error.as_deref())?;
        let color = if self.client_error.is_some() || self.readiness.failure().is_some() {
            theme.danger
        } else {
            theme.muted_foreground
        };

        Some(
            div()
                .id("chat-view-status")
                .track_scroll(&self.status_handle)
                .w_full()
                .px_4()
                .py_2()
                .border_b_1()
                .border_color(theme.border)
                .child(Label::new(text).text_xs().text_color(color)),
        )
    }
}

impl Render for ChatView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let status_visible =
            status_message(&self.readiness, self.client_error.as_deref()).is_some();
        let input_area_height = self.measure_input_area(status_visible);
        if input_area_height != self.input_area_height {
            // Measurements lag one layout behind; settle on the next frame.
            self.input_area_height = input_area_height;
            window.request_animation_frame();
        }

        let theme = cx.theme();
        let scroll_region_height = self.scroll_region_height();
        let body = match self.controller.phase() {
            SessionPhase::Welcome => self.welcome_panel.clone().into_any_element(),
            SessionPhase::Active => self.message_list.clone().into_any_element(),
        };

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .rounded_xl()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .children(self.render_status(cx))
            .child(
                div()
                    .id("chat-view-body")
                    .w_full()
                    .min_h_0()
                    .map(|body| match scroll_region_height {
                        Some(height) => body.h(height),
                        None => body.flex_1(),
                    })
                    .child(body),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .track_scroll(&self.input_handle)
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_gate_shows_connecting_status() {
        assert_eq!(
            status_message(&ReadinessState::Pending, None).as_deref(),
            Some(CONNECTING_TEXT)
        );
    }

    #[test]
    fn ready_gate_hides_status() {
        assert_eq!(status_message(&ReadinessState::Ready, None), None);
    }

    #[test]
    fn failed_gate_reports_reason() {
        let state = ReadinessState::Failed("timed out after 15.0s".to_string());
        let message = status_message(&state, None).unwrap_or_default();
        assert!(message.contains("timed out after 15.0s"));
    }

    #[test]
    fn configuration_error_wins_over_gate_state() {
        let message = status_message(&ReadinessState::Pending, Some("missing API key"))
            .unwrap_or_default();
        assert_eq!(message, "Chat is not configured: missing API key");
    }
}
