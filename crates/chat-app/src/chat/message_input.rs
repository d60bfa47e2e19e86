use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::Submit;

pub const INPUT_PLACEHOLDER: &str = "Ask something deep...";

/// Send button caption for the busy and idle states.
pub fn send_button_label(busy: bool) -> &'static str {
    if busy { "..." } else { "→" }
}

pub struct MessageInput {
    input_state: Entity<InputState>,
    busy: bool,
    ready: bool,
    restore_focus: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(INPUT_PLACEHOLDER));

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, _window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(cx);
                }
            },
        )
        .detach();

        Self {
            input_state,
            busy: false,
            ready: false,
            restore_focus: false,
        }
    }

    /// Leaving the busy state hands focus back to the text field on the next frame.
    pub fn set_busy(&mut self, busy: bool, cx: &mut Context<Self>) {
        if self.busy && !busy {
            self.restore_focus = true;
        }
        self.busy = busy;
        cx.notify();
    }

    pub fn set_ready(&mut self, ready: bool, cx: &mut Context<Self>) {
        self.ready = ready;
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }

    fn can_send(&self) -> bool {
        self.ready && !self.busy
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        if !self.can_send() {
            return;
        }

        // Clearing is left to the coordinator, which only clears accepted input.
        let content = self.input_state.read(cx).value().to_string();
        cx.emit(Submit::new(content));
    }
}

impl Render for MessageInput {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.restore_focus && !self.busy {
            self.restore_focus = false;
            self.input_state.update(cx, |state, cx| {
                state.focus(window, cx);
            });
        }

        let theme = cx.theme();

        h_flex()
            .w_full()
            .gap_2()
            .p_3()
            .bg(theme.background)
            .child(
                div()
                    .flex_1()
                    .px_3()
                    .py_1()
                    .rounded_full()
                    .border_1()
                    .border_color(theme.border)
                    .child(Input::new(&self.input_state).w_full().disabled(self.busy)),
            )
            .child(
                Button::new("send")
                    .small()
                    .primary()
                    .child(send_button_label(self.busy))
                    .disabled(!self.can_send())
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.handle_submit(cx);
                    })),
            )
    }
}
